// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Matching and pairing rules live in domains/matching and only talk to
// storage and the LLM through these seams.
//
// Naming convention: Base* for trait names (e.g., BaseAI, BaseVolunteerStore)

use async_trait::async_trait;

use crate::common::{RequestId, Result, VolunteerId};
use crate::domains::requests::HelpRequest;
use crate::domains::volunteers::VolunteerRecord;

// =============================================================================
// AI Trait (Infrastructure - Generic LLM capabilities)
// =============================================================================

#[async_trait]
pub trait BaseAI: Send + Sync {
    /// Complete a prompt with an LLM (returns raw text response)
    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;

    /// Complete a prompt expecting JSON response (returns raw JSON string)
    /// Parse with serde_json::from_str in calling code
    async fn complete_json(&self, prompt: &str) -> anyhow::Result<String> {
        self.complete(prompt).await
    }
}

// =============================================================================
// Volunteer Store Trait (Infrastructure - the volunteer registry)
// =============================================================================

/// Keyed access to volunteer records.
///
/// Implementations must make `try_assign` linearizable per volunteer: a
/// compare-and-set on `current_pairing` (a per-record lock in memory, a
/// version check or row lock in a database). No operation may take a lock
/// across the whole registry for the duration of a match.
#[async_trait]
pub trait BaseVolunteerStore: Send + Sync {
    /// All volunteers without a pairing, in insertion order.
    async fn list_eligible(&self) -> Result<Vec<VolunteerRecord>>;

    /// Fails with `VolunteerNotFound` for unknown ids.
    async fn get(&self, id: VolunteerId) -> Result<VolunteerRecord>;

    /// Set `current_pairing = request_id` only if it is currently empty.
    ///
    /// Returns `false`, without effect, when another request got there first.
    async fn try_assign(&self, id: VolunteerId, request_id: RequestId) -> Result<bool>;

    /// Clear `current_pairing`. Releasing an unpaired volunteer is a no-op.
    async fn release(&self, id: VolunteerId) -> Result<()>;

    /// Insert or replace a volunteer's profile data.
    ///
    /// An existing record keeps its position and its `current_pairing`.
    async fn upsert(&self, record: VolunteerRecord) -> Result<()>;
}

// =============================================================================
// Request Store Trait (Infrastructure)
// =============================================================================

/// Keyed access to help requests. Every transition is atomic per request.
#[async_trait]
pub trait BaseRequestStore: Send + Sync {
    async fn insert(&self, request: HelpRequest) -> Result<()>;

    /// Fails with `RequestNotFound` for unknown ids.
    async fn get(&self, id: RequestId) -> Result<HelpRequest>;

    /// Pending -> Escalated. Fails with `InvalidState` from any other status.
    async fn mark_escalated(&self, id: RequestId) -> Result<HelpRequest>;

    /// Pending -> Accepted with `volunteer_id`, as a compare-and-set.
    ///
    /// Returns `false`, without effect, when the request is no longer pending.
    async fn accept_if_pending(&self, id: RequestId, volunteer_id: VolunteerId) -> Result<bool>;

    /// Accepted -> Completed. Returns the volunteer that was paired.
    async fn complete(&self, id: RequestId) -> Result<VolunteerId>;
}
