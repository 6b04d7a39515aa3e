// TestDependencies - mock implementations for testing
//
// Provides mock collaborators that can be injected into the matching engine
// and pairing coordinator in unit and integration tests.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{BaseAI, BaseVolunteerStore, MemoryVolunteerStore};
use crate::common::{RequestId, VolunteerId};
use crate::domains::volunteers::VolunteerRecord;

// =============================================================================
// Mock AI (Generic LLM capabilities)
// =============================================================================

pub struct MockAI {
    responses: Arc<Mutex<Vec<String>>>,
    calls: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl MockAI {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    /// A mock whose every call errors, like an unreachable provider.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Add a text response to the queue
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push(response.into());
        self
    }

    /// Add a JSON response to the queue
    pub fn with_json_response(self, value: serde_json::Value) -> Self {
        self.with_response(value.to_string())
    }

    /// Get all prompts that were sent
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockAI {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseAI for MockAI {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.calls.lock().unwrap().push(prompt.to_string());

        if self.fail {
            anyhow::bail!("mock AI provider unavailable");
        }

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            anyhow::bail!("no mock AI response queued");
        }
        Ok(responses.remove(0))
    }
}

// =============================================================================
// Panicking Volunteer Store
// =============================================================================

/// Fails the test if the registry is touched at all.
///
/// Used to prove that escalated requests never reach the volunteer registry.
pub struct PanickingVolunteerStore;

#[async_trait]
impl BaseVolunteerStore for PanickingVolunteerStore {
    async fn list_eligible(&self) -> crate::common::Result<Vec<VolunteerRecord>> {
        panic!("volunteer registry queried: list_eligible");
    }

    async fn get(&self, id: VolunteerId) -> crate::common::Result<VolunteerRecord> {
        panic!("volunteer registry queried: get({})", id);
    }

    async fn try_assign(
        &self,
        id: VolunteerId,
        request_id: RequestId,
    ) -> crate::common::Result<bool> {
        panic!("volunteer registry mutated: try_assign({}, {})", id, request_id);
    }

    async fn release(&self, id: VolunteerId) -> crate::common::Result<()> {
        panic!("volunteer registry mutated: release({})", id);
    }

    async fn upsert(&self, record: VolunteerRecord) -> crate::common::Result<()> {
        panic!("volunteer registry mutated: upsert({})", record.id);
    }
}

// =============================================================================
// Contended Volunteer Store
// =============================================================================

/// Wraps a real store and loses the race for chosen volunteers.
///
/// The first `try_assign` for a contended volunteer hands it to a phantom
/// competing request and reports failure, reproducing a claim that lands
/// between selection and commit.
pub struct ContendedVolunteerStore {
    inner: MemoryVolunteerStore,
    contended: Mutex<HashSet<VolunteerId>>,
    assign_calls: AtomicUsize,
}

impl ContendedVolunteerStore {
    pub fn new(inner: MemoryVolunteerStore) -> Self {
        Self {
            inner,
            contended: Mutex::new(HashSet::new()),
            assign_calls: AtomicUsize::new(0),
        }
    }

    pub fn contend(self, id: VolunteerId) -> Self {
        self.contended.lock().unwrap().insert(id);
        self
    }

    pub fn assign_calls(&self) -> usize {
        self.assign_calls.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &MemoryVolunteerStore {
        &self.inner
    }
}

#[async_trait]
impl BaseVolunteerStore for ContendedVolunteerStore {
    async fn list_eligible(&self) -> crate::common::Result<Vec<VolunteerRecord>> {
        self.inner.list_eligible().await
    }

    async fn get(&self, id: VolunteerId) -> crate::common::Result<VolunteerRecord> {
        self.inner.get(id).await
    }

    async fn try_assign(
        &self,
        id: VolunteerId,
        request_id: RequestId,
    ) -> crate::common::Result<bool> {
        self.assign_calls.fetch_add(1, Ordering::SeqCst);
        let steal = self.contended.lock().unwrap().remove(&id);
        if steal {
            self.inner.try_assign(id, RequestId::new()).await?;
        }
        self.inner.try_assign(id, request_id).await
    }

    async fn release(&self, id: VolunteerId) -> crate::common::Result<()> {
        self.inner.release(id).await
    }

    async fn upsert(&self, record: VolunteerRecord) -> crate::common::Result<()> {
        self.inner.upsert(record).await
    }
}
