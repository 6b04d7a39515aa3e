use thiserror::Error;

use super::{RequestId, VolunteerId};

/// Result type alias using the pairing error type.
pub type Result<T> = std::result::Result<T, PairingError>;

/// Errors raised by the matching and pairing engine.
///
/// None of these are fatal: the engine resolves every failure to a
/// `MatchResult` or a `RequestStatus`, and callers surface the rest.
#[derive(Error, Debug)]
pub enum PairingError {
    /// A capability token outside the closed vocabulary
    #[error("Unknown capability: {0}")]
    InvalidCapability(String),

    /// Urgency outside 1..=3
    #[error("Invalid urgency level: {0} (expected 1, 2 or 3)")]
    InvalidUrgency(i64),

    #[error("Volunteer not found: {0}")]
    VolunteerNotFound(VolunteerId),

    #[error("Help request not found: {0}")]
    RequestNotFound(RequestId),

    /// The volunteer was claimed by another request between selection and commit.
    /// Drives the coordinator's retry loop and never escapes it.
    #[error("Volunteer {0} was claimed by a concurrent request")]
    ConcurrentAssignmentConflict(VolunteerId),

    /// Requirement extraction failed; callers substitute the fallback requirement.
    #[error("Requirement analysis failed: {0}")]
    AnalyzerFailure(String),

    #[error("Invalid state transition: request {request_id} is '{status}', expected '{expected}'")]
    InvalidState {
        request_id: RequestId,
        status: String,
        expected: String,
    },

    /// A stored request whose status and volunteer fields disagree.
    #[error("Inconsistent help request {request_id}: {reason}")]
    InconsistentRequest {
        request_id: RequestId,
        reason: &'static str,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PairingError {
    /// Not-found errors are surfaced to the caller as-is and never retried.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PairingError::VolunteerNotFound(_) | PairingError::RequestNotFound(_)
        )
    }
}
