pub mod coordinator;
pub mod engine;
pub mod models;
pub mod service;
pub mod utils;

// Re-export commonly used types
pub use coordinator::PairingCoordinator;
pub use engine::MatchingEngine;
pub use models::{MatchOutcome, MatchResult};
pub use service::PairingService;

/// Default bound on `try_assign` attempts per commit
pub const DEFAULT_MAX_COMMIT_ATTEMPTS: u32 = 3;

/// Settings shared by the matching engine and the pairing coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub max_commit_attempts: u32,
    /// Escalate on urgency 3 even when the analyzer did not flag an emergency
    pub escalate_on_urgent: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_commit_attempts: DEFAULT_MAX_COMMIT_ATTEMPTS,
            escalate_on_urgent: true,
        }
    }
}
