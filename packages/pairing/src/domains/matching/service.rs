use std::sync::Arc;
use tracing::{info, instrument};

use crate::common::{RequestId, Result, VolunteerId};
use crate::domains::requests::RequestStatus;
use crate::kernel::{BaseRequestStore, BaseVolunteerStore};

use super::coordinator::PairingCoordinator;
use super::engine::MatchingEngine;
use super::models::MatchResult;
use super::EngineConfig;

/// Entry point for callers (CLI, HTTP layer, batch jobs).
///
/// `match_request` and `commit` are kept separate so a caller can show the
/// proposed volunteer before committing.
pub struct PairingService {
    engine: Arc<MatchingEngine>,
    coordinator: PairingCoordinator,
    volunteers: Arc<dyn BaseVolunteerStore>,
    requests: Arc<dyn BaseRequestStore>,
}

impl PairingService {
    pub fn new(
        volunteers: Arc<dyn BaseVolunteerStore>,
        requests: Arc<dyn BaseRequestStore>,
        config: EngineConfig,
    ) -> Self {
        let engine = Arc::new(MatchingEngine::new(
            volunteers.clone(),
            requests.clone(),
            config,
        ));
        let coordinator =
            PairingCoordinator::new(engine.clone(), volunteers.clone(), requests.clone(), config);
        Self {
            engine,
            coordinator,
            volunteers,
            requests,
        }
    }

    pub async fn match_request(&self, request_id: RequestId) -> Result<MatchResult> {
        self.engine.match_request(request_id).await
    }

    pub async fn commit(&self, request_id: RequestId, result: &MatchResult) -> Result<RequestStatus> {
        self.coordinator.commit(request_id, result).await
    }

    /// Match and immediately commit.
    pub async fn match_and_commit(
        &self,
        request_id: RequestId,
    ) -> Result<(MatchResult, RequestStatus)> {
        let result = self.match_request(request_id).await?;
        let status = self.commit(request_id, &result).await?;
        Ok((result, status))
    }

    /// Accepted -> Completed, freeing the volunteer for new requests.
    ///
    /// Triggered from outside (the volunteer reports the task done); the
    /// engine never completes requests on its own.
    #[instrument(skip(self), fields(request_id = %request_id))]
    pub async fn complete(&self, request_id: RequestId) -> Result<RequestStatus> {
        let volunteer_id = self.requests.complete(request_id).await?;
        self.volunteers.release(volunteer_id).await?;
        info!(volunteer_id = %volunteer_id, "Request completed, volunteer released");
        Ok(RequestStatus::Completed)
    }

    /// Clear a volunteer's pairing directly (e.g. on cancellation).
    pub async fn release_volunteer(&self, volunteer_id: VolunteerId) -> Result<()> {
        self.volunteers.release(volunteer_id).await
    }
}
