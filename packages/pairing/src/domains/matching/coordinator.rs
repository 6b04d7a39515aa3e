use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::common::{PairingError, RequestId, Result};
use crate::domains::requests::RequestStatus;
use crate::kernel::{BaseRequestStore, BaseVolunteerStore};

use super::engine::MatchingEngine;
use super::models::{MatchOutcome, MatchResult};
use super::EngineConfig;

/// Commits match results as exclusive volunteer <-> request pairings.
///
/// Selection runs against a snapshot, so the chosen volunteer may have been
/// claimed by the time we commit. `try_assign` is the single point of mutual
/// exclusion; when it loses, the coordinator re-runs matching without the
/// lost candidates, up to `max_commit_attempts` assignments in total.
pub struct PairingCoordinator {
    engine: Arc<MatchingEngine>,
    volunteers: Arc<dyn BaseVolunteerStore>,
    requests: Arc<dyn BaseRequestStore>,
    config: EngineConfig,
}

impl PairingCoordinator {
    pub fn new(
        engine: Arc<MatchingEngine>,
        volunteers: Arc<dyn BaseVolunteerStore>,
        requests: Arc<dyn BaseRequestStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            engine,
            volunteers,
            requests,
            config,
        }
    }

    /// Apply `result` to the request.
    ///
    /// - `Escalated` marks the request escalated without touching volunteers
    /// - `NoMatch` leaves it pending
    /// - `Matched` pairs it, retrying on conflicts; `Pending` once attempts run out
    #[instrument(skip(self, result), fields(request_id = %request_id, outcome = ?result.outcome))]
    pub async fn commit(&self, request_id: RequestId, result: &MatchResult) -> Result<RequestStatus> {
        let request = self.requests.get(request_id).await?;
        request.expect_status(RequestStatus::Pending)?;

        let mut current = result.clone();
        let mut excluded = HashSet::new();
        let mut attempts = 0;

        loop {
            match current.outcome {
                MatchOutcome::Escalated => {
                    self.requests.mark_escalated(request_id).await?;
                    info!("Request escalated to emergency services");
                    return Ok(RequestStatus::Escalated);
                }
                MatchOutcome::NoMatch => {
                    info!(attempts, "No volunteer paired, request stays pending");
                    return Ok(RequestStatus::Pending);
                }
                MatchOutcome::Matched => {}
            }

            let volunteer = current.volunteer.as_ref().ok_or_else(|| {
                PairingError::Other(anyhow::anyhow!("matched result carries no volunteer"))
            })?;
            let volunteer_id = volunteer.id;
            attempts += 1;

            if self.volunteers.try_assign(volunteer_id, request_id).await? {
                if self.requests.accept_if_pending(request_id, volunteer_id).await? {
                    info!(
                        volunteer_id = %volunteer_id,
                        score = current.score,
                        attempts,
                        "Volunteer paired with request"
                    );
                    return Ok(RequestStatus::Accepted);
                }

                // Another commit for this same request won; give the volunteer back.
                self.volunteers.release(volunteer_id).await?;
                let status = self.requests.get(request_id).await?.status;
                warn!(
                    volunteer_id = %volunteer_id,
                    status = %status,
                    "Request resolved by a concurrent commit, released volunteer"
                );
                return Ok(status);
            }

            let conflict = PairingError::ConcurrentAssignmentConflict(volunteer_id);
            warn!(error = %conflict, attempts, "Assignment lost to a concurrent request");

            if attempts >= self.config.max_commit_attempts {
                warn!(attempts, "Commit attempts exhausted, request stays pending");
                return Ok(RequestStatus::Pending);
            }

            excluded.insert(volunteer_id);
            current = self.engine.evaluate(&request, &excluded).await?;
        }
    }
}
