use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::common::{RequestId, Result, VolunteerId};
use crate::domains::requests::HelpRequest;
use crate::domains::volunteers::VolunteerRecord;
use crate::kernel::{BaseRequestStore, BaseVolunteerStore};

use super::models::MatchResult;
use super::utils::{score_volunteer, VolunteerScore};
use super::EngineConfig;

/// Matching engine - selects the best available volunteer for a request
///
/// Pipeline:
/// 1. Escalation check (before any registry access)
/// 2. Gather volunteers without a pairing
/// 3. Score each one, dropping those that match no needed capability
/// 4. Pick the highest score; ties go to the higher qualification count,
///    then to the earlier registry position
///
/// Read-only: the result is committed separately by the `PairingCoordinator`.
pub struct MatchingEngine {
    volunteers: Arc<dyn BaseVolunteerStore>,
    requests: Arc<dyn BaseRequestStore>,
    config: EngineConfig,
}

impl MatchingEngine {
    pub fn new(
        volunteers: Arc<dyn BaseVolunteerStore>,
        requests: Arc<dyn BaseRequestStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            volunteers,
            requests,
            config,
        }
    }

    /// Find the best volunteer for a stored request.
    #[instrument(skip(self), fields(request_id = %request_id))]
    pub async fn match_request(&self, request_id: RequestId) -> Result<MatchResult> {
        let request = self.requests.get(request_id).await?;
        self.evaluate(&request, &HashSet::new()).await
    }

    /// Run one matching pass for `request`, ignoring `excluded` volunteers.
    pub async fn evaluate(
        &self,
        request: &HelpRequest,
        excluded: &HashSet<VolunteerId>,
    ) -> Result<MatchResult> {
        let requirement = &request.requirement;

        if requirement.requires_escalation(self.config.escalate_on_urgent) {
            info!(
                request_id = %request.id,
                urgency = %requirement.urgency,
                emergency = requirement.emergency_escalation,
                "Escalating to emergency services, skipping volunteer matching"
            );
            return Ok(MatchResult::escalated(format!(
                "Emergency escalation: please call emergency services. {}",
                requirement.rationale
            )));
        }

        let candidates: Vec<VolunteerRecord> = self
            .volunteers
            .list_eligible()
            .await?
            .into_iter()
            .filter(|v| !excluded.contains(&v.id))
            .collect();

        debug!(
            request_id = %request.id,
            candidates = candidates.len(),
            excluded = excluded.len(),
            "Scoring candidates"
        );

        match select_best(request, candidates) {
            Some((volunteer, scored)) => {
                info!(
                    request_id = %request.id,
                    volunteer_id = %volunteer.id,
                    score = scored.score,
                    "Best volunteer selected"
                );
                Ok(MatchResult::matched(volunteer, scored.score, scored.rationale))
            }
            None => {
                info!(request_id = %request.id, "No eligible volunteer found");
                Ok(MatchResult::no_match("No suitable volunteers available"))
            }
        }
    }
}

/// Pick the winner among `candidates`, given in registry order.
///
/// Only strictly better candidates replace the current best, so among
/// volunteers equal on score and qualification count the earliest wins.
pub fn select_best(
    request: &HelpRequest,
    candidates: Vec<VolunteerRecord>,
) -> Option<(VolunteerRecord, VolunteerScore)> {
    let mut best: Option<(VolunteerRecord, VolunteerScore)> = None;

    for volunteer in candidates {
        if !volunteer.is_available() {
            continue;
        }

        let scored = score_volunteer(&request.requirement, request.location.as_deref(), &volunteer);
        debug!(
            volunteer_id = %volunteer.id,
            score = scored.score,
            rationale = %scored.rationale,
            "Scored volunteer"
        );
        if !scored.is_eligible() {
            continue;
        }

        let better = match &best {
            None => true,
            Some((leader, lead)) => {
                scored.score > lead.score
                    || (scored.score == lead.score
                        && volunteer.qualification_count > leader.qualification_count)
            }
        };
        if better {
            best = Some((volunteer, scored));
        }
    }

    best
}
