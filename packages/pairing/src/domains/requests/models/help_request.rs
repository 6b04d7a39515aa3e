use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::common::{PairingError, RequestId, Result, VolunteerId};

use super::requirement::RequirementExtraction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    Accepted,
    Completed,
    Escalated,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "pending"),
            RequestStatus::Accepted => write!(f, "accepted"),
            RequestStatus::Completed => write!(f, "completed"),
            RequestStatus::Escalated => write!(f, "escalated"),
        }
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "accepted" => Ok(RequestStatus::Accepted),
            "completed" => Ok(RequestStatus::Completed),
            "escalated" => Ok(RequestStatus::Escalated),
            _ => Err(anyhow::anyhow!("Invalid request status: {}", s)),
        }
    }
}

/// A request for help.
///
/// `assigned_volunteer` is `Some` exactly while `status` is `Accepted`; on
/// completion the volunteer moves to `completed_by`. Status only moves through
/// the transition methods below, and snapshots that break this are rejected
/// when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(try_from = "StoredHelpRequest")]
pub struct HelpRequest {
    #[builder(default = RequestId::new())]
    pub id: RequestId,
    pub requirement: RequirementExtraction,
    #[builder(default, setter(into))]
    pub situation_text: String,
    #[builder(default, setter(into, strip_option))]
    pub requester: Option<String>,
    #[builder(default, setter(into, strip_option))]
    pub location: Option<String>,
    #[builder(default, setter(skip))]
    pub status: RequestStatus,
    #[builder(default, setter(skip))]
    pub assigned_volunteer: Option<VolunteerId>,
    #[builder(default, setter(skip))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_by: Option<VolunteerId>,
    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
}

/// Request as read from a snapshot, before the status invariant is checked.
#[derive(Deserialize)]
struct StoredHelpRequest {
    id: RequestId,
    requirement: RequirementExtraction,
    #[serde(default)]
    situation_text: String,
    #[serde(default)]
    requester: Option<String>,
    #[serde(default)]
    location: Option<String>,
    status: RequestStatus,
    #[serde(default)]
    assigned_volunteer: Option<VolunteerId>,
    #[serde(default)]
    completed_by: Option<VolunteerId>,
    created_at: DateTime<Utc>,
}

impl TryFrom<StoredHelpRequest> for HelpRequest {
    type Error = PairingError;

    fn try_from(stored: StoredHelpRequest) -> Result<Self> {
        let assigned = stored.assigned_volunteer.is_some();
        let completed = stored.completed_by.is_some();
        let reason = match stored.status {
            RequestStatus::Accepted if !assigned || completed => {
                Some("an accepted request needs an assigned volunteer and no completed_by")
            }
            RequestStatus::Completed if assigned || !completed => {
                Some("a completed request needs completed_by and no assigned volunteer")
            }
            RequestStatus::Pending | RequestStatus::Escalated if assigned || completed => {
                Some("a pending or escalated request cannot reference a volunteer")
            }
            _ => None,
        };
        if let Some(reason) = reason {
            return Err(PairingError::InconsistentRequest {
                request_id: stored.id,
                reason,
            });
        }

        Ok(Self {
            id: stored.id,
            requirement: stored.requirement,
            situation_text: stored.situation_text,
            requester: stored.requester,
            location: stored.location,
            status: stored.status,
            assigned_volunteer: stored.assigned_volunteer,
            completed_by: stored.completed_by,
            created_at: stored.created_at,
        })
    }
}

impl HelpRequest {
    /// Pending -> Escalated.
    pub fn escalate(&mut self) -> Result<()> {
        self.expect_status(RequestStatus::Pending)?;
        self.status = RequestStatus::Escalated;
        Ok(())
    }

    /// Pending -> Accepted, paired with `volunteer_id`.
    pub fn accept(&mut self, volunteer_id: VolunteerId) -> Result<()> {
        self.expect_status(RequestStatus::Pending)?;
        self.status = RequestStatus::Accepted;
        self.assigned_volunteer = Some(volunteer_id);
        Ok(())
    }

    /// Accepted -> Completed. Returns the volunteer to release.
    pub fn complete(&mut self) -> Result<VolunteerId> {
        self.expect_status(RequestStatus::Accepted)?;
        let volunteer_id =
            self.assigned_volunteer
                .take()
                .ok_or(PairingError::InconsistentRequest {
                    request_id: self.id,
                    reason: "accepted without an assigned volunteer",
                })?;
        self.status = RequestStatus::Completed;
        self.completed_by = Some(volunteer_id);
        Ok(volunteer_id)
    }

    pub fn expect_status(&self, expected: RequestStatus) -> Result<()> {
        if self.status != expected {
            return Err(PairingError::InvalidState {
                request_id: self.id,
                status: self.status.to_string(),
                expected: expected.to_string(),
            });
        }
        Ok(())
    }
}
