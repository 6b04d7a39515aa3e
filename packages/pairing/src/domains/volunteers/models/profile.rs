use serde::{Deserialize, Serialize};

use crate::common::{PairingError, VolunteerId};
use crate::domains::capabilities::parse_capabilities;

use super::volunteer::VolunteerRecord;

/// Volunteer profile as submitted by profile management.
///
/// Qualifications arrive as free text and are validated against the
/// capability vocabulary when converted into a `VolunteerRecord`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerProfile {
    #[serde(default)]
    pub id: Option<VolunteerId>,
    pub name: String,
    #[serde(default)]
    pub qualifications: Vec<String>,
    #[serde(default)]
    pub owns_car: bool,
    #[serde(default)]
    pub location: Option<String>,
}

impl TryFrom<VolunteerProfile> for VolunteerRecord {
    type Error = PairingError;

    fn try_from(profile: VolunteerProfile) -> Result<Self, Self::Error> {
        let capabilities = parse_capabilities(&profile.qualifications)?;
        let mut record = VolunteerRecord::new(profile.name, capabilities);
        if let Some(id) = profile.id {
            record = record.with_id(id);
        }
        if profile.owns_car {
            record = record.with_vehicle();
        }
        if let Some(location) = profile.location.filter(|l| !l.trim().is_empty()) {
            record = record.with_location(location);
        }
        Ok(record)
    }
}
