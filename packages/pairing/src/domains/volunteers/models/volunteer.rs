use serde::{Deserialize, Serialize};

use crate::common::{RequestId, VolunteerId};
use crate::domains::capabilities::{Capability, CapabilitySet};

/// Volunteer as seen by the matching engine.
///
/// `current_pairing` is `Some` exactly while the volunteer is assigned to one
/// accepted request. Only the volunteer store mutates it, through
/// `try_assign` and `release`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolunteerRecord {
    pub id: VolunteerId,
    pub name: String,
    pub capabilities: CapabilitySet,
    pub has_vehicle: bool,
    pub location: Option<String>,
    /// Tie-break weight. Defaults to the number of distinct capabilities.
    pub qualification_count: u32,
    pub current_pairing: Option<RequestId>,
}

impl VolunteerRecord {
    pub fn new(name: impl Into<String>, capabilities: CapabilitySet) -> Self {
        let qualification_count = capabilities.len() as u32;
        Self {
            id: VolunteerId::new(),
            name: name.into(),
            capabilities,
            has_vehicle: false,
            location: None,
            qualification_count,
            current_pairing: None,
        }
    }

    pub fn with_id(mut self, id: VolunteerId) -> Self {
        self.id = id;
        self
    }

    pub fn with_vehicle(mut self) -> Self {
        self.has_vehicle = true;
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_qualification_count(mut self, count: u32) -> Self {
        self.qualification_count = count;
        self
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn is_available(&self) -> bool {
        self.current_pairing.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualification_count_derives_from_capabilities() {
        let volunteer = VolunteerRecord::new(
            "Nicole",
            [Capability::CprTraining, Capability::FirstAidCertification].into(),
        );
        assert_eq!(volunteer.qualification_count, 2);
        assert!(volunteer.is_available());
        assert!(volunteer.has(Capability::CprTraining));
        assert!(!volunteer.has(Capability::Transportation));
    }
}
