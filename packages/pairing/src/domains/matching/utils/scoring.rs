//! Pure scoring of one volunteer against one requirement.
//!
//! No I/O and no state: identical inputs always give identical output, so
//! the engine can score against a stale snapshot and let the coordinator
//! re-validate at commit time.

use crate::domains::capabilities::{describe, Capability, CapabilitySet};
use crate::domains::requests::RequirementExtraction;
use crate::domains::volunteers::VolunteerRecord;

/// Weight of each needed capability the volunteer holds
pub const CAPABILITY_MATCH_WEIGHT: f64 = 1.0;
/// Held medical certification, needed or not
pub const MEDICAL_CERTIFICATION_BONUS: f64 = 0.5;
/// Held CPR training, needed or not
pub const CPR_TRAINING_BONUS: f64 = 0.3;
/// Transportation is needed and the volunteer has a vehicle
pub const VEHICLE_BONUS: f64 = 0.5;
/// Request and volunteer locations match (case-insensitive)
pub const LOCATION_BONUS: f64 = 0.5;

/// Score of a volunteer, with a human-readable account of what fired.
#[derive(Debug, Clone, PartialEq)]
pub struct VolunteerScore {
    pub score: f64,
    /// Number of needed capabilities the volunteer holds
    pub matched: usize,
    pub rationale: String,
}

impl VolunteerScore {
    /// A volunteer matching none of the needed capabilities is never a candidate.
    pub fn is_eligible(&self) -> bool {
        self.matched > 0
    }
}

/// Score `volunteer` for `requirement`.
///
/// Algorithm:
/// - base = 1.0 per needed capability the volunteer holds
/// - base == 0 -> ineligible, score 0, no bonuses
/// - +0.5 if the volunteer holds MedicalCertification
/// - +0.3 if the volunteer holds CPRTraining
/// - +0.5 if Transportation is needed and the volunteer has a vehicle
/// - +0.5 if the request location equals the volunteer location, ignoring case
///
/// # Examples
/// ```
/// use pairing_core::domains::capabilities::Capability;
/// use pairing_core::domains::matching::utils::score_volunteer;
/// use pairing_core::domains::requests::{RequirementExtraction, Urgency};
/// use pairing_core::domains::volunteers::VolunteerRecord;
///
/// let need = RequirementExtraction::new([Capability::Transportation].into(), Urgency::Soon);
/// let driver = VolunteerRecord::new("A", [Capability::Transportation].into()).with_vehicle();
/// assert_eq!(score_volunteer(&need, None, &driver).score, 1.5);
/// ```
pub fn score_volunteer(
    requirement: &RequirementExtraction,
    request_location: Option<&str>,
    volunteer: &VolunteerRecord,
) -> VolunteerScore {
    let matched: CapabilitySet = requirement
        .needed_capabilities
        .intersection(&volunteer.capabilities)
        .copied()
        .collect();

    if matched.is_empty() {
        return VolunteerScore {
            score: 0.0,
            matched: 0,
            rationale: format!(
                "no needed capability held (needs: {})",
                describe(&requirement.needed_capabilities)
            ),
        };
    }

    let mut score = matched.len() as f64 * CAPABILITY_MATCH_WEIGHT;
    let mut parts = vec![format!("+{:.1} matched {}", score, describe(&matched))];

    if volunteer.has(Capability::MedicalCertification) {
        score += MEDICAL_CERTIFICATION_BONUS;
        parts.push(format!("+{:.1} medical certification", MEDICAL_CERTIFICATION_BONUS));
    }

    if volunteer.has(Capability::CprTraining) {
        score += CPR_TRAINING_BONUS;
        parts.push(format!("+{:.1} CPR training", CPR_TRAINING_BONUS));
    }

    if requirement
        .needed_capabilities
        .contains(&Capability::Transportation)
        && volunteer.has_vehicle
    {
        score += VEHICLE_BONUS;
        parts.push(format!("+{:.1} has vehicle", VEHICLE_BONUS));
    }

    if let (Some(wanted), Some(actual)) = (request_location, volunteer.location.as_deref()) {
        if wanted.to_lowercase() == actual.to_lowercase() {
            score += LOCATION_BONUS;
            parts.push(format!("+{:.1} same location ({})", LOCATION_BONUS, actual));
        }
    }

    VolunteerScore {
        score,
        matched: matched.len(),
        rationale: parts.join("; "),
    }
}
