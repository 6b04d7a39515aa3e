use serde::{Deserialize, Serialize};

use crate::common::PairingError;
use crate::domains::capabilities::CapabilitySet;

/// How soon the requester needs help.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Urgency {
    CanWait = 1,
    Soon = 2,
    /// Urgent enough that emergency services may be the right call.
    Urgent = 3,
}

impl TryFrom<i64> for Urgency {
    type Error = PairingError;

    fn try_from(level: i64) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(Urgency::CanWait),
            2 => Ok(Urgency::Soon),
            3 => Ok(Urgency::Urgent),
            other => Err(PairingError::InvalidUrgency(other)),
        }
    }
}

impl From<Urgency> for i64 {
    fn from(urgency: Urgency) -> Self {
        urgency as i64
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", *self as i64)
    }
}

/// Structured requirement produced by the requirement analyzer.
///
/// Read-only input to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementExtraction {
    pub needed_capabilities: CapabilitySet,
    pub urgency: Urgency,
    pub emergency_escalation: bool,
    pub rationale: String,
}

impl RequirementExtraction {
    pub fn new(needed_capabilities: CapabilitySet, urgency: Urgency) -> Self {
        Self {
            needed_capabilities,
            urgency,
            emergency_escalation: false,
            rationale: String::new(),
        }
    }

    /// Conservative requirement used whenever analysis fails.
    ///
    /// Needs nothing, so no volunteer can score above zero, and never escalates.
    pub fn fallback() -> Self {
        Self {
            needed_capabilities: CapabilitySet::new(),
            urgency: Urgency::Soon,
            emergency_escalation: false,
            rationale: "Unable to analyze problem".to_string(),
        }
    }

    pub fn with_emergency(mut self) -> Self {
        self.emergency_escalation = true;
        self
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }

    /// Whether matching must be bypassed in favour of emergency services.
    pub fn requires_escalation(&self, escalate_on_urgent: bool) -> bool {
        self.emergency_escalation || (escalate_on_urgent && self.urgency == Urgency::Urgent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urgency_range() {
        assert_eq!(Urgency::try_from(1).unwrap(), Urgency::CanWait);
        assert_eq!(Urgency::try_from(3).unwrap(), Urgency::Urgent);
        assert!(matches!(
            Urgency::try_from(4),
            Err(PairingError::InvalidUrgency(4))
        ));
        assert!(Urgency::try_from(0).is_err());
    }

    #[test]
    fn test_urgency_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Urgency::Soon).unwrap(), "2");
        assert!(serde_json::from_str::<Urgency>("7").is_err());
    }

    #[test]
    fn test_fallback_is_conservative() {
        let fallback = RequirementExtraction::fallback();
        assert!(fallback.needed_capabilities.is_empty());
        assert_eq!(fallback.urgency, Urgency::Soon);
        assert!(!fallback.requires_escalation(true));
    }

    #[test]
    fn test_escalation_policy() {
        let urgent = RequirementExtraction::new(CapabilitySet::new(), Urgency::Urgent);
        assert!(urgent.requires_escalation(true));
        assert!(!urgent.requires_escalation(false));

        let flagged = RequirementExtraction::new(CapabilitySet::new(), Urgency::CanWait)
            .with_emergency();
        assert!(flagged.requires_escalation(false));
    }
}
