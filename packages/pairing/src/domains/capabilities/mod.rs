//! Closed vocabulary of volunteer capabilities.
//!
//! Requirement sets and volunteer capability sets are both `CapabilitySet`s.
//! Free-text qualifications are parsed at the boundary and rejected with
//! `PairingError::InvalidCapability` when they are not part of the vocabulary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::common::{PairingError, Result};

/// A qualification a volunteer may hold and a request may need.
///
/// New capabilities are added as new variants; there is no catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Capability {
    #[serde(alias = "Driver's License")]
    Transportation,
    #[serde(rename = "CPRTraining", alias = "CPR Training")]
    CprTraining,
    #[serde(alias = "Medical Certification")]
    MedicalCertification,
    #[serde(alias = "First Aid Certification")]
    FirstAidCertification,
}

/// Ordered so rationale strings and snapshots are stable.
pub type CapabilitySet = BTreeSet<Capability>;

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::Transportation,
        Capability::CprTraining,
        Capability::MedicalCertification,
        Capability::FirstAidCertification,
    ];

    /// Canonical token, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Transportation => "Transportation",
            Capability::CprTraining => "CPRTraining",
            Capability::MedicalCertification => "MedicalCertification",
            Capability::FirstAidCertification => "FirstAidCertification",
        }
    }

    /// Human label used in profiles and analyzer prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Capability::Transportation => "Driver's License",
            Capability::CprTraining => "CPR Training",
            Capability::MedicalCertification => "Medical Certification",
            Capability::FirstAidCertification => "First Aid Certification",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Capability {
    type Err = PairingError;

    /// Accepts the canonical token or the human label, ignoring case and
    /// surrounding whitespace. Anything else is rejected, never guessed.
    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim();
        Capability::ALL
            .into_iter()
            .find(|c| {
                c.as_str().eq_ignore_ascii_case(token) || c.label().eq_ignore_ascii_case(token)
            })
            .ok_or_else(|| PairingError::InvalidCapability(token.to_string()))
    }
}

/// Parse a list of tokens into a capability set.
///
/// Fails on the first unknown token. Duplicates collapse.
pub fn parse_capabilities<I, S>(tokens: I) -> Result<CapabilitySet>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens.into_iter().map(|t| t.as_ref().parse()).collect()
}

/// Comma-separated list of canonical tokens, or "none".
pub fn describe(set: &CapabilitySet) -> String {
    if set.is_empty() {
        return "none".to_string();
    }
    set.iter().map(Capability::as_str).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_canonical_tokens() {
        for capability in Capability::ALL {
            assert_eq!(capability.as_str().parse::<Capability>().unwrap(), capability);
        }
    }

    #[test]
    fn test_parses_human_labels() {
        assert_eq!(
            "Driver's License".parse::<Capability>().unwrap(),
            Capability::Transportation
        );
        assert_eq!(
            " cpr training ".parse::<Capability>().unwrap(),
            Capability::CprTraining
        );
    }

    #[test]
    fn test_rejects_unknown_token() {
        let err = "Lifeguard".parse::<Capability>().unwrap_err();
        assert!(matches!(err, PairingError::InvalidCapability(ref t) if t == "Lifeguard"));
    }

    #[test]
    fn test_parse_capabilities_fails_on_any_unknown() {
        let result = parse_capabilities(["CPR Training", "Juggling"]);
        assert!(matches!(result, Err(PairingError::InvalidCapability(_))));
    }

    #[test]
    fn test_parse_capabilities_collapses_duplicates() {
        let set = parse_capabilities(["Transportation", "Driver's License"]).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_serde_accepts_labels_and_emits_canonical() {
        let parsed: Capability = serde_json::from_str("\"CPR Training\"").unwrap();
        assert_eq!(parsed, Capability::CprTraining);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"CPRTraining\"");
        assert!(serde_json::from_str::<Capability>("\"Juggling\"").is_err());
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(&CapabilitySet::new()), "none");
        let set = parse_capabilities(["FirstAidCertification", "Transportation"]).unwrap();
        assert_eq!(describe(&set), "Transportation, FirstAidCertification");
    }
}
