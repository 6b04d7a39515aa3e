use serde::{Deserialize, Serialize};

use crate::domains::volunteers::VolunteerRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    /// Emergency services instead of a volunteer; no registry access happened.
    Escalated,
    Matched,
    NoMatch,
}

/// Output of one matching pass. Nothing is mutated until it is committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub volunteer: Option<VolunteerRecord>,
    pub score: f64,
    pub rationale: String,
    pub outcome: MatchOutcome,
}

impl MatchResult {
    pub fn escalated(rationale: impl Into<String>) -> Self {
        Self {
            volunteer: None,
            score: 0.0,
            rationale: rationale.into(),
            outcome: MatchOutcome::Escalated,
        }
    }

    pub fn no_match(rationale: impl Into<String>) -> Self {
        Self {
            volunteer: None,
            score: 0.0,
            rationale: rationale.into(),
            outcome: MatchOutcome::NoMatch,
        }
    }

    pub fn matched(volunteer: VolunteerRecord, score: f64, rationale: impl Into<String>) -> Self {
        Self {
            volunteer: Some(volunteer),
            score,
            rationale: rationale.into(),
            outcome: MatchOutcome::Matched,
        }
    }
}
