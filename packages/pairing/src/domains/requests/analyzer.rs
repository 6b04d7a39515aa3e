//! Requirement analysis: free text in, `RequirementExtraction` out.
//!
//! The analyzer is an outside collaborator and may fail or produce garbage.
//! `analyze_or_fallback` is the only entry point the rest of the crate uses:
//! any failure becomes the conservative fallback requirement, which never
//! escalates and matches nobody.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::common::{PairingError, Result};
use crate::domains::capabilities::{parse_capabilities, Capability};
use crate::kernel::BaseAI;

use super::models::{RequirementExtraction, Urgency};

#[async_trait]
pub trait RequirementAnalyzer: Send + Sync {
    async fn extract(
        &self,
        free_text: &str,
        urgency_hint: Option<Urgency>,
    ) -> Result<RequirementExtraction>;
}

/// Run the analyzer, substituting the fallback requirement on any failure.
pub async fn analyze_or_fallback(
    analyzer: &dyn RequirementAnalyzer,
    free_text: &str,
    urgency_hint: Option<Urgency>,
) -> RequirementExtraction {
    match analyzer.extract(free_text, urgency_hint).await {
        Ok(requirement) => requirement,
        Err(e) => {
            warn!(error = %e, "Requirement analysis failed, using fallback requirement");
            RequirementExtraction::fallback()
        }
    }
}

// =============================================================================
// Static analyzer
// =============================================================================

/// Returns the same requirement for every request.
///
/// Used when the caller already knows the requirement (manual entry) and in tests.
pub struct StaticRequirementAnalyzer {
    requirement: RequirementExtraction,
}

impl StaticRequirementAnalyzer {
    pub fn new(requirement: RequirementExtraction) -> Self {
        Self { requirement }
    }
}

#[async_trait]
impl RequirementAnalyzer for StaticRequirementAnalyzer {
    async fn extract(
        &self,
        _free_text: &str,
        urgency_hint: Option<Urgency>,
    ) -> Result<RequirementExtraction> {
        let mut requirement = self.requirement.clone();
        if let Some(hint) = urgency_hint {
            requirement.urgency = hint;
        }
        Ok(requirement)
    }
}

// =============================================================================
// LLM-backed analyzer
// =============================================================================

/// Asks an LLM to classify the request against the capability vocabulary.
pub struct AiRequirementAnalyzer<A: BaseAI> {
    ai: A,
}

/// Raw analyzer reply, before validation.
#[derive(Debug, Deserialize)]
struct AnalysisReply {
    #[serde(default)]
    needed_capabilities: Vec<String>,
    urgency: i64,
    #[serde(default)]
    call_emergency_services: bool,
    #[serde(default)]
    reason: String,
}

impl<A: BaseAI> AiRequirementAnalyzer<A> {
    pub fn new(ai: A) -> Self {
        Self { ai }
    }

    fn build_prompt(free_text: &str, urgency_hint: Option<Urgency>) -> String {
        let vocabulary = Capability::ALL
            .iter()
            .map(|c| format!("- \"{}\" ({})", c.as_str(), c.label()))
            .collect::<Vec<_>>()
            .join("\n");
        let hint = urgency_hint
            .map(|u| format!("\nThe requester rated their urgency as {}.", u))
            .unwrap_or_default();

        format!(
            r#"Analyze this request for help and respond ONLY with valid JSON.

Request: {free_text}{hint}

Determine:
1. Which capabilities a volunteer needs. Use only these exact tokens:
{vocabulary}
2. Urgency level (1 = can wait, 2 = soon, 3 = urgent).
3. Whether this needs emergency services (police, ambulance) instead of a volunteer.

Response format:
{{
    "needed_capabilities": ["Transportation"],
    "urgency": 2,
    "call_emergency_services": false,
    "reason": "brief explanation"
}}"#
        )
    }

    fn parse_reply(response: &str) -> Result<RequirementExtraction> {
        let json = extract_json_from_response(response);
        let reply: AnalysisReply = serde_json::from_str(&json)
            .map_err(|e| PairingError::AnalyzerFailure(format!("unparseable reply: {}", e)))?;

        let needed_capabilities = parse_capabilities(&reply.needed_capabilities)
            .map_err(|e| PairingError::AnalyzerFailure(e.to_string()))?;
        let urgency = Urgency::try_from(reply.urgency)
            .map_err(|e| PairingError::AnalyzerFailure(e.to_string()))?;

        Ok(RequirementExtraction {
            needed_capabilities,
            urgency,
            emergency_escalation: reply.call_emergency_services,
            rationale: reply.reason,
        })
    }
}

#[async_trait]
impl<A: BaseAI> RequirementAnalyzer for AiRequirementAnalyzer<A> {
    async fn extract(
        &self,
        free_text: &str,
        urgency_hint: Option<Urgency>,
    ) -> Result<RequirementExtraction> {
        let prompt = Self::build_prompt(free_text, urgency_hint);
        let response = self
            .ai
            .complete_json(&prompt)
            .await
            .map_err(|e| PairingError::AnalyzerFailure(e.to_string()))?;

        debug!(response_length = response.len(), "Requirement analyzer replied");

        let requirement = Self::parse_reply(&response)?;
        info!(
            urgency = %requirement.urgency,
            emergency = requirement.emergency_escalation,
            needed = requirement.needed_capabilities.len(),
            "Requirement extracted"
        );
        Ok(requirement)
    }
}

/// Extract JSON from a response that may have markdown code blocks or extra text
fn extract_json_from_response(response: &str) -> String {
    let trimmed = response.trim();

    if let Some(start) = trimmed.find("```") {
        let after_fence = start + 3;
        // Skip the language identifier if present (e.g., "json\n")
        let content_start = trimmed[after_fence..]
            .find('\n')
            .map(|i| after_fence + i + 1)
            .unwrap_or(after_fence);
        if let Some(end) = trimmed[content_start..].find("```") {
            return trimmed[content_start..content_start + end].trim().to_string();
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if end > start {
            return trimmed[start..=end].to_string();
        }
    }

    trimmed.to_string()
}
