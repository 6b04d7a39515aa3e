use tracing::{info, instrument};
use typed_builder::TypedBuilder;

use crate::common::Result;
use crate::domains::requests::analyzer::{analyze_or_fallback, RequirementAnalyzer};
use crate::domains::requests::models::{HelpRequest, Urgency};
use crate::kernel::BaseRequestStore;

/// Input for a new help request (already transcribed text).
#[derive(Debug, Clone, TypedBuilder)]
pub struct SubmitHelpRequest {
    #[builder(setter(into))]
    pub situation_text: String,
    #[builder(default, setter(into, strip_option))]
    pub requester: Option<String>,
    #[builder(default, setter(into, strip_option))]
    pub location: Option<String>,
    #[builder(default, setter(strip_option))]
    pub urgency_hint: Option<Urgency>,
    /// Set by a human (dispatcher, requester); escalates whatever the analyzer says.
    #[builder(default)]
    pub emergency: bool,
}

/// Analyze the situation text and store a new pending help request.
///
/// Analyzer failures never fail the submission; the request is stored with
/// the fallback requirement instead. An explicit `emergency` flag is applied
/// on top of whatever requirement comes back.
#[instrument(skip_all, fields(requester = ?input.requester))]
pub async fn submit_help_request(
    analyzer: &dyn RequirementAnalyzer,
    requests: &dyn BaseRequestStore,
    input: SubmitHelpRequest,
) -> Result<HelpRequest> {
    let mut requirement =
        analyze_or_fallback(analyzer, &input.situation_text, input.urgency_hint).await;
    if input.emergency && !requirement.emergency_escalation {
        info!("Emergency flagged by caller");
        requirement = requirement.with_emergency();
    }

    let request = HelpRequest {
        requester: input.requester,
        location: input.location.filter(|l| !l.trim().is_empty()),
        ..HelpRequest::builder()
            .requirement(requirement)
            .situation_text(input.situation_text)
            .build()
    };

    requests.insert(request.clone()).await?;

    info!(
        request_id = %request.id,
        urgency = %request.requirement.urgency,
        emergency = request.requirement.emergency_escalation,
        "Help request submitted"
    );

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::capabilities::Capability;
    use crate::domains::requests::analyzer::AiRequirementAnalyzer;
    use crate::domains::requests::models::{RequestStatus, RequirementExtraction};
    use crate::kernel::test_dependencies::MockAI;
    use crate::kernel::MemoryRequestStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_submit_stores_pending_request() {
        let analyzer = AiRequirementAnalyzer::new(MockAI::new().with_json_response(json!({
            "needed_capabilities": ["Transportation"],
            "urgency": 1,
            "reason": "Needs a ride"
        })));
        let store = MemoryRequestStore::new();

        let request = submit_help_request(
            &analyzer,
            &store,
            SubmitHelpRequest::builder()
                .situation_text("Drive my mother to the doctor")
                .requester("hamlet@example.com")
                .location("Minneapolis")
                .build(),
        )
        .await
        .unwrap();

        let stored = store.get(request.id).await.unwrap();
        assert_eq!(stored.status, RequestStatus::Pending);
        assert!(stored.assigned_volunteer.is_none());
        assert_eq!(stored.location.as_deref(), Some("Minneapolis"));
        assert!(stored
            .requirement
            .needed_capabilities
            .contains(&Capability::Transportation));
    }

    #[tokio::test]
    async fn test_submit_survives_analyzer_failure() {
        let analyzer = AiRequirementAnalyzer::new(MockAI::failing());
        let store = MemoryRequestStore::new();

        let request = submit_help_request(
            &analyzer,
            &store,
            SubmitHelpRequest::builder().situation_text("???").build(),
        )
        .await
        .unwrap();

        assert_eq!(request.requirement, RequirementExtraction::fallback());
    }

    #[tokio::test]
    async fn test_caller_emergency_overrides_analyzer() {
        let analyzer = AiRequirementAnalyzer::new(MockAI::new().with_json_response(json!({
            "needed_capabilities": ["FirstAidCertification"],
            "urgency": 1,
            "call_emergency_services": false,
            "reason": "Minor cut"
        })));
        let store = MemoryRequestStore::new();

        let request = submit_help_request(
            &analyzer,
            &store,
            SubmitHelpRequest::builder()
                .situation_text("He is bleeding a lot")
                .emergency(true)
                .build(),
        )
        .await
        .unwrap();

        assert!(request.requirement.emergency_escalation);
        assert_eq!(request.requirement.rationale, "Minor cut");
        assert!(store.get(request.id).await.unwrap().requirement.requires_escalation(false));
    }

    #[tokio::test]
    async fn test_caller_emergency_survives_analyzer_failure() {
        let analyzer = AiRequirementAnalyzer::new(MockAI::failing());
        let store = MemoryRequestStore::new();

        let request = submit_help_request(
            &analyzer,
            &store,
            SubmitHelpRequest::builder()
                .situation_text("???")
                .emergency(true)
                .build(),
        )
        .await
        .unwrap();

        assert!(request.requirement.emergency_escalation);
        assert!(request.requirement.needed_capabilities.is_empty());
    }

    #[tokio::test]
    async fn test_request_ids_are_time_ordered() {
        let analyzer = AiRequirementAnalyzer::new(MockAI::failing());
        let store = MemoryRequestStore::new();
        let input = SubmitHelpRequest::builder().situation_text("x").build();

        let first = submit_help_request(&analyzer, &store, input.clone()).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = submit_help_request(&analyzer, &store, input).await.unwrap();

        assert!(first.id < second.id);
    }
}
