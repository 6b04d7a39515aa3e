//! Integration tests for the matching engine.
//!
//! Escalation short-circuit, candidate selection and tie-breaks against
//! in-memory stores.

mod common;

use std::sync::Arc;

use crate::common::{create_request, needs, volunteer};
use pairing_core::common::RequestId;
use pairing_core::domains::capabilities::Capability;
use pairing_core::domains::matching::{EngineConfig, MatchOutcome, MatchingEngine};
use pairing_core::domains::requests::{
    analyze_or_fallback, AiRequirementAnalyzer, RequirementExtraction, Urgency,
};
use pairing_core::kernel::test_dependencies::{MockAI, PanickingVolunteerStore};
use pairing_core::kernel::{BaseVolunteerStore, MemoryRequestStore, MemoryVolunteerStore};

fn engine(
    volunteers: Arc<dyn BaseVolunteerStore>,
    requests: Arc<MemoryRequestStore>,
) -> MatchingEngine {
    MatchingEngine::new(volunteers, requests, EngineConfig::default())
}

// =============================================================================
// Escalation
// =============================================================================

/// An emergency never reaches the registry; the stub panics if it does.
#[tokio::test]
async fn emergency_escalates_without_touching_registry() {
    let requests = Arc::new(MemoryRequestStore::new());
    let id = create_request(
        &requests,
        needs(&[Capability::CprTraining]).with_emergency(),
        None,
    )
    .await;

    let result = engine(Arc::new(PanickingVolunteerStore), requests)
        .match_request(id)
        .await
        .unwrap();

    assert_eq!(result.outcome, MatchOutcome::Escalated);
    assert!(result.volunteer.is_none());
}

/// Urgency 3 escalates on its own under the default policy.
#[tokio::test]
async fn urgent_request_escalates_by_default() {
    let requests = Arc::new(MemoryRequestStore::new());
    let id = create_request(
        &requests,
        RequirementExtraction::new([Capability::CprTraining].into(), Urgency::Urgent),
        None,
    )
    .await;

    let result = engine(Arc::new(PanickingVolunteerStore), requests)
        .match_request(id)
        .await
        .unwrap();

    assert_eq!(result.outcome, MatchOutcome::Escalated);
}

/// With the urgent policy off, only the explicit flag escalates.
#[tokio::test]
async fn urgent_request_matches_when_policy_disabled() {
    let requests = Arc::new(MemoryRequestStore::new());
    let id = create_request(
        &requests,
        RequirementExtraction::new([Capability::CprTraining].into(), Urgency::Urgent),
        None,
    )
    .await;
    let volunteers = Arc::new(MemoryVolunteerStore::from_records([volunteer(
        "medic",
        &[Capability::CprTraining],
    )]));

    let config = EngineConfig {
        escalate_on_urgent: false,
        ..EngineConfig::default()
    };
    let result = MatchingEngine::new(volunteers, requests, config)
        .match_request(id)
        .await
        .unwrap();

    assert_eq!(result.outcome, MatchOutcome::Matched);
}

// =============================================================================
// Selection
// =============================================================================

/// Transportation need: driver with a vehicle (1.5) beats a medic who matches nothing.
#[tokio::test]
async fn driver_wins_transportation_request() {
    let requests = Arc::new(MemoryRequestStore::new());
    let id = create_request(&requests, needs(&[Capability::Transportation]), None).await;
    let volunteers = Arc::new(MemoryVolunteerStore::from_records([
        volunteer("B", &[Capability::MedicalCertification]),
        volunteer("A", &[Capability::Transportation]).with_vehicle(),
    ]));

    let result = engine(volunteers, requests).match_request(id).await.unwrap();

    assert_eq!(result.outcome, MatchOutcome::Matched);
    assert_eq!(result.volunteer.unwrap().name, "A");
    assert_eq!(result.score, 1.5);
}

/// Equal scores fall to the higher qualification count.
#[tokio::test]
async fn tie_broken_by_qualification_count() {
    let pair = [Capability::Transportation, Capability::FirstAidCertification];
    let requests = Arc::new(MemoryRequestStore::new());
    let id = create_request(&requests, needs(&pair), None).await;
    let volunteers = Arc::new(MemoryVolunteerStore::from_records([
        volunteer("three", &pair).with_qualification_count(3),
        volunteer("four", &pair).with_qualification_count(4),
    ]));

    let result = engine(volunteers, requests).match_request(id).await.unwrap();

    assert_eq!(result.score, 2.0);
    assert_eq!(result.volunteer.unwrap().name, "four");
}

/// Location bonus decides between otherwise identical volunteers.
#[tokio::test]
async fn location_bonus_breaks_equal_capabilities() {
    let requests = Arc::new(MemoryRequestStore::new());
    let id = create_request(
        &requests,
        needs(&[Capability::FirstAidCertification]),
        Some("st. paul"),
    )
    .await;
    let volunteers = Arc::new(MemoryVolunteerStore::from_records([
        volunteer("far", &[Capability::FirstAidCertification]).with_location("Duluth"),
        volunteer("near", &[Capability::FirstAidCertification]).with_location("St. Paul"),
    ]));

    let result = engine(volunteers, requests).match_request(id).await.unwrap();

    assert_eq!(result.volunteer.unwrap().name, "near");
    assert_eq!(result.score, 1.5);
}

/// A paired volunteer is neither listed nor selected.
#[tokio::test]
async fn paired_volunteer_is_skipped() {
    let requests = Arc::new(MemoryRequestStore::new());
    let id = create_request(&requests, needs(&[Capability::CprTraining]), None).await;
    let busy = volunteer("busy", &Capability::ALL);
    let volunteers = Arc::new(MemoryVolunteerStore::from_records([
        busy.clone(),
        volunteer("free", &[Capability::CprTraining]),
    ]));
    volunteers.try_assign(busy.id, RequestId::new()).await.unwrap();

    let eligible = volunteers.list_eligible().await.unwrap();
    assert!(eligible.iter().all(|v| v.id != busy.id));

    let result = engine(volunteers, requests).match_request(id).await.unwrap();
    assert_eq!(result.volunteer.unwrap().name, "free");
}

/// Analyzer garbage falls back to an empty requirement, which matches nobody.
#[tokio::test]
async fn analyzer_fallback_yields_no_match() {
    let analyzer = AiRequirementAnalyzer::new(MockAI::new().with_response("not json at all"));
    let requirement = analyze_or_fallback(&analyzer, "please help", None).await;
    assert_eq!(requirement.urgency, Urgency::Soon);

    let requests = Arc::new(MemoryRequestStore::new());
    let id = create_request(&requests, requirement, None).await;
    let volunteers = Arc::new(MemoryVolunteerStore::from_records([volunteer(
        "everything",
        &Capability::ALL,
    )]));

    let result = engine(volunteers, requests).match_request(id).await.unwrap();

    assert_eq!(result.outcome, MatchOutcome::NoMatch);
    assert!(result.volunteer.is_none());
}

/// Unknown request ids surface as not-found.
#[tokio::test]
async fn unknown_request_is_not_found() {
    let requests = Arc::new(MemoryRequestStore::new());
    let err = engine(Arc::new(MemoryVolunteerStore::new()), requests)
        .match_request(RequestId::new())
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

/// Matching is read-only: running it leaves every volunteer unpaired.
#[tokio::test]
async fn matching_does_not_mutate_registry() {
    let requests = Arc::new(MemoryRequestStore::new());
    let id = create_request(&requests, needs(&[Capability::CprTraining]), None).await;
    let volunteers = Arc::new(MemoryVolunteerStore::from_records([volunteer(
        "medic",
        &[Capability::CprTraining],
    )]));

    let engine = engine(volunteers.clone(), requests);
    engine.match_request(id).await.unwrap();
    engine.match_request(id).await.unwrap();

    assert_eq!(volunteers.list_eligible().await.unwrap().len(), 1);
}
