//! Test fixtures for building volunteer pools and help requests.

#![allow(dead_code)]

use pairing_core::common::RequestId;
use pairing_core::domains::capabilities::Capability;
use pairing_core::domains::requests::{HelpRequest, RequirementExtraction, Urgency};
use pairing_core::domains::volunteers::VolunteerRecord;
use pairing_core::kernel::{BaseRequestStore, MemoryRequestStore};

/// Volunteer with the given capabilities and nothing else.
pub fn volunteer(name: &str, capabilities: &[Capability]) -> VolunteerRecord {
    VolunteerRecord::new(name, capabilities.iter().copied().collect())
}

/// Requirement needing `capabilities` at urgency 2.
pub fn needs(capabilities: &[Capability]) -> RequirementExtraction {
    RequirementExtraction::new(capabilities.iter().copied().collect(), Urgency::Soon)
}

/// Store a pending request for `requirement` and return its id.
pub async fn create_request(
    store: &MemoryRequestStore,
    requirement: RequirementExtraction,
    location: Option<&str>,
) -> RequestId {
    let request = match location {
        Some(location) => HelpRequest::builder()
            .requirement(requirement)
            .location(location)
            .build(),
        None => HelpRequest::builder().requirement(requirement).build(),
    };
    let id = request.id;
    store.insert(request).await.unwrap();
    id
}
