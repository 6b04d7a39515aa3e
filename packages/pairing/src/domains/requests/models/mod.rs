pub mod help_request;
pub mod requirement;

pub use help_request::{HelpRequest, RequestStatus};
pub use requirement::{RequirementExtraction, Urgency};
