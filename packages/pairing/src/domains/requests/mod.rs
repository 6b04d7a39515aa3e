pub mod actions;
pub mod analyzer;
pub mod models;

pub use actions::{submit_help_request, SubmitHelpRequest};
pub use analyzer::{
    analyze_or_fallback, AiRequirementAnalyzer, RequirementAnalyzer, StaticRequirementAnalyzer,
};
pub use models::{HelpRequest, RequestStatus, RequirementExtraction, Urgency};
