mod submit;

pub use submit::{submit_help_request, SubmitHelpRequest};
