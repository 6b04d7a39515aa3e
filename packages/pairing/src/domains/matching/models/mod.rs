pub mod match_result;

pub use match_result::{MatchOutcome, MatchResult};
