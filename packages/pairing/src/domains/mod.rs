pub mod capabilities;
pub mod matching;
pub mod requests;
pub mod volunteers;
