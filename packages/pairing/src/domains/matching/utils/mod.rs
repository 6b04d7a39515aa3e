pub mod scoring;

pub use scoring::{score_volunteer, VolunteerScore};
