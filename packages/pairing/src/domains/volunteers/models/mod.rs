pub mod profile;
pub mod volunteer;
