pub mod models;

pub use models::profile::VolunteerProfile;
pub use models::volunteer::VolunteerRecord;
