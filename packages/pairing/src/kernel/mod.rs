// Infrastructure: collaborator traits and their implementations

pub mod ai;
pub mod memory_store;
pub mod test_dependencies;
pub mod traits;

pub use ai::OpenAIClient;
pub use memory_store::{MemoryRequestStore, MemoryVolunteerStore};
pub use traits::*;
