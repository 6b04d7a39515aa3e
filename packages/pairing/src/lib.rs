// Beastly Connect - Matching & Pairing Core
//
// Matches people asking for help with the best-suited available volunteer and
// records an exclusive pairing between them. Storage and the requirement
// analyzer sit behind kernel traits so the engine can run against in-memory
// fakes or any store that supports per-record compare-and-set.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;
