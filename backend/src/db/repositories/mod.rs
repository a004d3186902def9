//! Repository implementations module.
//!
//! - `local`: In-memory implementation for local development, seeded demos and tests
pub mod local;

pub use local::LocalRepository;
