//! Repository trait definitions for lineup storage.
//!
//! - [`error`]: Error types for repository operations
//! - [`lineup`]: Channel and lineup operations

pub mod error;
pub mod lineup;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use lineup::LineupRepository;
