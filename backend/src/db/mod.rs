//! Lineup storage.
//!
//! Channels and their program lineups are reached through the
//! [`LineupRepository`] trait so storage backends can be swapped.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (REST API, guide sessions)           │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs) - logging, error context   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Trait (repository/) - Abstract Interface    │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌──────────────────────────────────────────────┐
//!     │             Local Repository                  │
//!     │               (in-memory)                     │
//!     └──────────────────────────────────────────────┘
//! ```

pub mod repositories;
pub mod repository;
pub mod seed;
pub mod services;

pub use repositories::LocalRepository;
pub use repository::{ErrorContext, LineupRepository, RepositoryError, RepositoryResult};
pub use seed::{apply_seed, load_seed_file, parse_seed_str, GuideSeed, SeedChannel};
