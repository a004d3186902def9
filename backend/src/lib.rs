//! # Channel Guide Backend
//!
//! Timeline normalization and serving for a live TV-style channel guide.
//!
//! Each channel has a lineup of scheduled programs. For a display window the
//! crate trims programs to the window edges, converts durations into
//! proportional widths, patches a leading gap with flex time and appends a
//! trailing filler when programming runs out. A once-a-minute tick moves the
//! "now" marker and remaining-time labels, and guide events tell sessions
//! when to refetch.
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`models`]: Timestamps, windows, programs and rendered lineups
//! - [`services`]: Timeline normalization, presentation, settings, events and sessions
//! - [`db`]: Repository pattern and the in-memory lineup store
//! - [`source`]: Where sessions get lineups from (repository or remote HTTP)
//! - [`config`]: TOML configuration with environment overrides
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! ## Quick start
//!
//! ```
//! use channel_guide::models::{ChannelId, GuideProgram, TimeWindow, Timestamp};
//! use channel_guide::services::normalize_lineup;
//!
//! let start = Timestamp::from_millis(0);
//! let window = TimeWindow::spanning_hours(start, 1).unwrap();
//! let lineup = vec![GuideProgram::flex(start, start.plus_minutes(30))];
//!
//! let rendered = normalize_lineup(&window, &ChannelId::new("ch-1"), &lineup);
//! assert_eq!(rendered.segments.len(), 2);
//! assert!(rendered.end_of_available_programming);
//! ```

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod source;

#[cfg(feature = "http-server")]
pub mod http;

pub use error::{GuideError, GuideResult};
