//! Domain errors for guide computation.

use crate::models::Timestamp;

/// Result type for guide operations.
pub type GuideResult<T> = Result<T, GuideError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GuideError {
    /// Window start is not strictly before its end.
    #[error("Invalid time window: start {start} must be before end {end}")]
    InvalidWindow { start: Timestamp, end: Timestamp },

    /// Lineup rejected under the `reject` malformed-lineup policy.
    #[error("Malformed lineup at program {index}: {reason}")]
    MalformedLineup { index: usize, reason: String },
}
