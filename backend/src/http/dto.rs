//! Data Transfer Objects for the HTTP API.
//!
//! Lineups, rows and snapshots are serialized straight from the model and
//! service types; only request/response envelopes live here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GuideResult;
use crate::models::{ChannelId, GuideProgram, TimeWindow, Timestamp};
use crate::services::presentation::Viewport;

/// `?from=..&to=..[&now=..][&viewport=..]` for window-scoped endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    /// Instant used for the now-marker; defaults to the server clock
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
    #[serde(default)]
    pub viewport: Option<Viewport>,
}

impl WindowQuery {
    pub fn window(&self) -> GuideResult<TimeWindow> {
        TimeWindow::from_datetimes(self.from, self.to)
    }

    pub fn now_or(&self, fallback: Timestamp) -> Timestamp {
        self.now.map(Timestamp::from_datetime).unwrap_or(fallback)
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub repository: String,
}

/// Body of `PUT /v1/channels/{id}/lineup`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineupUpdateRequest {
    pub programs: Vec<GuideProgram>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineupUpdateResponse {
    pub channel_id: ChannelId,
    pub program_count: usize,
    /// Event subscribers that received the `lineupUpdated` event
    pub subscribers_notified: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidateResponse {
    pub subscribers_notified: usize,
}
