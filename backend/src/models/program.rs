//! Guide program types.
//!
//! A [`GuideProgram`] is one entry of a channel lineup. The wire format is an
//! internally tagged object keyed by `type`, matching what the scheduler emits:
//!
//! ```json
//! { "type": "flex", "start": 1709290800000, "stop": 1709294400000, "isPaused": false }
//! ```

use serde::{Deserialize, Serialize};

use super::time::Timestamp;

/// Discriminant of [`GuideProgram`], handy for logging and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramKind {
    Content,
    Custom,
    Redirect,
    Flex,
}

impl std::fmt::Display for ProgramKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ProgramKind::Content => "content",
            ProgramKind::Custom => "custom",
            ProgramKind::Redirect => "redirect",
            ProgramKind::Flex => "flex",
        };
        f.write_str(name)
    }
}

/// Scheduled library content (movie, episode, track).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentProgram {
    pub start: Timestamp,
    pub stop: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Stable id of the underlying media item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_title: Option<String>,
}

/// Slot taken by a custom show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomProgram {
    pub start: Timestamp,
    pub stop: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_show_id: Option<String>,
}

/// Slot that plays whatever another channel is airing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectProgram {
    pub start: Timestamp,
    pub stop: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_name: Option<String>,
}

/// Flex (filler) time with no concrete content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlexProgram {
    pub start: Timestamp,
    pub stop: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub is_paused: bool,
    /// Milliseconds left when the channel is paused
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_remaining: Option<i64>,
}

impl FlexProgram {
    pub fn spanning(start: Timestamp, stop: Timestamp) -> Self {
        Self {
            start,
            stop,
            title: None,
            is_paused: false,
            time_remaining: None,
        }
    }
}

/// One entry of a channel lineup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GuideProgram {
    Content(ContentProgram),
    Custom(CustomProgram),
    Redirect(RedirectProgram),
    Flex(FlexProgram),
}

impl GuideProgram {
    /// Synthetic flex program covering `[start, stop)`.
    pub fn flex(start: Timestamp, stop: Timestamp) -> Self {
        GuideProgram::Flex(FlexProgram::spanning(start, stop))
    }

    pub fn kind(&self) -> ProgramKind {
        match self {
            GuideProgram::Content(_) => ProgramKind::Content,
            GuideProgram::Custom(_) => ProgramKind::Custom,
            GuideProgram::Redirect(_) => ProgramKind::Redirect,
            GuideProgram::Flex(_) => ProgramKind::Flex,
        }
    }

    pub fn start(&self) -> Timestamp {
        match self {
            GuideProgram::Content(p) => p.start,
            GuideProgram::Custom(p) => p.start,
            GuideProgram::Redirect(p) => p.start,
            GuideProgram::Flex(p) => p.start,
        }
    }

    pub fn stop(&self) -> Timestamp {
        match self {
            GuideProgram::Content(p) => p.stop,
            GuideProgram::Custom(p) => p.stop,
            GuideProgram::Redirect(p) => p.stop,
            GuideProgram::Flex(p) => p.stop,
        }
    }

    /// Move the start boundary, keeping every other field.
    pub fn set_start(&mut self, start: Timestamp) {
        match self {
            GuideProgram::Content(p) => p.start = start,
            GuideProgram::Custom(p) => p.start = start,
            GuideProgram::Redirect(p) => p.start = start,
            GuideProgram::Flex(p) => p.start = start,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            GuideProgram::Content(p) => p.title.as_deref(),
            GuideProgram::Custom(p) => p.title.as_deref(),
            GuideProgram::Redirect(p) => p.title.as_deref(),
            GuideProgram::Flex(p) => p.title.as_deref(),
        }
    }

    /// Raw `stop - start`, may be zero or negative for malformed entries.
    pub fn duration_ms(&self) -> i64 {
        self.stop().millis_since(self.start())
    }

    pub fn is_flex(&self) -> bool {
        matches!(self, GuideProgram::Flex(_))
    }

    /// Only flex programs carry a pause flag.
    pub fn is_paused(&self) -> bool {
        matches!(self, GuideProgram::Flex(FlexProgram { is_paused: true, .. }))
    }

    pub fn time_remaining(&self) -> Option<i64> {
        match self {
            GuideProgram::Flex(p) => p.time_remaining,
            _ => None,
        }
    }

    /// Id used for content-derived colors, when the program has one.
    pub fn color_key(&self) -> Option<&str> {
        match self {
            GuideProgram::Content(p) => p.program_id.as_deref(),
            GuideProgram::Custom(p) => p.custom_show_id.as_deref(),
            GuideProgram::Redirect(p) => p.channel_id.as_deref(),
            GuideProgram::Flex(_) => None,
        }
    }

    /// Whether the program is on air at `now`.
    pub fn is_airing(&self, now: Timestamp) -> bool {
        self.start() <= now && now < self.stop()
    }
}
