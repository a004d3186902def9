use serde::{Deserialize, Serialize};

use super::program::GuideProgram;

/// Opaque channel identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub String);

impl ChannelId {
    pub fn new(value: impl Into<String>) -> Self {
        ChannelId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(v: &str) -> Self {
        ChannelId(v.to_string())
    }
}

/// Channel as listed in the guide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: ChannelId,
    pub number: u32,
    pub name: String,
}

/// Body of `GET /v1/channels`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelList {
    pub channels: Vec<Channel>,
    pub total: usize,
}

impl From<Vec<Channel>> for ChannelList {
    fn from(channels: Vec<Channel>) -> Self {
        let total = channels.len();
        Self { channels, total }
    }
}

/// Ordered programs for one channel.
///
/// Entries are expected to be contiguous (`programs[i].stop == programs[i + 1].start`)
/// but nothing here enforces it; see [`crate::services::sanitize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelLineup {
    pub channel_id: ChannelId,
    #[serde(default)]
    pub programs: Vec<GuideProgram>,
}

/// One proportionally sized block of a rendered timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedSegment {
    /// Share of the window, in percent rounded to 2 decimals
    pub width_percent: f64,
    /// `None` for the trailing "no programming" filler
    pub program: Option<GuideProgram>,
    pub is_filler_block: bool,
}

impl RenderedSegment {
    pub fn program(width_percent: f64, program: GuideProgram) -> Self {
        Self {
            width_percent,
            program: Some(program),
            is_filler_block: false,
        }
    }

    pub fn filler(width_percent: f64) -> Self {
        Self {
            width_percent,
            program: None,
            is_filler_block: true,
        }
    }

    /// Layout width, e.g. `"37.50%"`.
    pub fn css_width(&self) -> String {
        format!("{:.2}%", self.width_percent)
    }
}

/// Rendered timeline for one channel and window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedLineup {
    pub channel_id: ChannelId,
    pub segments: Vec<RenderedSegment>,
    /// The last known program stops before the window ends
    pub end_of_available_programming: bool,
    pub total_program_duration_ms: i64,
}

impl RenderedLineup {
    pub fn total_width(&self) -> f64 {
        self.segments.iter().map(|s| s.width_percent).sum()
    }
}
