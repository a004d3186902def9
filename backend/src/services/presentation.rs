//! Presentation hints for rendered segments: detail thresholds and fills.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::str::FromStr;

use crate::models::RenderedSegment;

/// Segment width (percent) above which secondary text fits on wide screens.
pub const WIDE_DETAIL_THRESHOLD: f64 = 8.0;
/// Same threshold on narrow screens.
pub const NARROW_DETAIL_THRESHOLD: f64 = 20.0;

/// Alternating colors used when a segment has no content-derived color.
pub const DEFAULT_PALETTE: [&str; 2] = ["#4c6ef5", "#7950f2"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Viewport {
    #[default]
    Wide,
    Narrow,
}

impl FromStr for Viewport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wide" | "desktop" => Ok(Self::Wide),
            "narrow" | "mobile" => Ok(Self::Narrow),
            _ => Err(format!("Unknown viewport: {}", s)),
        }
    }
}

impl Viewport {
    pub fn detail_threshold(&self) -> f64 {
        match self {
            Viewport::Wide => WIDE_DETAIL_THRESHOLD,
            Viewport::Narrow => NARROW_DETAIL_THRESHOLD,
        }
    }
}

/// Whether a segment is wide enough for start/stop labels and remaining time.
pub fn show_details(width_percent: f64, viewport: Viewport) -> bool {
    width_percent > viewport.detail_threshold()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FillPattern {
    Solid,
    /// "No concrete content" time: flex, paused, or trailing filler
    DiagonalStripe,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentFill {
    pub pattern: FillPattern,
    pub color: String,
}

/// `#rrggbb` derived from the first three bytes of SHA-256(key).
pub fn color_for_key(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    format!("#{}", hex::encode(&digest[..3]))
}

fn palette_color(index: usize, palette: &[String]) -> String {
    if palette.is_empty() {
        return DEFAULT_PALETTE[index % DEFAULT_PALETTE.len()].to_string();
    }
    palette[index % palette.len()].clone()
}

/// Pick the fill for the segment at `index` of a row.
pub fn segment_fill(index: usize, segment: &RenderedSegment, palette: &[String]) -> SegmentFill {
    let striped = segment.is_filler_block
        || segment
            .program
            .as_ref()
            .is_some_and(|p| p.is_flex() || p.is_paused());

    let color = segment
        .program
        .as_ref()
        .and_then(|p| p.color_key())
        .map(color_for_key)
        .unwrap_or_else(|| palette_color(index, palette));

    SegmentFill {
        pattern: if striped {
            FillPattern::DiagonalStripe
        } else {
            FillPattern::Solid
        },
        color,
    }
}
