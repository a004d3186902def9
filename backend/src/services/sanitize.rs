//! Lineup sanity checks applied before normalization.
//!
//! Upstream lineups are supposed to be ordered, contiguous and made of
//! non-empty programs. Nothing guarantees it, so the guide picks a
//! [`MalformedLineupPolicy`] per deployment.

use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{GuideError, GuideResult};
use crate::models::{ChannelId, GuideProgram, TimeWindow};

/// What to do with lineup entries that break the contiguity contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedLineupPolicy {
    /// Pass entries through as-is.
    Trust,
    /// Drop or repair offending entries and report each correction.
    #[default]
    Clamp,
    /// Fail on the first offending entry.
    Reject,
}

impl FromStr for MalformedLineupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trust" => Ok(Self::Trust),
            "clamp" => Ok(Self::Clamp),
            "reject" => Ok(Self::Reject),
            _ => Err(format!("Unknown malformed lineup policy: {}", s)),
        }
    }
}

/// A single correction made (or refused) while checking a lineup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "camelCase")]
pub enum LineupIssue {
    /// `stop <= start`
    #[serde(rename_all = "camelCase")]
    EmptyOrInverted { index: usize },
    /// No overlap with the window at all
    #[serde(rename_all = "camelCase")]
    OutsideWindow { index: usize },
    /// Starts before the previous entry stops
    #[serde(rename_all = "camelCase")]
    Overlap { index: usize, overlap_ms: i64 },
    /// Unscheduled time between two entries
    #[serde(rename_all = "camelCase")]
    Gap { index: usize, gap_ms: i64 },
}

impl LineupIssue {
    pub fn index(&self) -> usize {
        match self {
            LineupIssue::EmptyOrInverted { index }
            | LineupIssue::OutsideWindow { index }
            | LineupIssue::Overlap { index, .. }
            | LineupIssue::Gap { index, .. } => *index,
        }
    }

    fn describe(&self) -> String {
        match self {
            LineupIssue::EmptyOrInverted { .. } => "stop is not after start".to_string(),
            LineupIssue::OutsideWindow { .. } => "program lies outside the window".to_string(),
            LineupIssue::Overlap { overlap_ms, .. } => {
                format!("overlaps previous program by {} ms", overlap_ms)
            }
            LineupIssue::Gap { gap_ms, .. } => {
                format!("starts {} ms after previous program stops", gap_ms)
            }
        }
    }
}

/// Programs ready for normalization plus what was changed to get there.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedLineup {
    pub programs: Vec<GuideProgram>,
    pub issues: Vec<LineupIssue>,
}

/// Walk the lineup once, measuring every entry against the stop of the last
/// kept one. Clamp keeps the repaired programs; Reject only reads the issues.
fn clamp(window: &TimeWindow, programs: &[GuideProgram]) -> SanitizedLineup {
    let mut kept: Vec<GuideProgram> = Vec::with_capacity(programs.len());
    let mut issues = Vec::new();

    for (index, program) in programs.iter().enumerate() {
        if program.stop() <= program.start() {
            issues.push(LineupIssue::EmptyOrInverted { index });
            continue;
        }
        if !window.overlaps(program.start(), program.stop()) {
            issues.push(LineupIssue::OutsideWindow { index });
            continue;
        }

        let mut program = program.clone();
        if let Some(prev_stop) = kept.last().map(GuideProgram::stop) {
            if program.start() < prev_stop {
                issues.push(LineupIssue::Overlap {
                    index,
                    overlap_ms: prev_stop.millis_since(program.start()),
                });
                if program.stop() <= prev_stop {
                    continue;
                }
                program.set_start(prev_stop);
            } else if program.start() > prev_stop {
                issues.push(LineupIssue::Gap {
                    index,
                    gap_ms: program.start().millis_since(prev_stop),
                });
                kept.push(GuideProgram::flex(prev_stop, program.start()));
            }
        }
        kept.push(program);
    }

    SanitizedLineup {
        programs: kept,
        issues,
    }
}

/// Check `programs` against the contiguity contract under `policy`.
///
/// Leading and trailing gaps are not issues: the normalizer already fills them.
pub fn sanitize_lineup(
    channel_id: &ChannelId,
    window: &TimeWindow,
    programs: &[GuideProgram],
    policy: MalformedLineupPolicy,
) -> GuideResult<SanitizedLineup> {
    match policy {
        MalformedLineupPolicy::Trust => Ok(SanitizedLineup {
            programs: programs.to_vec(),
            issues: Vec::new(),
        }),
        MalformedLineupPolicy::Reject => match clamp(window, programs).issues.first() {
            Some(issue) => Err(GuideError::MalformedLineup {
                index: issue.index(),
                reason: issue.describe(),
            }),
            None => Ok(SanitizedLineup {
                programs: programs.to_vec(),
                issues: Vec::new(),
            }),
        },
        MalformedLineupPolicy::Clamp => {
            let sanitized = clamp(window, programs);
            for issue in &sanitized.issues {
                warn!(
                    "Channel {} program {}: {}",
                    channel_id,
                    issue.index(),
                    issue.describe()
                );
            }
            Ok(sanitized)
        }
    }
}
