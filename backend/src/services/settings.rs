//! Guide display settings.
//!
//! Settings are plain values. Changes go through [`GuideSettings::reduce`],
//! which returns a new value and leaves the old one untouched, so a session
//! can hold on to the settings it rendered with.

use serde::{Deserialize, Serialize};

use super::presentation::{Viewport, DEFAULT_PALETTE};
use super::sanitize::MalformedLineupPolicy;
use crate::error::GuideResult;
use crate::models::{TimeWindow, Timestamp};

pub const MIN_WINDOW_HOURS: u32 = 1;
pub const MAX_WINDOW_HOURS: u32 = 12;
pub const DEFAULT_WINDOW_HOURS: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideSettings {
    pub viewport: Viewport,
    pub window_hours: u32,
    pub malformed_policy: MalformedLineupPolicy,
    pub palette: Vec<String>,
    pub show_remaining_time: bool,
}

impl Default for GuideSettings {
    fn default() -> Self {
        Self {
            viewport: Viewport::Wide,
            window_hours: DEFAULT_WINDOW_HOURS,
            malformed_policy: MalformedLineupPolicy::default(),
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            show_remaining_time: true,
        }
    }
}

/// A single change to [`GuideSettings`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "camelCase")]
pub enum SettingsAction {
    SetViewport(Viewport),
    ZoomIn,
    ZoomOut,
    SetWindowHours(u32),
    SetPolicy(MalformedLineupPolicy),
    SetPalette(Vec<String>),
    ToggleRemainingTime,
}

fn clamp_hours(hours: u32) -> u32 {
    hours.clamp(MIN_WINDOW_HOURS, MAX_WINDOW_HOURS)
}

impl GuideSettings {
    /// Apply `action` and return the resulting settings.
    pub fn reduce(&self, action: SettingsAction) -> GuideSettings {
        let mut next = self.clone();
        match action {
            SettingsAction::SetViewport(viewport) => next.viewport = viewport,
            // Zooming in shows fewer hours.
            SettingsAction::ZoomIn => next.window_hours = clamp_hours(self.window_hours.saturating_sub(1)),
            SettingsAction::ZoomOut => next.window_hours = clamp_hours(self.window_hours.saturating_add(1)),
            SettingsAction::SetWindowHours(hours) => next.window_hours = clamp_hours(hours),
            SettingsAction::SetPolicy(policy) => next.malformed_policy = policy,
            SettingsAction::SetPalette(palette) => next.palette = palette,
            SettingsAction::ToggleRemainingTime => {
                next.show_remaining_time = !self.show_remaining_time
            }
        }
        next
    }

    /// Apply a sequence of actions in order.
    pub fn reduce_all<I>(&self, actions: I) -> GuideSettings
    where
        I: IntoIterator<Item = SettingsAction>,
    {
        actions
            .into_iter()
            .fold(self.clone(), |settings, action| settings.reduce(action))
    }

    /// Window of `window_hours` beginning at `start`.
    pub fn window_at(&self, start: Timestamp) -> GuideResult<TimeWindow> {
        TimeWindow::spanning_hours(start, clamp_hours(self.window_hours))
    }
}
