//! Guide snapshots and the session that keeps one up to date.
//!
//! [`render_row`] and [`render_snapshot`] are pure: lineup + window + now +
//! settings in, decorated rows out. [`GuideSession`] adds the stateful part:
//! it fetches lineups from a [`LineupSource`], tracks loading/failed/ready,
//! and recomputes on ticks and guide events.

use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

use super::events::{GuideEventKind, GuideSubscription};
use super::presentation::{segment_fill, show_details, SegmentFill};
use super::sanitize::{sanitize_lineup, LineupIssue};
use super::settings::{GuideSettings, SettingsAction};
use super::timeline::{normalize_lineup, progress, remaining_minutes};
use crate::error::GuideResult;
use crate::models::{Channel, ChannelId, GuideProgram, RenderedSegment, TimeWindow, Timestamp};
use crate::source::LineupSource;

/// Secondary text shown on segments wide enough to hold it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentLabels {
    pub start: Timestamp,
    pub stop: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_minutes: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentView {
    #[serde(flatten)]
    pub segment: RenderedSegment,
    pub css_width: String,
    pub fill: SegmentFill,
    /// `None` when the segment is too narrow for secondary text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<SegmentLabels>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideRow {
    pub channel: Channel,
    pub segments: Vec<SegmentView>,
    pub end_of_available_programming: bool,
    pub total_program_duration_ms: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<LineupIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideSnapshot {
    pub window: TimeWindow,
    pub now: Timestamp,
    /// Now-marker position, absent when `now` is outside the window
    pub progress: Option<f64>,
    pub rows: Vec<GuideRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "data", rename_all = "camelCase")]
pub enum GuideViewState {
    Loading,
    Failed(String),
    Ready(GuideSnapshot),
}

impl GuideViewState {
    pub fn snapshot(&self) -> Option<&GuideSnapshot> {
        match self {
            GuideViewState::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}

fn decorate(
    index: usize,
    segment: RenderedSegment,
    now: Timestamp,
    settings: &GuideSettings,
) -> SegmentView {
    let fill = segment_fill(index, &segment, &settings.palette);
    let labels = match &segment.program {
        Some(program) if show_details(segment.width_percent, settings.viewport) => {
            Some(SegmentLabels {
                start: program.start(),
                stop: program.stop(),
                remaining_minutes: if settings.show_remaining_time {
                    remaining_minutes(program, now)
                } else {
                    None
                },
            })
        }
        _ => None,
    };
    SegmentView {
        css_width: segment.css_width(),
        fill,
        labels,
        segment,
    }
}

/// Sanitize, normalize and decorate one channel's lineup.
pub fn render_row(
    channel: &Channel,
    window: &TimeWindow,
    programs: &[GuideProgram],
    now: Timestamp,
    settings: &GuideSettings,
) -> GuideResult<GuideRow> {
    let sanitized = sanitize_lineup(&channel.id, window, programs, settings.malformed_policy)?;
    let rendered = normalize_lineup(window, &channel.id, &sanitized.programs);
    let segments = rendered
        .segments
        .into_iter()
        .enumerate()
        .map(|(index, segment)| decorate(index, segment, now, settings))
        .collect();

    Ok(GuideRow {
        channel: channel.clone(),
        segments,
        end_of_available_programming: rendered.end_of_available_programming,
        total_program_duration_ms: rendered.total_program_duration_ms,
        issues: sanitized.issues,
    })
}

/// Render every channel of the guide for `window` at `now`.
pub fn render_snapshot(
    window: &TimeWindow,
    now: Timestamp,
    settings: &GuideSettings,
    lineups: &[(Channel, Vec<GuideProgram>)],
) -> GuideResult<GuideSnapshot> {
    let rows = lineups
        .iter()
        .map(|(channel, programs)| render_row(channel, window, programs, now, settings))
        .collect::<GuideResult<Vec<_>>>()?;

    Ok(GuideSnapshot {
        window: *window,
        now,
        progress: progress(window, now),
        rows,
    })
}

/// Live guide for one window.
pub struct GuideSession {
    source: Arc<dyn LineupSource>,
    settings: GuideSettings,
    window: TimeWindow,
    now: Timestamp,
    lineups: Option<Vec<(Channel, Vec<GuideProgram>)>>,
    state: GuideViewState,
}

impl GuideSession {
    /// New session in the `Loading` state; call [`GuideSession::refresh`] to fetch.
    pub fn new(
        source: Arc<dyn LineupSource>,
        settings: GuideSettings,
        window: TimeWindow,
        now: Timestamp,
    ) -> Self {
        Self {
            source,
            settings,
            window,
            now,
            lineups: None,
            state: GuideViewState::Loading,
        }
    }

    pub fn state(&self) -> &GuideViewState {
        &self.state
    }

    pub fn settings(&self) -> &GuideSettings {
        &self.settings
    }

    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    async fn fetch_all(&self) -> Result<Vec<(Channel, Vec<GuideProgram>)>, String> {
        let channels = self
            .source
            .list_channels()
            .await
            .map_err(|e| e.to_string())?;
        let mut lineups = Vec::with_capacity(channels.len());
        for channel in channels {
            let lineup = self
                .source
                .fetch_lineup(&channel.id, &self.window)
                .await
                .map_err(|e| e.to_string())?;
            lineups.push((channel, lineup.programs));
        }
        Ok(lineups)
    }

    fn recompute(&mut self) {
        let Some(lineups) = &self.lineups else {
            return;
        };
        self.state = match render_snapshot(&self.window, self.now, &self.settings, lineups) {
            Ok(snapshot) => GuideViewState::Ready(snapshot),
            Err(e) => GuideViewState::Failed(e.to_string()),
        };
    }

    /// Refetch every channel. No retry: a failure leaves the session `Failed`
    /// until the next refresh.
    pub async fn refresh(&mut self) -> &GuideViewState {
        self.state = GuideViewState::Loading;
        match self.fetch_all().await {
            Ok(lineups) => {
                debug!("Guide refresh fetched {} channels", lineups.len());
                self.lineups = Some(lineups);
                self.recompute();
            }
            Err(message) => {
                error!("Guide refresh failed: {}", message);
                self.lineups = None;
                self.state = GuideViewState::Failed(message);
            }
        }
        &self.state
    }

    /// Refetch one channel, falling back to a full refresh when the channel
    /// is not part of the current guide.
    pub async fn refresh_channel(&mut self, channel_id: &ChannelId) -> &GuideViewState {
        let known = self
            .lineups
            .as_ref()
            .is_some_and(|l| l.iter().any(|(c, _)| &c.id == channel_id));
        if !known {
            return self.refresh().await;
        }

        match self.source.fetch_lineup(channel_id, &self.window).await {
            Ok(lineup) => {
                if let Some(lineups) = self.lineups.as_mut() {
                    for (channel, programs) in lineups.iter_mut() {
                        if &channel.id == channel_id {
                            *programs = lineup.programs.clone();
                        }
                    }
                }
                self.recompute();
            }
            Err(e) => {
                error!("Refreshing channel {} failed: {}", channel_id, e);
                self.lineups = None;
                self.state = GuideViewState::Failed(e.to_string());
            }
        }
        &self.state
    }

    /// Recompute from cached lineups with a new "now".
    pub fn on_tick(&mut self, now: Timestamp) -> &GuideViewState {
        self.now = now;
        self.recompute();
        &self.state
    }

    /// Tick for a live guide. Once `now` reaches the end of the window the
    /// session slides to a new window starting at `now` and refetches.
    pub async fn advance(&mut self, now: Timestamp) -> &GuideViewState {
        if now < self.window.end() {
            return self.on_tick(now);
        }
        self.now = now;
        match self.settings.window_at(now) {
            Ok(window) => {
                info!("Guide window elapsed, sliding to {}", now);
                self.set_window(window);
                self.refresh().await
            }
            Err(e) => {
                self.lineups = None;
                self.state = GuideViewState::Failed(e.to_string());
                &self.state
            }
        }
    }

    pub fn apply_settings(&mut self, action: SettingsAction) -> &GuideViewState {
        self.settings = self.settings.reduce(action);
        self.recompute();
        &self.state
    }

    /// Move to another window. Cached lineups no longer apply, so the session
    /// goes back to `Loading` until the next refresh.
    pub fn set_window(&mut self, window: TimeWindow) {
        self.window = window;
        self.lineups = None;
        self.state = GuideViewState::Loading;
    }

    fn remove_channel(&mut self, channel_id: &ChannelId) {
        if let Some(lineups) = self.lineups.as_mut() {
            lineups.retain(|(c, _)| &c.id != channel_id);
        }
        self.recompute();
    }

    pub async fn handle_event(&mut self, kind: &GuideEventKind) -> &GuideViewState {
        match kind {
            GuideEventKind::LineupUpdated { channel_id } => self.refresh_channel(channel_id).await,
            GuideEventKind::ChannelRemoved { channel_id } => {
                self.remove_channel(channel_id);
                &self.state
            }
            GuideEventKind::GuideInvalidated => self.refresh().await,
        }
    }

    /// Drive the session until the tick source goes away or nobody is
    /// watching `states` any more. Every state change is published.
    pub async fn run(
        mut self,
        mut ticks: watch::Receiver<Timestamp>,
        mut events: GuideSubscription,
        states: watch::Sender<GuideViewState>,
    ) {
        let _ = states.send(self.refresh().await.clone());
        let mut events_open = true;

        loop {
            tokio::select! {
                changed = ticks.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let now = *ticks.borrow_and_update();
                    self.advance(now).await;
                }
                event = events.recv(), if events_open => {
                    match event {
                        Some(event) => {
                            self.handle_event(&event.kind).await;
                        }
                        None => {
                            events_open = false;
                            continue;
                        }
                    }
                }
                _ = states.closed() => break,
            }

            if states.send(self.state.clone()).is_err() {
                break;
            }
        }
        info!("Guide session stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::models::{ContentProgram, FlexProgram, MS_PER_MINUTE};
    use crate::services::presentation::{FillPattern, Viewport};
    use crate::services::sanitize::MalformedLineupPolicy;
    use crate::source::RepositorySource;

    fn at(minutes: i64) -> Timestamp {
        Timestamp::from_millis(0).plus_minutes(minutes)
    }

    fn channel() -> Channel {
        Channel {
            id: ChannelId::new("ch-1"),
            number: 1,
            name: "One".to_string(),
        }
    }

    fn content(start: i64, stop: i64) -> GuideProgram {
        GuideProgram::Content(ContentProgram {
            start: at(start),
            stop: at(stop),
            title: Some("Feature".to_string()),
            program_id: None,
            episode_title: None,
        })
    }

    fn window() -> TimeWindow {
        TimeWindow::new(at(0), at(120)).unwrap()
    }

    #[test]
    fn test_render_row_labels_wide_segments_only() {
        let programs = vec![content(0, 5), content(5, 120)];
        let row = render_row(&channel(), &window(), &programs, at(10), &GuideSettings::default())
            .unwrap();
        // 5 of 120 minutes is 4.17%, below the wide threshold.
        assert!(row.segments[0].labels.is_none());
        let labels = row.segments[1].labels.as_ref().unwrap();
        assert_eq!(labels.remaining_minutes, Some(110));
        assert_eq!(row.segments[1].css_width, "95.83%");
    }

    #[test]
    fn test_narrow_viewport_raises_threshold() {
        let programs = vec![content(0, 18), content(18, 120)];
        let settings = GuideSettings::default().reduce(SettingsAction::SetViewport(Viewport::Narrow));
        let row = render_row(&channel(), &window(), &programs, at(0), &settings).unwrap();
        // 18 of 120 minutes is 15%: enough on wide screens, not on narrow ones.
        assert!(row.segments[0].labels.is_none());
        let wide = render_row(&channel(), &window(), &programs, at(0), &GuideSettings::default())
            .unwrap();
        assert!(wide.segments[0].labels.is_some());
    }

    #[test]
    fn test_remaining_time_can_be_hidden() {
        let settings = GuideSettings::default().reduce(SettingsAction::ToggleRemainingTime);
        let row = render_row(&channel(), &window(), &[content(0, 120)], at(30), &settings).unwrap();
        assert_eq!(row.segments[0].labels.as_ref().unwrap().remaining_minutes, None);
    }

    #[test]
    fn test_paused_flex_is_striped() {
        let paused = GuideProgram::Flex(FlexProgram {
            is_paused: true,
            time_remaining: Some(30 * MS_PER_MINUTE),
            ..FlexProgram::spanning(at(0), at(120))
        });
        let row = render_row(&channel(), &window(), &[paused], at(10), &GuideSettings::default())
            .unwrap();
        assert_eq!(row.segments[0].fill.pattern, FillPattern::DiagonalStripe);
        assert_eq!(
            row.segments[0].labels.as_ref().unwrap().remaining_minutes,
            Some(30)
        );
    }

    #[test]
    fn test_reject_policy_fails_snapshot() {
        let settings =
            GuideSettings::default().reduce(SettingsAction::SetPolicy(MalformedLineupPolicy::Reject));
        let lineups = vec![(channel(), vec![content(30, 10)])];
        assert!(render_snapshot(&window(), at(0), &settings, &lineups).is_err());
    }

    #[test]
    fn test_snapshot_progress() {
        let lineups = vec![(channel(), vec![content(0, 120)])];
        let snapshot =
            render_snapshot(&window(), at(60), &GuideSettings::default(), &lineups).unwrap();
        assert_eq!(snapshot.progress, Some(50.0));
        let later = render_snapshot(&window(), at(150), &GuideSettings::default(), &lineups).unwrap();
        assert_eq!(later.progress, None);
    }

    fn seeded_source() -> (LocalRepository, Arc<dyn LineupSource>) {
        let repo = LocalRepository::new();
        repo.insert_channel(channel());
        repo.insert_lineup(&channel().id, vec![content(0, 60)]);
        let source: Arc<dyn LineupSource> = Arc::new(RepositorySource::new(Arc::new(repo.clone())));
        (repo, source)
    }

    #[tokio::test]
    async fn test_session_loading_then_ready() {
        let (_repo, source) = seeded_source();
        let mut session = GuideSession::new(source, GuideSettings::default(), window(), at(0));
        assert_eq!(session.state(), &GuideViewState::Loading);

        let state = session.refresh().await;
        let snapshot = state.snapshot().unwrap();
        assert_eq!(snapshot.rows.len(), 1);
        assert!(snapshot.rows[0].end_of_available_programming);
    }

    #[tokio::test]
    async fn test_session_fetch_failure() {
        let (repo, source) = seeded_source();
        repo.set_healthy(false);
        let mut session = GuideSession::new(source, GuideSettings::default(), window(), at(0));
        assert!(matches!(session.refresh().await, GuideViewState::Failed(_)));
    }

    #[tokio::test]
    async fn test_tick_recomputes_without_refetch() {
        let (repo, source) = seeded_source();
        let mut session = GuideSession::new(source, GuideSettings::default(), window(), at(0));
        session.refresh().await;
        // Store is gone, but ticks only use cached lineups.
        repo.set_healthy(false);
        let state = session.on_tick(at(30));
        assert_eq!(state.snapshot().unwrap().progress, Some(25.0));
    }

    #[tokio::test]
    async fn test_failed_channel_refetch_survives_tick() {
        let (repo, source) = seeded_source();
        let mut session = GuideSession::new(source, GuideSettings::default(), window(), at(0));
        session.refresh().await;

        repo.set_healthy(false);
        let state = session
            .handle_event(&GuideEventKind::LineupUpdated {
                channel_id: channel().id,
            })
            .await;
        assert!(matches!(state, GuideViewState::Failed(_)));

        assert!(matches!(session.on_tick(at(30)), GuideViewState::Failed(_)));
        let hidden = session.apply_settings(SettingsAction::ToggleRemainingTime);
        assert!(matches!(hidden, GuideViewState::Failed(_)));

        repo.set_healthy(true);
        assert!(session.refresh().await.snapshot().is_some());
    }

    #[tokio::test]
    async fn test_advance_slides_elapsed_window() {
        let (repo, source) = seeded_source();
        repo.insert_lineup(&channel().id, vec![content(0, 300)]);
        let mut session = GuideSession::new(source, GuideSettings::default(), window(), at(0));
        session.refresh().await;

        let state = session.advance(at(60)).await;
        assert_eq!(state.snapshot().unwrap().progress, Some(50.0));
        assert_eq!(session.window(), &window());

        let state = session.advance(at(125)).await;
        let snapshot = state.snapshot().unwrap();
        assert_eq!(snapshot.window.start(), at(125));
        assert_eq!(snapshot.progress, Some(0.0));
        assert_eq!(session.window().end(), at(245));
    }

    #[tokio::test]
    async fn test_lineup_event_refetches_channel() {
        let (repo, source) = seeded_source();
        let mut session = GuideSession::new(source, GuideSettings::default(), window(), at(0));
        session.refresh().await;

        repo.insert_lineup(&channel().id, vec![content(0, 120)]);
        let state = session
            .handle_event(&GuideEventKind::LineupUpdated {
                channel_id: channel().id,
            })
            .await;
        assert!(!state.snapshot().unwrap().rows[0].end_of_available_programming);
    }

    #[tokio::test]
    async fn test_channel_removed_event_drops_row() {
        let (_repo, source) = seeded_source();
        let mut session = GuideSession::new(source, GuideSettings::default(), window(), at(0));
        session.refresh().await;
        let state = session
            .handle_event(&GuideEventKind::ChannelRemoved {
                channel_id: channel().id,
            })
            .await;
        assert!(state.snapshot().unwrap().rows.is_empty());
    }

    #[tokio::test]
    async fn test_set_window_returns_to_loading() {
        let (_repo, source) = seeded_source();
        let mut session = GuideSession::new(source, GuideSettings::default(), window(), at(0));
        session.refresh().await;
        session.set_window(TimeWindow::new(at(120), at(240)).unwrap());
        assert_eq!(session.state(), &GuideViewState::Loading);
        assert_eq!(session.on_tick(at(130)), &GuideViewState::Loading);
    }
}
