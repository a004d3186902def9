//! Service layer for guide rendering and orchestration.
//!
//! This module sits between the lineup data layer and the HTTP surface. The
//! timeline, sanitize and presentation services are pure functions; the
//! session, event bus and ticker own the stateful parts of a live guide.

pub mod clock;

pub mod events;

pub mod presentation;

pub mod sanitize;

pub mod session;
pub mod settings;
pub mod timeline;

pub use clock::{Clock, FixedClock, GuideTicker, SystemClock, TickerHandle, DEFAULT_TICK_INTERVAL};
pub use events::{GuideEvent, GuideEventBus, GuideEventKind, GuideSubscription};
pub use presentation::{segment_fill, show_details, FillPattern, SegmentFill, Viewport};
pub use sanitize::{sanitize_lineup, LineupIssue, MalformedLineupPolicy, SanitizedLineup};
pub use session::{
    render_row, render_snapshot, GuideRow, GuideSession, GuideSnapshot, GuideViewState,
    SegmentLabels, SegmentView,
};
pub use settings::{GuideSettings, SettingsAction};
pub use timeline::{normalize_lineup, progress, remaining_minutes};
