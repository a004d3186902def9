//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::LineupRepository;
use crate::services::clock::{Clock, SystemClock};
use crate::services::events::GuideEventBus;
use crate::services::settings::GuideSettings;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for lineup storage
    pub repository: Arc<dyn LineupRepository>,
    /// Invalidation events fanned out to SSE subscribers
    pub events: GuideEventBus,
    /// Settings used when a request does not override them
    pub settings: Arc<GuideSettings>,
    /// Source of "now" when a request does not pass one
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create a new application state with default settings.
    pub fn new(repository: Arc<dyn LineupRepository>) -> Self {
        Self::with_settings(repository, GuideSettings::default())
    }

    pub fn with_settings(repository: Arc<dyn LineupRepository>, settings: GuideSettings) -> Self {
        Self {
            repository,
            events: GuideEventBus::new(),
            settings: Arc::new(settings),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}
