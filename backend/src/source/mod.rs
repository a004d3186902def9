//! Where guide sessions get their lineups from.
//!
//! A [`LineupSource`] answers the lineup-for-range query keyed by
//! `(channel_id, from, to)`. The in-process implementation reads a
//! repository; the HTTP one (feature `http-client`) asks a remote guide
//! backend.

use async_trait::async_trait;
use std::sync::Arc;

use crate::db::repository::{LineupRepository, RepositoryError};
use crate::db::services as db_services;
use crate::models::{Channel, ChannelId, ChannelLineup, TimeWindow};

#[cfg(feature = "http-client")]
pub mod http;

#[cfg(feature = "http-client")]
pub use http::HttpLineupSource;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Backend returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Could not decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

pub type SourceResult<T> = Result<T, SourceError>;

#[async_trait]
pub trait LineupSource: Send + Sync {
    async fn list_channels(&self) -> SourceResult<Vec<Channel>>;

    async fn fetch_lineup(
        &self,
        channel_id: &ChannelId,
        window: &TimeWindow,
    ) -> SourceResult<ChannelLineup>;
}

/// Lineup source backed by an in-process repository.
#[derive(Clone)]
pub struct RepositorySource {
    repository: Arc<dyn LineupRepository>,
}

impl RepositorySource {
    pub fn new(repository: Arc<dyn LineupRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl LineupSource for RepositorySource {
    async fn list_channels(&self) -> SourceResult<Vec<Channel>> {
        Ok(db_services::list_channels(self.repository.as_ref()).await?)
    }

    async fn fetch_lineup(
        &self,
        channel_id: &ChannelId,
        window: &TimeWindow,
    ) -> SourceResult<ChannelLineup> {
        Ok(db_services::fetch_channel_lineup(self.repository.as_ref(), channel_id, window).await?)
    }
}
