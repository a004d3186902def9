//! In-memory local repository implementation.
//!
//! All data lives in HashMaps behind a single lock, which keeps execution fast,
//! deterministic and isolated. Used for local development, seeded demo
//! servers and tests.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::db::repository::*;
use crate::models::{Channel, ChannelId, GuideProgram, TimeWindow};

/// In-memory local repository.
///
/// # Example
/// ```
/// use channel_guide::db::repositories::LocalRepository;
/// use channel_guide::models::{Channel, ChannelId};
///
/// let repo = LocalRepository::new();
/// repo.insert_channel(Channel {
///     id: ChannelId::new("ch-1"),
///     number: 1,
///     name: "Classics".to_string(),
/// });
/// assert_eq!(repo.channel_count(), 1);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    channels: HashMap<ChannelId, Channel>,
    lineups: HashMap<ChannelId, Vec<GuideProgram>>,
    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            channels: HashMap::new(),
            lineups: HashMap::new(),
            is_healthy: true,
        }
    }
}

fn channel_not_found(channel_id: &ChannelId, operation: &str) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("Channel {} not found", channel_id),
        ErrorContext::new(operation)
            .with_entity("channel")
            .with_entity_id(channel_id),
    )
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Synchronous channel insert for setting up data.
    pub fn insert_channel(&self, channel: Channel) {
        let mut data = self.data.write();
        data.lineups.entry(channel.id.clone()).or_default();
        data.channels.insert(channel.id.clone(), channel);
    }

    /// Synchronous lineup replacement for setting up data.
    ///
    /// Programs are stored sorted by start (stable for equal starts).
    pub fn insert_lineup(&self, channel_id: &ChannelId, mut programs: Vec<GuideProgram>) -> bool {
        let mut data = self.data.write();
        if !data.channels.contains_key(channel_id) {
            return false;
        }
        programs.sort_by_key(GuideProgram::start);
        data.lineups.insert(channel_id.clone(), programs);
        true
    }

    pub fn channel_count(&self) -> usize {
        self.data.read().channels.len()
    }

    /// Simulate an unreachable store.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    fn check_healthy(&self, operation: &str) -> RepositoryResult<()> {
        if self.data.read().is_healthy {
            Ok(())
        } else {
            Err(RepositoryError::internal("Repository is unavailable").with_operation(operation))
        }
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LineupRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn list_channels(&self) -> RepositoryResult<Vec<Channel>> {
        self.check_healthy("list_channels")?;
        let mut channels: Vec<Channel> = self.data.read().channels.values().cloned().collect();
        channels.sort_by(|a, b| a.number.cmp(&b.number).then_with(|| a.id.cmp(&b.id)));
        Ok(channels)
    }

    async fn get_channel(&self, channel_id: &ChannelId) -> RepositoryResult<Channel> {
        self.check_healthy("get_channel")?;
        self.data
            .read()
            .channels
            .get(channel_id)
            .cloned()
            .ok_or_else(|| channel_not_found(channel_id, "get_channel"))
    }

    async fn store_channel(&self, channel: Channel) -> RepositoryResult<()> {
        self.check_healthy("store_channel")?;
        if channel.id.as_str().trim().is_empty() {
            return Err(RepositoryError::validation_with_context(
                "Channel id must not be empty",
                ErrorContext::new("store_channel").with_entity("channel"),
            ));
        }
        self.insert_channel(channel);
        Ok(())
    }

    async fn remove_channel(&self, channel_id: &ChannelId) -> RepositoryResult<()> {
        self.check_healthy("remove_channel")?;
        let mut data = self.data.write();
        if data.channels.remove(channel_id).is_none() {
            return Err(channel_not_found(channel_id, "remove_channel"));
        }
        data.lineups.remove(channel_id);
        Ok(())
    }

    async fn fetch_lineup(
        &self,
        channel_id: &ChannelId,
        window: &TimeWindow,
    ) -> RepositoryResult<Vec<GuideProgram>> {
        self.check_healthy("fetch_lineup")?;
        let data = self.data.read();
        if !data.channels.contains_key(channel_id) {
            return Err(channel_not_found(channel_id, "fetch_lineup"));
        }
        let programs = data
            .lineups
            .get(channel_id)
            .map(|programs| {
                programs
                    .iter()
                    .filter(|p| window.overlaps(p.start(), p.stop()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(programs)
    }

    async fn replace_lineup(
        &self,
        channel_id: &ChannelId,
        programs: Vec<GuideProgram>,
    ) -> RepositoryResult<usize> {
        self.check_healthy("replace_lineup")?;
        let count = programs.len();
        if !self.insert_lineup(channel_id, programs) {
            return Err(channel_not_found(channel_id, "replace_lineup"));
        }
        Ok(count)
    }
}
