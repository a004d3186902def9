//! Lineup repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Channel, ChannelId, GuideProgram, TimeWindow};

/// Storage for channels and their program lineups.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait LineupRepository: Send + Sync {
    /// Check that the backing store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// All channels, ordered by channel number.
    async fn list_channels(&self) -> RepositoryResult<Vec<Channel>>;

    /// Fetch a channel by id.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` if the channel does not exist
    async fn get_channel(&self, channel_id: &ChannelId) -> RepositoryResult<Channel>;

    /// Insert or replace a channel. Its lineup is kept when it already exists.
    async fn store_channel(&self, channel: Channel) -> RepositoryResult<()>;

    /// Remove a channel and its lineup.
    async fn remove_channel(&self, channel_id: &ChannelId) -> RepositoryResult<()>;

    /// Programs of `channel_id` that overlap `window`, in start order.
    ///
    /// Boundary programs are returned whole; trimming is the renderer's job.
    async fn fetch_lineup(
        &self,
        channel_id: &ChannelId,
        window: &TimeWindow,
    ) -> RepositoryResult<Vec<GuideProgram>>;

    /// Replace the full lineup of an existing channel.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of programs stored
    async fn replace_lineup(
        &self,
        channel_id: &ChannelId,
        programs: Vec<GuideProgram>,
    ) -> RepositoryResult<usize>;
}
