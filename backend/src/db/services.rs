//! High-level database service layer.
//!
//! Repository-agnostic operations used by the HTTP handlers and the lineup
//! source. They add logging and error context on top of the raw trait calls.
//!
//! ```no_run
//! use channel_guide::db::{services, repositories::LocalRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = LocalRepository::new();
//!     let channels = services::list_channels(&repo).await?;
//!     println!("Found {} channels", channels.len());
//!     Ok(())
//! }
//! ```

use log::{debug, info};

use super::repository::{LineupRepository, RepositoryResult};
use crate::models::{Channel, ChannelId, ChannelLineup, GuideProgram, TimeWindow};

// ==================== Health & Channels ====================

/// Check if the backing store is healthy.
pub async fn health_check<R: LineupRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

pub async fn list_channels<R: LineupRepository + ?Sized>(repo: &R) -> RepositoryResult<Vec<Channel>> {
    let channels = repo.list_channels().await?;
    debug!("Listed {} channels", channels.len());
    Ok(channels)
}

pub async fn get_channel<R: LineupRepository + ?Sized>(
    repo: &R,
    channel_id: &ChannelId,
) -> RepositoryResult<Channel> {
    repo.get_channel(channel_id).await
}

pub async fn remove_channel<R: LineupRepository + ?Sized>(
    repo: &R,
    channel_id: &ChannelId,
) -> RepositoryResult<()> {
    repo.remove_channel(channel_id).await?;
    info!("Removed channel {}", channel_id);
    Ok(())
}

// ==================== Lineups ====================

/// Lineup of one channel restricted to programs overlapping `window`.
pub async fn fetch_channel_lineup<R: LineupRepository + ?Sized>(
    repo: &R,
    channel_id: &ChannelId,
    window: &TimeWindow,
) -> RepositoryResult<ChannelLineup> {
    let programs = repo
        .fetch_lineup(channel_id, window)
        .await
        .map_err(|e| e.with_operation("fetch_channel_lineup"))?;
    debug!(
        "Fetched {} programs for channel {} in [{}, {})",
        programs.len(),
        channel_id,
        window.start(),
        window.end()
    );
    Ok(ChannelLineup {
        channel_id: channel_id.clone(),
        programs,
    })
}

/// Replace a channel's lineup, returning the number of programs stored.
pub async fn replace_lineup<R: LineupRepository + ?Sized>(
    repo: &R,
    channel_id: &ChannelId,
    programs: Vec<GuideProgram>,
) -> RepositoryResult<usize> {
    let count = repo.replace_lineup(channel_id, programs).await?;
    info!("Stored {} programs for channel {}", count, channel_id);
    Ok(count)
}
