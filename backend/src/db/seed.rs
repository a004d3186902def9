//! Seed documents for pre-populating a repository.
//!
//! ```json
//! {
//!   "channels": [
//!     { "id": "ch-1", "number": 1, "name": "Classics",
//!       "programs": [ { "type": "content", "start": 0, "stop": 1800000 } ] }
//!   ]
//! }
//! ```

use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::repository::{ErrorContext, LineupRepository, RepositoryError, RepositoryResult};
use crate::models::{Channel, ChannelId, GuideProgram};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuideSeed {
    #[serde(default)]
    pub channels: Vec<SeedChannel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedChannel {
    pub id: ChannelId,
    pub number: u32,
    pub name: String,
    #[serde(default)]
    pub programs: Vec<GuideProgram>,
}

/// Parse a seed document, reporting the JSON path of the first bad field.
pub fn parse_seed_str(json: &str) -> RepositoryResult<GuideSeed> {
    let deserializer = &mut serde_json::Deserializer::from_str(json);
    serde_path_to_error::deserialize(deserializer).map_err(|e| {
        RepositoryError::configuration_with_context(
            format!("Invalid seed document: {}", e.inner()),
            ErrorContext::new("parse_seed").with_details(format!("path={}", e.path())),
        )
    })
}

pub fn load_seed_file<P: AsRef<Path>>(path: P) -> RepositoryResult<GuideSeed> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        RepositoryError::configuration_with_context(
            format!("Failed to read seed file: {}", e),
            ErrorContext::new("load_seed").with_details(path.display().to_string()),
        )
    })?;
    parse_seed_str(&content)
}

/// Store every channel and lineup of `seed`; returns the number of programs.
pub async fn apply_seed<R>(repo: &R, seed: GuideSeed) -> RepositoryResult<usize>
where
    R: LineupRepository + ?Sized,
{
    let channel_count = seed.channels.len();
    let mut program_count = 0;
    for entry in seed.channels {
        let id = entry.id.clone();
        repo.store_channel(Channel {
            id: entry.id,
            number: entry.number,
            name: entry.name,
        })
        .await?;
        program_count += repo.replace_lineup(&id, entry.programs).await?;
    }
    info!(
        "Seeded {} channels with {} programs",
        channel_count, program_count
    );
    Ok(program_count)
}
