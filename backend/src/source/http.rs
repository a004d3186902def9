//! Lineup source that queries a remote guide backend over HTTP.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::{LineupSource, SourceError, SourceResult};
use crate::models::{Channel, ChannelId, ChannelLineup, ChannelList, TimeWindow};

#[derive(Clone)]
pub struct HttpLineupSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLineupSource {
    /// Build a source for `base_url` (e.g. `http://guide.local:8080`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> SourceResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Transport {
                url: base_url.clone(),
                message: e.to_string(),
            })?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn channels_url(&self) -> String {
        format!("{}/v1/channels", self.base_url)
    }

    pub fn lineup_url(&self, channel_id: &ChannelId) -> String {
        format!("{}/v1/channels/{}/lineup", self.base_url, channel_id)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, String)],
    ) -> SourceResult<T> {
        log::debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| SourceError::Transport {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|e| SourceError::Decode {
            url,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl LineupSource for HttpLineupSource {
    async fn list_channels(&self) -> SourceResult<Vec<Channel>> {
        let list: ChannelList = self.get_json(self.channels_url(), &[]).await?;
        Ok(list.channels)
    }

    async fn fetch_lineup(
        &self,
        channel_id: &ChannelId,
        window: &TimeWindow,
    ) -> SourceResult<ChannelLineup> {
        let query = [
            ("from", window.start().to_datetime().to_rfc3339()),
            ("to", window.end().to_datetime().to_rfc3339()),
        ];
        self.get_json(self.lineup_url(channel_id), &query).await
    }
}
