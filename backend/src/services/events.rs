//! Guide change notifications.
//!
//! The bus is owned by whoever builds the application state and handed to
//! producers (lineup writes) and consumers (SSE clients, guide sessions).
//! Subscribing returns a [`GuideSubscription`]; dropping it unsubscribes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::models::ChannelId;

pub const DEFAULT_EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GuideEventKind {
    #[serde(rename_all = "camelCase")]
    LineupUpdated { channel_id: ChannelId },
    #[serde(rename_all = "camelCase")]
    ChannelRemoved { channel_id: ChannelId },
    /// Everything may have changed; refetch all channels
    GuideInvalidated,
}

impl GuideEventKind {
    /// Event name used on the SSE wire.
    pub fn name(&self) -> &'static str {
        match self {
            GuideEventKind::LineupUpdated { .. } => "lineupUpdated",
            GuideEventKind::ChannelRemoved { .. } => "channelRemoved",
            GuideEventKind::GuideInvalidated => "guideInvalidated",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideEvent {
    pub id: String,
    pub emitted_at: DateTime<Utc>,
    pub kind: GuideEventKind,
}

impl GuideEvent {
    pub fn new(kind: GuideEventKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            emitted_at: Utc::now(),
            kind,
        }
    }
}

#[derive(Clone)]
pub struct GuideEventBus {
    sender: broadcast::Sender<GuideEvent>,
}

impl GuideEventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event; returns how many subscribers will see it.
    pub fn publish(&self, kind: GuideEventKind) -> usize {
        let event = GuideEvent::new(kind);
        log::debug!("Publishing guide event {} ({})", event.kind.name(), event.id);
        // No subscribers is fine: nobody is looking at the guide.
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> GuideSubscription {
        GuideSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for GuideEventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// One consumer's view of the bus.
pub struct GuideSubscription {
    receiver: broadcast::Receiver<GuideEvent>,
}

impl GuideSubscription {
    /// Next event, or `None` once the bus is gone.
    ///
    /// A subscriber that fell behind gets a single `GuideInvalidated` in place
    /// of the events it missed.
    pub async fn recv(&mut self) -> Option<GuideEvent> {
        match self.receiver.recv().await {
            Ok(event) => Some(event),
            Err(RecvError::Lagged(skipped)) => {
                log::warn!("Guide subscriber lagged, {} events skipped", skipped);
                Some(GuideEvent::new(GuideEventKind::GuideInvalidated))
            }
            Err(RecvError::Closed) => None,
        }
    }

    pub fn unsubscribe(self) {}
}
