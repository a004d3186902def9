//! Wall-clock source and the periodic "now" tick.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::models::Timestamp;

/// Interval between "now" marker refreshes.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(60);

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Settable clock for tests and replays.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<RwLock<Timestamp>>,
}

impl FixedClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: Arc::new(RwLock::new(now)),
        }
    }

    pub fn set(&self, now: Timestamp) {
        *self.now.write() = now;
    }

    pub fn advance_millis(&self, ms: i64) {
        let mut now = self.now.write();
        *now = now.plus_millis(ms);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.now.read()
    }
}

/// Periodic task publishing the current time into a watch channel.
pub struct GuideTicker;

impl GuideTicker {
    /// Start ticking: one value immediately, then one every `period`.
    pub fn spawn(clock: Arc<dyn Clock>, period: Duration) -> TickerHandle {
        let (sender, receiver) = watch::channel(clock.now());
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first interval tick completes immediately and the initial
            // value is already in the channel.
            interval.tick().await;
            loop {
                interval.tick().await;
                if sender.send(clock.now()).is_err() {
                    break;
                }
            }
        });
        TickerHandle { receiver, task }
    }
}

/// Owner of a running ticker. Dropping it cancels the tick.
pub struct TickerHandle {
    receiver: watch::Receiver<Timestamp>,
    task: JoinHandle<()>,
}

impl TickerHandle {
    /// Another receiver of the same tick.
    pub fn subscribe(&self) -> watch::Receiver<Timestamp> {
        self.receiver.clone()
    }

    pub fn latest(&self) -> Timestamp {
        *self.receiver.borrow()
    }

    pub fn stop(self) {}

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
