#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use channel_guide::models::{
    Channel, ChannelId, ContentProgram, FlexProgram, GuideProgram, TimeWindow, Timestamp,
};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// 2024-03-01T11:00:00Z
pub const T0: i64 = 1_709_290_800_000;

pub fn at(minutes: i64) -> Timestamp {
    Timestamp::from_millis(T0).plus_minutes(minutes)
}

pub fn window(from_minutes: i64, to_minutes: i64) -> TimeWindow {
    TimeWindow::new(at(from_minutes), at(to_minutes)).expect("valid test window")
}

pub fn channel(id: &str, number: u32) -> Channel {
    Channel {
        id: ChannelId::new(id),
        number,
        name: format!("Channel {}", number),
    }
}

pub fn content(start: i64, stop: i64) -> GuideProgram {
    GuideProgram::Content(ContentProgram {
        start: at(start),
        stop: at(stop),
        title: Some(format!("Show {}-{}", start, stop)),
        program_id: None,
        episode_title: None,
    })
}

pub fn flex(start: i64, stop: i64) -> GuideProgram {
    GuideProgram::Flex(FlexProgram::spanning(at(start), at(stop)))
}

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the previous values on unwind and serializes access to the
/// process environment across parallel tests.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}
