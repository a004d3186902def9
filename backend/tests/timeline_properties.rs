//! Behavioural properties of timeline normalization.

mod support;

use channel_guide::models::{ChannelId, GuideProgram, ProgramKind, TimeWindow, Timestamp};
use channel_guide::services::{normalize_lineup, progress};
use proptest::prelude::*;
use support::{at, content, window, T0};

fn ch() -> ChannelId {
    ChannelId::new("ch-test")
}

#[test]
fn trims_program_crossing_window_start() {
    let rendered = normalize_lineup(&window(0, 120), &ch(), &[content(-30, 30)]);
    assert_eq!(rendered.segments[0].width_percent, 25.0);
    assert!(rendered.end_of_available_programming);
    assert_eq!(rendered.segments.last().unwrap().width_percent, 75.0);
}

#[test]
fn synthesizes_leading_flex() {
    let rendered = normalize_lineup(&window(0, 60), &ch(), &[content(15, 45)]);
    let first = rendered.segments[0].program.as_ref().unwrap();
    assert_eq!(first.kind(), ProgramKind::Flex);
    assert_eq!(first.start(), at(0));
    assert_eq!(rendered.segments[0].width_percent, 25.0);
    assert_eq!(rendered.segments[1].width_percent, 50.0);
}

#[test]
fn appends_trailing_filler() {
    let rendered = normalize_lineup(&window(0, 120), &ch(), &[content(0, 60)]);
    assert_eq!(rendered.segments.len(), 2);
    assert_eq!(rendered.segments[0].width_percent, 50.0);
    assert!(rendered.segments[1].is_filler_block);
    assert_eq!(rendered.segments[1].width_percent, 50.0);
    assert!(rendered.end_of_available_programming);
}

#[test]
fn empty_lineup_is_single_filler() {
    let rendered = normalize_lineup(&window(0, 120), &ch(), &[]);
    assert_eq!(rendered.segments.len(), 1);
    assert!(rendered.segments[0].is_filler_block);
    assert_eq!(rendered.segments[0].width_percent, 100.0);
    assert!(!rendered.end_of_available_programming);
}

#[test]
fn progress_absent_outside_window() {
    let w = window(0, 60);
    assert_eq!(progress(&w, at(-1)), None);
    assert_eq!(progress(&w, at(60)), None);
    assert_eq!(progress(&w, at(0)), Some(0.0));
}

fn contiguous_lineup(first_start: i64, durations: &[i64]) -> Vec<GuideProgram> {
    let mut start = first_start;
    durations
        .iter()
        .map(|d| {
            let program = content(start, start + d);
            start += d;
            program
        })
        .collect()
}

proptest! {
    #[test]
    fn widths_sum_to_hundred(
        durations in prop::collection::vec(1i64..90, 1..12),
        spare_minutes in 0i64..240,
    ) {
        let window_minutes = durations.iter().sum::<i64>() + spare_minutes;

        let rendered = normalize_lineup(&window(0, window_minutes), &ch(), &contiguous_lineup(0, &durations));
        let epsilon = 0.01 * rendered.segments.len() as f64;
        prop_assert!((rendered.total_width() - 100.0).abs() <= epsilon + 1e-9,
            "sum {} over {} segments", rendered.total_width(), rendered.segments.len());
    }

    #[test]
    fn normalization_is_idempotent(
        durations in prop::collection::vec(1i64..120, 0..10),
        offset in -60i64..60,
        window_minutes in 30i64..480,
    ) {
        let programs = contiguous_lineup(offset, &durations);
        let w = window(0, window_minutes);

        let first = serde_json::to_string(&normalize_lineup(&w, &ch(), &programs)).unwrap();
        let second = serde_json::to_string(&normalize_lineup(&w, &ch(), &programs)).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn now_marker_is_monotonic(
        (window_minutes, early, late) in (60i64..=720)
            .prop_flat_map(|w| (Just(w), 0..w - 1))
            .prop_flat_map(|(w, early)| (Just(w), Just(early), early + 1..w)),
    ) {
        let w = TimeWindow::new(Timestamp::from_millis(T0), at(window_minutes)).unwrap();

        let p1 = progress(&w, at(early)).unwrap();
        let p2 = progress(&w, at(late)).unwrap();
        prop_assert!(p1 < p2, "{} !< {}", p1, p2);
        prop_assert!((0.0..=100.0).contains(&p1) && (0.0..=100.0).contains(&p2));
    }
}
