//! Timeline normalization for the guide grid.
//!
//! Turns an absolute-time lineup and a display window into segments whose
//! widths are percentages of the window, trimming the boundary programs and
//! filling unscheduled time with flex. Everything here is a pure function of
//! its inputs.

use std::borrow::Cow;

use log::debug;

use crate::models::{
    ChannelId, GuideProgram, RenderedLineup, RenderedSegment, TimeWindow, Timestamp,
    MS_PER_MINUTE,
};

/// Round to 2 decimals, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn percent_of(part_ms: i64, window: &TimeWindow) -> f64 {
    round2(100.0 * part_ms as f64 / window.duration_ms() as f64)
}

/// Duration of the program at `index` once the first and last entries are
/// cut to the window. Interior entries are never trimmed.
fn trimmed_duration_ms(
    program: &GuideProgram,
    index: usize,
    last: usize,
    window: &TimeWindow,
) -> i64 {
    let mut start = program.start();
    let mut stop = program.stop();
    if index == 0 && start < window.start() {
        start = window.start();
    }
    if index == last && stop > window.end() {
        stop = window.end();
    }
    stop.millis_since(start)
}

/// Prepend a flex program when the lineup starts after the window does.
fn patch_leading_gap<'a>(
    window: &TimeWindow,
    programs: &'a [GuideProgram],
) -> Cow<'a, [GuideProgram]> {
    match programs.first() {
        Some(first) if first.start() > window.start() => {
            let mut patched = Vec::with_capacity(programs.len() + 1);
            patched.push(GuideProgram::flex(window.start(), first.start()));
            patched.extend_from_slice(programs);
            Cow::Owned(patched)
        }
        _ => Cow::Borrowed(programs),
    }
}

/// Build the rendered segments for one channel.
///
/// - An empty lineup renders as a single 100% filler block.
/// - A lineup starting after `window.start` gets a synthetic flex program in front.
/// - A lineup ending before `window.end` is flagged `end_of_available_programming`
///   and followed by a filler block covering the remainder.
pub fn normalize_lineup(
    window: &TimeWindow,
    channel_id: &ChannelId,
    programs: &[GuideProgram],
) -> RenderedLineup {
    if programs.is_empty() {
        return RenderedLineup {
            channel_id: channel_id.clone(),
            segments: vec![RenderedSegment::filler(100.0)],
            end_of_available_programming: false,
            total_program_duration_ms: 0,
        };
    }

    let patched = patch_leading_gap(window, programs);
    let last = patched.len() - 1;

    let mut segments = Vec::with_capacity(patched.len() + 1);
    let mut end_of_available_programming = false;
    let mut total_program_duration_ms = 0i64;

    for (index, program) in patched.iter().enumerate() {
        let duration = trimmed_duration_ms(program, index, last, window);
        if index == last && program.stop() < window.end() {
            end_of_available_programming = true;
        }
        total_program_duration_ms = total_program_duration_ms.saturating_add(duration);
        segments.push(RenderedSegment::program(
            percent_of(duration, window),
            program.clone(),
        ));
    }

    if end_of_available_programming {
        let unaccounted = window.duration_ms().saturating_sub(total_program_duration_ms);
        segments.push(RenderedSegment::filler(percent_of(unaccounted, window)));
    }

    debug!(
        "Normalized lineup for channel {}: {} programs -> {} segments (end_of_programming={})",
        channel_id,
        programs.len(),
        segments.len(),
        end_of_available_programming
    );

    RenderedLineup {
        channel_id: channel_id.clone(),
        segments,
        end_of_available_programming,
        total_program_duration_ms,
    }
}

/// Position of the "now" marker in percent, `None` outside `[start, end)`.
pub fn progress(window: &TimeWindow, now: Timestamp) -> Option<f64> {
    if !window.contains(now) {
        return None;
    }
    Some(percent_of(now.millis_since(window.start()), window))
}

/// Minutes left for the remaining-time label.
///
/// A paused program with a known `timeRemaining` reports that value rounded to
/// whole minutes; an airing, unpaused program reports the truncated minutes
/// until its stop.
pub fn remaining_minutes(program: &GuideProgram, now: Timestamp) -> Option<i64> {
    if program.is_paused() {
        return program
            .time_remaining()
            .map(|ms| (ms as f64 / MS_PER_MINUTE as f64).round() as i64);
    }
    if program.is_airing(now) {
        return Some(program.stop().millis_since(now) / MS_PER_MINUTE);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentProgram, FlexProgram};

    const T0: i64 = 1_709_290_800_000;

    fn at(minutes: i64) -> Timestamp {
        Timestamp::from_millis(T0).plus_minutes(minutes)
    }

    fn content(start: i64, stop: i64) -> GuideProgram {
        GuideProgram::Content(ContentProgram {
            start: at(start),
            stop: at(stop),
            title: Some("Show".to_string()),
            program_id: None,
            episode_title: None,
        })
    }

    fn window(minutes: i64) -> TimeWindow {
        TimeWindow::new(at(0), at(minutes)).unwrap()
    }

    fn channel() -> ChannelId {
        ChannelId::new("ch-1")
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(33.333_333), 33.33);
        assert_eq!(round2(66.666_666), 66.67);
        assert_eq!(round2(0.005), 0.01);
        assert_eq!(round2(-0.005), -0.01);
    }

    #[test]
    fn test_empty_lineup_is_single_filler() {
        let rendered = normalize_lineup(&window(120), &channel(), &[]);
        assert_eq!(rendered.segments, vec![RenderedSegment::filler(100.0)]);
        assert_eq!(rendered.total_program_duration_ms, 0);
    }

    #[test]
    fn test_contiguous_lineup_covers_window() {
        let programs = vec![content(0, 30), content(30, 90), content(90, 120)];
        let rendered = normalize_lineup(&window(120), &channel(), &programs);
        let widths: Vec<f64> = rendered.segments.iter().map(|s| s.width_percent).collect();
        assert_eq!(widths, vec![25.0, 50.0, 25.0]);
        assert!(!rendered.end_of_available_programming);
        assert_eq!(rendered.total_program_duration_ms, 120 * MS_PER_MINUTE);
    }

    #[test]
    fn test_first_program_trimmed_to_window_start() {
        let rendered = normalize_lineup(&window(120), &channel(), &[content(-30, 30), content(30, 120)]);
        assert_eq!(rendered.segments[0].width_percent, 25.0);
        assert_eq!(rendered.segments[1].width_percent, 75.0);
    }

    #[test]
    fn test_last_program_trimmed_to_window_end() {
        let rendered = normalize_lineup(&window(60), &channel(), &[content(0, 45), content(45, 90)]);
        assert_eq!(rendered.segments[1].width_percent, 25.0);
        assert!(!rendered.end_of_available_programming);
    }

    #[test]
    fn test_single_program_trimmed_on_both_sides() {
        let rendered = normalize_lineup(&window(60), &channel(), &[content(-60, 120)]);
        assert_eq!(rendered.segments.len(), 1);
        assert_eq!(rendered.segments[0].width_percent, 100.0);
    }

    #[test]
    fn test_leading_gap_becomes_flex() {
        let rendered = normalize_lineup(&window(60), &channel(), &[content(15, 60)]);
        let first = &rendered.segments[0];
        assert!(!first.is_filler_block);
        assert!(matches!(first.program, Some(GuideProgram::Flex(FlexProgram { .. }))));
        assert_eq!(first.width_percent, 25.0);
        assert_eq!(rendered.segments[1].width_percent, 75.0);
    }

    #[test]
    fn test_trailing_gap_gets_filler_block() {
        let rendered = normalize_lineup(&window(120), &channel(), &[content(0, 60)]);
        assert!(rendered.end_of_available_programming);
        assert_eq!(rendered.segments.len(), 2);
        let filler = &rendered.segments[1];
        assert!(filler.is_filler_block);
        assert!(filler.program.is_none());
        assert_eq!(filler.width_percent, 50.0);
    }

    #[test]
    fn test_inverted_entry_passes_through_untouched() {
        let rendered = normalize_lineup(&window(60), &channel(), &[content(30, 20)]);
        assert!(rendered.segments[1].width_percent < 0.0);
    }

    #[test]
    fn test_extreme_timestamps_do_not_overflow() {
        let w = TimeWindow::new(Timestamp::from_millis(0), Timestamp::from_millis(1_000)).unwrap();
        let huge = GuideProgram::flex(
            Timestamp::from_millis(i64::MIN + 10),
            Timestamp::from_millis(i64::MAX - 10),
        );
        let rendered = normalize_lineup(&w, &channel(), &[huge]);
        assert_eq!(rendered.segments.len(), 1);
        assert_eq!(rendered.segments[0].width_percent, 100.0);
        assert_eq!(rendered.total_program_duration_ms, 1_000);
        assert!(!rendered.end_of_available_programming);
    }

    #[test]
    fn test_progress_inside_and_outside_window() {
        let w = window(120);
        assert_eq!(progress(&w, at(0)), Some(0.0));
        assert_eq!(progress(&w, at(30)), Some(25.0));
        assert_eq!(progress(&w, at(40)), Some(33.33));
        assert_eq!(progress(&w, at(120)), None);
        assert_eq!(progress(&w, at(-1)), None);
    }

    #[test]
    fn test_remaining_minutes_for_airing_program() {
        let p = content(0, 30);
        assert_eq!(remaining_minutes(&p, at(10)), Some(20));
        assert_eq!(
            remaining_minutes(&p, at(10).plus_millis(30_000)),
            Some(19)
        );
        assert_eq!(remaining_minutes(&p, at(30)), None);
        assert_eq!(remaining_minutes(&p, at(-5)), None);
    }

    #[test]
    fn test_remaining_minutes_for_paused_flex() {
        let paused = GuideProgram::Flex(FlexProgram {
            start: at(0),
            stop: at(60),
            title: None,
            is_paused: true,
            time_remaining: Some(150_000),
        });
        // Paused wins even outside the airing range.
        assert_eq!(remaining_minutes(&paused, at(90)), Some(3));

        let paused_unknown = GuideProgram::Flex(FlexProgram {
            is_paused: true,
            ..FlexProgram::spanning(at(0), at(60))
        });
        assert_eq!(remaining_minutes(&paused_unknown, at(10)), None);
    }
}
