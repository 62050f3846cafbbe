// Property-based tests for the month layout
// Random months and random event lists must always satisfy the layout invariants

use calendar_image::models::event::RawEvent;
use calendar_image::services::layout::{
    allocate_segments, build_month_grid, normalize_events, DEFAULT_MAX_SLOTS_PER_WEEK,
};
use chrono::{Datelike, Duration, NaiveDate};
use proptest::prelude::*;

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Events starting anywhere from two weeks before to two weeks after the
/// month, lasting up to three weeks (end given as exclusive).
fn events_around(year: i32, month: u32) -> impl Strategy<Value = Vec<RawEvent>> {
    let anchor = ymd(year, month, 1);
    prop::collection::vec((-14i64..45, 0i64..21), 0..40).prop_map(move |specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(index, (offset, length))| {
                let start = anchor + Duration::days(offset);
                RawEvent::builder()
                    .id(index.to_string())
                    .title(format!("Event {index}"))
                    .start(start)
                    .end(start + Duration::days(length))
                    .build()
                    .unwrap()
            })
            .collect()
    })
}

fn month_and_events() -> impl Strategy<Value = (i32, u32, Vec<RawEvent>)> {
    (1900i32..2200, 1u32..=12).prop_flat_map(|(year, month)| {
        events_around(year, month).prop_map(move |events| (year, month, events))
    })
}

proptest! {
    /// Property: week rows are consecutive Sunday-first weeks and cover
    /// exactly the days of the month
    #[test]
    fn prop_grid_is_contiguous_and_covers_month(year in 1900i32..2200, month in 1u32..=12) {
        let grid = build_month_grid(year, month).unwrap();
        let days: Vec<NaiveDate> = grid.weeks.iter().flat_map(|week| week.days).collect();

        prop_assert!((4..=6).contains(&grid.row_count()));
        prop_assert_eq!(days[0].weekday(), chrono::Weekday::Sun);
        for pair in days.windows(2) {
            prop_assert_eq!(pair[1] - pair[0], Duration::days(1));
        }

        let in_month: Vec<NaiveDate> = days
            .iter()
            .copied()
            .filter(|date| date.year() == year && date.month() == month)
            .collect();
        prop_assert_eq!(in_month.first().copied(), Some(grid.first_of_month));
        prop_assert_eq!(in_month.last().copied(), Some(grid.last_of_month));
        prop_assert_eq!(in_month.len() as u32, grid.last_of_month.day());
    }

    /// Property: normalized events stay inside the month with start <= end
    #[test]
    fn prop_normalized_events_within_month((year, month, events) in month_and_events()) {
        let grid = build_month_grid(year, month).unwrap();
        let normalized = normalize_events(&events, grid.first_of_month, grid.last_of_month);

        for event in &normalized {
            prop_assert!(event.start_date <= event.end_date);
            prop_assert!(event.start_date >= grid.first_of_month);
            prop_assert!(event.end_date <= grid.last_of_month);
        }
    }

    /// Property: segments sharing a slot in a week never overlap, and no
    /// column holds more segments than there are slots
    #[test]
    fn prop_segments_respect_slots((year, month, events) in month_and_events()) {
        let grid = build_month_grid(year, month).unwrap();
        let normalized = normalize_events(&events, grid.first_of_month, grid.last_of_month);
        let segments = allocate_segments(&grid.weeks, &normalized, DEFAULT_MAX_SLOTS_PER_WEEK);

        for (i, a) in segments.iter().enumerate() {
            prop_assert!(a.start_column <= a.end_column && a.end_column < 7);
            prop_assert!(a.slot < DEFAULT_MAX_SLOTS_PER_WEEK);
            for b in &segments[i + 1..] {
                if a.week_index == b.week_index && a.slot == b.slot {
                    prop_assert!(!a.overlaps_columns(b.start_column, b.end_column));
                }
            }
        }

        for week_index in 0..grid.row_count() {
            for column in 0..7 {
                let visible = segments
                    .iter()
                    .filter(|s| s.week_index == week_index)
                    .filter(|s| s.start_column <= column && column <= s.end_column)
                    .count();
                prop_assert!(visible <= DEFAULT_MAX_SLOTS_PER_WEEK);
            }
        }
    }

    /// Property: an event alone in the month is never dropped
    #[test]
    fn prop_single_event_always_placed(year in 1900i32..2200, month in 1u32..=12, day in 1u32..=28) {
        let date = ymd(year, month, day);
        let event = RawEvent::builder().title("Solo").start(date).build().unwrap();
        let grid = build_month_grid(year, month).unwrap();
        let normalized = normalize_events(&[event], grid.first_of_month, grid.last_of_month);
        let segments = allocate_segments(&grid.weeks, &normalized, DEFAULT_MAX_SLOTS_PER_WEEK);

        prop_assert_eq!(segments.len(), 1);
        prop_assert_eq!(segments[0].slot, 0);
        prop_assert_eq!(segments[0].start_column, segments[0].end_column);
    }
}
