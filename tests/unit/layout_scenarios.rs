// Scenario tests for month layout
// Each case pins down one documented layout behavior end to end

use calendar_image::models::event::RawEvent;
use calendar_image::models::settings::LayoutConfig;
use calendar_image::services::layout::{
    build_month_grid, build_month_layout, normalize_event, truncate_title, ApproxTextMeasure,
    LayoutError, MonthLayout,
};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use test_case::test_case;

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn event(title: &str, start: NaiveDate, end: NaiveDate) -> RawEvent {
    RawEvent::builder()
        .id(title)
        .title(title)
        .start(start)
        .end(end)
        .build()
        .unwrap()
}

fn layout(year: i32, month: u32, events: &[RawEvent]) -> MonthLayout {
    build_month_layout(
        year,
        month,
        events,
        &LayoutConfig::default(),
        &ApproxTextMeasure::default(),
    )
    .unwrap()
}

/// (week, start column, end column, slot) of every pill
fn placements(layout: &MonthLayout) -> Vec<(usize, usize, usize, usize)> {
    layout
        .pills
        .iter()
        .map(|pill| {
            let s = &pill.segment;
            (s.week_index, s.start_column, s.end_column, s.slot)
        })
        .collect()
}

#[test_case(2025, 9, 5 ; "september 2025 starts on monday")]
#[test_case(2025, 8, 6 ; "august 2025 starts on friday with 31 days")]
#[test_case(2026, 2, 4 ; "february 2026 fills exactly four weeks")]
#[test_case(2024, 2, 5 ; "leap february 2024")]
#[test_case(2025, 12, 5 ; "december rolls over into january")]
fn test_grid_row_count(year: i32, month: u32, rows: usize) {
    assert_eq!(build_month_grid(year, month).unwrap().row_count(), rows);
}

#[test_case(2025, 0 ; "month zero")]
#[test_case(2025, 13 ; "month thirteen")]
fn test_invalid_month_is_rejected(year: i32, month: u32) {
    let result = build_month_layout(
        year,
        month,
        &[],
        &LayoutConfig::default(),
        &ApproxTextMeasure::default(),
    );
    assert_eq!(result.unwrap_err(), LayoutError::InvalidMonth { year, month });
}

#[test]
fn test_single_day_event() {
    // Wed Sept 3, 2025
    let result = layout(2025, 9, &[event("Dentist", ymd(2025, 9, 3), ymd(2025, 9, 3))]);
    assert_eq!(placements(&result), vec![(0, 3, 3, 0)]);
}

#[test]
fn test_exclusive_end_resolved_inclusive() {
    // Fri 5 and Sat 6; raw end Sun 7 is exclusive
    let result = layout(2025, 9, &[event("Retreat", ymd(2025, 9, 5), ymd(2025, 9, 7))]);
    assert_eq!(result.events[0].end_date, ymd(2025, 9, 6));
    assert_eq!(placements(&result), vec![(0, 5, 6, 0)]);
}

#[test]
fn test_exclusive_end_across_week_boundary() {
    // Sat 6 through Mon 8 inclusive: one segment in each week touched
    let result = layout(2025, 9, &[event("Camp", ymd(2025, 9, 6), ymd(2025, 9, 9))]);
    assert_eq!(placements(&result), vec![(0, 6, 6, 0), (1, 0, 1, 0)]);
}

#[test]
fn test_fourth_event_on_same_day_is_dropped() {
    let day = ymd(2025, 9, 17);
    let events: Vec<_> = ["First", "Second", "Third", "Fourth"]
        .into_iter()
        .map(|title| event(title, day, day))
        .collect();

    let result = layout(2025, 9, &events);
    let titles: Vec<_> = result.pills.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(titles, vec!["First", "Second", "Third"]);
    assert_eq!(placements(&result), vec![(2, 3, 3, 0), (2, 3, 3, 1), (2, 3, 3, 2)]);
}

#[test_case(9, ymd(2025, 9, 28), ymd(2025, 9, 30) ; "rendered for september")]
#[test_case(10, ymd(2025, 10, 1), ymd(2025, 10, 2) ; "rendered for october")]
fn test_cross_month_event_is_clipped(month: u32, start: NaiveDate, end: NaiveDate) {
    // Sept 28 through Oct 2 inclusive, exclusive end Oct 3
    let trip = event("Trip", ymd(2025, 9, 28), ymd(2025, 10, 3));
    let grid = build_month_grid(2025, month).unwrap();
    let normalized = normalize_event(&trip, grid.first_of_month, grid.last_of_month)
        .unwrap()
        .unwrap();
    assert_eq!((normalized.start_date, normalized.end_date), (start, end));
}

#[test_case("Short title", "Short title" ; "short title untouched")]
#[test_case("Exactly twenty chars", "Exactly twenty chars" ; "at the budget")]
#[test_case("Quarterly planning offsite, Busan", "Quarterly plannin..." ; "long title cut")]
#[test_case("가족 여행 제주도 2025 가을 단풍 구경 일정", "가족 여행 제주도 2025 가을..." ; "hangul counted by character")]
fn test_title_truncation(title: &str, expected: &str) {
    let label = truncate_title(title, 20);
    assert_eq!(label, expected);
    assert!(label.chars().count() <= 20);
}

#[test]
fn test_thirty_character_title() {
    let title = "abcdefghijklmnopqrstuvwxyz1234";
    assert_eq!(title.chars().count(), 30);

    let result = layout(2025, 9, &[event(title, ymd(2025, 9, 10), ymd(2025, 9, 10))]);
    let label = &result.pills[0].label;
    assert_eq!(label.chars().count(), 20);
    assert_eq!(label, "abcdefghijklmnopq...");
}

#[test]
fn test_long_event_can_change_slot_between_weeks() {
    // Week 1 fills slot 0 before the long event arrives; week 2 is empty
    let events = vec![
        event("Blocker", ymd(2025, 9, 12), ymd(2025, 9, 12)),
        event("Conference", ymd(2025, 9, 11), ymd(2025, 9, 17)),
    ];
    let result = layout(2025, 9, &events);
    assert_eq!(
        placements(&result),
        vec![(1, 5, 5, 0), (1, 4, 6, 1), (2, 0, 2, 0)]
    );
}
