//! Month grid construction.

use crate::models::grid::{MonthGrid, WeekRow};
use crate::utils::date::{
    add_days, first_of_month, last_of_month, saturday_on_or_after, sunday_on_or_before,
};

use super::LayoutError;

/// Years outside this range are rejected before any date arithmetic.
pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

/// Build the Sunday-first week rows covering `month` of `year`.
///
/// Rows run from the Sunday on or before the 1st through the Saturday on or
/// after the last day, so the row count follows from the date span (4 to 6).
pub fn build_month_grid(year: i32, month: u32) -> Result<MonthGrid, LayoutError> {
    if !(1..=12).contains(&month) {
        return Err(LayoutError::InvalidMonth { year, month });
    }
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(LayoutError::InvalidYear(year));
    }

    let first = first_of_month(year, month).ok_or(LayoutError::InvalidYear(year))?;
    let last = last_of_month(year, month).ok_or(LayoutError::InvalidYear(year))?;

    let anchor = sunday_on_or_before(first);
    let final_saturday = saturday_on_or_after(last);

    let mut weeks = Vec::with_capacity(6);
    let mut week_start = anchor;
    while week_start <= final_saturday {
        let days = std::array::from_fn(|offset| add_days(week_start, offset as i64));
        weeks.push(WeekRow { days });
        week_start = add_days(week_start, 7);
    }

    log::debug!(
        "Built month grid for {}-{:02}: {} rows from {} to {}",
        year,
        month,
        weeks.len(),
        anchor,
        final_saturday
    );

    Ok(MonthGrid {
        year,
        month,
        first_of_month: first,
        last_of_month: last,
        weeks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate, Weekday};
    use pretty_assertions::assert_eq;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_september_2025_has_five_rows() {
        // 2025-09-01 is a Monday
        let grid = build_month_grid(2025, 9).unwrap();
        assert_eq!(grid.row_count(), 5);
        assert_eq!(grid.weeks[0].start(), ymd(2025, 8, 31));
        assert_eq!(grid.weeks[4].end(), ymd(2025, 10, 4));
        assert_eq!(grid.first_of_month, ymd(2025, 9, 1));
        assert_eq!(grid.last_of_month, ymd(2025, 9, 30));
    }

    #[test]
    fn test_august_2025_has_six_rows() {
        // 2025-08-01 is a Friday and August has 31 days
        let grid = build_month_grid(2025, 8).unwrap();
        assert_eq!(grid.row_count(), 6);
        assert_eq!(grid.weeks[0].start(), ymd(2025, 7, 27));
        assert_eq!(grid.weeks[5].end(), ymd(2025, 9, 6));
    }

    #[test]
    fn test_february_2026_has_four_rows() {
        // 2026-02-01 is a Sunday and February 2026 has 28 days
        let grid = build_month_grid(2026, 2).unwrap();
        assert_eq!(grid.row_count(), 4);
        assert_eq!(grid.weeks[0].start(), ymd(2026, 2, 1));
        assert_eq!(grid.weeks[3].end(), ymd(2026, 2, 28));
    }

    #[test]
    fn test_december_rolls_into_january() {
        let grid = build_month_grid(2025, 12).unwrap();
        assert_eq!(grid.last_of_month, ymd(2025, 12, 31));
        assert_eq!(grid.weeks.last().unwrap().end(), ymd(2026, 1, 3));
    }

    #[test]
    fn test_rows_start_on_sunday() {
        let grid = build_month_grid(2025, 10).unwrap();
        for week in &grid.weeks {
            assert_eq!(week.start().weekday(), Weekday::Sun);
            assert_eq!(week.end().weekday(), Weekday::Sat);
        }
    }

    #[test]
    fn test_invalid_month() {
        assert_eq!(
            build_month_grid(2025, 0),
            Err(LayoutError::InvalidMonth { year: 2025, month: 0 })
        );
        assert_eq!(
            build_month_grid(2025, 13),
            Err(LayoutError::InvalidMonth { year: 2025, month: 13 })
        );
    }

    #[test]
    fn test_invalid_year() {
        assert_eq!(build_month_grid(0, 5), Err(LayoutError::InvalidYear(0)));
        assert_eq!(build_month_grid(10_000, 5), Err(LayoutError::InvalidYear(10_000)));
    }

    #[test]
    fn test_in_month_cells_match_calendar() {
        let grid = build_month_grid(2024, 2).unwrap();
        let in_month: Vec<u32> = grid
            .cells()
            .filter(|(_, _, date)| grid.is_in_month(*date))
            .map(|(_, _, date)| date.day())
            .collect();
        assert_eq!(in_month, (1..=29).collect::<Vec<_>>());
    }
}
