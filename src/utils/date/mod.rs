// Date utility functions
// Pure calendar-date arithmetic shared by the layout services

use chrono::{Datelike, Duration, NaiveDate};

/// A calendar day with no time-of-day and no timezone.
pub type CalendarDate = NaiveDate;

/// First day of the given month, or `None` when the pair is out of range.
pub fn first_of_month(year: i32, month: u32) -> Option<CalendarDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Last day of the given month: the day before the first of the following month.
pub fn last_of_month(year: i32, month: u32) -> Option<CalendarDate> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

pub fn add_days(date: CalendarDate, days: i64) -> CalendarDate {
    date + Duration::days(days)
}

/// Signed number of days from `from` to `to`.
pub fn days_between(from: CalendarDate, to: CalendarDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

/// The Sunday on or before `date`.
pub fn sunday_on_or_before(date: CalendarDate) -> CalendarDate {
    let offset = date.weekday().num_days_from_sunday() as i64;
    add_days(date, -offset)
}

/// The Saturday on or after `date`.
pub fn saturday_on_or_after(date: CalendarDate) -> CalendarDate {
    let offset = 6 - date.weekday().num_days_from_sunday() as i64;
    add_days(date, offset)
}
