// Month grid model
// Sunday-first week rows covering one calendar month

use chrono::Datelike;
use serde::Serialize;

use crate::utils::date::CalendarDate;

pub const DAYS_PER_WEEK: usize = 7;

/// Seven consecutive dates, index 0 is Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekRow {
    pub days: [CalendarDate; DAYS_PER_WEEK],
}

impl WeekRow {
    pub fn start(&self) -> CalendarDate {
        self.days[0]
    }

    pub fn end(&self) -> CalendarDate {
        self.days[DAYS_PER_WEEK - 1]
    }

    pub fn contains(&self, date: CalendarDate) -> bool {
        self.start() <= date && date <= self.end()
    }
}

/// The week rows of one month, including the leading and trailing days of
/// the adjacent months needed to fill whole weeks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub first_of_month: CalendarDate,
    pub last_of_month: CalendarDate,
    pub weeks: Vec<WeekRow>,
}

impl MonthGrid {
    pub fn row_count(&self) -> usize {
        self.weeks.len()
    }

    /// Whether `date` belongs to the month this grid was built for.
    pub fn is_in_month(&self, date: CalendarDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Iterate every cell as `(week_index, column, date)`.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, CalendarDate)> + '_ {
        self.weeks.iter().enumerate().flat_map(|(week_index, week)| {
            week.days
                .iter()
                .enumerate()
                .map(move |(column, date)| (week_index, column, *date))
        })
    }
}
