// Test fixtures - reusable test data
// Provides consistent dates and events across the integration tests

#![allow(dead_code)]

use calendar_image::models::event::{EventTime, RawEvent};
use chrono::NaiveDate;

/// Sample dates for testing
pub mod dates {
    use super::*;

    pub fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    /// Wed Sept 3, 2025
    pub fn sept_3_2025() -> NaiveDate {
        ymd(2025, 9, 3)
    }

    /// Sun Sept 28, 2025, the start of the last row of September
    pub fn sept_28_2025() -> NaiveDate {
        ymd(2025, 9, 28)
    }

    /// Feb 29, 2024 (leap year)
    pub fn leap_day_2024() -> NaiveDate {
        ymd(2024, 2, 29)
    }
}

/// Sample events for testing
pub mod events {
    use super::*;

    pub fn event(
        id: &str,
        title: &str,
        start: impl Into<EventTime>,
        end: impl Into<EventTime>,
    ) -> RawEvent {
        RawEvent::builder()
            .id(id)
            .title(title)
            .start(start)
            .end(end)
            .build()
            .unwrap()
    }

    /// All-day event on a single date (end equal to start)
    pub fn single_day(id: &str, title: &str, date: NaiveDate) -> RawEvent {
        event(id, title, date, date)
    }

    /// A realistic September 2025: a cross-month trip, a weekly meeting
    /// pattern expanded upstream, a crowded day and one broken entry.
    pub fn busy_september() -> Vec<RawEvent> {
        let ymd = dates::ymd;
        let mut events = vec![
            event("trip", "Family trip to Jeju", ymd(2025, 9, 28), ymd(2025, 10, 3)),
            event("conf", "RustConf", ymd(2025, 9, 2), ymd(2025, 9, 5)),
            single_day("dentist", "Dentist", ymd(2025, 9, 3)),
            single_day("lunch", "Lunch with the whole extended family", ymd(2025, 9, 3)),
            single_day("call", "Call", ymd(2025, 9, 3)),
            event("broken", "Broken", "someday", "later"),
        ];
        for (index, day) in [8, 15, 22, 29].into_iter().enumerate() {
            events.push(single_day(
                &format!("standup-{index}"),
                "Weekly planning",
                ymd(2025, 9, day),
            ));
        }
        events
    }
}
