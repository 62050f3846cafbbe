// Event module
// Raw events as supplied by an event source, and their month-clipped form

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::date::CalendarDate;

/// Title shown for events that arrive without one.
pub const UNTITLED_EVENT: &str = "(No title)";

/// Raised when an event boundary cannot be reduced to a calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported date value: {value:?}")]
pub struct MalformedDate {
    pub value: String,
}

/// Start or end boundary of a raw event.
///
/// Sources hand over dates in whatever shape they have them: a bare date, a
/// local date-time, a date-time with an offset, or unparsed text. Every
/// variant reduces to a [`CalendarDate`] through [`EventTime::calendar_date`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventTime {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Zoned(DateTime<FixedOffset>),
    Text(String),
}

impl EventTime {
    /// Calendar date component of this boundary. Offsets are not converted:
    /// a zoned value yields the date on its own wall clock.
    pub fn calendar_date(&self) -> Result<CalendarDate, MalformedDate> {
        match self {
            EventTime::Date(date) => Ok(*date),
            EventTime::DateTime(dt) => Ok(dt.date()),
            EventTime::Zoned(dt) => Ok(dt.date_naive()),
            EventTime::Text(text) => parse_date_text(text),
        }
    }
}

impl From<NaiveDate> for EventTime {
    fn from(date: NaiveDate) -> Self {
        EventTime::Date(date)
    }
}

impl From<NaiveDateTime> for EventTime {
    fn from(dt: NaiveDateTime) -> Self {
        EventTime::DateTime(dt)
    }
}

impl From<DateTime<FixedOffset>> for EventTime {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        EventTime::Zoned(dt)
    }
}

impl From<&str> for EventTime {
    fn from(text: &str) -> Self {
        EventTime::Text(text.to_string())
    }
}

fn parse_date_text(text: &str) -> Result<CalendarDate, MalformedDate> {
    let trimmed = text.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt.date());
        }
    }

    // iCalendar compact forms: 20250928 and 20250928T090000[Z]
    let compact = trimmed.trim_end_matches('Z');
    if let Ok(date) = NaiveDate::parse_from_str(compact, "%Y%m%d") {
        return Ok(date);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(compact, "%Y%m%dT%H%M%S") {
        return Ok(dt.date());
    }

    Err(MalformedDate {
        value: text.to_string(),
    })
}

/// An event exactly as the event source produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "summary")]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    #[serde(default)]
    pub is_all_day: bool,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, alias = "color_id")]
    pub color_tag: Option<String>,
}

impl RawEvent {
    pub fn builder() -> RawEventBuilder {
        RawEventBuilder::new()
    }

    /// Title to display, falling back to [`UNTITLED_EVENT`].
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.trim().is_empty() => title,
            _ => UNTITLED_EVENT,
        }
    }
}

/// Builder for raw events, mostly used by sources and tests
pub struct RawEventBuilder {
    id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    start: Option<EventTime>,
    end: Option<EventTime>,
    is_all_day: bool,
    location: Option<String>,
    color_tag: Option<String>,
}

impl RawEventBuilder {
    pub fn new() -> Self {
        Self {
            id: None,
            title: None,
            description: None,
            start: None,
            end: None,
            is_all_day: false,
            location: None,
            color_tag: None,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn start(mut self, start: impl Into<EventTime>) -> Self {
        self.start = Some(start.into());
        self
    }

    pub fn end(mut self, end: impl Into<EventTime>) -> Self {
        self.end = Some(end.into());
        self
    }

    pub fn all_day(mut self, all_day: bool) -> Self {
        self.is_all_day = all_day;
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn color_tag(mut self, color_tag: impl Into<String>) -> Self {
        self.color_tag = Some(color_tag.into());
        self
    }

    /// Build the event. Start is required; a missing end means a single-day
    /// event ending where it starts.
    pub fn build(self) -> Result<RawEvent, String> {
        let start = self.start.ok_or("Event start is required")?;
        let end = self.end.unwrap_or_else(|| start.clone());

        Ok(RawEvent {
            id: self.id.unwrap_or_default(),
            title: self.title,
            description: self.description,
            start,
            end,
            is_all_day: self.is_all_day,
            location: self.location,
            color_tag: self.color_tag,
        })
    }
}

impl Default for RawEventBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// An event reduced to an inclusive date range inside one month.
///
/// Invariant: `start_date <= end_date`, both within the month it was
/// normalized for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedEvent {
    pub title: String,
    pub start_date: CalendarDate,
    pub end_date: CalendarDate,
    pub color_tag: Option<String>,
}
