use std::fs;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::event::{EventTime, RawEvent};

use super::fetcher::{check_ics_content, redact_url, IcsFetcher};
use super::{content_hash, retain_month_candidates, EventSource, SourceError};

enum IcsLocation {
    File(PathBuf),
    Url { url: String, fetcher: IcsFetcher },
}

/// iCalendar feed read from a local `.ics` file or an HTTPS URL.
///
/// Only the first occurrence of a recurring event is reported; feeds are
/// expected to be expanded upstream.
pub struct IcsSource {
    location: IcsLocation,
}

impl IcsSource {
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: IcsLocation::File(path.into()),
        }
    }

    pub fn from_url(url: impl Into<String>) -> Result<Self, SourceError> {
        let fetcher = IcsFetcher::new().map_err(|err| SourceError::Fetch(format!("{err:#}")))?;
        Ok(Self {
            location: IcsLocation::Url {
                url: url.into(),
                fetcher,
            },
        })
    }

    fn origin(&self) -> String {
        match &self.location {
            IcsLocation::File(path) => path.display().to_string(),
            IcsLocation::Url { url, .. } => redact_url(url),
        }
    }

    fn load(&self) -> Result<(String, Option<String>), SourceError> {
        match &self.location {
            IcsLocation::File(path) => {
                let content = fs::read_to_string(path).map_err(|source| SourceError::Io {
                    path: path.clone(),
                    source,
                })?;
                check_ics_content(&content).map_err(|err| SourceError::Parse {
                    origin: self.origin(),
                    message: err.to_string(),
                })?;
                Ok((content, None))
            }
            IcsLocation::Url { url, fetcher } => {
                let fetched = fetcher
                    .fetch_ics(url)
                    .map_err(|err| SourceError::Fetch(format!("{err:#}")))?;
                Ok((fetched.content, fetched.etag))
            }
        }
    }
}

impl EventSource for IcsSource {
    fn events_for_month(&self, year: i32, month: u32) -> Result<Vec<RawEvent>, SourceError> {
        let (content, _) = self.load()?;
        let events = parse_events(&content);
        log::debug!("Parsed {} events from {}", events.len(), self.origin());
        retain_month_candidates(events, year, month)
    }

    fn version_tag(&self) -> Result<Option<String>, SourceError> {
        if let IcsLocation::Url { url, fetcher } = &self.location {
            match fetcher.fetch_etag(url) {
                Ok(Some(etag)) => return Ok(Some(etag)),
                Ok(None) => {}
                Err(err) => {
                    log::debug!("HEAD for {} failed, falling back to GET: {:#}", self.origin(), err);
                }
            }
        }

        let (content, etag) = self.load()?;
        Ok(Some(etag.unwrap_or_else(|| content_hash(content.as_bytes()))))
    }
}

/// Parse every VEVENT in an iCalendar document, in document order.
///
/// Cancelled events are dropped. Date values that cannot be read are kept as
/// text so that layout can report them.
pub fn parse_events(ics_content: &str) -> Vec<RawEvent> {
    let mut events = Vec::new();
    let mut current: Option<PartialEvent> = None;

    for line in unfold_lines(ics_content) {
        let line = line.trim_end();

        if line == "BEGIN:VEVENT" {
            current = Some(PartialEvent::default());
        } else if line == "END:VEVENT" {
            if let Some(partial) = current.take() {
                if let Some(event) = partial.finish() {
                    events.push(event);
                }
            }
        } else if let Some(partial) = current.as_mut() {
            partial.apply_property(line);
        }
    }

    events
}

/// Join RFC 5545 folded lines: a line starting with a space or tab
/// continues the previous one.
fn unfold_lines(content: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();

    for raw in content.lines() {
        let raw = raw.trim_end_matches('\r');
        match raw.strip_prefix(' ').or_else(|| raw.strip_prefix('\t')) {
            Some(continuation) if !lines.is_empty() => {
                if let Some(last) = lines.last_mut() {
                    last.push_str(continuation);
                }
            }
            _ => lines.push(raw.to_string()),
        }
    }

    lines
}

#[derive(Debug, Default)]
struct PartialEvent {
    uid: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    location: Option<String>,
    start: Option<EventTime>,
    end: Option<EventTime>,
    all_day: bool,
    color: Option<String>,
    cancelled: bool,
    recurring: bool,
}

impl PartialEvent {
    fn apply_property(&mut self, line: &str) {
        let Some(colon_pos) = line.find(':') else {
            return;
        };
        let (key_part, value) = line.split_at(colon_pos);
        let value = &value[1..];

        let key = match key_part.find(';') {
            Some(semicolon) => &key_part[..semicolon],
            None => key_part,
        };

        match key {
            "UID" => self.uid = Some(value.to_string()),
            "SUMMARY" => self.summary = Some(unescape_text(value)),
            "DESCRIPTION" => self.description = Some(unescape_text(value)),
            "LOCATION" => self.location = Some(unescape_text(value)),
            "COLOR" | "X-GOOGLE-COLOR-ID" | "X-APPLE-CALENDAR-COLOR" => {
                self.color = Some(value.trim().to_string());
            }
            "DTSTART" => {
                let is_date = key_part.contains("VALUE=DATE") && !key_part.contains("VALUE=DATE-TIME");
                self.all_day = is_date || value.len() == 8;
                self.start = Some(parse_ics_time(value));
            }
            "DTEND" => self.end = Some(parse_ics_time(value)),
            "STATUS" => self.cancelled = value.eq_ignore_ascii_case("CANCELLED"),
            "RRULE" => self.recurring = true,
            _ => {}
        }
    }

    fn finish(self) -> Option<RawEvent> {
        if self.cancelled {
            log::debug!("Skipping cancelled event {:?}", self.uid);
            return None;
        }
        let Some(start) = self.start else {
            log::warn!("Skipping VEVENT {:?} without DTSTART", self.uid);
            return None;
        };
        if self.recurring {
            log::debug!(
                "Event {:?} has an RRULE; only its first occurrence is shown",
                self.uid
            );
        }

        Some(RawEvent {
            id: self.uid.unwrap_or_default(),
            title: self.summary,
            description: self.description,
            end: self.end.unwrap_or_else(|| start.clone()),
            start,
            is_all_day: self.all_day,
            location: self.location,
            color_tag: self.color,
        })
    }
}

fn parse_ics_time(value: &str) -> EventTime {
    let trimmed = value.trim();
    let compact = trimmed.trim_end_matches('Z');

    if let Ok(date) = NaiveDate::parse_from_str(compact, "%Y%m%d") {
        return EventTime::Date(date);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(compact, "%Y%m%dT%H%M%S") {
        return EventTime::DateTime(dt);
    }
    EventTime::Text(trimmed.to_string())
}

/// TEXT value unescaping, one escape at a time from the left.
fn unescape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(escaped @ (',' | ';' | '\\')) => out.push(escaped),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}
