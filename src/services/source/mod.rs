//! Event sources: where the raw events for a month come from.
//!
//! A source hands back every event that might touch the requested month,
//! with recurrences already expanded. Clipping and date normalization stay
//! in the layout service, so sources only prefilter loosely.

pub mod fetcher;
pub mod ics;
pub mod json;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use thiserror::Error;

use crate::models::event::RawEvent;
use crate::utils::date::{first_of_month, last_of_month};

pub use ics::IcsSource;
pub use json::JsonFileSource;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse events from {origin}: {message}")]
    Parse { origin: String, message: String },

    #[error("event fetch failed: {0}")]
    Fetch(String),

    #[error("{year}-{month:02} is not a valid month")]
    InvalidMonth { year: i32, month: u32 },
}

/// Supplies raw events and an opaque version tag for change detection.
#[cfg_attr(test, mockall::automock)]
pub trait EventSource {
    /// Events that may overlap the month, in the source's own order.
    fn events_for_month(&self, year: i32, month: u32) -> Result<Vec<RawEvent>, SourceError>;

    /// Tag that changes whenever the underlying events change. `None` means
    /// the source cannot tell, and every poll renders.
    fn version_tag(&self) -> Result<Option<String>, SourceError>;
}

/// Open a source from a configured location: an `https://` URL or a path
/// ending in `.ics` reads iCalendar, anything else is read as a JSON list.
pub fn open_source(location: &str) -> Result<Box<dyn EventSource + Send + Sync>, SourceError> {
    let trimmed = location.trim();
    if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
        return Ok(Box::new(IcsSource::from_url(trimmed)?));
    }

    let path = PathBuf::from(trimmed);
    let is_ics = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ics"));

    if is_ics {
        Ok(Box::new(IcsSource::from_file(path)))
    } else {
        Ok(Box::new(JsonFileSource::new(path)))
    }
}

/// Keep events whose raw date range could touch the month.
///
/// Events with dates that do not parse are kept so the layout service can
/// report them.
pub fn retain_month_candidates(
    events: Vec<RawEvent>,
    year: i32,
    month: u32,
) -> Result<Vec<RawEvent>, SourceError> {
    let (Some(first), Some(last)) = (first_of_month(year, month), last_of_month(year, month)) else {
        return Err(SourceError::InvalidMonth { year, month });
    };

    Ok(events
        .into_iter()
        .filter(|event| {
            match (event.start.calendar_date(), event.end.calendar_date()) {
                (Ok(start), Ok(end)) => start <= last && end.max(start) >= first,
                _ => true,
            }
        })
        .collect())
}

pub(crate) fn content_hash(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
