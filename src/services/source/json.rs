use std::fs;
use std::path::{Path, PathBuf};

use crate::models::event::RawEvent;

use super::{content_hash, retain_month_candidates, EventSource, SourceError};

/// Events stored as a JSON array of raw events in a local file.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<String, SourceError> {
        fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl EventSource for JsonFileSource {
    fn events_for_month(&self, year: i32, month: u32) -> Result<Vec<RawEvent>, SourceError> {
        let content = self.read()?;
        let records: Vec<serde_json::Value> =
            serde_json::from_str(&content).map_err(|err| SourceError::Parse {
                origin: self.path.display().to_string(),
                message: err.to_string(),
            })?;

        let total = records.len();
        let events: Vec<RawEvent> = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(event) => Some(event),
                Err(err) => {
                    log::warn!(
                        "Skipping event #{} in {}: {}",
                        index,
                        self.path.display(),
                        err
                    );
                    None
                }
            })
            .collect();

        log::debug!(
            "Loaded {} of {} events from {}",
            events.len(),
            total,
            self.path.display()
        );
        retain_month_candidates(events, year, month)
    }

    fn version_tag(&self) -> Result<Option<String>, SourceError> {
        let content = self.read()?;
        Ok(Some(content_hash(content.as_bytes())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const EVENTS: &str = r#"[
        {"id": "1", "title": "Trip", "start": "2025-09-28", "end": "2025-10-03", "is_all_day": true},
        {"id": "2", "summary": "Standup", "start": "2025-09-10T09:00:00", "end": "2025-09-10T09:15:00"},
        {"id": "3", "title": "Old", "start": "2025-06-01", "end": "2025-06-02"}
    ]"#;

    fn write_events(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_reads_events_for_month() {
        let file = write_events(EVENTS);
        let source = JsonFileSource::new(file.path());

        let events = source.events_for_month(2025, 9).unwrap();
        let ids: Vec<_> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(events[1].display_title(), "Standup");
    }

    #[test]
    fn test_version_tag_follows_content() {
        let file = write_events(EVENTS);
        let source = JsonFileSource::new(file.path());
        let first = source.version_tag().unwrap();
        assert_eq!(first, source.version_tag().unwrap());

        fs::write(file.path(), "[]").unwrap();
        assert_ne!(first, source.version_tag().unwrap());
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let file = write_events(
            r#"[
                {"id": "good", "title": "Dentist", "start": "2025-09-03", "end": "2025-09-03"},
                {"id": "no-start", "title": "Lost", "end": "2025-09-04"},
                {"title": "No id", "start": "2025-09-05", "end": "2025-09-05"},
                {"id": "numeric", "title": "Bad date", "start": 20250906, "end": "2025-09-06"},
                "not an object"
            ]"#,
        );
        let source = JsonFileSource::new(file.path());

        let events = source.events_for_month(2025, 9).unwrap();
        let titles: Vec<_> = events.iter().map(|e| e.display_title()).collect();
        assert_eq!(titles, vec!["Dentist", "No id"]);
        assert_eq!(events[1].id, "");
    }

    #[test]
    fn test_top_level_must_be_array() {
        let file = write_events(r#"{"id": "1"}"#);
        let source = JsonFileSource::new(file.path());
        assert!(matches!(
            source.events_for_month(2025, 9),
            Err(SourceError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let source = JsonFileSource::new("/nonexistent/events.json");
        assert!(matches!(
            source.events_for_month(2025, 9),
            Err(SourceError::Io { .. })
        ));
    }

    #[test]
    fn test_invalid_json() {
        let file = write_events("{ not json");
        let source = JsonFileSource::new(file.path());
        assert!(matches!(
            source.events_for_month(2025, 9),
            Err(SourceError::Parse { .. })
        ));
    }
}
