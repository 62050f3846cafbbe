//! Reduction of raw events to inclusive, month-clipped date ranges.

use chrono::Duration;

use crate::models::event::{NormalizedEvent, RawEvent};
use crate::utils::date::CalendarDate;

use super::LayoutError;

/// Normalize one raw event against the month `[first_of_month, last_of_month]`.
///
/// An end later than the start is treated as exclusive (the all-day
/// convention), so the inclusive end is one day earlier. An end equal to the
/// start is a single-day event. Callers must hand over exclusive ends for
/// multi-day all-day events; an inclusive multi-day range loses its last day.
///
/// Returns `Ok(None)` when the event does not touch the month, and an error
/// when either boundary cannot be reduced to a calendar date.
pub fn normalize_event(
    raw: &RawEvent,
    first_of_month: CalendarDate,
    last_of_month: CalendarDate,
) -> Result<Option<NormalizedEvent>, LayoutError> {
    let start = raw.start.calendar_date()?;
    let end = raw.end.calendar_date()?;

    let inclusive_end = if end > start {
        end - Duration::days(1)
    } else {
        end
    };

    let clipped_start = start.max(first_of_month);
    let clipped_end = inclusive_end.min(last_of_month);

    if clipped_start > last_of_month || clipped_end < first_of_month {
        return Ok(None);
    }
    // An end before the start cannot be drawn in any week.
    if clipped_start > clipped_end {
        return Ok(None);
    }

    Ok(Some(NormalizedEvent {
        title: raw.display_title().to_string(),
        start_date: clipped_start,
        end_date: clipped_end,
        color_tag: raw.color_tag.clone(),
    }))
}

/// Normalize every event for the month, preserving input order.
///
/// Events with unparseable dates are skipped with a warning; the rest of
/// the month still renders.
pub fn normalize_events(
    raws: &[RawEvent],
    first_of_month: CalendarDate,
    last_of_month: CalendarDate,
) -> Vec<NormalizedEvent> {
    let mut prepared = Vec::with_capacity(raws.len());

    for raw in raws {
        match normalize_event(raw, first_of_month, last_of_month) {
            Ok(Some(event)) => prepared.push(event),
            Ok(None) => {
                log::debug!(
                    "Event {:?} '{}' does not overlap {}..={}, excluded",
                    raw.id,
                    raw.display_title(),
                    first_of_month,
                    last_of_month
                );
            }
            Err(err) => {
                log::warn!(
                    "Skipping event {:?} '{}' with unparseable dates: {}",
                    raw.id,
                    raw.display_title(),
                    err
                );
            }
        }
    }

    prepared
}
