//! Splitting events into per-week segments and stacking them into slots.

use crate::models::event::NormalizedEvent;
use crate::models::grid::WeekRow;
use crate::models::segment::Segment;
use crate::utils::date::days_between;

pub const DEFAULT_MAX_SLOTS_PER_WEEK: usize = 3;

/// Split events at week boundaries and give each piece a vertical slot.
///
/// Weeks are independent: slot occupancy starts empty in every row, and
/// events are placed in the order given (first fit, lowest free slot). A
/// piece that finds no free slot among `max_slots_per_week` is dropped for
/// that week only; the same event may still appear in other weeks, and may
/// land in a different slot there.
///
/// Output is ordered by week, then by input event order.
pub fn allocate_segments(
    weeks: &[WeekRow],
    events: &[NormalizedEvent],
    max_slots_per_week: usize,
) -> Vec<Segment> {
    let mut segments = Vec::new();

    for (week_index, week) in weeks.iter().enumerate() {
        let week_start = week.start();
        let week_end = week.end();
        let mut placed: Vec<Segment> = Vec::new();

        for event in events {
            let seg_start = event.start_date.max(week_start);
            let seg_end = event.end_date.min(week_end);
            if seg_start > seg_end {
                continue;
            }

            let start_column = days_between(week_start, seg_start) as usize;
            let end_column = start_column + days_between(seg_start, seg_end) as usize;

            let Some(slot) = find_free_slot(&placed, start_column, end_column, max_slots_per_week)
            else {
                log::info!(
                    "Week {} has no free slot for '{}' (columns {}..={}), segment dropped",
                    week_index,
                    event.title,
                    start_column,
                    end_column
                );
                continue;
            };

            placed.push(Segment {
                week_index,
                start_column,
                end_column,
                slot,
                title: event.title.clone(),
                color_tag: event.color_tag.clone(),
            });
        }

        segments.extend(placed);
    }

    segments
}

/// Lowest slot in which no already placed segment overlaps the column range.
fn find_free_slot(
    placed: &[Segment],
    start_column: usize,
    end_column: usize,
    max_slots: usize,
) -> Option<usize> {
    (0..max_slots).find(|&slot| {
        !placed
            .iter()
            .filter(|seg| seg.slot == slot)
            .any(|seg| seg.overlaps_columns(start_column, end_column))
    })
}
