//! Month layout: grid construction, event normalization, segmentation into
//! week slots and pixel geometry.
//!
//! Everything here is a pure function of its inputs. Each call builds the
//! grid and all segments from scratch and holds no state between calls, so
//! independent renders can run concurrently.

pub mod geometry;
pub mod grid;
pub mod normalize;
pub mod segment;

use serde::Serialize;
use thiserror::Error;

use crate::models::event::{MalformedDate, NormalizedEvent, RawEvent};
use crate::models::grid::MonthGrid;
use crate::models::settings::LayoutConfig;

pub use geometry::{
    pill_geometry, pill_rect, truncate_title, ApproxTextMeasure, PillGeometry, PixelRect,
    TextMeasure,
};
pub use grid::build_month_grid;
pub use normalize::{normalize_event, normalize_events};
pub use segment::{allocate_segments, DEFAULT_MAX_SLOTS_PER_WEEK};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("month must be between 1 and 12, got {month} (year {year})")]
    InvalidMonth { year: i32, month: u32 },

    #[error("year {0} is outside the supported range")]
    InvalidYear(i32),

    #[error(transparent)]
    MalformedDate(#[from] MalformedDate),
}

/// The complete layout of one month, handed to scene composition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthLayout {
    pub grid: MonthGrid,
    pub events: Vec<NormalizedEvent>,
    pub pills: Vec<PillGeometry>,
    /// Top of the first week row
    pub rows_top: i32,
    pub row_height: i32,
}

impl MonthLayout {
    pub fn row_top(&self, week_index: usize) -> i32 {
        self.rows_top + week_index as i32 * self.row_height
    }

    /// Pills drawn in one week row
    pub fn pills_in_week(&self, week_index: usize) -> impl Iterator<Item = &PillGeometry> + '_ {
        self.pills
            .iter()
            .filter(move |pill| pill.segment.week_index == week_index)
    }
}

/// Lay out `events` on the grid of `month` of `year`.
///
/// Fails only for an invalid year or month. Events with unparseable dates
/// are skipped with a warning, events outside the month are ignored, and
/// segments beyond the slot budget are dropped.
pub fn build_month_layout(
    year: i32,
    month: u32,
    events: &[RawEvent],
    config: &LayoutConfig,
    measure: &dyn TextMeasure,
) -> Result<MonthLayout, LayoutError> {
    let grid = build_month_grid(year, month)?;
    let normalized = normalize_events(events, grid.first_of_month, grid.last_of_month);
    let segments = allocate_segments(&grid.weeks, &normalized, config.max_slots_per_week);

    let rows_top = config.rows_top();
    let row_height = config.row_height(grid.row_count());

    let pills = segments
        .iter()
        .map(|segment| {
            let row_top = rows_top + segment.week_index as i32 * row_height;
            pill_geometry(segment, row_top, config, measure)
        })
        .collect();

    log::debug!(
        "Laid out {}-{:02}: {} of {} events in month, {} pills",
        year,
        month,
        normalized.len(),
        events.len(),
        segments.len()
    );

    Ok(MonthLayout {
        grid,
        events: normalized,
        pills,
        rows_top,
        row_height,
    })
}
