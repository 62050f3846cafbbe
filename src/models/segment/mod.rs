// Segment model
// The part of one event that falls inside one week row

use serde::Serialize;

/// One event's presence in one week row, with its vertical slot.
///
/// `start_column <= end_column`, both in `0..7`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub week_index: usize,
    pub start_column: usize,
    pub end_column: usize,
    pub slot: usize,
    pub title: String,
    pub color_tag: Option<String>,
}

impl Segment {
    /// Number of day columns covered.
    pub fn span(&self) -> usize {
        self.end_column - self.start_column + 1
    }

    /// Whether the inclusive column ranges of the two segments intersect.
    pub fn overlaps_columns(&self, start_column: usize, end_column: usize) -> bool {
        !(end_column < self.start_column || start_column > self.end_column)
    }
}
