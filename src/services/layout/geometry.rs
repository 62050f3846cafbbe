//! Pixel geometry for segments: pill rectangles and their display text.

use serde::Serialize;

use crate::models::segment::Segment;
use crate::models::settings::LayoutConfig;

const ELLIPSIS: &str = "...";

/// Text metrics supplied by whoever draws the glyphs.
///
/// Layout only needs widths (for centering) and a line height; which font
/// produces them is the backend's business.
pub trait TextMeasure {
    fn text_width(&self, text: &str, font_size: f32) -> f32;

    fn line_height(&self, font_size: f32) -> f32 {
        font_size
    }
}

/// Width estimate from character counts.
///
/// Narrow (ASCII) characters advance by `narrow_advance` em, everything
/// else (Hangul, CJK, emoji) by a full em.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproxTextMeasure {
    pub narrow_advance: f32,
}

impl Default for ApproxTextMeasure {
    fn default() -> Self {
        Self { narrow_advance: 0.55 }
    }
}

impl TextMeasure for ApproxTextMeasure {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        let ems: f32 = text
            .chars()
            .map(|ch| if ch.is_ascii() { self.narrow_advance } else { 1.0 })
            .sum();
        ems * font_size
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl PixelRect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// A segment resolved to pixels, ready for drawing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PillGeometry {
    pub segment: Segment,
    pub rect: PixelRect,
    /// Title after truncation
    pub label: String,
    /// Top-left of the label, centered inside `rect`
    pub label_x: i32,
    pub label_y: i32,
}

/// Cut `title` to `max_chars` characters, ending in "..." when it was longer.
///
/// Counts characters, not rendered width, so the result only approximates
/// what fits.
pub fn truncate_title(title: &str, max_chars: usize) -> String {
    if title.chars().count() <= max_chars {
        return title.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut truncated: String = title.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// Rectangle of a segment whose week row starts at `row_top`.
///
/// Spans the covered day columns inset by the horizontal padding, sits below
/// the day number at its slot's offset, and is widened around its center
/// when narrower than the configured minimum.
pub fn pill_rect(segment: &Segment, row_top: i32, config: &LayoutConfig) -> PixelRect {
    let day_width = config.day_width();
    let padding = config.pill_padding_x as i32;

    let mut left = config.grid_x() + segment.start_column as i32 * day_width + padding;
    let mut right = config.grid_x() + (segment.end_column as i32 + 1) * day_width - padding;

    let min_width = config.min_pill_width as i32;
    if right - left < min_width {
        let center = (left + right).div_euclid(2);
        left = center - min_width / 2;
        right = left + min_width;
    }

    let top = row_top + config.date_label_offset as i32 + segment.slot as i32 * config.slot_pitch as i32;
    let bottom = top + config.pill_height as i32;

    PixelRect::new(left, top, right, bottom)
}

/// Resolve a segment to its rectangle and centered, truncated label.
pub fn pill_geometry(
    segment: &Segment,
    row_top: i32,
    config: &LayoutConfig,
    measure: &dyn TextMeasure,
) -> PillGeometry {
    let rect = pill_rect(segment, row_top, config);
    let label = truncate_title(&segment.title, config.title_max_chars);

    let font_size = config.fonts.event;
    let text_width = measure.text_width(&label, font_size).round() as i32;
    let text_height = measure.line_height(font_size).round() as i32;

    PillGeometry {
        segment: segment.clone(),
        rect,
        label_x: rect.left + (rect.width() - text_width).div_euclid(2),
        label_y: rect.top + (rect.height() - text_height).div_euclid(2),
        label,
    }
}
