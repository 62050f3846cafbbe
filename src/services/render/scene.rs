//! Composition of a month layout into drawable primitives.

use chrono::{Datelike, Weekday};
use serde::Serialize;

use crate::models::color::RgbColor;
use crate::models::settings::{LayoutConfig, Theme, TitleFormat};
use crate::services::layout::{MonthLayout, PixelRect, TextMeasure};

const WEEKDAY_LABELS: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];
const YEAR_LABEL_GAP: i32 = 10;
const YEAR_LABEL_RISE: i32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FontWeight {
    Regular,
    Bold,
}

/// One thing to paint, in pixel coordinates with the origin at the top left.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Primitive {
    RoundedRect {
        rect: PixelRect,
        radius: u32,
        fill: RgbColor,
    },
    Line {
        from: (i32, i32),
        to: (i32, i32),
        color: RgbColor,
        width: u32,
    },
    /// `x`/`y` is the top left of the text box
    Text {
        x: i32,
        y: i32,
        text: String,
        size: f32,
        color: RgbColor,
        weight: FontWeight,
    },
}

/// Everything a backend needs to paint one month image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub background: RgbColor,
    pub primitives: Vec<Primitive>,
}

/// Build the full scene: title, weekday header, day numbers, row dividers
/// and event pills, in painting order.
pub fn compose_scene(
    layout: &MonthLayout,
    config: &LayoutConfig,
    theme: &Theme,
    measure: &dyn TextMeasure,
) -> Scene {
    let mut primitives = Vec::new();

    push_title(&mut primitives, layout, config, theme, measure);
    push_weekday_header(&mut primitives, config, theme, measure);
    push_day_numbers(&mut primitives, layout, config, theme);
    push_row_dividers(&mut primitives, layout, config, theme);

    for pill in &layout.pills {
        primitives.push(Primitive::RoundedRect {
            rect: pill.rect,
            radius: config.pill_radius,
            fill: theme.pills.fill_for(pill.segment.color_tag.as_deref()),
        });
        primitives.push(Primitive::Text {
            x: pill.label_x,
            y: pill.label_y,
            text: pill.label.clone(),
            size: config.fonts.event,
            color: theme.pill_text,
            weight: FontWeight::Regular,
        });
    }

    Scene {
        width: config.image_width,
        height: config.image_height,
        background: theme.background,
        primitives,
    }
}

/// Month and year labels for the title line
pub fn title_labels(year: i32, month: u32, format: TitleFormat) -> (String, String) {
    match format {
        TitleFormat::English => (english_month_name(month).to_string(), year.to_string()),
        TitleFormat::Korean => (format!("{month}월"), format!("{year}년")),
    }
}

fn english_month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "",
    }
}

fn weekday_color(theme: &Theme, weekday: Weekday) -> RgbColor {
    match weekday {
        Weekday::Sun => theme.sunday,
        Weekday::Sat => theme.saturday,
        _ => theme.weekday,
    }
}

fn push_title(
    primitives: &mut Vec<Primitive>,
    layout: &MonthLayout,
    config: &LayoutConfig,
    theme: &Theme,
    measure: &dyn TextMeasure,
) {
    let (month_text, year_text) =
        title_labels(layout.grid.year, layout.grid.month, config.title_format);

    let title_x = config.title_x as i32;
    let title_y = config.title_y as i32;
    let month_width = measure.text_width(&month_text, config.fonts.month).round() as i32;
    let month_height = measure.line_height(config.fonts.month).round() as i32;

    primitives.push(Primitive::Text {
        x: title_x,
        y: title_y,
        text: month_text,
        size: config.fonts.month,
        color: theme.title,
        weight: FontWeight::Bold,
    });
    primitives.push(Primitive::Text {
        x: title_x + month_width + YEAR_LABEL_GAP,
        y: title_y + month_height - YEAR_LABEL_RISE,
        text: year_text,
        size: config.fonts.year,
        color: theme.title,
        weight: FontWeight::Bold,
    });
}

fn push_weekday_header(
    primitives: &mut Vec<Primitive>,
    config: &LayoutConfig,
    theme: &Theme,
    measure: &dyn TextMeasure,
) {
    let grid_x = config.grid_x();
    let grid_top = config.grid_top as i32;
    let header_height = config.header_height as i32;
    let day_width = config.day_width();

    primitives.push(Primitive::RoundedRect {
        rect: PixelRect::new(
            grid_x,
            grid_top,
            grid_x + config.grid_width(),
            grid_top + header_height,
        ),
        radius: config.header_radius,
        fill: theme.weekday_header_bg,
    });

    let size = config.fonts.weekday_header;
    let text_height = measure.line_height(size).round() as i32;
    let weekdays = [
        Weekday::Sun,
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
    ];

    for (column, (label, weekday)) in WEEKDAY_LABELS.iter().zip(weekdays).enumerate() {
        let center_x = grid_x + column as i32 * day_width + day_width / 2;
        let text_width = measure.text_width(label, size).round() as i32;
        primitives.push(Primitive::Text {
            x: center_x - text_width / 2,
            y: grid_top + (header_height - text_height) / 2,
            text: (*label).to_string(),
            size,
            color: weekday_color(theme, weekday),
            weight: FontWeight::Bold,
        });
    }
}

fn push_day_numbers(
    primitives: &mut Vec<Primitive>,
    layout: &MonthLayout,
    config: &LayoutConfig,
    theme: &Theme,
) {
    let inset = config.day_label_inset as i32;
    let day_width = config.day_width();

    for (week_index, column, date) in layout.grid.cells() {
        let color = if layout.grid.is_in_month(date) {
            weekday_color(theme, date.weekday())
        } else {
            theme.adjacent_month_day
        };
        primitives.push(Primitive::Text {
            x: config.grid_x() + column as i32 * day_width + inset,
            y: layout.row_top(week_index) + inset,
            text: date.day().to_string(),
            size: config.fonts.day_number,
            color,
            weight: FontWeight::Regular,
        });
    }
}

fn push_row_dividers(
    primitives: &mut Vec<Primitive>,
    layout: &MonthLayout,
    config: &LayoutConfig,
    theme: &Theme,
) {
    let left = config.grid_x();
    let right = left + config.grid_width();

    // Between rows, then one closing line under the last row
    let divider_rows = (1..layout.grid.row_count()).chain(std::iter::once(layout.grid.row_count()));
    for week_index in divider_rows {
        let y = layout.row_top(week_index);
        primitives.push(Primitive::Line {
            from: (left, y),
            to: (right, y),
            color: theme.row_divider,
            width: 1,
        });
    }
}
