// Settings module
// Layout, theme and application configuration, all passed explicitly

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::models::color::{ColorPalette, RgbColor};

/// How the month title is written above the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleFormat {
    /// "September" with "2025" beside it
    #[default]
    English,
    /// "9월" with "2025년" beside it
    Korean,
}

impl TitleFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "english" => Some(TitleFormat::English),
            "korean" => Some(TitleFormat::Korean),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSizes {
    pub month: f32,
    pub year: f32,
    pub weekday_header: f32,
    pub day_number: f32,
    pub event: f32,
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            month: 60.0,
            year: 20.0,
            weekday_header: 20.0,
            day_number: 20.0,
            event: 18.0,
        }
    }
}

/// Font files used for text. Relative names are also looked up under
/// `fonts/` and `assets/fonts/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontFiles {
    pub regular: Option<PathBuf>,
    pub bold: Option<PathBuf>,
}

impl Default for FontFiles {
    fn default() -> Self {
        Self {
            regular: Some(PathBuf::from("MaruBuri-SemiBold.ttf")),
            bold: Some(PathBuf::from("MaruBuri-Bold.ttf")),
        }
    }
}

impl FontFiles {
    /// One file for both weights
    pub fn single(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            regular: Some(path.clone()),
            bold: Some(path),
        }
    }
}

/// Largest accepted image width or height
pub const MAX_IMAGE_DIMENSION: u32 = i32::MAX as u32;

/// Static geometry of the rendered month, in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub image_width: u32,
    pub image_height: u32,
    /// Vertical lanes available for pills in one week row
    pub max_slots_per_week: usize,
    /// Titles longer than this many characters are cut and get "..."
    pub title_max_chars: usize,
    pub min_pill_width: u32,
    pub pill_padding_x: u32,
    pub pill_height: u32,
    pub pill_radius: u32,
    pub slot_pitch: u32,
    /// Distance from a row's top to the first slot, leaving room for the day number
    pub date_label_offset: u32,
    pub day_label_inset: u32,
    pub margin_x: u32,
    pub margin_bottom: u32,
    pub title_x: u32,
    pub title_y: u32,
    pub grid_top: u32,
    pub header_height: u32,
    pub header_radius: u32,
    pub header_gap: u32,
    /// Row height is computed as if the month had at least this many rows
    pub min_rows: usize,
    pub title_format: TitleFormat,
    pub fonts: FontSizes,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            image_width: 1200,
            image_height: 1400,
            max_slots_per_week: 3,
            title_max_chars: 20,
            min_pill_width: 40,
            pill_padding_x: 6,
            pill_height: 28,
            pill_radius: 12,
            slot_pitch: 34,
            date_label_offset: 32,
            day_label_inset: 8,
            margin_x: 40,
            margin_bottom: 40,
            title_x: 80,
            title_y: 40,
            grid_top: 120,
            header_height: 50,
            header_radius: 8,
            header_gap: 10,
            min_rows: 6,
            title_format: TitleFormat::English,
            fonts: FontSizes::default(),
        }
    }
}

impl LayoutConfig {
    /// Reject configurations that cannot produce a sensible image
    pub fn validate(&self) -> Result<(), String> {
        if self.image_width == 0 || self.image_height == 0 {
            return Err("Image width and height must be positive".to_string());
        }
        if self.max_slots_per_week == 0 {
            return Err("At least one slot per week is required".to_string());
        }
        if self.title_max_chars < 4 {
            return Err("Title budget must leave room for an ellipsis (minimum 4)".to_string());
        }
        // Geometry works in i32 pixels
        if self.image_width > MAX_IMAGE_DIMENSION || self.image_height > MAX_IMAGE_DIMENSION {
            return Err(format!(
                "Image width and height must not exceed {} pixels",
                MAX_IMAGE_DIMENSION
            ));
        }
        if u64::from(self.image_width) <= u64::from(self.margin_x) * 2 {
            return Err("Horizontal margins leave no room for the grid".to_string());
        }
        let vertical_chrome = u64::from(self.grid_top)
            + u64::from(self.header_height)
            + u64::from(self.header_gap)
            + u64::from(self.margin_bottom);
        if vertical_chrome >= u64::from(self.image_height) {
            return Err("Vertical margins leave no room for the grid".to_string());
        }
        Ok(())
    }

    pub fn grid_x(&self) -> i32 {
        self.margin_x as i32
    }

    pub fn grid_width(&self) -> i32 {
        self.image_width as i32 - 2 * self.margin_x as i32
    }

    pub fn grid_height(&self) -> i32 {
        self.image_height as i32 - self.grid_top as i32 - self.margin_bottom as i32
    }

    /// Width of one day column: `floor(grid_width / 7)`
    pub fn day_width(&self) -> i32 {
        self.grid_width().div_euclid(7)
    }

    /// Top of the first week row
    pub fn rows_top(&self) -> i32 {
        (self.grid_top + self.header_height + self.header_gap) as i32
    }

    pub fn row_height(&self, row_count: usize) -> i32 {
        let rows = row_count.max(self.min_rows).max(1) as i32;
        (self.grid_height() - self.header_height as i32 - self.header_gap as i32).div_euclid(rows)
    }
}

/// Colors used when composing the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub background: RgbColor,
    pub title: RgbColor,
    pub weekday_header_bg: RgbColor,
    pub sunday: RgbColor,
    pub saturday: RgbColor,
    pub weekday: RgbColor,
    pub row_divider: RgbColor,
    pub adjacent_month_day: RgbColor,
    pub pill_text: RgbColor,
    pub pills: ColorPalette,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: RgbColor::new(0xFD, 0xFE, 0xF0),
            title: RgbColor::new(0x4A, 0x4A, 0x4A),
            weekday_header_bg: RgbColor::new(0xEA, 0xEA, 0xE0),
            sunday: RgbColor::new(0xC1, 0x6A, 0x64),
            saturday: RgbColor::new(0x51, 0x88, 0xB7),
            weekday: RgbColor::new(0x4B, 0x4B, 0x4A),
            row_divider: RgbColor::new(0xEA, 0xEA, 0xE0),
            adjacent_month_day: RgbColor::new(200, 200, 200),
            pill_text: RgbColor::new(0x4B, 0x4B, 0x4A),
            pills: ColorPalette::default(),
        }
    }
}

/// Where events come from: a JSON file, a local `.ics` file or an `https://` ICS feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    pub interval_minutes: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 30,
        }
    }
}

/// Top-level application configuration (config.toml)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory rendered files are written to; the working directory if unset
    pub output_dir: Option<PathBuf>,
    pub layout: LayoutConfig,
    pub font_files: FontFiles,
    pub theme: Theme,
    pub source: Option<SourceConfig>,
    pub poller: PollerConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.layout.validate()?;
        if self.poller.interval_minutes == 0 {
            return Err("Poll interval must be at least one minute".to_string());
        }
        Ok(())
    }
}
