// Color module
// RGB colors parsed from hex strings, and the color-tag palette for pills

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` or `#RGB` (leading `#` optional).
    pub fn from_hex_str(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if !hex.is_ascii() {
            return None;
        }

        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(RgbColor::new(r, g, b))
            }
            3 => {
                let expand = |i: usize| -> Option<u8> {
                    let nibble = u8::from_str_radix(&hex[i..i + 1], 16).ok()?;
                    Some(nibble * 17)
                };
                Some(RgbColor::new(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => None,
        }
    }

    pub fn to_hex_string(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Components scaled to `0.0..=1.0`.
    pub fn to_unit_rgb(&self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_string())
    }
}

impl Serialize for RgbColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex_string())
    }
}

impl<'de> Deserialize<'de> for RgbColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        RgbColor::from_hex_str(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color {raw:?}")))
    }
}

/// Maps an event's color tag to the pill fill color.
///
/// Tags are the calendar provider's color ids ("1".."11" for Google
/// Calendar). A tag may also be a literal hex color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorPalette {
    pub default_fill: RgbColor,
    pub tags: BTreeMap<String, RgbColor>,
}

impl ColorPalette {
    pub fn fill_for(&self, color_tag: Option<&str>) -> RgbColor {
        let Some(tag) = color_tag.map(str::trim).filter(|tag| !tag.is_empty()) else {
            return self.default_fill;
        };

        if let Some(color) = self.tags.get(tag) {
            return *color;
        }
        if tag.starts_with('#') {
            if let Some(color) = RgbColor::from_hex_str(tag) {
                return color;
            }
        }
        self.default_fill
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        let tags = [
            ("1", RgbColor::new(230, 220, 250)),
            ("2", RgbColor::new(255, 220, 200)),
            ("3", RgbColor::new(200, 230, 255)),
            ("4", RgbColor::new(255, 240, 200)),
            ("5", RgbColor::new(240, 220, 250)),
            ("6", RgbColor::new(255, 220, 210)),
            ("7", RgbColor::new(220, 250, 220)),
            ("8", RgbColor::new(250, 200, 220)),
            ("9", RgbColor::new(230, 230, 240)),
            ("10", RgbColor::new(220, 240, 200)),
            ("11", RgbColor::new(255, 220, 200)),
        ]
        .into_iter()
        .map(|(tag, color)| (tag.to_string(), color))
        .collect();

        Self {
            default_fill: RgbColor::new(220, 220, 240),
            tags,
        }
    }
}
