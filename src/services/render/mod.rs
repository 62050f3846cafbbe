//! Rendering: scene composition and the backends that paint it.

pub mod fonts;
pub mod pdf;
pub mod raster;
pub mod scene;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::models::event::RawEvent;
use crate::models::settings::{LayoutConfig, Theme};
use crate::services::layout::{build_month_layout, LayoutError, TextMeasure};

pub use fonts::{FontMeasure, FontSet, LoadedFont};
pub use pdf::PdfBackend;
pub use raster::PngBackend;
pub use scene::{compose_scene, FontWeight, Primitive, Scene};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("canvas of {width}x{height} pixels cannot be drawn")]
    InvalidCanvas { width: u32, height: u32 },

    #[error("PNG encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("unusable font {0}")]
    Font(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Turns a composed scene into encoded file bytes.
pub trait RenderBackend {
    fn render(&self, scene: &Scene) -> Result<Vec<u8>, RenderError>;

    fn file_extension(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Png,
    Pdf,
}

impl OutputFormat {
    /// Backend using the built-in fonts only
    pub fn backend(self) -> Box<dyn RenderBackend> {
        self.backend_with_fonts(FontSet::default())
    }

    pub fn backend_with_fonts(self, fonts: FontSet) -> Box<dyn RenderBackend> {
        match self {
            OutputFormat::Png => Box::new(PngBackend::new(fonts)),
            OutputFormat::Pdf => Box::new(PdfBackend::new(fonts)),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "pdf" => Ok(OutputFormat::Pdf),
            other => Err(format!("unknown output format {other:?} (expected png or pdf)")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Png => f.write_str("png"),
            OutputFormat::Pdf => f.write_str("pdf"),
        }
    }
}

/// Lay out, compose and encode one month in a single call.
pub fn render_month(
    year: i32,
    month: u32,
    events: &[RawEvent],
    config: &LayoutConfig,
    theme: &Theme,
    measure: &dyn TextMeasure,
    backend: &dyn RenderBackend,
) -> Result<Vec<u8>, RenderError> {
    log::info!(
        "Rendering {}-{:02} with {} events as {}",
        year,
        month,
        events.len(),
        backend.file_extension()
    );

    let layout = build_month_layout(year, month, events, config, measure)?;
    let scene = compose_scene(&layout, config, theme, measure);
    let bytes = backend.render(&scene)?;

    log::info!(
        "Rendered {}-{:02}: {} pills, {} bytes",
        year,
        month,
        layout.pills.len(),
        bytes.len()
    );
    Ok(bytes)
}
