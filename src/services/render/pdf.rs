//! PDF backend: writes the scene to a single page.
//!
//! Configured font files are embedded; without them the builtin Helvetica
//! faces are used, which only cover Latin-1.

use std::io::BufWriter;

use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Point, Rgb,
};

use crate::models::color::RgbColor;
use crate::services::layout::PixelRect;

use super::fonts::FontSet;
use super::scene::{FontWeight, Primitive, Scene};
use super::{RenderBackend, RenderError};

const PT_PER_MM: f32 = 2.834_646;
/// Baseline sits this far down the text box, as a fraction of the font size
const BASELINE_RATIO: f32 = 0.8;
const CORNER_STEPS: usize = 6;

/// Renders onto a page `page_width_mm` wide; the height follows the scene's
/// aspect ratio.
#[derive(Debug, Clone)]
pub struct PdfBackend {
    pub title: String,
    pub page_width_mm: f32,
    pub fonts: FontSet,
}

impl Default for PdfBackend {
    fn default() -> Self {
        Self {
            title: "Calendar".to_string(),
            page_width_mm: 210.0, // A4 width
            fonts: FontSet::default(),
        }
    }
}

impl PdfBackend {
    pub fn new(fonts: FontSet) -> Self {
        Self {
            fonts,
            ..Self::default()
        }
    }
}

/// Maps scene pixels (origin top left) to page millimetres (origin bottom left).
#[derive(Debug, Clone, Copy)]
struct PageMapping {
    mm_per_px: f32,
    page_height_mm: f32,
}

impl PageMapping {
    fn x(&self, px: i32) -> Mm {
        Mm(px as f32 * self.mm_per_px)
    }

    fn y(&self, px: i32) -> Mm {
        Mm(self.page_height_mm - px as f32 * self.mm_per_px)
    }

    fn y_f(&self, px: f32) -> Mm {
        Mm(self.page_height_mm - px * self.mm_per_px)
    }

    fn font_pt(&self, size_px: f32) -> f32 {
        size_px * self.mm_per_px * PT_PER_MM
    }
}

impl RenderBackend for PdfBackend {
    fn render(&self, scene: &Scene) -> Result<Vec<u8>, RenderError> {
        if scene.width == 0 || scene.height == 0 {
            return Err(RenderError::InvalidCanvas {
                width: scene.width,
                height: scene.height,
            });
        }

        let mm_per_px = self.page_width_mm / scene.width as f32;
        let mapping = PageMapping {
            mm_per_px,
            page_height_mm: scene.height as f32 * mm_per_px,
        };

        let (doc, page, layer) = PdfDocument::new(
            &self.title,
            Mm(self.page_width_mm),
            Mm(mapping.page_height_mm),
            "Layer 1",
        );
        let regular = self.fonts.font_for(FontWeight::Regular);
        let bold = self.fonts.font_for(FontWeight::Bold);
        let (font, font_bold) = match (regular, bold) {
            (Some(regular), Some(bold)) => (
                doc.add_external_font(regular.bytes()).map_err(|err| {
                    RenderError::Pdf(format!("failed to embed {}: {err}", regular.path().display()))
                })?,
                doc.add_external_font(bold.bytes()).map_err(|err| {
                    RenderError::Pdf(format!("failed to embed {}: {err}", bold.path().display()))
                })?,
            ),
            _ => {
                warn_unencodable_text(scene);
                (
                    doc.add_builtin_font(BuiltinFont::Helvetica)
                        .map_err(|err| RenderError::Pdf(format!("failed to add font: {err}")))?,
                    doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(|err| {
                        RenderError::Pdf(format!("failed to add bold font: {err}"))
                    })?,
                )
            }
        };

        let layer = doc.get_page(page).get_layer(layer);

        let page_rect = PixelRect::new(0, 0, scene.width as i32, scene.height as i32);
        fill_polygon(&layer, &mapping, rounded_outline(page_rect, 0), scene.background);

        for primitive in &scene.primitives {
            match primitive {
                Primitive::RoundedRect { rect, radius, fill } => {
                    fill_polygon(&layer, &mapping, rounded_outline(*rect, *radius), *fill);
                }
                Primitive::Line {
                    from,
                    to,
                    color,
                    width,
                } => stroke_line(&layer, &mapping, *from, *to, *color, *width),
                Primitive::Text {
                    x,
                    y,
                    text,
                    size,
                    color,
                    weight,
                } => {
                    let face = match weight {
                        FontWeight::Regular => &font,
                        FontWeight::Bold => &font_bold,
                    };
                    draw_text(&layer, &mapping, face, *x, *y, text, *size, *color);
                }
            }
        }

        let mut writer = BufWriter::new(Vec::new());
        doc.save(&mut writer)
            .map_err(|err| RenderError::Pdf(format!("failed to save PDF: {err}")))?;
        writer
            .into_inner()
            .map_err(|err| RenderError::Pdf(format!("failed to flush PDF: {err}")))
    }

    fn file_extension(&self) -> &'static str {
        "pdf"
    }
}

/// Builtin fonts cannot show text outside Latin-1 (Hangul titles, for one).
fn warn_unencodable_text(scene: &Scene) {
    let unencodable = scene
        .primitives
        .iter()
        .filter(|primitive| {
            matches!(primitive, Primitive::Text { text, .. } if text.chars().any(|ch| ch as u32 > 0xFF))
        })
        .count();
    if unencodable > 0 {
        log::warn!(
            "{} labels need characters the builtin PDF fonts lack; configure a font file",
            unencodable
        );
    }
}

fn pdf_color(color: RgbColor) -> printpdf::Color {
    let (r, g, b) = color.to_unit_rgb();
    printpdf::Color::Rgb(Rgb::new(r, g, b, None))
}

/// Outline of a rounded rectangle in pixel space, corners approximated by
/// short straight segments.
fn rounded_outline(rect: PixelRect, radius: u32) -> Vec<(f32, f32)> {
    let radius = (radius as i32).min(rect.width() / 2).min(rect.height() / 2).max(0) as f32;
    let (left, top, right, bottom) = (
        rect.left as f32,
        rect.top as f32,
        rect.right as f32,
        rect.bottom as f32,
    );

    if radius == 0.0 {
        return vec![(left, top), (right, top), (right, bottom), (left, bottom)];
    }

    // Corner centers with the angle each quarter arc starts at, clockwise on screen
    let corners = [
        (right - radius, top + radius, -90.0f32),
        (right - radius, bottom - radius, 0.0),
        (left + radius, bottom - radius, 90.0),
        (left + radius, top + radius, 180.0),
    ];

    let mut points = Vec::with_capacity(corners.len() * (CORNER_STEPS + 1));
    for (cx, cy, start_deg) in corners {
        for step in 0..=CORNER_STEPS {
            let angle = (start_deg + 90.0 * step as f32 / CORNER_STEPS as f32).to_radians();
            points.push((cx + radius * angle.cos(), cy + radius * angle.sin()));
        }
    }
    points
}

fn fill_polygon(
    layer: &PdfLayerReference,
    mapping: &PageMapping,
    outline: Vec<(f32, f32)>,
    color: RgbColor,
) {
    let points = outline
        .into_iter()
        .map(|(x, y)| (Point::new(Mm(x * mapping.mm_per_px), mapping.y_f(y)), false))
        .collect();

    layer.set_fill_color(pdf_color(color));
    layer.add_polygon(printpdf::Polygon {
        rings: vec![points],
        mode: printpdf::path::PaintMode::Fill,
        winding_order: printpdf::path::WindingOrder::NonZero,
    });
}

fn stroke_line(
    layer: &PdfLayerReference,
    mapping: &PageMapping,
    from: (i32, i32),
    to: (i32, i32),
    color: RgbColor,
    width: u32,
) {
    let points = vec![
        (Point::new(mapping.x(from.0), mapping.y(from.1)), false),
        (Point::new(mapping.x(to.0), mapping.y(to.1)), false),
    ];
    layer.set_outline_color(pdf_color(color));
    layer.set_outline_thickness(mapping.font_pt(width.max(1) as f32));
    layer.add_polygon(printpdf::Polygon {
        rings: vec![points],
        mode: printpdf::path::PaintMode::Stroke,
        winding_order: printpdf::path::WindingOrder::NonZero,
    });
}

#[allow(clippy::too_many_arguments)]
fn draw_text(
    layer: &PdfLayerReference,
    mapping: &PageMapping,
    font: &IndirectFontRef,
    x: i32,
    y: i32,
    text: &str,
    size: f32,
    color: RgbColor,
) {
    let baseline = y as f32 + size * BASELINE_RATIO;

    layer.begin_text_section();
    layer.set_font(font, mapping.font_pt(size));
    layer.set_fill_color(pdf_color(color));
    layer.set_text_cursor(mapping.x(x), mapping.y_f(baseline));
    layer.write_text(text, font);
    layer.end_text_section();
}
