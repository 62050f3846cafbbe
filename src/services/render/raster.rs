//! Raster backend: paints the scene into an RGB image and encodes PNG.
//!
//! Text goes through the configured TrueType faces when they loaded, and
//! through the built-in bitmap fonts otherwise (ASCII only, scaled by whole
//! pixels for large sizes).

use std::convert::Infallible;
use std::io::Cursor;

use ab_glyph::{point, Font, FontRef, PxScale, ScaleFont};
use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::{OriginDimensions, Point, Size};
use embedded_graphics::mono_font::ascii::{
    FONT_10X20, FONT_6X10, FONT_7X13, FONT_7X13_BOLD, FONT_9X15, FONT_9X15_BOLD, FONT_9X18,
    FONT_9X18_BOLD,
};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::{Rgb888, RgbColor as _};
use embedded_graphics::text::{Baseline, Text};
use embedded_graphics::{Drawable, Pixel};
use image::{ImageFormat, Rgb, RgbImage};

use crate::models::color::RgbColor;
use crate::services::layout::PixelRect;

use super::fonts::FontSet;
use super::scene::{FontWeight, Primitive, Scene};
use super::{RenderBackend, RenderError};

/// Canvases larger than this in either dimension are refused.
const MAX_DIMENSION: u32 = 16_384;
/// Pixel height of the largest built-in bitmap font
const BITMAP_LINE: f32 = 20.0;

#[derive(Debug, Clone, Default)]
pub struct PngBackend {
    pub fonts: FontSet,
}

impl PngBackend {
    pub fn new(fonts: FontSet) -> Self {
        Self { fonts }
    }
}

impl RenderBackend for PngBackend {
    fn render(&self, scene: &Scene) -> Result<Vec<u8>, RenderError> {
        let mut canvas = Canvas::new(scene.width, scene.height, scene.background)?;

        for primitive in &scene.primitives {
            match primitive {
                Primitive::RoundedRect { rect, radius, fill } => {
                    canvas.fill_rounded_rect(*rect, *radius, *fill);
                }
                Primitive::Line {
                    from,
                    to,
                    color,
                    width,
                } => canvas.draw_line(*from, *to, *color, *width),
                Primitive::Text {
                    x,
                    y,
                    text,
                    size,
                    color,
                    weight,
                } => {
                    let face = self.fonts.font_for(*weight).and_then(|font| font.face());
                    match face {
                        Some(face) => canvas.draw_outline_text(&face, *x, *y, text, *size, *color),
                        None => canvas.draw_bitmap_text(*x, *y, text, *size, *color, *weight),
                    }
                }
            }
        }

        canvas.encode_png()
    }

    fn file_extension(&self) -> &'static str {
        "png"
    }
}

/// RGB canvas with clipped drawing operations
pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: RgbColor) -> Result<Self, RenderError> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(RenderError::InvalidCanvas { width, height });
        }

        Ok(Self {
            image: RgbImage::from_pixel(width, height, to_rgb(background)),
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<RgbColor> {
        self.image
            .get_pixel_checked(x, y)
            .map(|pixel| RgbColor::new(pixel[0], pixel[1], pixel[2]))
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width() && (y as u32) < self.height()
    }

    fn put_pixel(&mut self, x: i32, y: i32, color: RgbColor) {
        if self.in_bounds(x, y) {
            self.image.put_pixel(x as u32, y as u32, to_rgb(color));
        }
    }

    /// Mix `color` over the current pixel by `coverage` (0.0 to 1.0).
    fn blend_pixel(&mut self, x: i32, y: i32, color: RgbColor, coverage: f32) {
        if !self.in_bounds(x, y) || coverage <= 0.0 {
            return;
        }
        let coverage = coverage.min(1.0);
        let pixel = self.image.get_pixel_mut(x as u32, y as u32);
        for (channel, target) in pixel.0.iter_mut().zip([color.r, color.g, color.b]) {
            let mixed = *channel as f32 + (target as f32 - *channel as f32) * coverage;
            *channel = mixed.round().clamp(0.0, 255.0) as u8;
        }
    }

    /// Fill `rect` (right and bottom exclusive) with corners of `radius`.
    pub fn fill_rounded_rect(&mut self, rect: PixelRect, radius: u32, color: RgbColor) {
        if rect.width() <= 0 || rect.height() <= 0 {
            return;
        }
        let radius = (radius as i32).min(rect.width() / 2).min(rect.height() / 2);

        let x_start = rect.left.max(0);
        let x_end = rect.right.min(self.width() as i32);
        let y_start = rect.top.max(0);
        let y_end = rect.bottom.min(self.height() as i32);

        for y in y_start..y_end {
            for x in x_start..x_end {
                if inside_rounded(rect, radius, x, y) {
                    self.put_pixel(x, y, color);
                }
            }
        }
    }

    pub fn draw_line(&mut self, from: (i32, i32), to: (i32, i32), color: RgbColor, width: u32) {
        let width = width.max(1) as i32;

        // Axis-aligned lines are thin rectangles
        if from.1 == to.1 {
            let rect = PixelRect::new(from.0.min(to.0), from.1, from.0.max(to.0) + 1, from.1 + width);
            self.fill_rounded_rect(rect, 0, color);
            return;
        }
        if from.0 == to.0 {
            let rect = PixelRect::new(from.0, from.1.min(to.1), from.0 + width, from.1.max(to.1) + 1);
            self.fill_rounded_rect(rect, 0, color);
            return;
        }

        // Bresenham for everything else
        let (mut x, mut y) = from;
        let dx = (to.0 - from.0).abs();
        let dy = -(to.1 - from.1).abs();
        let step_x = if from.0 < to.0 { 1 } else { -1 };
        let step_y = if from.1 < to.1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            for offset in 0..width {
                self.put_pixel(x, y + offset, color);
            }
            if (x, y) == to {
                break;
            }
            let doubled = 2 * err;
            if doubled >= dy {
                err += dy;
                x += step_x;
            }
            if doubled <= dx {
                err += dx;
                y += step_y;
            }
        }
    }

    /// Antialiased text from a TrueType face; `(x, y)` is the top left of
    /// the line box.
    pub fn draw_outline_text(
        &mut self,
        face: &FontRef<'_>,
        x: i32,
        y: i32,
        text: &str,
        size: f32,
        color: RgbColor,
    ) {
        let scale = PxScale::from(size);
        let scaled = face.as_scaled(scale);
        let baseline = y as f32 + scaled.ascent();

        let mut caret = x as f32;
        let mut previous = None;
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(previous) = previous {
                caret += scaled.kern(previous, id);
            }
            let glyph = id.with_scale_and_position(scale, point(caret, baseline));
            caret += scaled.h_advance(id);
            previous = Some(id);

            if let Some(outlined) = face.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                let (left, top) = (bounds.min.x as i32, bounds.min.y as i32);
                outlined.draw(|gx, gy, coverage| {
                    self.blend_pixel(left + gx as i32, top + gy as i32, color, coverage);
                });
            }
        }
    }

    /// Text from the built-in bitmap fonts.
    pub fn draw_bitmap_text(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        size: f32,
        color: RgbColor,
        weight: FontWeight,
    ) {
        let (font, scale) = bitmap_font(size, weight);
        let style = MonoTextStyle::new(font, Rgb888::new(color.r, color.g, color.b));
        let mut target = BitmapTarget {
            canvas: self,
            origin: (x, y),
            scale,
        };

        // Drawing into the canvas cannot fail
        let _ = Text::with_baseline(text, Point::zero(), style, Baseline::Top).draw(&mut target);
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        let mut cursor = Cursor::new(Vec::new());
        self.image.write_to(&mut cursor, ImageFormat::Png)?;
        Ok(cursor.into_inner())
    }
}

fn to_rgb(color: RgbColor) -> Rgb<u8> {
    Rgb([color.r, color.g, color.b])
}

/// Closest built-in font for `size` and the whole-pixel scale it is drawn at
fn bitmap_font(size: f32, weight: FontWeight) -> (&'static MonoFont<'static>, i32) {
    let bold = weight == FontWeight::Bold;

    if size >= BITMAP_LINE * 1.5 {
        let scale = (size / BITMAP_LINE).round().max(1.0) as i32;
        return (&FONT_10X20, scale);
    }

    let font = if size >= 19.0 {
        &FONT_10X20
    } else if size >= 16.0 {
        if bold {
            &FONT_9X18_BOLD
        } else {
            &FONT_9X18
        }
    } else if size >= 14.0 {
        if bold {
            &FONT_9X15_BOLD
        } else {
            &FONT_9X15
        }
    } else if size >= 11.0 {
        if bold {
            &FONT_7X13_BOLD
        } else {
            &FONT_7X13
        }
    } else {
        &FONT_6X10
    };
    (font, 1)
}

/// Draw target that paints each font pixel as a `scale`-sized block at
/// `origin` on the canvas.
struct BitmapTarget<'a> {
    canvas: &'a mut Canvas,
    origin: (i32, i32),
    scale: i32,
}

impl OriginDimensions for BitmapTarget<'_> {
    fn size(&self) -> Size {
        Size::new(self.canvas.width(), self.canvas.height())
    }
}

impl DrawTarget for BitmapTarget<'_> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(position, color) in pixels {
            let left = self.origin.0 + position.x * self.scale;
            let top = self.origin.1 + position.y * self.scale;
            let block = PixelRect::new(left, top, left + self.scale, top + self.scale);
            self.canvas
                .fill_rounded_rect(block, 0, RgbColor::new(color.r(), color.g(), color.b()));
        }
        Ok(())
    }
}

/// Whether pixel `(x, y)` lies inside `rect` once its corners are rounded.
fn inside_rounded(rect: PixelRect, radius: i32, x: i32, y: i32) -> bool {
    if radius <= 0 {
        return true;
    }

    // Corner circle centers, measured on pixel centers
    let left_center = rect.left + radius;
    let right_center = rect.right - radius - 1;
    let top_center = rect.top + radius;
    let bottom_center = rect.bottom - radius - 1;

    let cx = if x < left_center {
        left_center
    } else if x > right_center {
        right_center
    } else {
        return true;
    };
    let cy = if y < top_center {
        top_center
    } else if y > bottom_center {
        bottom_center
    } else {
        return true;
    };

    let dx = x - cx;
    let dy = y - cy;
    dx * dx + dy * dy <= radius * radius
}
