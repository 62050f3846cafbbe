//! Font files for text: lookup, loading and glyph-accurate measurement.
//!
//! Relative font names are tried as given, then under `fonts/` and
//! `assets/fonts/`. When nothing loads, backends fall back to their
//! built-in faces.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ab_glyph::{Font, FontRef, PxScale, ScaleFont};

use crate::models::settings::FontFiles;
use crate::services::layout::{ApproxTextMeasure, TextMeasure};

use super::scene::FontWeight;
use super::RenderError;

const FONT_DIRS: [&str; 2] = ["fonts", "assets/fonts"];

/// A parsed-once TrueType/OpenType file held in memory.
#[derive(Clone)]
pub struct LoadedFont {
    path: PathBuf,
    data: Arc<Vec<u8>>,
}

impl LoadedFont {
    pub fn from_bytes(path: impl Into<PathBuf>, data: Vec<u8>) -> Result<Self, RenderError> {
        let path = path.into();
        FontRef::try_from_slice(&data)
            .map_err(|err| RenderError::Font(format!("{}: {}", path.display(), err)))?;
        Ok(Self {
            path,
            data: Arc::new(data),
        })
    }

    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let data = fs::read(path)
            .map_err(|err| RenderError::Font(format!("{}: {}", path.display(), err)))?;
        Self::from_bytes(path, data)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Glyph access; the data was validated when the font was loaded.
    pub fn face(&self) -> Option<FontRef<'_>> {
        FontRef::try_from_slice(&self.data).ok()
    }
}

impl fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedFont")
            .field("path", &self.path)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Paths tried for a font name, in order
pub fn font_candidates(name: &Path) -> Vec<PathBuf> {
    let mut candidates = vec![name.to_path_buf()];
    if name.is_relative() {
        candidates.extend(FONT_DIRS.iter().map(|dir| Path::new(dir).join(name)));
    }
    candidates
}

/// First candidate for `name` that exists and parses as a font.
pub fn find_font(name: &Path) -> Option<LoadedFont> {
    for candidate in font_candidates(name) {
        if !candidate.is_file() {
            continue;
        }
        match LoadedFont::load(&candidate) {
            Ok(font) => {
                log::info!("Loaded font {}", candidate.display());
                return Some(font);
            }
            Err(err) => log::warn!("Skipping unusable font: {}", err),
        }
    }
    None
}

/// Regular and bold faces shared by the backends. Either may be missing.
#[derive(Debug, Clone, Default)]
pub struct FontSet {
    regular: Option<LoadedFont>,
    bold: Option<LoadedFont>,
}

impl FontSet {
    pub fn new(regular: Option<LoadedFont>, bold: Option<LoadedFont>) -> Self {
        Self { regular, bold }
    }

    pub fn load(files: &FontFiles) -> Self {
        let regular = files.regular.as_deref().and_then(find_font);
        let bold = files.bold.as_deref().and_then(find_font);

        if regular.is_none() && bold.is_none() {
            log::warn!(
                "No font file found (regular {:?}, bold {:?}); using built-in fonts",
                files.regular,
                files.bold
            );
        }
        Self { regular, bold }
    }

    pub fn is_empty(&self) -> bool {
        self.regular.is_none() && self.bold.is_none()
    }

    /// Face for `weight`, or the other weight when that one is missing
    pub fn font_for(&self, weight: FontWeight) -> Option<&LoadedFont> {
        match weight {
            FontWeight::Regular => self.regular.as_ref().or(self.bold.as_ref()),
            FontWeight::Bold => self.bold.as_ref().or(self.regular.as_ref()),
        }
    }

    /// Measure matching what the backends will draw
    pub fn measure(&self) -> Box<dyn TextMeasure + Send + Sync> {
        match self.font_for(FontWeight::Regular) {
            Some(font) => Box::new(FontMeasure::new(font.clone())),
            None => Box::new(ApproxTextMeasure::default()),
        }
    }
}

/// Widths from the glyph advances (with kerning) of a loaded font.
#[derive(Debug, Clone)]
pub struct FontMeasure {
    font: LoadedFont,
}

impl FontMeasure {
    pub fn new(font: LoadedFont) -> Self {
        Self { font }
    }
}

impl TextMeasure for FontMeasure {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        let Some(face) = self.font.face() else {
            return ApproxTextMeasure::default().text_width(text, font_size);
        };
        let scaled = face.as_scaled(PxScale::from(font_size));

        let mut width = 0.0;
        let mut previous = None;
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(previous) = previous {
                width += scaled.kern(previous, id);
            }
            width += scaled.h_advance(id);
            previous = Some(id);
        }
        width
    }

    fn line_height(&self, font_size: f32) -> f32 {
        match self.font.face() {
            Some(face) => {
                let scaled = face.as_scaled(PxScale::from(font_size));
                scaled.ascent() - scaled.descent()
            }
            None => font_size,
        }
    }
}
