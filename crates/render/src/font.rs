//! Font resolution and glyph rasterization.

use fontdue::{Font, FontSettings};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Rasterized glyph bitmap.
pub struct GlyphBitmap {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Glyph metrics.
    pub metrics: GlyphMetrics,
    /// Coverage values, row-major.
    pub data: Vec<u8>,
}

/// Glyph metrics.
#[derive(Clone, Copy, Debug)]
pub struct GlyphMetrics {
    /// Advance width.
    pub advance_width: f32,
    /// Left side bearing.
    pub xmin: i32,
    /// Bottom of glyph relative to baseline.
    pub ymin: i32,
    /// Width of glyph.
    pub width: u32,
    /// Height of glyph.
    pub height: u32,
}

/// Line metrics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineMetrics {
    /// Distance from baseline to top of line.
    pub ascent: f32,
    /// Distance from baseline to bottom of line (negative below).
    pub descent: f32,
    /// Gap between lines.
    pub line_gap: f32,
    /// Total line height.
    pub line_height: f32,
}

/// A font file loaded through fontdue.
pub struct LoadedFont {
    font: Font,
    path: PathBuf,
    glyph_cache: RwLock<HashMap<(char, u32), Arc<GlyphBitmap>>>,
}

impl LoadedFont {
    pub fn new(path: impl Into<PathBuf>, data: &[u8]) -> Option<Self> {
        let font = Font::from_bytes(data, FontSettings::default()).ok()?;

        Some(Self {
            font,
            path: path.into(),
            glyph_cache: RwLock::new(HashMap::new()),
        })
    }

    pub fn from_file(path: &Path) -> Option<Self> {
        let data = std::fs::read(path).ok()?;
        Self::new(path, &data)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rasterize a glyph at a given size.
    pub fn rasterize(&self, c: char, size: f32) -> Arc<GlyphBitmap> {
        let cache_key = (c, (size * 10.0) as u32);

        {
            let cache = self.glyph_cache.read();
            if let Some(bitmap) = cache.get(&cache_key) {
                return bitmap.clone();
            }
        }

        let (metrics, data) = self.font.rasterize(c, size);
        let bitmap = Arc::new(GlyphBitmap {
            width: metrics.width as u32,
            height: metrics.height as u32,
            metrics: GlyphMetrics {
                advance_width: metrics.advance_width,
                xmin: metrics.xmin,
                ymin: metrics.ymin,
                width: metrics.width as u32,
                height: metrics.height as u32,
            },
            data,
        });

        self.glyph_cache.write().insert(cache_key, bitmap.clone());
        bitmap
    }

    pub fn line_metrics(&self, size: f32) -> LineMetrics {
        match self.font.horizontal_line_metrics(size) {
            Some(m) => LineMetrics {
                ascent: m.ascent,
                descent: m.descent,
                line_gap: m.line_gap,
                line_height: m.new_line_size,
            },
            None => builtin_line_metrics(size),
        }
    }

    pub fn kern(&self, left: char, right: char, size: f32) -> f32 {
        self.font.horizontal_kern(left, right, size).unwrap_or(0.0)
    }
}

/// A face that text can be laid out with.
pub enum FontFace {
    /// An outline font read from disk.
    Outline(LoadedFont),
    /// Always-available fallback: every visible character is a solid box
    /// spanning ascender to descender.
    Builtin,
}

impl fmt::Debug for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontFace::Outline(font) => write!(f, "Outline({})", font.path().display()),
            FontFace::Builtin => f.write_str("Builtin"),
        }
    }
}

// Built-in face proportions, in ems.
const BUILTIN_ASCENT: f32 = 0.8;
const BUILTIN_DESCENT: f32 = 0.2;
const BUILTIN_ADVANCE: f32 = 0.6;
const BUILTIN_INK: f32 = 0.4;

fn builtin_line_metrics(size: f32) -> LineMetrics {
    let ascent = (size * BUILTIN_ASCENT).round();
    let descent = -(size * BUILTIN_DESCENT).round();
    LineMetrics {
        ascent,
        descent,
        line_gap: 0.0,
        line_height: ascent - descent,
    }
}

fn builtin_glyph(c: char, size: f32) -> GlyphBitmap {
    let advance_width = size * BUILTIN_ADVANCE;
    if c.is_whitespace() || c.is_control() {
        return GlyphBitmap {
            width: 0,
            height: 0,
            metrics: GlyphMetrics {
                advance_width,
                xmin: 0,
                ymin: 0,
                width: 0,
                height: 0,
            },
            data: Vec::new(),
        };
    }

    let line = builtin_line_metrics(size);
    let width = (size * BUILTIN_INK).round().max(1.0) as u32;
    let height = (line.ascent - line.descent).max(1.0) as u32;
    let xmin = ((advance_width - width as f32) / 2.0).round() as i32;

    GlyphBitmap {
        width,
        height,
        metrics: GlyphMetrics {
            advance_width,
            xmin,
            ymin: line.descent as i32,
            width,
            height,
        },
        data: vec![255; (width * height) as usize],
    }
}

impl FontFace {
    pub fn glyph(&self, c: char, size: f32) -> Arc<GlyphBitmap> {
        match self {
            FontFace::Outline(font) => font.rasterize(c, size),
            FontFace::Builtin => Arc::new(builtin_glyph(c, size)),
        }
    }

    pub fn line_metrics(&self, size: f32) -> LineMetrics {
        match self {
            FontFace::Outline(font) => font.line_metrics(size),
            FontFace::Builtin => builtin_line_metrics(size),
        }
    }

    pub fn kern(&self, left: char, right: char, size: f32) -> f32 {
        match self {
            FontFace::Outline(font) => font.kern(left, right, size),
            FontFace::Builtin => 0.0,
        }
    }
}

/// Largest pixel size a face is bound to.
pub const MAX_FONT_SIZE: u32 = 2048;

/// A face bound to a pixel size.
#[derive(Clone, Debug)]
pub struct FontHandle {
    face: Arc<FontFace>,
    size: f32,
}

impl FontHandle {
    /// Sizes are clamped to `1..=MAX_FONT_SIZE`.
    pub fn new(face: Arc<FontFace>, size: u32) -> Self {
        Self {
            face,
            size: size.clamp(1, MAX_FONT_SIZE) as f32,
        }
    }

    /// Handle on the built-in face.
    pub fn builtin(size: u32) -> Self {
        Self::new(Arc::new(FontFace::Builtin), size)
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn is_builtin(&self) -> bool {
        matches!(*self.face, FontFace::Builtin)
    }

    /// File the face was read from, if any.
    pub fn source(&self) -> Option<&Path> {
        match &*self.face {
            FontFace::Outline(font) => Some(font.path()),
            FontFace::Builtin => None,
        }
    }

    pub fn glyph(&self, c: char) -> Arc<GlyphBitmap> {
        self.face.glyph(c, self.size)
    }

    pub fn line_metrics(&self) -> LineMetrics {
        self.face.line_metrics(self.size)
    }

    pub fn kern(&self, left: char, right: char) -> f32 {
        self.face.kern(left, right, self.size)
    }
}

/// Candidate font files, tried in order.
#[derive(Clone, Debug)]
pub struct FontConfig {
    /// Family name, informational only.
    pub family: String,
    /// Regular weight candidates.
    pub regular: Vec<PathBuf>,
    /// Bold weight candidates.
    pub bold: Vec<PathBuf>,
}

impl FontConfig {
    /// No font files at all: every lookup resolves to the built-in face.
    pub fn builtin_only() -> Self {
        Self {
            family: "builtin".to_string(),
            regular: Vec::new(),
            bold: Vec::new(),
        }
    }

    fn candidates(&self, strategy: FontStrategy) -> &[PathBuf] {
        match strategy {
            FontStrategy::BoldCandidates => &self.bold,
            FontStrategy::RegularCandidates => &self.regular,
            FontStrategy::BuiltinFace => &[],
        }
    }
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: "Times New Roman".to_string(),
            regular: vec![
                PathBuf::from("C:/Windows/Fonts/times.ttf"),
                PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf"),
                PathBuf::from("/Library/Fonts/Times New Roman.ttf"),
            ],
            bold: vec![
                PathBuf::from("C:/Windows/Fonts/timesbd.ttf"),
                PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSerif-Bold.ttf"),
                PathBuf::from("/Library/Fonts/Times New Roman Bold.ttf"),
            ],
        }
    }
}

/// One step of the font fallback chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontStrategy {
    BoldCandidates,
    RegularCandidates,
    BuiltinFace,
}

impl FontStrategy {
    /// Strategies to try, in order, for the requested weight.
    pub fn chain(bold: bool) -> &'static [FontStrategy] {
        if bold {
            &[
                FontStrategy::BoldCandidates,
                FontStrategy::RegularCandidates,
                FontStrategy::BuiltinFace,
            ]
        } else {
            &[FontStrategy::RegularCandidates, FontStrategy::BuiltinFace]
        }
    }
}

/// Resolves `(size, bold)` to a renderable font. Never fails.
pub trait FontProvider: Send + Sync {
    fn font(&self, size: u32, bold: bool) -> FontHandle;
}

/// Font provider backed by files on disk, caching every face it opens.
pub struct FontCache {
    config: FontConfig,
    /// Faces by path; `None` records a path that could not be loaded.
    faces: RwLock<HashMap<PathBuf, Option<Arc<FontFace>>>>,
    builtin: Arc<FontFace>,
}

impl FontCache {
    pub fn new(config: FontConfig) -> Self {
        Self {
            config,
            faces: RwLock::new(HashMap::new()),
            builtin: Arc::new(FontFace::Builtin),
        }
    }

    pub fn config(&self) -> &FontConfig {
        &self.config
    }

    fn resolve(&self, strategy: FontStrategy) -> Option<Arc<FontFace>> {
        if strategy == FontStrategy::BuiltinFace {
            return Some(self.builtin.clone());
        }
        self.config
            .candidates(strategy)
            .iter()
            .find_map(|path| self.load_path(path))
    }

    fn load_path(&self, path: &Path) -> Option<Arc<FontFace>> {
        if let Some(cached) = self.faces.read().get(path) {
            return cached.clone();
        }

        let face = LoadedFont::from_file(path).map(|font| Arc::new(FontFace::Outline(font)));
        if face.is_none() {
            debug!(path = %path.display(), "font candidate unavailable");
        }
        self.faces.write().insert(path.to_path_buf(), face.clone());
        face
    }

    /// Number of candidate paths probed so far.
    pub fn len(&self) -> usize {
        self.faces.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.read().is_empty()
    }
}

impl Default for FontCache {
    fn default() -> Self {
        Self::new(FontConfig::default())
    }
}

impl FontProvider for FontCache {
    fn font(&self, size: u32, bold: bool) -> FontHandle {
        for &strategy in FontStrategy::chain(bold) {
            if let Some(face) = self.resolve(strategy) {
                if strategy == FontStrategy::BuiltinFace {
                    warn!(size, bold, "no font file resolved, using built-in face");
                } else {
                    debug!(size, bold, ?strategy, ?face, "font resolved");
                }
                return FontHandle::new(face, size);
            }
        }
        FontHandle::new(self.builtin.clone(), size)
    }
}
