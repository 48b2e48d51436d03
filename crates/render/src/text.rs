//! Text layout and rasterization.
//!
//! Text is laid out as a block of lines. Glyph positions are relative to the
//! block origin: the left edge of the widest line and the ascender line of
//! the first line. Every line advances by the rounded ascent plus
//! [`LINE_SPACING`].

use crate::font::{FontHandle, GlyphBitmap, LineMetrics};
use crate::pixmap::{blend_pixel, crop};
use common::color::Color;
use common::geometry::{HorizontalAnchor, PixelRect, Point, TextAlign, VerticalAnchor};
use image::RgbaImage;
use smallvec::SmallVec;
use std::sync::Arc;

/// Extra pixels between lines, on top of the ascent.
pub const LINE_SPACING: f32 = 4.0;

/// Margin around the text while drawing into an isolated bitmap.
pub const LAYOUT_PADDING: u32 = 10;

/// A glyph with its top-left corner in block coordinates.
#[derive(Clone)]
pub struct PlacedGlyph {
    pub x: i32,
    pub y: i32,
    pub bitmap: Arc<GlyphBitmap>,
}

impl PlacedGlyph {
    pub fn bounds(&self) -> PixelRect {
        PixelRect::new(self.x, self.y, self.bitmap.width, self.bitmap.height)
    }
}

/// A laid out block of text.
pub struct TextBlock {
    glyphs: Vec<PlacedGlyph>,
    line_widths: SmallVec<[f32; 4]>,
    width: f32,
    line_spacing: f32,
    metrics: LineMetrics,
}

impl TextBlock {
    pub fn glyphs(&self) -> &[PlacedGlyph] {
        &self.glyphs
    }

    pub fn line_count(&self) -> usize {
        self.line_widths.len()
    }

    pub fn line_widths(&self) -> &[f32] {
        &self.line_widths
    }

    /// Advance width of the widest line.
    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn line_spacing(&self) -> f32 {
        self.line_spacing
    }

    /// Tight bounding box of all inked pixels. Empty when nothing is drawn.
    pub fn ink_bounds(&self) -> PixelRect {
        self.glyphs
            .iter()
            .map(PlacedGlyph::bounds)
            .fold(PixelRect::default(), |acc, rect| acc.union(&rect))
    }

    /// Point in block coordinates that an anchored draw places at its target.
    ///
    /// Horizontally the anchor spans the widest line's advance. Vertically
    /// `Top` is the first line's ascender, `Middle` is halfway between
    /// ascender and descender shifted by half of the extra lines, and
    /// `Bottom` is the first line's baseline.
    pub fn anchor_point(&self, vertical: VerticalAnchor, horizontal: HorizontalAnchor) -> Point {
        let extra_lines = self.line_count().saturating_sub(1) as f32;
        let y = match vertical {
            VerticalAnchor::Top => 0.0,
            VerticalAnchor::Middle => {
                (self.metrics.ascent - self.metrics.descent) / 2.0
                    + extra_lines * self.line_spacing / 2.0
            }
            VerticalAnchor::Bottom => self.metrics.ascent,
        };
        Point::new(self.width * horizontal.fraction(), y)
    }

    /// Blend every glyph onto `target` with the block origin at `origin`.
    pub fn paint(&self, target: &mut RgbaImage, origin: (i32, i32), color: Color) {
        for glyph in &self.glyphs {
            let bitmap = &glyph.bitmap;
            let left = origin.0 as i64 + glyph.x as i64;
            let top = origin.1 as i64 + glyph.y as i64;

            for gy in 0..bitmap.height {
                for gx in 0..bitmap.width {
                    let coverage = bitmap.data[(gy * bitmap.width + gx) as usize];
                    if coverage == 0 {
                        continue;
                    }
                    let alpha = (color.a as u32 * coverage as u32 / 255) as u8;
                    blend_pixel(
                        target,
                        left + gx as i64,
                        top + gy as i64,
                        Color { a: alpha, ..color },
                    );
                }
            }
        }
    }
}

/// Split text into lines on `\n`, dropping a trailing `\r` from each line.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Text layout helper bound to one font.
pub struct TextLayout {
    font: FontHandle,
}

impl TextLayout {
    pub fn new(font: FontHandle) -> Self {
        Self { font }
    }

    pub fn font(&self) -> &FontHandle {
        &self.font
    }

    /// Lay out `text`, aligning lines against the widest one.
    pub fn layout(&self, text: &str, align: TextAlign) -> TextBlock {
        let metrics = self.font.line_metrics();
        let line_spacing = metrics.ascent.round() + LINE_SPACING;

        let mut lines: SmallVec<[Vec<(f32, Arc<GlyphBitmap>)>; 4]> = SmallVec::new();
        let mut line_widths: SmallVec<[f32; 4]> = SmallVec::new();

        for line in split_lines(text) {
            let mut pen = 0.0f32;
            let mut previous = None;
            let mut shaped = Vec::with_capacity(line.len());

            for c in line.chars() {
                if let Some(prev) = previous {
                    pen += self.font.kern(prev, c);
                }
                let glyph = self.font.glyph(c);
                let advance = glyph.metrics.advance_width;
                shaped.push((pen, glyph));
                pen += advance;
                previous = Some(c);
            }

            lines.push(shaped);
            line_widths.push(pen);
        }

        let width = line_widths.iter().copied().fold(0.0f32, f32::max);
        let mut glyphs = Vec::new();

        for (index, shaped) in lines.into_iter().enumerate() {
            let left = align.line_offset(width, line_widths[index]);
            let baseline = (index as f32 * line_spacing + metrics.ascent).round() as i32;

            for (pen, bitmap) in shaped {
                if bitmap.width == 0 || bitmap.height == 0 {
                    continue;
                }
                let x = (left + pen).round() as i32 + bitmap.metrics.xmin;
                let y = baseline - bitmap.metrics.ymin - bitmap.height as i32;
                glyphs.push(PlacedGlyph { x, y, bitmap });
            }
        }

        TextBlock {
            glyphs,
            line_widths,
            width,
            line_spacing,
            metrics,
        }
    }

    /// Draw straight onto `target` so that the anchor point lands on `position`.
    pub fn draw(
        &self,
        target: &mut RgbaImage,
        text: &str,
        position: (i32, i32),
        color: Color,
        align: TextAlign,
        vertical: VerticalAnchor,
        horizontal: HorizontalAnchor,
    ) {
        let block = self.layout(text, align);
        let anchor = block.anchor_point(vertical, horizontal);
        let origin = (
            (position.0 as f32 - anchor.x).round() as i32,
            (position.1 as f32 - anchor.y).round() as i32,
        );
        block.paint(target, origin, color);
    }

    /// Render `text` into its own bitmap cropped to the inked area.
    ///
    /// The text is painted into a padded scratch buffer with the ink box's
    /// top-left at the padding margin, then cropped back to the ink box.
    pub fn render_isolated(&self, text: &str, color: Color, align: TextAlign) -> RgbaImage {
        let block = self.layout(text, align);
        let bounds = block.ink_bounds();
        if bounds.is_empty() {
            return RgbaImage::new(0, 0);
        }

        let padding = LAYOUT_PADDING;
        let mut scratch = RgbaImage::new(bounds.width + padding * 2, bounds.height + padding * 2);
        let origin = (padding as i32 - bounds.x, padding as i32 - bounds.y);
        block.paint(&mut scratch, origin, color);

        crop(
            &scratch,
            PixelRect::new(padding as i32, padding as i32, bounds.width, bounds.height),
        )
    }
}
