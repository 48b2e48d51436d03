//! Glow halo around isolated text bitmaps.

use crate::pixmap::composite_over;
use common::color::Color;
use image::{imageops, GrayImage, Luma, Rgba, RgbaImage};

/// Largest blur radius applied. Larger radii are treated as this one.
pub const MAX_GLOW_RADIUS: u32 = 256;

/// A blurred colored halo drawn behind a bitmap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glow {
    pub color: Color,
    /// Blur sigma in pixels.
    pub radius: u32,
    /// Strength of the halo, 0..=255.
    pub alpha: u8,
}

impl Glow {
    pub fn new(color: Color, radius: u32, alpha: u8) -> Self {
        Self { color, radius, alpha }
    }

    fn effective_radius(&self) -> u32 {
        self.radius.min(MAX_GLOW_RADIUS)
    }

    /// Transparent border added on each side so the blur has room to spread.
    pub fn margin(&self) -> u32 {
        self.effective_radius() * 3
    }

    /// Return `text` on top of its halo. The result is `2 * margin` larger on
    /// each axis and the original pixels sit unchanged at `(margin, margin)`.
    pub fn apply(&self, text: &RgbaImage) -> RgbaImage {
        let margin = self.margin();
        let width = text.width() + margin * 2;
        let height = text.height() + margin * 2;

        let mut mask = GrayImage::new(width, height);
        for (x, y, pixel) in text.enumerate_pixels() {
            mask.put_pixel(x + margin, y + margin, Luma([pixel[3]]));
        }

        let radius = self.effective_radius();
        if radius > 0 {
            mask = imageops::blur(&mask, radius as f32);
        }

        let [r, g, b, _] = self.color.to_array();
        let mut layer = RgbaImage::from_fn(width, height, |x, y| {
            let strength = mask.get_pixel(x, y)[0] as u32 * self.alpha as u32 / 255;
            Rgba([r, g, b, strength as u8])
        });

        composite_over(&mut layer, text, margin as i64, margin as i64);
        layer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_block() -> RgbaImage {
        RgbaImage::from_pixel(20, 10, Rgba([12, 34, 56, 255]))
    }

    #[test]
    fn test_margin() {
        assert_eq!(Glow::new(Color::WHITE, 10, 200).margin(), 30);
        assert_eq!(Glow::new(Color::WHITE, 0, 200).margin(), 0);
    }

    #[test]
    fn test_margin_is_capped() {
        let huge = Glow::new(Color::WHITE, 2_000_000_000, 200);
        assert_eq!(huge.margin(), MAX_GLOW_RADIUS * 3);
        assert_eq!(Glow::new(Color::WHITE, u32::MAX, 200).margin(), MAX_GLOW_RADIUS * 3);
    }

    #[test]
    fn test_glow_grows_by_margin() {
        let glow = Glow::new(Color::WHITE, 4, 200);
        let result = glow.apply(&text_block());
        assert_eq!(result.dimensions(), (20 + 24, 10 + 24));
    }

    #[test]
    fn test_glow_keeps_text_pixels() {
        let glow = Glow::new(Color::RED, 3, 255);
        let result = glow.apply(&text_block());
        let margin = glow.margin();
        for y in 0..10 {
            for x in 0..20 {
                assert_eq!(result.get_pixel(x + margin, y + margin).0, [12, 34, 56, 255]);
            }
        }
    }

    #[test]
    fn test_glow_halo_uses_glow_color() {
        let glow = Glow::new(Color::RED, 3, 255);
        let result = glow.apply(&text_block());
        // Just outside the text the halo is red and partially opaque.
        let halo = result.get_pixel(glow.margin() - 1, glow.margin() + 5);
        assert_eq!(&halo.0[..3], &[255, 0, 0]);
        assert!(halo[3] > 0 && halo[3] < 255);
        // Corners are beyond the blur's reach.
        assert!(result.get_pixel(0, 0)[3] < 8);
    }

    #[test]
    fn test_zero_radius_is_unblurred() {
        let glow = Glow::new(Color::WHITE, 0, 200);
        let result = glow.apply(&text_block());
        assert_eq!(result.dimensions(), (20, 10));
        assert_eq!(result.get_pixel(5, 5).0, [12, 34, 56, 255]);
    }
}
