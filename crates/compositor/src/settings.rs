//! Render defaults.

use common::color::Color;
use common::geometry::{HorizontalAnchor, TextAlign, VerticalAnchor};

/// Values used for any style field a scene leaves unset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderSettings {
    pub text: TextDefaults,
    pub image: ImageDefaults,
}

/// Text style defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct TextDefaults {
    /// Font size in pixels.
    pub size: u32,
    pub color: Color,
    pub alpha: u8,
    pub bold: bool,
    pub align: TextAlign,
    pub anchor_v: VerticalAnchor,
    pub anchor_h: HorizontalAnchor,
    /// Clockwise, in degrees.
    pub rotation: f64,
    pub glow_color: Color,
    pub glow_radius: u32,
    pub glow_alpha: u8,
}

impl Default for TextDefaults {
    fn default() -> Self {
        Self {
            size: 32,
            color: Color::BLACK,
            alpha: 255,
            bold: false,
            align: TextAlign::Left,
            anchor_v: VerticalAnchor::Top,
            anchor_h: HorizontalAnchor::Left,
            rotation: 0.0,
            glow_color: Color::WHITE,
            glow_radius: 10,
            glow_alpha: 200,
        }
    }
}

/// Image placement defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageDefaults {
    pub scale: f64,
    pub alpha: u8,
    /// Clockwise, in degrees.
    pub rotation: f64,
    pub anchor_v: VerticalAnchor,
    pub anchor_h: HorizontalAnchor,
}

impl Default for ImageDefaults {
    fn default() -> Self {
        Self {
            scale: 1.0,
            alpha: 255,
            rotation: 0.0,
            anchor_v: VerticalAnchor::Top,
            anchor_h: HorizontalAnchor::Left,
        }
    }
}
