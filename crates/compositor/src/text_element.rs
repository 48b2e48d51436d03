//! Text elements.

use crate::scene::{FontSpec, TextElement};
use crate::settings::TextDefaults;
use common::color::Color;
use common::geometry::{anchor_offset, HorizontalAnchor, TextAlign, VerticalAnchor};
use image::RgbaImage;
use render::font::{FontProvider, MAX_FONT_SIZE};
use render::glow::{Glow, MAX_GLOW_RADIUS};
use render::pixmap;
use render::text::TextLayout;
use std::sync::Arc;
use tracing::debug;

/// Fully resolved text styling.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    pub size: u32,
    pub bold: bool,
    /// Fill color with the element's opacity as its alpha.
    pub color: Color,
    pub align: TextAlign,
    pub anchor_v: VerticalAnchor,
    pub anchor_h: HorizontalAnchor,
    pub rotation: f64,
    pub glow: Option<Glow>,
}

impl TextStyle {
    /// Fill in every unset field of `spec` from `defaults`.
    pub fn resolve(spec: Option<&FontSpec>, defaults: &TextDefaults) -> Self {
        let empty = FontSpec::default();
        let spec = spec.unwrap_or(&empty);

        let color = spec
            .color
            .as_deref()
            .map(Color::from_hex_or_black)
            .unwrap_or(defaults.color);
        let alpha = spec
            .alpha
            .map(Color::clamp_alpha)
            .unwrap_or(defaults.alpha);

        let glow = spec.glow.as_ref().map(|glow| Glow {
            color: glow
                .color
                .as_deref()
                .map(Color::from_hex_or_black)
                .unwrap_or(defaults.glow_color),
            radius: glow
                .radius
                .map(|r| r.clamp(0, MAX_GLOW_RADIUS as i64) as u32)
                .unwrap_or(defaults.glow_radius),
            alpha: glow
                .alpha
                .map(Color::clamp_alpha)
                .unwrap_or(defaults.glow_alpha),
        });

        Self {
            size: spec
                .size
                .map(|s| s.clamp(1, MAX_FONT_SIZE as i64) as u32)
                .unwrap_or(defaults.size),
            bold: spec.bold.unwrap_or(defaults.bold),
            color: Color { a: alpha, ..color },
            align: spec.align.unwrap_or(defaults.align),
            anchor_v: spec.anchor_v.unwrap_or(defaults.anchor_v),
            anchor_h: spec.anchor_h.unwrap_or(defaults.anchor_h),
            rotation: spec.rotation.unwrap_or(defaults.rotation),
            glow,
        }
    }

    /// Whether the text must go through an off-canvas bitmap first.
    pub fn needs_isolation(&self) -> bool {
        self.color.a < 255 || self.rotation != 0.0 || self.glow.is_some()
    }
}

/// Draws text elements onto a canvas.
pub struct TextElementRenderer {
    defaults: TextDefaults,
    fonts: Arc<dyn FontProvider>,
}

impl TextElementRenderer {
    pub fn new(defaults: TextDefaults, fonts: Arc<dyn FontProvider>) -> Self {
        Self { defaults, fonts }
    }

    pub fn style(&self, element: &TextElement) -> TextStyle {
        TextStyle::resolve(element.font.as_ref(), &self.defaults)
    }

    fn layout(&self, style: &TextStyle) -> TextLayout {
        TextLayout::new(self.fonts.font(style.size, style.bold))
    }

    /// Text bitmap with glow and rotation applied, in that order.
    pub fn render_isolated(&self, element: &TextElement, style: &TextStyle) -> RgbaImage {
        let mut bitmap = self
            .layout(style)
            .render_isolated(&element.text, style.color, style.align);

        if let Some(glow) = &style.glow {
            bitmap = glow.apply(&bitmap);
        }
        if style.rotation != 0.0 {
            bitmap = pixmap::rotate_expand(&bitmap, style.rotation);
        }
        bitmap
    }

    pub fn draw(&self, canvas: &mut RgbaImage, element: &TextElement) {
        let style = self.style(element);

        if !style.needs_isolation() {
            debug!(
                id = element.id.as_deref().unwrap_or("?"),
                x = element.x,
                y = element.y,
                "drawing text directly"
            );
            self.layout(&style).draw(
                canvas,
                &element.text,
                (clamp_i32(element.x), clamp_i32(element.y)),
                style.color,
                style.align,
                style.anchor_v,
                style.anchor_h,
            );
            return;
        }

        let bitmap = self.render_isolated(element, &style);
        let (offset_x, offset_y) =
            anchor_offset(bitmap.width(), bitmap.height(), style.anchor_v, style.anchor_h);
        let left = element.x.saturating_sub(offset_x as i64);
        let top = element.y.saturating_sub(offset_y as i64);

        debug!(
            id = element.id.as_deref().unwrap_or("?"),
            left,
            top,
            width = bitmap.width(),
            height = bitmap.height(),
            glow = style.glow.is_some(),
            rotation = style.rotation,
            "drawing isolated text"
        );
        pixmap::composite_over(canvas, &bitmap, left, top);
    }
}

fn clamp_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
