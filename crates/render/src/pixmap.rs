//! RGBA pixmap operations used by the element renderers.
//!
//! All buffers hold straight (non-premultiplied) alpha. Every operation here
//! returns a fresh buffer or mutates the one it is given; nothing is cached.

use common::color::Color;
use common::geometry::{PixelRect, Point, Rect, Transform};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// Create a canvas filled with `background` at full opacity.
pub fn new_canvas(width: u32, height: u32, background: Color) -> RgbaImage {
    let fill = background.with_alpha(255);
    RgbaImage::from_pixel(width, height, Rgba(fill.to_array()))
}

/// Blend a single color onto `target`. Out of bounds writes are dropped.
pub fn blend_pixel(target: &mut RgbaImage, x: i64, y: i64, color: Color) {
    let outside = x < 0 || y < 0 || x >= target.width() as i64 || y >= target.height() as i64;
    if outside || color.a == 0 {
        return;
    }

    let pixel = target.get_pixel_mut(x as u32, y as u32);
    let blended = color.blend_over(Color::from_array(pixel.0));
    *pixel = Rgba(blended.to_array());
}

/// Source-over composite `source` onto `target` with its top-left at `(x, y)`.
pub fn composite_over(target: &mut RgbaImage, source: &RgbaImage, x: i64, y: i64) {
    let x_start = x.max(0);
    let y_start = y.max(0);
    let x_end = x.saturating_add(source.width() as i64).min(target.width() as i64);
    let y_end = y.saturating_add(source.height() as i64).min(target.height() as i64);

    for ty in y_start..y_end {
        for tx in x_start..x_end {
            let src = source.get_pixel((tx - x) as u32, (ty - y) as u32);
            if src[3] == 0 {
                continue;
            }
            let dst = target.get_pixel_mut(tx as u32, ty as u32);
            let blended = Color::from_array(src.0).blend_over(Color::from_array(dst.0));
            *dst = Rgba(blended.to_array());
        }
    }
}

/// Multiply every pixel's alpha by `alpha / 255`, truncating. RGB is untouched.
pub fn multiply_alpha(image: &mut RgbaImage, alpha: u8) {
    if alpha == 255 {
        return;
    }
    for pixel in image.pixels_mut() {
        pixel[3] = (pixel[3] as u32 * alpha as u32 / 255) as u8;
    }
}

/// Dimensions after scaling by `factor`, never below one pixel per axis.
pub fn scaled_dimensions(width: u32, height: u32, factor: f64) -> (u32, u32) {
    let scale_axis = |len: u32| ((len as f64 * factor).round() as u32).max(1);
    (scale_axis(width), scale_axis(height))
}

/// Lanczos resize by a uniform factor.
pub fn scale(image: &RgbaImage, factor: f64) -> RgbaImage {
    let (width, height) = scaled_dimensions(image.width(), image.height(), factor);
    imageops::resize(image, width, height, FilterType::Lanczos3)
}

/// Copy out the pixels covered by `rect`.
pub fn crop(image: &RgbaImage, rect: PixelRect) -> RgbaImage {
    imageops::crop_imm(image, rect.x.max(0) as u32, rect.y.max(0) as u32, rect.width, rect.height)
        .to_image()
}

// Keeps a box whose rotated extent is a whole number of pixels from growing
// by one because of float noise.
const EXPAND_EPSILON: f32 = 1e-3;

/// Rotate clockwise by `degrees`, growing the canvas so nothing is clipped.
///
/// Quarter turns are exact transposes; any other angle is resampled with a
/// bicubic kernel and the uncovered area is left fully transparent.
pub fn rotate_expand(image: &RgbaImage, degrees: f64) -> RgbaImage {
    let turn = degrees.rem_euclid(360.0);
    if turn == 0.0 {
        return image.clone();
    } else if turn == 90.0 {
        return imageops::rotate90(image);
    } else if turn == 180.0 {
        return imageops::rotate180(image);
    } else if turn == 270.0 {
        return imageops::rotate270(image);
    }

    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let angle = (turn as f32).to_radians();
    let (w, h) = (width as f32, height as f32);
    let bounds = Transform::rotation(angle).bounds(Rect::new(-w / 2.0, -h / 2.0, w, h));
    let out_width = (bounds.width - EXPAND_EPSILON).ceil().max(1.0) as u32;
    let out_height = (bounds.height - EXPAND_EPSILON).ceil().max(1.0) as u32;

    // Destination pixel centre -> source pixel space.
    let to_source = Transform::translation(-(out_width as f32) / 2.0, -(out_height as f32) / 2.0)
        .then(&Transform::rotation(-angle))
        .then(&Transform::translation(w / 2.0, h / 2.0));

    RgbaImage::from_fn(out_width, out_height, |dx, dy| {
        let src = to_source.apply(Point::new(dx as f32 + 0.5, dy as f32 + 0.5));
        Rgba(sample_bicubic(image, src))
    })
}

fn cubic_weight(t: f32) -> f32 {
    const A: f32 = -0.5;
    let t = t.abs();
    if t < 1.0 {
        ((A + 2.0) * t - (A + 3.0)) * t * t + 1.0
    } else if t < 2.0 {
        (((t - 5.0) * t + 8.0) * t - 4.0) * A
    } else {
        0.0
    }
}

/// Bicubic sample at `point` (pixel-space, pixel centres at `.5`).
/// Points outside the image are transparent; taps past the edge clamp.
fn sample_bicubic(image: &RgbaImage, point: Point) -> [u8; 4] {
    let (width, height) = (image.width() as i64, image.height() as i64);
    if point.x < 0.0 || point.y < 0.0 || point.x >= width as f32 || point.y >= height as f32 {
        return [0; 4];
    }

    let x = point.x - 0.5;
    let y = point.y - 0.5;
    let (x0, y0) = (x.floor(), y.floor());
    let (fx, fy) = (x - x0, y - y0);
    let (x0, y0) = (x0 as i64, y0 as i64);

    let mut acc = [0.0f32; 4];
    for j in -1..=2i64 {
        let wy = cubic_weight(j as f32 - fy);
        let sy = (y0 + j).clamp(0, height - 1) as u32;
        for i in -1..=2i64 {
            let weight = cubic_weight(i as f32 - fx) * wy;
            let sx = (x0 + i).clamp(0, width - 1) as u32;
            let px = image.get_pixel(sx, sy);
            for (channel, value) in acc.iter_mut().enumerate() {
                *value += px[channel] as f32 * weight;
            }
        }
    }

    acc.map(|v| v.round().clamp(0.0, 255.0) as u8)
}
