//! Bitmap elements.

use crate::scene::{normalize_path, ImageElement};
use crate::settings::ImageDefaults;
use common::color::Color;
use common::error::{FigureError, FigureResult};
use common::geometry::anchor_offset;
use image::RgbaImage;
use render::codec::BitmapCodec;
use render::pixmap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Draws image elements onto a canvas.
pub struct ImageElementRenderer {
    defaults: ImageDefaults,
    codec: Arc<dyn BitmapCodec>,
}

impl ImageElementRenderer {
    pub fn new(defaults: ImageDefaults, codec: Arc<dyn BitmapCodec>) -> Self {
        Self { defaults, codec }
    }

    /// Where the element's source file is expected.
    pub fn source_path(element: &ImageElement, assets_dir: &Path) -> PathBuf {
        normalize_path(&assets_dir.join(&element.path))
    }

    /// Load the source and apply scale, opacity and rotation. Each step is
    /// skipped at its neutral value.
    pub fn prepare(&self, element: &ImageElement, assets_dir: &Path) -> FigureResult<RgbaImage> {
        let source = Self::source_path(element, assets_dir);
        if !source.exists() {
            return Err(FigureError::asset_not_found(element.id.as_deref(), source));
        }

        let mut bitmap = self.codec.decode(&source)?;

        let scale = element.scale.unwrap_or(self.defaults.scale);
        if scale != 1.0 {
            bitmap = pixmap::scale(&bitmap, scale);
        }

        let alpha = element
            .alpha
            .map(Color::clamp_alpha)
            .unwrap_or(self.defaults.alpha);
        if alpha < 255 {
            pixmap::multiply_alpha(&mut bitmap, alpha);
        }

        let rotation = element.rotation.unwrap_or(self.defaults.rotation);
        if rotation != 0.0 {
            bitmap = pixmap::rotate_expand(&bitmap, rotation);
        }

        Ok(bitmap)
    }

    /// Draw `element` with its anchor point at `(x, y)`.
    pub fn draw(
        &self,
        canvas: &mut RgbaImage,
        element: &ImageElement,
        assets_dir: &Path,
    ) -> FigureResult<()> {
        let bitmap = self.prepare(element, assets_dir)?;

        let (offset_x, offset_y) = anchor_offset(
            bitmap.width(),
            bitmap.height(),
            element.anchor_v.unwrap_or(self.defaults.anchor_v),
            element.anchor_h.unwrap_or(self.defaults.anchor_h),
        );
        let left = element.x.saturating_sub(offset_x as i64);
        let top = element.y.saturating_sub(offset_y as i64);

        debug!(
            id = element.id.as_deref().unwrap_or("?"),
            left,
            top,
            width = bitmap.width(),
            height = bitmap.height(),
            "drawing image"
        );
        pixmap::composite_over(canvas, &bitmap, left, top);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::error::ErrorKind;
    use common::geometry::{HorizontalAnchor, VerticalAnchor};
    use image::Rgba;
    use render::codec::PngCodec;

    fn renderer() -> ImageElementRenderer {
        ImageElementRenderer::new(ImageDefaults::default(), Arc::new(PngCodec))
    }

    fn element(path: &str) -> ImageElement {
        ImageElement {
            id: Some("pic".to_string()),
            x: 0,
            y: 0,
            z: None,
            path: PathBuf::from(path),
            scale: None,
            alpha: None,
            rotation: None,
            anchor_v: None,
            anchor_h: None,
        }
    }

    fn write_fixture(dir: &Path, name: &str, image: &RgbaImage) {
        image.save(dir.join(name)).unwrap();
    }

    #[test]
    fn test_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let err = renderer().prepare(&element("gone.png"), dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AssetNotFound);
        match err {
            FigureError::AssetNotFound { id, path } => {
                assert_eq!(id, "pic");
                assert_eq!(path, dir.path().join("gone.png"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_prepare_scales_and_fades() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "red.png", &RgbaImage::from_pixel(10, 4, Rgba([255, 0, 0, 255])));

        let mut el = element("red.png");
        el.scale = Some(0.5);
        el.alpha = Some(128);
        let bitmap = renderer().prepare(&el, dir.path()).unwrap();
        assert_eq!(bitmap.dimensions(), (5, 2));
        assert!(bitmap.pixels().all(|p| p[3] == 128));
    }

    #[test]
    fn test_alpha_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let source = RgbaImage::from_pixel(3, 3, Rgba([1, 2, 3, 200]));
        write_fixture(dir.path(), "a.png", &source);

        let mut el = element("a.png");
        el.alpha = Some(1000);
        assert_eq!(renderer().prepare(&el, dir.path()).unwrap(), source);

        el.alpha = Some(-5);
        let faded = renderer().prepare(&el, dir.path()).unwrap();
        assert!(faded.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_draw_bottom_right_anchor() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "blue.png", &RgbaImage::from_pixel(4, 2, Rgba([0, 0, 255, 255])));

        let mut canvas = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        let mut el = element("blue.png");
        el.x = 6;
        el.y = 6;
        el.anchor_v = Some(VerticalAnchor::Bottom);
        el.anchor_h = Some(HorizontalAnchor::Right);
        renderer().draw(&mut canvas, &el, dir.path()).unwrap();

        assert_eq!(canvas.get_pixel(2, 4).0, [0, 0, 255, 255]);
        assert_eq!(canvas.get_pixel(5, 5).0, [0, 0, 255, 255]);
        assert_eq!(canvas.get_pixel(6, 6).0, [255, 255, 255, 255]);
        assert_eq!(canvas.get_pixel(1, 4).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_draw_far_off_canvas() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "dot.png", &RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255])));

        let mut canvas = RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]));
        let before = canvas.clone();
        let mut el = element("dot.png");
        el.anchor_v = Some(VerticalAnchor::Bottom);
        el.anchor_h = Some(HorizontalAnchor::Center);
        for (x, y) in [(i64::MAX, 0), (0, i64::MAX), (i64::MIN, i64::MIN)] {
            el.x = x;
            el.y = y;
            renderer().draw(&mut canvas, &el, dir.path()).unwrap();
        }
        assert_eq!(canvas, before);
    }

    #[test]
    fn test_rotation_quarter_turn_swaps_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "bar.png", &RgbaImage::from_pixel(6, 2, Rgba([0, 0, 0, 255])));

        let mut el = element("bar.png");
        el.rotation = Some(90.0);
        assert_eq!(renderer().prepare(&el, dir.path()).unwrap().dimensions(), (2, 6));
    }
}
