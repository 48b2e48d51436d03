//! Main compositor implementation.

use crate::image_element::ImageElementRenderer;
use crate::order::paint_order;
use crate::scene::{Element, Scene};
use crate::settings::RenderSettings;
use crate::text_element::TextElementRenderer;
use common::error::{FigureError, FigureResult};
use image::RgbaImage;
use render::codec::{BitmapCodec, PngCodec};
use render::font::{FontCache, FontProvider};
use render::pixmap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Statistics from the last composition.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompositorStats {
    /// Number of elements drawn.
    pub elements_drawn: usize,
    /// Composition time in milliseconds.
    pub composition_time_ms: f32,
}

/// Draws a scene onto a fresh canvas and persists it.
pub struct FigureCompositor {
    settings: RenderSettings,
    images: ImageElementRenderer,
    texts: TextElementRenderer,
    codec: Arc<dyn BitmapCodec>,
}

impl FigureCompositor {
    pub fn new(
        settings: RenderSettings,
        fonts: Arc<dyn FontProvider>,
        codec: Arc<dyn BitmapCodec>,
    ) -> Self {
        Self {
            images: ImageElementRenderer::new(settings.image.clone(), codec.clone()),
            texts: TextElementRenderer::new(settings.text.clone(), fonts),
            settings,
            codec,
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Draw every element of `scene` in paint order.
    pub fn compose(&self, scene: &Scene) -> FigureResult<RgbaImage> {
        self.compose_with_stats(scene).map(|(canvas, _)| canvas)
    }

    pub fn compose_with_stats(&self, scene: &Scene) -> FigureResult<(RgbaImage, CompositorStats)> {
        let start = Instant::now();
        let spec = &scene.canvas;
        let mut canvas = pixmap::new_canvas(spec.width, spec.height, spec.background);

        let order = paint_order(scene);
        debug!(
            width = spec.width,
            height = spec.height,
            elements = order.len(),
            layered = scene.uses_layers(),
            "compositing scene"
        );

        for element in &order {
            match element {
                Element::Image(image) => self.images.draw(&mut canvas, image, &scene.assets_dir)?,
                Element::Text(text) => self.texts.draw(&mut canvas, text),
            }
        }

        let stats = CompositorStats {
            elements_drawn: order.len(),
            composition_time_ms: start.elapsed().as_secs_f32() * 1000.0,
        };
        Ok((canvas, stats))
    }

    /// Compose `scene` and write it to `output`, or to the scene's own
    /// output path when `output` is `None`. Returns the path written.
    pub fn render(&self, scene: &Scene, output: Option<&Path>) -> FigureResult<PathBuf> {
        let (canvas, stats) = self.compose_with_stats(scene)?;

        let target = output.map_or_else(|| scene.output.clone(), Path::to_path_buf);
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|err| FigureError::io(parent, err))?;
        }
        self.codec.encode(&canvas, &target)?;

        info!(
            output = %target.display(),
            elements = stats.elements_drawn,
            time_ms = stats.composition_time_ms,
            "figure rendered"
        );
        Ok(target)
    }
}

impl Default for FigureCompositor {
    fn default() -> Self {
        Self::new(
            RenderSettings::default(),
            Arc::new(FontCache::default()),
            Arc::new(PngCodec),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::error::ErrorKind;
    use image::Rgba;
    use render::font::FontConfig;
    use serde_json::json;

    fn compositor() -> FigureCompositor {
        FigureCompositor::new(
            RenderSettings::default(),
            Arc::new(FontCache::new(FontConfig::builtin_only())),
            Arc::new(PngCodec),
        )
    }

    #[test]
    fn test_empty_scene_is_background() {
        let scene = Scene::from_value(
            &json!({"canvas": {"width": 8, "height": 6, "background": "#336699"}, "elements": []}),
            Path::new("."),
        )
        .unwrap();

        let canvas = compositor().compose(&scene).unwrap();
        assert_eq!(canvas.dimensions(), (8, 6));
        assert!(canvas.pixels().all(|p| p.0 == [0x33, 0x66, 0x99, 255]));
    }

    #[test]
    fn test_later_elements_paint_on_top() {
        let dir = tempfile::tempdir().unwrap();
        RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]))
            .save(dir.path().join("red.png"))
            .unwrap();
        RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255]))
            .save(dir.path().join("blue.png"))
            .unwrap();

        let scene = Scene::from_value(
            &json!({
                "canvas": {"width": 4, "height": 4, "background": "#fff"},
                "elements": [
                    {"type": "image", "x": 0, "y": 0, "z": 2, "path": "red.png"},
                    {"type": "image", "x": 0, "y": 0, "z": 1, "path": "blue.png"}
                ]
            }),
            dir.path(),
        )
        .unwrap();

        let canvas = compositor().compose(&scene).unwrap();
        assert_eq!(canvas.get_pixel(1, 1).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_render_creates_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let scene = Scene::from_value(
            &json!({
                "canvas": {"width": 3, "height": 2, "background": "white"},
                "output": {"path": "nested/deeper/out.png"},
                "elements": []
            }),
            dir.path(),
        )
        .unwrap();

        let written = compositor().render(&scene, None).unwrap();
        assert_eq!(written, dir.path().join("nested/deeper/out.png"));
        let decoded = image::open(&written).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));
    }

    #[test]
    fn test_missing_asset_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let scene = Scene::from_value(
            &json!({
                "canvas": {"width": 3, "height": 2, "background": "#000"},
                "elements": [{"type": "image", "id": "logo", "x": 0, "y": 0, "path": "logo.png"}]
            }),
            dir.path(),
        )
        .unwrap();

        let out = dir.path().join("out.png");
        let err = compositor().render(&scene, Some(&out)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AssetNotFound);
        assert!(!out.exists());
    }
}
