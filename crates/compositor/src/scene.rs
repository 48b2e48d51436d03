//! Typed scene description.
//!
//! A scene is built from a raw JSON tree in two steps: the tree is first
//! checked by [`crate::validate`] so every problem is reported with its
//! location, then each element is deserialized on its own so decoding
//! failures carry the same location.

use crate::validate;
use common::color::Color;
use common::error::{FigureError, FigureResult};
use common::geometry::{HorizontalAnchor, TextAlign, VerticalAnchor};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Component, Path, PathBuf};

/// Output location used when the scene does not name one.
pub const DEFAULT_OUTPUT_PATH: &str = "build/figure.png";

/// Canvas size and fill.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasSpec {
    pub width: u32,
    pub height: u32,
    pub background: Color,
}

/// A fully validated scene, ready to render.
#[derive(Clone, Debug)]
pub struct Scene {
    pub canvas: CanvasSpec,
    /// Directory image paths are resolved against.
    pub assets_dir: PathBuf,
    /// Where the canvas is written unless the caller overrides it.
    pub output: PathBuf,
    /// Flat element list. Ignored when `layers` is non-empty.
    pub elements: Vec<Element>,
    pub layers: Vec<Layer>,
}

/// An ordering group of elements.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub id: Option<String>,
    pub order: Option<i64>,
    pub elements: Vec<Element>,
}

/// A drawable unit.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Image(ImageElement),
    Text(TextElement),
}

impl Element {
    pub fn id(&self) -> Option<&str> {
        match self {
            Element::Image(image) => image.id.as_deref(),
            Element::Text(text) => text.id.as_deref(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Element::Image(_) => "image",
            Element::Text(_) => "text",
        }
    }

    pub fn position(&self) -> (i64, i64) {
        match self {
            Element::Image(image) => (image.x, image.y),
            Element::Text(text) => (text.x, text.y),
        }
    }

    pub fn z(&self) -> Option<i64> {
        match self {
            Element::Image(image) => image.z,
            Element::Text(text) => text.z,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ImageElement {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(deserialize_with = "de::int")]
    pub x: i64,
    #[serde(deserialize_with = "de::int")]
    pub y: i64,
    #[serde(default, deserialize_with = "de::opt_int")]
    pub z: Option<i64>,
    /// Source file, relative to the scene's asset directory.
    pub path: PathBuf,
    #[serde(default)]
    pub scale: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_int")]
    pub alpha: Option<i64>,
    /// Clockwise, in degrees.
    #[serde(default)]
    pub rotation: Option<f64>,
    #[serde(default)]
    pub anchor_v: Option<VerticalAnchor>,
    #[serde(default)]
    pub anchor_h: Option<HorizontalAnchor>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TextElement {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(deserialize_with = "de::int")]
    pub x: i64,
    #[serde(deserialize_with = "de::int")]
    pub y: i64,
    #[serde(default, deserialize_with = "de::opt_int")]
    pub z: Option<i64>,
    #[serde(deserialize_with = "de::text")]
    pub text: String,
    #[serde(default)]
    pub font: Option<FontSpec>,
}

/// Text styling as written in the scene. Unset fields take the renderer's
/// defaults.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FontSpec {
    /// Informational only; font files come from the font configuration.
    pub family: Option<String>,
    #[serde(deserialize_with = "de::opt_int")]
    pub size: Option<i64>,
    pub color: Option<String>,
    #[serde(deserialize_with = "de::opt_int")]
    pub alpha: Option<i64>,
    pub bold: Option<bool>,
    pub align: Option<TextAlign>,
    pub anchor_v: Option<VerticalAnchor>,
    pub anchor_h: Option<HorizontalAnchor>,
    pub rotation: Option<f64>,
    pub glow: Option<GlowSpec>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GlowSpec {
    pub color: Option<String>,
    #[serde(deserialize_with = "de::opt_int")]
    pub radius: Option<i64>,
    #[serde(deserialize_with = "de::opt_int")]
    pub alpha: Option<i64>,
}

impl Scene {
    /// Validate `root` and build a scene from it. Relative asset and output
    /// paths are resolved against `config_dir`.
    pub fn from_value(root: &Value, config_dir: &Path) -> FigureResult<Scene> {
        validate::validate_scene(root)?;

        let canvas = parse_canvas(&root["canvas"])?;

        let base_dir = root
            .pointer("/assets/base_dir")
            .and_then(Value::as_str)
            .unwrap_or("");
        let output = root
            .pointer("/output/path")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_OUTPUT_PATH);

        let elements = match root.get("elements").and_then(Value::as_array) {
            Some(list) => parse_elements(list, "elements")?,
            None => Vec::new(),
        };

        let mut layers = Vec::new();
        if let Some(list) = root.get("layers").and_then(Value::as_array) {
            for (index, raw) in list.iter().enumerate() {
                layers.push(parse_layer(raw, index)?);
            }
        }

        Ok(Scene {
            canvas,
            assets_dir: normalize_path(&config_dir.join(base_dir)),
            output: normalize_path(&config_dir.join(output)),
            elements,
            layers,
        })
    }

    /// Whether paint order comes from the layer list.
    pub fn uses_layers(&self) -> bool {
        !self.layers.is_empty()
    }

    /// Number of elements that will be drawn.
    pub fn element_count(&self) -> usize {
        if self.uses_layers() {
            self.layers.iter().map(|layer| layer.elements.len()).sum()
        } else {
            self.elements.len()
        }
    }
}

/// Resolve `.` and `..` segments without touching the filesystem.
/// `..` never climbs above the root.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

fn parse_canvas(raw: &Value) -> FigureResult<CanvasSpec> {
    let dimension = |key: &str| {
        raw[key]
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .filter(|&v| v > 0)
            .ok_or_else(|| {
                FigureError::invalid(format!("canvas.{key}"), "must be a positive integer")
            })
    };

    let background = raw["background"]
        .as_str()
        .and_then(Color::parse)
        .ok_or_else(|| FigureError::invalid("canvas.background", "unrecognized color"))?;

    Ok(CanvasSpec {
        width: dimension("width")?,
        height: dimension("height")?,
        background,
    })
}

fn parse_layer(raw: &Value, index: usize) -> FigureResult<Layer> {
    let path = format!("layers[{index}]");
    let elements = raw
        .get("elements")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            FigureError::invalid(format!("{path}.elements"), "missing elements (list)")
        })?;

    Ok(Layer {
        id: raw.get("id").and_then(Value::as_str).map(str::to_string),
        order: raw.get("order").and_then(de::truncate_value),
        elements: parse_elements(elements, &format!("{path}.elements"))?,
    })
}

fn parse_elements(list: &[Value], prefix: &str) -> FigureResult<Vec<Element>> {
    list.iter()
        .enumerate()
        .map(|(index, raw)| {
            Element::deserialize(raw).map_err(|err| {
                FigureError::invalid(format!("{prefix}[{index}]"), err.to_string())
            })
        })
        .collect()
}

/// Lenient field decoders.
mod de {
    use serde::{Deserialize, Deserializer};
    use serde_json::{Number, Value};

    fn truncate(number: &Number) -> i64 {
        number
            .as_i64()
            .unwrap_or_else(|| number.as_f64().unwrap_or_default().trunc() as i64)
    }

    pub(super) fn truncate_value(value: &Value) -> Option<i64> {
        match value {
            Value::Number(number) => Some(truncate(number)),
            _ => None,
        }
    }

    /// Any JSON number, truncated toward zero.
    pub fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        Number::deserialize(deserializer).map(|n| truncate(&n))
    }

    pub fn opt_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        Ok(Option::<Number>::deserialize(deserializer)?.map(|n| truncate(&n)))
    }

    /// A string, or a number or boolean rendered as text.
    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(serde::de::Error::custom(format!(
                "expected text, found {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scene(value: Value) -> FigureResult<Scene> {
        Scene::from_value(&value, Path::new("/configs"))
    }

    #[test]
    fn test_minimal_scene() {
        let scene = scene(json!({
            "canvas": {"width": 200, "height": 100, "background": "#FFFFFF"},
            "elements": []
        }))
        .unwrap();

        assert_eq!(
            scene.canvas,
            CanvasSpec {
                width: 200,
                height: 100,
                background: Color::WHITE
            }
        );
        assert_eq!(scene.assets_dir, Path::new("/configs"));
        assert_eq!(scene.output, Path::new("/configs/build/figure.png"));
        assert!(!scene.uses_layers());
        assert_eq!(scene.element_count(), 0);
    }

    #[test]
    fn test_paths_resolve_against_config_dir() {
        let scene = scene(json!({
            "version": "1.0",
            "canvas": {"width": 10, "height": 10, "background": "navy"},
            "assets": {"base_dir": "assets"},
            "output": {"path": "out/fig.png"},
            "elements": []
        }))
        .unwrap();

        assert_eq!(scene.canvas.background, Color::rgb(0, 0, 128));
        assert_eq!(scene.assets_dir, Path::new("/configs/assets"));
        assert_eq!(scene.output, Path::new("/configs/out/fig.png"));
    }

    #[test]
    fn test_parent_segments_are_resolved() {
        let scene = scene(json!({
            "canvas": {"width": 10, "height": 10, "background": "#000"},
            "assets": {"base_dir": "../shared/./img"},
            "output": {"path": "../out/fig.png"},
            "elements": []
        }))
        .unwrap();

        assert_eq!(scene.assets_dir, Path::new("/shared/img"));
        assert_eq!(scene.output, Path::new("/out/fig.png"));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("/a/b/../c/./d")), Path::new("/a/c/d"));
        assert_eq!(normalize_path(Path::new("/../../x")), Path::new("/x"));
        assert_eq!(normalize_path(Path::new("a/../../b")), Path::new("../b"));
        assert_eq!(normalize_path(Path::new("../../b")), Path::new("../../b"));
    }

    #[test]
    fn test_null_glow_is_absent() {
        let scene = scene(json!({
            "canvas": {"width": 10, "height": 10, "background": "#000"},
            "elements": [
                {"type": "text", "x": 0, "y": 0, "text": "a", "font": {"glow": null}}
            ]
        }))
        .unwrap();

        match &scene.elements[0] {
            Element::Text(text) => assert_eq!(text.font.as_ref().unwrap().glow, None),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_elements_decode() {
        let scene = scene(json!({
            "canvas": {"width": 10, "height": 10, "background": "#000"},
            "elements": [
                {"type": "image", "id": "logo", "x": 1.9, "y": -2, "path": "logo.png",
                 "scale": 0.5, "anchor_v": "middle", "anchor_h": "center"},
                {"type": "text", "x": 3, "y": 4, "z": 2, "text": 42,
                 "font": {"size": 18, "bold": true, "align": "right",
                          "glow": {"color": "#ff0", "radius": 4}}}
            ]
        }))
        .unwrap();

        match &scene.elements[0] {
            Element::Image(image) => {
                assert_eq!(image.id.as_deref(), Some("logo"));
                assert_eq!((image.x, image.y), (1, -2));
                assert_eq!(image.path, PathBuf::from("logo.png"));
                assert_eq!(image.scale, Some(0.5));
                assert_eq!(image.anchor_v, Some(VerticalAnchor::Middle));
                assert_eq!(image.anchor_h, Some(HorizontalAnchor::Center));
                assert_eq!(image.alpha, None);
            }
            other => panic!("expected image, got {other:?}"),
        }

        match &scene.elements[1] {
            Element::Text(text) => {
                assert_eq!(text.text, "42");
                assert_eq!(text.z, Some(2));
                let font = text.font.as_ref().unwrap();
                assert_eq!(font.size, Some(18));
                assert_eq!(font.bold, Some(true));
                assert_eq!(font.align, Some(TextAlign::Right));
                let glow = font.glow.as_ref().unwrap();
                assert_eq!(glow.radius, Some(4));
                assert_eq!(glow.alpha, None);
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_layers_decode() {
        let scene = scene(json!({
            "canvas": {"width": 10, "height": 10, "background": "#000"},
            "layers": [
                {"id": "bg", "order": 20.7, "elements": [
                    {"type": "text", "x": 0, "y": 0, "text": "a"}
                ]},
                {"elements": []}
            ]
        }))
        .unwrap();

        assert!(scene.uses_layers());
        assert_eq!(scene.layers.len(), 2);
        assert_eq!(scene.layers[0].id.as_deref(), Some("bg"));
        assert_eq!(scene.layers[0].order, Some(20));
        assert_eq!(scene.layers[1].order, None);
        assert_eq!(scene.element_count(), 1);
    }

    #[test]
    fn test_decode_error_names_element() {
        let err = scene(json!({
            "canvas": {"width": 10, "height": 10, "background": "#000"},
            "elements": [
                {"type": "text", "x": 0, "y": 0, "text": "ok"},
                {"type": "text", "x": 0, "y": 0, "text": "ok", "font": {"bold": "yes"}}
            ]
        }))
        .unwrap_err();

        match err {
            FigureError::ConfigInvalid { path, .. } => assert_eq!(path, "elements[1]"),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
