//! Structural validation of a raw scene tree.
//!
//! Runs before anything is drawn. The first problem found is returned,
//! named by its location in the tree (`canvas.width`, `elements[2].x`,
//! `layers[0].elements[1].font.size`).

use common::color::Color;
use common::error::{FigureError, FigureResult};
use render::font::MAX_FONT_SIZE;
use render::glow::MAX_GLOW_RADIUS;
use serde_json::{Map, Value};

const ELEMENT_TYPES: &[&str] = &["image", "text"];
const VERTICAL_ANCHORS: &[&str] = &["top", "middle", "bottom"];
const HORIZONTAL_ANCHORS: &[&str] = &["left", "center", "right"];
const ALIGNMENTS: &[&str] = &["left", "center", "right"];

/// Check the whole tree.
pub fn validate_scene(root: &Value) -> FigureResult<()> {
    let root = root
        .as_object()
        .ok_or_else(|| FigureError::invalid("config", "must be a JSON object"))?;

    validate_canvas(root)?;

    let elements = root.get("elements").and_then(Value::as_array);
    let layers = root.get("layers").and_then(Value::as_array);
    if elements.is_none() && layers.is_none() {
        return Err(FigureError::invalid(
            "elements",
            "missing required key: elements or layers (list)",
        ));
    }

    if let Some(elements) = elements {
        for (index, element) in elements.iter().enumerate() {
            validate_element(element, &format!("elements[{index}]"))?;
        }
    }

    if let Some(layers) = layers {
        for (index, layer) in layers.iter().enumerate() {
            validate_layer(layer, &format!("layers[{index}]"))?;
        }
    }

    Ok(())
}

fn validate_canvas(root: &Map<String, Value>) -> FigureResult<()> {
    let canvas = root
        .get("canvas")
        .ok_or_else(|| FigureError::invalid("canvas", "missing required key"))?
        .as_object()
        .ok_or_else(|| FigureError::invalid("canvas", "must be an object"))?;

    for key in ["width", "height", "background"] {
        if !canvas.contains_key(key) {
            return Err(FigureError::invalid(
                format!("canvas.{key}"),
                "missing required key",
            ));
        }
    }

    for key in ["width", "height"] {
        let valid = canvas[key]
            .as_u64()
            .is_some_and(|v| v > 0 && v <= u32::MAX as u64);
        if !valid {
            return Err(FigureError::invalid(
                format!("canvas.{key}"),
                "must be a positive integer",
            ));
        }
    }

    let background = &canvas["background"];
    if background.as_str().and_then(Color::parse).is_none() {
        return Err(FigureError::invalid(
            "canvas.background",
            format!("unrecognized color {background}"),
        ));
    }

    Ok(())
}

fn validate_layer(layer: &Value, path: &str) -> FigureResult<()> {
    let layer = layer
        .as_object()
        .ok_or_else(|| FigureError::invalid(path, "must be an object"))?;

    optional_number(layer, path, "order")?;

    let elements = layer
        .get("elements")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            FigureError::invalid(format!("{path}.elements"), "missing elements (list)")
        })?;

    for (index, element) in elements.iter().enumerate() {
        validate_element(element, &format!("{path}.elements[{index}]"))?;
    }
    Ok(())
}

/// Check one element at `path`.
pub fn validate_element(element: &Value, path: &str) -> FigureResult<()> {
    let element = element
        .as_object()
        .ok_or_else(|| FigureError::invalid(path, "must be an object"))?;

    let kind = element
        .get("type")
        .ok_or_else(|| FigureError::invalid(format!("{path}.type"), "missing type"))?;

    for key in ["x", "y"] {
        match element.get(key) {
            None => {
                return Err(FigureError::invalid(format!("{path}.{key}"), "missing x/y"));
            }
            Some(value) if !value.is_number() => {
                return Err(FigureError::invalid(format!("{path}.{key}"), "must be a number"));
            }
            Some(_) => {}
        }
    }
    optional_number(element, path, "z")?;

    let kind = kind
        .as_str()
        .ok_or_else(|| FigureError::invalid(format!("{path}.type"), "must be a string"))?;
    if !ELEMENT_TYPES.contains(&kind) {
        return Err(FigureError::unknown_type(path, kind));
    }

    if kind == "image" {
        validate_image(element, path)
    } else {
        validate_text(element, path)
    }
}

fn validate_image(element: &Map<String, Value>, path: &str) -> FigureResult<()> {
    match element.get("path") {
        None => return Err(FigureError::invalid(format!("{path}.path"), "image missing path")),
        Some(value) if !value.is_string() => {
            return Err(FigureError::invalid(format!("{path}.path"), "must be a string"));
        }
        Some(_) => {}
    }

    if let Some(scale) = element.get("scale") {
        if !scale.as_f64().is_some_and(|s| s > 0.0) {
            return Err(FigureError::invalid(
                format!("{path}.scale"),
                "image scale must be > 0",
            ));
        }
    }

    optional_number(element, path, "alpha")?;
    optional_number(element, path, "rotation")?;
    keyword(element, path, "anchor_v", VERTICAL_ANCHORS)?;
    keyword(element, path, "anchor_h", HORIZONTAL_ANCHORS)?;
    Ok(())
}

fn validate_text(element: &Map<String, Value>, path: &str) -> FigureResult<()> {
    match element.get("text") {
        None => return Err(FigureError::invalid(format!("{path}.text"), "text missing text")),
        Some(Value::String(_) | Value::Number(_) | Value::Bool(_)) => {}
        Some(_) => {
            return Err(FigureError::invalid(format!("{path}.text"), "must be a string"));
        }
    }

    let Some(font) = element.get("font") else {
        return Ok(());
    };
    let path = format!("{path}.font");
    let font = font
        .as_object()
        .ok_or_else(|| FigureError::invalid(&path, "must be an object"))?;

    if let Some(size) = font.get("size") {
        if !size.as_f64().is_some_and(|s| (1.0..=MAX_FONT_SIZE as f64).contains(&s)) {
            return Err(FigureError::invalid(
                format!("{path}.size"),
                format!("must be an integer from 1 to {MAX_FONT_SIZE}"),
            ));
        }
    }
    optional_string(font, &path, "color")?;
    optional_number(font, &path, "alpha")?;
    optional_number(font, &path, "rotation")?;
    keyword(font, &path, "align", ALIGNMENTS)?;
    keyword(font, &path, "anchor_v", VERTICAL_ANCHORS)?;
    keyword(font, &path, "anchor_h", HORIZONTAL_ANCHORS)?;

    let glow = match font.get("glow") {
        None | Some(Value::Null) => return Ok(()),
        Some(glow) => glow,
    };
    let path = format!("{path}.glow");
    let glow = glow
        .as_object()
        .ok_or_else(|| FigureError::invalid(&path, "must be an object"))?;

    optional_string(glow, &path, "color")?;
    optional_number(glow, &path, "alpha")?;
    if let Some(radius) = glow.get("radius") {
        if !radius.as_f64().is_some_and(|r| (0.0..=MAX_GLOW_RADIUS as f64).contains(&r)) {
            return Err(FigureError::invalid(
                format!("{path}.radius"),
                format!("must be an integer from 0 to {MAX_GLOW_RADIUS}"),
            ));
        }
    }
    Ok(())
}

fn optional_number(object: &Map<String, Value>, path: &str, key: &str) -> FigureResult<()> {
    match object.get(key) {
        Some(value) if !value.is_number() => {
            Err(FigureError::invalid(format!("{path}.{key}"), "must be a number"))
        }
        _ => Ok(()),
    }
}

fn optional_string(object: &Map<String, Value>, path: &str, key: &str) -> FigureResult<()> {
    match object.get(key) {
        Some(value) if !value.is_string() => {
            Err(FigureError::invalid(format!("{path}.{key}"), "must be a string"))
        }
        _ => Ok(()),
    }
}

fn keyword(
    object: &Map<String, Value>,
    path: &str,
    key: &str,
    allowed: &[&str],
) -> FigureResult<()> {
    let Some(value) = object.get(key) else {
        return Ok(());
    };
    match value.as_str() {
        Some(word) if allowed.contains(&word) => Ok(()),
        _ => Err(FigureError::invalid(
            format!("{path}.{key}"),
            format!("expected one of {}, found {value}", allowed.join(", ")),
        )),
    }
}
