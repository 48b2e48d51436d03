//! Paint order of scene elements.

use crate::scene::{Element, Scene};

/// Spacing between implicit layer orders.
pub const LAYER_ORDER_STEP: i64 = 10;

/// Elements in the order they are composited; later entries land on top.
///
/// With a non-empty layer list, each element sorts by its layer's `order`
/// (default: layer index times [`LAYER_ORDER_STEP`]) and then its `z`
/// (default: index within the layer). Otherwise the flat list sorts by `z`
/// (default 0). Sorting is stable, so ties keep their written order.
pub fn paint_order(scene: &Scene) -> Vec<&Element> {
    if scene.uses_layers() {
        let mut keyed: Vec<((i64, i64), &Element)> = scene
            .layers
            .iter()
            .enumerate()
            .flat_map(|(layer_index, layer)| {
                let layer_order = layer
                    .order
                    .unwrap_or(layer_index as i64 * LAYER_ORDER_STEP);
                layer
                    .elements
                    .iter()
                    .enumerate()
                    .map(move |(index, element)| {
                        ((layer_order, element.z().unwrap_or(index as i64)), element)
                    })
            })
            .collect();
        keyed.sort_by_key(|(key, _)| *key);
        keyed.into_iter().map(|(_, element)| element).collect()
    } else {
        let mut ordered: Vec<&Element> = scene.elements.iter().collect();
        ordered.sort_by_key(|element| element.z().unwrap_or(0));
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::path::Path;

    fn scene(body: Value) -> Scene {
        let mut root = json!({"canvas": {"width": 10, "height": 10, "background": "#fff"}});
        if let (Some(root), Some(body)) = (root.as_object_mut(), body.as_object()) {
            root.extend(body.clone());
        }
        Scene::from_value(&root, Path::new(".")).unwrap()
    }

    fn ids(order: &[&Element]) -> Vec<String> {
        order
            .iter()
            .map(|element| element.id().unwrap_or("?").to_string())
            .collect()
    }

    fn text(id: &str, z: Option<i64>) -> Value {
        let mut element = json!({"type": "text", "id": id, "x": 0, "y": 0, "text": id});
        if let Some(z) = z {
            element["z"] = json!(z);
        }
        element
    }

    #[test]
    fn test_flat_order_is_stable_by_z() {
        let scene = scene(json!({
            "elements": [text("a", Some(5)), text("b", Some(1)), text("c", Some(5))]
        }));
        assert_eq!(ids(&paint_order(&scene)), ["b", "a", "c"]);
    }

    #[test]
    fn test_flat_default_z_is_zero() {
        let scene = scene(json!({
            "elements": [text("a", None), text("b", Some(-1)), text("c", None)]
        }));
        assert_eq!(ids(&paint_order(&scene)), ["b", "a", "c"]);
    }

    #[test]
    fn test_layer_order_beats_element_z() {
        let scene = scene(json!({
            "layers": [
                {"order": 20, "elements": [text("top", Some(0))]},
                {"order": 10, "elements": [text("bottom", Some(99))]}
            ]
        }));
        assert_eq!(ids(&paint_order(&scene)), ["bottom", "top"]);
    }

    #[test]
    fn test_layer_defaults_follow_index() {
        let scene = scene(json!({
            "layers": [
                {"elements": [text("a", None), text("b", None)]},
                {"elements": [text("c", None)]},
                {"order": 5, "elements": [text("d", Some(1)), text("e", Some(0))]}
            ]
        }));
        // Layer orders 0, 10, 5.
        assert_eq!(ids(&paint_order(&scene)), ["a", "b", "e", "d", "c"]);
    }

    #[test]
    fn test_empty_layers_fall_back_to_elements() {
        let scene = scene(json!({
            "layers": [],
            "elements": [text("x", Some(2)), text("y", Some(1))]
        }));
        assert_eq!(ids(&paint_order(&scene)), ["y", "x"]);
    }
}
