//! Scene compositing.
//!
//! The compositor turns a validated scene into a single RGBA canvas:
//! - validation of the raw scene tree
//! - paint ordering across layers and elements
//! - image placement (scale, opacity, rotation, anchoring)
//! - text placement (direct or through an isolated bitmap with glow)

pub mod compositor;
pub mod image_element;
pub mod order;
pub mod scene;
pub mod settings;
pub mod text_element;
pub mod validate;

pub use self::compositor::{CompositorStats, FigureCompositor};
pub use order::paint_order;
pub use scene::{Element, Scene};
pub use settings::{ImageDefaults, RenderSettings, TextDefaults};
