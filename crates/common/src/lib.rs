//! Common types shared by the figure compositor crates.

pub mod color;
pub mod geometry;
pub mod error;

pub use color::Color;
pub use geometry::{HorizontalAnchor, PixelRect, Point, Rect, TextAlign, Transform, VerticalAnchor};
pub use error::{ErrorKind, FigureError, FigureResult};
