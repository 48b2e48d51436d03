//! Raster primitives for figure compositing.
//!
//! This crate handles:
//! - RGBA pixmap operations (compositing, opacity, scaling, rotation)
//! - Font resolution and glyph rasterization
//! - Multi-line text layout
//! - Glow halos
//! - Bitmap decoding and encoding

pub mod codec;
pub mod font;
pub mod glow;
pub mod pixmap;
pub mod text;

pub use codec::{BitmapCodec, PngCodec};
pub use font::{FontCache, FontConfig, FontHandle, FontProvider, FontStrategy};
pub use glow::Glow;
pub use text::{TextBlock, TextLayout};
