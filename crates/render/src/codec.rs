//! Bitmap decoding and encoding.

use common::error::{FigureError, FigureResult};
use image::{ImageError, ImageFormat, RgbaImage};
use std::path::Path;

/// Reads source bitmaps and persists the finished canvas.
pub trait BitmapCodec: Send + Sync {
    /// Decode the file at `path` into straight-alpha RGBA.
    fn decode(&self, path: &Path) -> FigureResult<RgbaImage>;

    /// Write `image` losslessly to `path`. The parent directory must exist.
    fn encode(&self, image: &RgbaImage, path: &Path) -> FigureResult<()>;
}

/// Codec backed by the `image` crate. Decodes any format it recognizes,
/// always encodes PNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct PngCodec;

impl BitmapCodec for PngCodec {
    fn decode(&self, path: &Path) -> FigureResult<RgbaImage> {
        let image = image::open(path).map_err(|err| match err {
            ImageError::IoError(source) => FigureError::io(path, source),
            other => FigureError::AssetDecode {
                path: path.to_path_buf(),
                message: other.to_string(),
            },
        })?;
        Ok(image.to_rgba8())
    }

    fn encode(&self, image: &RgbaImage, path: &Path) -> FigureResult<()> {
        image
            .save_with_format(path, ImageFormat::Png)
            .map_err(|err| match err {
                ImageError::IoError(source) => FigureError::io(path, source),
                other => FigureError::Encode {
                    path: path.to_path_buf(),
                    message: other.to_string(),
                },
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::error::ErrorKind;
    use image::Rgba;

    #[test]
    fn test_png_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let image = RgbaImage::from_fn(7, 5, |x, y| {
            Rgba([x as u8 * 30, y as u8 * 40, 9, 128 + x as u8])
        });

        PngCodec.encode(&image, &path).unwrap();
        let decoded = PngCodec.decode(&path).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_decode_missing_file_is_io() {
        let dir = tempfile::tempdir().unwrap();
        let err = PngCodec.decode(&dir.path().join("nope.png")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
        assert!(matches!(err, FigureError::Io { .. }));
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.png");
        std::fs::write(&path, b"\x89PNG but not really").unwrap();

        let err = PngCodec.decode(&path).unwrap_err();
        assert!(matches!(err, FigureError::AssetDecode { .. }));
    }

    #[test]
    fn test_encode_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        let err = PngCodec.encode(&RgbaImage::new(1, 1), &path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
    }
}
