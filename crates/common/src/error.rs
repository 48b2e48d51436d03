//! Common error types.

use std::path::PathBuf;
use thiserror::Error;

/// Error type shared by every stage of a render.
#[derive(Error, Debug)]
pub enum FigureError {
    #[error("Config not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Invalid config at {path}: {message}")]
    ConfigInvalid { path: String, message: String },

    #[error("Image not found (id={id}): {}", .path.display())]
    AssetNotFound { id: String, path: PathBuf },

    #[error("Failed to decode image {}: {message}", .path.display())]
    AssetDecode { path: PathBuf, message: String },

    #[error("Unknown element type at {path}: {kind}")]
    UnknownElementType { path: String, kind: String },

    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode {}: {message}", .path.display())]
    Encode { path: PathBuf, message: String },
}

/// Coarse classification of a [`FigureError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    ConfigNotFound,
    ConfigInvalid,
    AssetNotFound,
    UnknownElementType,
    IoFailure,
}

pub type FigureResult<T> = Result<T, FigureError>;

impl FigureError {
    pub fn invalid(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn asset_not_found(id: Option<&str>, path: impl Into<PathBuf>) -> Self {
        Self::AssetNotFound {
            id: id.unwrap_or("?").to_string(),
            path: path.into(),
        }
    }

    pub fn unknown_type(path: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::UnknownElementType {
            path: path.into(),
            kind: kind.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigNotFound(_) => ErrorKind::ConfigNotFound,
            Self::ConfigInvalid { .. } => ErrorKind::ConfigInvalid,
            Self::AssetNotFound { .. } => ErrorKind::AssetNotFound,
            Self::UnknownElementType { .. } => ErrorKind::UnknownElementType,
            Self::AssetDecode { .. } | Self::Io { .. } | Self::Encode { .. } => {
                ErrorKind::IoFailure
            }
        }
    }
}
