//! Figure rendering from JSON scene descriptions.
//!
//! This crate ties the pieces together:
//! - loading and validating a scene file
//! - resolving asset and output paths against the scene file's directory
//! - compositing and writing the result

pub mod config;

pub use config::RendererConfig;

use common::error::{FigureError, FigureResult};
use compositor::{FigureCompositor, Scene};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Renders the scene described by one config file.
pub struct FigureRenderer {
    config_path: PathBuf,
    compositor: FigureCompositor,
}

impl FigureRenderer {
    /// Renderer with the default configuration.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self::with_config(config_path, &RendererConfig::default())
    }

    pub fn with_config(config_path: impl Into<PathBuf>, config: &RendererConfig) -> Self {
        Self {
            config_path: config_path.into(),
            compositor: config.build_compositor(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Read, parse and validate the config file.
    pub fn load_scene(&self) -> FigureResult<Scene> {
        let path = &self.config_path;
        if !path.is_file() {
            return Err(FigureError::ConfigNotFound(path.clone()));
        }

        let text = std::fs::read_to_string(path).map_err(|err| FigureError::io(path, err))?;
        let root: serde_json::Value = serde_json::from_str(&text)
            .map_err(|err| FigureError::invalid(path.display().to_string(), err.to_string()))?;

        let config_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let config_dir =
            std::fs::canonicalize(config_dir).map_err(|err| FigureError::io(config_dir, err))?;

        debug!(config = %path.display(), dir = %config_dir.display(), "scene loaded");
        Scene::from_value(&root, &config_dir)
    }

    /// Render the scene and write it out. `output` replaces the scene's
    /// own output path and is used exactly as given.
    pub fn render(&self, output: Option<&Path>) -> FigureResult<PathBuf> {
        let scene = self.load_scene()?;
        let written = self.compositor.render(&scene, output)?;
        info!(config = %self.config_path.display(), "render complete");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::error::ErrorKind;

    #[test]
    fn test_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = FigureRenderer::new(dir.path().join("nope.json"));
        let err = renderer.render(None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigNotFound);
    }

    #[test]
    fn test_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = FigureRenderer::new(&path).load_scene().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_paths_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        let scene = serde_json::json!({
            "canvas": {"width": 2, "height": 2, "background": "#fff"},
            "assets": {"base_dir": "img"},
            "elements": []
        });
        std::fs::write(&path, scene.to_string()).unwrap();

        let scene = FigureRenderer::new(&path).load_scene().unwrap();
        let root = std::fs::canonicalize(dir.path()).unwrap();
        assert_eq!(scene.assets_dir, root.join("img"));
        assert_eq!(scene.output, root.join("build/figure.png"));
    }
}
