//! Renderer configuration.

use compositor::settings::RenderSettings;
use compositor::FigureCompositor;
use render::codec::PngCodec;
use render::font::{FontCache, FontConfig};
use std::path::PathBuf;
use std::sync::Arc;

/// Renderer configuration.
#[derive(Clone, Debug, Default)]
pub struct RendererConfig {
    /// Style defaults for fields a scene leaves unset.
    pub settings: RenderSettings,
    /// Font files tried for text.
    pub fonts: FontConfig,
}

impl RendererConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip font files entirely and draw text with the built-in face.
    pub fn builtin_fonts_only() -> Self {
        Self {
            fonts: FontConfig::builtin_only(),
            ..Self::default()
        }
    }

    /// Replace the regular-weight font candidates.
    pub fn with_font_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.fonts.regular = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the bold font candidates.
    pub fn with_bold_font_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.fonts.bold = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Set the style defaults.
    pub fn with_settings(mut self, settings: RenderSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build a compositor that reads fonts from disk and writes PNG.
    pub fn build_compositor(&self) -> FigureCompositor {
        FigureCompositor::new(
            self.settings.clone(),
            Arc::new(FontCache::new(self.fonts.clone())),
            Arc::new(PngCodec),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uses_system_font_lists() {
        let config = RendererConfig::new();
        assert_eq!(config.fonts.regular.len(), 3);
        assert_eq!(config.settings.text.size, 32);
    }

    #[test]
    fn test_builders() {
        let config = RendererConfig::builtin_fonts_only()
            .with_font_paths(["a.ttf", "b.ttf"])
            .with_bold_font_paths(vec![PathBuf::from("c.ttf")]);

        assert_eq!(config.fonts.regular, vec![PathBuf::from("a.ttf"), PathBuf::from("b.ttf")]);
        assert_eq!(config.fonts.bold, vec![PathBuf::from("c.ttf")]);
    }

    #[test]
    fn test_builtin_only_has_no_candidates() {
        let config = RendererConfig::builtin_fonts_only();
        assert!(config.fonts.regular.is_empty());
        assert!(config.fonts.bold.is_empty());
    }
}
