//! Configuration types for fsmdraw rendering.
//!
//! This module provides configuration structures that control canvas
//! dimensions, raster resolution and label styling. All types implement
//! [`serde::Deserialize`] for flexible loading from external sources, and
//! every section falls back to its defaults when omitted.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining all sections.
//! - [`CanvasConfig`] - Logical canvas size shared by every backend.
//! - [`RasterConfig`] - Device-pixel ratio of PNG output.
//! - [`StyleConfig`] - Palette override and label font.
//!
//! # Example
//!
//! ```
//! # use fsmdraw::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.canvas().width(), 800.0);
//! assert_eq!(config.raster().scale(), 2.0);
//! assert!(config.style().palette().is_none());
//! ```

use serde::Deserialize;

use fsmdraw_core::{
    draw::text::TextStyle,
    geometry::Size,
    style::Style,
};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AppConfig {
    /// Canvas configuration section.
    #[serde(default)]
    canvas: CanvasConfig,

    /// Raster configuration section.
    #[serde(default)]
    raster: RasterConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(canvas: CanvasConfig, raster: RasterConfig, style: StyleConfig) -> Self {
        Self {
            canvas,
            raster,
            style,
        }
    }

    /// Returns the canvas configuration.
    pub fn canvas(&self) -> &CanvasConfig {
        &self.canvas
    }

    /// Returns the raster configuration.
    pub fn raster(&self) -> &RasterConfig {
        &self.raster
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// Logical canvas dimensions in pixels.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    width: f64,
    height: f64,
}

impl CanvasConfig {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

/// Raster output settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Device pixels per logical pixel
    scale: f64,
}

impl RasterConfig {
    pub fn new(scale: f64) -> Self {
        Self { scale }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self::new(2.0)
    }
}

/// Visual styling configuration.
///
/// A configured `palette` takes precedence over the palette stored in the
/// diagram record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    palette: Option<Style>,
    font_family: String,
    font_size: f64,
}

impl StyleConfig {
    pub fn new(palette: Option<Style>, font_family: impl Into<String>, font_size: f64) -> Self {
        Self {
            palette,
            font_family: font_family.into(),
            font_size,
        }
    }

    /// Returns the palette override, if any.
    pub fn palette(&self) -> Option<Style> {
        self.palette
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    /// The label font described by this section.
    pub fn text_style(&self) -> TextStyle {
        TextStyle::new(self.font_family.clone(), self.font_size)
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        let text = TextStyle::default();
        Self::new(None, text.font_family(), text.font_size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"style": {"palette": "style1"}, "raster": {}}"#).unwrap();
        assert_eq!(config.style().palette(), Some(Style::Style1));
        assert_eq!(config.style().font_family(), "Times New Roman");
        assert_eq!(config.style().font_size(), 20.0);
        assert_eq!(config.raster().scale(), 2.0);
        assert_eq!(config.canvas(), &CanvasConfig::default());
    }

    #[test]
    fn test_text_style() {
        let style = StyleConfig::new(None, "DejaVu Sans", 14.0);
        assert_eq!(style.text_style(), TextStyle::new("DejaVu Sans", 14.0));
    }

    #[test]
    fn test_unknown_palette_is_rejected() {
        assert!(serde_json::from_str::<AppConfig>(r#"{"style": {"palette": "neon"}}"#).is_err());
    }
}
