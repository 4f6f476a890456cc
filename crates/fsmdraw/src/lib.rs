//! fsmdraw - Interactive finite-state-machine diagrams.
//!
//! The entity model, scene renderer, rendering backends and serializer for
//! finite-state-machine diagrams. A [`Diagram`](model::Diagram) is built and
//! edited through explicit operations, persisted as a
//! [`DiagramRecord`](record::DiagramRecord) and rendered to PNG, SVG or a
//! TikZ/LaTeX document by replaying one scene against interchangeable
//! backends.

pub mod config;
pub mod export;
pub mod model;
pub mod record;
pub mod render;
pub mod store;

mod error;

pub use fsmdraw_core::{color, draw, geometry, identifier, style};

pub use error::FsmError;

use log::{debug, info, trace};

use config::AppConfig;
use export::{Exporter, raster::RasterContext, svg::SvgContext, tikz::TikzContext};
use model::Diagram;
use record::DiagramRecord;
use render::{RenderOptions, render_scene};

/// Facade for loading and rendering diagrams.
///
/// This provides an API for processing diagram records through the parse
/// and rendering stages.
///
/// # Examples
///
/// ```rust
/// use fsmdraw::{DiagramRenderer, config::AppConfig};
///
/// let source = r#"{"nodes": [{"x": 100, "y": 100, "text": "q0", "id": "0"}], "links": []}"#;
///
/// let renderer = DiagramRenderer::new(AppConfig::default());
///
/// // Parse the record into a diagram
/// let diagram = renderer.parse(source)
///     .expect("Failed to parse");
///
/// // Render it to SVG
/// let svg = renderer.render_svg(&diagram)
///     .expect("Failed to render");
/// assert!(svg.contains("<circle"));
/// ```
#[derive(Debug, Default)]
pub struct DiagramRenderer {
    config: AppConfig,
}

impl DiagramRenderer {
    /// Create a new renderer with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse a JSON diagram record into a diagram.
    ///
    /// Links whose node indices are out of range are dropped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`FsmError::Record`] if the JSON is malformed or misses
    /// required fields; nothing is partially applied in that case.
    pub fn parse(&self, source: &str) -> Result<Diagram, FsmError> {
        info!("Parsing diagram record");

        let record = DiagramRecord::from_json(source)?;
        let mut diagram = Diagram::new();
        diagram.restore(&record);

        debug!("Diagram record parsed successfully");
        trace!(diagram:?; "Parsed diagram");

        Ok(diagram)
    }

    /// Render a diagram to a standalone SVG document.
    ///
    /// # Errors
    ///
    /// Returns [`FsmError::Export`] if the document cannot be produced.
    pub fn render_svg(&self, diagram: &Diagram) -> Result<String, FsmError> {
        info!(nodes = diagram.nodes().len(); "Rendering SVG");
        let mut ctx = SvgContext::new(
            self.config.canvas().size(),
            self.config.style().text_style(),
        );
        render_scene(&mut ctx, diagram, &self.export_options());
        let svg = ctx.finish()?;
        info!(bytes = svg.len(); "SVG rendered successfully");
        Ok(svg)
    }

    /// Render a diagram to a compilable LaTeX document using TikZ.
    ///
    /// # Errors
    ///
    /// Returns [`FsmError::Export`] if the document cannot be produced.
    pub fn render_tex(&self, diagram: &Diagram) -> Result<String, FsmError> {
        info!(nodes = diagram.nodes().len(); "Rendering TikZ");
        let options = self.export_options();
        let mut ctx = TikzContext::new(options.style_for(diagram), self.config.style().text_style());
        render_scene(&mut ctx, diagram, &options);
        let tex = ctx.finish()?;
        info!(bytes = tex.len(); "TikZ rendered successfully");
        Ok(tex)
    }

    /// Render a diagram to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FsmError::Export`] if the configured surface cannot be
    /// allocated or the image cannot be encoded.
    pub fn render_png(&self, diagram: &Diagram) -> Result<Vec<u8>, FsmError> {
        info!(nodes = diagram.nodes().len(), scale = self.config.raster().scale(); "Rendering PNG");
        let mut ctx = RasterContext::new(
            self.config.canvas().size(),
            self.config.raster().scale(),
            self.config.style().text_style(),
        )?;
        render_scene(&mut ctx, diagram, &self.export_options());
        let png = ctx.finish()?;
        info!(bytes = png.len(); "PNG rendered successfully");
        Ok(png)
    }

    /// Exports never show the selection or the caret.
    fn export_options(&self) -> RenderOptions {
        RenderOptions::new()
            .with_style(self.config.style().palette())
            .with_selection_visible(false)
    }
}
