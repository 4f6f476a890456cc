//! Rendering backends for fsmdraw diagrams.
//!
//! Every backend is a [`DrawContext`] that accumulates the operation stream
//! issued by [`render_scene`](crate::render::render_scene) and turns it into
//! an artifact once the pass is over.
//!
//! # Pipeline Position
//!
//! ```text
//! Diagram (nodes, links)
//!     ↓ render_scene
//! DrawContext operation stream
//!     ↓ export (this module)
//! PNG bytes / SVG document / LaTeX document
//! ```
//!
//! # Available Backends
//!
//! - [`raster`] - Pixels through `tiny-skia`, with text from `cosmic-text`
//! - [`svg`] - A standalone SVG 1.1 document
//! - [`tikz`] - A compilable LaTeX document using the TikZ `automata` library
//!
//! # Error Handling
//!
//! Backends build their output in memory, so the only failure is a
//! [`Error::Render`] raised by [`Exporter::finish`] or a backend constructor.
//! Writing the artifact to disk is left to the caller.
//!
//! [`FsmError::Export`]: crate::FsmError::Export

/// Raster (PNG) backend.
pub mod raster;
/// SVG backend.
pub mod svg;
/// TikZ / LaTeX backend.
pub mod tikz;

use fsmdraw_core::draw::DrawContext;

/// A drawing context that produces a finished artifact.
///
/// Backends are created, handed to the scene renderer, and consumed by
/// [`finish`](Self::finish).
pub trait Exporter: DrawContext + Sized {
    /// The artifact produced by this backend.
    type Output;

    /// Completes the document and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the accumulated operations cannot be
    /// converted to the target format.
    fn finish(self) -> Result<Self::Output, Error>;
}

/// Failure to turn a finished operation stream into an artifact.
///
/// Converted into [`FsmError::Export`] at the crate boundary.
///
/// [`FsmError::Export`]: crate::FsmError::Export
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backend rejected its parameters or could not encode its output.
    #[error("Render error: {0}")]
    Render(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FsmError;

    #[test]
    fn test_render_error_converts_to_export() {
        let err: FsmError = Error::Render("surface too large".to_string()).into();
        assert!(matches!(err, FsmError::Export(_)));
        assert_eq!(err.to_string(), "Export error: Render error: surface too large");
    }
}
