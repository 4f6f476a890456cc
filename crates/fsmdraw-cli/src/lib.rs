//! CLI logic for the fsmdraw diagram tool.
//!
//! This module contains the core CLI logic: it loads a diagram record,
//! renders it with the configured backend and writes the result.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Format};
pub use config::{ConfigError, load_config};

use std::fs;

use log::info;

use fsmdraw::{DiagramRenderer, FsmError};

/// Run the fsmdraw CLI application
///
/// This function reads the input record, renders it in the requested
/// [`Format`] and writes the document to the output file.
///
/// # Errors
///
/// Returns `FsmError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed records
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), FsmError> {
    let format = args.output_format();
    info!(
        input_path = args.input,
        output_path = args.output,
        format:% = format;
        "Processing diagram"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;

    let renderer = DiagramRenderer::new(app_config);
    let diagram = renderer.parse(&source)?;
    let document = match format {
        Format::Svg => renderer.render_svg(&diagram)?.into_bytes(),
        Format::Tex => renderer.render_tex(&diagram)?.into_bytes(),
        Format::Png => renderer.render_png(&diagram)?,
    };

    fs::write(&args.output, document)?;

    info!(output_file = args.output, format:% = format; "Diagram exported successfully");

    Ok(())
}
