//! Command-line argument definitions for the fsmdraw CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, the output format,
//! configuration file selection, and logging verbosity.

use std::{fmt, path::Path};

use clap::{Parser, ValueEnum};

/// Output document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Standalone SVG document
    Svg,
    /// LaTeX document drawing the machine with TikZ
    Tex,
    /// PNG image
    Png,
}

impl Format {
    /// Guesses the format from a file extension, case-insensitively.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let extension = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "svg" => Some(Self::Svg),
            "tex" => Some(Self::Tex),
            "png" => Some(Self::Png),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Svg => "svg",
            Self::Tex => "tex",
            Self::Png => "png",
        };
        f.write_str(name)
    }
}

/// Command-line arguments for the fsmdraw diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input diagram record
    #[arg(help = "Path to the input JSON record")]
    pub input: String,

    /// Path to the output file
    #[arg(short, long, default_value = "out.svg")]
    pub output: String,

    /// Output format; inferred from the output extension when omitted
    #[arg(short, long, value_enum)]
    pub format: Option<Format>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// The requested format, falling back to the output extension and then
    /// to SVG.
    pub fn output_format(&self) -> Format {
        self.format
            .or_else(|| Format::from_path(&self.output))
            .unwrap_or(Format::Svg)
    }
}
