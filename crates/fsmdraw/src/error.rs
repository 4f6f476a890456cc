//! Error types for fsmdraw operations.
//!
//! This module provides the main error type [`FsmError`] which wraps the
//! failures that can occur while loading, persisting and rendering diagrams.

use std::io;

use thiserror::Error;

/// The main error type for fsmdraw operations.
///
/// # Diagnostic Variants
///
/// The `Record` variant keeps the JSON source alongside the parse error, so
/// callers can point at the offending line and column.
#[derive(Debug, Error)]
pub enum FsmError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed diagram record: {err}")]
    Record {
        err: serde_json::Error,
        src: String,
    },

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error>),

    /// A configuration file that cannot be parsed or holds unusable values.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<crate::export::Error> for FsmError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}

impl FsmError {
    /// Create a new `Record` error with the associated source text.
    pub fn new_record_error(err: serde_json::Error, src: impl Into<String>) -> Self {
        Self::Record {
            err,
            src: src.into(),
        }
    }
}
