//! Error adapter for converting FsmError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.
//!
//! A malformed record keeps its JSON source, so it is rendered with a label
//! at the line and column serde_json reported. Every other error is rendered
//! as a plain message.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};
use serde_json::error::Category;

use fsmdraw::FsmError;

/// Adapter for a malformed diagram record.
pub struct RecordAdapter<'a> {
    err: &'a serde_json::Error,
    /// Source code for displaying snippets
    src: &'a str,
}

impl<'a> RecordAdapter<'a> {
    /// Create a new record adapter.
    pub fn new(err: &'a serde_json::Error, src: &'a str) -> Self {
        Self { err, src }
    }

    /// Byte span of the position serde_json stopped at.
    pub fn span(&self) -> SourceSpan {
        let offset = line_column_offset(self.src, self.err.line(), self.err.column());
        let len = self.src[offset..].chars().next().map_or(0, char::len_utf8);
        SourceSpan::new(offset.into(), len)
    }

    fn label(&self) -> &'static str {
        match self.err.classify() {
            Category::Syntax => "invalid JSON here",
            Category::Data => "unexpected value here",
            Category::Eof => "record ends here",
            Category::Io => "read failed here",
        }
    }
}

impl fmt::Debug for RecordAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordAdapter")
            .field("err", &self.err)
            .finish()
    }
}

impl fmt::Display for RecordAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed diagram record: {}", self.err)
    }
}

impl std::error::Error for RecordAdapter<'_> {}

impl MietteDiagnostic for RecordAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("fsmdraw::record"))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.err.classify() {
            Category::Syntax => "check the JSON syntax at the marked position",
            Category::Data => {
                "every node needs numeric `x`/`y` and an `id`; every link needs a known `type`"
            }
            Category::Eof => "the record is truncated",
            Category::Io => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let label = LabeledSpan::new_primary_with_span(Some(self.label().to_string()), self.span());
        Some(Box::new(std::iter::once(label)))
    }
}

/// Adapter for [`FsmError`] variants without source information.
pub struct ErrorAdapter<'a>(pub &'a FsmError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            FsmError::Io(_) => "fsmdraw::io",
            FsmError::Record { .. } => "fsmdraw::record",
            FsmError::Export(_) => "fsmdraw::export",
            FsmError::Config(_) => "fsmdraw::config",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.0 {
            FsmError::Config(_) => Some(Box::new(
                "check the file passed with --config or the fsmdraw/config.toml lookup",
            )),
            _ => None,
        }
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A malformed record with its source.
    Record(RecordAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Record(r) => fmt::Display::fmt(r, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Record(_) => None,
            Reportable::Error(e) => std::error::Error::source(e),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Record(r) => r.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Record(r) => r.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Record(r) => r.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Record(r) => r.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Byte offset of a 1-based line and column, clamped to `src`.
///
/// serde_json reports column 0 when it stops right after a newline, which
/// maps to the start of that line.
fn line_column_offset(src: &str, line: usize, column: usize) -> usize {
    let line_start: usize = src
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    let mut offset = (line_start + column.saturating_sub(1)).min(src.len());
    while !src.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Convert an [`FsmError`] into a reportable error.
///
/// A record error carrying its source becomes a labelled diagnostic; every
/// other error is reported as is.
pub fn to_reportable(err: &FsmError) -> Reportable<'_> {
    match err {
        FsmError::Record { err, src } if !src.is_empty() => {
            Reportable::Record(RecordAdapter::new(err, src))
        }
        _ => Reportable::Error(ErrorAdapter(err)),
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use fsmdraw::record::DiagramRecord;

    use super::*;

    fn record_error(src: &str) -> FsmError {
        DiagramRecord::from_json(src).expect_err("record should be rejected")
    }

    #[test]
    fn test_syntax_error_is_labelled() {
        let src = "{\n  \"nodes\": [,]\n}";
        let err = record_error(src);

        let reportable = to_reportable(&err);
        let Reportable::Record(adapter) = &reportable else {
            panic!("Expected Record");
        };

        let span = adapter.span();
        assert_eq!(&src[span.offset()..span.offset() + span.len()], ",");

        let labels: Vec<_> = reportable.labels().unwrap().collect();
        assert_eq!(labels.len(), 1);
        assert!(labels[0].primary());
        assert_eq!(labels[0].label(), Some("invalid JSON here"));
        assert!(reportable.source_code().is_some());
    }

    #[test]
    fn test_missing_field_has_help() {
        let err = record_error(r#"{"nodes": [{"x": 1, "y": 2}]}"#);
        let reportable = to_reportable(&err);

        assert!(reportable.to_string().starts_with("malformed diagram record"));
        assert_eq!(reportable.code().unwrap().to_string(), "fsmdraw::record");
        assert!(reportable.help().is_some());
    }

    #[test]
    fn test_non_record_error() {
        let err = FsmError::Io(io::Error::other("disk on fire"));

        match to_reportable(&err) {
            Reportable::Error(e) => {
                assert_eq!(e.to_string(), "I/O error: disk on fire");
                assert_eq!(e.code().unwrap().to_string(), "fsmdraw::io");
                assert!(e.labels().is_none());
            }
            Reportable::Record(_) => panic!("Expected Error"),
        }
    }

    #[test]
    fn test_config_error_is_not_reported_as_io() {
        let err = FsmError::Config("Validation error: bad scale".to_string());

        match to_reportable(&err) {
            Reportable::Error(e) => {
                assert_eq!(e.code().unwrap().to_string(), "fsmdraw::config");
                assert!(e.help().is_some());
            }
            Reportable::Record(_) => panic!("Expected Error"),
        }
    }

    #[test]
    fn test_line_column_offset() {
        let src = "ab\ncd\nef";
        assert_eq!(line_column_offset(src, 1, 1), 0);
        assert_eq!(line_column_offset(src, 2, 2), 4);
        assert_eq!(line_column_offset(src, 3, 0), 6);
        assert_eq!(line_column_offset(src, 9, 9), src.len());
        assert_eq!(line_column_offset("é", 1, 2), 0);
    }
}
