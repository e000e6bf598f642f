#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(unused_must_use)]

//! Tern Diagnostics
//!
//! Thin wrappers over `codespan` and `codespan-reporting` shared by the
//! resolver and its driver:
//! - Re-exports of the span, file and diagnostic types
//! - Builders for coded errors and warnings with a primary label
//! - A reporter that renders to the terminal or to an in-memory buffer
//! - Severity tallies for pass/fail decisions

pub use codespan::{FileId, Files, Span};
pub use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};
pub use codespan_reporting::term;
pub use codespan_reporting::term::termcolor;

use termcolor::{Buffer, ColorChoice, StandardStream, WriteColor};

/// Type aliases to reduce repetition at call sites.
pub type Diag = Diagnostic<FileId>;
pub type Lbl = Label<FileId>;

/// Convenience prelude for downstream crates.
pub mod prelude {
    pub use super::{
        Diag, DiagnosticSummary, FileId, Files, Lbl, Reporter, Severity, Span, coded, help,
        label_primary, label_secondary,
    };
}

/// Create a diagnostic of the given severity with a code, a message and,
/// when a location is known, a primary label carrying `label`.
pub fn coded(
    severity: Severity,
    code: impl Into<String>,
    message: impl Into<String>,
    location: Option<(FileId, Span)>,
    label: impl Into<String>,
) -> Diag {
    let diagnostic = Diagnostic::new(severity)
        .with_code(code)
        .with_message(message);
    match location {
        Some((file_id, span)) => diagnostic.with_labels(vec![label_primary(file_id, span, label)]),
        None => diagnostic,
    }
}

/// Primary label helper with message.
pub fn label_primary(file_id: FileId, span: Span, message: impl Into<String>) -> Lbl {
    Label::primary(file_id, span).with_message(message)
}

/// Secondary label helper with message.
pub fn label_secondary(file_id: FileId, span: Span, message: impl Into<String>) -> Lbl {
    Label::secondary(file_id, span).with_message(message)
}

/// Prefix a note with `help:` unless it already carries one.
pub fn help(msg: impl Into<String>) -> String {
    let m: String = msg.into();
    if m.starts_with("help:") {
        m
    } else {
        format!("help: {}", m)
    }
}

/// Counts of emitted diagnostics by severity.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticSummary {
    pub errors: usize,
    pub warnings: usize,
    pub notes: usize,
}

impl DiagnosticSummary {
    pub fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Bug | Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Note | Severity::Help => self.notes += 1,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

/// Renders diagnostics through `codespan-reporting`.
pub struct Reporter<W: WriteColor> {
    writer: W,
    config: term::Config,
    summary: DiagnosticSummary,
}

impl Reporter<StandardStream> {
    /// Report to stderr with the given color choice (Auto recommended).
    pub fn stderr(color: ColorChoice) -> Self {
        Self::new(StandardStream::stderr(color))
    }
}

impl Reporter<Buffer> {
    /// Report into an uncolored in-memory buffer.
    pub fn buffer() -> Self {
        Self::new(Buffer::no_color())
    }

    /// Rendered text so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(self.writer.as_slice()).into_owned()
    }
}

impl<W: WriteColor> Reporter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            config: term::Config::default(),
            summary: DiagnosticSummary::default(),
        }
    }

    pub fn with_config(mut self, config: term::Config) -> Self {
        self.config = config;
        self
    }

    /// Emit a single diagnostic.
    pub fn emit(
        &mut self,
        files: &Files<String>,
        diag: &Diag,
    ) -> Result<(), codespan_reporting::files::Error> {
        self.summary.record(diag.severity);
        term::emit(&mut self.writer, &self.config, files, diag)
    }

    /// Emit every diagnostic in order.
    pub fn emit_all<'a, I>(
        &mut self,
        files: &Files<String>,
        diagnostics: I,
    ) -> Result<(), codespan_reporting::files::Error>
    where
        I: IntoIterator<Item = &'a Diag>,
    {
        for d in diagnostics {
            self.emit(files, d)?;
        }
        Ok(())
    }

    pub fn summary(&self) -> DiagnosticSummary {
        self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coded_diagnostic_has_label_when_located() {
        let mut files = Files::<String>::new();
        let fid = files.add("lib.tn", "class A {}".to_string());
        let diag = coded(
            Severity::Error,
            "R0001",
            "cannot resolve A",
            Some((fid, Span::new(6, 7))),
            "not found",
        );
        assert_eq!(diag.code.as_deref(), Some("R0001"));
        assert_eq!(diag.labels.len(), 1);

        let unlocated = coded(Severity::Warning, "R0002", "msg", None, "ignored");
        assert!(unlocated.labels.is_empty());
    }

    #[test]
    fn test_buffer_reporter_renders_and_counts() {
        let mut files = Files::<String>::new();
        let fid = files.add("lib.tn", "var x = y;".to_string());
        let mut reporter = Reporter::buffer();
        let error = coded(Severity::Error, "R0100", "cannot resolve y", Some((fid, Span::new(8, 9))), "here");
        let warning = coded(Severity::Warning, "R0200", "unused", Some((fid, Span::new(4, 5))), "here");
        reporter.emit_all(&files, [&error, &warning]).unwrap();

        let summary = reporter.summary();
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.warnings, 1);
        assert!(summary.has_errors());
        assert!(reporter.contents().contains("cannot resolve y"));
    }

    #[test]
    fn test_help_prefix() {
        assert_eq!(help("use new"), "help: use new");
        assert_eq!(help("help: already"), "help: already");
    }
}
