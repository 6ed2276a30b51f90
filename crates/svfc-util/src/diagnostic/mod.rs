//! Diagnostic sink shared by every pipeline stage.
//!
//! Stages report problems through a [`Handler`]; nothing in the front end
//! prints. The driver drains [`Handler::diagnostics`] after compilation and
//! renders them with the source map.
//!
//! Emission order matches discovery order. The handler drops exact
//! duplicates — a second diagnostic with the same code at the same location
//! is taken to be the same root cause reported twice.

mod builder;
mod codes;

pub use builder::DiagnosticBuilder;
pub use codes::DiagnosticCode;

use crate::span::Span;
use rustc_hash::FxHashSet;
use std::cell::RefCell;
use std::fmt;

/// Diagnostic severity level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// A problem that makes the unit ill-formed.
    Error,
    /// Suspicious but legal input.
    Warning,
    /// Additional information attached to another diagnostic.
    Note,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
            Level::Note => write!(f, "note"),
        }
    }
}

/// A reported diagnostic.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub span: Span,
    pub code: Option<DiagnosticCode>,
    pub notes: Vec<String>,
    pub helps: Vec<String>,
}

impl Diagnostic {
    pub fn new(level: Level, message: impl Into<String>, span: Span) -> Self {
        Self {
            level,
            message: message.into(),
            span,
            code: None,
            notes: Vec::new(),
            helps: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self::new(Level::Error, message, span)
    }

    pub fn warning(message: impl Into<String>, span: Span) -> Self {
        Self::new(Level::Warning, message, span)
    }

    pub fn with_code(mut self, code: DiagnosticCode) -> Self {
        self.code = Some(code);
        self
    }
}

/// Collects diagnostics for one compilation unit.
///
/// Single-threaded by design (`RefCell` inside); each unit owns its own
/// handler.
///
/// # Examples
///
/// ```
/// use svfc_util::{DiagnosticCode, Handler, Span};
///
/// let handler = Handler::new();
/// handler.report(DiagnosticCode::E_LEX_UNKNOWN_CHAR, Span::DUMMY, "unknown character");
/// assert_eq!(handler.error_count(), 1);
/// ```
#[derive(Default)]
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
    /// (code number, file, offset) triples already reported.
    seen: RefCell<FxHashSet<(u32, u32, u32)>>,
}

impl Handler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports a coded diagnostic at a location.
    ///
    /// This is the primary entry point used by the lexer, preprocessor,
    /// parser, and binder. The level is derived from the code prefix.
    pub fn report(&self, code: DiagnosticCode, span: Span, message: impl Into<String>) {
        let level = if code.prefix() == "W" {
            Level::Warning
        } else {
            Level::Error
        };
        self.emit_diagnostic(Diagnostic::new(level, message, span).with_code(code));
    }

    /// Emits a pre-built diagnostic, dropping exact duplicates.
    pub fn emit_diagnostic(&self, diagnostic: Diagnostic) {
        if let Some(code) = diagnostic.code {
            let key = (code.number(), diagnostic.span.file.0, diagnostic.span.start);
            if !self.seen.borrow_mut().insert(key) {
                return;
            }
        }
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    /// Starts a builder for an error at `span`.
    pub fn build_error(&self, span: Span, message: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::error(message).span(span)
    }

    /// Starts a builder for a warning at `span`.
    pub fn build_warning(&self, span: Span, message: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::warning(message).span(span)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|d| d.level == Level::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Warning)
            .count()
    }

    /// All diagnostics in discovery order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    pub fn clear(&self) {
        self.diagnostics.borrow_mut().clear();
        self.seen.borrow_mut().clear();
    }
}
