//! Fluent builder for diagnostics.

use super::{Diagnostic, DiagnosticCode, Handler, Level};
use crate::span::Span;

/// Builder for assembling a [`Diagnostic`] before emission.
///
/// # Examples
///
/// ```
/// use svfc_util::{DiagnosticBuilder, DiagnosticCode, Handler, Span};
///
/// let handler = Handler::new();
/// DiagnosticBuilder::error("expected ';'")
///     .code(DiagnosticCode::E_PAR_EXPECTED_TOKEN)
///     .span(Span::DUMMY)
///     .note("statements are terminated with a semicolon")
///     .emit(&handler);
/// assert!(handler.has_errors());
/// ```
pub struct DiagnosticBuilder {
    level: Level,
    message: String,
    span: Span,
    code: Option<DiagnosticCode>,
    notes: Vec<String>,
    helps: Vec<String>,
}

impl DiagnosticBuilder {
    /// Starts an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Level::Error, message)
    }

    /// Starts a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Level::Warning, message)
    }

    fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            span: Span::DUMMY,
            code: None,
            notes: Vec::new(),
            helps: Vec::new(),
        }
    }

    /// Sets the diagnostic code.
    pub fn code(mut self, code: DiagnosticCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Sets the primary source location.
    pub fn span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Adds a contextual note.
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Adds a fix suggestion.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.helps.push(help.into());
        self
    }

    /// Finalizes the diagnostic without emitting it.
    pub fn build(self) -> Diagnostic {
        Diagnostic {
            level: self.level,
            message: self.message,
            span: self.span,
            code: self.code,
            notes: self.notes,
            helps: self.helps,
        }
    }

    /// Builds and hands the diagnostic to a handler.
    pub fn emit(self, handler: &Handler) {
        handler.emit_diagnostic(self.build());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error() {
        let diag = DiagnosticBuilder::error("bad digit")
            .code(DiagnosticCode::E_LEX_INVALID_DIGIT)
            .build();
        assert_eq!(diag.level, Level::Error);
        assert_eq!(diag.message, "bad digit");
        assert_eq!(diag.code, Some(DiagnosticCode::E_LEX_INVALID_DIGIT));
    }

    #[test]
    fn test_notes_and_helps() {
        let diag = DiagnosticBuilder::warning("macro redefined")
            .note("previous definition here")
            .help("use `undef first")
            .build();
        assert_eq!(diag.level, Level::Warning);
        assert_eq!(diag.notes.len(), 1);
        assert_eq!(diag.helps.len(), 1);
    }

    #[test]
    fn test_emit() {
        let handler = Handler::new();
        DiagnosticBuilder::error("oops").emit(&handler);
        assert_eq!(handler.error_count(), 1);
    }
}
