//! Lexer core: trivia scanning and token dispatch.
//!
//! The per-category scanning methods live in sibling modules:
//! [`number`], [`string`], [`identifier`], and [`operator`].

mod identifier;
mod number;
mod operator;
mod string;

use svfc_util::{Arena, DiagnosticCode, FileId, Handler, Span};

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind, TokenValue};
use crate::trivia::{Trivia, TriviaKind};

/// Single-pass scanner over one source buffer.
///
/// `lex` produces the next token with its leading trivia attached. The
/// lexer never fails: unexpected input becomes `Unknown` tokens or
/// degraded literals, each with a diagnostic, and the end-of-file token is
/// returned indefinitely once reached.
///
/// # Example
///
/// ```
/// use svfc_lex::{Lexer, TokenKind};
/// use svfc_util::{Arena, FileId, Handler};
///
/// let arena = Arena::new();
/// let handler = Handler::new();
/// let mut lexer = Lexer::new(&arena, &handler, FileId(0), "assign y = x;");
/// assert_eq!(lexer.lex().kind(), TokenKind::Assign);
/// assert_eq!(lexer.lex().kind(), TokenKind::Identifier);
/// ```
pub struct Lexer<'a> {
    pub(crate) arena: &'a Arena,
    pub(crate) handler: &'a Handler,
    pub(crate) cursor: Cursor<'a>,
    file: FileId,
    eof: Option<Token<'a>>,
    /// Depth of `(* ... *)` attribute nesting, so `*)` is only recognized
    /// while an attribute is open (`@(*)` contains a plain star).
    pub(crate) open_attributes: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(arena: &'a Arena, handler: &'a Handler, file: FileId, source: &'a str) -> Self {
        Self {
            arena,
            handler,
            cursor: Cursor::new(source),
            file,
            eof: None,
            open_attributes: 0,
        }
    }

    /// The buffer this lexer reads from.
    #[inline]
    pub fn file(&self) -> FileId {
        self.file
    }

    /// Produces the next token. Idempotent at end of file.
    pub fn lex(&mut self) -> Token<'a> {
        if let Some(eof) = self.eof {
            return eof;
        }

        let mut trivia = Vec::new();
        self.scan_trivia(&mut trivia);

        let start = self.cursor.position();
        if self.cursor.is_at_end() {
            let token = self.build_token(TokenKind::EndOfFile, start, trivia, TokenValue::None);
            self.eof = Some(token);
            return token;
        }

        let (kind, value) = self.scan_token();
        self.build_token(kind, start, trivia, value)
    }

    /// Scans an include filename (`"path"` or `<path>`), used from the
    /// directive side-channel. Falls back to normal lexing when the next
    /// token is not a filename so the caller can diagnose it.
    pub fn lex_include_filename(&mut self) -> Token<'a> {
        if self.eof.is_some() {
            return self.lex();
        }

        let mut trivia = Vec::new();
        self.scan_trivia(&mut trivia);

        let start = self.cursor.position();
        let close = match self.cursor.current() {
            '"' => '"',
            '<' => '>',
            _ => {
                if self.cursor.is_at_end() {
                    let token =
                        self.build_token(TokenKind::EndOfFile, start, trivia, TokenValue::None);
                    self.eof = Some(token);
                    return token;
                }
                let (kind, value) = self.scan_token();
                return self.build_token(kind, start, trivia, value);
            }
        };

        self.cursor.advance();
        let mut closed = false;
        loop {
            let c = self.cursor.current();
            if self.cursor.is_at_end() || c == '\n' || c == '\r' {
                break;
            }
            self.cursor.advance();
            if c == close {
                closed = true;
                break;
            }
        }

        let raw = self.cursor.slice_from(start);
        if !closed {
            self.report(DiagnosticCode::E_LEX_UNTERMINATED_STRING, start, "unterminated include filename");
        }
        let path_end = if closed { raw.len() - 1 } else { raw.len() };
        let value = TokenValue::Str(&raw[1..path_end]);
        self.build_token(TokenKind::IncludeFileName, start, trivia, value)
    }

    // ------------------------------------------------------------------
    // Trivia
    // ------------------------------------------------------------------

    pub(crate) fn scan_trivia(&mut self, trivia: &mut Vec<Trivia<'a>>) {
        loop {
            let start = self.cursor.position();
            match self.cursor.current() {
                ' ' | '\t' => {
                    while matches!(self.cursor.current(), ' ' | '\t') {
                        self.cursor.advance();
                    }
                    trivia.push(Trivia::new(TriviaKind::Whitespace, self.cursor.slice_from(start)));
                }
                '\n' => {
                    self.cursor.advance();
                    trivia.push(Trivia::new(TriviaKind::EndOfLine, self.cursor.slice_from(start)));
                }
                '\r' => {
                    self.cursor.advance();
                    self.cursor.eat('\n');
                    trivia.push(Trivia::new(TriviaKind::EndOfLine, self.cursor.slice_from(start)));
                }
                '\\' if matches!(self.cursor.char_at(1), '\n' | '\r') => {
                    self.cursor.advance();
                    if self.cursor.current() == '\r' {
                        self.cursor.advance();
                        self.cursor.eat('\n');
                    } else {
                        self.cursor.advance();
                    }
                    trivia.push(Trivia::new(
                        TriviaKind::LineContinuation,
                        self.cursor.slice_from(start),
                    ));
                }
                '/' if self.cursor.char_at(1) == '/' => {
                    while !self.cursor.is_at_end()
                        && !matches!(self.cursor.current(), '\n' | '\r')
                    {
                        self.cursor.advance();
                    }
                    trivia.push(Trivia::new(TriviaKind::LineComment, self.cursor.slice_from(start)));
                }
                '/' if self.cursor.char_at(1) == '*' => {
                    self.cursor.advance_by(2);
                    let mut terminated = false;
                    while !self.cursor.is_at_end() {
                        if self.cursor.current() == '*' && self.cursor.char_at(1) == '/' {
                            self.cursor.advance_by(2);
                            terminated = true;
                            break;
                        }
                        self.cursor.advance();
                    }
                    if !terminated {
                        self.report(
                            DiagnosticCode::E_LEX_UNTERMINATED_COMMENT,
                            start,
                            "unterminated block comment",
                        );
                    }
                    trivia.push(Trivia::new(TriviaKind::BlockComment, self.cursor.slice_from(start)));
                }
                _ => break,
            }
        }
    }

    // ------------------------------------------------------------------
    // Token dispatch
    // ------------------------------------------------------------------

    fn scan_token(&mut self) -> (TokenKind, TokenValue<'a>) {
        match self.cursor.current() {
            'a'..='z' | 'A'..='Z' | '_' => self.lex_identifier_or_keyword(),
            '0'..='9' => self.lex_number(),
            '"' => self.lex_string(),
            '\'' => self.lex_apostrophe(),
            '`' => self.lex_backtick(),
            '\\' => self.lex_escaped_identifier(),
            '$' => self.lex_dollar(),
            _ => self.lex_operator(),
        }
    }

    fn lex_backtick(&mut self) -> (TokenKind, TokenValue<'a>) {
        let start = self.cursor.position();
        self.cursor.advance();

        match self.cursor.current() {
            '`' => {
                self.cursor.advance();
                (TokenKind::MacroPaste, TokenValue::None)
            }
            '"' => {
                self.cursor.advance();
                (TokenKind::MacroQuote, TokenValue::None)
            }
            'a'..='z' | 'A'..='Z' | '_' => {
                let name_start = self.cursor.position();
                self.scan_identifier_chars();
                let name = self.cursor.slice_from(name_start);
                let sym = svfc_util::Symbol::intern(name);
                if crate::trivia::DirectiveKind::from_name(name).is_some() {
                    (TokenKind::Directive, TokenValue::Ident(sym))
                } else {
                    (TokenKind::MacroUsage, TokenValue::Ident(sym))
                }
            }
            _ => {
                self.report(DiagnosticCode::E_LEX_UNKNOWN_CHAR, start, "stray '`' in input");
                (TokenKind::Unknown, TokenValue::None)
            }
        }
    }

    // ------------------------------------------------------------------
    // Helpers shared by the scanning modules
    // ------------------------------------------------------------------

    fn build_token(
        &mut self,
        kind: TokenKind,
        start: usize,
        trivia: Vec<Trivia<'a>>,
        value: TokenValue<'a>,
    ) -> Token<'a> {
        let raw = self.cursor.slice_from(start);
        let span = Span::new(self.file, start as u32, self.cursor.position() as u32);
        let trivia = self.arena.alloc_slice(&trivia);
        Token::new(kind, span, raw, trivia, value)
    }

    pub(crate) fn report(&self, code: DiagnosticCode, offset: usize, message: impl Into<String>) {
        self.handler
            .report(code, Span::point(self.file, offset as u32), message);
    }

    pub(crate) fn report_span(
        &self,
        code: DiagnosticCode,
        start: usize,
        end: usize,
        message: impl Into<String>,
    ) {
        self.handler.report(
            code,
            Span::new(self.file, start as u32, end as u32),
            message,
        );
    }
}
