//! Directive-line parsing: `define, `undef, `include arguments,
//! `timescale, `default_nettype, and the bookkeeping directives.
//!
//! Every handler consumes the directive's argument tokens from the raw
//! stream and appends their exact text to the directive's trivia buffer,
//! so the full directive line survives in the output as trivia.

use svfc_lex::{Token, TokenKind, TokenValue};
use svfc_util::{DiagnosticCode, Span, Symbol};

use crate::macros::{MacroBodyPiece, MacroDef, MacroFormal};
use crate::{DefaultNetType, LineDirective, Preprocessor, TimeScale};

impl<'a> Preprocessor<'a> {
    /// Consumes the remaining tokens of the current logical line.
    ///
    /// The first token of the next line (recognized by its end-of-line
    /// trivia) is pushed back. Line continuations extend the line.
    pub(crate) fn take_rest_of_line(&mut self) -> Vec<Token<'a>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_raw();
            if token.is_eof() || crosses_line(&token) {
                self.pushback = Some(token);
                break;
            }
            tokens.push(token);
        }
        tokens
    }

    /// Reads the macro-name argument of a directive.
    pub(crate) fn directive_name(
        &mut self,
        directive_span: Span,
        text: &mut String,
    ) -> Option<Symbol> {
        let token = self.next_raw();
        if token.is_eof() || crosses_line(&token) {
            self.pushback = Some(token);
            self.handler.report(
                DiagnosticCode::E_PP_EXPECTED_MACRO_NAME,
                directive_span,
                "directive requires a macro name",
            );
            return None;
        }

        token.write_to(text);
        match (token.kind(), token.ident()) {
            (TokenKind::Identifier, Some(sym)) => Some(sym),
            _ => {
                self.handler.report(
                    DiagnosticCode::E_PP_EXPECTED_MACRO_NAME,
                    token.span(),
                    format!("expected a macro name, found '{}'", token.display_text()),
                );
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // `define / `undef
    // ------------------------------------------------------------------

    pub(crate) fn handle_define(&mut self, directive: Token<'a>, text: &mut String) {
        let Some(name) = self.directive_name(directive.span(), text) else {
            for token in self.take_rest_of_line() {
                token.write_to(text);
            }
            return;
        };
        let name_span = directive.span();

        // A formal list exists only when `(` is glued to the name.
        let mut formals: Option<Vec<MacroFormal<'a>>> = None;
        let mut body_tokens: Vec<Token<'a>> = Vec::new();

        let token = self.next_raw();
        if token.is_eof() || crosses_line(&token) {
            self.pushback = Some(token);
        } else if token.kind() == TokenKind::LParen && token.trivia().is_empty() {
            token.write_to(text);
            formals = Some(self.parse_formals(text));
            body_tokens = self.take_rest_of_line();
        } else {
            body_tokens.push(token);
            body_tokens.extend(self.take_rest_of_line());
        }

        for token in &body_tokens {
            token.write_to(text);
        }

        let body = body_tokens
            .into_iter()
            .map(|token| match (token.kind(), token.ident(), &formals) {
                (TokenKind::Identifier, Some(sym), Some(formals)) => {
                    match formals.iter().position(|f| f.name == sym) {
                        Some(idx) => MacroBodyPiece::Param(idx),
                        None => MacroBodyPiece::Token(token),
                    }
                }
                _ => MacroBodyPiece::Token(token),
            })
            .collect();

        let def = MacroDef {
            name,
            formals,
            body,
            span: name_span,
        };

        if self.macros.insert(name, def).is_some() {
            log::warn!("macro '{}' redefined", name);
            self.handler.report(
                DiagnosticCode::W_PP_MACRO_REDEFINED,
                directive.span(),
                format!("macro '{}' redefined", name),
            );
        }
    }

    /// Parses the formal list after the opening paren, which has already
    /// been consumed.
    fn parse_formals(&mut self, text: &mut String) -> Vec<MacroFormal<'a>> {
        let mut formals = Vec::new();

        'list: loop {
            let token = self.next_raw();
            if token.is_eof() || crosses_line(&token) {
                self.pushback = Some(token);
                self.handler.report(
                    DiagnosticCode::E_PP_EXPECTED_MACRO_NAME,
                    token.span(),
                    "macro formal list is not terminated",
                );
                break;
            }
            token.write_to(text);

            match token.kind() {
                TokenKind::RParen => break,
                TokenKind::Comma => continue,
                TokenKind::Identifier => {
                    let name = token.ident().expect("identifier token carries a symbol");
                    let mut default = None;

                    let next = self.next_raw();
                    if next.is_eof() || crosses_line(&next) {
                        self.pushback = Some(next);
                        formals.push(MacroFormal { name, default });
                        self.handler.report(
                            DiagnosticCode::E_PP_EXPECTED_MACRO_NAME,
                            token.span(),
                            "macro formal list is not terminated",
                        );
                        break;
                    }
                    next.write_to(text);

                    match next.kind() {
                        TokenKind::Comma => {
                            formals.push(MacroFormal { name, default });
                        }
                        TokenKind::RParen => {
                            formals.push(MacroFormal { name, default });
                            break;
                        }
                        TokenKind::Equals => {
                            let (tokens, closed) = self.parse_default_value(text);
                            default = Some(tokens);
                            formals.push(MacroFormal { name, default });
                            if closed {
                                break;
                            }
                        }
                        _ => {
                            self.handler.report(
                                DiagnosticCode::E_PP_EXPECTED_MACRO_NAME,
                                next.span(),
                                format!(
                                    "unexpected '{}' in macro formal list",
                                    next.display_text()
                                ),
                            );
                            formals.push(MacroFormal { name, default });
                            continue 'list;
                        }
                    }
                }
                _ => {
                    self.handler.report(
                        DiagnosticCode::E_PP_EXPECTED_MACRO_NAME,
                        token.span(),
                        format!("expected a formal parameter, found '{}'", token.display_text()),
                    );
                }
            }
        }

        formals
    }

    /// Parses a default value after `=`, up to an unnested `,` or `)`.
    /// Returns the tokens and whether the closing paren was consumed.
    fn parse_default_value(&mut self, text: &mut String) -> (Vec<Token<'a>>, bool) {
        let mut tokens = Vec::new();
        let mut depth = 0usize;

        loop {
            let token = self.next_raw();
            if token.is_eof() || crosses_line(&token) {
                self.pushback = Some(token);
                return (tokens, true);
            }
            token.write_to(text);

            match token.kind() {
                TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::LBrace
                | TokenKind::ApostropheLBrace => {
                    depth += 1;
                    tokens.push(token);
                }
                TokenKind::RParen if depth == 0 => return (tokens, true),
                TokenKind::Comma if depth == 0 => return (tokens, false),
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                    tokens.push(token);
                }
                _ => tokens.push(token),
            }
        }
    }

    pub(crate) fn handle_undef(&mut self, directive: Token<'a>, text: &mut String) {
        if let Some(name) = self.directive_name(directive.span(), text) {
            self.macros.shift_remove(&name);
        }
    }

    // ------------------------------------------------------------------
    // `timescale / `default_nettype / `line
    // ------------------------------------------------------------------

    pub(crate) fn handle_timescale(&mut self, directive: Token<'a>, text: &mut String) {
        let tokens = self.take_rest_of_line();
        for token in &tokens {
            token.write_to(text);
        }

        let parsed = match tokens.as_slice() {
            [unit, slash, precision]
                if slash.kind() == TokenKind::Slash
                    && unit.kind() == TokenKind::TimeLiteral
                    && precision.kind() == TokenKind::TimeLiteral =>
            {
                match (unit.value(), precision.value()) {
                    (TokenValue::Time(um, uu), TokenValue::Time(pm, pu)) => Some(TimeScale {
                        unit: (um, uu),
                        precision: (pm, pu),
                    }),
                    _ => None,
                }
            }
            _ => None,
        };

        match parsed {
            Some(scale) => self.timescale = Some(scale),
            None => self.handler.report(
                DiagnosticCode::E_PP_BAD_TIMESCALE,
                directive.span(),
                "expected '`timescale <unit> / <precision>'",
            ),
        }
    }

    pub(crate) fn handle_default_nettype(&mut self, directive: Token<'a>, text: &mut String) {
        let tokens = self.take_rest_of_line();
        for token in &tokens {
            token.write_to(text);
        }

        let net = match tokens.as_slice() {
            [token] => DefaultNetType::from_token(token),
            _ => None,
        };

        match net {
            Some(net) => self.default_nettype = net,
            None => self.handler.report(
                DiagnosticCode::E_PP_BAD_NETTYPE,
                directive.span(),
                "expected a net type or 'none'",
            ),
        }
    }

    pub(crate) fn handle_line(&mut self, directive: Token<'a>, text: &mut String) {
        let tokens = self.take_rest_of_line();
        for token in &tokens {
            token.write_to(text);
        }

        let parsed = match tokens.as_slice() {
            [line, name, level]
                if line.kind() == TokenKind::IntegerLiteral
                    && name.kind() == TokenKind::StringLiteral
                    && level.kind() == TokenKind::IntegerLiteral =>
            {
                match (line.value(), name.value(), level.value()) {
                    (
                        TokenValue::Integer(line),
                        TokenValue::Str(file),
                        TokenValue::Integer(level),
                    ) if level <= 2 => Some(LineDirective {
                        line,
                        file: file.to_string(),
                        level: level as u8,
                    }),
                    _ => None,
                }
            }
            _ => None,
        };

        match parsed {
            Some(line) => self.line_directive = Some(line),
            None => self.handler.report(
                DiagnosticCode::E_PP_BAD_LINE_DIRECTIVE,
                directive.span(),
                "expected '`line <number> \"<file>\" <level>'",
            ),
        }
    }

    // ------------------------------------------------------------------
    // Bookkeeping directives
    // ------------------------------------------------------------------

    pub(crate) fn handle_begin_keywords(&mut self, text: &mut String) {
        let tokens = self.take_rest_of_line();
        for token in &tokens {
            token.write_to(text);
        }
        if let [version] = tokens.as_slice() {
            if let TokenValue::Str(name) = version.value() {
                self.keyword_versions.push(name.to_string());
            }
        }
    }

    pub(crate) fn handle_end_keywords(&mut self, directive: Token<'a>) {
        if self.keyword_versions.pop().is_none() {
            self.handler.report(
                DiagnosticCode::E_PP_UNBALANCED_KEYWORDS,
                directive.span(),
                "'`end_keywords' without matching '`begin_keywords'",
            );
        }
    }

    pub(crate) fn handle_resetall(&mut self) {
        self.default_nettype = DefaultNetType::Wire;
        self.timescale = None;
        self.line_directive = None;
        self.in_celldefine = false;
    }

    /// Consumes and records a pragma line without interpreting it.
    pub(crate) fn handle_pragma(&mut self, text: &mut String) {
        for token in self.take_rest_of_line() {
            token.write_to(text);
        }
    }
}

impl DefaultNetType {
    fn from_token(token: &Token<'_>) -> Option<Self> {
        Some(match token.kind() {
            TokenKind::Wire => DefaultNetType::Wire,
            TokenKind::Tri => DefaultNetType::Tri,
            TokenKind::Tri0 => DefaultNetType::Tri0,
            TokenKind::Tri1 => DefaultNetType::Tri1,
            TokenKind::Wand => DefaultNetType::Wand,
            TokenKind::Wor => DefaultNetType::Wor,
            TokenKind::Trireg => DefaultNetType::Trireg,
            TokenKind::Uwire => DefaultNetType::Uwire,
            TokenKind::Identifier if token.raw() == "none" => DefaultNetType::None,
            _ => return None,
        })
    }
}

/// True if this token starts a new logical line (its leading trivia
/// contains a real line ending; continuations do not count).
pub(crate) fn crosses_line(token: &Token<'_>) -> bool {
    token.trivia().iter().any(|t| t.is_end_of_line())
}
