//! Macro table entries and expansion.
//!
//! Expansion is eager and recursive: a usage is replaced by its fully
//! expanded body before the parser sees anything. A macro already on the
//! active-expansion stack is emitted verbatim instead of re-expanded, so
//! self-referential macros terminate with the literal usage in the output.
//!
//! All expanded tokens are relocated to the use site; the emitted stream
//! keeps monotone locations and diagnostics inside expansions point at the
//! invocation.

use svfc_lex::{Lexer, Token, TokenKind, TokenValue};
use svfc_util::{DiagnosticCode, Span, Symbol};

use crate::Preprocessor;

/// One element of a macro body: a literal token or a formal reference.
#[derive(Clone, Copy, Debug)]
pub enum MacroBodyPiece<'a> {
    Token(Token<'a>),
    /// Index into the formal parameter list.
    Param(usize),
}

/// A formal parameter with an optional default.
#[derive(Clone, Debug)]
pub struct MacroFormal<'a> {
    pub name: Symbol,
    pub default: Option<Vec<Token<'a>>>,
}

/// A `define entry in the macro table.
#[derive(Clone, Debug)]
pub struct MacroDef<'a> {
    pub name: Symbol,
    /// `None` for object-like macros; `Some` (possibly empty) when the
    /// definition carried a parenthesized formal list.
    pub formals: Option<Vec<MacroFormal<'a>>>,
    pub body: Vec<MacroBodyPiece<'a>>,
    /// Location of the name in the defining directive.
    pub span: Span,
}

impl<'a> MacroDef<'a> {
    pub fn is_function_like(&self) -> bool {
        self.formals.is_some()
    }
}

/// A recorded invocation, forming the expansion trail for diagnostics.
#[derive(Clone, Copy, Debug)]
pub struct MacroInvocation {
    pub name: Symbol,
    pub use_site: Span,
    /// Nesting depth at the time of invocation (0 = source-level usage).
    pub depth: usize,
}

impl<'a> Preprocessor<'a> {
    /// Expands a top-level macro usage from the raw stream, queueing the
    /// result for emission. Arguments, when required, are consumed from
    /// the raw stream following the usage.
    pub(crate) fn expand_usage(&mut self, usage: Token<'a>) {
        let Some(sym) = usage.ident() else { return };

        let Some(def) = self.macros.get(&sym).cloned() else {
            self.handler.report(
                DiagnosticCode::E_PP_UNDEFINED_MACRO,
                usage.span(),
                format!("undefined macro '`{}'", sym),
            );
            return;
        };

        let args = if def.is_function_like() {
            match self.collect_args_raw(&usage) {
                Some(args) => Some(args),
                None => return,
            }
        } else {
            None
        };

        self.invocations.push(MacroInvocation {
            name: sym,
            use_site: usage.span(),
            depth: 0,
        });

        let args = args.map(|a| self.apply_defaults(&def, a, usage.span()));
        self.expansion_stack.push(sym);
        let substituted = self.substitute(&def, args.as_deref(), usage.span());
        let expanded = self.expand_token_list(substituted, usage.span());
        self.expansion_stack.pop();

        self.expanded.extend(expanded);
    }

    /// Rescans a substituted token list, expanding nested macro usages.
    fn expand_token_list(&mut self, tokens: Vec<Token<'a>>, use_span: Span) -> Vec<Token<'a>> {
        let mut out = Vec::with_capacity(tokens.len());
        let mut i = 0;

        while i < tokens.len() {
            let token = tokens[i];
            i += 1;

            if token.kind() != TokenKind::MacroUsage {
                out.push(token);
                continue;
            }
            let Some(sym) = token.ident() else {
                out.push(token);
                continue;
            };

            // Recursion guard: emit the usage verbatim.
            if self.expansion_stack.contains(&sym) {
                out.push(token);
                continue;
            }

            let Some(def) = self.macros.get(&sym).cloned() else {
                self.handler.report(
                    DiagnosticCode::E_PP_UNDEFINED_MACRO,
                    use_span,
                    format!("undefined macro '`{}'", sym),
                );
                continue;
            };

            let args = if def.is_function_like() {
                match self.collect_args_from_list(&tokens, &mut i, &sym, use_span) {
                    Some(args) => Some(args),
                    None => continue,
                }
            } else {
                None
            };

            self.invocations.push(MacroInvocation {
                name: sym,
                use_site: use_span,
                depth: self.expansion_stack.len(),
            });

            let args = args.map(|a| self.apply_defaults(&def, a, use_span));
            self.expansion_stack.push(sym);
            let substituted = self.substitute(&def, args.as_deref(), use_span);
            let expanded = self.expand_token_list(substituted, use_span);
            self.expansion_stack.pop();

            out.extend(expanded);
        }

        out
    }

    /// Parses `( arg , arg , ... )` from the raw stream. Returns `None`
    /// (after a diagnostic) when no argument list follows.
    fn collect_args_raw(&mut self, usage: &Token<'a>) -> Option<Vec<Vec<Token<'a>>>> {
        let lparen = self.next_raw();
        if lparen.kind() != TokenKind::LParen {
            self.handler.report(
                DiagnosticCode::E_PP_MACRO_NEEDS_ARGS,
                usage.span(),
                "function-like macro requires an argument list",
            );
            self.pushback = Some(lparen);
            return None;
        }

        let mut args = Vec::new();
        let mut current = Vec::new();
        let mut depth = 0usize;

        loop {
            let token = self.next_raw();
            if token.is_eof() {
                self.handler.report(
                    DiagnosticCode::E_PP_MACRO_ARITY,
                    usage.span(),
                    "unterminated macro argument list",
                );
                self.pushback = Some(token);
                break;
            }
            if arg_list_step(token, &mut depth, &mut args, &mut current) {
                break;
            }
        }

        args.push(current);
        Some(args)
    }

    /// Parses an argument list out of an already-substituted token list.
    fn collect_args_from_list(
        &mut self,
        tokens: &[Token<'a>],
        i: &mut usize,
        name: &Symbol,
        use_span: Span,
    ) -> Option<Vec<Vec<Token<'a>>>> {
        if tokens.get(*i).map(|t| t.kind()) != Some(TokenKind::LParen) {
            self.handler.report(
                DiagnosticCode::E_PP_MACRO_NEEDS_ARGS,
                use_span,
                format!("function-like macro '`{}' requires an argument list", name),
            );
            return None;
        }
        *i += 1;

        let mut args = Vec::new();
        let mut current = Vec::new();
        let mut depth = 0usize;

        loop {
            let Some(&token) = tokens.get(*i) else {
                self.handler.report(
                    DiagnosticCode::E_PP_MACRO_ARITY,
                    use_span,
                    "unterminated macro argument list",
                );
                break;
            };
            *i += 1;
            if arg_list_step(token, &mut depth, &mut args, &mut current) {
                break;
            }
        }

        args.push(current);
        Some(args)
    }

    /// Checks arity and fills in defaults, producing one token vector per
    /// formal.
    fn apply_defaults(
        &mut self,
        def: &MacroDef<'a>,
        mut args: Vec<Vec<Token<'a>>>,
        use_span: Span,
    ) -> Vec<Vec<Token<'a>>> {
        let formals = def.formals.as_ref().expect("checked function-like");

        // `M()` on a zero-formal macro parses as one empty argument.
        if formals.is_empty() && args.len() == 1 && args[0].is_empty() {
            args.clear();
        }

        if args.len() > formals.len() {
            self.handler.report(
                DiagnosticCode::E_PP_MACRO_ARITY,
                use_span,
                format!(
                    "macro '`{}' takes {} arguments, got {}",
                    def.name,
                    formals.len(),
                    args.len()
                ),
            );
            args.truncate(formals.len());
        }

        while args.len() < formals.len() {
            let formal = &formals[args.len()];
            match &formal.default {
                Some(default) => args.push(default.clone()),
                None => {
                    self.handler.report(
                        DiagnosticCode::E_PP_MACRO_ARITY,
                        use_span,
                        format!(
                            "macro '`{}' missing argument for '{}'",
                            def.name, formal.name
                        ),
                    );
                    args.push(Vec::new());
                }
            }
        }

        // An explicitly empty argument also falls back to the default.
        for (arg, formal) in args.iter_mut().zip(formals) {
            if arg.is_empty() {
                if let Some(default) = &formal.default {
                    *arg = default.clone();
                }
            }
        }

        args
    }

    /// Substitutes formals, resolves stringification and token pasting.
    /// The result still needs a rescan for nested usages.
    fn substitute(
        &mut self,
        def: &MacroDef<'a>,
        args: Option<&[Vec<Token<'a>>]>,
        use_span: Span,
    ) -> Vec<Token<'a>> {
        let mut out: Vec<Token<'a>> = Vec::with_capacity(def.body.len());
        let mut i = 0;

        while i < def.body.len() {
            let piece = def.body[i];
            i += 1;

            match piece {
                MacroBodyPiece::Param(idx) => {
                    if let Some(args) = args {
                        out.extend(args[idx].iter().map(|t| t.with_span(use_span)));
                    }
                }
                MacroBodyPiece::Token(t) if t.kind() == TokenKind::MacroQuote => {
                    let literal = self.stringify(def, args, &mut i, use_span);
                    out.push(literal);
                }
                MacroBodyPiece::Token(t) if t.kind() == TokenKind::MacroPaste => {
                    self.paste(def, args, &mut i, &mut out, use_span);
                }
                MacroBodyPiece::Token(t) => out.push(t.with_span(use_span)),
            }
        }

        out
    }

    /// Collects pieces up to the closing `` `" `` into one string literal.
    fn stringify(
        &mut self,
        def: &MacroDef<'a>,
        args: Option<&[Vec<Token<'a>>]>,
        i: &mut usize,
        use_span: Span,
    ) -> Token<'a> {
        let mut parts: Vec<&str> = Vec::new();
        let mut closed = false;

        while *i < def.body.len() {
            let piece = def.body[*i];
            *i += 1;
            match piece {
                MacroBodyPiece::Token(t) if t.kind() == TokenKind::MacroQuote => {
                    closed = true;
                    break;
                }
                MacroBodyPiece::Token(t) => parts.push(t.raw()),
                MacroBodyPiece::Param(idx) => {
                    if let Some(args) = args {
                        parts.extend(args[idx].iter().map(|t| t.raw()));
                    }
                }
            }
        }

        if !closed {
            self.handler.report(
                DiagnosticCode::E_PP_UNTERMINATED_STRINGIFICATION,
                use_span,
                "macro stringification is not terminated",
            );
        }

        let contents = parts.join(" ");
        let raw = self.arena.alloc_str(&format!("\"{}\"", contents));
        let value = TokenValue::Str(self.arena.alloc_str(&contents));
        Token::new(TokenKind::StringLiteral, use_span, raw, &[], value)
    }

    /// Pastes the previously emitted token with the next piece's first
    /// token and re-lexes the concatenation.
    fn paste(
        &mut self,
        def: &MacroDef<'a>,
        args: Option<&[Vec<Token<'a>>]>,
        i: &mut usize,
        out: &mut Vec<Token<'a>>,
        use_span: Span,
    ) {
        let left = out.pop();

        // Resolve the right-hand side; a formal contributes its first
        // token and leaves the rest for ordinary emission.
        let mut rest: Vec<Token<'a>> = Vec::new();
        let right = loop {
            if *i >= def.body.len() {
                break None;
            }
            let piece = def.body[*i];
            *i += 1;
            match piece {
                MacroBodyPiece::Token(t) => break Some(t),
                MacroBodyPiece::Param(idx) => {
                    let Some(args) = args else { continue };
                    let mut it = args[idx].iter();
                    let first = it.next().copied();
                    rest = it.map(|t| t.with_span(use_span)).collect();
                    break first;
                }
            }
        };

        let mut text = String::new();
        if let Some(left) = left {
            text.push_str(left.raw());
        }
        if let Some(right) = right {
            text.push_str(right.raw());
        }

        out.extend(self.relex_text(&text, use_span));
        out.extend(rest);
    }

    /// Re-lexes synthesized text (paste results), relocating every token
    /// to the use site.
    pub(crate) fn relex_text(&mut self, text: &str, span: Span) -> Vec<Token<'a>> {
        if text.is_empty() {
            return Vec::new();
        }
        let source = self.arena.alloc_str(text);
        let mut lexer = Lexer::new(self.arena, self.handler, span.file, source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.lex();
            if token.is_eof() {
                break;
            }
            tokens.push(token.with_span(span));
        }
        tokens
    }
}

/// Shared step for argument scanning: returns true at the closing paren.
fn arg_list_step<'a>(
    token: Token<'a>,
    depth: &mut usize,
    args: &mut Vec<Vec<Token<'a>>>,
    current: &mut Vec<Token<'a>>,
) -> bool {
    use TokenKind::*;
    match token.kind() {
        LParen | LBracket | LBrace | ApostropheLBrace => {
            *depth += 1;
            current.push(token);
        }
        RParen if *depth == 0 => return true,
        RParen | RBracket | RBrace => {
            *depth = depth.saturating_sub(1);
            current.push(token);
        }
        Comma if *depth == 0 => {
            args.push(std::mem::take(current));
        }
        _ => current.push(token),
    }
    false
}
