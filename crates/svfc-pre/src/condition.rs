//! Conditional-inclusion state machine.
//!
//! Each `ifdef`/`ifndef` pushes a frame. A frame is `Taken` while its
//! branch emits tokens, `Skipping` while a branch is dropped but a later
//! `elsif`/`else` may still take, and `Done` once some branch has been
//! taken so every remaining branch is dropped. Dropped tokens are
//! collected verbatim into `DisabledText` trivia attached to the next
//! surviving token.

use svfc_lex::{DirectiveKind, Token, TokenKind, TriviaKind};
use svfc_util::DiagnosticCode;

use crate::Preprocessor;

/// State of one conditional frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CondState {
    /// Branch is active; tokens flow through.
    Taken,
    /// Branch is inactive but a later branch may still be taken.
    Skipping,
    /// A branch was already taken; everything else is dropped.
    Done,
}

/// One entry of the conditional-inclusion stack.
#[derive(Clone, Copy, Debug)]
pub struct CondFrame {
    pub state: CondState,
    pub seen_else: bool,
}

impl<'a> Preprocessor<'a> {
    /// Handles `ifdef`/`ifndef` encountered in an active region.
    /// Returns true when the new branch must be skipped.
    pub(crate) fn handle_ifdef(
        &mut self,
        kind: DirectiveKind,
        directive: Token<'a>,
        text: &mut String,
    ) -> bool {
        let defined = self
            .directive_name(directive.span(), text)
            .map(|name| self.macros.contains_key(&name))
            .unwrap_or(false);

        let taken = if kind == DirectiveKind::Ifndef {
            !defined
        } else {
            defined
        };

        self.cond_stack.push(CondFrame {
            state: if taken {
                CondState::Taken
            } else {
                CondState::Skipping
            },
            seen_else: false,
        });

        !taken
    }

    /// Handles `else`/`elsif` in an active region: the current branch was
    /// taken, so whatever follows is dropped. Returns true when skipping
    /// must start.
    pub(crate) fn handle_else_like(
        &mut self,
        kind: DirectiveKind,
        directive: Token<'a>,
        text: &mut String,
    ) -> bool {
        if kind == DirectiveKind::Elsif {
            // The guard is consumed but irrelevant; a branch was taken.
            let _ = self.directive_name(directive.span(), text);
        }

        let Some(frame) = self.cond_stack.last_mut() else {
            self.handler.report(
                DiagnosticCode::E_PP_UNBALANCED_CONDITIONAL,
                directive.span(),
                format!("'`{}' without matching '`ifdef'", kind.name()),
            );
            return false;
        };

        if kind == DirectiveKind::Else {
            if frame.seen_else {
                self.handler.report(
                    DiagnosticCode::E_PP_ELSE_AFTER_ELSE,
                    directive.span(),
                    "conditional already has an '`else' branch",
                );
            }
            frame.seen_else = true;
        } else if frame.seen_else {
            self.handler.report(
                DiagnosticCode::E_PP_ELSE_AFTER_ELSE,
                directive.span(),
                "'`elsif' after '`else'",
            );
        }

        frame.state = CondState::Done;
        true
    }

    /// Handles `endif` in an active region.
    pub(crate) fn handle_endif(&mut self, directive: Token<'a>) {
        if self.cond_stack.pop().is_none() {
            self.handler.report(
                DiagnosticCode::E_PP_UNBALANCED_CONDITIONAL,
                directive.span(),
                "'`endif' without matching '`ifdef'",
            );
        }
    }

    /// Consumes raw tokens while the innermost frame is not taken,
    /// accumulating them as disabled text. Nested conditionals inside the
    /// dropped region are tracked by depth only; their guards are never
    /// evaluated.
    pub(crate) fn skip_disabled_text(&mut self) {
        let mut disabled = String::new();
        let mut depth = 0usize;

        loop {
            match self.cond_stack.last() {
                Some(frame) if frame.state != CondState::Taken => {}
                _ => break,
            }

            let token = self.next_raw();
            if token.is_eof() {
                self.handler.report(
                    DiagnosticCode::E_PP_UNTERMINATED_CONDITIONAL,
                    token.span(),
                    "conditional block not terminated before end of input",
                );
                // Synthesize the missing `endif frames and recover.
                self.cond_stack.clear();
                self.pushback = Some(token);
                break;
            }

            let directive_kind = match token.kind() {
                TokenKind::Directive => token
                    .ident()
                    .and_then(|sym| DirectiveKind::from_name(sym.as_str())),
                _ => None,
            };

            match directive_kind {
                Some(DirectiveKind::Ifdef) | Some(DirectiveKind::Ifndef) => {
                    depth += 1;
                    token.write_to(&mut disabled);
                }
                Some(DirectiveKind::Endif) if depth > 0 => {
                    depth -= 1;
                    token.write_to(&mut disabled);
                }
                Some(DirectiveKind::Endif) => {
                    for t in token.trivia() {
                        disabled.push_str(t.raw);
                    }
                    self.flush_disabled(&mut disabled);
                    self.cond_stack.pop();
                    self.push_directive_trivia(DirectiveKind::Endif, token.raw().to_string());
                }
                Some(DirectiveKind::Elsif) if depth == 0 => {
                    for t in token.trivia() {
                        disabled.push_str(t.raw);
                    }
                    self.flush_disabled(&mut disabled);
                    let mut text = token.raw().to_string();
                    let defined = self
                        .directive_name(token.span(), &mut text)
                        .map(|name| self.macros.contains_key(&name))
                        .unwrap_or(false);

                    let frame = self
                        .cond_stack
                        .last_mut()
                        .expect("loop guard checked a frame exists");
                    if frame.seen_else {
                        self.handler.report(
                            DiagnosticCode::E_PP_ELSE_AFTER_ELSE,
                            token.span(),
                            "'`elsif' after '`else'",
                        );
                    } else if frame.state == CondState::Skipping && defined {
                        frame.state = CondState::Taken;
                    }
                    self.push_directive_trivia(DirectiveKind::Elsif, text);
                }
                Some(DirectiveKind::Else) if depth == 0 => {
                    for t in token.trivia() {
                        disabled.push_str(t.raw);
                    }
                    self.flush_disabled(&mut disabled);
                    let frame = self
                        .cond_stack
                        .last_mut()
                        .expect("loop guard checked a frame exists");
                    if frame.seen_else {
                        self.handler.report(
                            DiagnosticCode::E_PP_ELSE_AFTER_ELSE,
                            token.span(),
                            "conditional already has an '`else' branch",
                        );
                    }
                    frame.seen_else = true;
                    if frame.state == CondState::Skipping {
                        frame.state = CondState::Taken;
                    }
                    self.push_directive_trivia(DirectiveKind::Else, token.raw().to_string());
                }
                // Any other directive inside a dropped region is inert text.
                _ => token.write_to(&mut disabled),
            }
        }

        self.flush_disabled(&mut disabled);
    }

    /// Attaches accumulated disabled text as trivia for the next token.
    fn flush_disabled(&mut self, disabled: &mut String) {
        if disabled.is_empty() {
            return;
        }
        let raw = self.arena.alloc_str(disabled);
        self.pending_trivia
            .push(svfc_lex::Trivia::new(TriviaKind::DisabledText, raw));
        disabled.clear();
    }
}
