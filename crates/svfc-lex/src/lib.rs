//! svfc-lex - SystemVerilog lexer and token model.
//!
//! Transforms one source buffer into a stream of tokens with attached
//! trivia. The lexer is a single-pass character scanner that never fails
//! fatally: malformed input produces degraded tokens plus diagnostics, and
//! the end-of-file token repeats indefinitely once reached.
//!
//! Two invariants hold for every lexed buffer:
//!
//! - **Lossless round trip**: concatenating every token's leading trivia
//!   and raw text, in order, reproduces the input bytes exactly.
//! - **Monotone locations**: token spans never move backwards.
//!
//! The preprocessor layers on top of this crate; it consumes `Directive`
//! and `MacroUsage` tokens and uses [`Lexer::lex_include_filename`] as the
//! directive side-channel for include paths.

pub mod cursor;
mod lexer;
pub mod token;
pub mod trivia;

#[cfg(test)]
mod edge_cases;

pub use lexer::Lexer;
pub use token::{LiteralBase, LogicVector, TimeUnit, Token, TokenKind, TokenValue};
pub use trivia::{DirectiveKind, Trivia, TriviaKind};
