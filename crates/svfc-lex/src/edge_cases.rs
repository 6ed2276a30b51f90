//! Edge-case and property tests for the lexer as a whole.

use proptest::prelude::*;
use svfc_util::{Arena, FileId, Handler};

use crate::{Lexer, Token, TokenKind};

fn lex_all<'a>(arena: &'a Arena, handler: &'a Handler, text: &'a str) -> Vec<Token<'a>> {
    let mut lexer = Lexer::new(arena, handler, FileId(0), text);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.lex();
        let done = token.is_eof();
        tokens.push(token);
        if done {
            break;
        }
    }
    tokens
}

fn reconstruct(tokens: &[Token<'_>]) -> String {
    let mut out = String::new();
    for token in tokens {
        token.write_to(&mut out);
    }
    out
}

#[test]
fn empty_input_is_just_eof() {
    let arena = Arena::new();
    let handler = Handler::new();
    let tokens = lex_all(&arena, &handler, "");
    assert_eq!(tokens.len(), 1);
    assert!(tokens[0].is_eof());
    assert!(tokens[0].trivia().is_empty());
}

#[test]
fn whitespace_only_input() {
    let arena = Arena::new();
    let handler = Handler::new();
    let tokens = lex_all(&arena, &handler, "  \t\n  ");
    assert_eq!(tokens.len(), 1);
    assert!(tokens[0].is_eof());
    assert_eq!(reconstruct(&tokens), "  \t\n  ");
}

#[test]
fn crlf_line_endings_roundtrip() {
    let arena = Arena::new();
    let handler = Handler::new();
    let text = "wire a;\r\nwire b;\r\n";
    let tokens = lex_all(&arena, &handler, text);
    assert_eq!(reconstruct(&tokens), text);
}

#[test]
fn block_comment_spanning_lines() {
    let arena = Arena::new();
    let handler = Handler::new();
    let text = "a /* one\ntwo\nthree */ b";
    let tokens = lex_all(&arena, &handler, text);
    assert_eq!(reconstruct(&tokens), text);
    assert_eq!(
        tokens.iter().filter(|t| t.kind() == TokenKind::Identifier).count(),
        2
    );
}

#[test]
fn unterminated_block_comment_diagnosed() {
    let arena = Arena::new();
    let handler = Handler::new();
    let tokens = lex_all(&arena, &handler, "a /* never closed");
    assert!(handler.has_errors());
    assert_eq!(reconstruct(&tokens), "a /* never closed");
}

#[test]
fn adjacent_operators_do_not_merge_across_tokens() {
    let arena = Arena::new();
    let handler = Handler::new();
    let tokens = lex_all(&arena, &handler, "a<=b");
    // Nonblocking assignment lexes as a single `<=`.
    assert_eq!(tokens[1].kind(), TokenKind::Lte);
}

#[test]
fn numbers_and_ranges() {
    let arena = Arena::new();
    let handler = Handler::new();
    let tokens = lex_all(&arena, &handler, "[7:0]");
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::LBracket,
            TokenKind::IntegerLiteral,
            TokenKind::Colon,
            TokenKind::IntegerLiteral,
            TokenKind::RBracket,
            TokenKind::EndOfFile,
        ]
    );
}

#[test]
fn directive_tokens_do_not_consume_line() {
    let arena = Arena::new();
    let handler = Handler::new();
    let tokens = lex_all(&arena, &handler, "`define FOO 1");
    // The raw lexer yields the directive head only; line assembly is the
    // preprocessor's job.
    assert_eq!(tokens[0].kind(), TokenKind::Directive);
    assert_eq!(tokens[0].raw(), "`define");
    assert_eq!(tokens[1].kind(), TokenKind::Identifier);
    assert_eq!(tokens[2].kind(), TokenKind::IntegerLiteral);
}

#[test]
fn non_ascii_identifier_bytes_are_unknown_tokens() {
    let arena = Arena::new();
    let handler = Handler::new();
    let text = "a é b";
    let tokens = lex_all(&arena, &handler, text);
    assert!(tokens.iter().any(|t| t.kind() == TokenKind::Unknown));
    assert!(handler.has_errors());
    assert_eq!(reconstruct(&tokens), text);
}

proptest! {
    /// Any byte soup of printable characters reconstructs exactly.
    #[test]
    fn prop_roundtrip_printable(text in "[ -~\n\t]{0,200}") {
        let arena = Arena::new();
        let handler = Handler::new();
        let tokens = lex_all(&arena, &handler, &text);
        prop_assert_eq!(reconstruct(&tokens), text);
    }

    /// Token locations never decrease, whatever the input.
    #[test]
    fn prop_locations_monotone(text in "[ -~\n\t]{0,200}") {
        let arena = Arena::new();
        let handler = Handler::new();
        let tokens = lex_all(&arena, &handler, &text);
        for pair in tokens.windows(2) {
            prop_assert!(pair[0].span().start <= pair[1].span().start);
        }
    }

    /// Well-formed identifier/number soup lexes without diagnostics.
    #[test]
    fn prop_clean_input_no_errors(words in proptest::collection::vec("[a-z][a-z0-9_]{0,8}|[0-9]{1,6}", 0..20)) {
        let arena = Arena::new();
        let handler = Handler::new();
        let text = words.join(" ");
        let _ = lex_all(&arena, &handler, &text);
        prop_assert!(!handler.has_errors());
    }
}
