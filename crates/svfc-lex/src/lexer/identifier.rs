//! Identifier, keyword, and system-identifier lexing.

use svfc_util::{DiagnosticCode, Symbol};

use crate::token::{TokenKind, TokenValue};
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes a simple identifier or keyword. Current char is `[a-zA-Z_]`.
    pub(crate) fn lex_identifier_or_keyword(&mut self) -> (TokenKind, TokenValue<'a>) {
        let start = self.cursor.position();
        self.scan_identifier_chars();
        let text = self.cursor.slice_from(start);

        match TokenKind::from_keyword(text) {
            Some(kind) => (kind, TokenValue::None),
            None => (TokenKind::Identifier, TokenValue::Ident(Symbol::intern(text))),
        }
    }

    /// Lexes `$identifier` system names, or a lone `$`.
    pub(crate) fn lex_dollar(&mut self) -> (TokenKind, TokenValue<'a>) {
        let start = self.cursor.position();
        self.cursor.advance();

        if matches!(self.cursor.current(), 'a'..='z' | 'A'..='Z' | '_') {
            self.scan_identifier_chars();
            let text = self.cursor.slice_from(start);
            (
                TokenKind::SystemIdentifier,
                TokenValue::Ident(Symbol::intern(text)),
            )
        } else {
            (TokenKind::Dollar, TokenValue::None)
        }
    }

    /// Lexes an escaped identifier: `\` followed by any printable
    /// characters up to the next whitespace.
    pub(crate) fn lex_escaped_identifier(&mut self) -> (TokenKind, TokenValue<'a>) {
        let start = self.cursor.position();
        self.cursor.advance();

        let name_start = self.cursor.position();
        loop {
            let c = self.cursor.current();
            if self.cursor.is_at_end() || c.is_whitespace() || !c.is_ascii_graphic() {
                break;
            }
            self.cursor.advance();
        }

        let name = self.cursor.slice_from(name_start);
        if name.is_empty() {
            self.report(
                DiagnosticCode::E_LEX_EMPTY_ESCAPED_IDENT,
                start,
                "escaped identifier has no characters",
            );
            return (TokenKind::Unknown, TokenValue::None);
        }

        (TokenKind::Identifier, TokenValue::Ident(Symbol::intern(name)))
    }

    /// Consumes a run of identifier-continue characters.
    pub(crate) fn scan_identifier_chars(&mut self) {
        while matches!(
            self.cursor.current(),
            'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '$'
        ) {
            self.cursor.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svfc_util::{Arena, FileId, Handler};

    fn first_token<'a>(arena: &'a Arena, handler: &'a Handler, text: &'a str) -> crate::Token<'a> {
        Lexer::new(arena, handler, FileId(0), text).lex()
    }

    #[test]
    fn test_keyword() {
        let arena = Arena::new();
        let handler = Handler::new();
        assert_eq!(
            first_token(&arena, &handler, "endmodule").kind(),
            TokenKind::Endmodule
        );
    }

    #[test]
    fn test_identifier_with_dollar() {
        let arena = Arena::new();
        let handler = Handler::new();
        let t = first_token(&arena, &handler, "bus$x");
        assert_eq!(t.kind(), TokenKind::Identifier);
        assert_eq!(t.raw(), "bus$x");
    }

    #[test]
    fn test_system_identifier() {
        let arena = Arena::new();
        let handler = Handler::new();
        let t = first_token(&arena, &handler, "$error(\"x\")");
        assert_eq!(t.kind(), TokenKind::SystemIdentifier);
        assert_eq!(t.ident().unwrap().as_str(), "$error");
    }

    #[test]
    fn test_lone_dollar() {
        let arena = Arena::new();
        let handler = Handler::new();
        assert_eq!(first_token(&arena, &handler, "$ ").kind(), TokenKind::Dollar);
    }

    #[test]
    fn test_escaped_identifier() {
        let arena = Arena::new();
        let handler = Handler::new();
        let t = first_token(&arena, &handler, "\\bus+idx x");
        assert_eq!(t.kind(), TokenKind::Identifier);
        assert_eq!(t.ident().unwrap().as_str(), "bus+idx");
        assert_eq!(t.raw(), "\\bus+idx");
    }

    #[test]
    fn test_empty_escaped_identifier() {
        let arena = Arena::new();
        let handler = Handler::new();
        let t = first_token(&arena, &handler, "\\ x");
        assert_eq!(t.kind(), TokenKind::Unknown);
        assert!(handler.has_errors());
    }
}
