//! String literal lexing.
//!
//! Standard C escapes plus Verilog's `\ooo` octal form. A backslash at the
//! end of a line continues the literal. Unterminated strings are diagnosed
//! at the line ending and a closing quote is synthesized so downstream
//! stages see a complete token.

use svfc_util::DiagnosticCode;

use crate::token::{TokenKind, TokenValue};
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes a string literal. Current char is `"`.
    pub(crate) fn lex_string(&mut self) -> (TokenKind, TokenValue<'a>) {
        let start = self.cursor.position();
        self.cursor.advance();

        let mut content = String::new();
        loop {
            let c = self.cursor.current();

            if self.cursor.is_at_end() || c == '\n' || c == '\r' {
                self.report_span(
                    DiagnosticCode::E_LEX_UNTERMINATED_STRING,
                    start,
                    self.cursor.position(),
                    "unterminated string literal",
                );
                break;
            }

            if c == '"' {
                self.cursor.advance();
                break;
            }

            if c == '\\' {
                self.scan_escape(&mut content);
            } else {
                content.push(c);
                self.cursor.advance();
            }
        }

        let decoded = self.arena.alloc_str(&content);
        (TokenKind::StringLiteral, TokenValue::Str(decoded))
    }

    /// Consumes one escape sequence, appending its value to `content`.
    fn scan_escape(&mut self, content: &mut String) {
        let escape_start = self.cursor.position();
        self.cursor.advance(); // backslash

        let c = self.cursor.current();
        match c {
            'n' => {
                content.push('\n');
                self.cursor.advance();
            }
            't' => {
                content.push('\t');
                self.cursor.advance();
            }
            '\\' => {
                content.push('\\');
                self.cursor.advance();
            }
            '"' => {
                content.push('"');
                self.cursor.advance();
            }
            'v' => {
                content.push('\u{0B}');
                self.cursor.advance();
            }
            'f' => {
                content.push('\u{0C}');
                self.cursor.advance();
            }
            'a' => {
                content.push('\u{07}');
                self.cursor.advance();
            }
            // Escaped line ending continues the literal on the next line.
            '\n' => {
                self.cursor.advance();
            }
            '\r' => {
                self.cursor.advance();
                self.cursor.eat('\n');
            }
            '0'..='7' => {
                let mut value = 0u32;
                let mut count = 0;
                while count < 3 && matches!(self.cursor.current(), '0'..='7') {
                    value = value * 8 + (self.cursor.current() as u32 - '0' as u32);
                    self.cursor.advance();
                    count += 1;
                }
                match char::from_u32(value) {
                    Some(decoded) if value <= 0xFF => content.push(decoded),
                    _ => {
                        self.report(
                            DiagnosticCode::E_LEX_INVALID_ESCAPE,
                            escape_start,
                            "octal escape exceeds one byte",
                        );
                    }
                }
            }
            'x' => {
                self.cursor.advance();
                let mut value = 0u32;
                let mut count = 0;
                while count < 2 && self.cursor.current().is_ascii_hexdigit() {
                    value = value * 16 + self.cursor.current().to_digit(16).unwrap();
                    self.cursor.advance();
                    count += 1;
                }
                if count == 0 {
                    self.report(
                        DiagnosticCode::E_LEX_INVALID_ESCAPE,
                        escape_start,
                        "hex escape needs at least one digit",
                    );
                } else if let Some(decoded) = char::from_u32(value) {
                    content.push(decoded);
                }
            }
            _ => {
                self.report(
                    DiagnosticCode::E_LEX_INVALID_ESCAPE,
                    escape_start,
                    format!("unknown escape '\\{}'", c),
                );
                content.push(c);
                self.cursor.advance();
            }
        }
    }
}
