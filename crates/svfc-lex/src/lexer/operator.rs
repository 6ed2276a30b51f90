//! Punctuator lexing with longest-match dispatch.

use svfc_util::DiagnosticCode;

use crate::token::{TokenKind, TokenValue};
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes a punctuator, or an `Unknown` token for stray characters.
    pub(crate) fn lex_operator(&mut self) -> (TokenKind, TokenValue<'a>) {
        use TokenKind::*;

        let start = self.cursor.position();
        let c = self.cursor.current();
        self.cursor.advance();

        let kind = match c {
            '(' => {
                // `(*` opens an attribute, except in `(*)` where the star
                // belongs to the event expression.
                if self.cursor.current() == '*' && self.cursor.char_at(1) != ')' {
                    self.cursor.advance();
                    self.open_attributes += 1;
                    OpenParenStar
                } else {
                    LParen
                }
            }
            ')' => RParen,
            '[' => LBracket,
            ']' => RBracket,
            '{' => LBrace,
            '}' => RBrace,
            ';' => Semicolon,
            ',' => Comma,
            '?' => Question,
            '@' => At,
            '.' => {
                if self.cursor.eat('*') {
                    DotStar
                } else {
                    Dot
                }
            }
            '#' => {
                if self.cursor.eat('#') {
                    DoubleHash
                } else {
                    Hash
                }
            }
            ':' => match self.cursor.current() {
                ':' => {
                    self.cursor.advance();
                    ColonColon
                }
                '=' => {
                    self.cursor.advance();
                    ColonEquals
                }
                '/' => {
                    self.cursor.advance();
                    ColonSlash
                }
                _ => Colon,
            },
            '+' => match self.cursor.current() {
                '+' => {
                    self.cursor.advance();
                    PlusPlus
                }
                '=' => {
                    self.cursor.advance();
                    PlusEquals
                }
                ':' => {
                    self.cursor.advance();
                    PlusColon
                }
                _ => Plus,
            },
            '-' => match self.cursor.current() {
                '-' => {
                    self.cursor.advance();
                    MinusMinus
                }
                '=' => {
                    self.cursor.advance();
                    MinusEquals
                }
                '>' => {
                    self.cursor.advance();
                    Arrow
                }
                ':' => {
                    self.cursor.advance();
                    MinusColon
                }
                _ => Minus,
            },
            '*' => match self.cursor.current() {
                '*' => {
                    self.cursor.advance();
                    DoubleStar
                }
                '=' => {
                    self.cursor.advance();
                    StarEquals
                }
                ')' if self.open_attributes > 0 => {
                    self.cursor.advance();
                    self.open_attributes -= 1;
                    StarCloseParen
                }
                _ => Star,
            },
            '/' => {
                if self.cursor.eat('=') {
                    SlashEquals
                } else {
                    Slash
                }
            }
            '%' => {
                if self.cursor.eat('=') {
                    PercentEquals
                } else {
                    Percent
                }
            }
            '=' => match self.cursor.current() {
                '=' => {
                    self.cursor.advance();
                    match self.cursor.current() {
                        '=' => {
                            self.cursor.advance();
                            CaseEquals
                        }
                        '?' => {
                            self.cursor.advance();
                            WildcardEquals
                        }
                        _ => DoubleEquals,
                    }
                }
                '>' => {
                    self.cursor.advance();
                    EqualsArrow
                }
                _ => Equals,
            },
            '!' => {
                if self.cursor.eat('=') {
                    match self.cursor.current() {
                        '=' => {
                            self.cursor.advance();
                            CaseNotEquals
                        }
                        '?' => {
                            self.cursor.advance();
                            WildcardNotEquals
                        }
                        _ => NotEquals,
                    }
                } else {
                    Bang
                }
            }
            '<' => match self.cursor.current() {
                '<' => {
                    self.cursor.advance();
                    match self.cursor.current() {
                        '<' => {
                            self.cursor.advance();
                            if self.cursor.eat('=') {
                                AshlEquals
                            } else {
                                Ashl
                            }
                        }
                        '=' => {
                            self.cursor.advance();
                            ShlEquals
                        }
                        _ => Shl,
                    }
                }
                '=' => {
                    self.cursor.advance();
                    Lte
                }
                '-' if self.cursor.char_at(1) == '>' => {
                    self.cursor.advance_by(2);
                    LtMinusGt
                }
                _ => Lt,
            },
            '>' => match self.cursor.current() {
                '>' => {
                    self.cursor.advance();
                    match self.cursor.current() {
                        '>' => {
                            self.cursor.advance();
                            if self.cursor.eat('=') {
                                AshrEquals
                            } else {
                                Ashr
                            }
                        }
                        '=' => {
                            self.cursor.advance();
                            ShrEquals
                        }
                        _ => Shr,
                    }
                }
                '=' => {
                    self.cursor.advance();
                    Gte
                }
                _ => Gt,
            },
            '&' => match self.cursor.current() {
                '&' => {
                    self.cursor.advance();
                    DoubleAmp
                }
                '=' => {
                    self.cursor.advance();
                    AmpEquals
                }
                _ => Amp,
            },
            '|' => match self.cursor.current() {
                '|' => {
                    self.cursor.advance();
                    DoublePipe
                }
                '=' => {
                    self.cursor.advance();
                    PipeEquals
                }
                _ => Pipe,
            },
            '^' => match self.cursor.current() {
                '~' => {
                    self.cursor.advance();
                    CaretTilde
                }
                '=' => {
                    self.cursor.advance();
                    CaretEquals
                }
                _ => Caret,
            },
            '~' => match self.cursor.current() {
                '&' => {
                    self.cursor.advance();
                    TildeAmp
                }
                '|' => {
                    self.cursor.advance();
                    TildePipe
                }
                '^' => {
                    self.cursor.advance();
                    TildeCaret
                }
                _ => Tilde,
            },
            _ => {
                self.report(
                    DiagnosticCode::E_LEX_UNKNOWN_CHAR,
                    start,
                    format!("unknown character '{}'", c.escape_default()),
                );
                Unknown
            }
        };

        (kind, TokenValue::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svfc_util::{Arena, FileId, Handler};

    fn kinds<'a>(arena: &'a Arena, handler: &'a Handler, text: &'a str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(arena, handler, FileId(0), text);
        let mut out = Vec::new();
        loop {
            let t = lexer.lex();
            if t.is_eof() {
                break;
            }
            out.push(t.kind());
        }
        out
    }

    #[test]
    fn test_longest_match_shifts() {
        let arena = Arena::new();
        let handler = Handler::new();
        assert_eq!(
            kinds(&arena, &handler, "<< <<< <<= <<<= < <="),
            vec![
                TokenKind::Shl,
                TokenKind::Ashl,
                TokenKind::ShlEquals,
                TokenKind::AshlEquals,
                TokenKind::Lt,
                TokenKind::Lte,
            ]
        );
    }

    #[test]
    fn test_equality_family() {
        let arena = Arena::new();
        let handler = Handler::new();
        assert_eq!(
            kinds(&arena, &handler, "= == === ==? != !== !=?"),
            vec![
                TokenKind::Equals,
                TokenKind::DoubleEquals,
                TokenKind::CaseEquals,
                TokenKind::WildcardEquals,
                TokenKind::NotEquals,
                TokenKind::CaseNotEquals,
                TokenKind::WildcardNotEquals,
            ]
        );
    }

    #[test]
    fn test_reduction_operators() {
        let arena = Arena::new();
        let handler = Handler::new();
        assert_eq!(
            kinds(&arena, &handler, "~& ~| ~^ ^~"),
            vec![
                TokenKind::TildeAmp,
                TokenKind::TildePipe,
                TokenKind::TildeCaret,
                TokenKind::CaretTilde,
            ]
        );
    }

    #[test]
    fn test_attribute_parens() {
        let arena = Arena::new();
        let handler = Handler::new();
        assert_eq!(
            kinds(&arena, &handler, "(* full_case *)"),
            vec![
                TokenKind::OpenParenStar,
                TokenKind::Identifier,
                TokenKind::StarCloseParen,
            ]
        );
    }

    #[test]
    fn test_event_star_not_attribute() {
        let arena = Arena::new();
        let handler = Handler::new();
        assert_eq!(
            kinds(&arena, &handler, "@(*)"),
            vec![
                TokenKind::At,
                TokenKind::LParen,
                TokenKind::Star,
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn test_part_select_operators() {
        let arena = Arena::new();
        let handler = Handler::new();
        assert_eq!(
            kinds(&arena, &handler, "+: -: ++ --"),
            vec![
                TokenKind::PlusColon,
                TokenKind::MinusColon,
                TokenKind::PlusPlus,
                TokenKind::MinusMinus,
            ]
        );
    }

    #[test]
    fn test_scope_and_dist_operators() {
        let arena = Arena::new();
        let handler = Handler::new();
        assert_eq!(
            kinds(&arena, &handler, ":: := :/ :"),
            vec![
                TokenKind::ColonColon,
                TokenKind::ColonEquals,
                TokenKind::ColonSlash,
                TokenKind::Colon,
            ]
        );
    }
}
