//! Numeric literal lexing.
//!
//! Handles the SystemVerilog literal zoo: plain decimal integers, sized
//! and unsized based vectors with X/Z digits (`4'b10xz`, `'hdead_beef`),
//! real literals with fractions and exponents, unbased unsized literals
//! (`'0`, `'x`), and time literals (`100ns`).

use svfc_util::DiagnosticCode;

use crate::token::{LiteralBase, LogicVector, TimeUnit, TokenKind, TokenValue};
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes a literal starting with a decimal digit.
    pub(crate) fn lex_number(&mut self) -> (TokenKind, TokenValue<'a>) {
        let start = self.cursor.position();
        self.scan_decimal_digits();

        // Real literal: fraction and/or exponent.
        let has_fraction =
            self.cursor.current() == '.' && self.cursor.char_at(1).is_ascii_digit();
        let has_exponent = matches!(self.cursor.current(), 'e' | 'E')
            && (self.cursor.char_at(1).is_ascii_digit()
                || (matches!(self.cursor.char_at(1), '+' | '-')
                    && self.cursor.char_at(2).is_ascii_digit()));

        if has_fraction || has_exponent {
            return self.lex_real_tail(start);
        }

        // Based vector: optional whitespace, then 'base digits.
        let before_base = self.cursor.position();
        while matches!(self.cursor.current(), ' ' | '\t') {
            self.cursor.advance();
        }
        if self.at_base_specifier() {
            let size_text = &self.cursor.source()[start..before_base];
            let width = parse_size(size_text).unwrap_or_else(|| {
                self.report_span(
                    DiagnosticCode::E_LEX_INVALID_DIGIT,
                    start,
                    before_base,
                    format!("invalid vector size '{}'", size_text),
                );
                32
            });
            return self.lex_based_tail(Some(width));
        }
        self.cursor.set_position(before_base);

        // Time literal.
        if let Some(unit) = self.scan_time_unit() {
            let text = digits_of(self.cursor.source(), start, self.cursor.position(), unit);
            let magnitude: f64 = text.parse().unwrap_or(0.0);
            self.check_time_magnitude(magnitude, start);
            return (TokenKind::TimeLiteral, TokenValue::Time(magnitude, unit));
        }

        // Plain unsized decimal integer.
        let text: String = self
            .cursor
            .slice_from(start)
            .chars()
            .filter(|c| *c != '_')
            .collect();
        let mut value = 0u64;
        for c in text.chars() {
            value = value
                .saturating_mul(10)
                .saturating_add(c.to_digit(10).unwrap_or(0) as u64);
        }
        (TokenKind::IntegerLiteral, TokenValue::Integer(value))
    }

    /// Lexes an apostrophe-led token: `'{`, unbased unsized literals,
    /// unsized based vectors, or a lone cast apostrophe.
    pub(crate) fn lex_apostrophe(&mut self) -> (TokenKind, TokenValue<'a>) {
        if self.cursor.char_at(1) == '{' {
            self.cursor.advance_by(2);
            return (TokenKind::ApostropheLBrace, TokenValue::None);
        }

        // Unbased unsized: '0 '1 'x 'z '?
        let digit = self.cursor.char_at(1);
        let is_last = !matches!(
            self.cursor.char_at(2),
            'a'..='z' | 'A'..='Z' | '0'..='9' | '_'
        );
        if is_last {
            let bit = match digit {
                '0' => Some((0u64, 0u64)),
                '1' => Some((1, 0)),
                'x' | 'X' => Some((0, 1)),
                'z' | 'Z' | '?' => Some((1, 1)),
                _ => None,
            };
            if let Some((value, xz)) = bit {
                self.cursor.advance_by(2);
                let vector = LogicVector {
                    width: 1,
                    base: LiteralBase::Binary,
                    signed: false,
                    value,
                    xz,
                };
                return (
                    TokenKind::UnbasedUnsizedLiteral,
                    TokenValue::Vector(vector),
                );
            }
        }

        if self.at_base_specifier() {
            return self.lex_based_tail(None);
        }

        self.cursor.advance();
        (TokenKind::Apostrophe, TokenValue::None)
    }

    /// True if the cursor sits on `'` followed by `[sS]?[bodhBODH]`.
    fn at_base_specifier(&self) -> bool {
        if self.cursor.current() != '\'' {
            return false;
        }
        let mut next = self.cursor.char_at(1);
        if matches!(next, 's' | 'S') {
            next = self.cursor.char_at(2);
        }
        matches!(next, 'b' | 'B' | 'o' | 'O' | 'd' | 'D' | 'h' | 'H')
    }

    /// Consumes `'[s]base digits` and builds the vector value.
    ///
    /// `width` is the already-scanned size prefix, or `None` for unsized
    /// literals (which default to 32 bits).
    fn lex_based_tail(&mut self, width: Option<u32>) -> (TokenKind, TokenValue<'a>) {
        let apostrophe = self.cursor.position();
        self.cursor.advance(); // '

        let signed = matches!(self.cursor.current(), 's' | 'S');
        if signed {
            self.cursor.advance();
        }

        let base = match self.cursor.current() {
            'b' | 'B' => LiteralBase::Binary,
            'o' | 'O' => LiteralBase::Octal,
            'd' | 'D' => LiteralBase::Decimal,
            'h' | 'H' => LiteralBase::Hex,
            _ => unreachable!("caller checked the base specifier"),
        };
        self.cursor.advance();

        let width = width.unwrap_or(32);
        let digits_start = self.cursor.position();
        let (value, xz) = self.scan_based_digits(base);

        let mut vector = LogicVector {
            width,
            base,
            signed,
            value,
            xz,
        };

        if self.cursor.position() == digits_start {
            self.report(
                DiagnosticCode::E_LEX_MISSING_DIGITS,
                apostrophe,
                "expected digits after base specifier",
            );
        }

        // Trim to the declared width so value bits and unknown mask agree
        // with the token's width.
        if vector.width < 64 {
            let mask = (1u64 << vector.width) - 1;
            vector.value &= mask;
            vector.xz &= mask;
        }

        (TokenKind::IntegerLiteral, TokenValue::Vector(vector))
    }

    /// Accumulates based digits, diagnosing invalid ones and misplaced
    /// underscores without stopping the scan.
    fn scan_based_digits(&mut self, base: LiteralBase) -> (u64, u64) {
        let mut value = 0u64;
        let mut xz = 0u64;
        let mut seen_digit = false;
        let mut reported_bad_digit = false;

        loop {
            let c = self.cursor.current();
            let pos = self.cursor.position();

            if c == '_' {
                if !seen_digit {
                    self.report(
                        DiagnosticCode::E_LEX_MISPLACED_UNDERSCORE,
                        pos,
                        "underscore must follow a digit",
                    );
                }
                self.cursor.advance();
                continue;
            }

            let digit = match c {
                '0'..='9' => Some(Digit::Value(c as u64 - '0' as u64)),
                'a'..='f' | 'A'..='F' => {
                    Some(Digit::Value(10 + (c.to_ascii_lowercase() as u64 - 'a' as u64)))
                }
                'x' | 'X' => Some(Digit::X),
                'z' | 'Z' | '?' => Some(Digit::Z),
                _ => None,
            };

            let Some(digit) = digit else { break };

            // x and z are digits for every base; hex letters double as x/z
            // markers only via the dedicated characters above.
            let valid = match digit {
                Digit::Value(v) => v < base.radix() as u64,
                Digit::X | Digit::Z => true,
            };
            if !valid && !reported_bad_digit {
                self.report(
                    DiagnosticCode::E_LEX_INVALID_DIGIT,
                    pos,
                    format!("digit '{}' is not valid in base {}", c, base.radix()),
                );
                reported_bad_digit = true;
            }

            if valid {
                match base {
                    LiteralBase::Decimal => match digit {
                        Digit::Value(v) => {
                            value = value.saturating_mul(10).saturating_add(v);
                        }
                        // A decimal X or Z makes the whole value unknown.
                        Digit::X => {
                            value = 0;
                            xz = u64::MAX;
                        }
                        Digit::Z => {
                            value = u64::MAX;
                            xz = u64::MAX;
                        }
                    },
                    _ => {
                        let shift = base.bits_per_digit();
                        let mask = (1u64 << shift) - 1;
                        let (dv, dxz) = match digit {
                            Digit::Value(v) => (v, 0),
                            Digit::X => (0, mask),
                            Digit::Z => (mask, mask),
                        };
                        value = (value << shift) | dv;
                        xz = (xz << shift) | dxz;
                    }
                }
            }

            seen_digit = true;
            self.cursor.advance();
        }

        (value, xz)
    }

    /// Consumes fraction/exponent and an optional time suffix.
    fn lex_real_tail(&mut self, start: usize) -> (TokenKind, TokenValue<'a>) {
        if self.cursor.current() == '.' {
            self.cursor.advance();
            self.scan_decimal_digits();
        }

        if matches!(self.cursor.current(), 'e' | 'E') {
            self.cursor.advance();
            if matches!(self.cursor.current(), '+' | '-') {
                self.cursor.advance();
            }
            self.scan_decimal_digits();
        }

        let number_end = self.cursor.position();
        if let Some(unit) = self.scan_time_unit() {
            let text: String = self.cursor.source()[start..number_end]
                .chars()
                .filter(|c| *c != '_')
                .collect();
            let magnitude: f64 = text.parse().unwrap_or(0.0);
            self.check_time_magnitude(magnitude, start);
            return (TokenKind::TimeLiteral, TokenValue::Time(magnitude, unit));
        }

        let text: String = self
            .cursor
            .slice_from(start)
            .chars()
            .filter(|c| *c != '_')
            .collect();
        let value: f64 = text.parse().unwrap_or(0.0);
        (TokenKind::RealLiteral, TokenValue::Real(value))
    }

    /// Consumes a time-unit suffix if one is present at the cursor.
    fn scan_time_unit(&mut self) -> Option<TimeUnit> {
        let one = self.cursor.current();
        let two = self.cursor.char_at(1);

        let (unit, len) = match (one, two) {
            ('m', 's') => (TimeUnit::Milliseconds, 2),
            ('u', 's') => (TimeUnit::Microseconds, 2),
            ('n', 's') => (TimeUnit::Nanoseconds, 2),
            ('p', 's') => (TimeUnit::Picoseconds, 2),
            ('f', 's') => (TimeUnit::Femtoseconds, 2),
            ('s', _) => (TimeUnit::Seconds, 1),
            _ => return None,
        };

        // Reject when the suffix is just the start of an identifier.
        let after = self.cursor.char_at(len);
        if matches!(after, 'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '$') {
            return None;
        }

        self.cursor.advance_by(len);
        Some(unit)
    }

    /// Time-literal magnitudes are restricted to 1, 10, and 100.
    fn check_time_magnitude(&self, magnitude: f64, start: usize) {
        if magnitude != 1.0 && magnitude != 10.0 && magnitude != 100.0 {
            self.report(
                DiagnosticCode::E_LEX_INVALID_TIME_MAGNITUDE,
                start,
                format!("time literal magnitude must be 1, 10, or 100, not {}", magnitude),
            );
        }
    }

    fn scan_decimal_digits(&mut self) {
        while matches!(self.cursor.current(), '0'..='9' | '_') {
            self.cursor.advance();
        }
    }
}

enum Digit {
    Value(u64),
    X,
    Z,
}

/// Parses a size prefix (decimal digits with underscores).
fn parse_size(text: &str) -> Option<u32> {
    let digits: String = text.chars().filter(|c| *c != '_').collect();
    let size: u32 = digits.parse().ok()?;
    (size > 0).then_some(size)
}

/// The numeric text of a time literal, excluding its unit suffix.
fn digits_of<'a>(source: &'a str, start: usize, end: usize, unit: TimeUnit) -> &'a str {
    &source[start..end - unit.suffix().len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use svfc_util::{Arena, FileId, Handler};

    fn lex_one<'a>(arena: &'a Arena, handler: &'a Handler, text: &'a str) -> crate::Token<'a> {
        Lexer::new(arena, handler, FileId(0), text).lex()
    }

    fn vector_of(token: crate::Token<'_>) -> LogicVector {
        match token.value() {
            TokenValue::Vector(v) => v,
            other => panic!("expected vector, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_decimal() {
        let arena = Arena::new();
        let handler = Handler::new();
        let t = lex_one(&arena, &handler, "42");
        assert_eq!(t.kind(), TokenKind::IntegerLiteral);
        assert_eq!(t.value(), TokenValue::Integer(42));
    }

    #[test]
    fn test_underscores_ignored() {
        let arena = Arena::new();
        let handler = Handler::new();
        let t = lex_one(&arena, &handler, "1_000_000");
        assert_eq!(t.value(), TokenValue::Integer(1_000_000));
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_sized_binary() {
        let arena = Arena::new();
        let handler = Handler::new();
        let v = vector_of(lex_one(&arena, &handler, "4'b1010"));
        assert_eq!(v.width, 4);
        assert_eq!(v.base, LiteralBase::Binary);
        assert_eq!(v.value, 0b1010);
        assert_eq!(v.xz, 0);
        assert!(!v.signed);
    }

    #[test]
    fn test_sized_hex_with_xz() {
        let arena = Arena::new();
        let handler = Handler::new();
        let v = vector_of(lex_one(&arena, &handler, "8'hXz"));
        assert_eq!(v.width, 8);
        // High nibble X: value 0, unknown 1111. Low nibble Z: value 1111.
        assert_eq!(v.xz, 0xFF);
        assert_eq!(v.value, 0x0F);
        assert!(v.has_unknown());
    }

    #[test]
    fn test_signed_base() {
        let arena = Arena::new();
        let handler = Handler::new();
        let v = vector_of(lex_one(&arena, &handler, "8'shFF"));
        assert!(v.signed);
        assert_eq!(v.value, 0xFF);
    }

    #[test]
    fn test_unsized_based() {
        let arena = Arena::new();
        let handler = Handler::new();
        let v = vector_of(lex_one(&arena, &handler, "'hdead_beef"));
        assert_eq!(v.width, 32);
        assert_eq!(v.value, 0xdead_beef);
    }

    #[test]
    fn test_size_with_space() {
        let arena = Arena::new();
        let handler = Handler::new();
        let t = lex_one(&arena, &handler, "16 'hABCD");
        let v = vector_of(t);
        assert_eq!(v.width, 16);
        assert_eq!(v.value, 0xABCD);
        assert_eq!(t.raw(), "16 'hABCD");
    }

    #[test]
    fn test_question_mark_is_z() {
        let arena = Arena::new();
        let handler = Handler::new();
        let v = vector_of(lex_one(&arena, &handler, "2'b1?"));
        assert_eq!(v.value, 0b11);
        assert_eq!(v.xz, 0b01);
    }

    #[test]
    fn test_invalid_digit_diagnosed_not_fatal() {
        let arena = Arena::new();
        let handler = Handler::new();
        let v = vector_of(lex_one(&arena, &handler, "3'o9"));
        assert!(handler.has_errors());
        // Scan continued; the literal is degraded but present.
        assert_eq!(v.width, 3);
    }

    #[test]
    fn test_missing_digits_diagnosed() {
        let arena = Arena::new();
        let handler = Handler::new();
        let v = vector_of(lex_one(&arena, &handler, "4'b"));
        assert!(handler.has_errors());
        assert_eq!(v.value, 0);
    }

    #[test]
    fn test_leading_underscore_diagnosed() {
        let arena = Arena::new();
        let handler = Handler::new();
        let _ = lex_one(&arena, &handler, "4'b_101");
        assert!(handler.has_errors());
    }

    #[test]
    fn test_unbased_unsized() {
        let arena = Arena::new();
        let handler = Handler::new();
        let t = lex_one(&arena, &handler, "'1");
        assert_eq!(t.kind(), TokenKind::UnbasedUnsizedLiteral);
        let v = vector_of(t);
        assert_eq!((v.width, v.value, v.xz), (1, 1, 0));

        let t = lex_one(&arena, &handler, "'x");
        let v = vector_of(t);
        assert_eq!((v.value, v.xz), (0, 1));
    }

    #[test]
    fn test_real_literal() {
        let arena = Arena::new();
        let handler = Handler::new();
        let t = lex_one(&arena, &handler, "3.14");
        assert_eq!(t.kind(), TokenKind::RealLiteral);
        assert_eq!(t.value(), TokenValue::Real(3.14));
    }

    #[test]
    fn test_real_exponent() {
        let arena = Arena::new();
        let handler = Handler::new();
        let t = lex_one(&arena, &handler, "2.5e-3");
        assert_eq!(t.value(), TokenValue::Real(2.5e-3));
    }

    #[test]
    fn test_time_literal() {
        let arena = Arena::new();
        let handler = Handler::new();
        let t = lex_one(&arena, &handler, "100ns");
        assert_eq!(t.kind(), TokenKind::TimeLiteral);
        assert_eq!(t.value(), TokenValue::Time(100.0, TimeUnit::Nanoseconds));
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_time_magnitude_restricted() {
        let arena = Arena::new();
        let handler = Handler::new();
        let t = lex_one(&arena, &handler, "25ns");
        assert_eq!(t.kind(), TokenKind::TimeLiteral);
        assert!(handler.has_errors());
    }

    #[test]
    fn test_time_suffix_not_identifier() {
        let arena = Arena::new();
        let handler = Handler::new();
        let t = lex_one(&arena, &handler, "10next");
        // `next` is a following identifier, not a time suffix.
        assert_eq!(t.kind(), TokenKind::IntegerLiteral);
        assert_eq!(t.raw(), "10");
    }

    #[test]
    fn test_apostrophe_brace() {
        let arena = Arena::new();
        let handler = Handler::new();
        let t = lex_one(&arena, &handler, "'{0, 1}");
        assert_eq!(t.kind(), TokenKind::ApostropheLBrace);
    }

    #[test]
    fn test_lone_apostrophe_cast() {
        let arena = Arena::new();
        let handler = Handler::new();
        let t = lex_one(&arena, &handler, "'(x)");
        assert_eq!(t.kind(), TokenKind::Apostrophe);
    }
}
