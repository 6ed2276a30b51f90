//! Diagnostic codes for the front end.
//!
//! Codes follow `{prefix}{number}` with "E" for errors and "W" for
//! warnings. Numbers are partitioned by pipeline stage so a code alone
//! tells you where a problem was discovered:
//!
//! - E1xxx lexer
//! - E2xxx preprocessor
//! - E3xxx parser
//! - E4xxx binder

/// A unique code identifying a diagnostic message.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagnosticCode {
    /// The prefix ("E" for error, "W" for warning).
    pub prefix: &'static str,
    /// The numeric identifier.
    pub number: u32,
}

impl DiagnosticCode {
    #[inline]
    pub const fn new(prefix: &'static str, number: u32) -> Self {
        Self { prefix, number }
    }

    #[inline]
    pub const fn prefix(&self) -> &'static str {
        self.prefix
    }

    #[inline]
    pub const fn number(&self) -> u32 {
        self.number
    }

    /// Full code string, e.g. "E1002".
    pub fn as_str(&self) -> String {
        format!("{}{:04}", self.prefix, self.number)
    }

    // =========================================================================
    // LEXER (E1xxx)
    // =========================================================================

    /// E1001: Unknown character in input
    pub const E_LEX_UNKNOWN_CHAR: Self = Self::new("E", 1001);
    /// E1002: Unterminated string literal
    pub const E_LEX_UNTERMINATED_STRING: Self = Self::new("E", 1002);
    /// E1003: Digit not valid for the literal's base
    pub const E_LEX_INVALID_DIGIT: Self = Self::new("E", 1003);
    /// E1004: Based literal with no digits after the base specifier
    pub const E_LEX_MISSING_DIGITS: Self = Self::new("E", 1004);
    /// E1005: Time literal magnitude is not 1, 10, or 100
    pub const E_LEX_INVALID_TIME_MAGNITUDE: Self = Self::new("E", 1005);
    /// E1006: Invalid escape sequence in string literal
    pub const E_LEX_INVALID_ESCAPE: Self = Self::new("E", 1006);
    /// E1007: Misplaced underscore separator in numeric literal
    pub const E_LEX_MISPLACED_UNDERSCORE: Self = Self::new("E", 1007);
    /// E1008: Escaped identifier with no characters
    pub const E_LEX_EMPTY_ESCAPED_IDENT: Self = Self::new("E", 1008);
    /// E1009: Unterminated block comment
    pub const E_LEX_UNTERMINATED_COMMENT: Self = Self::new("E", 1009);

    // =========================================================================
    // PREPROCESSOR (E2xxx / W2xxx)
    // =========================================================================

    /// E2001: Unknown compiler directive
    pub const E_PP_UNKNOWN_DIRECTIVE: Self = Self::new("E", 2001);
    /// E2002: `else`/`elsif`/`endif` without a matching `ifdef`
    pub const E_PP_UNBALANCED_CONDITIONAL: Self = Self::new("E", 2002);
    /// E2003: Conditional block still open at end of input
    pub const E_PP_UNTERMINATED_CONDITIONAL: Self = Self::new("E", 2003);
    /// E2004: Wrong number of arguments in macro invocation
    pub const E_PP_MACRO_ARITY: Self = Self::new("E", 2004);
    /// E2005: Function-like macro used without an argument list
    pub const E_PP_MACRO_NEEDS_ARGS: Self = Self::new("E", 2005);
    /// E2006: Usage of an undefined macro
    pub const E_PP_UNDEFINED_MACRO: Self = Self::new("E", 2006);
    /// E2007: Include file cycle
    pub const E_PP_INCLUDE_CYCLE: Self = Self::new("E", 2007);
    /// E2008: Include file not found
    pub const E_PP_INCLUDE_NOT_FOUND: Self = Self::new("E", 2008);
    /// E2009: Malformed include filename
    pub const E_PP_BAD_INCLUDE_FILENAME: Self = Self::new("E", 2009);
    /// E2010: Directive requires a macro name
    pub const E_PP_EXPECTED_MACRO_NAME: Self = Self::new("E", 2010);
    /// E2011: Include nesting exceeds the configured limit
    pub const E_PP_INCLUDE_TOO_DEEP: Self = Self::new("E", 2011);
    /// E2012: `elsif`/`else` after the conditional already saw `else`
    pub const E_PP_ELSE_AFTER_ELSE: Self = Self::new("E", 2012);
    /// E2013: Malformed `timescale` specification
    pub const E_PP_BAD_TIMESCALE: Self = Self::new("E", 2013);
    /// E2014: Unknown net type in `default_nettype`
    pub const E_PP_BAD_NETTYPE: Self = Self::new("E", 2014);
    /// E2015: `end_keywords` without matching `begin_keywords`
    pub const E_PP_UNBALANCED_KEYWORDS: Self = Self::new("E", 2015);
    /// E2016: Stringification left unterminated in macro body
    pub const E_PP_UNTERMINATED_STRINGIFICATION: Self = Self::new("E", 2016);
    /// E2017: Malformed `line directive
    pub const E_PP_BAD_LINE_DIRECTIVE: Self = Self::new("E", 2017);
    /// W2001: Macro redefined
    pub const W_PP_MACRO_REDEFINED: Self = Self::new("W", 2001);

    // =========================================================================
    // PARSER (E3xxx)
    // =========================================================================

    /// E3001: Expected a specific token
    pub const E_PAR_EXPECTED_TOKEN: Self = Self::new("E", 3001);
    /// E3002: Unexpected token
    pub const E_PAR_UNEXPECTED_TOKEN: Self = Self::new("E", 3002);
    /// E3003: Expected an expression
    pub const E_PAR_EXPECTED_EXPRESSION: Self = Self::new("E", 3003);
    /// E3004: Expected a statement
    pub const E_PAR_EXPECTED_STATEMENT: Self = Self::new("E", 3004);
    /// E3005: Expected a module item
    pub const E_PAR_EXPECTED_MEMBER: Self = Self::new("E", 3005);
    /// E3006: Expected a constraint item
    pub const E_PAR_EXPECTED_CONSTRAINT: Self = Self::new("E", 3006);

    // =========================================================================
    // BINDER (E4xxx)
    // =========================================================================

    /// E4001: Use of an undeclared name
    pub const E_SEM_UNDECLARED: Self = Self::new("E", 4001);
    /// E4002: Operand types are incompatible
    pub const E_SEM_TYPE_MISMATCH: Self = Self::new("E", 4002);
    /// E4003: Expression is not a valid constraint
    pub const E_SEM_INVALID_CONSTRAINT: Self = Self::new("E", 4003);
    /// E4004: Expression is not constant where one is required
    pub const E_SEM_NOT_CONSTANT: Self = Self::new("E", 4004);
    /// E4005: Name declared more than once in a scope
    pub const E_SEM_DUPLICATE: Self = Self::new("E", 4005);
    /// E4006: Assignment target cannot be assigned
    pub const E_SEM_BAD_ASSIGNMENT: Self = Self::new("E", 4006);
}

impl std::fmt::Debug for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DiagnosticCode({})", self.as_str())
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str() {
        assert_eq!(DiagnosticCode::E_LEX_UNKNOWN_CHAR.as_str(), "E1001");
        assert_eq!(DiagnosticCode::W_PP_MACRO_REDEFINED.as_str(), "W2001");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            format!("{}", DiagnosticCode::E_PAR_EXPECTED_TOKEN),
            "E3001"
        );
    }

    #[test]
    fn test_equality() {
        assert_eq!(
            DiagnosticCode::E_SEM_UNDECLARED,
            DiagnosticCode::new("E", 4001)
        );
        assert_ne!(
            DiagnosticCode::E_SEM_UNDECLARED,
            DiagnosticCode::E_SEM_TYPE_MISMATCH
        );
    }

    #[test]
    fn test_stage_partitioning() {
        assert!(DiagnosticCode::E_LEX_INVALID_DIGIT.number() < 2000);
        assert!(DiagnosticCode::E_PP_MACRO_ARITY.number() < 3000);
        assert!(DiagnosticCode::E_PAR_EXPECTED_TOKEN.number() < 4000);
        assert!(DiagnosticCode::E_SEM_UNDECLARED.number() >= 4000);
    }
}
