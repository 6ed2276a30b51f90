//! svfc-par - Recursive-descent SystemVerilog parser.
//!
//! Consumes the preprocessed token stream and produces a concrete syntax
//! tree ([`ast`]) in the compilation unit's arena. Expression parsing is a
//! Pratt loop over the SystemVerilog precedence ladder ([`expr::bp`]).
//!
//! The parser is total: every entry point returns a tree even for garbage
//! input. On an unexpected token it reports a diagnostic, synthesizes a
//! zero-width `missing` token of the expected kind, and, where a
//! production cannot make progress, resynchronizes by skipping to a
//! follow-set member (`;`, `end`, `endmodule`, a closing brace). Skipped
//! text is preserved as `SkippedTokens` trivia so reconstruction of the
//! source stays lossless through recovery.
//!
//! Grammar disambiguation (`is_hierarchy_instantiation` and friends) uses
//! a virtual cursor over the preprocessor's peek window and never
//! consumes tokens; where the four-token horizon cannot decide, the
//! predicates err toward the more permissive production.

pub mod ast;
mod expr;
mod items;
mod stmt;
mod types;

#[cfg(test)]
mod edge_cases;

use svfc_lex::{Token, TokenKind, Trivia, TriviaKind};
use svfc_pre::Preprocessor;
use svfc_util::{Arena, DiagnosticCode, Handler, Span};

use ast::{
    CompilationUnit, ExpressionSyntax, ModuleDeclaration, SeparatedList, StatementSyntax,
    TokenOrSyntax,
};

/// The parser. Single-instance, single-threaded; holds the preprocessor
/// it drains and the arena its nodes go to.
pub struct Parser<'a> {
    pp: Preprocessor<'a>,
    pub(crate) arena: &'a Arena,
    pub(crate) handler: &'a Handler,
    /// Skipped-token trivia awaiting attachment to the next consumed
    /// token.
    recovery_trivia: Vec<Trivia<'a>>,
}

impl<'a> Parser<'a> {
    pub fn new(arena: &'a Arena, handler: &'a Handler, preprocessor: Preprocessor<'a>) -> Self {
        Self {
            pp: preprocessor,
            arena,
            handler,
            recovery_trivia: Vec::new(),
        }
    }

    // ==================================================================
    // Entry points
    // ==================================================================

    /// Parses a whole source unit: a sequence of module declarations.
    pub fn parse_compilation_unit(&mut self) -> &'a CompilationUnit<'a> {
        let mut modules = Vec::new();

        loop {
            match self.kind() {
                TokenKind::EndOfFile => break,
                TokenKind::Module | TokenKind::Macromodule => {
                    modules.push(self.parse_module());
                }
                _ => {
                    let token = self.current();
                    self.handler.report(
                        DiagnosticCode::E_PAR_EXPECTED_MEMBER,
                        token.span(),
                        format!(
                            "expected a module declaration, found '{}'",
                            describe(&token)
                        ),
                    );
                    self.resynchronize(&[TokenKind::Module, TokenKind::Macromodule]);
                }
            }
        }

        let eof = self.consume();
        self.alloc(CompilationUnit {
            modules: self.arena.alloc_slice(&modules),
            eof,
        })
    }

    /// Parses one module declaration. See `items.rs` for the grammar.
    pub fn parse_module(&mut self) -> &'a ModuleDeclaration<'a> {
        self.parse_module_declaration()
    }

    /// Parses a standalone expression.
    pub fn parse_expression(&mut self) -> ExpressionSyntax<'a> {
        self.parse_subexpression(expr::bp::MIN)
    }

    /// Parses a standalone statement.
    pub fn parse_statement(&mut self) -> StatementSyntax<'a> {
        self.parse_statement_inner()
    }

    /// Diagnostics handler, for callers that share it.
    pub fn handler(&self) -> &'a Handler {
        self.handler
    }

    // ==================================================================
    // Token plumbing
    // ==================================================================

    #[inline]
    pub(crate) fn current(&mut self) -> Token<'a> {
        self.pp.peek(0)
    }

    #[inline]
    pub(crate) fn kind(&mut self) -> TokenKind {
        self.pp.peek(0).kind()
    }

    #[inline]
    pub(crate) fn kind_at(&mut self, n: usize) -> TokenKind {
        self.pp.peek(n).kind()
    }

    #[inline]
    pub(crate) fn at(&mut self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    /// Consumes the next token, attaching any pending recovery trivia.
    pub(crate) fn consume(&mut self) -> Token<'a> {
        let token = self.pp.consume();
        if self.recovery_trivia.is_empty() {
            return token;
        }
        let mut combined = std::mem::take(&mut self.recovery_trivia);
        combined.extend_from_slice(token.trivia());
        token.with_trivia(self.arena.alloc_slice(&combined))
    }

    /// Consumes the next token if it has the given kind.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> Option<Token<'a>> {
        if self.at(kind) {
            Some(self.consume())
        } else {
            None
        }
    }

    /// Consumes a token of `kind`, or diagnoses and synthesizes a missing
    /// one at the current location.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> Token<'a> {
        if self.at(kind) {
            return self.consume();
        }

        let current = self.current();
        self.handler.report(
            DiagnosticCode::E_PAR_EXPECTED_TOKEN,
            Span::point(current.span().file, current.span().start),
            format!(
                "expected '{}', found '{}'",
                kind.text().unwrap_or("identifier"),
                describe(&current)
            ),
        );
        Token::missing(kind, current.span())
    }

    /// Skips tokens until a follow-set member or end of file. The skipped
    /// text becomes `SkippedTokens` trivia on the next consumed token.
    pub(crate) fn resynchronize(&mut self, follow: &[TokenKind]) {
        let mut skipped = String::new();
        loop {
            let token = self.current();
            if token.is_eof() || follow.contains(&token.kind()) {
                break;
            }
            let token = self.pp.consume();
            token.write_to(&mut skipped);
        }

        if !skipped.is_empty() {
            self.recovery_trivia.push(Trivia::new(
                TriviaKind::SkippedTokens,
                self.arena.alloc_str(&skipped),
            ));
        }
    }

    /// Last-resort progress guarantee for list loops: when an item parse
    /// consumed nothing, drop the offending token into skipped trivia.
    pub(crate) fn force_progress(&mut self, before: Span) {
        let current = self.current();
        if current.span() == before && !current.is_eof() {
            let token = self.pp.consume();
            let mut skipped = String::new();
            token.write_to(&mut skipped);
            self.recovery_trivia.push(Trivia::new(
                TriviaKind::SkippedTokens,
                self.arena.alloc_str(&skipped),
            ));
        }
    }

    #[inline]
    pub(crate) fn alloc<T>(&self, value: T) -> &'a T {
        self.arena.alloc(value)
    }

    pub(crate) fn separated_list<T: Copy>(
        &self,
        elements: Vec<TokenOrSyntax<'a, T>>,
    ) -> SeparatedList<'a, T> {
        SeparatedList {
            elements: self.arena.alloc_slice(&elements),
        }
    }

    // ==================================================================
    // Speculative lookahead
    // ==================================================================
    //
    // These predicates inspect the peek window through a virtual index
    // and never consume tokens. Past the horizon they err toward the
    // more permissive production.

    /// `input|output|inout|ref ...` port declaration ahead.
    pub(crate) fn is_port_declaration(&mut self) -> bool {
        matches!(
            self.kind(),
            TokenKind::Input | TokenKind::Output | TokenKind::Inout | TokenKind::Ref
        )
    }

    /// A net declaration (`wire`-family keyword) ahead.
    pub(crate) fn is_net_declaration(&mut self) -> bool {
        is_net_type(self.kind())
    }

    /// A variable declaration ahead: a data-type keyword, a qualifier, or
    /// `Type name` followed by something that cannot start an instance.
    pub(crate) fn is_variable_declaration(&mut self) -> bool {
        let kind = self.kind();
        if is_data_type_keyword(kind) || is_variable_qualifier(kind) {
            return true;
        }
        if kind != TokenKind::Identifier {
            return false;
        }

        let mut index = 0;
        if !self.scan_qualified_name(&mut index) {
            return false;
        }
        if self.kind_at(index) != TokenKind::Identifier {
            return false;
        }
        index += 1;
        match self.kind_at(index) {
            TokenKind::Semicolon | TokenKind::Comma | TokenKind::Equals => true,
            // Unpacked dimensions on the declarator; accept whatever the
            // horizon shows.
            TokenKind::LBracket => self.scan_dimension_list(&mut index),
            _ => false,
        }
    }

    /// `Type inst (` or `Type #(...)` instantiation ahead.
    pub(crate) fn is_hierarchy_instantiation(&mut self) -> bool {
        if self.kind() != TokenKind::Identifier {
            return false;
        }

        let mut index = 0;
        if !self.scan_qualified_name(&mut index) {
            return false;
        }
        if self.kind_at(index) == TokenKind::Hash {
            return true;
        }
        if self.kind_at(index) != TokenKind::Identifier {
            return false;
        }
        index += 1;
        self.kind_at(index) == TokenKind::LParen
    }

    /// At the start of a port list: a 1995-style plain port name.
    pub(crate) fn is_non_ansi_port(&mut self) -> bool {
        self.is_plain_port_name()
    }

    /// `name ,` or `name )` in a port-list position.
    pub(crate) fn is_plain_port_name(&mut self) -> bool {
        self.kind() == TokenKind::Identifier
            && matches!(self.kind_at(1), TokenKind::Comma | TokenKind::RParen)
    }

    /// Advances `index` over `name(::name|.name)*`. Never consumes.
    pub(crate) fn scan_qualified_name(&mut self, index: &mut usize) -> bool {
        if self.kind_at(*index) != TokenKind::Identifier {
            return false;
        }
        *index += 1;

        while *index + 1 < Preprocessor::PEEK_WINDOW {
            match self.kind_at(*index) {
                TokenKind::ColonColon | TokenKind::Dot
                    if self.kind_at(*index + 1) == TokenKind::Identifier =>
                {
                    *index += 2;
                }
                _ => break,
            }
        }
        true
    }

    /// Advances `index` over `[...]` groups. Returns true (permissive)
    /// when the horizon is reached mid-dimension.
    pub(crate) fn scan_dimension_list(&mut self, index: &mut usize) -> bool {
        while self.kind_at(*index) == TokenKind::LBracket {
            let mut depth = 0usize;
            loop {
                if *index >= Preprocessor::PEEK_WINDOW {
                    return true;
                }
                match self.kind_at(*index) {
                    TokenKind::LBracket => depth += 1,
                    TokenKind::RBracket => {
                        depth -= 1;
                        if depth == 0 {
                            *index += 1;
                            break;
                        }
                    }
                    TokenKind::EndOfFile => return false,
                    _ => {}
                }
                *index += 1;
            }
        }
        true
    }
}

/// Keywords that declare nets.
pub(crate) fn is_net_type(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Wire
            | TokenKind::Uwire
            | TokenKind::Tri
            | TokenKind::Tri0
            | TokenKind::Tri1
            | TokenKind::Triand
            | TokenKind::Trior
            | TokenKind::Trireg
            | TokenKind::Wand
            | TokenKind::Wor
            | TokenKind::Supply0
            | TokenKind::Supply1
    )
}

/// Keywords that begin a built-in data type.
pub(crate) fn is_data_type_keyword(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Logic
            | TokenKind::Reg
            | TokenKind::Bit
            | TokenKind::Byte
            | TokenKind::Shortint
            | TokenKind::Int
            | TokenKind::Longint
            | TokenKind::Integer
            | TokenKind::Time
            | TokenKind::Real
            | TokenKind::Shortreal
            | TokenKind::Realtime
            | TokenKind::String
            | TokenKind::Event
            | TokenKind::Void
    )
}

pub(crate) fn is_variable_qualifier(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Var
            | TokenKind::Const
            | TokenKind::Automatic
            | TokenKind::Static
            | TokenKind::Rand
            | TokenKind::Randc
    )
}

/// Human-readable token description for diagnostics.
pub(crate) fn describe(token: &Token<'_>) -> String {
    if token.is_eof() {
        "end of file".to_string()
    } else {
        token.display_text().to_string()
    }
}
