//! Expression parsing using a Pratt loop over the SystemVerilog operator
//! precedence ladder.
//!
//! # Precedence (lowest to highest)
//!
//! | Level | Operators | Associativity |
//! |-------|-----------|---------------|
//! | 1 | `?:` | Right |
//! | 2 | `\|\|` | Left |
//! | 3 | `&&` | Left |
//! | 4 | `\|` | Left |
//! | 5 | `^`, `^~`, `~^` | Left |
//! | 6 | `&` | Left |
//! | 7 | `==`, `!=`, `===`, `!==`, `==?`, `!=?` | Left |
//! | 8 | `<`, `<=`, `>`, `>=`, `inside` | Left |
//! | 9 | `<<`, `>>`, `<<<`, `>>>` | Left |
//! | 10 | `+`, `-` | Left |
//! | 11 | `*`, `/`, `%` | Left |
//! | 12 | `**` | Right |
//! | 13 | unary operators | Prefix |
//! | 14 | `[]`, `.`, `::`, call, `++`, `--` | Postfix |
//!
//! Right-associative operators recurse with `precedence - 1`.

use svfc_lex::TokenKind;
use svfc_util::DiagnosticCode;

use crate::ast::*;
use crate::{describe, Parser};

/// Binding power levels; higher binds tighter.
pub mod bp {
    pub const MIN: u8 = 0;
    pub const CONDITIONAL: u8 = 2;
    pub const LOGICAL_OR: u8 = 4;
    pub const LOGICAL_AND: u8 = 6;
    pub const BITWISE_OR: u8 = 8;
    pub const BITWISE_XOR: u8 = 10;
    pub const BITWISE_AND: u8 = 12;
    pub const EQUALITY: u8 = 14;
    pub const RELATIONAL: u8 = 16;
    pub const SHIFT: u8 = 18;
    pub const ADDITIVE: u8 = 20;
    pub const MULTIPLICATIVE: u8 = 22;
    pub const POWER: u8 = 24;
    pub const UNARY: u8 = 26;
}

/// `(left bp, right bp)` for an infix operator; `None` for non-operators.
fn infix_binding_power(kind: TokenKind) -> Option<(u8, u8)> {
    use TokenKind::*;
    Some(match kind {
        DoublePipe => (bp::LOGICAL_OR, bp::LOGICAL_OR + 1),
        DoubleAmp => (bp::LOGICAL_AND, bp::LOGICAL_AND + 1),
        Pipe => (bp::BITWISE_OR, bp::BITWISE_OR + 1),
        Caret | CaretTilde | TildeCaret => (bp::BITWISE_XOR, bp::BITWISE_XOR + 1),
        Amp => (bp::BITWISE_AND, bp::BITWISE_AND + 1),
        DoubleEquals | NotEquals | CaseEquals | CaseNotEquals | WildcardEquals
        | WildcardNotEquals => (bp::EQUALITY, bp::EQUALITY + 1),
        Lt | Lte | Gt | Gte => (bp::RELATIONAL, bp::RELATIONAL + 1),
        Shl | Shr | Ashl | Ashr => (bp::SHIFT, bp::SHIFT + 1),
        Plus | Minus => (bp::ADDITIVE, bp::ADDITIVE + 1),
        Star | Slash | Percent => (bp::MULTIPLICATIVE, bp::MULTIPLICATIVE + 1),
        // Right-associative.
        DoubleStar => (bp::POWER, bp::POWER - 1),
        _ => return None,
    })
}

fn is_unary_op(kind: TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        kind,
        Plus | Minus
            | Bang
            | Tilde
            | Amp
            | TildeAmp
            | Pipe
            | TildePipe
            | Caret
            | TildeCaret
            | CaretTilde
            | PlusPlus
            | MinusMinus
    )
}

impl<'a> Parser<'a> {
    /// Pratt entry: parses an expression no looser than `min_bp`.
    pub(crate) fn parse_subexpression(&mut self, min_bp: u8) -> ExpressionSyntax<'a> {
        let lhs = self.parse_prefix();
        self.parse_expression_rest(lhs, min_bp)
    }

    /// Continues the Pratt loop from an already-parsed left operand.
    pub(crate) fn parse_expression_rest(
        &mut self,
        mut lhs: ExpressionSyntax<'a>,
        min_bp: u8,
    ) -> ExpressionSyntax<'a> {
        loop {
            let kind = self.kind();

            // Conditional operator, right-associative and lowest.
            if kind == TokenKind::Question && bp::CONDITIONAL >= min_bp {
                let question = self.consume();
                let true_expr = self.parse_subexpression(bp::MIN);
                let colon = self.expect(TokenKind::Colon);
                let false_expr = self.parse_subexpression(bp::CONDITIONAL - 1);
                lhs = ExpressionSyntax::Conditional(self.alloc(ConditionalExpr {
                    condition: lhs,
                    question,
                    true_expr,
                    colon,
                    false_expr,
                }));
                continue;
            }

            // Set membership binds like a relational operator.
            if kind == TokenKind::Inside && bp::RELATIONAL >= min_bp {
                lhs = self.parse_inside_rest(lhs);
                continue;
            }

            let Some((lbp, rbp)) = infix_binding_power(kind) else {
                break;
            };
            if lbp < min_bp {
                break;
            }

            let op = self.consume();
            let right = self.parse_subexpression(rbp);
            lhs = ExpressionSyntax::Binary(self.alloc(BinaryExpr {
                left: lhs,
                op,
                right,
            }));
        }

        lhs
    }

    /// A prefix-unary chain, then a primary with its postfix operators.
    pub(crate) fn parse_prefix(&mut self) -> ExpressionSyntax<'a> {
        if is_unary_op(self.kind()) {
            let op = self.consume();
            let operand = self.parse_prefix();
            return ExpressionSyntax::Unary(self.alloc(UnaryExpr { op, operand }));
        }
        self.parse_primary_with_postfix()
    }

    fn parse_primary_with_postfix(&mut self) -> ExpressionSyntax<'a> {
        let mut expr = self.parse_primary();

        loop {
            match self.kind() {
                TokenKind::LBracket => {
                    let open = self.consume();
                    let first = self.parse_expression();
                    match self.kind() {
                        TokenKind::Colon | TokenKind::PlusColon | TokenKind::MinusColon => {
                            let kind = self.consume();
                            let right = self.parse_expression();
                            let close = self.expect(TokenKind::RBracket);
                            expr = ExpressionSyntax::RangeSelect(self.alloc(RangeSelectExpr {
                                expr,
                                open,
                                left: first,
                                kind,
                                right,
                                close,
                            }));
                        }
                        _ => {
                            let close = self.expect(TokenKind::RBracket);
                            expr = ExpressionSyntax::ElementSelect(self.alloc(ElementSelectExpr {
                                expr,
                                open,
                                index: first,
                                close,
                            }));
                        }
                    }
                }
                TokenKind::Dot | TokenKind::ColonColon => {
                    let separator = self.consume();
                    let name = self.expect(TokenKind::Identifier);
                    expr = ExpressionSyntax::MemberAccess(self.alloc(MemberAccessExpr {
                        expr,
                        separator,
                        name,
                    }));
                }
                TokenKind::LParen => {
                    // Calls apply to name-like callees only; a paren after
                    // anything else starts a new construct.
                    if !matches!(
                        expr,
                        ExpressionSyntax::Name(_) | ExpressionSyntax::MemberAccess(_)
                    ) {
                        break;
                    }
                    let open = self.consume();
                    let args = self.parse_call_args();
                    let close = self.expect(TokenKind::RParen);
                    expr = ExpressionSyntax::Call(self.alloc(CallExpr {
                        callee: expr,
                        open,
                        args,
                        close,
                    }));
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let op = self.consume();
                    expr = ExpressionSyntax::PostfixUnary(
                        self.alloc(PostfixUnaryExpr { operand: expr, op }),
                    );
                }
                _ => break,
            }
        }

        expr
    }

    fn parse_primary(&mut self) -> ExpressionSyntax<'a> {
        use TokenKind::*;
        match self.kind() {
            IntegerLiteral | UnbasedUnsizedLiteral | RealLiteral | TimeLiteral
            | StringLiteral | Null | This => {
                let token = self.consume();
                ExpressionSyntax::Literal(self.alloc(LiteralExpr { token }))
            }
            Identifier | SystemIdentifier => {
                let token = self.consume();
                ExpressionSyntax::Name(self.alloc(NameSyntax { token }))
            }
            LParen => {
                let open = self.consume();
                let first = self.parse_expression();
                if self.at(Colon) {
                    // min:typ:max inside parentheses.
                    let colon1 = self.consume();
                    let typ = self.parse_expression();
                    let colon2 = self.expect(Colon);
                    let max = self.parse_expression();
                    let mtm = ExpressionSyntax::MinTypMax(self.alloc(MinTypMaxExpr {
                        first,
                        colon1,
                        typ,
                        colon2,
                        max,
                    }));
                    let close = self.expect(RParen);
                    return ExpressionSyntax::Paren(self.alloc(ParenExpr {
                        open,
                        expr: mtm,
                        close,
                    }));
                }
                let close = self.expect(RParen);
                ExpressionSyntax::Paren(self.alloc(ParenExpr {
                    open,
                    expr: first,
                    close,
                }))
            }
            LBrace => self.parse_concatenation_or_replication(),
            _ => {
                let current = self.current();
                self.handler.report(
                    DiagnosticCode::E_PAR_EXPECTED_EXPRESSION,
                    current.span(),
                    format!("expected an expression, found '{}'", describe(&current)),
                );
                let missing = svfc_lex::Token::missing(Identifier, current.span());
                ExpressionSyntax::Name(self.alloc(NameSyntax { token: missing }))
            }
        }
    }

    /// `{a, b}` concatenation or `{n{a, b}}` replication.
    fn parse_concatenation_or_replication(&mut self) -> ExpressionSyntax<'a> {
        let open = self.consume();

        if self.at(TokenKind::RBrace) {
            // `{}` is not a valid expression; diagnose but keep the node.
            let current = self.current();
            self.handler.report(
                DiagnosticCode::E_PAR_EXPECTED_EXPRESSION,
                current.span(),
                "concatenation cannot be empty",
            );
            let close = self.consume();
            return ExpressionSyntax::Concatenation(self.alloc(ConcatenationExpr {
                open,
                elements: SeparatedList::EMPTY,
                close,
            }));
        }

        let first = self.parse_expression();

        if self.at(TokenKind::LBrace) {
            // Replication: the first expression was the count.
            let inner = self.parse_inner_concatenation();
            let close = self.expect(TokenKind::RBrace);
            return ExpressionSyntax::Replication(self.alloc(ReplicationExpr {
                open,
                count: first,
                inner,
                close,
            }));
        }

        let mut elements = vec![TokenOrSyntax::Syntax(&*self.alloc(first))];
        while let Some(comma) = self.eat(TokenKind::Comma) {
            elements.push(TokenOrSyntax::Token(comma));
            let next = self.parse_expression();
            elements.push(TokenOrSyntax::Syntax(&*self.alloc(next)));
        }
        let close = self.expect(TokenKind::RBrace);
        ExpressionSyntax::Concatenation(self.alloc(ConcatenationExpr {
            open,
            elements: self.separated_list(elements),
            close,
        }))
    }

    fn parse_inner_concatenation(&mut self) -> &'a ConcatenationExpr<'a> {
        let open = self.consume();
        let mut elements = Vec::new();
        if !self.at(TokenKind::RBrace) {
            loop {
                let expr = self.parse_expression();
                elements.push(TokenOrSyntax::Syntax(&*self.alloc(expr)));
                match self.eat(TokenKind::Comma) {
                    Some(comma) => elements.push(TokenOrSyntax::Token(comma)),
                    None => break,
                }
            }
        }
        let close = self.expect(TokenKind::RBrace);
        self.alloc(ConcatenationExpr {
            open,
            elements: self.separated_list(elements),
            close,
        })
    }

    /// `lhs inside { range, ... }`.
    fn parse_inside_rest(&mut self, lhs: ExpressionSyntax<'a>) -> ExpressionSyntax<'a> {
        let inside_keyword = self.consume();
        let open = self.expect(TokenKind::LBrace);

        let mut elements = Vec::new();
        if !self.at(TokenKind::RBrace) {
            loop {
                let range = self.parse_value_range();
                elements.push(TokenOrSyntax::Syntax(&*self.alloc(range)));
                match self.eat(TokenKind::Comma) {
                    Some(comma) => elements.push(TokenOrSyntax::Token(comma)),
                    None => break,
                }
            }
        }

        let close = self.expect(TokenKind::RBrace);
        ExpressionSyntax::Inside(self.alloc(InsideExpr {
            expr: lhs,
            inside_keyword,
            open,
            ranges: self.separated_list(elements),
            close,
        }))
    }

    fn parse_value_range(&mut self) -> ValueRangeSyntax<'a> {
        if self.at(TokenKind::LBracket) {
            let open = self.consume();
            let left = self.parse_expression();
            let colon = self.expect(TokenKind::Colon);
            let right = self.parse_expression();
            let close = self.expect(TokenKind::RBracket);
            return ValueRangeSyntax::Range(self.alloc(ValueRange {
                open,
                left,
                colon,
                right,
                close,
            }));
        }
        ValueRangeSyntax::Single(self.parse_expression())
    }

    pub(crate) fn parse_call_args(&mut self) -> SeparatedList<'a, ExpressionSyntax<'a>> {
        let mut elements = Vec::new();
        if !self.at(TokenKind::RParen) && !self.current().is_eof() {
            loop {
                let arg = self.parse_expression();
                elements.push(TokenOrSyntax::Syntax(&*self.alloc(arg)));
                match self.eat(TokenKind::Comma) {
                    Some(comma) => elements.push(TokenOrSyntax::Token(comma)),
                    None => break,
                }
            }
        }
        self.separated_list(elements)
    }
}
