//! Statement parsing.

use svfc_lex::TokenKind;
use svfc_util::DiagnosticCode;

use crate::ast::*;
use crate::{describe, Parser};

impl<'a> Parser<'a> {
    pub(crate) fn parse_statement_inner(&mut self) -> StatementSyntax<'a> {
        use TokenKind::*;
        match self.kind() {
            Begin => self.parse_block_statement(),
            Unique | Unique0 | Priority => {
                let qualifier = self.consume();
                match self.kind() {
                    If => self.parse_conditional_statement(Some(qualifier)),
                    Case | Casex | Casez => self.parse_case_statement(Some(qualifier)),
                    _ => {
                        let current = self.current();
                        self.handler.report(
                            DiagnosticCode::E_PAR_EXPECTED_STATEMENT,
                            current.span(),
                            format!(
                                "expected 'if' or 'case' after '{}'",
                                qualifier.display_text()
                            ),
                        );
                        self.parse_statement_inner()
                    }
                }
            }
            If => self.parse_conditional_statement(None),
            Case | Casex | Casez => self.parse_case_statement(None),
            For => self.parse_for_statement(),
            While => self.parse_while_statement(),
            Do => self.parse_do_while_statement(),
            Forever => {
                let keyword = self.consume();
                let body = self.parse_statement_inner();
                StatementSyntax::Forever(self.alloc(ForeverStmt { keyword, body }))
            }
            Repeat => {
                let keyword = self.consume();
                let open = self.expect(LParen);
                let count = self.parse_expression();
                let close = self.expect(RParen);
                let body = self.parse_statement_inner();
                StatementSyntax::Repeat(self.alloc(RepeatStmt {
                    keyword,
                    open,
                    count,
                    close,
                    body,
                }))
            }
            Hash => {
                let hash = self.consume();
                let expr = self.parse_prefix();
                let control =
                    TimingControlSyntax::Delay(self.alloc(DelayControl { hash, expr }));
                let statement = self.parse_statement_inner();
                StatementSyntax::Timed(self.alloc(TimedStmt { control, statement }))
            }
            At => {
                let control = self.parse_event_control();
                let statement = self.parse_statement_inner();
                StatementSyntax::Timed(self.alloc(TimedStmt { control, statement }))
            }
            Assert | Assume | Cover => self.parse_immediate_assertion(),
            Break | Continue | Return => self.parse_jump_statement(),
            Semicolon => {
                let semi = self.consume();
                StatementSyntax::Empty(self.alloc(EmptyStmt { semi }))
            }
            _ if self.is_variable_declaration() => {
                StatementSyntax::VariableDecl(self.parse_variable_declaration())
            }
            EndOfFile | End | Endmodule | Endcase => {
                // Nothing to parse; synthesize an empty statement so the
                // caller still gets a node.
                let current = self.current();
                self.handler.report(
                    DiagnosticCode::E_PAR_EXPECTED_STATEMENT,
                    current.span(),
                    format!("expected a statement, found '{}'", describe(&current)),
                );
                let semi = svfc_lex::Token::missing(Semicolon, current.span());
                StatementSyntax::Empty(self.alloc(EmptyStmt { semi }))
            }
            _ => {
                let expr = self.parse_statement_expression();
                let semi = self.expect(Semicolon);
                StatementSyntax::Expression(self.alloc(ExpressionStmt { expr, semi }))
            }
        }
    }

    /// An expression in statement position, where `=`, the compound
    /// assignment operators, and nonblocking `<=` bind as assignments.
    pub(crate) fn parse_statement_expression(&mut self) -> ExpressionSyntax<'a> {
        use TokenKind::*;
        let lhs = self.parse_prefix();

        match self.kind() {
            Equals | PlusEquals | MinusEquals | StarEquals | SlashEquals | PercentEquals
            | AmpEquals | PipeEquals | CaretEquals | ShlEquals | ShrEquals | AshlEquals
            | AshrEquals | Lte => {
                let op = self.consume();
                let value = self.parse_expression();
                ExpressionSyntax::Assignment(self.alloc(AssignmentExpr {
                    target: lhs,
                    op,
                    value,
                }))
            }
            _ => self.parse_expression_rest(lhs, crate::expr::bp::MIN),
        }
    }

    fn parse_block_statement(&mut self) -> StatementSyntax<'a> {
        let begin = self.consume();
        let label = self.parse_label();

        let mut items = Vec::new();
        loop {
            match self.kind() {
                // Stop at enclosing terminators too, so a missing `end`
                // does not swallow the rest of the module.
                TokenKind::End
                | TokenKind::Endmodule
                | TokenKind::Endcase
                | TokenKind::EndOfFile => break,
                _ => {
                    let before = self.current().span();
                    items.push(self.parse_statement_inner());
                    self.force_progress(before);
                }
            }
        }

        let end = self.expect(TokenKind::End);
        let end_label = self.parse_label();
        StatementSyntax::Block(self.alloc(BlockStmt {
            begin,
            label,
            items: self.arena.alloc_slice(&items),
            end,
            end_label,
        }))
    }

    fn parse_label(&mut self) -> Option<&'a NamedLabel<'a>> {
        if self.at(TokenKind::Colon) && self.kind_at(1) == TokenKind::Identifier {
            let colon = self.consume();
            let name = self.consume();
            Some(self.alloc(NamedLabel { colon, name }))
        } else {
            None
        }
    }

    fn parse_conditional_statement(
        &mut self,
        qualifier: Option<svfc_lex::Token<'a>>,
    ) -> StatementSyntax<'a> {
        let if_keyword = self.expect(TokenKind::If);
        let open = self.expect(TokenKind::LParen);
        let condition = self.parse_expression();
        let close = self.expect(TokenKind::RParen);
        let then_stmt = self.parse_statement_inner();

        let (else_keyword, else_stmt) = match self.eat(TokenKind::Else) {
            Some(kw) => (Some(kw), Some(self.parse_statement_inner())),
            None => (None, None),
        };

        StatementSyntax::Conditional(self.alloc(ConditionalStmt {
            qualifier,
            if_keyword,
            open,
            condition,
            close,
            then_stmt,
            else_keyword,
            else_stmt,
        }))
    }

    fn parse_case_statement(
        &mut self,
        qualifier: Option<svfc_lex::Token<'a>>,
    ) -> StatementSyntax<'a> {
        let keyword = self.consume();
        let open = self.expect(TokenKind::LParen);
        let expr = self.parse_expression();
        let close = self.expect(TokenKind::RParen);

        let mut items = Vec::new();
        loop {
            match self.kind() {
                TokenKind::Endcase
                | TokenKind::End
                | TokenKind::Endmodule
                | TokenKind::EndOfFile => break,
                _ => {
                    let before = self.current().span();
                    items.push(self.parse_case_item());
                    self.force_progress(before);
                }
            }
        }

        let endcase = self.expect(TokenKind::Endcase);
        StatementSyntax::Case(self.alloc(CaseStmt {
            qualifier,
            keyword,
            open,
            expr,
            close,
            items: self.arena.alloc_slice(&items),
            endcase,
        }))
    }

    fn parse_case_item(&mut self) -> CaseItemSyntax<'a> {
        if let Some(default_keyword) = self.eat(TokenKind::Default) {
            let colon = self.eat(TokenKind::Colon);
            let statement = self.parse_statement_inner();
            return CaseItemSyntax {
                default_keyword: Some(default_keyword),
                expressions: None,
                colon,
                statement,
            };
        }

        let mut elements = Vec::new();
        loop {
            let expr = self.parse_expression();
            elements.push(TokenOrSyntax::Syntax(&*self.alloc(expr)));
            match self.eat(TokenKind::Comma) {
                Some(comma) => elements.push(TokenOrSyntax::Token(comma)),
                None => break,
            }
        }
        let colon = self.expect(TokenKind::Colon);
        let statement = self.parse_statement_inner();
        CaseItemSyntax {
            default_keyword: None,
            expressions: Some(self.separated_list(elements)),
            colon: Some(colon),
            statement,
        }
    }

    fn parse_for_statement(&mut self) -> StatementSyntax<'a> {
        let keyword = self.consume();
        let open = self.expect(TokenKind::LParen);

        let init = if self.is_variable_declaration() {
            ForInit::Declaration(self.parse_variable_declaration())
        } else {
            let mut elements = Vec::new();
            if !self.at(TokenKind::Semicolon) {
                loop {
                    let expr = self.parse_statement_expression();
                    elements.push(TokenOrSyntax::Syntax(&*self.alloc(expr)));
                    match self.eat(TokenKind::Comma) {
                        Some(comma) => elements.push(TokenOrSyntax::Token(comma)),
                        None => break,
                    }
                }
            }
            let semi = self.expect(TokenKind::Semicolon);
            ForInit::Expressions(self.alloc(ForInitExprs {
                exprs: self.separated_list(elements),
                semi,
            }))
        };

        let condition = if self.at(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression())
        };
        let semi2 = self.expect(TokenKind::Semicolon);

        let mut steps = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                let expr = self.parse_statement_expression();
                steps.push(TokenOrSyntax::Syntax(&*self.alloc(expr)));
                match self.eat(TokenKind::Comma) {
                    Some(comma) => steps.push(TokenOrSyntax::Token(comma)),
                    None => break,
                }
            }
        }

        let close = self.expect(TokenKind::RParen);
        let body = self.parse_statement_inner();
        StatementSyntax::For(self.alloc(ForStmt {
            keyword,
            open,
            init,
            condition,
            semi2,
            steps: self.separated_list(steps),
            close,
            body,
        }))
    }

    fn parse_while_statement(&mut self) -> StatementSyntax<'a> {
        let keyword = self.consume();
        let open = self.expect(TokenKind::LParen);
        let condition = self.parse_expression();
        let close = self.expect(TokenKind::RParen);
        let body = self.parse_statement_inner();
        StatementSyntax::While(self.alloc(WhileStmt {
            keyword,
            open,
            condition,
            close,
            body,
        }))
    }

    fn parse_do_while_statement(&mut self) -> StatementSyntax<'a> {
        let do_keyword = self.consume();
        let body = self.parse_statement_inner();
        let while_keyword = self.expect(TokenKind::While);
        let open = self.expect(TokenKind::LParen);
        let condition = self.parse_expression();
        let close = self.expect(TokenKind::RParen);
        let semi = self.expect(TokenKind::Semicolon);
        StatementSyntax::DoWhile(self.alloc(DoWhileStmt {
            do_keyword,
            body,
            while_keyword,
            open,
            condition,
            close,
            semi,
        }))
    }

    fn parse_event_control(&mut self) -> TimingControlSyntax<'a> {
        let at = self.consume();

        let body = match self.kind() {
            TokenKind::Star => EventControlBody::Star(self.consume()),
            TokenKind::Identifier => EventControlBody::Simple(self.consume()),
            TokenKind::LParen => {
                let open = self.consume();
                let mut elements = Vec::new();
                if !self.at(TokenKind::RParen) {
                    loop {
                        let event = self.parse_event_expression();
                        elements.push(TokenOrSyntax::Syntax(&*self.alloc(event)));
                        match self.kind() {
                            TokenKind::Or | TokenKind::Comma => {
                                let sep = self.consume();
                                elements.push(TokenOrSyntax::Token(sep));
                            }
                            _ => break,
                        }
                    }
                }
                let close = self.expect(TokenKind::RParen);
                EventControlBody::Parenthesized {
                    open,
                    events: self.separated_list(elements),
                    close,
                }
            }
            _ => {
                let current = self.current();
                self.handler.report(
                    DiagnosticCode::E_PAR_EXPECTED_TOKEN,
                    current.span(),
                    format!("expected an event expression, found '{}'", describe(&current)),
                );
                EventControlBody::Simple(svfc_lex::Token::missing(
                    TokenKind::Identifier,
                    current.span(),
                ))
            }
        };

        TimingControlSyntax::Event(self.alloc(EventControl { at, body }))
    }

    fn parse_event_expression(&mut self) -> EventExpression<'a> {
        if self.at(TokenKind::Star) {
            return EventExpression {
                edge: None,
                expr: None,
                star: Some(self.consume()),
            };
        }

        let edge = match self.kind() {
            TokenKind::Posedge | TokenKind::Negedge | TokenKind::Edge => Some(self.consume()),
            _ => None,
        };
        let expr = self.parse_expression();
        EventExpression {
            edge,
            expr: Some(expr),
            star: None,
        }
    }

    fn parse_immediate_assertion(&mut self) -> StatementSyntax<'a> {
        let keyword = self.consume();
        let open = self.expect(TokenKind::LParen);
        let condition = self.parse_expression();
        let close = self.expect(TokenKind::RParen);

        let action = if let Some(semi) = self.eat(TokenKind::Semicolon) {
            self.alloc(ActionBlock {
                statement: Some(StatementSyntax::Empty(self.alloc(EmptyStmt { semi }))),
                else_keyword: None,
                else_statement: None,
            })
        } else if self.at(TokenKind::Else) {
            let else_keyword = self.consume();
            let else_statement = self.parse_statement_inner();
            self.alloc(ActionBlock {
                statement: None,
                else_keyword: Some(else_keyword),
                else_statement: Some(else_statement),
            })
        } else {
            let statement = self.parse_statement_inner();
            let (else_keyword, else_statement) = match self.eat(TokenKind::Else) {
                Some(kw) => (Some(kw), Some(self.parse_statement_inner())),
                None => (None, None),
            };
            self.alloc(ActionBlock {
                statement: Some(statement),
                else_keyword,
                else_statement,
            })
        };

        StatementSyntax::ImmediateAssertion(self.alloc(ImmediateAssertStmt {
            keyword,
            open,
            condition,
            close,
            action,
        }))
    }

    fn parse_jump_statement(&mut self) -> StatementSyntax<'a> {
        let keyword = self.consume();
        let expr = if keyword.kind() == TokenKind::Return && !self.at(TokenKind::Semicolon) {
            Some(self.parse_expression())
        } else {
            None
        };
        let semi = self.expect(TokenKind::Semicolon);
        StatementSyntax::Jump(self.alloc(JumpStmt {
            keyword,
            expr,
            semi,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svfc_pre::{Preprocessor, PreprocessorOptions};
    use svfc_util::{Arena, Handler, SourceMap};

    fn parse<'a>(
        arena: &'a Arena,
        handler: &'a Handler,
        sources: &'a mut SourceMap,
        text: &str,
    ) -> StatementSyntax<'a> {
        let root = sources.add_file("stmt.sv", text);
        let pp = Preprocessor::new(arena, sources, handler, root, PreprocessorOptions::default());
        let mut parser = Parser::new(arena, handler, pp);
        parser.parse_statement()
    }

    #[test]
    fn test_nonblocking_assignment() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let stmt = parse(&arena, &handler, &mut sources, "q <= d;");
        match stmt {
            StatementSyntax::Expression(es) => match es.expr {
                ExpressionSyntax::Assignment(assign) => {
                    assert_eq!(assign.op.kind(), TokenKind::Lte);
                }
                other => panic!("expected assignment, got {:?}", other.kind()),
            },
            other => panic!("expected expression statement, got {:?}", other.kind()),
        }
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_compound_assignment() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let stmt = parse(&arena, &handler, &mut sources, "count += 2;");
        match stmt {
            StatementSyntax::Expression(es) => {
                assert_eq!(es.expr.kind(), SyntaxKind::AssignmentExpression);
            }
            other => panic!("expected expression statement, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_comparison_in_condition_is_not_assignment() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let stmt = parse(&arena, &handler, &mut sources, "if (a <= b) x = 1;");
        match stmt {
            StatementSyntax::Conditional(cond) => {
                // In expression context `<=` is relational.
                assert_eq!(cond.condition.kind(), SyntaxKind::BinaryExpression);
            }
            other => panic!("expected conditional, got {:?}", other.kind()),
        }
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_labeled_block_with_declarations() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let stmt = parse(
            &arena,
            &handler,
            &mut sources,
            "begin : work int i; i = 1; end : work",
        );
        match stmt {
            StatementSyntax::Block(block) => {
                assert_eq!(block.label.unwrap().name.raw(), "work");
                assert_eq!(block.items.len(), 2);
                assert_eq!(block.items[0].kind(), SyntaxKind::VariableDeclaration);
                assert_eq!(block.end_label.unwrap().name.raw(), "work");
            }
            other => panic!("expected block, got {:?}", other.kind()),
        }
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_case_statement() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let stmt = parse(
            &arena,
            &handler,
            &mut sources,
            "case (op) 2'b00, 2'b01: y = a; default: y = 0; endcase",
        );
        match stmt {
            StatementSyntax::Case(case) => {
                assert_eq!(case.items.len(), 2);
                assert_eq!(
                    case.items[0].expressions.as_ref().unwrap().item_count(),
                    2
                );
                assert!(case.items[1].default_keyword.is_some());
            }
            other => panic!("expected case, got {:?}", other.kind()),
        }
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_for_loop_with_declaration() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let stmt = parse(
            &arena,
            &handler,
            &mut sources,
            "for (int i = 0; i < 8; i++) sum += i;",
        );
        match stmt {
            StatementSyntax::For(f) => {
                assert!(matches!(f.init, ForInit::Declaration(_)));
                assert!(f.condition.is_some());
                assert_eq!(f.steps.item_count(), 1);
            }
            other => panic!("expected for, got {:?}", other.kind()),
        }
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_timing_controls() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let stmt = parse(&arena, &handler, &mut sources, "#10 q = d;");
        assert_eq!(stmt.kind(), SyntaxKind::TimedStatement);

        let stmt = parse(
            &arena,
            &handler,
            &mut sources,
            "@(posedge clk or negedge rst_n) q <= d;",
        );
        match stmt {
            StatementSyntax::Timed(timed) => match &timed.control {
                TimingControlSyntax::Event(ev) => match &ev.body {
                    EventControlBody::Parenthesized { events, .. } => {
                        assert_eq!(events.item_count(), 2);
                    }
                    other => panic!("expected parenthesized events, got {:?}", other),
                },
                other => panic!("expected event control, got {:?}", other),
            },
            other => panic!("expected timed, got {:?}", other.kind()),
        }
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_event_star() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let stmt = parse(&arena, &handler, &mut sources, "@(*) y = a & b;");
        assert_eq!(stmt.kind(), SyntaxKind::TimedStatement);
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_immediate_assertion_with_else() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let text = "assert(a == b) else $error(\"nope\");";
        let stmt = parse(&arena, &handler, &mut sources, text);
        match stmt {
            StatementSyntax::ImmediateAssertion(assertion) => {
                assert_eq!(assertion.condition.kind(), SyntaxKind::BinaryExpression);
                assert!(assertion.action.statement.is_none());
                assert!(assertion.action.else_keyword.is_some());
                assert!(assertion.action.else_statement.is_some());
                // Round trip holds through the assertion.
                assert_eq!(stmt.to_text(), text);
            }
            other => panic!("expected assertion, got {:?}", other.kind()),
        }
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_do_while() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let stmt = parse(&arena, &handler, &mut sources, "do i++; while (i < 4);");
        assert_eq!(stmt.kind(), SyntaxKind::DoWhileStatement);
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_return_with_value() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let stmt = parse(&arena, &handler, &mut sources, "return x + 1;");
        match stmt {
            StatementSyntax::Jump(jump) => {
                assert_eq!(jump.keyword.kind(), TokenKind::Return);
                assert!(jump.expr.is_some());
            }
            other => panic!("expected jump, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_missing_semicolon_synthesized() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let stmt = parse(&arena, &handler, &mut sources, "x = 1");
        match stmt {
            StatementSyntax::Expression(es) => assert!(es.semi.is_missing()),
            other => panic!("expected expression statement, got {:?}", other.kind()),
        }
        assert!(handler.has_errors());
    }
}
