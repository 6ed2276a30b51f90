//! Module declarations, port lists, module items, hierarchy
//! instantiation, generate regions, and constraint declarations.

use svfc_lex::TokenKind;
use svfc_util::DiagnosticCode;

use crate::ast::*;
use crate::{describe, Parser};

impl<'a> Parser<'a> {
    pub(crate) fn parse_module_declaration(&mut self) -> &'a ModuleDeclaration<'a> {
        let keyword = match self.kind() {
            TokenKind::Module | TokenKind::Macromodule => self.consume(),
            _ => self.expect(TokenKind::Module),
        };
        let name = self.expect(TokenKind::Identifier);

        let param_ports = if self.at(TokenKind::Hash) && self.kind_at(1) == TokenKind::LParen {
            Some(self.parse_parameter_port_list())
        } else {
            None
        };

        let ports = if self.at(TokenKind::LParen) {
            Some(self.parse_port_list())
        } else {
            None
        };

        let semi = self.expect(TokenKind::Semicolon);
        let header = self.alloc(ModuleHeader {
            keyword,
            name,
            param_ports,
            ports,
            semi,
        });

        let mut items = Vec::new();
        loop {
            match self.kind() {
                TokenKind::Endmodule | TokenKind::EndOfFile => break,
                _ => {
                    let before = self.current().span();
                    items.push(self.parse_module_item());
                    self.force_progress(before);
                }
            }
        }

        let endmodule = self.expect(TokenKind::Endmodule);
        self.alloc(ModuleDeclaration {
            header,
            items: self.arena.alloc_slice(&items),
            endmodule,
        })
    }

    fn parse_parameter_port_list(&mut self) -> &'a ParameterPortList<'a> {
        let hash = self.consume();
        let open = self.consume();

        let mut elements = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                let param = self.parse_parameter_declaration(true);
                elements.push(TokenOrSyntax::Syntax(&*self.alloc(param)));
                match self.eat(TokenKind::Comma) {
                    Some(comma) => elements.push(TokenOrSyntax::Token(comma)),
                    None => break,
                }
            }
        }

        let close = self.expect(TokenKind::RParen);
        self.alloc(ParameterPortList {
            hash,
            open,
            params: self.separated_list(elements),
            close,
        })
    }

    fn parse_port_list(&mut self) -> PortListSyntax<'a> {
        let open = self.consume();

        if !self.at(TokenKind::RParen) && self.is_non_ansi_port() {
            let mut elements = Vec::new();
            loop {
                let name = self.expect(TokenKind::Identifier);
                elements.push(TokenOrSyntax::Syntax(&*self.alloc(NonAnsiPort { name })));
                match self.eat(TokenKind::Comma) {
                    Some(comma) => elements.push(TokenOrSyntax::Token(comma)),
                    None => break,
                }
            }
            let close = self.expect(TokenKind::RParen);
            return PortListSyntax::NonAnsi(self.alloc(NonAnsiPortList {
                open,
                ports: self.separated_list(elements),
                close,
            }));
        }

        let mut elements = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                let port = self.parse_ansi_port();
                elements.push(TokenOrSyntax::Syntax(&*self.alloc(port)));
                match self.eat(TokenKind::Comma) {
                    Some(comma) => elements.push(TokenOrSyntax::Token(comma)),
                    None => break,
                }
            }
        }
        let close = self.expect(TokenKind::RParen);
        PortListSyntax::Ansi(self.alloc(AnsiPortList {
            open,
            ports: self.separated_list(elements),
            close,
        }))
    }

    pub(crate) fn parse_module_item(&mut self) -> ModuleItemSyntax<'a> {
        use TokenKind::*;
        match self.kind() {
            Semicolon => {
                let semi = self.consume();
                ModuleItemSyntax::Empty(self.alloc(EmptyMember { semi }))
            }
            Input | Output | Inout | Ref if self.is_port_declaration() => {
                ModuleItemSyntax::PortDeclaration(self.parse_port_declaration())
            }
            Parameter | Localparam => {
                let param = self.parse_parameter_declaration(false);
                ModuleItemSyntax::ParameterDeclaration(self.alloc(param))
            }
            Assign => ModuleItemSyntax::ContinuousAssign(self.parse_continuous_assign()),
            Initial | Final | Always | AlwaysComb | AlwaysFf | AlwaysLatch => {
                let keyword = self.consume();
                let statement = self.parse_statement_inner();
                ModuleItemSyntax::ProceduralBlock(
                    self.alloc(ProceduralBlock { keyword, statement }),
                )
            }
            Generate => ModuleItemSyntax::GenerateRegion(self.parse_generate_region()),
            Genvar => ModuleItemSyntax::GenvarDeclaration(self.parse_genvar_declaration()),
            Constraint | Static if self.constraint_ahead() => {
                ModuleItemSyntax::ConstraintDeclaration(self.parse_constraint_declaration())
            }
            _ if self.is_net_declaration() => {
                ModuleItemSyntax::NetDeclaration(self.parse_net_declaration())
            }
            _ if self.is_hierarchy_instantiation() => {
                ModuleItemSyntax::Instantiation(self.parse_hierarchy_instantiation())
            }
            _ if self.is_variable_declaration() => {
                ModuleItemSyntax::VariableDeclaration(self.parse_variable_declaration())
            }
            _ => {
                let token = self.current();
                self.handler.report(
                    DiagnosticCode::E_PAR_EXPECTED_MEMBER,
                    token.span(),
                    format!("expected a module item, found '{}'", describe(&token)),
                );
                self.resynchronize(&[Semicolon, Endmodule]);
                let semi = match self.eat(Semicolon) {
                    Some(semi) => semi,
                    None => svfc_lex::Token::missing(Semicolon, self.current().span()),
                };
                ModuleItemSyntax::Empty(self.alloc(EmptyMember { semi }))
            }
        }
    }

    fn constraint_ahead(&mut self) -> bool {
        self.at(TokenKind::Constraint)
            || (self.at(TokenKind::Static) && self.kind_at(1) == TokenKind::Constraint)
    }

    fn parse_continuous_assign(&mut self) -> &'a ContinuousAssign<'a> {
        let keyword = self.consume();

        let mut elements = Vec::new();
        loop {
            let assignment = self.parse_statement_expression();
            elements.push(TokenOrSyntax::Syntax(&*self.alloc(assignment)));
            match self.eat(TokenKind::Comma) {
                Some(comma) => elements.push(TokenOrSyntax::Token(comma)),
                None => break,
            }
        }

        let semi = self.expect(TokenKind::Semicolon);
        self.alloc(ContinuousAssign {
            keyword,
            assignments: self.separated_list(elements),
            semi,
        })
    }

    fn parse_hierarchy_instantiation(&mut self) -> &'a HierarchyInstantiation<'a> {
        let type_name = self.consume();

        let parameters = if self.at(TokenKind::Hash) {
            let hash = self.consume();
            let open = self.expect(TokenKind::LParen);
            let connections = self.parse_port_connection_list();
            let close = self.expect(TokenKind::RParen);
            Some(&*self.alloc(ParameterValueAssignment {
                hash,
                open,
                connections,
                close,
            }))
        } else {
            None
        };

        let mut elements = Vec::new();
        loop {
            let instance = self.parse_hierarchical_instance();
            elements.push(TokenOrSyntax::Syntax(&*self.alloc(instance)));
            match self.eat(TokenKind::Comma) {
                Some(comma) => elements.push(TokenOrSyntax::Token(comma)),
                None => break,
            }
        }

        let semi = self.expect(TokenKind::Semicolon);
        self.alloc(HierarchyInstantiation {
            type_name,
            parameters,
            instances: self.separated_list(elements),
            semi,
        })
    }

    fn parse_hierarchical_instance(&mut self) -> HierarchicalInstance<'a> {
        let name = self.expect(TokenKind::Identifier);
        let dimensions = self.parse_dimension_list();
        let open = self.expect(TokenKind::LParen);
        let connections = self.parse_port_connection_list();
        let close = self.expect(TokenKind::RParen);
        HierarchicalInstance {
            name,
            dimensions,
            open,
            connections,
            close,
        }
    }

    fn parse_port_connection_list(&mut self) -> SeparatedList<'a, PortConnectionSyntax<'a>> {
        let mut elements = Vec::new();
        if !self.at(TokenKind::RParen) && !self.current().is_eof() {
            loop {
                let connection = self.parse_port_connection();
                elements.push(TokenOrSyntax::Syntax(&*self.alloc(connection)));
                match self.eat(TokenKind::Comma) {
                    Some(comma) => elements.push(TokenOrSyntax::Token(comma)),
                    None => break,
                }
            }
        }
        self.separated_list(elements)
    }

    fn parse_port_connection(&mut self) -> PortConnectionSyntax<'a> {
        if self.at(TokenKind::DotStar) {
            let dot_star = self.consume();
            return PortConnectionSyntax::Wildcard(
                self.alloc(WildcardPortConnection { dot_star }),
            );
        }

        if self.at(TokenKind::Dot) {
            let dot = self.consume();
            let name = self.expect(TokenKind::Identifier);
            let (open, expr, close) = if self.at(TokenKind::LParen) {
                let open = self.consume();
                let expr = if self.at(TokenKind::RParen) {
                    None
                } else {
                    Some(self.parse_expression())
                };
                let close = self.expect(TokenKind::RParen);
                (Some(open), expr, Some(close))
            } else {
                (None, None, None)
            };
            return PortConnectionSyntax::Named(self.alloc(NamedPortConnection {
                dot,
                name,
                open,
                expr,
                close,
            }));
        }

        let expr = self.parse_expression();
        PortConnectionSyntax::Ordered(self.alloc(OrderedPortConnection { expr }))
    }

    fn parse_generate_region(&mut self) -> &'a GenerateRegion<'a> {
        let keyword = self.consume();

        let mut items = Vec::new();
        loop {
            match self.kind() {
                TokenKind::Endgenerate | TokenKind::Endmodule | TokenKind::EndOfFile => break,
                _ => {
                    let before = self.current().span();
                    items.push(self.parse_module_item());
                    self.force_progress(before);
                }
            }
        }

        let end_keyword = self.expect(TokenKind::Endgenerate);
        self.alloc(GenerateRegion {
            keyword,
            items: self.arena.alloc_slice(&items),
            end_keyword,
        })
    }

    // ==================================================================
    // Constraints
    // ==================================================================

    fn parse_constraint_declaration(&mut self) -> &'a ConstraintDeclaration<'a> {
        let mut qualifiers = Vec::new();
        while self.at(TokenKind::Static) {
            qualifiers.push(self.consume());
        }
        let keyword = self.expect(TokenKind::Constraint);
        let name = self.expect(TokenKind::Identifier);
        let block = self.parse_constraint_block();
        self.alloc(ConstraintDeclaration {
            qualifiers: self.arena.alloc_slice(&qualifiers),
            keyword,
            name,
            block,
        })
    }

    pub(crate) fn parse_constraint_block(&mut self) -> &'a ConstraintBlock<'a> {
        let open = self.expect(TokenKind::LBrace);

        let mut items = Vec::new();
        loop {
            match self.kind() {
                TokenKind::RBrace | TokenKind::EndOfFile => break,
                _ => {
                    let before = self.current().span();
                    items.push(self.parse_constraint_item());
                    self.force_progress(before);
                }
            }
        }

        let close = self.expect(TokenKind::RBrace);
        self.alloc(ConstraintBlock {
            open,
            items: self.arena.alloc_slice(&items),
            close,
        })
    }

    pub(crate) fn parse_constraint_item(&mut self) -> ConstraintItemSyntax<'a> {
        match self.kind() {
            TokenKind::Soft => {
                let soft = self.consume();
                let expr = self.parse_expression();
                let semi = self.expect(TokenKind::Semicolon);
                ConstraintItemSyntax::Expression(self.alloc(ExpressionConstraint {
                    soft: Some(soft),
                    expr,
                    semi,
                }))
            }
            TokenKind::Unique if self.kind_at(1) == TokenKind::LBrace => {
                self.parse_uniqueness_constraint()
            }
            TokenKind::If => self.parse_conditional_constraint(),
            TokenKind::LBrace => ConstraintItemSyntax::Block(self.parse_constraint_block()),
            _ => {
                let expr = self.parse_expression();
                if self.at(TokenKind::Arrow) {
                    let arrow = self.consume();
                    let body = self.parse_constraint_item();
                    return ConstraintItemSyntax::Implication(self.alloc(
                        ImplicationConstraint {
                            predicate: expr,
                            arrow,
                            body: self.alloc(body),
                        },
                    ));
                }
                let semi = self.expect(TokenKind::Semicolon);
                ConstraintItemSyntax::Expression(self.alloc(ExpressionConstraint {
                    soft: None,
                    expr,
                    semi,
                }))
            }
        }
    }

    fn parse_uniqueness_constraint(&mut self) -> ConstraintItemSyntax<'a> {
        let keyword = self.consume();
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
        } else {
            let current = self.current();
            self.handler.report(
                DiagnosticCode::E_PAR_EXPECTED_CONSTRAINT,
                current.span(),
                "'unique' set needs at least one expression",
            );
        }

        let close = self.expect(TokenKind::RBrace);
        let semi = self.expect(TokenKind::Semicolon);
        ConstraintItemSyntax::Uniqueness(self.alloc(UniquenessConstraint {
            keyword,
            open,
            items: self.separated_list(elements),
            close,
            semi,
        }))
    }

    fn parse_conditional_constraint(&mut self) -> ConstraintItemSyntax<'a> {
        let if_keyword = self.consume();
        let open = self.expect(TokenKind::LParen);
        let condition = self.parse_expression();
        let close = self.expect(TokenKind::RParen);
        let body = self.parse_constraint_item();
        let body = self.alloc(body);

        let (else_keyword, else_body) = match self.eat(TokenKind::Else) {
            Some(kw) => {
                let else_item = self.parse_constraint_item();
                (Some(kw), Some(&*self.alloc(else_item)))
            }
            None => (None, None),
        };

        ConstraintItemSyntax::Conditional(self.alloc(ConditionalConstraint {
            if_keyword,
            open,
            condition,
            close,
            body,
            else_keyword,
            else_body,
        }))
    }
}
