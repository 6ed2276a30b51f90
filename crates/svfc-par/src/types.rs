//! Data types, dimensions, declarators, and the declaration items built
//! from them.

use svfc_lex::TokenKind;

use crate::ast::*;
use crate::{is_data_type_keyword, is_variable_qualifier, Parser};

impl<'a> Parser<'a> {
    /// Parses a (possibly implicit) data type: an optional builtin or
    /// named type keyword, optional signing, and packed dimensions.
    ///
    /// An identifier is taken as a named type only when another
    /// identifier follows it; otherwise it is left for the declarator.
    pub(crate) fn parse_data_type(&mut self) -> &'a DataType<'a> {
        let keyword = if is_data_type_keyword(self.kind()) {
            Some(self.consume())
        } else if self.kind() == TokenKind::Identifier
            && self.kind_at(1) == TokenKind::Identifier
        {
            Some(self.consume())
        } else {
            None
        };

        let signing = match self.kind() {
            TokenKind::Signed | TokenKind::Unsigned => Some(self.consume()),
            _ => None,
        };

        let dimensions = self.parse_dimension_list();
        self.alloc(DataType {
            keyword,
            signing,
            dimensions,
        })
    }

    pub(crate) fn parse_dimension_list(&mut self) -> &'a [Dimension<'a>] {
        let mut dimensions = Vec::new();
        while self.at(TokenKind::LBracket) {
            dimensions.push(self.parse_dimension());
        }
        self.arena.alloc_slice(&dimensions)
    }

    fn parse_dimension(&mut self) -> Dimension<'a> {
        let open = self.consume();

        if self.at(TokenKind::RBracket) {
            let close = self.consume();
            return Dimension {
                open,
                contents: DimensionContents::Unsized,
                close,
            };
        }

        let left = self.parse_expression();
        let contents = if self.at(TokenKind::Colon) {
            let colon = self.consume();
            let right = self.parse_expression();
            DimensionContents::Range { left, colon, right }
        } else {
            DimensionContents::Single(left)
        };

        let close = self.expect(TokenKind::RBracket);
        Dimension {
            open,
            contents,
            close,
        }
    }

    pub(crate) fn parse_declarator(&mut self) -> Declarator<'a> {
        let name = self.expect(TokenKind::Identifier);
        let dimensions = self.parse_dimension_list();
        let initializer = if self.at(TokenKind::Equals) {
            let equals = self.consume();
            let expr = self.parse_expression();
            Some(&*self.alloc(EqualsValueClause { equals, expr }))
        } else {
            None
        };
        Declarator {
            name,
            dimensions,
            initializer,
        }
    }

    pub(crate) fn parse_declarator_list(&mut self) -> SeparatedList<'a, Declarator<'a>> {
        let mut elements = Vec::new();
        loop {
            let declarator = self.parse_declarator();
            elements.push(TokenOrSyntax::Syntax(&*self.alloc(declarator)));
            match self.eat(TokenKind::Comma) {
                Some(comma) => elements.push(TokenOrSyntax::Token(comma)),
                None => break,
            }
        }
        self.separated_list(elements)
    }

    pub(crate) fn parse_net_declaration(&mut self) -> &'a NetDeclaration<'a> {
        let net_type = self.consume();
        let data_type = self.parse_data_type();
        let declarators = self.parse_declarator_list();
        let semi = self.expect(TokenKind::Semicolon);
        self.alloc(NetDeclaration {
            net_type,
            data_type,
            declarators,
            semi,
        })
    }

    pub(crate) fn parse_variable_declaration(&mut self) -> &'a VariableDeclaration<'a> {
        let mut qualifiers = Vec::new();
        while is_variable_qualifier(self.kind()) {
            qualifiers.push(self.consume());
        }

        let data_type = self.parse_data_type();
        let declarators = self.parse_declarator_list();
        let semi = self.expect(TokenKind::Semicolon);
        self.alloc(VariableDeclaration {
            qualifiers: self.arena.alloc_slice(&qualifiers),
            data_type,
            declarators,
            semi,
        })
    }

    /// `parameter`/`localparam` declaration. Inside a parameter port list
    /// there is no trailing semicolon.
    pub(crate) fn parse_parameter_declaration(
        &mut self,
        in_port_list: bool,
    ) -> ParameterDeclaration<'a> {
        let keyword = match self.kind() {
            TokenKind::Parameter | TokenKind::Localparam => Some(self.consume()),
            _ => None,
        };
        let data_type = self.parse_data_type();

        // In a port list, stop each declaration at the next comma so the
        // list separator stays with the list.
        let declarators = if in_port_list {
            let declarator = self.parse_declarator();
            let elements = vec![TokenOrSyntax::Syntax(&*self.alloc(declarator))];
            self.separated_list(elements)
        } else {
            self.parse_declarator_list()
        };

        let semi = if in_port_list {
            None
        } else {
            Some(self.expect(TokenKind::Semicolon))
        };

        ParameterDeclaration {
            keyword,
            data_type,
            declarators,
            semi,
        }
    }

    /// Non-ANSI direction declaration in a module body.
    pub(crate) fn parse_port_declaration(&mut self) -> &'a PortDeclaration<'a> {
        let direction = self.consume();
        let net_type = if crate::is_net_type(self.kind()) {
            Some(self.consume())
        } else {
            None
        };
        let data_type = self.parse_data_type();
        let declarators = self.parse_declarator_list();
        let semi = self.expect(TokenKind::Semicolon);
        self.alloc(PortDeclaration {
            direction,
            net_type,
            data_type,
            declarators,
            semi,
        })
    }

    /// One ANSI port: optional direction, optional net type, data type,
    /// declarator.
    pub(crate) fn parse_ansi_port(&mut self) -> AnsiPortDeclaration<'a> {
        let direction = match self.kind() {
            TokenKind::Input | TokenKind::Output | TokenKind::Inout | TokenKind::Ref => {
                Some(self.consume())
            }
            _ => None,
        };
        let net_type = if crate::is_net_type(self.kind()) {
            Some(self.consume())
        } else {
            None
        };
        let data_type = self.parse_data_type();
        let declarator = self.parse_declarator();
        AnsiPortDeclaration {
            direction,
            net_type,
            data_type,
            declarator: self.alloc(declarator),
        }
    }

    pub(crate) fn parse_genvar_declaration(&mut self) -> &'a GenvarDeclaration<'a> {
        let keyword = self.consume();
        let declarators = self.parse_declarator_list();
        let semi = self.expect(TokenKind::Semicolon);
        self.alloc(GenvarDeclaration {
            keyword,
            declarators,
            semi,
        })
    }
}

/// Shared helper for tests: the names declared by a declaration list.
#[cfg(test)]
pub(crate) fn declared_names<'a>(list: &SeparatedList<'a, Declarator<'a>>) -> Vec<&'a str> {
    list.items().map(|d| d.name.raw()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use svfc_pre::{Preprocessor, PreprocessorOptions};
    use svfc_util::{Arena, Handler, SourceMap};

    fn parser_for<'a>(
        arena: &'a Arena,
        handler: &'a Handler,
        sources: &'a mut SourceMap,
        text: &str,
    ) -> Parser<'a> {
        let root = sources.add_file("types.sv", text);
        let pp = Preprocessor::new(arena, sources, handler, root, PreprocessorOptions::default());
        Parser::new(arena, handler, pp)
    }

    #[test]
    fn test_packed_type() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let mut parser = parser_for(&arena, &handler, &mut sources, "logic signed [7:0]");
        let ty = parser.parse_data_type();
        assert_eq!(ty.keyword.unwrap().kind(), TokenKind::Logic);
        assert_eq!(ty.signing.unwrap().kind(), TokenKind::Signed);
        assert_eq!(ty.dimensions.len(), 1);
        assert!(!ty.is_implicit());
    }

    #[test]
    fn test_implicit_type() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let mut parser = parser_for(&arena, &handler, &mut sources, "w;");
        let ty = parser.parse_data_type();
        assert!(ty.is_implicit());
        // The identifier is still there for the declarator.
        assert_eq!(parser.kind(), TokenKind::Identifier);
    }

    #[test]
    fn test_named_type_followed_by_name() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let mut parser = parser_for(&arena, &handler, &mut sources, "state_t state;");
        let ty = parser.parse_data_type();
        assert_eq!(ty.keyword.unwrap().raw(), "state_t");
        assert_eq!(parser.kind(), TokenKind::Identifier);
    }

    #[test]
    fn test_variable_declaration_multiple_declarators() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let mut parser = parser_for(
            &arena,
            &handler,
            &mut sources,
            "logic [7:0] a, b = 8'hFF, c [0:3];",
        );
        let decl = parser.parse_variable_declaration();
        assert_eq!(declared_names(&decl.declarators), vec!["a", "b", "c"]);

        let declarators: Vec<_> = decl.declarators.items().collect();
        assert!(declarators[1].initializer.is_some());
        assert_eq!(declarators[2].dimensions.len(), 1);
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_unsized_dimension() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let mut parser = parser_for(&arena, &handler, &mut sources, "int q[];");
        let decl = parser.parse_variable_declaration();
        let declarator = decl.declarators.items().next().unwrap();
        assert!(matches!(
            declarator.dimensions[0].contents,
            DimensionContents::Unsized
        ));
    }

    #[test]
    fn test_rand_qualifier() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let mut parser = parser_for(&arena, &handler, &mut sources, "rand bit [3:0] value;");
        let decl = parser.parse_variable_declaration();
        assert_eq!(decl.qualifiers.len(), 1);
        assert_eq!(decl.qualifiers[0].kind(), TokenKind::Rand);
    }
}
