//! svfc-sem - Expression, statement, and constraint binding.
//!
//! Lifts concrete syntax from `svfc-par` into kind-tagged semantic trees.
//! Binding is local: names resolve against a [`Scope`] chain populated
//! from the surrounding declarations, types come from a small structural
//! model ([`TypeKind`]), and anything that needs whole-design elaboration
//! (hierarchy, user types, member resolution) is deliberately left
//! unresolved rather than guessed.
//!
//! The failure policy is uniform across all three families: a failed bind
//! yields an `Invalid` node carrying its best partial child, parents
//! receiving an `Invalid` child wrap themselves so `bad()` propagates,
//! and each root cause is diagnosed exactly once.

mod constraint;
mod expr;
mod scope;
mod stmt;
mod types;
mod visitor;

pub use constraint::{
    ConditionalConstraint, Constraint, ConstraintKind, ConstraintList, ExpressionConstraint,
    ImplicationConstraint, InvalidConstraint, UniquenessConstraint,
};
pub use expr::{
    AssignmentKind, AssignmentOpExpr, BinaryOpExpr, BinaryOperator, CallExpr,
    ConcatenationExpr, ConditionalOpExpr, ElementSelectExpr, Expression, ExpressionKind,
    InsideExpr, IntegerLiteralExpr, InvalidExpr, MemberAccessExpr, NamedValueExpr,
    RangeSelectExpr, RealLiteralExpr, ReplicationExpr, StringLiteralExpr, UnaryOpExpr,
    UnaryOperator,
};
pub use scope::{Scope, SymbolKind, VarSymbol};
pub use stmt::{
    BoundCaseItem, CaseStatement, ConditionalStatement, ExpressionStatement,
    ForLoopStatement, ForeverLoopStatement, ImmediateAssertionStatement, InvalidStatement,
    JumpKind, JumpStatement, RepeatLoopStatement, Statement, StatementKind, StatementList,
    TimedStatement, VariableDeclStatement, WhileLoopStatement,
};
pub use types::TypeKind;
pub use visitor::{ConstraintVisitor, ExprVisitor, SemanticSerializer, StmtVisitor};

use bitflags::bitflags;
use svfc_lex::TokenKind;
use svfc_par::ast as syntax;
use svfc_util::{Arena, Handler};

bitflags! {
    /// Syntactic context flags threaded through all bind calls.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct BindFlags: u32 {
        /// Binding inside procedural code.
        const PROCEDURAL = 1 << 0;
        /// Binding the right side of a continuous assignment.
        const CONTINUOUS = 1 << 1;
        /// A constant expression is required.
        const CONSTANT = 1 << 2;
        /// Assignment patterns are allowed here.
        const ALLOW_PATTERN = 1 << 3;
        /// `soft` constraints are allowed here.
        const SOFT_ALLOWED = 1 << 4;
    }
}

/// Read-only context threaded through every bind call: the enclosing
/// scope, the allocator, the diagnostic sink, and syntactic flags.
#[derive(Clone, Copy)]
pub struct BindContext<'a> {
    pub scope: &'a Scope<'a>,
    pub arena: &'a Arena,
    pub handler: &'a Handler,
    pub flags: BindFlags,
}

impl<'a> BindContext<'a> {
    pub fn new(scope: &'a Scope<'a>, arena: &'a Arena, handler: &'a Handler) -> Self {
        Self {
            scope,
            arena,
            handler,
            flags: BindFlags::empty(),
        }
    }

    pub fn with_flags(self, flags: BindFlags) -> Self {
        Self { flags, ..self }
    }

    /// A context whose scope is a fresh child of this one.
    pub fn child_scope(&self) -> BindContext<'a> {
        BindContext {
            scope: self.scope.child(self.arena),
            ..*self
        }
    }

    #[inline]
    pub(crate) fn alloc<T>(&self, value: T) -> &'a T {
        self.arena.alloc(value)
    }
}

/// Maps a syntax data type to the binder's type model.
///
/// Packed dimensions must have constant bounds; named (user) types come
/// back as `Error` without a diagnostic since resolving them is
/// elaboration's job.
pub fn type_of_data_type<'a>(
    data_type: &syntax::DataType<'a>,
    ctx: &BindContext<'a>,
) -> TypeKind {
    let (base_width, base_signed, four_state) = match data_type.keyword.map(|k| k.kind()) {
        None | Some(TokenKind::Logic) | Some(TokenKind::Reg) => (1, false, true),
        Some(TokenKind::Bit) => (1, false, false),
        Some(TokenKind::Byte) => (8, true, false),
        Some(TokenKind::Shortint) => (16, true, false),
        Some(TokenKind::Int) => (32, true, false),
        Some(TokenKind::Longint) => (64, true, false),
        Some(TokenKind::Integer) => (32, true, true),
        Some(TokenKind::Time) => (64, false, true),
        Some(TokenKind::Real)
        | Some(TokenKind::Realtime)
        | Some(TokenKind::Shortreal) => return TypeKind::Real,
        Some(TokenKind::String) => return TypeKind::String,
        Some(TokenKind::Void) => return TypeKind::Void,
        Some(TokenKind::Event) => return TypeKind::Void,
        // A named type; resolution happens during elaboration.
        Some(TokenKind::Identifier) => return TypeKind::Error,
        Some(_) => return TypeKind::Error,
    };

    let signed = match data_type.signing.map(|s| s.kind()) {
        Some(TokenKind::Signed) => true,
        Some(TokenKind::Unsigned) => false,
        _ => base_signed,
    };

    let mut width: u32 = base_width;
    for dimension in data_type.dimensions {
        match stmt::bound_width(dimension, ctx) {
            Some(w) => width = width.saturating_mul(w.max(1)),
            None => return TypeKind::Error,
        }
    }

    TypeKind::integral(width, signed, four_state)
}

/// Declares the names a module's header and items introduce, so local
/// binding inside the module can resolve them. This is scope seeding,
/// not elaboration: hierarchy and user types stay unresolved.
pub fn seed_module_scope<'a>(
    module: &syntax::ModuleDeclaration<'a>,
    ctx: &BindContext<'a>,
) {
    use syntax::PortListSyntax;

    if let Some(PortListSyntax::Ansi(list)) = &module.header.ports {
        for port in list.ports.items() {
            let ty = type_of_data_type(port.data_type, ctx);
            if let Some(name) = port.declarator.name.ident() {
                declare_or_report(ctx, VarSymbol {
                    name,
                    ty,
                    kind: SymbolKind::Port,
                    is_rand: false,
                }, port.declarator.name.span());
            }
        }
    }

    for item in module.items {
        match item {
            syntax::ModuleItemSyntax::NetDeclaration(net) => {
                let ty = type_of_data_type(net.data_type, ctx);
                declare_list(ctx, &net.declarators, ty, SymbolKind::Net, false);
            }
            syntax::ModuleItemSyntax::VariableDeclaration(var) => {
                let ty = type_of_data_type(var.data_type, ctx);
                let is_rand = var.qualifiers.iter().any(|q| {
                    matches!(q.kind(), TokenKind::Rand | TokenKind::Randc)
                });
                declare_list(ctx, &var.declarators, ty, SymbolKind::Variable, is_rand);
            }
            syntax::ModuleItemSyntax::ParameterDeclaration(param) => {
                // An untyped parameter defaults to int.
                let ty = if param.data_type.is_implicit() {
                    TypeKind::INT
                } else {
                    match type_of_data_type(param.data_type, ctx) {
                        TypeKind::Error => TypeKind::INT,
                        ty => ty,
                    }
                };
                declare_list(ctx, &param.declarators, ty, SymbolKind::Parameter, false);
            }
            syntax::ModuleItemSyntax::PortDeclaration(port) => {
                let ty = type_of_data_type(port.data_type, ctx);
                declare_list(ctx, &port.declarators, ty, SymbolKind::Port, false);
            }
            syntax::ModuleItemSyntax::GenvarDeclaration(genvar) => {
                declare_list(
                    ctx,
                    &genvar.declarators,
                    TypeKind::INT,
                    SymbolKind::Genvar,
                    false,
                );
            }
            _ => {}
        }
    }
}

fn declare_list<'a>(
    ctx: &BindContext<'a>,
    declarators: &syntax::SeparatedList<'a, syntax::Declarator<'a>>,
    ty: TypeKind,
    kind: SymbolKind,
    is_rand: bool,
) {
    for declarator in declarators.items() {
        if let Some(name) = declarator.name.ident() {
            declare_or_report(
                ctx,
                VarSymbol {
                    name,
                    ty,
                    kind,
                    is_rand,
                },
                declarator.name.span(),
            );
        }
    }
}

fn declare_or_report<'a>(ctx: &BindContext<'a>, symbol: VarSymbol, span: svfc_util::Span) {
    if !ctx.scope.declare(symbol) {
        ctx.handler.report(
            svfc_util::DiagnosticCode::E_SEM_DUPLICATE,
            span,
            format!("'{}' is already declared in this scope", symbol.name),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svfc_par::Parser;
    use svfc_pre::{Preprocessor, PreprocessorOptions};
    use svfc_util::{DiagnosticCode, SourceMap};

    fn bind_expr_in<'a>(
        arena: &'a Arena,
        handler: &'a Handler,
        sources: &'a mut SourceMap,
        decls: &[(&str, TypeKind)],
        text: &str,
    ) -> &'a Expression<'a> {
        let root = sources.add_file("expr.sv", text);
        let pp = Preprocessor::new(arena, sources, handler, root, PreprocessorOptions::default());
        let mut parser = Parser::new(arena, handler, pp);
        let syntax_expr = parser.parse_expression();
        let syntax_expr = arena.alloc(syntax_expr);

        let scope = Scope::root(arena);
        for (name, ty) in decls {
            scope.declare(VarSymbol {
                name: svfc_util::Symbol::intern(name),
                ty: *ty,
                kind: SymbolKind::Variable,
                is_rand: true,
            });
        }
        let ctx = BindContext::new(scope, arena, handler);
        Expression::bind(syntax_expr, &ctx)
    }

    #[test]
    fn test_bind_literal_and_name() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let expr = bind_expr_in(
            &arena,
            &handler,
            &mut sources,
            &[("a", TypeKind::integral(8, false, true))],
            "a + 1",
        );
        assert_eq!(expr.kind(), ExpressionKind::BinaryOp);
        assert!(!expr.bad());
        // 8-bit logic + 32-bit int widens to 32 bits, four-state.
        assert_eq!(expr.ty(), TypeKind::integral(32, false, true));
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_undeclared_name_is_invalid_and_diagnosed_once() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let expr = bind_expr_in(&arena, &handler, &mut sources, &[], "missing + 1");
        // The root is invalid because its child is invalid.
        assert!(expr.bad());
        assert_eq!(handler.error_count(), 1);
    }

    #[test]
    fn test_invalid_propagates_through_parents() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let expr = bind_expr_in(
            &arena,
            &handler,
            &mut sources,
            &[("a", TypeKind::INT)],
            "(a + missing) * 2",
        );
        assert!(expr.bad());
        // The Invalid wrapper still carries the partial tree.
        match expr {
            Expression::Invalid(invalid) => {
                let child = invalid.child.expect("partial child preserved");
                assert_eq!(child.kind(), ExpressionKind::BinaryOp);
            }
            other => panic!("expected invalid, got {:?}", other.kind()),
        }
        assert_eq!(handler.error_count(), 1);
    }

    #[test]
    fn test_constant_folding() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let expr = bind_expr_in(&arena, &handler, &mut sources, &[], "2 + 3 * 4");
        assert_eq!(expr.constant_value(), Some(14));

        let expr = bind_expr_in(&arena, &handler, &mut sources, &[], "1 ? 8 : 9");
        assert_eq!(expr.constant_value(), Some(8));

        let expr = bind_expr_in(&arena, &handler, &mut sources, &[], "(1 << 4) - 1");
        assert_eq!(expr.constant_value(), Some(15));
    }

    #[test]
    fn test_division_by_zero_not_folded() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let expr = bind_expr_in(&arena, &handler, &mut sources, &[], "1 / 0");
        assert_eq!(expr.constant_value(), None);
    }

    #[test]
    fn test_comparison_yields_bit() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let expr = bind_expr_in(
            &arena,
            &handler,
            &mut sources,
            &[("a", TypeKind::INT), ("b", TypeKind::INT)],
            "a == b",
        );
        assert_eq!(expr.ty(), TypeKind::BIT);
    }

    #[test]
    fn test_string_arithmetic_diagnosed() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let expr = bind_expr_in(
            &arena,
            &handler,
            &mut sources,
            &[("s", TypeKind::String)],
            "s + 1",
        );
        assert_eq!(expr.ty(), TypeKind::Error);
        assert_eq!(handler.error_count(), 1);
        let code = handler.diagnostics()[0].code.unwrap();
        assert_eq!(code, DiagnosticCode::E_SEM_TYPE_MISMATCH);
    }

    #[test]
    fn test_concatenation_width() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let expr = bind_expr_in(
            &arena,
            &handler,
            &mut sources,
            &[
                ("a", TypeKind::integral(8, false, true)),
                ("b", TypeKind::integral(4, false, false)),
            ],
            "{a, b}",
        );
        assert_eq!(expr.ty(), TypeKind::integral(12, false, true));
    }

    #[test]
    fn test_replication_needs_constant_count() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let expr = bind_expr_in(
            &arena,
            &handler,
            &mut sources,
            &[("n", TypeKind::INT), ("a", TypeKind::BIT)],
            "{n{a}}",
        );
        assert!(expr.bad());
        let code = handler.diagnostics()[0].code.unwrap();
        assert_eq!(code, DiagnosticCode::E_SEM_NOT_CONSTANT);

        let handler2 = Handler::new();
        let mut sources2 = SourceMap::new();
        let expr = bind_expr_in(
            &arena,
            &handler2,
            &mut sources2,
            &[("a", TypeKind::BIT)],
            "{4{a}}",
        );
        assert!(!expr.bad());
        assert_eq!(expr.ty(), TypeKind::integral(4, false, false));
    }

    #[test]
    fn test_bad_assignment_target() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let root = sources.add_file("stmt.sv", "1 = x;");
        let pp =
            Preprocessor::new(&arena, &sources, &handler, root, PreprocessorOptions::default());
        let mut parser = Parser::new(&arena, &handler, pp);
        let stmt = parser.parse_statement();
        let stmt = arena.alloc(stmt);

        let scope = Scope::root(&arena);
        scope.declare(VarSymbol {
            name: svfc_util::Symbol::intern("x"),
            ty: TypeKind::INT,
            kind: SymbolKind::Variable,
            is_rand: false,
        });
        let ctx = BindContext::new(scope, &arena, &handler);
        let bound = Statement::bind(stmt, &ctx);
        assert!(bound.bad());
        assert!(handler
            .diagnostics()
            .iter()
            .any(|d| d.code == Some(DiagnosticCode::E_SEM_BAD_ASSIGNMENT)));
    }

    #[test]
    fn test_statement_binding_with_declarations() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let root = sources.add_file("stmt.sv", "begin int i; i = 3; i = i + 1; end");
        let pp =
            Preprocessor::new(&arena, &sources, &handler, root, PreprocessorOptions::default());
        let mut parser = Parser::new(&arena, &handler, pp);
        let stmt = parser.parse_statement();
        let stmt = arena.alloc(stmt);

        let scope = Scope::root(&arena);
        let ctx = BindContext::new(scope, &arena, &handler);
        let bound = Statement::bind(stmt, &ctx);
        assert_eq!(bound.kind(), StatementKind::List);
        assert!(!handler.has_errors());

        let text = SemanticSerializer::serialize_stmt(bound);
        assert!(text.starts_with("(block (decl i)"));
    }

    #[test]
    fn test_duplicate_declaration_diagnosed() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let root = sources.add_file("stmt.sv", "begin int i; int i; end");
        let pp =
            Preprocessor::new(&arena, &sources, &handler, root, PreprocessorOptions::default());
        let mut parser = Parser::new(&arena, &handler, pp);
        let stmt = parser.parse_statement();
        let stmt = arena.alloc(stmt);

        let scope = Scope::root(&arena);
        let ctx = BindContext::new(scope, &arena, &handler);
        let _ = Statement::bind(stmt, &ctx);
        assert!(handler
            .diagnostics()
            .iter()
            .any(|d| d.code == Some(DiagnosticCode::E_SEM_DUPLICATE)));
    }

    fn bind_first_constraint<'a>(
        arena: &'a Arena,
        handler: &'a Handler,
        sources: &'a mut SourceMap,
        text: &str,
    ) -> &'a Constraint<'a> {
        let root = sources.add_file("c.sv", text);
        let pp = Preprocessor::new(arena, sources, handler, root, PreprocessorOptions::default());
        let mut parser = Parser::new(arena, handler, pp);
        let unit = parser.parse_compilation_unit();

        let scope = Scope::root(arena);
        let ctx = BindContext::new(scope, arena, handler);
        seed_module_scope(unit.modules[0], &ctx);

        let decl = unit.modules[0]
            .items
            .iter()
            .find_map(|item| match item {
                syntax::ModuleItemSyntax::ConstraintDeclaration(decl) => Some(decl),
                _ => None,
            })
            .expect("module contains a constraint declaration");
        Constraint::bind_block(decl.block, &ctx)
    }

    #[test]
    fn test_constraint_kinds() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let constraint = bind_first_constraint(
            &arena,
            &handler,
            &mut sources,
            "module m; rand int x; rand int y; rand int mode;
             constraint c {
                 x > 0;
                 soft y == 2;
                 mode -> x < 8;
                 if (mode) y < 4; else y < 16;
                 unique {x, y};
             } endmodule",
        );

        assert_eq!(constraint.kind(), ConstraintKind::List);
        match constraint {
            Constraint::List(list) => {
                let kinds: Vec<_> = list.items.iter().map(|i| i.kind()).collect();
                assert_eq!(
                    kinds,
                    vec![
                        ConstraintKind::Expression,
                        ConstraintKind::Expression,
                        ConstraintKind::Implication,
                        ConstraintKind::Conditional,
                        ConstraintKind::Uniqueness,
                    ]
                );
                match list.items[1] {
                    Constraint::Expression(expr) => assert!(expr.soft),
                    other => panic!("expected expression constraint, got {:?}", other.kind()),
                }
            }
            other => panic!("expected list, got {:?}", other.kind()),
        }
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_single_element_uniqueness_allowed() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let constraint = bind_first_constraint(
            &arena,
            &handler,
            &mut sources,
            "module m; rand int x; constraint c { unique {x}; } endmodule",
        );
        match constraint {
            Constraint::List(list) => {
                assert_eq!(list.items[0].kind(), ConstraintKind::Uniqueness);
                assert!(!list.items[0].bad());
            }
            other => panic!("expected list, got {:?}", other.kind()),
        }
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_invalid_constraint_target() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let constraint = bind_first_constraint(
            &arena,
            &handler,
            &mut sources,
            "module m; string s; constraint c { s; } endmodule",
        );
        match constraint {
            Constraint::List(list) => assert!(list.items[0].bad()),
            other => panic!("expected list, got {:?}", other.kind()),
        }
        assert!(handler
            .diagnostics()
            .iter()
            .any(|d| d.code == Some(DiagnosticCode::E_SEM_INVALID_CONSTRAINT)));
    }

    #[test]
    fn test_bad_constraint_does_not_stop_siblings() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let constraint = bind_first_constraint(
            &arena,
            &handler,
            &mut sources,
            "module m; rand int x; constraint c { nope > 1; x > 0; } endmodule",
        );
        match constraint {
            Constraint::List(list) => {
                assert_eq!(list.items.len(), 2);
                assert!(list.items[0].bad());
                assert!(!list.items[1].bad());
            }
            other => panic!("expected list, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_serializer_output() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let expr = bind_expr_in(
            &arena,
            &handler,
            &mut sources,
            &[("a", TypeKind::INT)],
            "a + 1",
        );
        let text = SemanticSerializer::serialize_expr(expr);
        assert_eq!(text, "(binary:add (name a) (int 1))");
    }

    #[test]
    fn test_module_scope_seeding() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let root = sources.add_file(
            "m.sv",
            "module m(input logic clk); wire [7:0] bus; parameter W = 8; endmodule",
        );
        let pp =
            Preprocessor::new(&arena, &sources, &handler, root, PreprocessorOptions::default());
        let mut parser = Parser::new(&arena, &handler, pp);
        let unit = parser.parse_compilation_unit();

        let scope = Scope::root(&arena);
        let ctx = BindContext::new(scope, &arena, &handler);
        seed_module_scope(unit.modules[0], &ctx);

        let clk = scope.lookup(svfc_util::Symbol::intern("clk")).unwrap();
        assert_eq!(clk.kind, SymbolKind::Port);
        let bus = scope.lookup(svfc_util::Symbol::intern("bus")).unwrap();
        assert_eq!(bus.ty, TypeKind::integral(8, false, true));
        assert!(scope.lookup(svfc_util::Symbol::intern("W")).is_some());
    }
}
