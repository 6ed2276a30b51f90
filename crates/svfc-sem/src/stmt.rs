//! Bound statements.
//!
//! Statements bind recursively; a list keeps binding its remaining items
//! even when one of them fails, so one malformed statement never aborts
//! its container. A statement whose governing expression failed becomes
//! `Invalid` (carrying the partial node) so badness propagates to direct
//! parents.

use svfc_par::ast as syntax;
use svfc_util::DiagnosticCode;

use crate::expr::Expression;
use crate::scope::{SymbolKind, VarSymbol};
use crate::BindContext;

/// Kind tag for bound statements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatementKind {
    List,
    ExpressionStmt,
    VariableDecl,
    Conditional,
    Case,
    For,
    Forever,
    Repeat,
    While,
    DoWhile,
    Timed,
    ImmediateAssertion,
    Jump,
    Empty,
    Invalid,
}

#[derive(Clone, Copy, Debug)]
pub struct StatementList<'a> {
    pub statements: &'a [&'a Statement<'a>],
    pub syntax: syntax::StatementSyntax<'a>,
}

#[derive(Clone, Copy, Debug)]
pub struct ExpressionStatement<'a> {
    pub expr: &'a Expression<'a>,
    pub syntax: syntax::StatementSyntax<'a>,
}

#[derive(Clone, Copy, Debug)]
pub struct VariableDeclStatement<'a> {
    pub symbols: &'a [VarSymbol],
    pub initializers: &'a [Option<&'a Expression<'a>>],
    pub syntax: syntax::StatementSyntax<'a>,
}

#[derive(Clone, Copy, Debug)]
pub struct ConditionalStatement<'a> {
    pub condition: &'a Expression<'a>,
    pub then_stmt: &'a Statement<'a>,
    pub else_stmt: Option<&'a Statement<'a>>,
    pub syntax: syntax::StatementSyntax<'a>,
}

#[derive(Clone, Copy, Debug)]
pub struct BoundCaseItem<'a> {
    /// Empty for the `default` item.
    pub labels: &'a [&'a Expression<'a>],
    pub statement: &'a Statement<'a>,
}

#[derive(Clone, Copy, Debug)]
pub struct CaseStatement<'a> {
    pub expr: &'a Expression<'a>,
    pub items: &'a [BoundCaseItem<'a>],
    pub syntax: syntax::StatementSyntax<'a>,
}

#[derive(Clone, Copy, Debug)]
pub struct ForLoopStatement<'a> {
    pub initializers: &'a [&'a Expression<'a>],
    pub condition: Option<&'a Expression<'a>>,
    pub steps: &'a [&'a Expression<'a>],
    pub body: &'a Statement<'a>,
    pub syntax: syntax::StatementSyntax<'a>,
}

#[derive(Clone, Copy, Debug)]
pub struct RepeatLoopStatement<'a> {
    pub count: &'a Expression<'a>,
    pub body: &'a Statement<'a>,
    pub syntax: syntax::StatementSyntax<'a>,
}

#[derive(Clone, Copy, Debug)]
pub struct WhileLoopStatement<'a> {
    pub condition: &'a Expression<'a>,
    pub body: &'a Statement<'a>,
    /// True for `do ... while`, where the body runs before the test.
    pub is_do_while: bool,
    pub syntax: syntax::StatementSyntax<'a>,
}

#[derive(Clone, Copy, Debug)]
pub struct ForeverLoopStatement<'a> {
    pub body: &'a Statement<'a>,
    pub syntax: syntax::StatementSyntax<'a>,
}

/// Delay or event control ahead of a statement; the control expressions
/// are bound but not interpreted at this layer.
#[derive(Clone, Copy, Debug)]
pub struct TimedStatement<'a> {
    pub controls: &'a [&'a Expression<'a>],
    pub body: &'a Statement<'a>,
    pub syntax: syntax::StatementSyntax<'a>,
}

#[derive(Clone, Copy, Debug)]
pub struct ImmediateAssertionStatement<'a> {
    pub condition: &'a Expression<'a>,
    pub success: Option<&'a Statement<'a>>,
    pub failure: Option<&'a Statement<'a>>,
    pub syntax: syntax::StatementSyntax<'a>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JumpKind {
    Break,
    Continue,
    Return,
}

#[derive(Clone, Copy, Debug)]
pub struct JumpStatement<'a> {
    pub kind: JumpKind,
    pub expr: Option<&'a Expression<'a>>,
    pub syntax: syntax::StatementSyntax<'a>,
}

#[derive(Clone, Copy, Debug)]
pub struct InvalidStatement<'a> {
    pub child: Option<&'a Statement<'a>>,
    pub syntax: syntax::StatementSyntax<'a>,
}

/// A bound statement node.
#[derive(Clone, Copy, Debug)]
pub enum Statement<'a> {
    List(&'a StatementList<'a>),
    Expression(&'a ExpressionStatement<'a>),
    VariableDecl(&'a VariableDeclStatement<'a>),
    Conditional(&'a ConditionalStatement<'a>),
    Case(&'a CaseStatement<'a>),
    For(&'a ForLoopStatement<'a>),
    Repeat(&'a RepeatLoopStatement<'a>),
    While(&'a WhileLoopStatement<'a>),
    Forever(&'a ForeverLoopStatement<'a>),
    Timed(&'a TimedStatement<'a>),
    ImmediateAssertion(&'a ImmediateAssertionStatement<'a>),
    Jump(&'a JumpStatement<'a>),
    Empty,
    Invalid(&'a InvalidStatement<'a>),
}

impl<'a> Statement<'a> {
    pub fn kind(&self) -> StatementKind {
        match self {
            Self::List(_) => StatementKind::List,
            Self::Expression(_) => StatementKind::ExpressionStmt,
            Self::VariableDecl(_) => StatementKind::VariableDecl,
            Self::Conditional(_) => StatementKind::Conditional,
            Self::Case(_) => StatementKind::Case,
            Self::For(_) => StatementKind::For,
            Self::Repeat(_) => StatementKind::Repeat,
            Self::While(w) => {
                if w.is_do_while {
                    StatementKind::DoWhile
                } else {
                    StatementKind::While
                }
            }
            Self::Forever(_) => StatementKind::Forever,
            Self::Timed(_) => StatementKind::Timed,
            Self::ImmediateAssertion(_) => StatementKind::ImmediateAssertion,
            Self::Jump(_) => StatementKind::Jump,
            Self::Empty => StatementKind::Empty,
            Self::Invalid(_) => StatementKind::Invalid,
        }
    }

    #[inline]
    pub fn bad(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    /// Binds a syntax statement in `ctx`.
    pub fn bind(
        stmt: &syntax::StatementSyntax<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Statement<'a> {
        use syntax::StatementSyntax as Ss;
        match stmt {
            Ss::Block(block) => Self::bind_block(block, *stmt, ctx),
            Ss::Expression(es) => {
                let expr = Expression::bind(&es.expr, ctx);
                let node = ctx.alloc(Statement::Expression(
                    ctx.alloc(ExpressionStatement { expr, syntax: *stmt }),
                ));
                Self::wrap_if(expr.bad(), node, *stmt, ctx)
            }
            Ss::VariableDecl(decl) => Self::bind_variable_decl(decl, *stmt, ctx),
            Ss::Conditional(cond) => Self::bind_conditional(cond, *stmt, ctx),
            Ss::Case(case) => Self::bind_case(case, *stmt, ctx),
            Ss::For(f) => Self::bind_for(f, *stmt, ctx),
            Ss::While(w) => {
                let condition = Expression::bind(&w.condition, ctx);
                let body = Self::bind(&w.body, ctx);
                let node = ctx.alloc(Statement::While(ctx.alloc(WhileLoopStatement {
                    condition,
                    body,
                    is_do_while: false,
                    syntax: *stmt,
                })));
                Self::wrap_if(condition.bad(), node, *stmt, ctx)
            }
            Ss::DoWhile(w) => {
                let body = Self::bind(&w.body, ctx);
                let condition = Expression::bind(&w.condition, ctx);
                let node = ctx.alloc(Statement::While(ctx.alloc(WhileLoopStatement {
                    condition,
                    body,
                    is_do_while: true,
                    syntax: *stmt,
                })));
                Self::wrap_if(condition.bad(), node, *stmt, ctx)
            }
            Ss::Forever(f) => {
                let body = Self::bind(&f.body, ctx);
                ctx.alloc(Statement::Forever(ctx.alloc(ForeverLoopStatement {
                    body,
                    syntax: *stmt,
                })))
            }
            Ss::Repeat(r) => {
                let count = Expression::bind(&r.count, ctx);
                let body = Self::bind(&r.body, ctx);
                let node = ctx.alloc(Statement::Repeat(ctx.alloc(RepeatLoopStatement {
                    count,
                    body,
                    syntax: *stmt,
                })));
                Self::wrap_if(count.bad(), node, *stmt, ctx)
            }
            Ss::Timed(t) => Self::bind_timed(t, *stmt, ctx),
            Ss::ImmediateAssertion(a) => Self::bind_assertion(a, *stmt, ctx),
            Ss::Jump(j) => Self::bind_jump(j, *stmt, ctx),
            Ss::Empty(_) => ctx.alloc(Statement::Empty),
        }
    }

    fn invalid(
        ctx: &BindContext<'a>,
        child: Option<&'a Statement<'a>>,
        syntax: syntax::StatementSyntax<'a>,
    ) -> &'a Statement<'a> {
        ctx.alloc(Statement::Invalid(
            ctx.alloc(InvalidStatement { child, syntax }),
        ))
    }

    fn wrap_if(
        bad: bool,
        node: &'a Statement<'a>,
        syntax: syntax::StatementSyntax<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Statement<'a> {
        if bad {
            Self::invalid(ctx, Some(node), syntax)
        } else {
            node
        }
    }

    fn bind_block(
        block: &syntax::BlockStmt<'a>,
        sx: syntax::StatementSyntax<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Statement<'a> {
        let inner = ctx.child_scope();

        let mut statements = Vec::new();
        for item in block.items {
            // One failed item does not stop the rest of the list.
            statements.push(Self::bind(item, &inner));
        }

        ctx.alloc(Statement::List(ctx.alloc(StatementList {
            statements: ctx.arena.alloc_slice(&statements),
            syntax: sx,
        })))
    }

    fn bind_variable_decl(
        decl: &syntax::VariableDeclaration<'a>,
        sx: syntax::StatementSyntax<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Statement<'a> {
        let ty = crate::type_of_data_type(decl.data_type, ctx);
        let is_rand = decl
            .qualifiers
            .iter()
            .any(|q| matches!(q.kind(), svfc_lex::TokenKind::Rand | svfc_lex::TokenKind::Randc));

        let mut symbols = Vec::new();
        let mut initializers = Vec::new();
        for declarator in decl.declarators.items() {
            let Some(name) = declarator.name.ident() else {
                initializers.push(None);
                continue;
            };
            let symbol = VarSymbol {
                name,
                ty,
                kind: SymbolKind::Variable,
                is_rand,
            };
            if !ctx.scope.declare(symbol) {
                ctx.handler.report(
                    DiagnosticCode::E_SEM_DUPLICATE,
                    declarator.name.span(),
                    format!("'{}' is already declared in this scope", name),
                );
            }
            symbols.push(symbol);

            initializers.push(
                declarator
                    .initializer
                    .map(|init| Expression::bind(&init.expr, ctx)),
            );
        }

        ctx.alloc(Statement::VariableDecl(ctx.alloc(VariableDeclStatement {
            symbols: ctx.arena.alloc_slice(&symbols),
            initializers: ctx.arena.alloc_slice(&initializers),
            syntax: sx,
        })))
    }

    fn bind_conditional(
        cond: &syntax::ConditionalStmt<'a>,
        sx: syntax::StatementSyntax<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Statement<'a> {
        let condition = Expression::bind(&cond.condition, ctx);
        let then_stmt = Self::bind(&cond.then_stmt, ctx);
        let else_stmt = cond.else_stmt.as_ref().map(|s| Self::bind(s, ctx));

        let node = ctx.alloc(Statement::Conditional(ctx.alloc(ConditionalStatement {
            condition,
            then_stmt,
            else_stmt,
            syntax: sx,
        })));
        Self::wrap_if(condition.bad(), node, sx, ctx)
    }

    fn bind_case(
        case: &syntax::CaseStmt<'a>,
        sx: syntax::StatementSyntax<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Statement<'a> {
        let expr = Expression::bind(&case.expr, ctx);

        let mut items = Vec::new();
        for item in case.items {
            let mut labels = Vec::new();
            if let Some(exprs) = &item.expressions {
                for label in exprs.items() {
                    labels.push(Expression::bind(label, ctx));
                }
            }
            items.push(BoundCaseItem {
                labels: ctx.arena.alloc_slice(&labels),
                statement: Self::bind(&item.statement, ctx),
            });
        }

        let node = ctx.alloc(Statement::Case(ctx.alloc(CaseStatement {
            expr,
            items: ctx.arena.alloc_slice(&items),
            syntax: sx,
        })));
        Self::wrap_if(expr.bad(), node, sx, ctx)
    }

    fn bind_for(
        f: &syntax::ForStmt<'a>,
        sx: syntax::StatementSyntax<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Statement<'a> {
        // The loop variable lives in a scope around the whole loop.
        let loop_ctx = ctx.child_scope();

        let mut initializers = Vec::new();
        match &f.init {
            syntax::ForInit::Declaration(decl) => {
                let decl_stmt_syntax = syntax::StatementSyntax::VariableDecl(*decl);
                let bound = Self::bind(&decl_stmt_syntax, &loop_ctx);
                if let Statement::VariableDecl(vd) = bound {
                    for init in vd.initializers.iter().flatten() {
                        initializers.push(*init);
                    }
                }
            }
            syntax::ForInit::Expressions(exprs) => {
                for expr in exprs.exprs.items() {
                    initializers.push(Expression::bind(expr, &loop_ctx));
                }
            }
        }

        let condition = f
            .condition
            .as_ref()
            .map(|c| Expression::bind(c, &loop_ctx));
        let mut steps = Vec::new();
        for step in f.steps.items() {
            steps.push(Expression::bind(step, &loop_ctx));
        }
        let body = Self::bind(&f.body, &loop_ctx);

        let cond_bad = condition.map(|c| c.bad()).unwrap_or(false);
        let node = ctx.alloc(Statement::For(ctx.alloc(ForLoopStatement {
            initializers: ctx.arena.alloc_slice(&initializers),
            condition,
            steps: ctx.arena.alloc_slice(&steps),
            body,
            syntax: sx,
        })));
        Self::wrap_if(cond_bad, node, sx, ctx)
    }

    fn bind_timed(
        t: &syntax::TimedStmt<'a>,
        sx: syntax::StatementSyntax<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Statement<'a> {
        let mut controls = Vec::new();
        match &t.control {
            syntax::TimingControlSyntax::Delay(delay) => {
                controls.push(Expression::bind(&delay.expr, ctx));
            }
            syntax::TimingControlSyntax::Event(event) => {
                if let syntax::EventControlBody::Parenthesized { events, .. } = &event.body {
                    for ev in events.items() {
                        if let Some(expr) = &ev.expr {
                            controls.push(Expression::bind(expr, ctx));
                        }
                    }
                }
            }
        }

        let body = Self::bind(&t.statement, ctx);
        let any_bad = controls.iter().any(|c| c.bad());
        let node = ctx.alloc(Statement::Timed(ctx.alloc(TimedStatement {
            controls: ctx.arena.alloc_slice(&controls),
            body,
            syntax: sx,
        })));
        Self::wrap_if(any_bad, node, sx, ctx)
    }

    fn bind_assertion(
        a: &syntax::ImmediateAssertStmt<'a>,
        sx: syntax::StatementSyntax<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Statement<'a> {
        let condition = Expression::bind(&a.condition, ctx);
        let success = a.action.statement.as_ref().map(|s| Self::bind(s, ctx));
        let failure = a
            .action
            .else_statement
            .as_ref()
            .map(|s| Self::bind(s, ctx));

        let node = ctx.alloc(Statement::ImmediateAssertion(ctx.alloc(
            ImmediateAssertionStatement {
                condition,
                success,
                failure,
                syntax: sx,
            },
        )));
        Self::wrap_if(condition.bad(), node, sx, ctx)
    }

    fn bind_jump(
        j: &syntax::JumpStmt<'a>,
        sx: syntax::StatementSyntax<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Statement<'a> {
        let kind = match j.keyword.kind() {
            svfc_lex::TokenKind::Break => JumpKind::Break,
            svfc_lex::TokenKind::Continue => JumpKind::Continue,
            _ => JumpKind::Return,
        };
        let expr = j.expr.as_ref().map(|e| Expression::bind(e, ctx));
        let bad = expr.map(|e| e.bad()).unwrap_or(false);

        let node = ctx.alloc(Statement::Jump(ctx.alloc(JumpStatement {
            kind,
            expr,
            syntax: sx,
        })));
        Self::wrap_if(bad, node, sx, ctx)
    }
}

/// Width of one dimension, when its bounds are compile-time constants.
pub(crate) fn bound_width<'a>(
    dimension: &syntax::Dimension<'a>,
    ctx: &BindContext<'a>,
) -> Option<u32> {
    match &dimension.contents {
        syntax::DimensionContents::Range { left, colon: _, right } => {
            let left = Expression::bind(left, ctx).constant_value()?;
            let right = Expression::bind(right, ctx).constant_value()?;
            Some(left.abs_diff(right) as u32 + 1)
        }
        syntax::DimensionContents::Single(expr) => {
            Expression::bind(expr, ctx).constant_value().map(|v| v as u32)
        }
        syntax::DimensionContents::Unsized => None,
    }
}
