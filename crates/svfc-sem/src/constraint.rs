//! Bound randomization constraints.
//!
//! Constraint binding follows the same failure policy as expressions: a
//! constraint whose guard or body fails becomes `Invalid` with the best
//! partial child attached, and containers keep binding their remaining
//! items.

use svfc_par::ast as syntax;
use svfc_util::DiagnosticCode;

use crate::expr::Expression;
use crate::BindContext;

/// Kind tag for bound constraints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstraintKind {
    List,
    Expression,
    Implication,
    Conditional,
    Uniqueness,
    Invalid,
}

/// Ordered sequence of child constraints (a `{ ... }` block).
#[derive(Clone, Copy, Debug)]
pub struct ConstraintList<'a> {
    pub items: &'a [&'a Constraint<'a>],
}

/// A boolean expression constraint, possibly `soft`.
#[derive(Clone, Copy, Debug)]
pub struct ExpressionConstraint<'a> {
    pub expr: &'a Expression<'a>,
    pub soft: bool,
}

/// `predicate -> body`.
#[derive(Clone, Copy, Debug)]
pub struct ImplicationConstraint<'a> {
    pub predicate: &'a Expression<'a>,
    pub body: &'a Constraint<'a>,
}

/// `if (predicate) body [else else_body]`.
#[derive(Clone, Copy, Debug)]
pub struct ConditionalConstraint<'a> {
    pub predicate: &'a Expression<'a>,
    pub body: &'a Constraint<'a>,
    pub else_body: Option<&'a Constraint<'a>>,
}

/// `unique { exprs }`: the values must be pairwise distinct.
#[derive(Clone, Copy, Debug)]
pub struct UniquenessConstraint<'a> {
    pub items: &'a [&'a Expression<'a>],
}

/// Sentinel for a failed bind.
#[derive(Clone, Copy, Debug)]
pub struct InvalidConstraint<'a> {
    pub child: Option<&'a Constraint<'a>>,
}

/// A bound constraint node.
#[derive(Clone, Copy, Debug)]
pub enum Constraint<'a> {
    List(&'a ConstraintList<'a>),
    Expression(&'a ExpressionConstraint<'a>),
    Implication(&'a ImplicationConstraint<'a>),
    Conditional(&'a ConditionalConstraint<'a>),
    Uniqueness(&'a UniquenessConstraint<'a>),
    Invalid(&'a InvalidConstraint<'a>),
}

impl<'a> Constraint<'a> {
    pub fn kind(&self) -> ConstraintKind {
        match self {
            Self::List(_) => ConstraintKind::List,
            Self::Expression(_) => ConstraintKind::Expression,
            Self::Implication(_) => ConstraintKind::Implication,
            Self::Conditional(_) => ConstraintKind::Conditional,
            Self::Uniqueness(_) => ConstraintKind::Uniqueness,
            Self::Invalid(_) => ConstraintKind::Invalid,
        }
    }

    #[inline]
    pub fn bad(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    /// Binds a constraint block into a `List`.
    pub fn bind_block(
        block: &syntax::ConstraintBlock<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Constraint<'a> {
        let mut items = Vec::new();
        for item in block.items {
            items.push(Self::bind(item, ctx));
        }
        ctx.alloc(Constraint::List(ctx.alloc(ConstraintList {
            items: ctx.arena.alloc_slice(&items),
        })))
    }

    /// Binds one constraint item.
    pub fn bind(
        item: &syntax::ConstraintItemSyntax<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Constraint<'a> {
        use syntax::ConstraintItemSyntax as Cs;
        match item {
            Cs::Block(block) => Self::bind_block(block, ctx),
            Cs::Expression(expr) => Self::bind_expression(expr, ctx),
            Cs::Implication(imp) => Self::bind_implication(imp, ctx),
            Cs::Conditional(cond) => Self::bind_conditional(cond, ctx),
            Cs::Uniqueness(unique) => Self::bind_uniqueness(unique, ctx),
        }
    }

    fn invalid(
        ctx: &BindContext<'a>,
        child: Option<&'a Constraint<'a>>,
    ) -> &'a Constraint<'a> {
        ctx.alloc(Constraint::Invalid(ctx.alloc(InvalidConstraint { child })))
    }

    /// A constraint expression must be integral; anything else is not a
    /// valid constraint target.
    fn check_constraint_expr(
        expr: &'a Expression<'a>,
        span: svfc_util::Span,
        ctx: &BindContext<'a>,
    ) -> bool {
        if expr.bad() {
            // Already diagnosed at the root cause.
            return false;
        }
        if !expr.ty().is_integral() {
            ctx.handler.report(
                DiagnosticCode::E_SEM_INVALID_CONSTRAINT,
                span,
                "constraint expression must be integral",
            );
            return false;
        }
        true
    }

    fn bind_expression(
        expr: &syntax::ExpressionConstraint<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Constraint<'a> {
        let bound = Expression::bind(&expr.expr, ctx);
        let span = expr.expr.first_token().span();
        let ok = Self::check_constraint_expr(bound, span, ctx);

        let node = ctx.alloc(Constraint::Expression(ctx.alloc(ExpressionConstraint {
            expr: bound,
            soft: expr.soft.is_some(),
        })));

        if !ok {
            return Self::invalid(ctx, Some(node));
        }
        node
    }

    fn bind_implication(
        imp: &syntax::ImplicationConstraint<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Constraint<'a> {
        let predicate = Expression::bind(&imp.predicate, ctx);
        let body = Self::bind(imp.body, ctx);

        let span = imp.predicate.first_token().span();
        let pred_ok = Self::check_constraint_expr(predicate, span, ctx);

        let node = ctx.alloc(Constraint::Implication(ctx.alloc(ImplicationConstraint {
            predicate,
            body,
        })));

        if !pred_ok || body.bad() {
            return Self::invalid(ctx, Some(node));
        }
        node
    }

    fn bind_conditional(
        cond: &syntax::ConditionalConstraint<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Constraint<'a> {
        let predicate = Expression::bind(&cond.condition, ctx);
        let body = Self::bind(cond.body, ctx);
        let else_body = cond.else_body.map(|e| Self::bind(e, ctx));

        let span = cond.condition.first_token().span();
        let pred_ok = Self::check_constraint_expr(predicate, span, ctx);

        let node = ctx.alloc(Constraint::Conditional(ctx.alloc(ConditionalConstraint {
            predicate,
            body,
            else_body,
        })));

        let else_bad = else_body.map(|e| e.bad()).unwrap_or(false);
        if !pred_ok || body.bad() || else_bad {
            return Self::invalid(ctx, Some(node));
        }
        node
    }

    fn bind_uniqueness(
        unique: &syntax::UniquenessConstraint<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Constraint<'a> {
        let mut items = Vec::new();
        let mut all_ok = true;

        for item in unique.items.items() {
            let bound = Expression::bind(item, ctx);
            let span = item.first_token().span();
            all_ok &= Self::check_constraint_expr(bound, span, ctx);
            items.push(bound);
        }

        // A single element is legal (vacuously distinct); an empty set
        // was already diagnosed by the parser.
        if items.is_empty() {
            all_ok = false;
        }

        let node = ctx.alloc(Constraint::Uniqueness(ctx.alloc(UniquenessConstraint {
            items: ctx.arena.alloc_slice(&items),
        })));

        if !all_ok {
            return Self::invalid(ctx, Some(node));
        }
        node
    }
}
