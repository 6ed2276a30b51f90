//! Bound expressions.
//!
//! `Expression::bind` lifts a syntax expression into a kind-tagged
//! semantic node. Failure is total but local: a bind that cannot produce
//! a well-typed node returns `Invalid` carrying its best partial child,
//! and any parent that receives an `Invalid` child wraps its own result
//! so `bad()` propagates all the way up. Diagnostics fire once at the
//! root cause; parents seeing an error type stay silent.

use svfc_lex::{TokenKind, TokenValue};
use svfc_par::ast as syntax;
use svfc_util::DiagnosticCode;

use crate::types::TypeKind;
use crate::scope::VarSymbol;
use crate::BindContext;

/// Kind tag for bound expressions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpressionKind {
    IntegerLiteral,
    RealLiteral,
    StringLiteral,
    NamedValue,
    UnaryOp,
    BinaryOp,
    ConditionalOp,
    Assignment,
    ElementSelect,
    RangeSelect,
    MemberAccess,
    Concatenation,
    Replication,
    Call,
    Inside,
    Invalid,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,
    Minus,
    LogicalNot,
    BitwiseNot,
    ReductionAnd,
    ReductionNand,
    ReductionOr,
    ReductionNor,
    ReductionXor,
    ReductionXnor,
    Preincrement,
    Predecrement,
    Postincrement,
    Postdecrement,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Mod,
    Power,
    Equality,
    Inequality,
    CaseEquality,
    CaseInequality,
    WildcardEquality,
    WildcardInequality,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    LogicalAnd,
    LogicalOr,
    BinaryAnd,
    BinaryOr,
    BinaryXor,
    BinaryXnor,
    LogicalShiftLeft,
    LogicalShiftRight,
    ArithmeticShiftLeft,
    ArithmeticShiftRight,
}

impl BinaryOperator {
    /// True for operators whose result is a single bit.
    pub fn is_comparison(self) -> bool {
        use BinaryOperator::*;
        matches!(
            self,
            Equality
                | Inequality
                | CaseEquality
                | CaseInequality
                | WildcardEquality
                | WildcardInequality
                | LessThan
                | LessThanEqual
                | GreaterThan
                | GreaterThanEqual
                | LogicalAnd
                | LogicalOr
        )
    }

    pub fn is_shift(self) -> bool {
        use BinaryOperator::*;
        matches!(
            self,
            LogicalShiftLeft | LogicalShiftRight | ArithmeticShiftLeft | ArithmeticShiftRight
        )
    }

    fn from_token(kind: TokenKind) -> Option<BinaryOperator> {
        use BinaryOperator::*;
        Some(match kind {
            TokenKind::Plus => Add,
            TokenKind::Minus => Subtract,
            TokenKind::Star => Multiply,
            TokenKind::Slash => Divide,
            TokenKind::Percent => Mod,
            TokenKind::DoubleStar => Power,
            TokenKind::DoubleEquals => Equality,
            TokenKind::NotEquals => Inequality,
            TokenKind::CaseEquals => CaseEquality,
            TokenKind::CaseNotEquals => CaseInequality,
            TokenKind::WildcardEquals => WildcardEquality,
            TokenKind::WildcardNotEquals => WildcardInequality,
            TokenKind::Lt => LessThan,
            TokenKind::Lte => LessThanEqual,
            TokenKind::Gt => GreaterThan,
            TokenKind::Gte => GreaterThanEqual,
            TokenKind::DoubleAmp => LogicalAnd,
            TokenKind::DoublePipe => LogicalOr,
            TokenKind::Amp => BinaryAnd,
            TokenKind::Pipe => BinaryOr,
            TokenKind::Caret => BinaryXor,
            TokenKind::CaretTilde | TokenKind::TildeCaret => BinaryXnor,
            TokenKind::Shl => LogicalShiftLeft,
            TokenKind::Shr => LogicalShiftRight,
            TokenKind::Ashl => ArithmeticShiftLeft,
            TokenKind::Ashr => ArithmeticShiftRight,
            _ => return None,
        })
    }
}

/// How an assignment updates its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignmentKind {
    Blocking,
    NonBlocking,
    Compound(BinaryOperator),
}

// ----------------------------------------------------------------------
// Node payloads
// ----------------------------------------------------------------------

#[derive(Clone, Copy, Debug)]
pub struct IntegerLiteralExpr<'a> {
    pub value: u64,
    /// Unknown-bit mask; nonzero when the literal carried X or Z digits.
    pub xz: u64,
    pub ty: TypeKind,
    pub syntax: syntax::ExpressionSyntax<'a>,
}

#[derive(Clone, Copy, Debug)]
pub struct RealLiteralExpr<'a> {
    pub value: f64,
    pub ty: TypeKind,
    pub syntax: syntax::ExpressionSyntax<'a>,
}

#[derive(Clone, Copy, Debug)]
pub struct StringLiteralExpr<'a> {
    pub value: &'a str,
    pub ty: TypeKind,
    pub syntax: syntax::ExpressionSyntax<'a>,
}

#[derive(Clone, Copy, Debug)]
pub struct NamedValueExpr<'a> {
    pub symbol: VarSymbol,
    pub ty: TypeKind,
    pub syntax: syntax::ExpressionSyntax<'a>,
}

#[derive(Clone, Copy, Debug)]
pub struct UnaryOpExpr<'a> {
    pub op: UnaryOperator,
    pub operand: &'a Expression<'a>,
    pub ty: TypeKind,
    pub syntax: syntax::ExpressionSyntax<'a>,
}

#[derive(Clone, Copy, Debug)]
pub struct BinaryOpExpr<'a> {
    pub op: BinaryOperator,
    pub left: &'a Expression<'a>,
    pub right: &'a Expression<'a>,
    pub ty: TypeKind,
    pub syntax: syntax::ExpressionSyntax<'a>,
}

#[derive(Clone, Copy, Debug)]
pub struct ConditionalOpExpr<'a> {
    pub condition: &'a Expression<'a>,
    pub true_expr: &'a Expression<'a>,
    pub false_expr: &'a Expression<'a>,
    pub ty: TypeKind,
    pub syntax: syntax::ExpressionSyntax<'a>,
}

#[derive(Clone, Copy, Debug)]
pub struct AssignmentOpExpr<'a> {
    pub kind: AssignmentKind,
    pub target: &'a Expression<'a>,
    pub value: &'a Expression<'a>,
    pub ty: TypeKind,
    pub syntax: syntax::ExpressionSyntax<'a>,
}

#[derive(Clone, Copy, Debug)]
pub struct ElementSelectExpr<'a> {
    pub base: &'a Expression<'a>,
    pub index: &'a Expression<'a>,
    pub ty: TypeKind,
    pub syntax: syntax::ExpressionSyntax<'a>,
}

#[derive(Clone, Copy, Debug)]
pub struct RangeSelectExpr<'a> {
    pub base: &'a Expression<'a>,
    pub left: &'a Expression<'a>,
    pub right: &'a Expression<'a>,
    pub ty: TypeKind,
    pub syntax: syntax::ExpressionSyntax<'a>,
}

#[derive(Clone, Copy, Debug)]
pub struct MemberAccessExpr<'a> {
    pub base: &'a Expression<'a>,
    pub member: svfc_util::Symbol,
    pub ty: TypeKind,
    pub syntax: syntax::ExpressionSyntax<'a>,
}

#[derive(Clone, Copy, Debug)]
pub struct ConcatenationExpr<'a> {
    pub operands: &'a [&'a Expression<'a>],
    pub ty: TypeKind,
    pub syntax: syntax::ExpressionSyntax<'a>,
}

#[derive(Clone, Copy, Debug)]
pub struct ReplicationExpr<'a> {
    pub count: &'a Expression<'a>,
    pub concat: &'a Expression<'a>,
    pub ty: TypeKind,
    pub syntax: syntax::ExpressionSyntax<'a>,
}

#[derive(Clone, Copy, Debug)]
pub struct CallExpr<'a> {
    pub name: svfc_util::Symbol,
    pub is_system: bool,
    pub args: &'a [&'a Expression<'a>],
    pub ty: TypeKind,
    pub syntax: syntax::ExpressionSyntax<'a>,
}

#[derive(Clone, Copy, Debug)]
pub struct InsideExpr<'a> {
    pub operand: &'a Expression<'a>,
    /// (low, high) pairs; a plain element binds as (expr, expr).
    pub ranges: &'a [(&'a Expression<'a>, &'a Expression<'a>)],
    pub ty: TypeKind,
    pub syntax: syntax::ExpressionSyntax<'a>,
}

/// Sentinel for a failed bind, carrying the best partial child.
#[derive(Clone, Copy, Debug)]
pub struct InvalidExpr<'a> {
    pub child: Option<&'a Expression<'a>>,
    pub syntax: syntax::ExpressionSyntax<'a>,
}

/// A bound expression node.
#[derive(Clone, Copy, Debug)]
pub enum Expression<'a> {
    IntegerLiteral(&'a IntegerLiteralExpr<'a>),
    RealLiteral(&'a RealLiteralExpr<'a>),
    StringLiteral(&'a StringLiteralExpr<'a>),
    NamedValue(&'a NamedValueExpr<'a>),
    Unary(&'a UnaryOpExpr<'a>),
    Binary(&'a BinaryOpExpr<'a>),
    Conditional(&'a ConditionalOpExpr<'a>),
    Assignment(&'a AssignmentOpExpr<'a>),
    ElementSelect(&'a ElementSelectExpr<'a>),
    RangeSelect(&'a RangeSelectExpr<'a>),
    MemberAccess(&'a MemberAccessExpr<'a>),
    Concatenation(&'a ConcatenationExpr<'a>),
    Replication(&'a ReplicationExpr<'a>),
    Call(&'a CallExpr<'a>),
    Inside(&'a InsideExpr<'a>),
    Invalid(&'a InvalidExpr<'a>),
}

impl<'a> Expression<'a> {
    pub fn kind(&self) -> ExpressionKind {
        match self {
            Self::IntegerLiteral(_) => ExpressionKind::IntegerLiteral,
            Self::RealLiteral(_) => ExpressionKind::RealLiteral,
            Self::StringLiteral(_) => ExpressionKind::StringLiteral,
            Self::NamedValue(_) => ExpressionKind::NamedValue,
            Self::Unary(_) => ExpressionKind::UnaryOp,
            Self::Binary(_) => ExpressionKind::BinaryOp,
            Self::Conditional(_) => ExpressionKind::ConditionalOp,
            Self::Assignment(_) => ExpressionKind::Assignment,
            Self::ElementSelect(_) => ExpressionKind::ElementSelect,
            Self::RangeSelect(_) => ExpressionKind::RangeSelect,
            Self::MemberAccess(_) => ExpressionKind::MemberAccess,
            Self::Concatenation(_) => ExpressionKind::Concatenation,
            Self::Replication(_) => ExpressionKind::Replication,
            Self::Call(_) => ExpressionKind::Call,
            Self::Inside(_) => ExpressionKind::Inside,
            Self::Invalid(_) => ExpressionKind::Invalid,
        }
    }

    /// True for `Invalid` nodes; the error-propagation predicate.
    #[inline]
    pub fn bad(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    pub fn ty(&self) -> TypeKind {
        match self {
            Self::IntegerLiteral(n) => n.ty,
            Self::RealLiteral(n) => n.ty,
            Self::StringLiteral(n) => n.ty,
            Self::NamedValue(n) => n.ty,
            Self::Unary(n) => n.ty,
            Self::Binary(n) => n.ty,
            Self::Conditional(n) => n.ty,
            Self::Assignment(n) => n.ty,
            Self::ElementSelect(n) => n.ty,
            Self::RangeSelect(n) => n.ty,
            Self::MemberAccess(n) => n.ty,
            Self::Concatenation(n) => n.ty,
            Self::Replication(n) => n.ty,
            Self::Call(n) => n.ty,
            Self::Inside(n) => n.ty,
            Self::Invalid(_) => TypeKind::Error,
        }
    }

    pub fn syntax(&self) -> syntax::ExpressionSyntax<'a> {
        match self {
            Self::IntegerLiteral(n) => n.syntax,
            Self::RealLiteral(n) => n.syntax,
            Self::StringLiteral(n) => n.syntax,
            Self::NamedValue(n) => n.syntax,
            Self::Unary(n) => n.syntax,
            Self::Binary(n) => n.syntax,
            Self::Conditional(n) => n.syntax,
            Self::Assignment(n) => n.syntax,
            Self::ElementSelect(n) => n.syntax,
            Self::RangeSelect(n) => n.syntax,
            Self::MemberAccess(n) => n.syntax,
            Self::Concatenation(n) => n.syntax,
            Self::Replication(n) => n.syntax,
            Self::Call(n) => n.syntax,
            Self::Inside(n) => n.syntax,
            Self::Invalid(n) => n.syntax,
        }
    }

    /// Evaluates the expression as a compile-time integer, when all its
    /// leaves are known two-state constants.
    pub fn constant_value(&self) -> Option<u64> {
        match self {
            Self::IntegerLiteral(n) if n.xz == 0 => Some(n.value),
            Self::Unary(n) => {
                let v = n.operand.constant_value()?;
                Some(match n.op {
                    UnaryOperator::Plus => v,
                    UnaryOperator::Minus => v.wrapping_neg(),
                    UnaryOperator::BitwiseNot => !v,
                    UnaryOperator::LogicalNot => (v == 0) as u64,
                    _ => return None,
                })
            }
            Self::Binary(n) => {
                let l = n.left.constant_value()?;
                let r = n.right.constant_value()?;
                use BinaryOperator::*;
                Some(match n.op {
                    Add => l.wrapping_add(r),
                    Subtract => l.wrapping_sub(r),
                    Multiply => l.wrapping_mul(r),
                    Divide => l.checked_div(r)?,
                    Mod => l.checked_rem(r)?,
                    Power => l.checked_pow(u32::try_from(r).ok()?)?,
                    Equality | CaseEquality => (l == r) as u64,
                    Inequality | CaseInequality => (l != r) as u64,
                    LessThan => (l < r) as u64,
                    LessThanEqual => (l <= r) as u64,
                    GreaterThan => (l > r) as u64,
                    GreaterThanEqual => (l >= r) as u64,
                    LogicalAnd => (l != 0 && r != 0) as u64,
                    LogicalOr => (l != 0 || r != 0) as u64,
                    BinaryAnd => l & r,
                    BinaryOr => l | r,
                    BinaryXor => l ^ r,
                    BinaryXnor => !(l ^ r),
                    LogicalShiftLeft | ArithmeticShiftLeft => l.checked_shl(r as u32)?,
                    LogicalShiftRight => l.checked_shr(r as u32)?,
                    ArithmeticShiftRight => ((l as i64).checked_shr(r as u32)?) as u64,
                    WildcardEquality | WildcardInequality => return None,
                })
            }
            Self::Conditional(n) => {
                let c = n.condition.constant_value()?;
                if c != 0 {
                    n.true_expr.constant_value()
                } else {
                    n.false_expr.constant_value()
                }
            }
            _ => None,
        }
    }

    // ==================================================================
    // Binding
    // ==================================================================

    /// Binds a syntax expression in `ctx`.
    pub fn bind(
        expr: &syntax::ExpressionSyntax<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Expression<'a> {
        use syntax::ExpressionSyntax as Es;
        match expr {
            Es::Literal(lit) => Self::bind_literal(lit, *expr, ctx),
            Es::Name(name) => Self::bind_name(name, *expr, ctx),
            Es::Unary(unary) => Self::bind_unary(unary, *expr, ctx),
            Es::PostfixUnary(postfix) => Self::bind_postfix(postfix, *expr, ctx),
            Es::Binary(binary) => Self::bind_binary(binary, *expr, ctx),
            Es::Conditional(cond) => Self::bind_conditional(cond, *expr, ctx),
            Es::Assignment(assign) => Self::bind_assignment(assign, *expr, ctx),
            Es::ElementSelect(select) => Self::bind_element_select(select, *expr, ctx),
            Es::RangeSelect(select) => Self::bind_range_select(select, *expr, ctx),
            Es::MemberAccess(access) => Self::bind_member_access(access, *expr, ctx),
            Es::Call(call) => Self::bind_call(call, *expr, ctx),
            Es::Concatenation(concat) => Self::bind_concatenation(concat, *expr, ctx),
            Es::Replication(repl) => Self::bind_replication(repl, *expr, ctx),
            Es::Inside(inside) => Self::bind_inside(inside, *expr, ctx),
            // Parentheses and min:typ:max evaluate to their payload (the
            // typical value, for the latter).
            Es::Paren(paren) => Self::bind(&paren.expr, ctx),
            Es::MinTypMax(mtm) => Self::bind(&mtm.typ, ctx),
        }
    }

    pub(crate) fn invalid(
        ctx: &BindContext<'a>,
        child: Option<&'a Expression<'a>>,
        syntax: syntax::ExpressionSyntax<'a>,
    ) -> &'a Expression<'a> {
        ctx.alloc(Expression::Invalid(ctx.alloc(InvalidExpr { child, syntax })))
    }

    fn bind_literal(
        lit: &syntax::LiteralExpr<'a>,
        sx: syntax::ExpressionSyntax<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Expression<'a> {
        let token = lit.token;
        match token.value() {
            TokenValue::Integer(value) => {
                ctx.alloc(Expression::IntegerLiteral(ctx.alloc(IntegerLiteralExpr {
                    value,
                    xz: 0,
                    ty: TypeKind::INT,
                    syntax: sx,
                })))
            }
            TokenValue::Vector(v) => {
                ctx.alloc(Expression::IntegerLiteral(ctx.alloc(IntegerLiteralExpr {
                    value: v.value,
                    xz: v.xz,
                    ty: TypeKind::integral(v.width, v.signed, true),
                    syntax: sx,
                })))
            }
            TokenValue::Real(value) => {
                ctx.alloc(Expression::RealLiteral(ctx.alloc(RealLiteralExpr {
                    value,
                    ty: TypeKind::Real,
                    syntax: sx,
                })))
            }
            TokenValue::Time(magnitude, _unit) => {
                ctx.alloc(Expression::RealLiteral(ctx.alloc(RealLiteralExpr {
                    value: magnitude,
                    ty: TypeKind::Real,
                    syntax: sx,
                })))
            }
            TokenValue::Str(value) => {
                ctx.alloc(Expression::StringLiteral(ctx.alloc(StringLiteralExpr {
                    value,
                    ty: TypeKind::String,
                    syntax: sx,
                })))
            }
            _ => match token.kind() {
                // `null` behaves as a zero constant at this layer.
                TokenKind::Null => {
                    ctx.alloc(Expression::IntegerLiteral(ctx.alloc(IntegerLiteralExpr {
                        value: 0,
                        xz: 0,
                        ty: TypeKind::INT,
                        syntax: sx,
                    })))
                }
                _ => {
                    ctx.handler.report(
                        DiagnosticCode::E_SEM_UNDECLARED,
                        token.span(),
                        format!("'{}' is not valid in this context", token.display_text()),
                    );
                    Self::invalid(ctx, None, sx)
                }
            },
        }
    }

    fn bind_name(
        name: &syntax::NameSyntax<'a>,
        sx: syntax::ExpressionSyntax<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Expression<'a> {
        let token = name.token;

        // System names bind as zero-argument calls when used bare.
        if token.kind() == TokenKind::SystemIdentifier {
            let sym = token.ident().expect("system identifier carries a symbol");
            return ctx.alloc(Expression::Call(ctx.alloc(CallExpr {
                name: sym,
                is_system: true,
                args: &[],
                ty: TypeKind::Void,
                syntax: sx,
            })));
        }

        let Some(sym) = token.ident() else {
            // A missing token synthesized by parser recovery; the parser
            // already diagnosed it.
            return Self::invalid(ctx, None, sx);
        };

        match ctx.scope.lookup(sym) {
            Some(symbol) => ctx.alloc(Expression::NamedValue(ctx.alloc(NamedValueExpr {
                symbol,
                ty: symbol.ty,
                syntax: sx,
            }))),
            None => {
                ctx.handler.report(
                    DiagnosticCode::E_SEM_UNDECLARED,
                    token.span(),
                    format!("use of undeclared name '{}'", sym),
                );
                Self::invalid(ctx, None, sx)
            }
        }
    }

    fn bind_unary(
        unary: &syntax::UnaryExpr<'a>,
        sx: syntax::ExpressionSyntax<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Expression<'a> {
        let operand = Self::bind(&unary.operand, ctx);

        let op = match unary.op.kind() {
            TokenKind::Plus => UnaryOperator::Plus,
            TokenKind::Minus => UnaryOperator::Minus,
            TokenKind::Bang => UnaryOperator::LogicalNot,
            TokenKind::Tilde => UnaryOperator::BitwiseNot,
            TokenKind::Amp => UnaryOperator::ReductionAnd,
            TokenKind::TildeAmp => UnaryOperator::ReductionNand,
            TokenKind::Pipe => UnaryOperator::ReductionOr,
            TokenKind::TildePipe => UnaryOperator::ReductionNor,
            TokenKind::Caret => UnaryOperator::ReductionXor,
            TokenKind::TildeCaret | TokenKind::CaretTilde => UnaryOperator::ReductionXnor,
            TokenKind::PlusPlus => UnaryOperator::Preincrement,
            TokenKind::MinusMinus => UnaryOperator::Predecrement,
            _ => {
                return Self::invalid(ctx, Some(operand), sx);
            }
        };

        let ty = Self::unary_type(op, operand, ctx, unary);
        let node = ctx.alloc(Expression::Unary(ctx.alloc(UnaryOpExpr {
            op,
            operand,
            ty,
            syntax: sx,
        })));

        if operand.bad() {
            return Self::invalid(ctx, Some(node), sx);
        }
        node
    }

    fn unary_type(
        op: UnaryOperator,
        operand: &'a Expression<'a>,
        ctx: &BindContext<'a>,
        unary: &syntax::UnaryExpr<'a>,
    ) -> TypeKind {
        use UnaryOperator::*;
        let operand_ty = operand.ty();
        if operand_ty.is_error() {
            return TypeKind::Error;
        }
        match op {
            LogicalNot => TypeKind::BIT,
            ReductionAnd | ReductionNand | ReductionOr | ReductionNor | ReductionXor
            | ReductionXnor => {
                if !operand_ty.is_integral() {
                    ctx.handler.report(
                        DiagnosticCode::E_SEM_TYPE_MISMATCH,
                        unary.op.span(),
                        "reduction operator requires an integral operand",
                    );
                    return TypeKind::Error;
                }
                TypeKind::LOGIC
            }
            Plus | Minus => {
                if !operand_ty.is_numeric() {
                    ctx.handler.report(
                        DiagnosticCode::E_SEM_TYPE_MISMATCH,
                        unary.op.span(),
                        "arithmetic operator requires a numeric operand",
                    );
                    return TypeKind::Error;
                }
                operand_ty
            }
            BitwiseNot | Preincrement | Predecrement | Postincrement | Postdecrement => {
                if !operand_ty.is_integral() {
                    ctx.handler.report(
                        DiagnosticCode::E_SEM_TYPE_MISMATCH,
                        unary.op.span(),
                        "operator requires an integral operand",
                    );
                    return TypeKind::Error;
                }
                operand_ty
            }
        }
    }

    fn bind_postfix(
        postfix: &syntax::PostfixUnaryExpr<'a>,
        sx: syntax::ExpressionSyntax<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Expression<'a> {
        let operand = Self::bind(&postfix.operand, ctx);
        let op = match postfix.op.kind() {
            TokenKind::PlusPlus => UnaryOperator::Postincrement,
            _ => UnaryOperator::Postdecrement,
        };
        let ty = if operand.ty().is_error() {
            TypeKind::Error
        } else {
            operand.ty()
        };

        let node = ctx.alloc(Expression::Unary(ctx.alloc(UnaryOpExpr {
            op,
            operand,
            ty,
            syntax: sx,
        })));
        if operand.bad() {
            return Self::invalid(ctx, Some(node), sx);
        }
        node
    }

    fn bind_binary(
        binary: &syntax::BinaryExpr<'a>,
        sx: syntax::ExpressionSyntax<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Expression<'a> {
        let left = Self::bind(&binary.left, ctx);
        let right = Self::bind(&binary.right, ctx);

        let Some(op) = BinaryOperator::from_token(binary.op.kind()) else {
            return Self::invalid(ctx, Some(left), sx);
        };

        let lt = left.ty();
        let rt = right.ty();
        let ty = if lt.is_error() || rt.is_error() {
            TypeKind::Error
        } else if op.is_comparison() {
            TypeKind::BIT
        } else if op.is_shift() {
            lt
        } else {
            let combined = lt.arithmetic_result(rt);
            if combined.is_error() {
                ctx.handler.report(
                    DiagnosticCode::E_SEM_TYPE_MISMATCH,
                    binary.op.span(),
                    format!("operands of '{}' have incompatible types", binary.op.raw()),
                );
            }
            combined
        };

        let node = ctx.alloc(Expression::Binary(ctx.alloc(BinaryOpExpr {
            op,
            left,
            right,
            ty,
            syntax: sx,
        })));

        if left.bad() || right.bad() {
            return Self::invalid(ctx, Some(node), sx);
        }
        node
    }

    fn bind_conditional(
        cond: &syntax::ConditionalExpr<'a>,
        sx: syntax::ExpressionSyntax<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Expression<'a> {
        let condition = Self::bind(&cond.condition, ctx);
        let true_expr = Self::bind(&cond.true_expr, ctx);
        let false_expr = Self::bind(&cond.false_expr, ctx);

        let ty = if condition.ty().is_error() {
            TypeKind::Error
        } else {
            true_expr.ty().arithmetic_result(false_expr.ty())
        };

        let node = ctx.alloc(Expression::Conditional(ctx.alloc(ConditionalOpExpr {
            condition,
            true_expr,
            false_expr,
            ty,
            syntax: sx,
        })));

        if condition.bad() || true_expr.bad() || false_expr.bad() {
            return Self::invalid(ctx, Some(node), sx);
        }
        node
    }

    fn bind_assignment(
        assign: &syntax::AssignmentExpr<'a>,
        sx: syntax::ExpressionSyntax<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Expression<'a> {
        let target = Self::bind(&assign.target, ctx);
        let value = Self::bind(&assign.value, ctx);

        let kind = match assign.op.kind() {
            TokenKind::Equals => AssignmentKind::Blocking,
            TokenKind::Lte => AssignmentKind::NonBlocking,
            TokenKind::PlusEquals => AssignmentKind::Compound(BinaryOperator::Add),
            TokenKind::MinusEquals => AssignmentKind::Compound(BinaryOperator::Subtract),
            TokenKind::StarEquals => AssignmentKind::Compound(BinaryOperator::Multiply),
            TokenKind::SlashEquals => AssignmentKind::Compound(BinaryOperator::Divide),
            TokenKind::PercentEquals => AssignmentKind::Compound(BinaryOperator::Mod),
            TokenKind::AmpEquals => AssignmentKind::Compound(BinaryOperator::BinaryAnd),
            TokenKind::PipeEquals => AssignmentKind::Compound(BinaryOperator::BinaryOr),
            TokenKind::CaretEquals => AssignmentKind::Compound(BinaryOperator::BinaryXor),
            TokenKind::ShlEquals => AssignmentKind::Compound(BinaryOperator::LogicalShiftLeft),
            TokenKind::ShrEquals => AssignmentKind::Compound(BinaryOperator::LogicalShiftRight),
            TokenKind::AshlEquals => {
                AssignmentKind::Compound(BinaryOperator::ArithmeticShiftLeft)
            }
            TokenKind::AshrEquals => {
                AssignmentKind::Compound(BinaryOperator::ArithmeticShiftRight)
            }
            _ => AssignmentKind::Blocking,
        };

        // Only lvalue shapes may be assigned.
        let assignable = matches!(
            target,
            Expression::NamedValue(_)
                | Expression::ElementSelect(_)
                | Expression::RangeSelect(_)
                | Expression::MemberAccess(_)
                | Expression::Concatenation(_)
                | Expression::Invalid(_)
        );
        if !assignable {
            ctx.handler.report(
                DiagnosticCode::E_SEM_BAD_ASSIGNMENT,
                assign.op.span(),
                "left-hand side of assignment is not assignable",
            );
            return Self::invalid(ctx, Some(value), sx);
        }

        let ty = if target.ty().is_error() || value.ty().is_error() {
            TypeKind::Error
        } else {
            target.ty()
        };

        let node = ctx.alloc(Expression::Assignment(ctx.alloc(AssignmentOpExpr {
            kind,
            target,
            value,
            ty,
            syntax: sx,
        })));

        if target.bad() || value.bad() {
            return Self::invalid(ctx, Some(node), sx);
        }
        node
    }

    fn bind_element_select(
        select: &syntax::ElementSelectExpr<'a>,
        sx: syntax::ExpressionSyntax<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Expression<'a> {
        let base = Self::bind(&select.expr, ctx);
        let index = Self::bind(&select.index, ctx);

        let ty = match base.ty() {
            TypeKind::Error => TypeKind::Error,
            TypeKind::Integral { four_state, .. } => TypeKind::integral(1, false, four_state),
            _ => {
                ctx.handler.report(
                    DiagnosticCode::E_SEM_TYPE_MISMATCH,
                    select.open.span(),
                    "selected value is not integral",
                );
                TypeKind::Error
            }
        };

        let node = ctx.alloc(Expression::ElementSelect(ctx.alloc(ElementSelectExpr {
            base,
            index,
            ty,
            syntax: sx,
        })));

        if base.bad() || index.bad() {
            return Self::invalid(ctx, Some(node), sx);
        }
        node
    }

    fn bind_range_select(
        select: &syntax::RangeSelectExpr<'a>,
        sx: syntax::ExpressionSyntax<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Expression<'a> {
        let base = Self::bind(&select.expr, ctx);
        let left = Self::bind(&select.left, ctx);
        let right = Self::bind(&select.right, ctx);

        let ty = match base.ty() {
            TypeKind::Error => TypeKind::Error,
            TypeKind::Integral { four_state, .. } => {
                // Width is known when both bounds are constant.
                let width = match (
                    select.kind.kind(),
                    left.constant_value(),
                    right.constant_value(),
                ) {
                    (TokenKind::Colon, Some(l), Some(r)) => (l.abs_diff(r) + 1) as u32,
                    (TokenKind::PlusColon | TokenKind::MinusColon, _, Some(w)) => w as u32,
                    _ => 32,
                };
                TypeKind::integral(width, false, four_state)
            }
            _ => {
                ctx.handler.report(
                    DiagnosticCode::E_SEM_TYPE_MISMATCH,
                    select.open.span(),
                    "selected value is not integral",
                );
                TypeKind::Error
            }
        };

        let node = ctx.alloc(Expression::RangeSelect(ctx.alloc(RangeSelectExpr {
            base,
            left,
            right,
            ty,
            syntax: sx,
        })));

        if base.bad() || left.bad() || right.bad() {
            return Self::invalid(ctx, Some(node), sx);
        }
        node
    }

    fn bind_member_access(
        access: &syntax::MemberAccessExpr<'a>,
        sx: syntax::ExpressionSyntax<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Expression<'a> {
        let base = Self::bind(&access.expr, ctx);
        let member = access
            .name
            .ident()
            .unwrap_or_else(|| svfc_util::Symbol::intern(""));

        // Member resolution needs elaborated type information, which is a
        // later stage's job; the node carries an unresolved type.
        let node = ctx.alloc(Expression::MemberAccess(ctx.alloc(MemberAccessExpr {
            base,
            member,
            ty: TypeKind::Error,
            syntax: sx,
        })));

        if base.bad() {
            return Self::invalid(ctx, Some(node), sx);
        }
        node
    }

    fn bind_call(
        call: &syntax::CallExpr<'a>,
        sx: syntax::ExpressionSyntax<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Expression<'a> {
        let (name, is_system) = match &call.callee {
            syntax::ExpressionSyntax::Name(n) => {
                let is_system = n.token.kind() == TokenKind::SystemIdentifier;
                (
                    n.token
                        .ident()
                        .unwrap_or_else(|| svfc_util::Symbol::intern("")),
                    is_system,
                )
            }
            _ => (svfc_util::Symbol::intern(""), false),
        };

        let mut args = Vec::new();
        let mut any_bad = false;
        for arg in call.args.items() {
            let bound = Self::bind(arg, ctx);
            any_bad |= bound.bad();
            args.push(bound);
        }

        let ty = if is_system {
            // System functions yield an int-sized result; system tasks
            // are void, but that distinction is harmless here.
            TypeKind::INT
        } else {
            TypeKind::INT
        };

        let node = ctx.alloc(Expression::Call(ctx.alloc(CallExpr {
            name,
            is_system,
            args: ctx.arena.alloc_slice(&args),
            ty,
            syntax: sx,
        })));

        if any_bad {
            return Self::invalid(ctx, Some(node), sx);
        }
        node
    }

    fn bind_concatenation(
        concat: &syntax::ConcatenationExpr<'a>,
        sx: syntax::ExpressionSyntax<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Expression<'a> {
        let mut operands = Vec::new();
        let mut any_bad = false;
        let mut width = 0u32;
        let mut four_state = false;
        let mut width_known = true;

        for item in concat.elements.items() {
            let bound = Self::bind(item, ctx);
            any_bad |= bound.bad();
            match bound.ty() {
                TypeKind::Integral {
                    width: w,
                    four_state: f,
                    ..
                } => {
                    width += w;
                    four_state |= f;
                }
                TypeKind::Error => width_known = false,
                _ => {
                    ctx.handler.report(
                        DiagnosticCode::E_SEM_TYPE_MISMATCH,
                        concat.open.span(),
                        "concatenation operands must be integral",
                    );
                    width_known = false;
                }
            }
            operands.push(bound);
        }

        let ty = if width_known {
            TypeKind::integral(width, false, four_state)
        } else {
            TypeKind::Error
        };

        let node = ctx.alloc(Expression::Concatenation(ctx.alloc(ConcatenationExpr {
            operands: ctx.arena.alloc_slice(&operands),
            ty,
            syntax: sx,
        })));

        if any_bad {
            return Self::invalid(ctx, Some(node), sx);
        }
        node
    }

    fn bind_replication(
        repl: &syntax::ReplicationExpr<'a>,
        sx: syntax::ExpressionSyntax<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Expression<'a> {
        let count = Self::bind(&repl.count, ctx);
        let inner_syntax = syntax::ExpressionSyntax::Concatenation(repl.inner);
        let concat = Self::bind(&inner_syntax, ctx);

        let ty = match (count.constant_value(), concat.ty()) {
            (Some(n), TypeKind::Integral { width, four_state, .. }) => {
                TypeKind::integral(width.saturating_mul(n as u32), false, four_state)
            }
            (None, _) if !count.bad() => {
                ctx.handler.report(
                    DiagnosticCode::E_SEM_NOT_CONSTANT,
                    repl.open.span(),
                    "replication count must be a constant expression",
                );
                TypeKind::Error
            }
            _ => TypeKind::Error,
        };

        let node = ctx.alloc(Expression::Replication(ctx.alloc(ReplicationExpr {
            count,
            concat,
            ty,
            syntax: sx,
        })));

        if count.bad() || concat.bad() || ty.is_error() {
            return Self::invalid(ctx, Some(node), sx);
        }
        node
    }

    fn bind_inside(
        inside: &syntax::InsideExpr<'a>,
        sx: syntax::ExpressionSyntax<'a>,
        ctx: &BindContext<'a>,
    ) -> &'a Expression<'a> {
        let operand = Self::bind(&inside.expr, ctx);

        let mut ranges = Vec::new();
        let mut any_bad = operand.bad();
        for range in inside.ranges.items() {
            let (low, high) = match range {
                syntax::ValueRangeSyntax::Single(expr) => {
                    let bound = Self::bind(expr, ctx);
                    (bound, bound)
                }
                syntax::ValueRangeSyntax::Range(r) => {
                    (Self::bind(&r.left, ctx), Self::bind(&r.right, ctx))
                }
            };
            any_bad |= low.bad() || high.bad();
            ranges.push((low, high));
        }

        let node = ctx.alloc(Expression::Inside(ctx.alloc(InsideExpr {
            operand,
            ranges: ctx.arena.alloc_slice(&ranges),
            ty: TypeKind::LOGIC,
            syntax: sx,
        })));

        if any_bad {
            return Self::invalid(ctx, Some(node), sx);
        }
        node
    }
}
