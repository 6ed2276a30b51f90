//! Kind-switch visitor dispatch over semantic trees.
//!
//! Every node family exposes a `visit` method that matches on the kind
//! tag and calls the visitor's typed method; the enums are closed so the
//! dispatch is exhaustive. [`SemanticSerializer`] is the built-in visitor
//! that renders trees to a structured text form for tooling and tests.

use crate::constraint::*;
use crate::expr::*;
use crate::stmt::*;

/// Typed visitor over bound expressions.
pub trait ExprVisitor<'a> {
    fn visit_integer_literal(&mut self, node: &'a IntegerLiteralExpr<'a>);
    fn visit_real_literal(&mut self, node: &'a RealLiteralExpr<'a>);
    fn visit_string_literal(&mut self, node: &'a StringLiteralExpr<'a>);
    fn visit_named_value(&mut self, node: &'a NamedValueExpr<'a>);
    fn visit_unary(&mut self, node: &'a UnaryOpExpr<'a>);
    fn visit_binary(&mut self, node: &'a BinaryOpExpr<'a>);
    fn visit_conditional(&mut self, node: &'a ConditionalOpExpr<'a>);
    fn visit_assignment(&mut self, node: &'a AssignmentOpExpr<'a>);
    fn visit_element_select(&mut self, node: &'a ElementSelectExpr<'a>);
    fn visit_range_select(&mut self, node: &'a RangeSelectExpr<'a>);
    fn visit_member_access(&mut self, node: &'a MemberAccessExpr<'a>);
    fn visit_concatenation(&mut self, node: &'a ConcatenationExpr<'a>);
    fn visit_replication(&mut self, node: &'a ReplicationExpr<'a>);
    fn visit_call(&mut self, node: &'a CallExpr<'a>);
    fn visit_inside(&mut self, node: &'a InsideExpr<'a>);
    fn visit_invalid_expr(&mut self, node: &'a InvalidExpr<'a>);
}

/// Typed visitor over bound statements.
pub trait StmtVisitor<'a>: ExprVisitor<'a> {
    fn visit_list(&mut self, node: &'a StatementList<'a>);
    fn visit_expression_stmt(&mut self, node: &'a ExpressionStatement<'a>);
    fn visit_variable_decl(&mut self, node: &'a VariableDeclStatement<'a>);
    fn visit_conditional_stmt(&mut self, node: &'a ConditionalStatement<'a>);
    fn visit_case_stmt(&mut self, node: &'a CaseStatement<'a>);
    fn visit_for_stmt(&mut self, node: &'a ForLoopStatement<'a>);
    fn visit_repeat_stmt(&mut self, node: &'a RepeatLoopStatement<'a>);
    fn visit_while_stmt(&mut self, node: &'a WhileLoopStatement<'a>);
    fn visit_forever_stmt(&mut self, node: &'a ForeverLoopStatement<'a>);
    fn visit_timed_stmt(&mut self, node: &'a TimedStatement<'a>);
    fn visit_assertion_stmt(&mut self, node: &'a ImmediateAssertionStatement<'a>);
    fn visit_jump_stmt(&mut self, node: &'a JumpStatement<'a>);
    fn visit_empty_stmt(&mut self);
    fn visit_invalid_stmt(&mut self, node: &'a InvalidStatement<'a>);
}

/// Typed visitor over bound constraints.
pub trait ConstraintVisitor<'a>: ExprVisitor<'a> {
    fn visit_constraint_list(&mut self, node: &'a ConstraintList<'a>);
    fn visit_expression_constraint(&mut self, node: &'a ExpressionConstraint<'a>);
    fn visit_implication_constraint(&mut self, node: &'a ImplicationConstraint<'a>);
    fn visit_conditional_constraint(&mut self, node: &'a ConditionalConstraint<'a>);
    fn visit_uniqueness_constraint(&mut self, node: &'a UniquenessConstraint<'a>);
    fn visit_invalid_constraint(&mut self, node: &'a InvalidConstraint<'a>);
}

impl<'a> Expression<'a> {
    /// Dispatches to the visitor method for this node's kind.
    pub fn visit<V: ExprVisitor<'a> + ?Sized>(&'a self, visitor: &mut V) {
        match self {
            Self::IntegerLiteral(n) => visitor.visit_integer_literal(n),
            Self::RealLiteral(n) => visitor.visit_real_literal(n),
            Self::StringLiteral(n) => visitor.visit_string_literal(n),
            Self::NamedValue(n) => visitor.visit_named_value(n),
            Self::Unary(n) => visitor.visit_unary(n),
            Self::Binary(n) => visitor.visit_binary(n),
            Self::Conditional(n) => visitor.visit_conditional(n),
            Self::Assignment(n) => visitor.visit_assignment(n),
            Self::ElementSelect(n) => visitor.visit_element_select(n),
            Self::RangeSelect(n) => visitor.visit_range_select(n),
            Self::MemberAccess(n) => visitor.visit_member_access(n),
            Self::Concatenation(n) => visitor.visit_concatenation(n),
            Self::Replication(n) => visitor.visit_replication(n),
            Self::Call(n) => visitor.visit_call(n),
            Self::Inside(n) => visitor.visit_inside(n),
            Self::Invalid(n) => visitor.visit_invalid_expr(n),
        }
    }
}

impl<'a> Statement<'a> {
    /// Dispatches to the visitor method for this node's kind.
    pub fn visit<V: StmtVisitor<'a> + ?Sized>(&'a self, visitor: &mut V) {
        match self {
            Self::List(n) => visitor.visit_list(n),
            Self::Expression(n) => visitor.visit_expression_stmt(n),
            Self::VariableDecl(n) => visitor.visit_variable_decl(n),
            Self::Conditional(n) => visitor.visit_conditional_stmt(n),
            Self::Case(n) => visitor.visit_case_stmt(n),
            Self::For(n) => visitor.visit_for_stmt(n),
            Self::Repeat(n) => visitor.visit_repeat_stmt(n),
            Self::While(n) => visitor.visit_while_stmt(n),
            Self::Forever(n) => visitor.visit_forever_stmt(n),
            Self::Timed(n) => visitor.visit_timed_stmt(n),
            Self::ImmediateAssertion(n) => visitor.visit_assertion_stmt(n),
            Self::Jump(n) => visitor.visit_jump_stmt(n),
            Self::Empty => visitor.visit_empty_stmt(),
            Self::Invalid(n) => visitor.visit_invalid_stmt(n),
        }
    }
}

impl<'a> Constraint<'a> {
    /// Dispatches to the visitor method for this node's kind.
    pub fn visit<V: ConstraintVisitor<'a> + ?Sized>(&'a self, visitor: &mut V) {
        match self {
            Self::List(n) => visitor.visit_constraint_list(n),
            Self::Expression(n) => visitor.visit_expression_constraint(n),
            Self::Implication(n) => visitor.visit_implication_constraint(n),
            Self::Conditional(n) => visitor.visit_conditional_constraint(n),
            Self::Uniqueness(n) => visitor.visit_uniqueness_constraint(n),
            Self::Invalid(n) => visitor.visit_invalid_constraint(n),
        }
    }
}

/// Renders semantic trees as parenthesized structured text.
///
/// The output is stable and compact, e.g. `(add (name a) (int 1))`, and
/// is what the test suite compares against.
#[derive(Default)]
pub struct SemanticSerializer {
    out: String,
}

impl SemanticSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> String {
        self.out
    }

    pub fn serialize_expr<'a>(expr: &'a Expression<'a>) -> String {
        let mut serializer = Self::new();
        expr.visit(&mut serializer);
        serializer.finish()
    }

    pub fn serialize_stmt<'a>(stmt: &'a Statement<'a>) -> String {
        let mut serializer = Self::new();
        stmt.visit(&mut serializer);
        serializer.finish()
    }

    pub fn serialize_constraint<'a>(constraint: &'a Constraint<'a>) -> String {
        let mut serializer = Self::new();
        constraint.visit(&mut serializer);
        serializer.finish()
    }

    fn open(&mut self, tag: &str) {
        self.out.push('(');
        self.out.push_str(tag);
    }

    fn close(&mut self) {
        self.out.push(')');
    }

    fn space(&mut self) {
        self.out.push(' ');
    }

    fn child<'a>(&mut self, expr: &'a Expression<'a>) {
        self.space();
        expr.visit(self);
    }

    fn child_stmt<'a>(&mut self, stmt: &'a Statement<'a>) {
        self.space();
        stmt.visit(self);
    }

    fn child_constraint<'a>(&mut self, constraint: &'a Constraint<'a>) {
        self.space();
        constraint.visit(self);
    }
}

impl<'a> ExprVisitor<'a> for SemanticSerializer {
    fn visit_integer_literal(&mut self, node: &'a IntegerLiteralExpr<'a>) {
        if node.xz != 0 {
            self.out.push_str(&format!("(int {}/xz:{})", node.value, node.xz));
        } else {
            self.out.push_str(&format!("(int {})", node.value));
        }
    }

    fn visit_real_literal(&mut self, node: &'a RealLiteralExpr<'a>) {
        self.out.push_str(&format!("(real {})", node.value));
    }

    fn visit_string_literal(&mut self, node: &'a StringLiteralExpr<'a>) {
        self.out.push_str(&format!("(str {:?})", node.value));
    }

    fn visit_named_value(&mut self, node: &'a NamedValueExpr<'a>) {
        self.out.push_str(&format!("(name {})", node.symbol.name));
    }

    fn visit_unary(&mut self, node: &'a UnaryOpExpr<'a>) {
        self.open(&format!("unary:{:?}", node.op).to_lowercase());
        self.child(node.operand);
        self.close();
    }

    fn visit_binary(&mut self, node: &'a BinaryOpExpr<'a>) {
        self.open(&format!("binary:{:?}", node.op).to_lowercase());
        self.child(node.left);
        self.child(node.right);
        self.close();
    }

    fn visit_conditional(&mut self, node: &'a ConditionalOpExpr<'a>) {
        self.open("cond");
        self.child(node.condition);
        self.child(node.true_expr);
        self.child(node.false_expr);
        self.close();
    }

    fn visit_assignment(&mut self, node: &'a AssignmentOpExpr<'a>) {
        self.open(&format!("assign:{:?}", node.kind).to_lowercase());
        self.child(node.target);
        self.child(node.value);
        self.close();
    }

    fn visit_element_select(&mut self, node: &'a ElementSelectExpr<'a>) {
        self.open("select");
        self.child(node.base);
        self.child(node.index);
        self.close();
    }

    fn visit_range_select(&mut self, node: &'a RangeSelectExpr<'a>) {
        self.open("range");
        self.child(node.base);
        self.child(node.left);
        self.child(node.right);
        self.close();
    }

    fn visit_member_access(&mut self, node: &'a MemberAccessExpr<'a>) {
        self.open("member");
        self.child(node.base);
        self.space();
        self.out.push_str(node.member.as_str());
        self.close();
    }

    fn visit_concatenation(&mut self, node: &'a ConcatenationExpr<'a>) {
        self.open("concat");
        for operand in node.operands {
            self.child(operand);
        }
        self.close();
    }

    fn visit_replication(&mut self, node: &'a ReplicationExpr<'a>) {
        self.open("repl");
        self.child(node.count);
        self.child(node.concat);
        self.close();
    }

    fn visit_call(&mut self, node: &'a CallExpr<'a>) {
        self.open("call");
        self.space();
        self.out.push_str(node.name.as_str());
        for arg in node.args {
            self.child(arg);
        }
        self.close();
    }

    fn visit_inside(&mut self, node: &'a InsideExpr<'a>) {
        self.open("inside");
        self.child(node.operand);
        for (low, high) in node.ranges {
            self.child(low);
            self.child(high);
        }
        self.close();
    }

    fn visit_invalid_expr(&mut self, node: &'a InvalidExpr<'a>) {
        self.open("invalid");
        if let Some(child) = node.child {
            self.child(child);
        }
        self.close();
    }
}

impl<'a> StmtVisitor<'a> for SemanticSerializer {
    fn visit_list(&mut self, node: &'a StatementList<'a>) {
        self.open("block");
        for stmt in node.statements {
            self.child_stmt(stmt);
        }
        self.close();
    }

    fn visit_expression_stmt(&mut self, node: &'a ExpressionStatement<'a>) {
        self.open("expr-stmt");
        self.child(node.expr);
        self.close();
    }

    fn visit_variable_decl(&mut self, node: &'a VariableDeclStatement<'a>) {
        self.open("decl");
        for symbol in node.symbols {
            self.space();
            self.out.push_str(symbol.name.as_str());
        }
        self.close();
    }

    fn visit_conditional_stmt(&mut self, node: &'a ConditionalStatement<'a>) {
        self.open("if");
        self.child(node.condition);
        self.child_stmt(node.then_stmt);
        if let Some(else_stmt) = node.else_stmt {
            self.child_stmt(else_stmt);
        }
        self.close();
    }

    fn visit_case_stmt(&mut self, node: &'a CaseStatement<'a>) {
        self.open("case");
        self.child(node.expr);
        for item in node.items {
            self.space();
            self.open("item");
            for label in item.labels {
                self.child(label);
            }
            self.child_stmt(item.statement);
            self.close();
        }
        self.close();
    }

    fn visit_for_stmt(&mut self, node: &'a ForLoopStatement<'a>) {
        self.open("for");
        for init in node.initializers {
            self.child(init);
        }
        if let Some(condition) = node.condition {
            self.child(condition);
        }
        for step in node.steps {
            self.child(step);
        }
        self.child_stmt(node.body);
        self.close();
    }

    fn visit_repeat_stmt(&mut self, node: &'a RepeatLoopStatement<'a>) {
        self.open("repeat");
        self.child(node.count);
        self.child_stmt(node.body);
        self.close();
    }

    fn visit_while_stmt(&mut self, node: &'a WhileLoopStatement<'a>) {
        self.open(if node.is_do_while { "do-while" } else { "while" });
        self.child(node.condition);
        self.child_stmt(node.body);
        self.close();
    }

    fn visit_forever_stmt(&mut self, node: &'a ForeverLoopStatement<'a>) {
        self.open("forever");
        self.child_stmt(node.body);
        self.close();
    }

    fn visit_timed_stmt(&mut self, node: &'a TimedStatement<'a>) {
        self.open("timed");
        for control in node.controls {
            self.child(control);
        }
        self.child_stmt(node.body);
        self.close();
    }

    fn visit_assertion_stmt(&mut self, node: &'a ImmediateAssertionStatement<'a>) {
        self.open("assert");
        self.child(node.condition);
        if let Some(success) = node.success {
            self.child_stmt(success);
        }
        if let Some(failure) = node.failure {
            self.child_stmt(failure);
        }
        self.close();
    }

    fn visit_jump_stmt(&mut self, node: &'a JumpStatement<'a>) {
        self.open(&format!("jump:{:?}", node.kind).to_lowercase());
        if let Some(expr) = node.expr {
            self.child(expr);
        }
        self.close();
    }

    fn visit_empty_stmt(&mut self) {
        self.out.push_str("(empty)");
    }

    fn visit_invalid_stmt(&mut self, node: &'a InvalidStatement<'a>) {
        self.open("invalid");
        if let Some(child) = node.child {
            self.child_stmt(child);
        }
        self.close();
    }
}

impl<'a> ConstraintVisitor<'a> for SemanticSerializer {
    fn visit_constraint_list(&mut self, node: &'a ConstraintList<'a>) {
        self.open("constraints");
        for item in node.items {
            self.child_constraint(item);
        }
        self.close();
    }

    fn visit_expression_constraint(&mut self, node: &'a ExpressionConstraint<'a>) {
        self.open(if node.soft { "soft" } else { "require" });
        self.child(node.expr);
        self.close();
    }

    fn visit_implication_constraint(&mut self, node: &'a ImplicationConstraint<'a>) {
        self.open("implies");
        self.child(node.predicate);
        self.child_constraint(node.body);
        self.close();
    }

    fn visit_conditional_constraint(&mut self, node: &'a ConditionalConstraint<'a>) {
        self.open("if");
        self.child(node.predicate);
        self.child_constraint(node.body);
        if let Some(else_body) = node.else_body {
            self.child_constraint(else_body);
        }
        self.close();
    }

    fn visit_uniqueness_constraint(&mut self, node: &'a UniquenessConstraint<'a>) {
        self.open("unique");
        for item in node.items {
            self.child(item);
        }
        self.close();
    }

    fn visit_invalid_constraint(&mut self, node: &'a InvalidConstraint<'a>) {
        self.open("invalid");
        if let Some(child) = node.child {
            self.child_constraint(child);
        }
        self.close();
    }
}
