//! Visitor pattern for traversing the bound tree.
//!
//! Each `visit_*` method defaults to the matching `walk_*` function, which
//! visits the node's children in evaluation order. Override a method to
//! observe a node kind; call the `walk_*` function from the override to keep
//! descending.
//!
//! ```
//! use vectra_binder::visitor::{BoundTreeVisitor, walk_expr};
//! use vectra_binder::{BoundExpr, BoundExprKind};
//!
//! #[derive(Default)]
//! struct CallCounter {
//!     calls: usize,
//! }
//!
//! impl BoundTreeVisitor for CallCounter {
//!     fn visit_expr(&mut self, expr: &BoundExpr) {
//!         if matches!(expr.kind, BoundExprKind::Call { .. }) {
//!             self.calls += 1;
//!         }
//!         walk_expr(self, expr);
//!     }
//! }
//! ```

use crate::bound::{AssignTarget, BoundExpr, BoundExprKind, BoundStmt, BoundStmtKind};

pub trait BoundTreeVisitor: Sized {
    fn visit_stmt(&mut self, stmt: &BoundStmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &BoundExpr) {
        walk_expr(self, expr);
    }

    /// Called for the receiver of field and property targets before the
    /// assigned value is visited.
    fn visit_assign_target(&mut self, target: &AssignTarget) {
        walk_assign_target(self, target);
    }
}

pub fn walk_stmt<V: BoundTreeVisitor>(visitor: &mut V, stmt: &BoundStmt) {
    match &stmt.kind {
        BoundStmtKind::Block(stmts) => {
            for stmt in stmts {
                visitor.visit_stmt(stmt);
            }
        }
        BoundStmtKind::Expression(expr) => visitor.visit_expr(expr),
        BoundStmtKind::VariableDeclaration { initializer, .. } => {
            if let Some(init) = initializer {
                visitor.visit_expr(init);
            }
        }
        BoundStmtKind::Return(value) => {
            if let Some(value) = value {
                visitor.visit_expr(value);
            }
        }
        BoundStmtKind::ObjectAllocation { .. } | BoundStmtKind::Error => {}
    }
}

pub fn walk_expr<V: BoundTreeVisitor>(visitor: &mut V, expr: &BoundExpr) {
    match &expr.kind {
        BoundExprKind::Literal(_) | BoundExprKind::Variable(_) | BoundExprKind::Error => {}
        BoundExprKind::Field { receiver, .. } | BoundExprKind::Property { receiver, .. } => {
            visitor.visit_expr(receiver);
        }
        BoundExprKind::Unary { operand, .. } => visitor.visit_expr(operand),
        BoundExprKind::Binary { left, right, .. } => {
            visitor.visit_expr(left);
            visitor.visit_expr(right);
        }
        BoundExprKind::Assign { target, value } => {
            visitor.visit_assign_target(target);
            visitor.visit_expr(value);
        }
        BoundExprKind::Call { receiver, args, .. } => {
            visitor.visit_expr(receiver);
            for arg in args {
                visitor.visit_expr(arg);
            }
        }
        BoundExprKind::MethodGroup { receiver, .. } => visitor.visit_expr(receiver),
        BoundExprKind::NativeCall { args, .. } | BoundExprKind::New { args, .. } => {
            for arg in args {
                visitor.visit_expr(arg);
            }
        }
    }
}

pub fn walk_assign_target<V: BoundTreeVisitor>(visitor: &mut V, target: &AssignTarget) {
    match target {
        AssignTarget::Variable(_) => {}
        AssignTarget::Field { receiver, .. } | AssignTarget::Property { receiver, .. } => {
            visitor.visit_expr(receiver);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bound::{ConstantValue, StmtRef};
    use crate::symbols::{SymbolId, TypeRef};
    use vectra_core::SourceSpan;

    #[derive(Default)]
    struct Reads {
        variables: Vec<SymbolId>,
    }

    impl BoundTreeVisitor for Reads {
        fn visit_expr(&mut self, expr: &BoundExpr) {
            if let BoundExprKind::Variable(id) = expr.kind {
                self.variables.push(id);
            }
            walk_expr(self, expr);
        }
    }

    fn span() -> SourceSpan {
        SourceSpan::default()
    }

    #[test]
    fn walks_nested_blocks_in_order() {
        let a = SymbolId(10);
        let b = SymbolId(11);
        let sum = BoundExpr::new(
            BoundExprKind::Binary {
                op: crate::operators::resolve_binary(
                    vectra_syntax::BinaryOp::Add,
                    TypeRef::NUMBER,
                    TypeRef::NUMBER,
                )
                .unwrap(),
                left: BoundExpr::variable(a, TypeRef::NUMBER, span()),
                right: BoundExpr::variable(b, TypeRef::NUMBER, span()),
            },
            TypeRef::NUMBER,
            span(),
        );
        let inner: StmtRef = BoundStmt::block(vec![BoundStmt::expression(sum)], span());
        let body = BoundStmt::block(
            vec![
                inner,
                BoundStmt::new(
                    BoundStmtKind::Return(Some(BoundExpr::variable(a, TypeRef::NUMBER, span()))),
                    span(),
                ),
            ],
            span(),
        );

        let mut reads = Reads::default();
        reads.visit_stmt(&body);
        assert_eq!(reads.variables, vec![a, b, a]);
    }

    #[test]
    fn assignment_target_is_not_a_read() {
        let x = SymbolId(3);
        let assign = BoundExpr::new(
            BoundExprKind::Assign {
                target: AssignTarget::Variable(x),
                value: BoundExpr::new(
                    BoundExprKind::Literal(ConstantValue::Bool(true)),
                    TypeRef::BOOL,
                    span(),
                ),
            },
            TypeRef::BOOL,
            span(),
        );

        let mut reads = Reads::default();
        reads.visit_stmt(&BoundStmt::expression(assign));
        assert!(reads.variables.is_empty());
    }
}
