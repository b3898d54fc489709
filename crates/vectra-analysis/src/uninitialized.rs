//! Use of locals before assignment.

use rustc_hash::FxHashSet;
use vectra_binder::visitor::{BoundTreeVisitor, walk_expr, walk_stmt};
use vectra_binder::{
    AssignTarget, BoundBody, BoundExpr, BoundExprKind, BoundStmt, BoundStmtKind, SymbolId,
    SymbolKind, SymbolTable,
};
use vectra_core::{DiagnosticBag, ErrorCode};

use crate::Analyzer;

/// Flow-insensitive check for locals read before any assignment.
///
/// The assigned set starts with the parameters and grows, in statement
/// order, with every declaration that has an initializer and every
/// assignment to a local. Branches do not exist in bound bodies, so source
/// order is execution order.
pub struct UninitializedVariableAnalyzer;

impl Analyzer for UninitializedVariableAnalyzer {
    fn name(&self) -> &'static str {
        "uninitialized-variable"
    }

    fn analyze(&self, symbols: &SymbolTable, body: &BoundBody, diagnostics: &mut DiagnosticBag) {
        let mut walker = Walker {
            symbols,
            body,
            diagnostics,
            assigned: symbols
                .callable(body.callable)
                .params
                .iter()
                .copied()
                .collect(),
        };
        walker.visit_stmt(&body.block);
    }
}

struct Walker<'a> {
    symbols: &'a SymbolTable,
    body: &'a BoundBody,
    diagnostics: &'a mut DiagnosticBag,
    assigned: FxHashSet<SymbolId>,
}

impl BoundTreeVisitor for Walker<'_> {
    fn visit_stmt(&mut self, stmt: &BoundStmt) {
        walk_stmt(self, stmt);
        if let BoundStmtKind::VariableDeclaration {
            local,
            initializer: Some(_),
        } = &stmt.kind
        {
            self.assigned.insert(*local);
        }
    }

    fn visit_expr(&mut self, expr: &BoundExpr) {
        match &expr.kind {
            BoundExprKind::Variable(id) => {
                let is_local = matches!(self.symbols.get(*id).kind, SymbolKind::Local(_));
                if is_local && !self.assigned.contains(id) {
                    self.diagnostics.error(
                        ErrorCode::UseOfUninitializedVariable,
                        Some(self.body.location(expr.span)),
                        format!(
                            "Variable '{}' is used before it has been assigned",
                            self.symbols.get(*id).name
                        ),
                    );
                }
            }
            BoundExprKind::Assign {
                target: AssignTarget::Variable(id),
                ..
            } => {
                walk_expr(self, expr);
                self.assigned.insert(*id);
            }
            _ => walk_expr(self, expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::analyze;
    use vectra_syntax::{BinaryOp, SyntaxBuilder};

    #[test]
    fn read_before_assignment() {
        let b = SyntaxBuilder::new();
        let package = b.program(vec![b.class(
            "Program",
            vec![b.method(
                "Main",
                "number",
                vec![],
                vec![
                    b.var("x", "number", None),
                    b.ret(Some(b.ident("x"))),
                ],
            )],
        )]);
        assert_eq!(
            analyze(&UninitializedVariableAnalyzer, &package),
            vec![ErrorCode::UseOfUninitializedVariable]
        );
    }

    #[test]
    fn assignment_initializes() {
        let b = SyntaxBuilder::new();
        let package = b.program(vec![b.class(
            "Program",
            vec![b.method(
                "Main",
                "number",
                vec![b.param("seed", "number")],
                vec![
                    b.var("x", "number", None),
                    b.expr_stmt(b.assign(b.ident("x"), b.ident("seed"))),
                    b.ret(Some(b.binary(b.ident("x"), BinaryOp::Add, b.number(1.0)))),
                ],
            )],
        )]);
        assert!(analyze(&UninitializedVariableAnalyzer, &package).is_empty());
    }

    #[test]
    fn self_referencing_assignment_is_a_read() {
        let b = SyntaxBuilder::new();
        let package = b.program(vec![b.class(
            "Program",
            vec![b.method(
                "Main",
                "void",
                vec![],
                vec![
                    b.var("x", "number", None),
                    b.expr_stmt(b.assign(
                        b.ident("x"),
                        b.binary(b.ident("x"), BinaryOp::Add, b.number(1.0)),
                    )),
                ],
            )],
        )]);
        assert_eq!(
            analyze(&UninitializedVariableAnalyzer, &package),
            vec![ErrorCode::UseOfUninitializedVariable]
        );
    }

    #[test]
    fn fields_are_always_initialized() {
        let b = SyntaxBuilder::new();
        let package = b.program(vec![b.class(
            "Program",
            vec![
                b.field("count", "number", None),
                b.method("Get", "number", vec![], vec![b.ret(Some(b.ident("count")))]),
            ],
        )]);
        assert!(analyze(&UninitializedVariableAnalyzer, &package).is_empty());
    }
}
