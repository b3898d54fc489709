//! Unused locals and parameters.
//!
//! Both analyzers share one read collector: a variable is read when a
//! `Variable` expression names it. Assignment targets are not reads.

use rustc_hash::FxHashSet;
use vectra_binder::visitor::{BoundTreeVisitor, walk_expr, walk_stmt};
use vectra_binder::{
    BoundBody, BoundExpr, BoundExprKind, BoundStmt, BoundStmtKind, SymbolId, SymbolTable,
};
use vectra_core::{DiagnosticBag, ErrorCode, SourceSpan};

use crate::Analyzer;

#[derive(Default)]
struct Usage {
    /// Locals in declaration order with the span of their declaration.
    declared: Vec<(SymbolId, SourceSpan)>,
    read: FxHashSet<SymbolId>,
}

impl Usage {
    fn collect(body: &BoundBody) -> Self {
        let mut usage = Usage::default();
        usage.visit_stmt(&body.block);
        usage
    }
}

impl BoundTreeVisitor for Usage {
    fn visit_stmt(&mut self, stmt: &BoundStmt) {
        if let BoundStmtKind::VariableDeclaration { local, .. } = &stmt.kind {
            self.declared.push((*local, stmt.span));
        }
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &BoundExpr) {
        if let BoundExprKind::Variable(id) = &expr.kind {
            self.read.insert(*id);
        }
        walk_expr(self, expr);
    }
}

/// Warns about locals that are declared but never read.
pub struct UnusedVariableAnalyzer;

impl Analyzer for UnusedVariableAnalyzer {
    fn name(&self) -> &'static str {
        "unused-variable"
    }

    fn analyze(&self, symbols: &SymbolTable, body: &BoundBody, diagnostics: &mut DiagnosticBag) {
        let usage = Usage::collect(body);
        for &(local, span) in &usage.declared {
            if !usage.read.contains(&local) {
                diagnostics.warning(
                    ErrorCode::UnusedVariable,
                    Some(body.location(span)),
                    format!(
                        "Variable '{}' is declared but never used",
                        symbols.get(local).name
                    ),
                );
            }
        }
    }
}

/// Warns about declared parameters that are never read. `this` is exempt.
pub struct UnusedParameterAnalyzer;

impl Analyzer for UnusedParameterAnalyzer {
    fn name(&self) -> &'static str {
        "unused-parameter"
    }

    fn analyze(&self, symbols: &SymbolTable, body: &BoundBody, diagnostics: &mut DiagnosticBag) {
        let params = &symbols.callable(body.callable).params;
        let declared: Vec<SymbolId> = params
            .iter()
            .copied()
            .filter(|&p| !symbols.parameter(p).is_this())
            .collect();
        if declared.is_empty() {
            return;
        }

        let usage = Usage::collect(body);
        for param in declared {
            if usage.read.contains(&param) {
                continue;
            }
            let symbol = symbols.get(param);
            let location = symbol
                .location
                .clone()
                .unwrap_or_else(|| body.location(body.block.span));
            diagnostics.warning(
                ErrorCode::UnusedParameter,
                Some(location),
                format!("Parameter '{}' is never used", symbol.name),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::analyze;
    use vectra_syntax::{BinaryOp, SyntaxBuilder};

    #[test]
    fn written_but_never_read() {
        let b = SyntaxBuilder::new();
        let package = b.program(vec![b.class(
            "Program",
            vec![b.method(
                "Main",
                "void",
                vec![],
                vec![
                    b.let_("x", b.number(1.0)),
                    b.expr_stmt(b.assign(b.ident("x"), b.number(2.0))),
                    b.let_("y", b.number(3.0)),
                    b.expr_stmt(b.call(b.ident("PrintLine"), vec![
                        b.binary(b.string("y = "), BinaryOp::Add, b.ident("y")),
                    ])),
                ],
            )],
        )]);
        assert_eq!(
            analyze(&UnusedVariableAnalyzer, &package),
            vec![ErrorCode::UnusedVariable]
        );
    }

    #[test]
    fn parameters_other_than_this() {
        let b = SyntaxBuilder::new();
        let package = b.program(vec![b.class(
            "Program",
            vec![b.method(
                "Pick",
                "number",
                vec![b.param("a", "number"), b.param("b", "number")],
                vec![b.ret(Some(b.ident("a")))],
            )],
        )]);
        assert_eq!(
            analyze(&UnusedParameterAnalyzer, &package),
            vec![ErrorCode::UnusedParameter]
        );
    }

    #[test]
    fn implicit_this_is_never_reported() {
        let b = SyntaxBuilder::new();
        let package = b.program(vec![b.class(
            "Program",
            vec![b.method("Main", "void", vec![], vec![])],
        )]);
        assert!(analyze(&UnusedParameterAnalyzer, &package).is_empty());
        assert!(analyze(&UnusedVariableAnalyzer, &package).is_empty());
    }
}
