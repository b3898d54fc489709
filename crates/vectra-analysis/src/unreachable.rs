//! Unreachable statement detection.

use vectra_binder::{BoundBody, BoundStmtKind, StmtRef, SymbolTable};
use vectra_core::{DiagnosticBag, ErrorCode};

use crate::Analyzer;

/// Warns once per block at the first statement after one that always returns.
pub struct UnreachableCodeAnalyzer;

impl Analyzer for UnreachableCodeAnalyzer {
    fn name(&self) -> &'static str {
        "unreachable-code"
    }

    fn analyze(&self, _symbols: &SymbolTable, body: &BoundBody, diagnostics: &mut DiagnosticBag) {
        check_block(body, body.statements(), diagnostics);
    }
}

fn check_block(body: &BoundBody, stmts: &[StmtRef], diagnostics: &mut DiagnosticBag) {
    let mut terminated = false;
    for stmt in stmts {
        if terminated {
            diagnostics.warning(
                ErrorCode::UnreachableCode,
                Some(body.location(stmt.span)),
                "Unreachable code detected",
            );
            return;
        }
        if let BoundStmtKind::Block(nested) = &stmt.kind {
            check_block(body, nested, diagnostics);
        }
        terminated = stmt.always_returns();
    }
}
