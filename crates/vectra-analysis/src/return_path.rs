//! Return path verification for non-void methods.

use vectra_binder::{BoundBody, SymbolKind, SymbolTable};
use vectra_core::{DiagnosticBag, ErrorCode};

use crate::Analyzer;

/// Reports non-void methods whose body can fall off the end.
///
/// A body returns on every path when some statement of its block is a
/// return, or a nested block that itself always returns. Constructors and
/// methods whose return type failed to resolve are skipped.
pub struct ReturnPathAnalyzer;

impl Analyzer for ReturnPathAnalyzer {
    fn name(&self) -> &'static str {
        "return-path"
    }

    fn analyze(&self, symbols: &SymbolTable, body: &BoundBody, diagnostics: &mut DiagnosticBag) {
        let symbol = symbols.get(body.callable);
        let SymbolKind::Method(method) = &symbol.kind else {
            return;
        };
        if method.return_type.is_void() || method.return_type.is_error() {
            return;
        }
        if body.block.always_returns() {
            return;
        }

        let location = symbol
            .location
            .clone()
            .unwrap_or_else(|| body.location(body.block.span));
        diagnostics.error(
            ErrorCode::MissingReturnPath,
            Some(location),
            format!(
                "'{}': not all code paths return a value",
                symbols.display_name(body.callable)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::analyze;
    use vectra_syntax::SyntaxBuilder;

    #[test]
    fn empty_non_void_body() {
        let b = SyntaxBuilder::new();
        let package = b.program(vec![b.class(
            "Program",
            vec![b.method("Answer", "number", vec![], vec![])],
        )]);
        assert_eq!(
            analyze(&ReturnPathAnalyzer, &package),
            vec![ErrorCode::MissingReturnPath]
        );
    }

    #[test]
    fn return_inside_nested_block_counts() {
        let b = SyntaxBuilder::new();
        let package = b.program(vec![b.class(
            "Program",
            vec![b.method(
                "Answer",
                "number",
                vec![],
                vec![b.block(vec![b.ret(Some(b.number(42.0)))])],
            )],
        )]);
        assert!(analyze(&ReturnPathAnalyzer, &package).is_empty());
    }

    #[test]
    fn void_methods_and_constructors_are_skipped() {
        let b = SyntaxBuilder::new();
        let package = b.program(vec![b.class(
            "Program",
            vec![
                b.constructor(vec![], vec![]),
                b.method("Main", "void", vec![], vec![]),
            ],
        )]);
        assert!(analyze(&ReturnPathAnalyzer, &package).is_empty());
    }
}
