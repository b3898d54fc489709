//! Field initializer injection.
//!
//! Every constructor of a type starts with `this.field = initializer;` for
//! each field that has an initializer, in field declaration order.

use std::rc::Rc;

use vectra_binder::{
    AssignTarget, BoundBody, BoundExpr, BoundExprKind, BoundStmt, BoundStmtKind, StmtRef,
    SymbolKind, SymbolTable, TypeRef,
};

/// Returns the body's block with initializer assignments prepended.
///
/// Methods, and constructors of types without initialized fields, get the
/// original block back.
pub fn inject_field_initializers(symbols: &SymbolTable, body: &BoundBody) -> StmtRef {
    let symbol = symbols.get(body.callable);
    let SymbolKind::Constructor(ctor) = &symbol.kind else {
        return Rc::clone(&body.block);
    };
    let owner = ctor.containing_type;
    let this = ctor.params[0];
    let span = body.block.span;

    let assignments: Vec<StmtRef> = symbols
        .named_type(owner)
        .member_order
        .iter()
        .filter_map(|&member| match &symbols.get(member).kind {
            SymbolKind::Field(field) => field.initializer().map(|init| (member, field.ty, init)),
            _ => None,
        })
        .map(|(field, ty, init)| {
            let target = AssignTarget::Field {
                receiver: BoundExpr::variable(this, TypeRef::Named(owner), init.span),
                field,
            };
            BoundStmt::expression(BoundExpr::new(
                BoundExprKind::Assign {
                    target,
                    value: Rc::clone(init),
                },
                ty,
                init.span,
            ))
        })
        .collect();

    if assignments.is_empty() {
        return Rc::clone(&body.block);
    }

    let mut stmts = assignments;
    stmts.extend(body.statements().iter().cloned());
    BoundStmt::new(BoundStmtKind::Block(stmts), span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vectra_binder::{BindOptions, bind};
    use vectra_core::{CancellationToken, DiagnosticBag, Phase};
    use vectra_syntax::SyntaxBuilder;

    #[test]
    fn constructors_start_with_initializers_in_order() {
        let b = SyntaxBuilder::new();
        let package = b.program(vec![b.class(
            "Config",
            vec![
                b.field("name", "string", Some(b.string("default"))),
                b.field("plain", "number", None),
                b.field("retries", "number", Some(b.number(3.0))),
                b.constructor(vec![], vec![b.ret(None)]),
                b.method("Get", "number", vec![], vec![b.ret(Some(b.ident("retries")))]),
            ],
        )]);
        let mut diagnostics = DiagnosticBag::new(Phase::Bind);
        let bound = bind(
            &package,
            &BindOptions::default(),
            &mut diagnostics,
            &CancellationToken::new(),
        )
        .unwrap();
        assert!(!diagnostics.has_errors(), "{}", diagnostics);
        let symbols = &bound.declarations.symbols;

        for body in &bound.bodies {
            let block = inject_field_initializers(symbols, body);
            if symbols.get(body.callable).name == "Get" {
                assert!(Rc::ptr_eq(&block, &body.block));
                continue;
            }

            let BoundStmtKind::Block(stmts) = &block.kind else {
                panic!("expected block");
            };
            assert_eq!(stmts.len(), 3);
            let assigned: Vec<&str> = stmts[..2]
                .iter()
                .map(|s| match &s.kind {
                    BoundStmtKind::Expression(e) => match &e.kind {
                        BoundExprKind::Assign {
                            target: AssignTarget::Field { field, .. },
                            ..
                        } => symbols.get(*field).name.as_str(),
                        other => panic!("unexpected {:?}", other),
                    },
                    other => panic!("unexpected {:?}", other),
                })
                .collect();
            assert_eq!(assigned, vec!["name", "retries"]);
            assert!(matches!(stmts[2].kind, BoundStmtKind::Return(None)));
        }
    }

    #[test]
    fn synthesized_constructor_receives_initializers() {
        let b = SyntaxBuilder::new();
        let package = b.program(vec![b.class(
            "Counter",
            vec![b.field("count", "number", Some(b.number(0.0)))],
        )]);
        let mut diagnostics = DiagnosticBag::new(Phase::Bind);
        let bound = bind(
            &package,
            &BindOptions::default(),
            &mut diagnostics,
            &CancellationToken::new(),
        )
        .unwrap();

        assert_eq!(bound.bodies.len(), 1);
        let block = inject_field_initializers(&bound.declarations.symbols, &bound.bodies[0]);
        let BoundStmtKind::Block(stmts) = &block.kind else {
            panic!("expected block");
        };
        assert_eq!(stmts.len(), 1);
    }
}
