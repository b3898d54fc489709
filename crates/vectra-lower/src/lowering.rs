//! Lowering driver.

use tracing::{debug, debug_span};
use vectra_binder::{BoundBody, SymbolTable};
use vectra_core::{CancellationToken, Cancelled};

use crate::construction::ObjectConstructionLowering;
use crate::initializers::inject_field_initializers;
use crate::rewriter::BoundTreeRewriter;

/// Lowers every body: field initializers are injected into constructors,
/// then object construction is decomposed.
///
/// Temporaries are added to `symbols` and continue each body's slot
/// allocator; the returned bodies carry the advanced allocators.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn lower_bodies(
    symbols: &mut SymbolTable,
    bodies: Vec<BoundBody>,
    cancel: &CancellationToken,
) -> Result<Vec<BoundBody>, Cancelled> {
    let mut lowered = Vec::with_capacity(bodies.len());
    let mut temporaries = 0;

    for body in bodies {
        cancel.check()?;
        let name = symbols.display_name(body.callable);
        let _span = debug_span!("lower_body", callable = %name).entered();

        let block = inject_field_initializers(symbols, &body);
        let mut slots = body.slots.clone();
        let mut construction = ObjectConstructionLowering::new(symbols, &mut slots);
        let block = construction.rewrite_stmt(&block);
        temporaries += construction.temporaries();

        lowered.push(BoundBody {
            block,
            slots,
            ..body
        });
    }

    debug!(bodies = lowered.len(), temporaries, "lowering finished");
    Ok(lowered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use vectra_binder::{BindOptions, BoundStmtKind, bind};
    use vectra_core::{DiagnosticBag, Phase};
    use vectra_syntax::SyntaxBuilder;

    #[test]
    fn initializer_constructions_are_decomposed() {
        let b = SyntaxBuilder::new();
        let package = b.program(vec![
            b.class("Engine", vec![]),
            b.class(
                "Car",
                vec![b.field("engine", "Engine", Some(b.new_("Engine", vec![])))],
            ),
        ]);
        let mut diagnostics = DiagnosticBag::new(Phase::Bind);
        let cancel = CancellationToken::new();
        let mut bound = bind(&package, &BindOptions::default(), &mut diagnostics, &cancel).unwrap();
        assert!(!diagnostics.has_errors(), "{}", diagnostics);

        let bodies = lower_bodies(&mut bound.declarations.symbols, bound.bodies, &cancel).unwrap();
        let symbols = &bound.declarations.symbols;
        let car_ctor = bodies
            .iter()
            .find(|body| symbols.display_name(body.callable).contains("Car"))
            .unwrap();

        // 3 staged statements plus the field assignment reading the temp
        let BoundStmtKind::Block(stmts) = &car_ctor.block.kind else {
            panic!("expected block");
        };
        assert_eq!(stmts.len(), 4);
        assert!(matches!(stmts[1].kind, BoundStmtKind::ObjectAllocation { .. }));
        assert_eq!(car_ctor.slots.count(), 2);
    }

    #[test]
    fn untouched_bodies_keep_their_tree() {
        let b = SyntaxBuilder::new();
        let package = b.program(vec![b.class(
            "Program",
            vec![b.method("Main", "void", vec![], vec![b.let_("x", b.number(1.0))])],
        )]);
        let mut diagnostics = DiagnosticBag::new(Phase::Bind);
        let cancel = CancellationToken::new();
        let mut bound = bind(&package, &BindOptions::default(), &mut diagnostics, &cancel).unwrap();
        let original: Vec<_> = bound.bodies.iter().map(|b| Rc::clone(&b.block)).collect();

        let bodies = lower_bodies(&mut bound.declarations.symbols, bound.bodies, &cancel).unwrap();
        for (body, before) in bodies.iter().zip(&original) {
            assert!(Rc::ptr_eq(&body.block, before));
        }
    }

    #[test]
    fn cancellation_stops_lowering() {
        let b = SyntaxBuilder::new();
        let package = b.program(vec![b.class("Program", vec![])]);
        let mut diagnostics = DiagnosticBag::new(Phase::Bind);
        let cancel = CancellationToken::new();
        let mut bound = bind(&package, &BindOptions::default(), &mut diagnostics, &cancel).unwrap();

        cancel.cancel();
        let result = lower_bodies(&mut bound.declarations.symbols, bound.bodies, &cancel);
        assert_eq!(result.unwrap_err(), Cancelled);
    }
}
