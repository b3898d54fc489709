//! Object construction decomposition.
//!
//! `new T(args)` becomes a fresh temporary plus three staged statements:
//!
//! ```text
//! let a = new Foo(1, 2);
//!
//! let <tmp3>;                      // VariableDeclaration, no initializer
//! alloc <tmp3>: Foo;               // ObjectAllocation
//! Foo..ctor(<tmp3>, 1, 2);         // constructor call, void
//! let a = <tmp3>;
//! ```
//!
//! The temporary's slot continues the callable's allocator.

use tracing::trace;
use vectra_binder::{
    BoundExpr, BoundExprKind, BoundStmt, BoundStmtKind, ExprRef, LocalSymbol, SlotAllocator,
    Symbol, SymbolKind, SymbolTable, TypeRef,
};

use crate::rewriter::{BoundTreeRewriter, PendingStatements, rewrite_exprs};

pub struct ObjectConstructionLowering<'a> {
    symbols: &'a mut SymbolTable,
    slots: &'a mut SlotAllocator,
    pending: PendingStatements,
    temporaries: usize,
}

impl<'a> ObjectConstructionLowering<'a> {
    pub fn new(symbols: &'a mut SymbolTable, slots: &'a mut SlotAllocator) -> Self {
        Self {
            symbols,
            slots,
            pending: PendingStatements::new(),
            temporaries: 0,
        }
    }

    /// Number of temporaries introduced so far.
    pub fn temporaries(&self) -> usize {
        self.temporaries
    }
}

impl BoundTreeRewriter for ObjectConstructionLowering<'_> {
    fn pending(&mut self) -> &mut PendingStatements {
        &mut self.pending
    }

    fn rewrite_new(&mut self, expr: &ExprRef) -> ExprRef {
        let BoundExprKind::New {
            class,
            constructor,
            args,
        } = &expr.kind
        else {
            unreachable!("rewrite_new called on {:?}", expr.kind);
        };
        let (class, constructor) = (*class, *constructor);
        // Arguments may construct objects themselves; their statements are
        // staged first, so they run before this allocation.
        let args = rewrite_exprs(self, args).unwrap_or_else(|| args.clone());

        let ty = TypeRef::Named(class);
        let slot = self.slots.allocate();
        let temp = self.symbols.add(Symbol {
            name: format!("<tmp{}>", slot),
            location: None,
            kind: SymbolKind::Local(LocalSymbol {
                ty,
                slot,
                synthesized: true,
            }),
        });
        self.temporaries += 1;
        trace!(
            class = %self.symbols.get(class).name,
            slot,
            "decomposing object construction"
        );

        let span = expr.span;
        self.pending.stage(BoundStmt::new(
            BoundStmtKind::VariableDeclaration {
                local: temp,
                initializer: None,
            },
            span,
        ));
        self.pending.stage(BoundStmt::new(
            BoundStmtKind::ObjectAllocation {
                target: temp,
                class,
            },
            span,
        ));
        self.pending.stage(BoundStmt::expression(BoundExpr::new(
            BoundExprKind::Call {
                callable: constructor,
                receiver: BoundExpr::variable(temp, ty, span),
                args,
            },
            TypeRef::VOID,
            span,
        )));

        BoundExpr::variable(temp, ty, span)
    }
}
