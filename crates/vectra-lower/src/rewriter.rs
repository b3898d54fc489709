//! Structure-preserving rewriting of the bound tree.
//!
//! [`BoundTreeRewriter`] mirrors the binder's visitor: each `rewrite_*`
//! method defaults to a `walk_*` function that rebuilds a node only when a
//! child changed. An untouched node comes back as the same `Rc`, so a pass
//! that changes nothing returns the original tree.
//!
//! # Pending statements
//!
//! Rewriting an expression may stage statements that must run before the
//! statement containing it. [`walk_block`] opens a frame around every
//! statement it rewrites and splices whatever was staged in that frame
//! directly before the rewritten statement:
//!
//! ```text
//! { let a = new Foo(1); }
//!        │
//!        ▼  rewrite_expr stages 3 statements, returns `tmp`
//! { let tmp; alloc tmp Foo; tmp..ctor(1); let a = tmp; }
//! ```

use std::rc::Rc;

use vectra_binder::{AssignTarget, BoundExpr, BoundExprKind, BoundStmt, BoundStmtKind, ExprRef, StmtRef};

/// Statements staged by expression rewrites, one frame per enclosing statement.
#[derive(Debug, Default)]
pub struct PendingStatements {
    frames: Vec<Vec<StmtRef>>,
}

impl PendingStatements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_frame(&mut self) {
        self.frames.push(Vec::new());
    }

    pub fn pop_frame(&mut self) -> Vec<StmtRef> {
        self.frames.pop().unwrap_or_default()
    }

    /// Stages `stmt` before the statement currently being rewritten.
    ///
    /// # Panics
    ///
    /// Panics when no block statement is being rewritten.
    pub fn stage(&mut self, stmt: StmtRef) {
        match self.frames.last_mut() {
            Some(frame) => frame.push(stmt),
            None => panic!("statement staged outside of a block"),
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

pub trait BoundTreeRewriter {
    fn pending(&mut self) -> &mut PendingStatements;

    fn rewrite_stmt(&mut self, stmt: &StmtRef) -> StmtRef {
        walk_stmt(self, stmt)
    }

    fn rewrite_expr(&mut self, expr: &ExprRef) -> ExprRef {
        walk_expr(self, expr)
    }

    /// Called for `New` expressions.
    fn rewrite_new(&mut self, expr: &ExprRef) -> ExprRef {
        walk_new(self, expr)
    }
}

// ============================================================================
// Statements
// ============================================================================

pub fn walk_stmt<R: BoundTreeRewriter + ?Sized>(rewriter: &mut R, stmt: &StmtRef) -> StmtRef {
    match &stmt.kind {
        BoundStmtKind::Block(stmts) => walk_block(rewriter, stmt, stmts),
        BoundStmtKind::Expression(expr) => {
            let new = rewriter.rewrite_expr(expr);
            if Rc::ptr_eq(&new, expr) {
                Rc::clone(stmt)
            } else {
                BoundStmt::new(BoundStmtKind::Expression(new), stmt.span)
            }
        }
        BoundStmtKind::VariableDeclaration {
            local,
            initializer: Some(init),
        } => {
            let new = rewriter.rewrite_expr(init);
            if Rc::ptr_eq(&new, init) {
                Rc::clone(stmt)
            } else {
                BoundStmt::new(
                    BoundStmtKind::VariableDeclaration {
                        local: *local,
                        initializer: Some(new),
                    },
                    stmt.span,
                )
            }
        }
        BoundStmtKind::Return(Some(value)) => {
            let new = rewriter.rewrite_expr(value);
            if Rc::ptr_eq(&new, value) {
                Rc::clone(stmt)
            } else {
                BoundStmt::new(BoundStmtKind::Return(Some(new)), stmt.span)
            }
        }
        BoundStmtKind::VariableDeclaration {
            initializer: None, ..
        }
        | BoundStmtKind::Return(None)
        | BoundStmtKind::ObjectAllocation { .. }
        | BoundStmtKind::Error => Rc::clone(stmt),
    }
}

/// Rewrites the statements of a block, splicing staged statements in.
///
/// The statement list is copied only from the first statement that changed
/// or staged something.
pub fn walk_block<R: BoundTreeRewriter + ?Sized>(
    rewriter: &mut R,
    block: &StmtRef,
    stmts: &[StmtRef],
) -> StmtRef {
    let mut rewritten: Option<Vec<StmtRef>> = None;

    for (i, old) in stmts.iter().enumerate() {
        rewriter.pending().push_frame();
        let new = rewriter.rewrite_stmt(old);
        let staged = rewriter.pending().pop_frame();

        if rewritten.is_none() && (!staged.is_empty() || !Rc::ptr_eq(&new, old)) {
            let mut list = Vec::with_capacity(stmts.len() + staged.len());
            list.extend(stmts[..i].iter().cloned());
            rewritten = Some(list);
        }
        if let Some(list) = rewritten.as_mut() {
            list.extend(staged);
            list.push(new);
        }
    }

    match rewritten {
        Some(list) => BoundStmt::block(list, block.span),
        None => Rc::clone(block),
    }
}

// ============================================================================
// Expressions
// ============================================================================

pub fn walk_expr<R: BoundTreeRewriter + ?Sized>(rewriter: &mut R, expr: &ExprRef) -> ExprRef {
    let kind = match &expr.kind {
        BoundExprKind::Literal(_)
        | BoundExprKind::Variable(_)
        | BoundExprKind::MethodGroup { .. }
        | BoundExprKind::Error => return Rc::clone(expr),
        BoundExprKind::New { .. } => return rewriter.rewrite_new(expr),

        BoundExprKind::Field { receiver, field } => {
            let new = rewriter.rewrite_expr(receiver);
            if Rc::ptr_eq(&new, receiver) {
                return Rc::clone(expr);
            }
            BoundExprKind::Field {
                receiver: new,
                field: *field,
            }
        }
        BoundExprKind::Property { receiver, property } => {
            let new = rewriter.rewrite_expr(receiver);
            if Rc::ptr_eq(&new, receiver) {
                return Rc::clone(expr);
            }
            BoundExprKind::Property {
                receiver: new,
                property: *property,
            }
        }
        BoundExprKind::Unary { op, operand } => {
            let new = rewriter.rewrite_expr(operand);
            if Rc::ptr_eq(&new, operand) {
                return Rc::clone(expr);
            }
            BoundExprKind::Unary { op: *op, operand: new }
        }
        BoundExprKind::Binary { op, left, right } => {
            let new_left = rewriter.rewrite_expr(left);
            let new_right = rewriter.rewrite_expr(right);
            if Rc::ptr_eq(&new_left, left) && Rc::ptr_eq(&new_right, right) {
                return Rc::clone(expr);
            }
            BoundExprKind::Binary {
                op: *op,
                left: new_left,
                right: new_right,
            }
        }
        BoundExprKind::Assign { target, value } => {
            // Emission order: the value is evaluated before the target receiver.
            let new_value = rewriter.rewrite_expr(value);
            let new_target = rewrite_target(rewriter, target);
            if Rc::ptr_eq(&new_value, value) && new_target.is_none() {
                return Rc::clone(expr);
            }
            BoundExprKind::Assign {
                target: new_target.unwrap_or_else(|| target.clone()),
                value: new_value,
            }
        }
        BoundExprKind::Call {
            callable,
            receiver,
            args,
        } => {
            let new_receiver = rewriter.rewrite_expr(receiver);
            let new_args = rewrite_exprs(rewriter, args);
            if Rc::ptr_eq(&new_receiver, receiver) && new_args.is_none() {
                return Rc::clone(expr);
            }
            BoundExprKind::Call {
                callable: *callable,
                receiver: new_receiver,
                args: new_args.unwrap_or_else(|| args.clone()),
            }
        }
        BoundExprKind::NativeCall { function, args } => match rewrite_exprs(rewriter, args) {
            Some(args) => BoundExprKind::NativeCall {
                function: *function,
                args,
            },
            None => return Rc::clone(expr),
        },
    };
    BoundExpr::new(kind, expr.ty, expr.span)
}

/// Default rule for `New`: rewrites the arguments only.
pub fn walk_new<R: BoundTreeRewriter + ?Sized>(rewriter: &mut R, expr: &ExprRef) -> ExprRef {
    let BoundExprKind::New {
        class,
        constructor,
        args,
    } = &expr.kind
    else {
        unreachable!("walk_new called on {:?}", expr.kind);
    };
    match rewrite_exprs(rewriter, args) {
        Some(args) => BoundExpr::new(
            BoundExprKind::New {
                class: *class,
                constructor: *constructor,
                args,
            },
            expr.ty,
            expr.span,
        ),
        None => Rc::clone(expr),
    }
}

/// Rewrites a list of expressions; `None` when every element came back unchanged.
pub fn rewrite_exprs<R: BoundTreeRewriter + ?Sized>(
    rewriter: &mut R,
    exprs: &[ExprRef],
) -> Option<Vec<ExprRef>> {
    let mut rewritten: Option<Vec<ExprRef>> = None;
    for (i, old) in exprs.iter().enumerate() {
        let new = rewriter.rewrite_expr(old);
        if rewritten.is_none() && !Rc::ptr_eq(&new, old) {
            rewritten = Some(exprs[..i].to_vec());
        }
        if let Some(list) = rewritten.as_mut() {
            list.push(new);
        }
    }
    rewritten
}

fn rewrite_target<R: BoundTreeRewriter + ?Sized>(
    rewriter: &mut R,
    target: &AssignTarget,
) -> Option<AssignTarget> {
    match target {
        AssignTarget::Variable(_) => None,
        AssignTarget::Field { receiver, field } => {
            let new = rewriter.rewrite_expr(receiver);
            (!Rc::ptr_eq(&new, receiver)).then(|| AssignTarget::Field {
                receiver: new,
                field: *field,
            })
        }
        AssignTarget::Property { receiver, property } => {
            let new = rewriter.rewrite_expr(receiver);
            (!Rc::ptr_eq(&new, receiver)).then(|| AssignTarget::Property {
                receiver: new,
                property: *property,
            })
        }
    }
}
