//! The bound tree: typed, scope-resolved IR produced by the body binder.
//!
//! Nodes are immutable and reference counted. Lowering replaces nodes by
//! building new parents around unchanged children, so an untouched subtree
//! stays the same allocation (`Rc::ptr_eq`).

use std::rc::Rc;
use std::sync::Arc;

use vectra_core::{SourceLocation, SourceSpan};

use crate::operators::{BinaryOperator, UnaryOperator};
use crate::slots::SlotAllocator;
use crate::symbols::{SymbolId, TypeRef};

pub type ExprRef = Rc<BoundExpr>;
pub type StmtRef = Rc<BoundStmt>;

// ============================================================================
// Expressions
// ============================================================================

/// A literal value after typing.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundExpr {
    pub ty: TypeRef,
    pub span: SourceSpan,
    pub kind: BoundExprKind,
}

/// Where an assignment stores its value.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    /// A local or parameter.
    Variable(SymbolId),
    Field { receiver: ExprRef, field: SymbolId },
    Property { receiver: ExprRef, property: SymbolId },
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoundExprKind {
    Literal(ConstantValue),
    /// Read of a local or parameter.
    Variable(SymbolId),
    Field {
        receiver: ExprRef,
        field: SymbolId,
    },
    Property {
        receiver: ExprRef,
        property: SymbolId,
    },
    Unary {
        op: UnaryOperator,
        operand: ExprRef,
    },
    Binary {
        op: BinaryOperator,
        left: ExprRef,
        right: ExprRef,
    },
    Assign {
        target: AssignTarget,
        value: ExprRef,
    },
    /// Method or constructor call. `receiver` is passed as `this`.
    Call {
        callable: SymbolId,
        receiver: ExprRef,
        args: Vec<ExprRef>,
    },
    NativeCall {
        function: SymbolId,
        args: Vec<ExprRef>,
    },
    /// Unresolved overload set; consumed by the enclosing call.
    MethodGroup {
        receiver: ExprRef,
        name: String,
        candidates: Vec<SymbolId>,
    },
    /// `new T(args)` before lowering.
    New {
        class: SymbolId,
        constructor: SymbolId,
        args: Vec<ExprRef>,
    },
    /// Replacement for anything that failed to bind.
    Error,
}

impl BoundExpr {
    pub fn new(kind: BoundExprKind, ty: TypeRef, span: SourceSpan) -> ExprRef {
        Rc::new(Self { ty, span, kind })
    }

    pub fn error(span: SourceSpan) -> ExprRef {
        Self::new(BoundExprKind::Error, TypeRef::ERROR, span)
    }

    pub fn number(value: f64, span: SourceSpan) -> ExprRef {
        Self::new(
            BoundExprKind::Literal(ConstantValue::Number(value)),
            TypeRef::NUMBER,
            span,
        )
    }

    pub fn variable(symbol: SymbolId, ty: TypeRef, span: SourceSpan) -> ExprRef {
        Self::new(BoundExprKind::Variable(symbol), ty, span)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, BoundExprKind::Error)
    }
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct BoundStmt {
    pub span: SourceSpan,
    pub kind: BoundStmtKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoundStmtKind {
    Block(Vec<StmtRef>),
    Expression(ExprRef),
    VariableDeclaration {
        local: SymbolId,
        initializer: Option<ExprRef>,
    },
    Return(Option<ExprRef>),
    /// Allocates an uninitialized instance of `class` into `target`.
    ObjectAllocation {
        target: SymbolId,
        class: SymbolId,
    },
    /// Replacement for a statement that failed to bind.
    Error,
}

impl BoundStmt {
    pub fn new(kind: BoundStmtKind, span: SourceSpan) -> StmtRef {
        Rc::new(Self { span, kind })
    }

    pub fn block(stmts: Vec<StmtRef>, span: SourceSpan) -> StmtRef {
        Self::new(BoundStmtKind::Block(stmts), span)
    }

    pub fn expression(expr: ExprRef) -> StmtRef {
        let span = expr.span;
        Self::new(BoundStmtKind::Expression(expr), span)
    }

    /// Whether control can never fall through this statement.
    ///
    /// A return terminates; a block terminates if any of its statements does.
    pub fn always_returns(&self) -> bool {
        match &self.kind {
            BoundStmtKind::Return(_) => true,
            BoundStmtKind::Block(stmts) => stmts.iter().any(|s| s.always_returns()),
            BoundStmtKind::Expression(_)
            | BoundStmtKind::VariableDeclaration { .. }
            | BoundStmtKind::ObjectAllocation { .. }
            | BoundStmtKind::Error => false,
        }
    }
}

// ============================================================================
// Bodies
// ============================================================================

/// The bound body of one method or constructor.
#[derive(Debug, Clone)]
pub struct BoundBody {
    pub callable: SymbolId,
    /// Always a [`BoundStmtKind::Block`].
    pub block: StmtRef,
    /// Slot counter of the callable; lowering continues it.
    pub slots: SlotAllocator,
    pub file: Arc<str>,
}

impl BoundBody {
    pub fn location(&self, span: SourceSpan) -> SourceLocation {
        SourceLocation::new(self.file.clone(), span)
    }

    pub fn statements(&self) -> &[StmtRef] {
        match &self.block.kind {
            BoundStmtKind::Block(stmts) => stmts,
            _ => &[],
        }
    }
}
