//! Expression nodes.

use vectra_core::SourceSpan;

use crate::decl::TypeName;
use crate::ops::{BinaryOp, UnaryOp};

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(LiteralExpr),
    Identifier(IdentExpr),
    Unary(Box<UnaryExpr>),
    Binary(Box<BinaryExpr>),
    Assign(Box<AssignExpr>),
    Call(Box<CallExpr>),
    Member(Box<MemberExpr>),
    New(Box<NewExpr>),
}

impl Expr {
    pub fn span(&self) -> SourceSpan {
        match self {
            Self::Literal(e) => e.span,
            Self::Identifier(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Binary(e) => e.span,
            Self::Assign(e) => e.span,
            Self::Call(e) => e.span,
            Self::Member(e) => e.span,
            Self::New(e) => e.span,
        }
    }
}

/// A literal value as written in source.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    pub value: Literal,
    pub span: SourceSpan,
}

/// A bare name: local, parameter, member of the enclosing type or native function.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentExpr {
    pub name: String,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Expr,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: Expr,
    pub right: Expr,
    pub span: SourceSpan,
}

/// `target = value`
#[derive(Debug, Clone, PartialEq)]
pub struct AssignExpr {
    pub target: Expr,
    pub value: Expr,
    pub span: SourceSpan,
}

/// `callee(args)`. The callee is an identifier or a member access.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: Expr,
    pub args: Vec<Expr>,
    pub span: SourceSpan,
}

/// `object.member`
#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpr {
    pub object: Expr,
    pub member: String,
    pub span: SourceSpan,
}

/// `new T(args)`
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpr {
    pub type_name: TypeName,
    pub args: Vec<Expr>,
    pub span: SourceSpan,
}
