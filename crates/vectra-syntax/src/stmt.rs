//! Statement nodes.
//!
//! The parser produces every statement kind of the language. `if`, `while`
//! and `throw` are representable here but not yet accepted by the binder.

use vectra_core::SourceSpan;

use crate::decl::TypeName;
use crate::expr::Expr;

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Expression statement (`expr;`)
    Expr(ExprStmt),
    /// Variable declaration
    VarDecl(VarDeclStmt),
    /// Return statement
    Return(ReturnStmt),
    /// Block statement
    Block(Block),
    /// If statement
    If(Box<IfStmt>),
    /// While loop
    While(Box<WhileStmt>),
    /// Throw statement
    Throw(ThrowStmt),
}

impl Stmt {
    pub fn span(&self) -> SourceSpan {
        match self {
            Self::Expr(s) => s.span,
            Self::VarDecl(s) => s.span,
            Self::Return(s) => s.span,
            Self::Block(s) => s.span,
            Self::If(s) => s.span,
            Self::While(s) => s.span,
            Self::Throw(s) => s.span,
        }
    }

    /// Short name of the statement kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Expr(_) => "expression statement",
            Self::VarDecl(_) => "variable declaration",
            Self::Return(_) => "return statement",
            Self::Block(_) => "block",
            Self::If(_) => "if statement",
            Self::While(_) => "while statement",
            Self::Throw(_) => "throw statement",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: SourceSpan,
}

/// A variable declaration.
///
/// Examples:
/// - `number x = 1;` (explicit type)
/// - `let y = "text";` (inferred from the initializer)
#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclStmt {
    pub name: String,
    /// `None` for `let`.
    pub explicit_type: Option<TypeName>,
    pub initializer: Option<Expr>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: SourceSpan,
}

/// A block of statements (`{ ... }`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_branch: Stmt,
    pub else_branch: Option<Stmt>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Stmt,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThrowStmt {
    pub value: Expr,
    pub span: SourceSpan,
}
