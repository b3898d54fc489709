//! Vectra Syntax
//!
//! The syntax tree consumed by the backend. Trees are produced by the
//! external parser; this crate only defines the node types plus a
//! [`SyntaxBuilder`] for assembling trees programmatically.
//!
//! ## Modules
//!
//! - [`decl`]: Package, module, file, space, class and member nodes
//! - [`stmt`]: Statement nodes
//! - [`expr`]: Expression nodes
//! - [`ops`]: Unary and binary operators
//! - [`builder`]: Programmatic tree construction

pub mod builder;
pub mod decl;
pub mod expr;
pub mod ops;
pub mod stmt;

pub use builder::SyntaxBuilder;
pub use decl::{
    ClassDecl, ConstructorDecl, FieldDecl, MemberDecl, MethodDecl, ModuleSource, NodeId, Param,
    PropertyDecl, SourceFile, SpaceDecl, SyntaxPackage, TypeName,
};
pub use expr::{
    AssignExpr, BinaryExpr, CallExpr, Expr, IdentExpr, Literal, LiteralExpr, MemberExpr, NewExpr,
    UnaryExpr,
};
pub use ops::{BinaryOp, UnaryOp};
pub use stmt::{Block, ExprStmt, IfStmt, ReturnStmt, Stmt, ThrowStmt, VarDeclStmt, WhileStmt};
