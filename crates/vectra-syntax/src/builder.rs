//! Programmatic syntax tree construction.
//!
//! The external parser is the usual source of trees. [`SyntaxBuilder`]
//! exists for tests, benches and tools that synthesize code: it hands out
//! fresh [`NodeId`]s and gives every node its own source line so that
//! diagnostics stay distinguishable.
//!
//! ```
//! use vectra_syntax::SyntaxBuilder;
//!
//! let b = SyntaxBuilder::new();
//! let package = b.program(vec![b.class(
//!     "Program",
//!     vec![b.method("Main", "void", vec![], vec![b.let_("y", b.number(1.0))])],
//! )]);
//! assert_eq!(package.modules.len(), 1);
//! ```

use std::cell::Cell;
use std::sync::Arc;

use vectra_core::{ModuleKind, ModuleMetadata, SourceSpan};

use crate::decl::*;
use crate::expr::*;
use crate::ops::{BinaryOp, UnaryOp};
use crate::stmt::*;

/// Builds syntax nodes with fresh ids and spans.
#[derive(Debug)]
pub struct SyntaxBuilder {
    next_id: Cell<u32>,
    next_line: Cell<u32>,
}

impl Default for SyntaxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxBuilder {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            next_line: Cell::new(1),
        }
    }

    fn id(&self) -> NodeId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        NodeId(id)
    }

    fn span(&self) -> SourceSpan {
        let line = self.next_line.get();
        self.next_line.set(line + 1);
        SourceSpan::new(line, 1, line, 80)
    }

    // ==========================================================================
    // Structure
    // ==========================================================================

    /// A package with one executable module `App` holding one file `app.vec`
    /// whose root space `App` declares `classes`.
    pub fn program(&self, classes: Vec<ClassDecl>) -> SyntaxPackage {
        let metadata = ModuleMetadata::new("App", ModuleKind::Executable, "app");
        let file = self.file("app.vec", self.space("App", classes, vec![]));
        SyntaxPackage {
            name: "App".to_string(),
            modules: vec![self.module(metadata, vec![file])],
        }
    }

    pub fn package(&self, name: &str, modules: Vec<ModuleSource>) -> SyntaxPackage {
        SyntaxPackage {
            name: name.to_string(),
            modules,
        }
    }

    pub fn module(&self, metadata: ModuleMetadata, files: Vec<SourceFile>) -> ModuleSource {
        ModuleSource { metadata, files }
    }

    pub fn file(&self, path: &str, space: SpaceDecl) -> SourceFile {
        SourceFile {
            path: Arc::from(path),
            space,
        }
    }

    pub fn space(&self, name: &str, types: Vec<ClassDecl>, subspaces: Vec<SpaceDecl>) -> SpaceDecl {
        SpaceDecl {
            name: name.to_string(),
            types,
            subspaces,
            span: self.span(),
        }
    }

    pub fn ty(&self, name: &str) -> TypeName {
        TypeName {
            name: name.to_string(),
            span: self.span(),
        }
    }

    // ==========================================================================
    // Declarations
    // ==========================================================================

    pub fn class(&self, name: &str, members: Vec<MemberDecl>) -> ClassDecl {
        ClassDecl {
            id: self.id(),
            name: name.to_string(),
            members,
            span: self.span(),
        }
    }

    pub fn field(&self, name: &str, ty: &str, initializer: Option<Expr>) -> MemberDecl {
        MemberDecl::Field(FieldDecl {
            id: self.id(),
            name: name.to_string(),
            ty: self.ty(ty),
            initializer,
            span: self.span(),
        })
    }

    pub fn property(&self, name: &str, ty: &str, has_getter: bool, has_setter: bool) -> MemberDecl {
        MemberDecl::Property(PropertyDecl {
            id: self.id(),
            name: name.to_string(),
            ty: self.ty(ty),
            has_getter,
            has_setter,
            span: self.span(),
        })
    }

    pub fn constructor(&self, params: Vec<Param>, body: Vec<Stmt>) -> MemberDecl {
        MemberDecl::Constructor(ConstructorDecl {
            id: self.id(),
            params,
            body: self.block_of(body),
            span: self.span(),
        })
    }

    pub fn method(
        &self,
        name: &str,
        return_type: &str,
        params: Vec<Param>,
        body: Vec<Stmt>,
    ) -> MemberDecl {
        MemberDecl::Method(MethodDecl {
            id: self.id(),
            name: name.to_string(),
            return_type: self.ty(return_type),
            params,
            body: self.block_of(body),
            span: self.span(),
        })
    }

    pub fn param(&self, name: &str, ty: &str) -> Param {
        Param {
            name: name.to_string(),
            ty: self.ty(ty),
            span: self.span(),
        }
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    fn block_of(&self, stmts: Vec<Stmt>) -> Block {
        Block {
            stmts,
            span: self.span(),
        }
    }

    pub fn block(&self, stmts: Vec<Stmt>) -> Stmt {
        Stmt::Block(self.block_of(stmts))
    }

    /// `let name = initializer;`
    pub fn let_(&self, name: &str, initializer: Expr) -> Stmt {
        Stmt::VarDecl(VarDeclStmt {
            name: name.to_string(),
            explicit_type: None,
            initializer: Some(initializer),
            span: self.span(),
        })
    }

    /// `ty name = initializer;` or `ty name;`
    pub fn var(&self, name: &str, ty: &str, initializer: Option<Expr>) -> Stmt {
        Stmt::VarDecl(VarDeclStmt {
            name: name.to_string(),
            explicit_type: Some(self.ty(ty)),
            initializer,
            span: self.span(),
        })
    }

    pub fn ret(&self, value: Option<Expr>) -> Stmt {
        Stmt::Return(ReturnStmt {
            value,
            span: self.span(),
        })
    }

    pub fn expr_stmt(&self, expr: Expr) -> Stmt {
        Stmt::Expr(ExprStmt {
            expr,
            span: self.span(),
        })
    }

    pub fn if_(&self, condition: Expr, then_branch: Stmt, else_branch: Option<Stmt>) -> Stmt {
        Stmt::If(Box::new(IfStmt {
            condition,
            then_branch,
            else_branch,
            span: self.span(),
        }))
    }

    pub fn while_(&self, condition: Expr, body: Stmt) -> Stmt {
        Stmt::While(Box::new(WhileStmt {
            condition,
            body,
            span: self.span(),
        }))
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    fn literal(&self, value: Literal) -> Expr {
        Expr::Literal(LiteralExpr {
            value,
            span: self.span(),
        })
    }

    pub fn number(&self, value: f64) -> Expr {
        self.literal(Literal::Number(value))
    }

    pub fn string(&self, value: &str) -> Expr {
        self.literal(Literal::String(value.to_string()))
    }

    pub fn boolean(&self, value: bool) -> Expr {
        self.literal(Literal::Bool(value))
    }

    pub fn null(&self) -> Expr {
        self.literal(Literal::Null)
    }

    pub fn ident(&self, name: &str) -> Expr {
        Expr::Identifier(IdentExpr {
            name: name.to_string(),
            span: self.span(),
        })
    }

    pub fn unary(&self, op: UnaryOp, operand: Expr) -> Expr {
        Expr::Unary(Box::new(UnaryExpr {
            op,
            operand,
            span: self.span(),
        }))
    }

    pub fn binary(&self, left: Expr, op: BinaryOp, right: Expr) -> Expr {
        Expr::Binary(Box::new(BinaryExpr {
            op,
            left,
            right,
            span: self.span(),
        }))
    }

    pub fn assign(&self, target: Expr, value: Expr) -> Expr {
        Expr::Assign(Box::new(AssignExpr {
            target,
            value,
            span: self.span(),
        }))
    }

    pub fn member(&self, object: Expr, member: &str) -> Expr {
        Expr::Member(Box::new(MemberExpr {
            object,
            member: member.to_string(),
            span: self.span(),
        }))
    }

    pub fn call(&self, callee: Expr, args: Vec<Expr>) -> Expr {
        Expr::Call(Box::new(CallExpr {
            callee,
            args,
            span: self.span(),
        }))
    }

    /// `object.method(args)`
    pub fn call_method(&self, object: Expr, method: &str, args: Vec<Expr>) -> Expr {
        let callee = self.member(object, method);
        self.call(callee, args)
    }

    pub fn new_(&self, type_name: &str, args: Vec<Expr>) -> Expr {
        Expr::New(Box::new(NewExpr {
            type_name: self.ty(type_name),
            args,
            span: self.span(),
        }))
    }
}
