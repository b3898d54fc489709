//! Body binding (pass 3).
//!
//! Binds method, constructor and field-initializer bodies into the bound
//! tree. Each callable gets its own chain of local scopes under its member
//! scope and its own [`SlotAllocator`]; nothing mutable is shared between
//! callables except the symbol table and the diagnostic bag.
//!
//! Binding never stops at the first problem. Anything that fails becomes an
//! `error`-typed node so that the rest of the body is still checked without
//! reporting the same problem twice.

use std::sync::Arc;

use tracing::{debug_span, trace};
use vectra_core::{CancellationToken, Cancelled, DiagnosticBag, ErrorCode, SourceLocation, SourceSpan};
use vectra_syntax::{
    AssignExpr, BinaryExpr, Block, CallExpr, Expr, IdentExpr, Literal, LiteralExpr, MemberDecl,
    MemberExpr, NewExpr, ReturnStmt, Stmt, UnaryExpr, VarDeclStmt,
};

use crate::bound::{
    AssignTarget, BoundBody, BoundExpr, BoundExprKind, BoundStmt, BoundStmtKind, ConstantValue,
    ExprRef, StmtRef,
};
use crate::declaration::{CONSTRUCTOR_NAME, Declarations};
use crate::operators::{resolve_binary, resolve_unary};
use crate::options::{BindOptions, OverloadResolution};
use crate::scope::{Declarable, Scope, ScopeArena, ScopeId, ScopeKind};
use crate::slots::SlotAllocator;
use crate::symbols::{Accessors, LocalSymbol, Symbol, SymbolId, SymbolKind, SymbolTable, TypeRef};

type Result<T> = std::result::Result<T, Cancelled>;

/// Binds every body of every declared type.
///
/// Returns the bound bodies of methods and constructors (synthesized
/// constructors included) in declaration order. Field initializers are
/// stored on their field symbols.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn bind_bodies(
    decls: &mut Declarations<'_>,
    options: &BindOptions,
    diagnostics: &mut DiagnosticBag,
    cancel: &CancellationToken,
) -> Result<Vec<BoundBody>> {
    let mut bodies = Vec::new();
    let types = decls.types().to_vec();

    for declared in types {
        cancel.check()?;
        let owner = declared.symbol;
        let _span = debug_span!("bind_type", ty = %decls.symbols.get(owner).name).entered();

        for member in &declared.decl.members {
            cancel.check()?;
            // Members rejected as duplicates have no symbol and are not bound.
            let Some(symbol) = decls.symbol_for(member.id()) else {
                continue;
            };
            let file = file_of(&decls.symbols, symbol);
            match member {
                MemberDecl::Field(field) => {
                    if let Some(initializer) = &field.initializer {
                        let mut binder = BodyBinder::new(decls, options, diagnostics, owner, None, file);
                        binder.bind_field_initializer(symbol, initializer);
                    }
                }
                MemberDecl::Property(_) => {}
                MemberDecl::Constructor(ctor) => {
                    let binder = BodyBinder::new(decls, options, diagnostics, owner, Some(symbol), file);
                    bodies.push(binder.bind_callable(symbol, &ctor.body));
                }
                MemberDecl::Method(method) => {
                    let binder = BodyBinder::new(decls, options, diagnostics, owner, Some(symbol), file);
                    bodies.push(binder.bind_callable(symbol, &method.body));
                }
            }
        }

        let synthesized: Vec<SymbolId> = decls
            .symbols
            .named_type(owner)
            .member_order
            .iter()
            .copied()
            .filter(|&m| {
                decls
                    .symbols
                    .get(m)
                    .as_callable()
                    .is_some_and(|c| c.synthesized)
            })
            .collect();
        for ctor in synthesized {
            let file = file_of(&decls.symbols, ctor);
            let span = decls
                .symbols
                .get(ctor)
                .location
                .as_ref()
                .map(|l| l.span)
                .unwrap_or_default();
            let binder = BodyBinder::new(decls, options, diagnostics, owner, Some(ctor), file);
            bodies.push(binder.bind_callable(ctor, &Block {
                stmts: Vec::new(),
                span,
            }));
        }
    }

    Ok(bodies)
}

fn file_of(symbols: &SymbolTable, symbol: SymbolId) -> Arc<str> {
    symbols
        .get(symbol)
        .location
        .as_ref()
        .map(|l| l.file.clone())
        .unwrap_or_else(|| Arc::from(""))
}

// ============================================================================
// BodyBinder
// ============================================================================

struct BodyBinder<'a> {
    symbols: &'a mut SymbolTable,
    scopes: &'a ScopeArena,
    options: &'a BindOptions,
    diagnostics: &'a mut DiagnosticBag,
    file: Arc<str>,
    owner: SymbolId,
    members: ScopeId,
    /// `None` while binding a field initializer.
    callable: Option<SymbolId>,
    this: Option<SymbolId>,
    /// Local scopes, innermost last. The first frame holds the parameters
    /// and the top-level statements of the body.
    frames: Vec<Scope>,
    slots: SlotAllocator,
}

impl<'a> BodyBinder<'a> {
    fn new(
        decls: &'a mut Declarations<'_>,
        options: &'a BindOptions,
        diagnostics: &'a mut DiagnosticBag,
        owner: SymbolId,
        callable: Option<SymbolId>,
        file: Arc<str>,
    ) -> Self {
        let members = decls.symbols.named_type(owner).members;
        let mut binder = Self {
            symbols: &mut decls.symbols,
            scopes: &decls.scopes,
            options,
            diagnostics,
            file,
            owner,
            members,
            callable,
            this: None,
            frames: vec![Scope::new(ScopeKind::Local)],
            slots: SlotAllocator::new(),
        };
        binder.seed_parameters();
        binder
    }

    fn seed_parameters(&mut self) {
        let Some(callable) = self.callable else {
            return;
        };
        let params = self.symbols.callable(callable).params.clone();
        for param in params {
            let slot = self.slots.allocate();
            debug_assert_eq!(slot, self.symbols.parameter(param).slot);
            let name = self.symbols.get(param).name.clone();
            // Parameter names were checked for duplicates when declared.
            let _ = self.frames[0].try_declare(&name, Declarable::Unique(param));
        }
        self.this = self.symbols.callable(callable).params.first().copied();
    }

    fn bind_callable(mut self, callable: SymbolId, block: &Block) -> BoundBody {
        let _span = debug_span!("bind_body", callable = %self.symbols.display_name(callable)).entered();

        let stmts = block.stmts.iter().map(|s| self.bind_stmt(s)).collect();
        BoundBody {
            callable,
            block: BoundStmt::block(stmts, block.span),
            slots: self.slots,
            file: self.file,
        }
    }

    fn bind_field_initializer(&mut self, field: SymbolId, initializer: &Expr) {
        let expected = self.symbols.field(field).ty;
        let value = self.bind_value(initializer);
        let value = self.require_type(value, expected, initializer.span(), |actual, expected| {
            format!("Cannot initialize a field of type '{}' with '{}'", expected, actual)
        });
        self.symbols.field(field).set_initializer(value);
    }

    // ==========================================================================
    // Helpers
    // ==========================================================================

    fn location(&self, span: SourceSpan) -> Option<SourceLocation> {
        Some(SourceLocation::new(self.file.clone(), span))
    }

    fn error(&mut self, code: ErrorCode, span: SourceSpan, message: String) {
        let location = self.location(span);
        self.diagnostics.error(code, location, message);
    }

    fn type_name(&self, ty: TypeRef) -> String {
        self.symbols.type_name(ty).to_string()
    }

    /// Local frames innermost first, then the member scope chain.
    fn lookup(&self, name: &str) -> Vec<SymbolId> {
        for frame in self.frames.iter().rev() {
            let found = frame.get(name);
            if !found.is_empty() {
                return found.to_vec();
            }
        }
        self.scopes.lookup(self.members, name).to_vec()
    }

    fn resolve_type(&mut self, name: &str, span: SourceSpan) -> TypeRef {
        let location = self.location(span);
        self.scopes
            .resolve_type(self.symbols, self.members, name, location, self.diagnostics)
    }

    fn this_expr(&self, span: SourceSpan) -> Option<ExprRef> {
        self.this
            .map(|this| BoundExpr::variable(this, TypeRef::Named(self.owner), span))
    }

    /// Replaces `expr` by an error node when its type differs from `expected`.
    fn require_type(
        &mut self,
        expr: ExprRef,
        expected: TypeRef,
        span: SourceSpan,
        message: impl FnOnce(&str, &str) -> String,
    ) -> ExprRef {
        if expr.ty.is_error() || expected.is_error() || expr.ty == expected {
            return expr;
        }
        let text = message(self.symbols.type_name(expr.ty), self.symbols.type_name(expected));
        self.error(ErrorCode::TypeMismatch, span, text);
        BoundExpr::error(span)
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    fn bind_stmt(&mut self, stmt: &Stmt) -> StmtRef {
        match stmt {
            Stmt::Expr(s) => BoundStmt::new(BoundStmtKind::Expression(self.bind_value(&s.expr)), s.span),
            Stmt::VarDecl(s) => self.bind_var_decl(s),
            Stmt::Return(s) => self.bind_return(s),
            Stmt::Block(block) => {
                self.frames.push(Scope::new(ScopeKind::Local));
                let stmts = block.stmts.iter().map(|s| self.bind_stmt(s)).collect();
                self.frames.pop();
                BoundStmt::block(stmts, block.span)
            }
            Stmt::If(_) | Stmt::While(_) | Stmt::Throw(_) => {
                self.error(
                    ErrorCode::UnsupportedNode,
                    stmt.span(),
                    format!("The {} is not supported", stmt.kind_name()),
                );
                BoundStmt::new(BoundStmtKind::Error, stmt.span())
            }
        }
    }

    fn bind_var_decl(&mut self, decl: &VarDeclStmt) -> StmtRef {
        let (ty, initializer) = match &decl.explicit_type {
            Some(type_name) => {
                let ty = self.resolve_type(&type_name.name, type_name.span);
                let initializer = decl.initializer.as_ref().map(|expr| {
                    let value = self.bind_value(expr);
                    self.require_type(value, ty, expr.span(), |actual, expected| {
                        format!("Cannot convert '{}' to '{}'", actual, expected)
                    })
                });
                (ty, initializer)
            }
            None => self.infer_var_type(decl),
        };

        if !self.frames.last().map_or(true, |f| f.get(&decl.name).is_empty()) {
            self.error(
                ErrorCode::VariableAlreadyDeclared,
                decl.span,
                format!("A variable named '{}' is already declared in this scope", decl.name),
            );
            return BoundStmt::new(BoundStmtKind::Error, decl.span);
        }

        let slot = self.slots.allocate();
        let local = self.symbols.add(Symbol {
            name: decl.name.clone(),
            location: self.location(decl.span),
            kind: SymbolKind::Local(LocalSymbol {
                ty,
                slot,
                synthesized: false,
            }),
        });
        if let Some(frame) = self.frames.last_mut() {
            let _ = frame.try_declare(&decl.name, Declarable::Unique(local));
        }
        trace!(name = %decl.name, slot, "declared local");

        BoundStmt::new(BoundStmtKind::VariableDeclaration { local, initializer }, decl.span)
    }

    /// Type of a `let` declaration, taken from its initializer.
    fn infer_var_type(&mut self, decl: &VarDeclStmt) -> (TypeRef, Option<ExprRef>) {
        let Some(expr) = &decl.initializer else {
            self.error(
                ErrorCode::UnableToInferType,
                decl.span,
                format!("Implicitly-typed variable '{}' must be initialized", decl.name),
            );
            return (TypeRef::ERROR, None);
        };

        let value = self.bind_value(expr);
        let ty = match value.ty {
            TypeRef::NULL => {
                self.error(
                    ErrorCode::UnableToInferType,
                    decl.span,
                    format!("Cannot infer the type of '{}' from 'null'", decl.name),
                );
                TypeRef::ERROR
            }
            TypeRef::VOID => {
                self.error(
                    ErrorCode::UnableToInferType,
                    decl.span,
                    format!("Cannot initialize '{}' with an expression of type 'void'", decl.name),
                );
                TypeRef::ERROR
            }
            ty if ty.is_unresolved() => {
                let location = self.location(decl.span);
                self.diagnostics.warning(
                    ErrorCode::UnableToInferType,
                    location,
                    format!("The type of '{}' could not be inferred", decl.name),
                );
                ty
            }
            ty => ty,
        };
        (ty, Some(value))
    }

    fn bind_return(&mut self, stmt: &ReturnStmt) -> StmtRef {
        let Some(callable) = self.callable else {
            unreachable!("return statement outside of a callable body");
        };
        let return_type = self.symbols.callable(callable).return_type;

        let value = match (&stmt.value, return_type.is_void()) {
            (Some(expr), true) => {
                self.bind_value(expr);
                self.error(
                    ErrorCode::IllegalStatement,
                    stmt.span,
                    "Cannot return a value from a void method".to_string(),
                );
                Some(BoundExpr::error(expr.span()))
            }
            (Some(expr), false) => {
                let value = self.bind_value(expr);
                Some(self.require_type(value, return_type, expr.span(), |actual, expected| {
                    format!("Cannot return '{}' from a method returning '{}'", actual, expected)
                }))
            }
            (None, false) => {
                if !return_type.is_error() {
                    let message = format!(
                        "A value of type '{}' must be returned",
                        self.type_name(return_type)
                    );
                    self.error(ErrorCode::IllegalStatement, stmt.span, message);
                }
                None
            }
            (None, true) => None,
        };
        BoundStmt::new(BoundStmtKind::Return(value), stmt.span)
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    /// Binds an expression whose value is used. Method groups are rejected.
    fn bind_value(&mut self, expr: &Expr) -> ExprRef {
        let bound = self.bind_expr(expr);
        if let BoundExprKind::MethodGroup { name, .. } = &bound.kind {
            let message = format!("Method '{}' must be called", name);
            self.error(ErrorCode::TargetNotCallable, expr.span(), message);
            return BoundExpr::error(expr.span());
        }
        bound
    }

    fn bind_expr(&mut self, expr: &Expr) -> ExprRef {
        match expr {
            Expr::Literal(lit) => self.bind_literal(lit),
            Expr::Identifier(ident) => self.bind_identifier(ident),
            Expr::Unary(unary) => self.bind_unary(unary),
            Expr::Binary(binary) => self.bind_binary(binary),
            Expr::Assign(assign) => self.bind_assign(assign),
            Expr::Call(call) => self.bind_call(call),
            Expr::Member(member) => self.bind_member(member),
            Expr::New(new) => self.bind_new(new),
        }
    }

    fn bind_literal(&mut self, lit: &LiteralExpr) -> ExprRef {
        let (value, ty) = match &lit.value {
            Literal::Null => (ConstantValue::Null, TypeRef::NULL),
            Literal::Bool(b) => (ConstantValue::Bool(*b), TypeRef::BOOL),
            Literal::Number(n) => (ConstantValue::Number(*n), TypeRef::NUMBER),
            Literal::String(s) => (ConstantValue::String(s.clone()), TypeRef::STRING),
        };
        BoundExpr::new(BoundExprKind::Literal(value), ty, lit.span)
    }

    fn bind_identifier(&mut self, ident: &IdentExpr) -> ExprRef {
        let candidates = self.lookup(&ident.name);
        let Some(&first) = candidates.first() else {
            self.error(
                ErrorCode::IdentifierNotFound,
                ident.span,
                format!("The name '{}' does not exist in the current context", ident.name),
            );
            return BoundExpr::error(ident.span);
        };

        match &self.symbols.get(first).kind {
            SymbolKind::Local(LocalSymbol { ty, .. }) => BoundExpr::variable(first, *ty, ident.span),
            SymbolKind::Parameter(p) => BoundExpr::variable(first, p.ty, ident.span),
            SymbolKind::Field(_)
            | SymbolKind::Property(_)
            | SymbolKind::Method(_)
            | SymbolKind::Constructor(_) => match self.this_expr(ident.span) {
                Some(receiver) => self.bind_member_of(receiver, &ident.name, &candidates, ident.span),
                None => {
                    self.error(
                        ErrorCode::IllegalAccess,
                        ident.span,
                        format!(
                            "Instance member '{}' cannot be used in a field initializer",
                            ident.name
                        ),
                    );
                    BoundExpr::error(ident.span)
                }
            },
            SymbolKind::BuiltInType(_) | SymbolKind::NamedType(_) => {
                self.error(
                    ErrorCode::IllegalAccess,
                    ident.span,
                    format!("'{}' is a type but is used like a value", ident.name),
                );
                BoundExpr::error(ident.span)
            }
            SymbolKind::NativeFunction(_) => {
                self.error(
                    ErrorCode::TargetNotCallable,
                    ident.span,
                    format!("Native function '{}' must be called", ident.name),
                );
                BoundExpr::error(ident.span)
            }
        }
    }

    /// Binds `receiver.name` given the member candidates found for `name`.
    fn bind_member_of(
        &mut self,
        receiver: ExprRef,
        name: &str,
        candidates: &[SymbolId],
        span: SourceSpan,
    ) -> ExprRef {
        let first = candidates[0];
        match &self.symbols.get(first).kind {
            SymbolKind::Method(_) => {
                let methods = candidates
                    .iter()
                    .copied()
                    .filter(|&c| matches!(self.symbols.get(c).kind, SymbolKind::Method(_)))
                    .collect();
                BoundExpr::new(
                    BoundExprKind::MethodGroup {
                        receiver,
                        name: name.to_string(),
                        candidates: methods,
                    },
                    TypeRef::UNKNOWN,
                    span,
                )
            }
            SymbolKind::Field(field) => BoundExpr::new(
                BoundExprKind::Field {
                    receiver,
                    field: first,
                },
                field.ty,
                span,
            ),
            SymbolKind::Property(property) if property.accessors.contains(Accessors::GET) => {
                BoundExpr::new(
                    BoundExprKind::Property {
                        receiver,
                        property: first,
                    },
                    property.ty,
                    span,
                )
            }
            SymbolKind::Property(_) => {
                let message = format!("Property '{}' has no getter", self.symbols.display_name(first));
                self.error(ErrorCode::IllegalAccess, span, message);
                BoundExpr::error(span)
            }
            _ => {
                let message = format!(
                    "'{}' does not contain a member named '{}'",
                    self.type_name(receiver.ty),
                    name
                );
                self.error(ErrorCode::UnknownMember, span, message);
                BoundExpr::error(span)
            }
        }
    }

    /// Member candidates of the receiver's type, or `None` after reporting.
    fn member_candidates(&mut self, receiver: &ExprRef, name: &str, span: SourceSpan) -> Option<Vec<SymbolId>> {
        if receiver.ty.is_error() {
            return None;
        }
        let Some(class) = receiver.ty.as_named() else {
            let message = format!(
                "Type '{}' has no member named '{}'",
                self.type_name(receiver.ty),
                name
            );
            self.error(ErrorCode::UnknownMember, span, message);
            return None;
        };
        let members = self.symbols.named_type(class).members;
        let candidates = self.scopes.lookup_local(members, name).to_vec();
        if candidates.is_empty() {
            let message = format!(
                "'{}' does not contain a member named '{}'",
                self.type_name(receiver.ty),
                name
            );
            self.error(ErrorCode::UnknownMember, span, message);
            return None;
        }
        Some(candidates)
    }

    fn bind_member(&mut self, member: &MemberExpr) -> ExprRef {
        let receiver = self.bind_value(&member.object);
        match self.member_candidates(&receiver, &member.member, member.span) {
            Some(candidates) => self.bind_member_of(receiver, &member.member, &candidates, member.span),
            None => BoundExpr::error(member.span),
        }
    }

    fn bind_unary(&mut self, unary: &UnaryExpr) -> ExprRef {
        let operand = self.bind_value(&unary.operand);
        if operand.ty.is_error() {
            return BoundExpr::error(unary.span);
        }
        match resolve_unary(unary.op, operand.ty) {
            Some(op) => BoundExpr::new(BoundExprKind::Unary { op, operand }, op.result, unary.span),
            None => {
                let message = format!(
                    "Operator '{}' cannot be applied to operand of type '{}'",
                    unary.op,
                    self.type_name(operand.ty)
                );
                self.error(ErrorCode::InvalidOperator, unary.span, message);
                BoundExpr::error(unary.span)
            }
        }
    }

    fn bind_binary(&mut self, binary: &BinaryExpr) -> ExprRef {
        let left = self.bind_value(&binary.left);
        let right = self.bind_value(&binary.right);
        if left.ty.is_error() || right.ty.is_error() {
            return BoundExpr::error(binary.span);
        }
        match resolve_binary(binary.op, left.ty, right.ty) {
            Some(op) => BoundExpr::new(
                BoundExprKind::Binary { op, left, right },
                op.result,
                binary.span,
            ),
            None => {
                let message = format!(
                    "Operator '{}' cannot be applied to operands of type '{}' and '{}'",
                    binary.op,
                    self.type_name(left.ty),
                    self.type_name(right.ty)
                );
                self.error(ErrorCode::InvalidOperator, binary.span, message);
                BoundExpr::error(binary.span)
            }
        }
    }

    fn bind_assign(&mut self, assign: &AssignExpr) -> ExprRef {
        let target = self.bind_assign_target(&assign.target);
        let value = self.bind_value(&assign.value);
        let Some((target, ty)) = target else {
            return BoundExpr::error(assign.span);
        };
        let value = self.require_type(value, ty, assign.value.span(), |actual, expected| {
            format!("Cannot assign '{}' to '{}'", actual, expected)
        });
        if value.is_error() {
            return BoundExpr::error(assign.span);
        }
        BoundExpr::new(BoundExprKind::Assign { target, value }, ty, assign.span)
    }

    fn bind_assign_target(&mut self, expr: &Expr) -> Option<(AssignTarget, TypeRef)> {
        match expr {
            Expr::Identifier(ident) => {
                let candidates = self.lookup(&ident.name);
                let Some(&first) = candidates.first() else {
                    self.error(
                        ErrorCode::IdentifierNotFound,
                        ident.span,
                        format!("The name '{}' does not exist in the current context", ident.name),
                    );
                    return None;
                };
                match &self.symbols.get(first).kind {
                    SymbolKind::Local(local) => Some((AssignTarget::Variable(first), local.ty)),
                    SymbolKind::Parameter(param) if param.is_this() => {
                        self.error(
                            ErrorCode::IllegalStatement,
                            ident.span,
                            "Cannot assign to 'this'".to_string(),
                        );
                        None
                    }
                    SymbolKind::Parameter(param) => Some((AssignTarget::Variable(first), param.ty)),
                    SymbolKind::Field(_) | SymbolKind::Property(_) => match self.this_expr(ident.span) {
                        Some(receiver) => self.member_target(receiver, first, ident.span),
                        None => {
                            self.error(
                                ErrorCode::IllegalAccess,
                                ident.span,
                                format!(
                                    "Instance member '{}' cannot be used in a field initializer",
                                    ident.name
                                ),
                            );
                            None
                        }
                    },
                    _ => {
                        self.error(
                            ErrorCode::IllegalStatement,
                            ident.span,
                            format!("Cannot assign to '{}'", ident.name),
                        );
                        None
                    }
                }
            }
            Expr::Member(member) => {
                let receiver = self.bind_value(&member.object);
                let candidates = self.member_candidates(&receiver, &member.member, member.span)?;
                self.member_target(receiver, candidates[0], member.span)
            }
            other => {
                self.error(
                    ErrorCode::IllegalStatement,
                    other.span(),
                    "The left-hand side of an assignment must be a variable, field or property"
                        .to_string(),
                );
                None
            }
        }
    }

    fn member_target(
        &mut self,
        receiver: ExprRef,
        member: SymbolId,
        span: SourceSpan,
    ) -> Option<(AssignTarget, TypeRef)> {
        match &self.symbols.get(member).kind {
            SymbolKind::Field(field) => Some((
                AssignTarget::Field {
                    receiver,
                    field: member,
                },
                field.ty,
            )),
            SymbolKind::Property(property) if property.accessors.contains(Accessors::SET) => Some((
                AssignTarget::Property {
                    receiver,
                    property: member,
                },
                property.ty,
            )),
            SymbolKind::Property(_) => {
                let message = format!("Property '{}' has no setter", self.symbols.display_name(member));
                self.error(ErrorCode::IllegalStatement, span, message);
                None
            }
            _ => {
                let message = format!("Cannot assign to method '{}'", self.symbols.display_name(member));
                self.error(ErrorCode::IllegalStatement, span, message);
                None
            }
        }
    }

    fn bind_call(&mut self, call: &CallExpr) -> ExprRef {
        if let Expr::Identifier(ident) = &call.callee {
            if let Some(&first) = self.lookup(&ident.name).first() {
                if matches!(self.symbols.get(first).kind, SymbolKind::NativeFunction(_)) {
                    return self.bind_native_call(first, call);
                }
            }
        }

        let callee = self.bind_expr(&call.callee);
        let args: Vec<ExprRef> = call.args.iter().map(|a| self.bind_value(a)).collect();

        match &callee.kind {
            BoundExprKind::MethodGroup {
                receiver,
                name,
                candidates,
            } => {
                let Some(method) = self.select_overload(name, candidates, args.len(), call.span) else {
                    return BoundExpr::error(call.span);
                };
                if !self.check_arguments(method, &args) {
                    return BoundExpr::error(call.span);
                }
                let return_type = self.symbols.callable(method).return_type;
                BoundExpr::new(
                    BoundExprKind::Call {
                        callable: method,
                        receiver: receiver.clone(),
                        args,
                    },
                    return_type,
                    call.span,
                )
            }
            BoundExprKind::Error => callee,
            _ => {
                self.error(
                    ErrorCode::TargetNotCallable,
                    call.callee.span(),
                    "Expression is not callable".to_string(),
                );
                BoundExpr::error(call.span)
            }
        }
    }

    /// Picks the method whose arity matches `argc + 1` (for `this`).
    fn select_overload(
        &mut self,
        name: &str,
        candidates: &[SymbolId],
        argc: usize,
        span: SourceSpan,
    ) -> Option<SymbolId> {
        let wanted = argc + 1;
        if let Some(&method) = candidates
            .iter()
            .find(|&&m| self.symbols.callable(m).arity() == wanted)
        {
            return Some(method);
        }

        match self.options.overload_resolution {
            OverloadResolution::FirstCandidate => {
                trace!(%name, argc, "no arity match, using first candidate");
                candidates.first().copied()
            }
            OverloadResolution::Exact => {
                let owner = self.symbols.get(self.owner).name.clone();
                let shown = candidates
                    .first()
                    .map(|&m| self.symbols.display_name(m))
                    .unwrap_or_else(|| format!("{}.{}", owner, name));
                self.error(
                    ErrorCode::NoMatchingOverload,
                    span,
                    format!("No overload of '{}' takes {} argument(s)", shown, argc),
                );
                None
            }
        }
    }

    /// Checks argument types against the callable's declared parameters.
    fn check_arguments(&mut self, callable: SymbolId, args: &[ExprRef]) -> bool {
        let params: Vec<TypeRef> = self.symbols.callable(callable).params[1..]
            .iter()
            .map(|&p| self.symbols.parameter(p).ty)
            .collect();
        let name = self.symbols.display_name(callable);
        self.check_argument_types(&name, &params, args)
    }

    fn check_argument_types(&mut self, name: &str, params: &[TypeRef], args: &[ExprRef]) -> bool {
        let mut ok = true;
        for (i, (arg, &expected)) in args.iter().zip(params).enumerate() {
            if arg.ty.is_error() {
                ok = false;
                continue;
            }
            if expected.is_error() || arg.ty == expected {
                continue;
            }
            let message = format!(
                "Argument {} of '{}' expects '{}' but got '{}'",
                i + 1,
                name,
                self.type_name(expected),
                self.type_name(arg.ty)
            );
            self.error(ErrorCode::TypeMismatch, arg.span, message);
            ok = false;
        }
        ok
    }

    fn bind_native_call(&mut self, function: SymbolId, call: &CallExpr) -> ExprRef {
        let args: Vec<ExprRef> = call.args.iter().map(|a| self.bind_value(a)).collect();
        let native = self.symbols.native_function(function);
        let params = native.param_types.clone();
        let return_type = native.return_type;
        let name = self.symbols.get(function).name.clone();

        if args.len() != params.len() {
            self.error(
                ErrorCode::NoMatchingOverload,
                call.span,
                format!(
                    "Native function '{}' takes {} argument(s) but {} were given",
                    name,
                    params.len(),
                    args.len()
                ),
            );
            return BoundExpr::error(call.span);
        }
        if !self.check_argument_types(&name, &params, &args) {
            return BoundExpr::error(call.span);
        }
        BoundExpr::new(BoundExprKind::NativeCall { function, args }, return_type, call.span)
    }

    fn bind_new(&mut self, new: &NewExpr) -> ExprRef {
        let ty = self.resolve_type(&new.type_name.name, new.type_name.span);
        let args: Vec<ExprRef> = new.args.iter().map(|a| self.bind_value(a)).collect();
        if ty.is_error() {
            return BoundExpr::error(new.span);
        }
        let Some(class) = ty.as_named() else {
            let message = format!("Type '{}' cannot be constructed", self.type_name(ty));
            self.error(ErrorCode::CannotFindConstructor, new.span, message);
            return BoundExpr::error(new.span);
        };

        let members = self.symbols.named_type(class).members;
        let wanted = args.len() + 1;
        let constructor = self
            .scopes
            .lookup_local(members, CONSTRUCTOR_NAME)
            .iter()
            .copied()
            .find(|&c| self.symbols.callable(c).arity() == wanted);
        let Some(constructor) = constructor else {
            let message = format!(
                "'{}' has no constructor taking {} argument(s)",
                self.type_name(ty),
                args.len()
            );
            self.error(ErrorCode::CannotFindConstructor, new.span, message);
            return BoundExpr::error(new.span);
        };

        if !self.check_arguments(constructor, &args) {
            return BoundExpr::error(new.span);
        }
        BoundExpr::new(
            BoundExprKind::New {
                class,
                constructor,
                args,
            },
            ty,
            new.span,
        )
    }
}
