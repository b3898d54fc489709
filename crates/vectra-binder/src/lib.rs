//! Vectra Binder
//!
//! Turns the syntax tree into a symbol table plus a typed bound tree.
//!
//! Binding runs in three passes over the whole package:
//!
//! 1. **Types**: spaces and named types, each with its member scope
//! 2. **Members**: fields, properties, constructors and methods with their
//!    parameters; default constructors are synthesized here
//! 3. **Bodies**: method and constructor bodies and field initializers
//!
//! Every pass reports into one [`DiagnosticBag`] and keeps going after
//! errors, so a single run reports as much as possible.
//!
//! ## Modules
//!
//! - [`symbols`]: Symbol kinds and the symbol table
//! - [`scope`]: Scopes and the scope arena
//! - [`space_tree`]: Module and space hierarchy
//! - [`declaration`]: Passes 1 and 2
//! - [`body`]: Pass 3
//! - [`bound`]: The bound tree
//! - [`visitor`]: Read-only traversal of the bound tree
//! - [`operators`]: Operator tables
//! - [`native`]: Host intrinsics
//! - [`slots`]: Per-callable slot allocation

pub mod body;
pub mod bound;
pub mod declaration;
pub mod native;
pub mod operators;
pub mod options;
pub mod scope;
pub mod slots;
pub mod space_tree;
pub mod symbols;
pub mod visitor;

pub use body::bind_bodies;
pub use bound::{
    AssignTarget, BoundBody, BoundExpr, BoundExprKind, BoundStmt, BoundStmtKind, ConstantValue,
    ExprRef, StmtRef,
};
pub use declaration::{CONSTRUCTOR_NAME, DeclarationBinder, DeclaredType, Declarations};
pub use native::NativeFunctionRegistry;
pub use operators::{BinaryOperator, UnaryOperator};
pub use options::{BindOptions, OverloadResolution};
pub use scope::{Declarable, DeclareError, Scope, ScopeArena, ScopeId, ScopeKind};
pub use slots::SlotAllocator;
pub use symbols::{
    Accessors, BuiltInType, CallableSymbol, FieldSymbol, LocalSymbol, NamedTypeSymbol,
    NativeFunctionSymbol, ParameterSymbol, PropertySymbol, Symbol, SymbolId, SymbolKind,
    SymbolTable, TypeKind, TypeRef,
};

use vectra_core::{CancellationToken, Cancelled, DiagnosticBag};
use vectra_syntax::SyntaxPackage;

/// Result of binding a whole package.
#[derive(Debug)]
pub struct BoundPackage<'syn> {
    pub declarations: Declarations<'syn>,
    /// Method and constructor bodies in declaration order.
    pub bodies: Vec<BoundBody>,
}

/// Runs all three binding passes.
pub fn bind<'syn>(
    package: &'syn SyntaxPackage,
    options: &BindOptions,
    diagnostics: &mut DiagnosticBag,
    cancel: &CancellationToken,
) -> Result<BoundPackage<'syn>, Cancelled> {
    let mut declarations = DeclarationBinder::bind(package, diagnostics, cancel)?;
    let bodies = bind_bodies(&mut declarations, options, diagnostics, cancel)?;
    Ok(BoundPackage {
        declarations,
        bodies,
    })
}
