//! Symbols and the symbol table.
//!
//! Symbols live in a [`SymbolTable`] arena and are addressed by [`SymbolId`].
//! They are created by the declaration passes and never removed; the body
//! pass adds locals, lowering adds temporaries.
//!
//! ```text
//! Symbol
//! ├── BuiltInType        void, bool, number, string, null, error, unknown
//! ├── NamedType          class with exactly one member scope
//! ├── Local / Parameter  slot-addressed storage of one callable
//! ├── Field / Property   members of a named type
//! ├── Method / Constructor
//! └── NativeFunction     host intrinsic addressed by native index
//! ```

use std::cell::OnceCell;
use std::fmt;

use bitflags::bitflags;
use vectra_core::SourceLocation;

use crate::bound::ExprRef;
use crate::scope::{Declarable, ScopeId};

/// Index of a symbol in the [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub(crate) u32);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

// ============================================================================
// Types
// ============================================================================

/// The closed set of primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltInType {
    Void,
    Bool,
    Number,
    String,
    Null,
    /// Stands in for the type of anything that failed to bind.
    Error,
    Unknown,
}

impl BuiltInType {
    pub const ALL: [BuiltInType; 7] = [
        BuiltInType::Void,
        BuiltInType::Bool,
        BuiltInType::Number,
        BuiltInType::String,
        BuiltInType::Null,
        BuiltInType::Error,
        BuiltInType::Unknown,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltInType::Void => "void",
            BuiltInType::Bool => "bool",
            BuiltInType::Number => "number",
            BuiltInType::String => "string",
            BuiltInType::Null => "null",
            BuiltInType::Error => "error",
            BuiltInType::Unknown => "unknown",
        }
    }
}

/// A resolved type: a built-in singleton or a declared class.
///
/// Equality is nominal: two named types are equal only if they are the
/// same symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeRef {
    BuiltIn(BuiltInType),
    Named(SymbolId),
}

impl TypeRef {
    pub const VOID: TypeRef = TypeRef::BuiltIn(BuiltInType::Void);
    pub const BOOL: TypeRef = TypeRef::BuiltIn(BuiltInType::Bool);
    pub const NUMBER: TypeRef = TypeRef::BuiltIn(BuiltInType::Number);
    pub const STRING: TypeRef = TypeRef::BuiltIn(BuiltInType::String);
    pub const NULL: TypeRef = TypeRef::BuiltIn(BuiltInType::Null);
    pub const ERROR: TypeRef = TypeRef::BuiltIn(BuiltInType::Error);
    pub const UNKNOWN: TypeRef = TypeRef::BuiltIn(BuiltInType::Unknown);

    pub fn is_error(self) -> bool {
        self == TypeRef::ERROR
    }

    pub fn is_void(self) -> bool {
        self == TypeRef::VOID
    }

    /// `error` or `unknown`: a type that already carries (or will carry) a diagnostic.
    pub fn is_unresolved(self) -> bool {
        matches!(self, TypeRef::ERROR | TypeRef::UNKNOWN)
    }

    pub fn as_named(self) -> Option<SymbolId> {
        match self {
            TypeRef::Named(id) => Some(id),
            TypeRef::BuiltIn(_) => None,
        }
    }
}

// ============================================================================
// Symbol kinds
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
}

/// A user-declared type.
#[derive(Debug)]
pub struct NamedTypeSymbol {
    pub full_name: String,
    pub kind: TypeKind,
    /// Created once in the first declaration pass.
    pub members: ScopeId,
    /// Member symbols in declaration order, synthesized constructor last.
    pub member_order: Vec<SymbolId>,
}

#[derive(Debug)]
pub struct LocalSymbol {
    pub ty: TypeRef,
    pub slot: u32,
    /// Introduced by lowering rather than declared in source.
    pub synthesized: bool,
}

#[derive(Debug)]
pub struct ParameterSymbol {
    pub ty: TypeRef,
    pub ordinal: u32,
    pub slot: u32,
}

impl ParameterSymbol {
    /// The implicit receiver parameter.
    pub fn is_this(&self) -> bool {
        self.ordinal == 0
    }
}

#[derive(Debug)]
pub struct FieldSymbol {
    pub ty: TypeRef,
    pub containing_type: SymbolId,
    initializer: OnceCell<ExprRef>,
}

impl FieldSymbol {
    pub fn new(ty: TypeRef, containing_type: SymbolId) -> Self {
        Self {
            ty,
            containing_type,
            initializer: OnceCell::new(),
        }
    }

    pub fn initializer(&self) -> Option<&ExprRef> {
        self.initializer.get()
    }

    /// Stores the bound initializer.
    ///
    /// # Panics
    ///
    /// Panics if an initializer was already stored.
    pub fn set_initializer(&self, initializer: ExprRef) {
        if self.initializer.set(initializer).is_err() {
            panic!("field initializer bound twice");
        }
    }
}

bitflags! {
    /// Accessors declared on a property.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Accessors: u8 {
        const GET = 0b01;
        const SET = 0b10;
    }
}

#[derive(Debug)]
pub struct PropertySymbol {
    pub ty: TypeRef,
    pub containing_type: SymbolId,
    pub accessors: Accessors,
}

/// Shared shape of methods and constructors.
#[derive(Debug)]
pub struct CallableSymbol {
    pub return_type: TypeRef,
    /// Parameter symbols; index 0 is always `this`.
    pub params: Vec<SymbolId>,
    pub containing_type: SymbolId,
    /// Synthesized default constructor.
    pub synthesized: bool,
}

impl CallableSymbol {
    /// Parameter count including `this`.
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

#[derive(Debug)]
pub struct NativeFunctionSymbol {
    pub index: u16,
    pub return_type: TypeRef,
    pub param_types: Vec<TypeRef>,
}

#[derive(Debug)]
pub enum SymbolKind {
    BuiltInType(BuiltInType),
    NamedType(NamedTypeSymbol),
    Local(LocalSymbol),
    Parameter(ParameterSymbol),
    Field(FieldSymbol),
    Property(PropertySymbol),
    Method(CallableSymbol),
    Constructor(CallableSymbol),
    NativeFunction(NativeFunctionSymbol),
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::BuiltInType(_) | SymbolKind::NamedType(_) => "type",
            SymbolKind::Local(_) => "local",
            SymbolKind::Parameter(_) => "parameter",
            SymbolKind::Field(_) => "field",
            SymbolKind::Property(_) => "property",
            SymbolKind::Method(_) => "method",
            SymbolKind::Constructor(_) => "constructor",
            SymbolKind::NativeFunction(_) => "native function",
        }
    }
}

#[derive(Debug)]
pub struct Symbol {
    pub name: String,
    pub location: Option<SourceLocation>,
    pub kind: SymbolKind,
}

impl Symbol {
    pub fn is_type(&self) -> bool {
        matches!(self.kind, SymbolKind::BuiltInType(_) | SymbolKind::NamedType(_))
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.kind, SymbolKind::Method(_) | SymbolKind::Constructor(_))
    }

    pub fn as_callable(&self) -> Option<&CallableSymbol> {
        match &self.kind {
            SymbolKind::Method(c) | SymbolKind::Constructor(c) => Some(c),
            _ => None,
        }
    }

    /// Type of a variable-like symbol (local, parameter, field, property).
    pub fn variable_type(&self) -> Option<TypeRef> {
        match &self.kind {
            SymbolKind::Local(l) => Some(l.ty),
            SymbolKind::Parameter(p) => Some(p.ty),
            SymbolKind::Field(f) => Some(f.ty),
            SymbolKind::Property(p) => Some(p.ty),
            _ => None,
        }
    }

    /// Storage slot of a local or parameter.
    pub fn slot(&self) -> Option<u32> {
        match &self.kind {
            SymbolKind::Local(l) => Some(l.slot),
            SymbolKind::Parameter(p) => Some(p.slot),
            _ => None,
        }
    }
}

// ============================================================================
// SymbolTable
// ============================================================================

/// Arena owning every symbol of a package.
#[derive(Debug)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    builtins: Vec<SymbolId>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Creates a table pre-populated with the built-in type singletons.
    pub fn new() -> Self {
        let mut table = Self {
            symbols: Vec::new(),
            builtins: Vec::new(),
        };
        for builtin in BuiltInType::ALL {
            let id = table.add(Symbol {
                name: builtin.name().to_string(),
                location: None,
                kind: SymbolKind::BuiltInType(builtin),
            });
            table.builtins.push(id);
        }
        table
    }

    pub fn add(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.index()]
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (SymbolId(i as u32), s))
    }

    /// The singleton symbols of the built-in types, in [`BuiltInType::ALL`] order.
    pub fn builtin_symbols(&self) -> &[SymbolId] {
        &self.builtins
    }

    /// How a symbol may share a scope bucket with others.
    pub fn declarable(&self, id: SymbolId) -> Declarable {
        if self.get(id).is_callable() {
            Declarable::Overloadable(id)
        } else {
            Declarable::Unique(id)
        }
    }

    /// Converts a type symbol into a [`TypeRef`].
    pub fn as_type(&self, id: SymbolId) -> Option<TypeRef> {
        match &self.get(id).kind {
            SymbolKind::BuiltInType(b) => Some(TypeRef::BuiltIn(*b)),
            SymbolKind::NamedType(_) => Some(TypeRef::Named(id)),
            _ => None,
        }
    }

    // ==========================================================================
    // Typed accessors
    // ==========================================================================

    /// # Panics
    ///
    /// Panics if `id` is not a named type.
    pub fn named_type(&self, id: SymbolId) -> &NamedTypeSymbol {
        match &self.get(id).kind {
            SymbolKind::NamedType(t) => t,
            other => panic!("symbol {} is a {}, not a named type", id, other.as_str()),
        }
    }

    pub fn named_type_mut(&mut self, id: SymbolId) -> &mut NamedTypeSymbol {
        match &mut self.get_mut(id).kind {
            SymbolKind::NamedType(t) => t,
            other => panic!("symbol {} is a {}, not a named type", id, other.as_str()),
        }
    }

    /// # Panics
    ///
    /// Panics if `id` is not a method or constructor.
    pub fn callable(&self, id: SymbolId) -> &CallableSymbol {
        self.get(id)
            .as_callable()
            .unwrap_or_else(|| panic!("symbol {} is not callable", id))
    }

    pub fn callable_mut(&mut self, id: SymbolId) -> &mut CallableSymbol {
        match &mut self.get_mut(id).kind {
            SymbolKind::Method(c) | SymbolKind::Constructor(c) => c,
            other => panic!("symbol {} is a {}, not callable", id, other.as_str()),
        }
    }

    pub fn field(&self, id: SymbolId) -> &FieldSymbol {
        match &self.get(id).kind {
            SymbolKind::Field(f) => f,
            other => panic!("symbol {} is a {}, not a field", id, other.as_str()),
        }
    }

    pub fn parameter(&self, id: SymbolId) -> &ParameterSymbol {
        match &self.get(id).kind {
            SymbolKind::Parameter(p) => p,
            other => panic!("symbol {} is a {}, not a parameter", id, other.as_str()),
        }
    }

    pub fn native_function(&self, id: SymbolId) -> &NativeFunctionSymbol {
        match &self.get(id).kind {
            SymbolKind::NativeFunction(n) => n,
            other => panic!("symbol {} is a {}, not a native function", id, other.as_str()),
        }
    }

    // ==========================================================================
    // Names
    // ==========================================================================

    /// Name of a type as written by users.
    pub fn type_name(&self, ty: TypeRef) -> &str {
        match ty {
            TypeRef::BuiltIn(b) => b.name(),
            TypeRef::Named(id) => &self.get(id).name,
        }
    }

    /// Fully qualified name of a type (built-ins are their own qualified name).
    pub fn type_full_name(&self, ty: TypeRef) -> &str {
        match ty {
            TypeRef::BuiltIn(b) => b.name(),
            TypeRef::Named(id) => &self.named_type(id).full_name,
        }
    }

    /// `Type.Member` for diagnostics.
    pub fn display_name(&self, id: SymbolId) -> String {
        let symbol = self.get(id);
        let owner = match &symbol.kind {
            SymbolKind::Method(c) | SymbolKind::Constructor(c) => Some(c.containing_type),
            SymbolKind::Field(f) => Some(f.containing_type),
            SymbolKind::Property(p) => Some(p.containing_type),
            _ => None,
        };
        match (owner, &symbol.kind) {
            (Some(owner), SymbolKind::Constructor(_)) => self.get(owner).name.clone(),
            (Some(owner), _) => format!("{}.{}", self.get(owner).name, symbol.name),
            (None, _) => symbol.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_registered_first() {
        let table = SymbolTable::new();
        assert_eq!(table.len(), BuiltInType::ALL.len());
        for (id, builtin) in table.builtin_symbols().iter().zip(BuiltInType::ALL) {
            assert_eq!(table.as_type(*id), Some(TypeRef::BuiltIn(builtin)));
            assert_eq!(table.get(*id).name, builtin.name());
        }
    }

    #[test]
    fn unresolved_types() {
        assert!(TypeRef::ERROR.is_unresolved());
        assert!(TypeRef::UNKNOWN.is_unresolved());
        assert!(!TypeRef::NUMBER.is_unresolved());
    }

    #[test]
    fn field_initializer_is_write_once() {
        use crate::bound::BoundExpr;
        use vectra_core::SourceSpan;

        let field = FieldSymbol::new(TypeRef::NUMBER, SymbolId(0));
        assert!(field.initializer().is_none());

        field.set_initializer(BoundExpr::number(1.0, SourceSpan::default()));
        assert!(field.initializer().is_some());

        let second = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            field.set_initializer(BoundExpr::number(2.0, SourceSpan::default()))
        }));
        assert!(second.is_err());
    }
}
