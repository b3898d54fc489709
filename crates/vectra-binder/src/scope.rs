//! Lexical scopes.
//!
//! A [`Scope`] maps names to small ordered lists of symbols. Only methods
//! and constructors may share a name; every other symbol needs an empty
//! bucket. Lookup walks parent links and returns the first non-empty
//! bucket, so an inner scope hides every outer candidate of the same name.
//!
//! Declaration scopes (package, module, space, type members) live in a
//! [`ScopeArena`]. Local scopes of a callable are plain [`Scope`] frames
//! owned by the body binder and chained under the callable's member scope.

use rustc_hash::FxHashMap;
use thiserror::Error;
use vectra_core::{DiagnosticBag, ErrorCode, SourceLocation};

use crate::symbols::{SymbolId, SymbolTable, TypeRef};

/// Index of a scope in the [`ScopeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

/// A symbol together with its overload class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declarable {
    /// Methods and constructors: appended to the bucket.
    Overloadable(SymbolId),
    /// Everything else: needs an empty bucket.
    Unique(SymbolId),
}

impl Declarable {
    pub fn symbol(self) -> SymbolId {
        match self {
            Declarable::Overloadable(id) | Declarable::Unique(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclareError {
    #[error("'{name}' is already declared in this scope")]
    AlreadyDeclared { name: String, existing: SymbolId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Package,
    Module,
    Space,
    Members,
    Local,
}

/// A single name → symbols map.
#[derive(Debug, Clone)]
pub struct Scope {
    kind: ScopeKind,
    entries: FxHashMap<String, Vec<SymbolId>>,
}

impl Scope {
    pub fn new(kind: ScopeKind) -> Self {
        Self {
            kind,
            entries: FxHashMap::default(),
        }
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    /// Declares a symbol in this scope.
    pub fn try_declare(&mut self, name: &str, declarable: Declarable) -> Result<(), DeclareError> {
        let bucket = self.entries.entry(name.to_string()).or_default();
        match declarable {
            Declarable::Overloadable(id) => {
                bucket.push(id);
                Ok(())
            }
            Declarable::Unique(id) => match bucket.first() {
                Some(&existing) => Err(DeclareError::AlreadyDeclared {
                    name: name.to_string(),
                    existing,
                }),
                None => {
                    bucket.push(id);
                    Ok(())
                }
            },
        }
    }

    /// Symbols declared under `name` in this scope only.
    pub fn get(&self, name: &str) -> &[SymbolId] {
        self.entries.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug)]
struct ScopeNode {
    parent: Option<ScopeId>,
    scope: Scope,
}

/// Arena of the declaration scopes of a package.
#[derive(Debug, Default)]
pub struct ScopeArena {
    nodes: Vec<ScopeNode>,
}

impl ScopeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parentless scope.
    pub fn new_root(&mut self, kind: ScopeKind) -> ScopeId {
        self.push(None, kind)
    }

    pub fn new_child(&mut self, parent: ScopeId, kind: ScopeKind) -> ScopeId {
        self.push(Some(parent), kind)
    }

    fn push(&mut self, parent: Option<ScopeId>, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.nodes.len() as u32);
        self.nodes.push(ScopeNode {
            parent,
            scope: Scope::new(kind),
        });
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.nodes[scope.0 as usize].parent
    }

    pub fn scope(&self, scope: ScopeId) -> &Scope {
        &self.nodes[scope.0 as usize].scope
    }

    pub fn try_declare(
        &mut self,
        scope: ScopeId,
        name: &str,
        declarable: Declarable,
    ) -> Result<(), DeclareError> {
        self.nodes[scope.0 as usize]
            .scope
            .try_declare(name, declarable)
    }

    /// Symbols declared under `name` in `scope` itself, without walking parents.
    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> &[SymbolId] {
        self.scope(scope).get(name)
    }

    /// Walks from `scope` toward the root and returns the first non-empty bucket.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> &[SymbolId] {
        let mut current = Some(scope);
        while let Some(id) = current {
            let found = self.lookup_local(id, name);
            if !found.is_empty() {
                return found;
            }
            current = self.parent(id);
        }
        &[]
    }

    /// Resolves a type name visible from `scope`.
    ///
    /// Never fails: reports `TypeNotFound` and returns the `error` type when
    /// the first bucket found holds no type.
    pub fn resolve_type(
        &self,
        symbols: &SymbolTable,
        scope: ScopeId,
        name: &str,
        location: Option<SourceLocation>,
        diagnostics: &mut DiagnosticBag,
    ) -> TypeRef {
        let found = self
            .lookup(scope, name)
            .iter()
            .find_map(|&id| symbols.as_type(id));
        match found {
            Some(ty) => ty,
            None => {
                diagnostics.error(
                    ErrorCode::TypeNotFound,
                    location,
                    format!("Type '{}' could not be found", name),
                );
                TypeRef::ERROR
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{BuiltInType, Symbol, SymbolKind};
    use vectra_core::Phase;

    fn local(table: &mut SymbolTable, name: &str) -> SymbolId {
        table.add(Symbol {
            name: name.to_string(),
            location: None,
            kind: SymbolKind::BuiltInType(BuiltInType::Unknown),
        })
    }

    #[test]
    fn unique_rejects_second_declaration() {
        let mut table = SymbolTable::new();
        let a = local(&mut table, "x");
        let b = local(&mut table, "x");
        let mut scope = Scope::new(ScopeKind::Local);

        assert_eq!(scope.try_declare("x", Declarable::Unique(a)), Ok(()));
        assert_eq!(
            scope.try_declare("x", Declarable::Unique(b)),
            Err(DeclareError::AlreadyDeclared {
                name: "x".to_string(),
                existing: a
            })
        );
        assert_eq!(scope.get("x"), &[a]);
    }

    #[test]
    fn overloadable_appends() {
        let mut table = SymbolTable::new();
        let a = local(&mut table, "Run");
        let b = local(&mut table, "Run");
        let mut scope = Scope::new(ScopeKind::Members);

        scope.try_declare("Run", Declarable::Overloadable(a)).unwrap();
        scope.try_declare("Run", Declarable::Overloadable(b)).unwrap();
        assert_eq!(scope.get("Run"), &[a, b]);
    }

    #[test]
    fn inner_scope_shadows_outer_entirely() {
        let mut table = SymbolTable::new();
        let outer_a = local(&mut table, "f");
        let outer_b = local(&mut table, "f");
        let inner = local(&mut table, "f");

        let mut arena = ScopeArena::new();
        let root = arena.new_root(ScopeKind::Package);
        let child = arena.new_child(root, ScopeKind::Space);
        arena.try_declare(root, "f", Declarable::Overloadable(outer_a)).unwrap();
        arena.try_declare(root, "f", Declarable::Overloadable(outer_b)).unwrap();

        assert_eq!(arena.lookup(child, "f"), &[outer_a, outer_b]);

        arena.try_declare(child, "f", Declarable::Unique(inner)).unwrap();
        assert_eq!(arena.lookup(child, "f"), &[inner]);
        assert_eq!(arena.lookup(child, "missing"), &[] as &[SymbolId]);
    }

    #[test]
    fn resolve_type_reports_and_recovers() {
        let table = SymbolTable::new();
        let mut arena = ScopeArena::new();
        let root = arena.new_root(ScopeKind::Package);
        let number = table.builtin_symbols()[2];
        arena.try_declare(root, "number", Declarable::Unique(number)).unwrap();

        let mut diagnostics = DiagnosticBag::new(Phase::Bind);
        assert_eq!(
            arena.resolve_type(&table, root, "number", None, &mut diagnostics),
            TypeRef::NUMBER
        );
        assert!(!diagnostics.has_errors());

        assert_eq!(
            arena.resolve_type(&table, root, "Missing", None, &mut diagnostics),
            TypeRef::ERROR
        );
        assert_eq!(diagnostics.with_code(ErrorCode::TypeNotFound).count(), 1);
    }
}
