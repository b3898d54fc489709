//! Host-provided intrinsic functions.

use crate::scope::{Declarable, ScopeArena, ScopeId};
use crate::symbols::{NativeFunctionSymbol, Symbol, SymbolId, SymbolKind, SymbolTable, TypeRef};

/// `(name, native index, return type, parameter types)`
const STANDARD_NATIVES: &[(&str, u16, TypeRef, &[TypeRef])] = &[
    ("Print", 0, TypeRef::VOID, &[TypeRef::STRING]),
    ("PrintLine", 1, TypeRef::VOID, &[TypeRef::STRING]),
    ("Read", 2, TypeRef::STRING, &[]),
    ("ReadLine", 3, TypeRef::STRING, &[]),
    ("ReadInt", 4, TypeRef::NUMBER, &[]),
];

/// The native functions known to the compiler.
#[derive(Debug, Clone, Default)]
pub struct NativeFunctionRegistry {
    functions: Vec<SymbolId>,
}

impl NativeFunctionRegistry {
    /// Creates symbols for the standard intrinsics and declares them in `scope`.
    pub fn standard(symbols: &mut SymbolTable, scopes: &mut ScopeArena, scope: ScopeId) -> Self {
        let mut functions = Vec::with_capacity(STANDARD_NATIVES.len());
        for &(name, index, return_type, params) in STANDARD_NATIVES {
            let id = symbols.add(Symbol {
                name: name.to_string(),
                location: None,
                kind: SymbolKind::NativeFunction(NativeFunctionSymbol {
                    index,
                    return_type,
                    param_types: params.to_vec(),
                }),
            });
            // The package scope is fresh; built-in names never collide with these.
            let _ = scopes.try_declare(scope, name, Declarable::Unique(id));
            functions.push(id);
        }
        Self { functions }
    }

    pub fn functions(&self) -> &[SymbolId] {
        &self.functions
    }

    pub fn find(&self, symbols: &SymbolTable, name: &str) -> Option<SymbolId> {
        self.functions
            .iter()
            .copied()
            .find(|&id| symbols.get(id).name == name)
    }
}
