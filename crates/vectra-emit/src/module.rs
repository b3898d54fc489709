//! Module emission.
//!
//! The module's pool is populated with every type and member before any
//! body is emitted, so a body referring to a member declared later in the
//! module still finds an index that was handed out up front.

use tracing::{debug, debug_span};
use vectra_binder::{SymbolId, SymbolKind, SymbolTable};
use vectra_core::{CancellationToken, ModuleMetadata, SourceSpan};
use vectra_lower::ModuleUnit;

use crate::{ConstantPool, EmitError, EmittedBody, MethodBodyEmitter};

/// Type table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEntry {
    pub type_index: u16,
    /// Member pool indices in declaration order.
    pub members: Vec<u16>,
}

/// A public method as listed in the interface container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceMethod {
    pub name: String,
    pub return_type: String,
    /// `(name, type name)` pairs, `this` first.
    pub params: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceType {
    pub name: String,
    pub methods: Vec<InterfaceMethod>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugParameter {
    pub name: String,
    pub slot: u32,
    pub span: Option<SourceSpan>,
}

/// Debug record of one emitted callable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugCallable {
    /// `Space.Type.Member`
    pub name: String,
    pub file: String,
    pub span: Option<SourceSpan>,
    pub params: Vec<DebugParameter>,
}

/// Everything the container writers need for one module.
#[derive(Debug, Clone)]
pub struct EmittedModule {
    pub metadata: ModuleMetadata,
    pub pool: ConstantPool,
    pub types: Vec<TypeEntry>,
    pub bodies: Vec<EmittedBody>,
    pub interface: Vec<InterfaceType>,
    pub debug: Vec<DebugCallable>,
}

pub struct ModuleEmitter<'a> {
    symbols: &'a SymbolTable,
    pool: ConstantPool,
}

impl<'a> ModuleEmitter<'a> {
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Self {
            symbols,
            pool: ConstantPool::new(),
        }
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn emit(
        mut self,
        unit: &ModuleUnit,
        cancel: &CancellationToken,
    ) -> Result<EmittedModule, EmitError> {
        let _span = debug_span!("emit_module", module = %unit.metadata.name).entered();

        let types = self.populate_pool(&unit.types)?;

        let mut bodies = Vec::with_capacity(unit.bodies.len());
        for body in &unit.bodies {
            cancel.check()?;
            bodies.push(MethodBodyEmitter::new(self.symbols, &mut self.pool).emit_body(body)?);
        }

        let interface = unit.types.iter().map(|&ty| self.interface_type(ty)).collect();
        let debug = unit
            .bodies
            .iter()
            .map(|body| self.debug_callable(body.callable, &body.file))
            .collect();

        debug!(
            types = types.len(),
            bodies = bodies.len(),
            constants = self.pool.len(),
            "module emitted"
        );
        Ok(EmittedModule {
            metadata: unit.metadata.clone(),
            pool: self.pool,
            types,
            bodies,
            interface,
            debug,
        })
    }

    fn populate_pool(&mut self, types: &[SymbolId]) -> Result<Vec<TypeEntry>, EmitError> {
        let symbols = self.symbols;
        let mut entries = Vec::with_capacity(types.len());
        for &ty in types {
            let type_index = self.pool.add_symbol(symbols, ty)?;
            let members = symbols
                .named_type(ty)
                .member_order
                .iter()
                .map(|&member| self.pool.add_symbol(symbols, member))
                .collect::<Result<Vec<_>, _>>()?;
            entries.push(TypeEntry {
                type_index,
                members,
            });
        }
        Ok(entries)
    }

    fn interface_type(&self, ty: SymbolId) -> InterfaceType {
        let symbols = self.symbols;
        let named = symbols.named_type(ty);
        let methods = named
            .member_order
            .iter()
            .filter_map(|&member| match &symbols.get(member).kind {
                SymbolKind::Method(method) => Some(InterfaceMethod {
                    name: symbols.get(member).name.clone(),
                    return_type: symbols.type_name(method.return_type).to_string(),
                    params: method
                        .params
                        .iter()
                        .map(|&p| {
                            (
                                symbols.get(p).name.clone(),
                                symbols.type_name(symbols.parameter(p).ty).to_string(),
                            )
                        })
                        .collect(),
                }),
                _ => None,
            })
            .collect();

        InterfaceType {
            name: named.full_name.clone(),
            methods,
        }
    }

    fn debug_callable(&self, callable: SymbolId, file: &str) -> DebugCallable {
        let symbols = self.symbols;
        let symbol = symbols.get(callable);
        let owner = symbol
            .as_callable()
            .map(|c| symbols.named_type(c.containing_type).full_name.as_str())
            .unwrap_or_default();
        let params = symbol
            .as_callable()
            .map(|c| c.params.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&p| {
                let param = symbols.get(p);
                DebugParameter {
                    name: param.name.clone(),
                    slot: symbols.parameter(p).slot,
                    span: param.location.as_ref().map(|l| l.span),
                }
            })
            .collect();

        DebugCallable {
            name: format!("{}.{}", owner, symbol.name),
            file: symbol
                .location
                .as_ref()
                .map_or(file, |l| &*l.file)
                .to_string(),
            span: symbol.location.as_ref().map(|l| l.span),
            params,
        }
    }
}
