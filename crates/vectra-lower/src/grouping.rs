//! Partitioning of types and lowered bodies back into their modules.

use thiserror::Error;
use vectra_binder::{BoundBody, Declarations, SymbolId};
use vectra_core::ModuleMetadata;
use vectra_syntax::SyntaxPackage;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupingError {
    #[error("cannot resolve module for type '{name}' declared in '{file}'")]
    UnknownTypeSource { name: String, file: String },

    #[error("cannot resolve module for the body of '{name}' in '{file}'")]
    UnknownBodySource { name: String, file: String },
}

/// Everything emitted for one module.
#[derive(Debug, Clone)]
pub struct ModuleUnit {
    pub metadata: ModuleMetadata,
    /// Named types in declaration order.
    pub types: Vec<SymbolId>,
    pub bodies: Vec<BoundBody>,
}

/// Groups types and bodies by the module owning their source file.
///
/// Returns one unit per module of the package, in package order, including
/// modules that declare nothing.
pub fn group_modules(
    package: &SyntaxPackage,
    declarations: &Declarations<'_>,
    bodies: Vec<BoundBody>,
) -> Result<Vec<ModuleUnit>, GroupingError> {
    let mut units: Vec<ModuleUnit> = package
        .modules
        .iter()
        .map(|m| ModuleUnit {
            metadata: m.metadata.clone(),
            types: Vec::new(),
            bodies: Vec::new(),
        })
        .collect();

    let symbols = &declarations.symbols;
    for declared in declarations.types() {
        let symbol = symbols.get(declared.symbol);
        let file = symbol.location.as_ref().map(|l| &*l.file).unwrap_or("");
        let Some(module) = package.module_of_file(file) else {
            return Err(GroupingError::UnknownTypeSource {
                name: symbols.named_type(declared.symbol).full_name.clone(),
                file: file.to_string(),
            });
        };
        units[module].types.push(declared.symbol);
    }

    for body in bodies {
        let Some(module) = package.module_of_file(&body.file) else {
            return Err(GroupingError::UnknownBodySource {
                name: symbols.display_name(body.callable),
                file: body.file.to_string(),
            });
        };
        units[module].bodies.push(body);
    }

    Ok(units)
}
