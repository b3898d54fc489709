//! Declaration binding (passes 1 and 2).
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Pass 1: declare_types                                        │
//! │   module → space (cached per parent) → NamedTypeSymbol       │
//! │   each type gets its member scope here, exactly once         │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Pass 2: declare_members                                      │
//! │   field / property / constructor / method symbols            │
//! │   default constructor for classes without one                │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Types of referenced modules are imported into the referencing module's
//! scope, so modules must arrive in dependency order.

use std::sync::Arc;

use petgraph::graph::NodeIndex;
use rustc_hash::FxHashMap;
use tracing::{debug_span, trace};
use vectra_core::{
    CancellationToken, Cancelled, DiagnosticBag, ErrorCode, SourceLocation, SourceSpan,
};
use vectra_syntax::{ClassDecl, MemberDecl, NodeId, Param, SpaceDecl, SyntaxPackage};

use crate::native::NativeFunctionRegistry;
use crate::scope::{Declarable, ScopeArena, ScopeId, ScopeKind};
use crate::space_tree::SpaceTree;
use crate::symbols::{
    Accessors, CallableSymbol, FieldSymbol, NamedTypeSymbol, ParameterSymbol, PropertySymbol,
    Symbol, SymbolId, SymbolKind, SymbolTable, TypeKind, TypeRef,
};

/// Name under which constructors are declared in a member scope.
pub const CONSTRUCTOR_NAME: &str = ".ctor";

/// A type declared in pass 1, with the syntax it came from.
#[derive(Debug, Clone, Copy)]
pub struct DeclaredType<'syn> {
    pub symbol: SymbolId,
    pub decl: &'syn ClassDecl,
    /// Index of the owning module in the package.
    pub module: usize,
}

/// Output of the declaration passes.
#[derive(Debug)]
pub struct Declarations<'syn> {
    pub symbols: SymbolTable,
    pub scopes: ScopeArena,
    pub spaces: SpaceTree,
    pub natives: NativeFunctionRegistry,
    pub package_scope: ScopeId,
    node_symbols: FxHashMap<NodeId, SymbolId>,
    types: Vec<DeclaredType<'syn>>,
}

impl<'syn> Declarations<'syn> {
    /// The symbol declared for a syntax node.
    pub fn symbol_for(&self, node: NodeId) -> Option<SymbolId> {
        self.node_symbols.get(&node).copied()
    }

    /// Declared types in declaration order.
    pub fn types(&self) -> &[DeclaredType<'syn>] {
        &self.types
    }

    /// Finds a type by fully qualified name.
    pub fn find_type(&self, full_name: &str) -> Option<SymbolId> {
        self.types
            .iter()
            .map(|t| t.symbol)
            .find(|&id| self.symbols.named_type(id).full_name == full_name)
    }
}

pub struct DeclarationBinder<'syn, 'd> {
    package: &'syn SyntaxPackage,
    decls: Declarations<'syn>,
    diagnostics: &'d mut DiagnosticBag,
    /// Types declared per module, for imports into referencing modules.
    module_types: Vec<Vec<SymbolId>>,
}

impl<'syn, 'd> DeclarationBinder<'syn, 'd> {
    /// Runs both declaration passes over a package.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn bind(
        package: &'syn SyntaxPackage,
        diagnostics: &'d mut DiagnosticBag,
        cancel: &CancellationToken,
    ) -> Result<Declarations<'syn>, Cancelled> {
        let mut binder = Self::new(package, diagnostics);
        binder.declare_types(cancel)?;
        binder.declare_members(cancel)?;
        Ok(binder.decls)
    }

    fn new(package: &'syn SyntaxPackage, diagnostics: &'d mut DiagnosticBag) -> Self {
        let mut symbols = SymbolTable::new();
        let mut scopes = ScopeArena::new();
        let package_scope = scopes.new_root(ScopeKind::Package);

        for &id in symbols.builtin_symbols() {
            let name = symbols.get(id).name.clone();
            let _ = scopes.try_declare(package_scope, &name, Declarable::Unique(id));
        }
        let natives = NativeFunctionRegistry::standard(&mut symbols, &mut scopes, package_scope);

        Self {
            package,
            decls: Declarations {
                symbols,
                scopes,
                spaces: SpaceTree::new(package_scope),
                natives,
                package_scope,
                node_symbols: FxHashMap::default(),
                types: Vec::new(),
            },
            diagnostics,
            module_types: Vec::new(),
        }
    }

    // ==========================================================================
    // Pass 1: types and spaces
    // ==========================================================================

    fn declare_types(&mut self, cancel: &CancellationToken) -> Result<(), Cancelled> {
        let package = self.package;
        for (module_index, module) in package.modules.iter().enumerate() {
            cancel.check()?;
            let _span = debug_span!("declare_types", module = %module.metadata.name).entered();

            let node = self
                .decls
                .spaces
                .get_or_create_module(&mut self.decls.scopes, &module.metadata.name);
            self.module_types.push(Vec::new());
            self.import_references(module_index, node);

            for file in &module.files {
                cancel.check()?;
                self.declare_space(node, &file.space, &file.path, module_index);
            }
        }
        Ok(())
    }

    /// Makes the types of referenced (already declared) modules visible by simple name.
    fn import_references(&mut self, module_index: usize, node: NodeIndex) {
        let package = self.package;
        let module = &package.modules[module_index];
        let scope = self.decls.spaces.scope(node);
        for reference in &module.metadata.references {
            let Some(referenced) = package.modules[..module_index]
                .iter()
                .position(|m| &m.metadata.name == reference)
            else {
                trace!(module = %module.metadata.name, %reference, "reference not compiled in this package");
                continue;
            };
            for &ty in &self.module_types[referenced] {
                let name = self.decls.symbols.get(ty).name.clone();
                if self
                    .decls
                    .scopes
                    .try_declare(scope, &name, Declarable::Unique(ty))
                    .is_err()
                {
                    let location = self.decls.symbols.get(ty).location.clone();
                    self.diagnostics.error(
                        ErrorCode::DuplicateSymbol,
                        location,
                        format!(
                            "Type '{}' imported from '{}' conflicts with another imported type",
                            name, reference
                        ),
                    );
                }
            }
        }
    }

    fn declare_space(
        &mut self,
        parent: NodeIndex,
        space: &'syn SpaceDecl,
        file: &Arc<str>,
        module: usize,
    ) {
        let node = if space.name.is_empty() {
            parent
        } else {
            self.decls
                .spaces
                .get_or_create_space(&mut self.decls.scopes, parent, &space.name)
        };

        for class in &space.types {
            self.declare_type(node, class, file, module);
        }
        for subspace in &space.subspaces {
            self.declare_space(node, subspace, file, module);
        }
    }

    fn declare_type(
        &mut self,
        node: NodeIndex,
        class: &'syn ClassDecl,
        file: &Arc<str>,
        module: usize,
    ) {
        let scope = self.decls.spaces.scope(node);
        let full_name = self.decls.spaces.qualified_name(node, &class.name);
        let location = SourceLocation::new(file.clone(), class.span);

        if !self.decls.scopes.lookup_local(scope, &class.name).is_empty() {
            self.diagnostics.error(
                ErrorCode::DuplicateSymbol,
                Some(location),
                format!("Type '{}' is already declared", full_name),
            );
            return;
        }

        let members = self.decls.scopes.new_child(scope, ScopeKind::Members);
        let id = self.decls.symbols.add(Symbol {
            name: class.name.clone(),
            location: Some(location),
            kind: SymbolKind::NamedType(NamedTypeSymbol {
                full_name,
                kind: TypeKind::Class,
                members,
                member_order: Vec::new(),
            }),
        });
        // Checked empty above.
        let _ = self
            .decls
            .scopes
            .try_declare(scope, &class.name, Declarable::Unique(id));

        trace!(name = %self.decls.symbols.named_type(id).full_name, "declared type");
        self.decls.node_symbols.insert(class.id, id);
        self.decls.types.push(DeclaredType {
            symbol: id,
            decl: class,
            module,
        });
        self.module_types[module].push(id);
    }

    // ==========================================================================
    // Pass 2: members
    // ==========================================================================

    fn declare_members(&mut self, cancel: &CancellationToken) -> Result<(), Cancelled> {
        for index in 0..self.decls.types.len() {
            cancel.check()?;
            let declared = self.decls.types[index];
            let owner = declared.symbol;
            let file = self.file_of(owner);
            let _span = debug_span!("declare_members", ty = %declared.decl.name).entered();

            for member in &declared.decl.members {
                self.declare_member(owner, member, &file);
            }

            if !declared.decl.has_constructor() {
                self.synthesize_default_constructor(owner, declared.decl.span, &file);
            }
        }
        Ok(())
    }

    fn file_of(&self, symbol: SymbolId) -> Arc<str> {
        self.decls
            .symbols
            .get(symbol)
            .location
            .as_ref()
            .map(|l| l.file.clone())
            .unwrap_or_else(|| Arc::from(""))
    }

    fn members_scope(&self, owner: SymbolId) -> ScopeId {
        self.decls.symbols.named_type(owner).members
    }

    fn resolve_type(&mut self, owner: SymbolId, name: &str, location: SourceLocation) -> TypeRef {
        let scope = self.members_scope(owner);
        self.decls.scopes.resolve_type(
            &self.decls.symbols,
            scope,
            name,
            Some(location),
            self.diagnostics,
        )
    }

    fn declare_member(&mut self, owner: SymbolId, member: &'syn MemberDecl, file: &Arc<str>) {
        let location = SourceLocation::new(file.clone(), member.span());
        let declared = match member {
            MemberDecl::Field(field) => {
                let ty = self.resolve_type(
                    owner,
                    &field.ty.name,
                    SourceLocation::new(file.clone(), field.ty.span),
                );
                let symbol = Symbol {
                    name: field.name.clone(),
                    location: Some(location),
                    kind: SymbolKind::Field(FieldSymbol::new(ty, owner)),
                };
                self.declare_unique(owner, symbol)
            }
            MemberDecl::Property(property) => {
                let ty = self.resolve_type(
                    owner,
                    &property.ty.name,
                    SourceLocation::new(file.clone(), property.ty.span),
                );
                let mut accessors = Accessors::empty();
                accessors.set(Accessors::GET, property.has_getter);
                accessors.set(Accessors::SET, property.has_setter);
                let symbol = Symbol {
                    name: property.name.clone(),
                    location: Some(location),
                    kind: SymbolKind::Property(PropertySymbol {
                        ty,
                        containing_type: owner,
                        accessors,
                    }),
                };
                self.declare_unique(owner, symbol)
            }
            MemberDecl::Constructor(ctor) => {
                let params = self.declare_parameters(owner, &ctor.params, file);
                let callable = CallableSymbol {
                    return_type: TypeRef::VOID,
                    params,
                    containing_type: owner,
                    synthesized: false,
                };
                self.declare_callable(
                    owner,
                    CONSTRUCTOR_NAME,
                    location,
                    SymbolKind::Constructor(callable),
                )
            }
            MemberDecl::Method(method) => {
                let return_type = self.resolve_type(
                    owner,
                    &method.return_type.name,
                    SourceLocation::new(file.clone(), method.return_type.span),
                );
                let params = self.declare_parameters(owner, &method.params, file);
                let callable = CallableSymbol {
                    return_type,
                    params,
                    containing_type: owner,
                    synthesized: false,
                };
                self.declare_callable(owner, &method.name, location, SymbolKind::Method(callable))
            }
        };

        if let Some(id) = declared {
            self.decls.node_symbols.insert(member.id(), id);
        }
    }

    fn declare_unique(&mut self, owner: SymbolId, symbol: Symbol) -> Option<SymbolId> {
        let scope = self.members_scope(owner);
        if !self.decls.scopes.lookup_local(scope, &symbol.name).is_empty() {
            self.report_duplicate_member(owner, &symbol.name, symbol.location);
            return None;
        }
        let name = symbol.name.clone();
        let id = self.decls.symbols.add(symbol);
        let _ = self
            .decls
            .scopes
            .try_declare(scope, &name, Declarable::Unique(id));
        self.decls.symbols.named_type_mut(owner).member_order.push(id);
        Some(id)
    }

    /// Declares a method or constructor, keyed by `(name, arity)`.
    fn declare_callable(
        &mut self,
        owner: SymbolId,
        name: &str,
        location: SourceLocation,
        kind: SymbolKind,
    ) -> Option<SymbolId> {
        let scope = self.members_scope(owner);
        let arity = match &kind {
            SymbolKind::Method(c) | SymbolKind::Constructor(c) => c.arity(),
            _ => unreachable!("declare_callable called with a non-callable"),
        };

        let conflicts = self
            .decls
            .scopes
            .lookup_local(scope, name)
            .iter()
            .any(|&existing| match self.decls.symbols.get(existing).as_callable() {
                Some(other) => other.arity() == arity,
                None => true,
            });
        if conflicts {
            self.report_duplicate_member(owner, name, Some(location));
            return None;
        }

        let id = self.decls.symbols.add(Symbol {
            name: name.to_string(),
            location: Some(location),
            kind,
        });
        let _ = self
            .decls
            .scopes
            .try_declare(scope, name, Declarable::Overloadable(id));
        self.decls.symbols.named_type_mut(owner).member_order.push(id);
        trace!(member = %self.decls.symbols.display_name(id), arity, "declared callable");
        Some(id)
    }

    fn report_duplicate_member(
        &mut self,
        owner: SymbolId,
        name: &str,
        location: Option<SourceLocation>,
    ) {
        let type_name = self.decls.symbols.get(owner).name.clone();
        let shown = if name == CONSTRUCTOR_NAME {
            format!("Constructor of '{}'", type_name)
        } else {
            format!("Member '{}.{}'", type_name, name)
        };
        self.diagnostics.error(
            ErrorCode::DuplicateSymbol,
            location,
            format!("{} is already declared with the same signature", shown),
        );
    }

    /// Creates `this` (ordinal and slot 0) followed by the declared parameters.
    fn declare_parameters(
        &mut self,
        owner: SymbolId,
        params: &'syn [Param],
        file: &Arc<str>,
    ) -> Vec<SymbolId> {
        let mut ids = vec![self.this_parameter(owner)];
        let mut seen: Vec<&str> = Vec::with_capacity(params.len());

        for param in params {
            let location = SourceLocation::new(file.clone(), param.span);
            if param.name == "this" || seen.contains(&param.name.as_str()) {
                self.diagnostics.error(
                    ErrorCode::DuplicateSymbol,
                    Some(location),
                    format!("Parameter '{}' is already declared", param.name),
                );
                continue;
            }
            seen.push(&param.name);

            let ty = self.resolve_type(
                owner,
                &param.ty.name,
                SourceLocation::new(file.clone(), param.ty.span),
            );
            let ordinal = ids.len() as u32;
            ids.push(self.decls.symbols.add(Symbol {
                name: param.name.clone(),
                location: Some(location),
                kind: SymbolKind::Parameter(ParameterSymbol {
                    ty,
                    ordinal,
                    slot: ordinal,
                }),
            }));
        }
        ids
    }

    fn this_parameter(&mut self, owner: SymbolId) -> SymbolId {
        self.decls.symbols.add(Symbol {
            name: "this".to_string(),
            location: None,
            kind: SymbolKind::Parameter(ParameterSymbol {
                ty: TypeRef::Named(owner),
                ordinal: 0,
                slot: 0,
            }),
        })
    }

    fn synthesize_default_constructor(&mut self, owner: SymbolId, span: SourceSpan, file: &Arc<str>) {
        let this = self.this_parameter(owner);
        let callable = CallableSymbol {
            return_type: TypeRef::VOID,
            params: vec![this],
            containing_type: owner,
            synthesized: true,
        };
        self.declare_callable(
            owner,
            CONSTRUCTOR_NAME,
            SourceLocation::new(file.clone(), span),
            SymbolKind::Constructor(callable),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vectra_core::{ModuleKind, ModuleMetadata, Phase};
    use vectra_syntax::SyntaxBuilder;

    fn bind(package: &SyntaxPackage) -> (Declarations<'_>, DiagnosticBag) {
        let mut diagnostics = DiagnosticBag::new(Phase::Bind);
        let decls = DeclarationBinder::bind(package, &mut diagnostics, &CancellationToken::new())
            .expect("not cancelled");
        (decls, diagnostics)
    }

    fn constructors(decls: &Declarations<'_>, ty: SymbolId) -> Vec<SymbolId> {
        let members = decls.symbols.named_type(ty).members;
        decls.scopes.lookup_local(members, CONSTRUCTOR_NAME).to_vec()
    }

    #[test]
    fn class_without_constructor_gets_default() {
        let b = SyntaxBuilder::new();
        let package = b.program(vec![b.class("Program", vec![b.field("x", "number", None)])]);
        let (decls, diagnostics) = bind(&package);

        assert!(!diagnostics.has_errors());
        let program = decls.find_type("App.Program").unwrap();
        let ctors = constructors(&decls, program);
        assert_eq!(ctors.len(), 1);

        let ctor = decls.symbols.callable(ctors[0]);
        assert!(ctor.synthesized);
        assert_eq!(ctor.arity(), 1);
        assert_eq!(decls.symbols.get(ctor.params[0]).name, "this");
    }

    #[test]
    fn explicit_constructor_suppresses_default() {
        let b = SyntaxBuilder::new();
        let package = b.program(vec![b.class(
            "Point",
            vec![b.constructor(vec![b.param("x", "number")], vec![])],
        )]);
        let (decls, _) = bind(&package);

        let point = decls.find_type("App.Point").unwrap();
        let ctors = constructors(&decls, point);
        assert_eq!(ctors.len(), 1);
        assert!(!decls.symbols.callable(ctors[0]).synthesized);
        assert_eq!(decls.symbols.callable(ctors[0]).arity(), 2);
    }

    #[test]
    fn member_symbols_and_node_map() {
        let b = SyntaxBuilder::new();
        let class = b.class(
            "Program",
            vec![
                b.field("x", "number", None),
                b.method("Main", "void", vec![b.param("args", "string")], vec![]),
            ],
        );
        let main_id = class.members[1].id();
        let class_id = class.id;
        let package = b.program(vec![class]);
        let (decls, diagnostics) = bind(&package);

        assert!(!diagnostics.has_errors());
        let program = decls.symbol_for(class_id).unwrap();
        let main = decls.symbol_for(main_id).unwrap();
        assert_eq!(decls.symbols.get(main).name, "Main");

        let params: Vec<_> = decls
            .symbols
            .callable(main)
            .params
            .iter()
            .map(|&p| {
                let param = decls.symbols.parameter(p);
                (decls.symbols.get(p).name.clone(), param.ordinal, param.slot)
            })
            .collect();
        assert_eq!(
            params,
            vec![("this".to_string(), 0, 0), ("args".to_string(), 1, 1)]
        );
        assert_eq!(
            decls.symbols.parameter(decls.symbols.callable(main).params[0]).ty,
            TypeRef::Named(program)
        );
    }

    #[test]
    fn duplicate_type_is_reported() {
        let b = SyntaxBuilder::new();
        let package = b.program(vec![b.class("A", vec![]), b.class("A", vec![])]);
        let (decls, diagnostics) = bind(&package);

        assert_eq!(diagnostics.with_code(ErrorCode::DuplicateSymbol).count(), 1);
        assert_eq!(decls.types().len(), 1);
    }

    #[test]
    fn overloads_by_arity() {
        let b = SyntaxBuilder::new();
        let package = b.program(vec![b.class(
            "Calc",
            vec![
                b.method("Add", "number", vec![b.param("a", "number")], vec![]),
                b.method(
                    "Add",
                    "number",
                    vec![b.param("a", "number"), b.param("b", "number")],
                    vec![],
                ),
                b.method("Add", "number", vec![b.param("c", "string")], vec![]),
            ],
        )]);
        let (decls, diagnostics) = bind(&package);

        let calc = decls.find_type("App.Calc").unwrap();
        let members = decls.symbols.named_type(calc).members;
        assert_eq!(decls.scopes.lookup_local(members, "Add").len(), 2);
        assert_eq!(diagnostics.with_code(ErrorCode::DuplicateSymbol).count(), 1);
    }

    #[test]
    fn field_and_method_name_conflict() {
        let b = SyntaxBuilder::new();
        let package = b.program(vec![b.class(
            "Thing",
            vec![
                b.field("Size", "number", None),
                b.method("Size", "number", vec![], vec![]),
                b.property("Size", "number", true, false),
            ],
        )]);
        let (_, diagnostics) = bind(&package);
        assert_eq!(diagnostics.with_code(ErrorCode::DuplicateSymbol).count(), 2);
    }

    #[test]
    fn this_parameter_name_is_rejected() {
        let b = SyntaxBuilder::new();
        let package = b.program(vec![b.class(
            "Thing",
            vec![b.method("Run", "void", vec![b.param("this", "number")], vec![])],
        )]);
        let (_, diagnostics) = bind(&package);
        assert_eq!(diagnostics.with_code(ErrorCode::DuplicateSymbol).count(), 1);
    }

    #[test]
    fn unknown_member_type_is_reported() {
        let b = SyntaxBuilder::new();
        let package = b.program(vec![b.class("Thing", vec![b.field("x", "Missing", None)])]);
        let (decls, diagnostics) = bind(&package);

        assert_eq!(diagnostics.with_code(ErrorCode::TypeNotFound).count(), 1);
        let thing = decls.find_type("App.Thing").unwrap();
        let members = decls.symbols.named_type(thing).members;
        let field = decls.scopes.lookup_local(members, "x")[0];
        assert_eq!(decls.symbols.field(field).ty, TypeRef::ERROR);
    }

    #[test]
    fn files_share_space_scope() {
        let b = SyntaxBuilder::new();
        let metadata = ModuleMetadata::new("App", ModuleKind::Executable, "app");
        let package = b.package(
            "App",
            vec![b.module(
                metadata,
                vec![
                    b.file("a.vec", b.space("Game", vec![b.class("Player", vec![])], vec![])),
                    b.file(
                        "b.vec",
                        b.space(
                            "Game",
                            vec![b.class("World", vec![b.field("hero", "Player", None)])],
                            vec![],
                        ),
                    ),
                ],
            )],
        );
        let (decls, diagnostics) = bind(&package);

        assert!(!diagnostics.has_errors());
        assert!(decls.find_type("Game.Player").is_some());
        assert!(decls.find_type("Game.World").is_some());
    }

    #[test]
    fn referenced_module_types_are_visible() {
        let b = SyntaxBuilder::new();
        let lib = b.module(
            ModuleMetadata::new("Lib", ModuleKind::Library, "lib"),
            vec![b.file("lib.vec", b.space("Lib", vec![b.class("Util", vec![])], vec![]))],
        );
        let app = b.module(
            ModuleMetadata::new("App", ModuleKind::Executable, "app").with_reference("Lib"),
            vec![b.file(
                "app.vec",
                b.space(
                    "App",
                    vec![b.class("Program", vec![b.field("util", "Util", None)])],
                    vec![],
                ),
            )],
        );
        let package = b.package("Pkg", vec![lib, app]);
        let (decls, diagnostics) = bind(&package);

        assert!(!diagnostics.has_errors(), "{}", diagnostics);
        let util = decls.find_type("Lib.Util").unwrap();
        let program = decls.find_type("App.Program").unwrap();
        let members = decls.symbols.named_type(program).members;
        let field = decls.scopes.lookup_local(members, "util")[0];
        assert_eq!(decls.symbols.field(field).ty, TypeRef::Named(util));
    }

    #[test]
    fn cancellation_stops_binding() {
        let b = SyntaxBuilder::new();
        let package = b.program(vec![b.class("Program", vec![])]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut diagnostics = DiagnosticBag::new(Phase::Bind);
        let result = DeclarationBinder::bind(&package, &mut diagnostics, &cancel);
        assert!(matches!(result, Err(Cancelled)));
    }
}
