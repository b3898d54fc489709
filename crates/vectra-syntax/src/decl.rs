//! Declaration nodes, from the package down to class members.
//!
//! ```text
//! SyntaxPackage
//! └── ModuleSource (metadata + files, in dependency order)
//!     └── SourceFile (path + root space)
//!         └── SpaceDecl (types + nested spaces)
//!             └── ClassDecl
//!                 └── MemberDecl (field | property | constructor | method)
//! ```

use std::fmt;
use std::sync::Arc;

use vectra_core::{ModuleMetadata, SourceSpan};

use crate::stmt::Block;
use crate::expr::Expr;

/// Identity of a declaration node, assigned by the parser.
///
/// Unique within one [`SyntaxPackage`]; the binder keys its node→symbol
/// map on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// All modules compiled together, topologically ordered (dependencies first).
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxPackage {
    pub name: String,
    pub modules: Vec<ModuleSource>,
}

impl SyntaxPackage {
    /// Finds the module owning a source file.
    pub fn module_of_file(&self, path: &str) -> Option<usize> {
        self.modules
            .iter()
            .position(|m| m.files.iter().any(|f| &*f.path == path))
    }
}

/// One module's metadata and parsed source files.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleSource {
    pub metadata: ModuleMetadata,
    pub files: Vec<SourceFile>,
}

/// A parsed source file. Its root is a space declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub path: Arc<str>,
    pub space: SpaceDecl,
}

/// A space: a namespace-like grouping of types.
///
/// Several files may declare the same space; they share one scope.
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceDecl {
    pub name: String,
    pub types: Vec<ClassDecl>,
    pub subspaces: Vec<SpaceDecl>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub id: NodeId,
    pub name: String,
    pub members: Vec<MemberDecl>,
    pub span: SourceSpan,
}

impl ClassDecl {
    pub fn has_constructor(&self) -> bool {
        self.members
            .iter()
            .any(|m| matches!(m, MemberDecl::Constructor(_)))
    }
}

/// A reference to a type by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName {
    pub name: String,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberDecl {
    Field(FieldDecl),
    Property(PropertyDecl),
    Constructor(ConstructorDecl),
    Method(MethodDecl),
}

impl MemberDecl {
    pub fn id(&self) -> NodeId {
        match self {
            MemberDecl::Field(d) => d.id,
            MemberDecl::Property(d) => d.id,
            MemberDecl::Constructor(d) => d.id,
            MemberDecl::Method(d) => d.id,
        }
    }

    pub fn span(&self) -> SourceSpan {
        match self {
            MemberDecl::Field(d) => d.span,
            MemberDecl::Property(d) => d.span,
            MemberDecl::Constructor(d) => d.span,
            MemberDecl::Method(d) => d.span,
        }
    }
}

/// `number x = 1;`
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub id: NodeId,
    pub name: String,
    pub ty: TypeName,
    pub initializer: Option<Expr>,
    pub span: SourceSpan,
}

/// `string Name { get; set; }`
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    pub id: NodeId,
    pub name: String,
    pub ty: TypeName,
    pub has_getter: bool,
    pub has_setter: bool,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorDecl {
    pub id: NodeId,
    pub params: Vec<Param>,
    pub body: Block,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub id: NodeId,
    pub name: String,
    pub return_type: TypeName,
    pub params: Vec<Param>,
    pub body: Block,
    pub span: SourceSpan,
}

/// A declared parameter. `this` is implicit and never appears here.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeName,
    pub span: SourceSpan,
}
