//! Vectra
//!
//! The semantic backend of the Vectra compiler: it takes a parsed
//! [`SyntaxPackage`] and produces verified, lowered bytecode modules.
//!
//! ```text
//! SyntaxPackage
//!     │
//!     ▼
//! bind ──────► symbols + bound bodies        (vectra-binder)
//!     │
//!     ▼
//! analyze ───► warnings / errors             (vectra-analysis)
//!     │
//!     ▼
//! lower ─────► `new` decomposed, per module  (vectra-lower)
//!     │
//!     ▼
//! emit ──────► VBC / VDL / VDI / VDS         (vectra-emit)
//! ```
//!
//! Lexing, parsing, package metadata and dependency ordering happen before
//! this crate; reporting diagnostics to users happens after it.
//!
//! # Example
//!
//! ```
//! use vectra::{CancellationToken, Compiler, CompilerOptions, SyntaxBuilder};
//!
//! let b = SyntaxBuilder::new();
//! let package = b.program(vec![b.class(
//!     "Program",
//!     vec![b.method(
//!         "Main",
//!         "void",
//!         vec![],
//!         vec![b.expr_stmt(b.call(b.ident("PrintLine"), vec![b.string("hello")]))],
//!     )],
//! )]);
//!
//! let compiler = Compiler::new(CompilerOptions::default().with_write_artifacts(false));
//! let output = compiler.compile(&package, &CancellationToken::new()).unwrap();
//! assert!(output.succeeded());
//! assert_eq!(output.modules[0].artifacts[0].file_name, "App.vbc");
//! ```

mod options;
mod pipeline;

pub use options::CompilerOptions;
pub use pipeline::{CompileError, CompileOutput, Compiler, ModuleOutput};

pub use vectra_binder::OverloadResolution;
pub use vectra_core::{
    BuildConfiguration, CancellationToken, Cancelled, Diagnostic, ErrorCode, ModuleKind,
    ModuleMetadata, Phase, Severity, SourceLocation, SourceSpan,
};
pub use vectra_emit::{Artifact, ContainerKind};
pub use vectra_syntax::{SyntaxBuilder, SyntaxPackage};

pub use vectra_analysis as analysis;
pub use vectra_binder as binder;
pub use vectra_emit as emit;
pub use vectra_lower as lower;
pub use vectra_syntax as syntax;
