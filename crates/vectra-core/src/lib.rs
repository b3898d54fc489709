//! Vectra Core
//!
//! Shared types used by every stage of the Vectra backend.
//!
//! ## Modules
//!
//! - [`span`]: Source spans and locations
//! - [`diagnostics`]: Coded diagnostics and the per-phase diagnostic bag
//! - [`error_code`]: Stable diagnostic codes
//! - [`phase`]: Pipeline phases
//! - [`cancel`]: Cooperative cancellation
//! - [`module`]: Module metadata supplied by the package stage

pub mod cancel;
pub mod diagnostics;
pub mod error_code;
pub mod module;
pub mod phase;
pub mod span;

pub use cancel::{CancellationToken, Cancelled};
pub use diagnostics::{Diagnostic, DiagnosticBag, Severity};
pub use error_code::ErrorCode;
pub use module::{BuildConfiguration, ModuleKind, ModuleMetadata};
pub use phase::Phase;
pub use span::{SourceLocation, SourceSpan};
