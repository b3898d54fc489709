//! Vectra Lower
//!
//! Rewrites bound bodies into the simpler shape the emitter expects, then
//! groups them back into modules.
//!
//! ```text
//! BoundBody ──► inject field initializers ──► decompose `new` ──► ModuleUnit
//!                (constructors only)           (temporaries)       (by file)
//! ```
//!
//! ## Modules
//!
//! - [`rewriter`]: The [`BoundTreeRewriter`] trait and its default walks
//! - [`construction`]: Object construction decomposition
//! - [`initializers`]: Field initializer injection
//! - [`lowering`]: The per-body driver
//! - [`grouping`]: Partitioning into [`ModuleUnit`]s

pub mod construction;
pub mod grouping;
pub mod initializers;
pub mod lowering;
pub mod rewriter;

pub use construction::ObjectConstructionLowering;
pub use grouping::{GroupingError, ModuleUnit, group_modules};
pub use initializers::inject_field_initializers;
pub use lowering::lower_bodies;
pub use rewriter::{BoundTreeRewriter, PendingStatements};
