//! Vectra Analysis
//!
//! Static checks over bound bodies. Analyzers are independent read-only
//! walks; each sees one body at a time and reports into the shared bag.
//!
//! | Analyzer | Code | Severity |
//! |----------|------|----------|
//! | [`ReturnPathAnalyzer`] | `MissingReturnPath` | error |
//! | [`UninitializedVariableAnalyzer`] | `UseOfUninitializedVariable` | error |
//! | [`UnreachableCodeAnalyzer`] | `UnreachableCode` | warning |
//! | [`UnusedVariableAnalyzer`] | `UnusedVariable` | warning |
//! | [`UnusedParameterAnalyzer`] | `UnusedParameter` | warning |

pub mod analyzer;
pub mod return_path;
pub mod uninitialized;
pub mod unreachable;
pub mod unused;

pub use analyzer::{AnalysisRunner, Analyzer};
pub use return_path::ReturnPathAnalyzer;
pub use uninitialized::UninitializedVariableAnalyzer;
pub use unreachable::UnreachableCodeAnalyzer;
pub use unused::{UnusedParameterAnalyzer, UnusedVariableAnalyzer};
