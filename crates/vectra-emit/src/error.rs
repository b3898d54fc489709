//! Emission errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use vectra_core::Cancelled;

/// Failures while emitting or writing a module.
///
/// These are infrastructure failures rather than user errors; the pipeline
/// turns them into diagnostics.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("constant pool exceeds 65536 entries")]
    ConstantPoolFull,

    #[error("{what} count {count} does not fit in a u16")]
    TooMany { what: &'static str, count: usize },

    #[error("method body of {size} bytes is too large to address")]
    BodyTooLarge { size: usize },

    #[error("failed to write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Cancelled(#[from] Cancelled),

    /// A node that lowering should have removed, or a symbol of the wrong
    /// kind, reached the emitter.
    #[error("internal emitter error: {0}")]
    Internal(String),
}

impl EmitError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        EmitError::Io {
            path: path.into(),
            source,
        }
    }
}
