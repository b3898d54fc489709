//! Artifact files.
//!
//! With atomic writes, every container of a module is first written to a
//! temporary file in the output directory. The temporaries are renamed into
//! place only after all of them were written, so a failure or cancellation
//! mid-module leaves the previous artifacts untouched.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, trace};
use vectra_core::CancellationToken;

use crate::container::{ContainerKind, write_container};
use crate::{EmitError, EmittedModule};

/// One serialized container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ContainerKind,
    /// `<module>.<ext>`
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Serializes every container a module produces.
pub fn build_artifacts(
    module: &EmittedModule,
    debug_symbols: bool,
) -> Result<Vec<Artifact>, EmitError> {
    ContainerKind::for_module(module.metadata.kind, debug_symbols)
        .into_iter()
        .map(|kind| {
            Ok(Artifact {
                kind,
                file_name: format!("{}.{}", module.metadata.name, kind.extension()),
                bytes: write_container(kind, module)?,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub struct ArtifactWriter {
    atomic: bool,
}

impl ArtifactWriter {
    pub fn new(atomic: bool) -> Self {
        Self { atomic }
    }

    /// Writes `artifacts` into `dir`, creating it if needed. Returns the
    /// final paths in artifact order.
    pub fn write(
        &self,
        dir: &Path,
        artifacts: &[Artifact],
        cancel: &CancellationToken,
    ) -> Result<Vec<PathBuf>, EmitError> {
        fs::create_dir_all(dir).map_err(|e| EmitError::io(dir, e))?;

        let paths = if self.atomic {
            self.write_atomic(dir, artifacts, cancel)?
        } else {
            let mut paths = Vec::with_capacity(artifacts.len());
            for artifact in artifacts {
                cancel.check()?;
                let path = dir.join(&artifact.file_name);
                fs::write(&path, &artifact.bytes).map_err(|e| EmitError::io(&path, e))?;
                paths.push(path);
            }
            paths
        };

        debug!(dir = %dir.display(), files = paths.len(), atomic = self.atomic, "artifacts written");
        Ok(paths)
    }

    fn write_atomic(
        &self,
        dir: &Path,
        artifacts: &[Artifact],
        cancel: &CancellationToken,
    ) -> Result<Vec<PathBuf>, EmitError> {
        let mut staged = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            cancel.check()?;
            let mut file = NamedTempFile::new_in(dir).map_err(|e| EmitError::io(dir, e))?;
            file.write_all(&artifact.bytes)
                .and_then(|()| file.as_file().sync_all())
                .map_err(|e| EmitError::io(file.path(), e))?;
            trace!(file = %artifact.file_name, temp = %file.path().display(), "artifact staged");
            staged.push((file, dir.join(&artifact.file_name)));
        }

        // Dropping the remaining temporaries on error deletes them.
        cancel.check()?;
        let mut paths = Vec::with_capacity(staged.len());
        for (file, path) in staged {
            file.persist(&path)
                .map_err(|e| EmitError::io(&path, e.error))?;
            paths.push(path);
        }
        Ok(paths)
    }
}

impl Default for ArtifactWriter {
    fn default() -> Self {
        Self::new(true)
    }
}
