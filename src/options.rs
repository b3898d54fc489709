//! Compiler configuration.

use vectra_binder::{BindOptions, OverloadResolution};
use vectra_core::BuildConfiguration;

/// Options for one [`Compiler`](crate::Compiler).
///
/// ```
/// use vectra::{BuildConfiguration, CompilerOptions};
///
/// let options = CompilerOptions::default()
///     .with_configuration(BuildConfiguration::Release)
///     .with_debug_symbols(false);
/// assert!(options.atomic_writes);
/// ```
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    pub overload_resolution: OverloadResolution,
    /// Selects `<module root>/bin/<configuration>` as the output directory.
    pub configuration: BuildConfiguration,
    /// Write a `VDS` container for every module.
    pub emit_debug_symbols: bool,
    /// Stage each module's artifacts in temporary files and rename them into
    /// place only once all of them were written.
    pub atomic_writes: bool,
    /// When false, artifacts are only returned in memory.
    pub write_artifacts: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            overload_resolution: OverloadResolution::default(),
            configuration: BuildConfiguration::default(),
            emit_debug_symbols: true,
            atomic_writes: true,
            write_artifacts: true,
        }
    }
}

impl CompilerOptions {
    pub fn with_overload_resolution(mut self, policy: OverloadResolution) -> Self {
        self.overload_resolution = policy;
        self
    }

    pub fn with_configuration(mut self, configuration: BuildConfiguration) -> Self {
        self.configuration = configuration;
        self
    }

    pub fn with_debug_symbols(mut self, enabled: bool) -> Self {
        self.emit_debug_symbols = enabled;
        self
    }

    pub fn with_atomic_writes(mut self, enabled: bool) -> Self {
        self.atomic_writes = enabled;
        self
    }

    pub fn with_write_artifacts(mut self, enabled: bool) -> Self {
        self.write_artifacts = enabled;
        self
    }

    /// The binder-relevant subset.
    pub fn bind_options(&self) -> BindOptions {
        BindOptions::default().with_overload_resolution(self.overload_resolution)
    }
}
