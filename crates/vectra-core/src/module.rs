//! Module metadata supplied by the package stage.

use std::path::{Path, PathBuf};

/// What a module compiles into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    /// Produces an executable container (`VBC`).
    Executable,
    /// Produces a library body (`VDL`) and its interface (`VDI`).
    Library,
}

/// Build configuration, which selects the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BuildConfiguration {
    #[default]
    Debug,
    Release,
}

impl BuildConfiguration {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildConfiguration::Debug => "Debug",
            BuildConfiguration::Release => "Release",
        }
    }
}

/// Metadata of one module in a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMetadata {
    pub name: String,
    pub kind: ModuleKind,
    /// Directory containing the module's sources and metadata file.
    pub root: PathBuf,
    /// Names of referenced modules; written to the imports table.
    pub references: Vec<String>,
}

impl ModuleMetadata {
    pub fn new(name: impl Into<String>, kind: ModuleKind, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            kind,
            root: root.into(),
            references: Vec::new(),
        }
    }

    pub fn with_reference(mut self, module: impl Into<String>) -> Self {
        self.references.push(module.into());
        self
    }

    /// Directory artifacts are written to: `<root>/bin/<configuration>`.
    pub fn output_dir(&self, configuration: BuildConfiguration) -> PathBuf {
        self.root.join("bin").join(configuration.as_str())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
