//! Phase orchestration.
//!
//! ```text
//! Bind ──► Analyze ──► Lower ──► Emit
//!   │         │          │         │
//!   └─────────┴──── errors halt ───┘
//! ```
//!
//! Each phase reports into its own [`DiagnosticBag`]; the bags are merged
//! into the output in phase order. An error in a phase stops the pipeline at
//! that phase boundary, warnings never do.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info, info_span, warn};
use vectra_analysis::AnalysisRunner;
use vectra_binder::{BoundPackage, SymbolTable, bind};
use vectra_core::{
    CancellationToken, Cancelled, Diagnostic, DiagnosticBag, ErrorCode, ModuleKind, Phase, Severity,
};
use vectra_emit::{Artifact, ArtifactWriter, EmitError, ModuleEmitter, build_artifacts};
use vectra_lower::{ModuleUnit, group_modules, lower_bodies};
use vectra_syntax::SyntaxPackage;

use crate::CompilerOptions;

/// Failures that abort a compilation outright rather than being reported
/// as diagnostics.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

/// What one module produced.
#[derive(Debug, Clone)]
pub struct ModuleOutput {
    pub name: String,
    pub kind: ModuleKind,
    pub artifacts: Vec<Artifact>,
    /// Files written; empty when artifacts are kept in memory.
    pub paths: Vec<PathBuf>,
}

/// Result of a compilation that ran to completion or halted on errors.
#[derive(Debug, Default)]
pub struct CompileOutput {
    /// All diagnostics, in phase order.
    pub diagnostics: Vec<Diagnostic>,
    /// The phase whose errors stopped the pipeline.
    pub halted_at: Option<Phase>,
    pub modules: Vec<ModuleOutput>,
}

impl CompileOutput {
    pub fn succeeded(&self) -> bool {
        self.halted_at.is_none()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    pub fn codes(&self) -> Vec<ErrorCode> {
        self.diagnostics.iter().map(|d| d.code).collect()
    }

    /// Merges a finished phase's bag; true when the phase reported errors.
    fn absorb(&mut self, bag: DiagnosticBag) -> bool {
        let phase = bag.phase();
        let failed = bag.has_errors();
        if failed {
            warn!(%phase, errors = bag.error_count(), "phase failed");
            self.halted_at = Some(phase);
        }
        self.diagnostics.extend(bag.into_vec());
        failed
    }
}

/// Runs the backend phases over a parsed package.
pub struct Compiler {
    options: CompilerOptions,
    analyzers: AnalysisRunner,
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self {
            options,
            analyzers: AnalysisRunner::standard(),
        }
    }

    /// Replaces the standard analyzer set.
    pub fn with_analyzers(mut self, analyzers: AnalysisRunner) -> Self {
        self.analyzers = analyzers;
        self
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(
        &self,
        package: &SyntaxPackage,
        cancel: &CancellationToken,
    ) -> Result<CompileOutput, CompileError> {
        let mut output = CompileOutput::default();

        // Bind
        let mut bag = DiagnosticBag::new(Phase::Bind);
        let bound = {
            let _span = info_span!("phase", phase = %Phase::Bind).entered();
            bind(package, &self.options.bind_options(), &mut bag, cancel)?
        };
        if output.absorb(bag) {
            return Ok(output);
        }
        let BoundPackage {
            mut declarations,
            bodies,
        } = bound;

        // Analyze
        let mut bag = DiagnosticBag::new(Phase::Analyze);
        {
            let _span = info_span!("phase", phase = %Phase::Analyze).entered();
            self.analyzers
                .run(&declarations.symbols, &bodies, &mut bag, cancel)?;
        }
        if output.absorb(bag) {
            return Ok(output);
        }

        // Lower
        let mut bag = DiagnosticBag::new(Phase::Lower);
        let units = {
            let _span = info_span!("phase", phase = %Phase::Lower).entered();
            let lowered = lower_bodies(&mut declarations.symbols, bodies, cancel)?;
            match group_modules(package, &declarations, lowered) {
                Ok(units) => units,
                Err(e) => {
                    bag.error(ErrorCode::InternalError, None, e.to_string());
                    Vec::new()
                }
            }
        };
        if output.absorb(bag) {
            return Ok(output);
        }

        // Emit
        let mut bag = DiagnosticBag::new(Phase::Emit);
        {
            let _span = info_span!("phase", phase = %Phase::Emit).entered();
            for unit in &units {
                cancel.check()?;
                match self.emit_unit(&declarations.symbols, unit, cancel) {
                    Ok(module) => output.modules.push(module),
                    Err(EmitError::Cancelled(cancelled)) => return Err(cancelled.into()),
                    Err(e @ EmitError::Io { .. }) => {
                        bag.error(ErrorCode::ArtifactWriteFailed, None, e.to_string())
                    }
                    Err(e) => bag.error(ErrorCode::InternalError, None, e.to_string()),
                }
            }
        }
        output.absorb(bag);

        info!(
            modules = output.modules.len(),
            errors = output.error_count(),
            warnings = output.warning_count(),
            "compilation finished"
        );
        Ok(output)
    }

    fn emit_unit(
        &self,
        symbols: &SymbolTable,
        unit: &ModuleUnit,
        cancel: &CancellationToken,
    ) -> Result<ModuleOutput, EmitError> {
        let module = ModuleEmitter::new(symbols).emit(unit, cancel)?;
        let artifacts = build_artifacts(&module, self.options.emit_debug_symbols)?;

        let paths = if self.options.write_artifacts {
            let dir = unit.metadata.output_dir(self.options.configuration);
            ArtifactWriter::new(self.options.atomic_writes).write(&dir, &artifacts, cancel)?
        } else {
            debug!(module = %unit.metadata.name, "artifacts kept in memory");
            Vec::new()
        };

        Ok(ModuleOutput {
            name: unit.metadata.name.clone(),
            kind: unit.metadata.kind,
            artifacts,
            paths,
        })
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompilerOptions::default())
    }
}
