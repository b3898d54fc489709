//! The analyzer trait and the runner that drives it.

use tracing::{debug, trace};
use vectra_binder::{BoundBody, SymbolTable};
use vectra_core::{CancellationToken, Cancelled, DiagnosticBag};

use crate::{
    ReturnPathAnalyzer, UninitializedVariableAnalyzer, UnreachableCodeAnalyzer,
    UnusedParameterAnalyzer, UnusedVariableAnalyzer,
};

/// A read-only check over one bound body.
pub trait Analyzer {
    fn name(&self) -> &'static str;

    fn analyze(&self, symbols: &SymbolTable, body: &BoundBody, diagnostics: &mut DiagnosticBag);
}

/// Runs a fixed list of analyzers over every body.
pub struct AnalysisRunner {
    analyzers: Vec<Box<dyn Analyzer>>,
}

impl AnalysisRunner {
    pub fn new() -> Self {
        Self {
            analyzers: Vec::new(),
        }
    }

    /// The five standard analyzers.
    pub fn standard() -> Self {
        Self::new()
            .with(ReturnPathAnalyzer)
            .with(UninitializedVariableAnalyzer)
            .with(UnreachableCodeAnalyzer)
            .with(UnusedVariableAnalyzer)
            .with(UnusedParameterAnalyzer)
    }

    pub fn with(mut self, analyzer: impl Analyzer + 'static) -> Self {
        self.analyzers.push(Box::new(analyzer));
        self
    }

    pub fn len(&self) -> usize {
        self.analyzers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyzers.is_empty()
    }

    /// Analyzes every body, checking for cancellation before each one.
    pub fn run(
        &self,
        symbols: &SymbolTable,
        bodies: &[BoundBody],
        diagnostics: &mut DiagnosticBag,
        cancel: &CancellationToken,
    ) -> Result<(), Cancelled> {
        for body in bodies {
            cancel.check()?;
            trace!(callable = %symbols.display_name(body.callable), "analyzing");
            for analyzer in &self.analyzers {
                analyzer.analyze(symbols, body, diagnostics);
            }
        }
        debug!(
            bodies = bodies.len(),
            errors = diagnostics.error_count(),
            warnings = diagnostics.warning_count(),
            "analysis finished"
        );
        Ok(())
    }
}

impl Default for AnalysisRunner {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vectra_binder::{BindOptions, bind};
    use vectra_core::{ErrorCode, Phase};
    use vectra_syntax::SyntaxBuilder;

    #[test]
    fn standard_runner_has_five_analyzers() {
        assert_eq!(AnalysisRunner::standard().len(), 5);
        assert!(AnalysisRunner::new().is_empty());
    }

    #[test]
    fn missing_return_is_the_only_diagnostic() {
        let b = SyntaxBuilder::new();
        let package = b.program(vec![b.class(
            "Program",
            vec![b.method("Answer", "number", vec![], vec![])],
        )]);
        let cancel = CancellationToken::new();
        let mut bind_bag = DiagnosticBag::new(Phase::Bind);
        let bound = bind(&package, &BindOptions::default(), &mut bind_bag, &cancel).unwrap();

        let mut diagnostics = DiagnosticBag::new(Phase::Analyze);
        AnalysisRunner::standard()
            .run(
                &bound.declarations.symbols,
                &bound.bodies,
                &mut diagnostics,
                &cancel,
            )
            .unwrap();

        let codes: Vec<_> = diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![ErrorCode::MissingReturnPath]);
        assert!(diagnostics.iter().all(|d| d.phase == Phase::Analyze));
    }

    #[test]
    fn cancelled_before_first_body() {
        let b = SyntaxBuilder::new();
        let package = b.program(vec![b.class("Program", vec![])]);
        let cancel = CancellationToken::new();
        let mut bag = DiagnosticBag::new(Phase::Bind);
        let bound = bind(&package, &BindOptions::default(), &mut bag, &cancel).unwrap();

        cancel.cancel();
        let mut diagnostics = DiagnosticBag::new(Phase::Analyze);
        let result = AnalysisRunner::standard().run(
            &bound.declarations.symbols,
            &bound.bodies,
            &mut diagnostics,
            &cancel,
        );
        assert_eq!(result, Err(Cancelled));
    }
}
