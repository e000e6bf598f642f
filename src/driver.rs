//! Resolve many units against one frozen program
//!
//! Units only read the shared `Program`, so they are resolved in parallel.
//! Each worker reports into its own buffer and results come back in input
//! order, which keeps rendered output identical from run to run.

use anyhow::{Context, Result};
use rayon::prelude::*;
use tern_ast::{ElementId, Unit};
use tern_diagnostics::termcolor::WriteColor;
use tern_diagnostics::{DiagnosticSummary, Files, Reporter};
use tern_resolve::{Program, Resolution, ResolveError, Resolver, ResolverConfig, TypeProvider};

/// What one unit produced
#[derive(Debug, Clone, PartialEq)]
pub struct UnitResult {
    pub library: ElementId,
    pub resolution: Resolution,
    pub diagnostics: Vec<ResolveError>,
}

impl UnitResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(ResolveError::is_error)
    }
}

pub struct Driver<'a> {
    program: &'a Program,
    types: &'a (dyn TypeProvider + Sync),
    config: ResolverConfig,
}

impl<'a> Driver<'a> {
    pub fn new(program: &'a Program, types: &'a (dyn TypeProvider + Sync)) -> Self {
        Self::with_config(program, types, ResolverConfig::default())
    }

    pub fn with_config(program: &'a Program, types: &'a (dyn TypeProvider + Sync), config: ResolverConfig) -> Self {
        Self { program, types, config }
    }

    /// Resolve `unit` on the calling thread
    pub fn resolve_one(&self, unit: &Unit) -> Result<UnitResult> {
        let resolver = Resolver::with_config(self.program, self.types, self.config.clone());
        let mut diagnostics = Vec::new();
        let resolution = resolver
            .resolve_unit(unit, &mut diagnostics)
            .with_context(|| format!("failed to resolve a unit of library {}", unit.library))?;
        Ok(UnitResult {
            library: unit.library,
            resolution,
            diagnostics,
        })
    }

    /// Resolve every unit in parallel. The first internal error aborts the
    /// batch; results are in the order of `units`.
    #[tracing::instrument(level = "debug", skip_all, fields(units = units.len()))]
    pub fn resolve_all(&self, units: &[Unit]) -> Result<Vec<UnitResult>> {
        let results: Vec<UnitResult> = units
            .par_iter()
            .enumerate()
            .map(|(index, unit)| {
                self.resolve_one(unit)
                    .with_context(|| format!("unit #{} could not be resolved", index))
            })
            .collect::<Result<_>>()?;

        let reported: usize = results.iter().map(|result| result.diagnostics.len()).sum();
        tracing::debug!(units = results.len(), diagnostics = reported, "resolution finished");
        Ok(results)
    }
}

/// Render every diagnostic of `results`, unit by unit, and tally them
pub fn render<W: WriteColor>(
    files: &Files<String>,
    results: &[UnitResult],
    reporter: &mut Reporter<W>,
) -> Result<DiagnosticSummary> {
    for result in results {
        for error in &result.diagnostics {
            reporter
                .emit(files, &error.to_diagnostic())
                .with_context(|| format!("failed to render {}", error.code.code()))?;
        }
    }
    Ok(reporter.summary())
}
