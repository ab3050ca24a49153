//! dbgeval: compile debugger expressions against a program known only
//! through the debug information in its binaries.
//!
//! The work is split across the workspace crates:
//!
//! - `dbgeval-parser`, `dbgeval-binder`, `dbgeval-checker`: the host
//!   compiler the expression is checked with
//! - `dbgeval-debuginfo`: the binary container and its reader
//! - `dbgeval-evaluate`: declaration synthesis and the evaluation session
//!
//! This crate re-exports the session API and adds the entry point debugger
//! front ends call with a JSON options file.

use anyhow::Context;
use std::path::Path;

pub mod tracing_config;

pub use dbgeval_common::diagnostics::{Diagnostic, DiagnosticCategory};
pub use dbgeval_evaluate::{
    DebugInfoStore, EvalContext, EvalError, EvaluateOptions, EvaluationOutcome, EvaluationSession,
    LiveVariable, SynthesisStats,
};

/// Load options from `config_path` and evaluate `source` at the location
/// they describe.
///
/// Errors in `source` come back inside the outcome; the `Err` case is for
/// unreadable options, unusable binaries and aborted synthesis.
pub fn evaluate_with_config(config_path: &Path, source: &str) -> anyhow::Result<EvaluationOutcome> {
    let options = EvaluateOptions::from_file(config_path)
        .with_context(|| format!("reading evaluation options from {}", config_path.display()))?;
    let source_path = options.source_path.clone();
    let session = EvaluationSession::new(options)
        .with_context(|| format!("opening debug information for {source_path}"))?;
    let outcome = session
        .evaluate(source)
        .with_context(|| format!("evaluating expression in {source_path}"))?;
    tracing::debug!(
        diagnostics = outcome.diagnostics.len(),
        classes = outcome.stats.classes,
        "evaluate_with_config finished"
    );
    Ok(outcome)
}

/// Diagnostics of an outcome as a JSON array, for front ends that talk JSON.
pub fn diagnostics_json(outcome: &EvaluationOutcome) -> anyhow::Result<String> {
    serde_json::to_string(&outcome.diagnostics).context("serializing diagnostics")
}
