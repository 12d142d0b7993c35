//! Structured observability hooks for orchestrator runs.
//!
//! This module provides:
//! - Run-scoped tracing spans via the `RunSpan` RAII guard
//! - Emission functions for run lifecycle events: start, attempt outcome, finish
//!
//! Events are emitted at `info!` level (`warn!` for generator failures).
//! Filtering follows `LETRA_LOG` or `RUST_LOG`; see [`crate::telemetry::init_tracing`].

use tracing::info;

use crate::domain::Selection;

/// RAII guard that enters a run-scoped tracing span for the duration of a run.
///
/// # Example
///
/// ```ignore
/// let _span = RunSpan::enter("6f1c...");
/// // every event below carries run_id = "6f1c..."
/// ```
pub struct RunSpan {
    _span: tracing::span::EnteredSpan,
}

impl RunSpan {
    /// Create and enter a span tagged with the run_id.
    pub fn enter(run_id: &str) -> Self {
        let span = tracing::info_span!("letra.run", run_id = %run_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: run started for a genre with its attempt budget.
pub fn emit_run_started(run_id: &str, genre: &str, desired_count: u32, max_attempts: u32) {
    info!(
        event = "run.started",
        run_id = %run_id,
        genre = %genre,
        desired_count = desired_count,
        max_attempts = max_attempts,
    );
}

/// Emit event: a candidate passed the hard validators.
pub fn emit_candidate_accepted(run_id: &str, attempt: u32, score: f64) {
    info!(event = "attempt.accepted", run_id = %run_id, attempt = attempt, score = score);
}

/// Emit event: a candidate was rejected.
pub fn emit_attempt_rejected(run_id: &str, attempt: u32, reasons: &[String]) {
    info!(
        event = "attempt.rejected",
        run_id = %run_id,
        attempt = attempt,
        reasons = reasons.len(),
        first_reason = %reasons.first().map(String::as_str).unwrap_or_default(),
    );
}

/// Emit event: the generator failed or returned nothing (warning level).
pub fn emit_generator_failed(run_id: &str, attempt: u32, error: &dyn std::fmt::Display) {
    tracing::warn!(event = "attempt.generator_failed", run_id = %run_id, attempt = attempt, error = %error);
}

/// Emit event: run finished with its selection.
pub fn emit_run_finished(
    run_id: &str,
    duration_ms: u64,
    attempts: usize,
    accepted: usize,
    selection: Selection,
    best_score: f64,
) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        attempts = attempts,
        accepted = accepted,
        selection = ?selection,
        best_score = best_score,
    );
}
