//! Structured observability hooks for decay-run lifecycle events.
//!
//! Provides:
//! - Run-scoped tracing spans via the `DecaySpan` RAII guard
//! - Emission functions for the key lifecycle events: analysis finished,
//!   cleanup started, record removed / delete failed, cleanup finished
//!
//! Events are emitted at `info!` level (filterable via `VIGIL_LOG`).

use tracing::{info, warn};

/// RAII guard that enters a decay-run tracing span for the duration of a run.
///
/// # Example
///
/// ```ignore
/// let _span = DecaySpan::enter("agent");
/// // All tracing calls below carry user_id = "agent"
/// ```
pub struct DecaySpan {
    _span: tracing::span::EnteredSpan,
}

impl DecaySpan {
    /// Create and enter a span tagged with the memory owner.
    pub fn enter(user_id: &str) -> Self {
        let span = tracing::info_span!("vigil.decay", user_id = %user_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: retention analysis finished with bucket counts.
pub fn emit_analysis_finished(total: usize, keep: usize, candidates: usize, no_timestamp: usize) {
    info!(
        event = "decay.analysis_finished",
        total = total,
        keep = keep,
        candidates = candidates,
        no_timestamp = no_timestamp,
    );
}

/// Emit event: cleanup pass started.
pub fn emit_cleanup_started(candidates: usize, dry_run: bool) {
    info!(event = "decay.cleanup_started", candidates = candidates, dry_run = dry_run);
}

/// Emit event: one record deleted during cleanup.
pub fn emit_record_removed(id: &str, retention: f64) {
    info!(event = "decay.record_removed", id = %id, retention = retention);
}

/// Emit event: delete failed for one record (warning level); the cleanup
/// pass continues with the remaining candidates.
pub fn emit_record_delete_failed(id: &str, error: &dyn std::fmt::Display) {
    warn!(event = "decay.record_delete_failed", id = %id, error = %error);
}

/// Emit event: cleanup pass finished with outcome counts.
pub fn emit_cleanup_finished(removed: usize, failed: usize, dry_run: bool) {
    info!(
        event = "decay.cleanup_finished",
        removed = removed,
        failed = failed,
        dry_run = dry_run,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decay_span_create() {
        // Just ensure DecaySpan::enter doesn't panic
        let _span = DecaySpan::enter("agent");
    }
}
