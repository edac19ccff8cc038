//! Cleanup policy: partition a memory set by retention and, on request,
//! delete the decayed portion.
//!
//! Analysis is pure and side-effect free; [`cleanup`] is the only function
//! here that mutates the store. Deletion is a non-atomic batch: each
//! candidate is attempted independently, failures are logged and counted,
//! and the pass always runs to the end of the list.

use chrono::{DateTime, Utc};
use serde::Serialize;
use vigil_store::{MemoryRecord, MemoryStore};

use crate::decay::retention::{score, DecayParams};
use crate::obs;

/// How many characters of the memory text an assessment carries.
const PREVIEW_CHARS: usize = 100;

/// Displayed timestamps are cut to `YYYY-MM-DDTHH:MM:SS`.
const TIMESTAMP_DISPLAY_CHARS: usize = 19;

/// Which side of the threshold a record landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Keep,
    DecayCandidate,
    NoTimestamp,
}

/// One record's verdict: identity, a bounded preview, the resolved
/// timestamp (or `N/A`) and the full-precision retention score.
#[derive(Debug, Clone, Serialize)]
pub struct RecordAssessment {
    pub id: String,
    pub preview: String,
    pub timestamp: String,
    pub retention: f64,
    pub bucket: Bucket,
}

impl RecordAssessment {
    fn from_record(record: &MemoryRecord, retention: f64, bucket: Bucket) -> Self {
        let timestamp = match record.effective_timestamp() {
            Some(raw) => raw.chars().take(TIMESTAMP_DISPLAY_CHARS).collect(),
            None => "N/A".to_string(),
        };
        Self {
            id: record.id.clone(),
            preview: record.memory.chars().take(PREVIEW_CHARS).collect(),
            timestamp,
            retention,
            bucket,
        }
    }

    /// Retention rounded to three decimals, for display only. Threshold
    /// comparison always uses the full-precision value.
    pub fn retention_display(&self) -> f64 {
        (self.retention * 1000.0).round() / 1000.0
    }
}

/// Result of partitioning a memory set by retention.
#[derive(Debug, Default, Serialize)]
pub struct DecayAnalysis {
    pub total: usize,
    pub keep: Vec<RecordAssessment>,
    pub decay_candidates: Vec<RecordAssessment>,
    pub no_timestamp: Vec<RecordAssessment>,
}

/// Partition `records` into keep / decay-candidate / no-timestamp buckets.
///
/// A record with no parsable timestamp is never a candidate, whatever the
/// threshold: it scores the sentinel 1.0 and lands in `no_timestamp`.
pub fn analyze(records: &[MemoryRecord], params: &DecayParams, now: DateTime<Utc>) -> DecayAnalysis {
    let mut analysis = DecayAnalysis {
        total: records.len(),
        ..Default::default()
    };

    for record in records {
        let raw = record.effective_timestamp();
        let retention = score(raw, now, params.half_life_days);

        if raw.and_then(crate::decay::retention::parse_timestamp).is_none() {
            analysis
                .no_timestamp
                .push(RecordAssessment::from_record(record, retention, Bucket::NoTimestamp));
        } else if retention < params.threshold {
            analysis.decay_candidates.push(RecordAssessment::from_record(
                record,
                retention,
                Bucket::DecayCandidate,
            ));
        } else {
            analysis
                .keep
                .push(RecordAssessment::from_record(record, retention, Bucket::Keep));
        }
    }

    obs::emit_analysis_finished(
        analysis.total,
        analysis.keep.len(),
        analysis.decay_candidates.len(),
        analysis.no_timestamp.len(),
    );
    analysis
}

/// Outcome of a cleanup pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CleanupOutcome {
    pub removed: usize,
    pub failed: usize,
    pub dry_run: bool,
}

/// Delete the decay candidates from `store`.
///
/// With `dry_run` set, nothing is deleted and the outcome reports zero
/// removals. Otherwise each candidate is deleted independently; a failed
/// delete is logged and counted but never aborts the pass.
pub async fn cleanup(
    store: &dyn MemoryStore,
    analysis: &DecayAnalysis,
    dry_run: bool,
) -> CleanupOutcome {
    obs::emit_cleanup_started(analysis.decay_candidates.len(), dry_run);

    let mut outcome = CleanupOutcome {
        removed: 0,
        failed: 0,
        dry_run,
    };

    if !dry_run {
        for candidate in &analysis.decay_candidates {
            match store.delete(&candidate.id).await {
                Ok(()) => {
                    obs::emit_record_removed(&candidate.id, candidate.retention);
                    outcome.removed += 1;
                }
                Err(err) => {
                    obs::emit_record_delete_failed(&candidate.id, &err);
                    outcome.failed += 1;
                }
            }
        }
    }

    obs::emit_cleanup_finished(outcome.removed, outcome.failed, dry_run);
    outcome
}
