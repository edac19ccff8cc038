//! Record types persisted by the vigil storage layer.

use serde::{Deserialize, Serialize};

/// A single memory entry as returned by the store.
///
/// Timestamps are kept as raw strings: the store is fed by external
/// ingestion pipelines and legacy records may carry absent or unparsable
/// values. Interpretation (and the decision not to decay on parse failure)
/// belongs to the retention scorer, not the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryRecord {
    /// Opaque identifier assigned at creation.
    pub id: String,
    /// Owner scope for the record.
    pub user_id: String,
    /// The stored natural-language content.
    pub memory: String,
    /// Timestamp of first storage, RFC 3339 when present.
    pub created_at: Option<String>,
    /// Timestamp of last modification; preferred over `created_at` for age.
    pub updated_at: Option<String>,
    /// Open key-value mapping (provenance tag, associated date, ...).
    /// Opaque to every consumer except the ingestion path that wrote it.
    pub metadata: serde_json::Value,
}

impl MemoryRecord {
    /// Build a fresh record with a `created_at` of now (UTC, RFC 3339).
    pub fn new(id: &str, user_id: &str, memory: &str, metadata: serde_json::Value) -> Self {
        Self {
            id: id.to_string(),
            user_id: user_id.to_string(),
            memory: memory.to_string(),
            created_at: Some(chrono::Utc::now().to_rfc3339()),
            updated_at: None,
            metadata,
        }
    }

    /// The most meaningful "last touched" timestamp string, if any.
    ///
    /// Prefers `updated_at`; empty strings count as absent.
    pub fn effective_timestamp(&self) -> Option<&str> {
        fn pick(s: &Option<String>) -> Option<&str> {
            s.as_deref()
                .and_then(|v| if v.is_empty() { None } else { Some(v) })
        }
        pick(&self.updated_at).or_else(|| pick(&self.created_at))
    }
}

/// A persisted QA evaluation row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QaEvaluationRecord {
    /// The video this evaluation belongs to (store-side UUID).
    pub video_id: String,
    /// When the evaluation ran (RFC 3339).
    pub evaluated_at: String,
    /// The judge model that produced the scores.
    pub evaluator: String,

    pub accuracy_score: f64,
    pub completeness_score: f64,
    pub readability_score: f64,
    pub signal_quality_score: f64,
    pub hype_assessment_score: f64,
    pub structural_quality_score: f64,
    pub claims_quality_score: f64,

    pub total_score: f64,
    pub grade: String,

    /// Per-dimension issue lists.
    pub issues: serde_json::Value,
    pub recommendations: Vec<String>,
    pub strengths: Vec<String>,

    pub evaluation_duration_seconds: f64,
    pub tokens_used: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn effective_timestamp_prefers_updated_at() {
        let mut rec = MemoryRecord::new("m1", "agent", "text", json!({}));
        rec.created_at = Some("2026-01-01T00:00:00Z".to_string());
        rec.updated_at = Some("2026-02-01T00:00:00Z".to_string());
        assert_eq!(rec.effective_timestamp(), Some("2026-02-01T00:00:00Z"));
    }

    #[test]
    fn effective_timestamp_falls_back_to_created_at() {
        let mut rec = MemoryRecord::new("m1", "agent", "text", json!({}));
        rec.created_at = Some("2026-01-01T00:00:00Z".to_string());
        rec.updated_at = None;
        assert_eq!(rec.effective_timestamp(), Some("2026-01-01T00:00:00Z"));
    }

    #[test]
    fn empty_strings_count_as_absent() {
        let mut rec = MemoryRecord::new("m1", "agent", "text", json!({}));
        rec.created_at = Some(String::new());
        rec.updated_at = Some(String::new());
        assert_eq!(rec.effective_timestamp(), None);
    }
}
