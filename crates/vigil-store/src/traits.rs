//! Storage trait definitions for Vigil
//!
//! These traits define the two storage abstractions:
//! - `MemoryStore`: long-term memory entries scoped by owner
//! - `QaLedger`: persisted QA evaluation rows
//!
//! All traits are async and backend-agnostic. In-memory fakes are provided
//! for testing via the `fakes` module.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::schema::{MemoryRecord, QaEvaluationRecord};

/// Result type for storage operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Long-term memory store.
///
/// Guarantees:
/// - `add` assigns a unique id and stamps `created_at`.
/// - `list_all` returns every record for the owner scope; a failure here is
///   systemic (callers must not produce partial decay reports from it).
/// - `delete` is idempotent: deleting an id that no longer exists succeeds,
///   so re-running a cleanup over a stale analysis never reports phantom
///   failures.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Store a new memory for the owner, returning the created record.
    async fn add(
        &self,
        user_id: &str,
        memory: &str,
        metadata: serde_json::Value,
    ) -> StoreResult<MemoryRecord>;

    /// Return all records for the owner scope.
    async fn list_all(&self, user_id: &str) -> StoreResult<Vec<MemoryRecord>>;

    /// Delete a record by id. No-op if absent.
    async fn delete(&self, id: &str) -> StoreResult<()>;

    /// Number of records stored for the owner scope.
    async fn count(&self, user_id: &str) -> StoreResult<usize>;
}

/// Ledger of persisted QA evaluations.
#[async_trait]
pub trait QaLedger: Send + Sync {
    /// Resolve a public video id (e.g. a YouTube id) to the store-side UUID.
    /// Returns `None` when no such video is registered.
    async fn resolve_video_uuid(&self, video_id: &str) -> StoreResult<Option<String>>;

    /// Insert an evaluation row, returning the new record's id.
    async fn save_evaluation(&self, record: &QaEvaluationRecord) -> StoreResult<String>;

    /// All evaluations recorded for a video, newest first.
    async fn list_evaluations(&self, video_id: &str) -> StoreResult<Vec<QaEvaluationRecord>>;
}
