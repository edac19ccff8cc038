//! In-memory fakes for storage traits (testing only)
//!
//! `MemoryStoreFake` and `QaLedgerFake` satisfy the trait contracts without
//! any external dependencies. The memory fake additionally supports delete
//! failure injection so partial-failure cleanup semantics can be exercised.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::schema::{MemoryRecord, QaEvaluationRecord};
use crate::traits::{MemoryStore, QaLedger, StoreResult};

// ---------------------------------------------------------------------------
// MemoryStoreFake
// ---------------------------------------------------------------------------

/// In-memory memory store backed by a `HashMap<id, MemoryRecord>`.
#[derive(Debug, Default)]
pub struct MemoryStoreFake {
    records: Mutex<HashMap<String, MemoryRecord>>,
    failing_deletes: Mutex<HashSet<String>>,
    fail_listing: Mutex<bool>,
}

impl MemoryStoreFake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully-formed record, bypassing `add`'s timestamping.
    /// Lets tests control `created_at`/`updated_at` (including absent or
    /// garbage values).
    pub fn insert_raw(&self, record: MemoryRecord) {
        let mut records = self.records.lock().unwrap();
        records.insert(record.id.clone(), record);
    }

    /// Make subsequent deletes of `id` fail with a query error.
    pub fn fail_delete_of(&self, id: &str) {
        self.failing_deletes.lock().unwrap().insert(id.to_string());
    }

    /// Make subsequent `list_all` calls fail (simulates an unreachable store).
    pub fn fail_listing(&self) {
        *self.fail_listing.lock().unwrap() = true;
    }

    /// Whether a record with this id is still present.
    pub fn contains(&self, id: &str) -> bool {
        self.records.lock().unwrap().contains_key(id)
    }

    /// Total records across all owners.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl MemoryStore for MemoryStoreFake {
    async fn add(
        &self,
        user_id: &str,
        memory: &str,
        metadata: serde_json::Value,
    ) -> StoreResult<MemoryRecord> {
        let record = MemoryRecord::new(&Uuid::new_v4().to_string(), user_id, memory, metadata);
        let mut records = self.records.lock().unwrap();
        records.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn list_all(&self, user_id: &str) -> StoreResult<Vec<MemoryRecord>> {
        if *self.fail_listing.lock().unwrap() {
            return Err(StoreError::Connection("store unreachable".to_string()));
        }
        let records = self.records.lock().unwrap();
        let mut all: Vec<MemoryRecord> = records
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        // Deterministic ordering for test assertions.
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        if self.failing_deletes.lock().unwrap().contains(id) {
            return Err(StoreError::Query(format!("delete rejected for {id}")));
        }
        let mut records = self.records.lock().unwrap();
        records.remove(id);
        Ok(())
    }

    async fn count(&self, user_id: &str) -> StoreResult<usize> {
        let records = self.records.lock().unwrap();
        Ok(records.values().filter(|r| r.user_id == user_id).count())
    }
}

// ---------------------------------------------------------------------------
// QaLedgerFake
// ---------------------------------------------------------------------------

/// In-memory QA ledger with a preloadable video-id mapping.
#[derive(Debug, Default)]
pub struct QaLedgerFake {
    videos: Mutex<HashMap<String, String>>,
    evaluations: Mutex<Vec<(String, QaEvaluationRecord)>>,
}

impl QaLedgerFake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a public video id against a store-side UUID.
    pub fn register_video(&self, youtube_video_id: &str, video_uuid: &str) {
        self.videos
            .lock()
            .unwrap()
            .insert(youtube_video_id.to_string(), video_uuid.to_string());
    }

    /// Number of saved evaluation rows.
    pub fn saved_count(&self) -> usize {
        self.evaluations.lock().unwrap().len()
    }
}

#[async_trait]
impl QaLedger for QaLedgerFake {
    async fn resolve_video_uuid(&self, video_id: &str) -> StoreResult<Option<String>> {
        Ok(self.videos.lock().unwrap().get(video_id).cloned())
    }

    async fn save_evaluation(&self, record: &QaEvaluationRecord) -> StoreResult<String> {
        let record_id = Uuid::new_v4().to_string();
        self.evaluations
            .lock()
            .unwrap()
            .push((record_id.clone(), record.clone()));
        Ok(record_id)
    }

    async fn list_evaluations(&self, video_id: &str) -> StoreResult<Vec<QaEvaluationRecord>> {
        let mut rows: Vec<QaEvaluationRecord> = self
            .evaluations
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, r)| r.video_id == video_id)
            .map(|(_, r)| r.clone())
            .collect();
        rows.sort_by(|a, b| b.evaluated_at.cmp(&a.evaluated_at));
        Ok(rows)
    }
}
