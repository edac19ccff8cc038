//! SurrealDB handle - connection and operations
//!
//! Implements [`MemoryStore`] and [`QaLedger`] on top of SurrealDB.
//! Supports both local (in-memory) and cloud (WebSocket) connections.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::{Database, Root};
use surrealdb::Surreal;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::StoreError;
use crate::schema::{MemoryRecord, QaEvaluationRecord};
use crate::traits::{MemoryStore, QaLedger, StoreResult};

/// Configuration for a SurrealDB Cloud connection
#[derive(Debug, Clone)]
pub struct CloudConfig {
    /// WebSocket endpoint URL (e.g., "wss://xxx.aws-use1.surrealdb.cloud")
    pub endpoint: String,
    /// Database username
    pub username: String,
    /// Database password
    pub password: String,
    /// Namespace (default: "vigil")
    pub namespace: String,
    /// Database name (default: "main")
    pub database: String,
    /// Whether this is a root user (true) or database user (false)
    pub is_root: bool,
}

impl CloudConfig {
    /// Create a new cloud configuration for a database user
    pub fn new(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            username: username.into(),
            password: password.into(),
            namespace: "vigil".to_string(),
            database: "main".to_string(),
            is_root: false,
        }
    }

    /// Set custom namespace
    pub fn with_namespace(mut self, ns: impl Into<String>) -> Self {
        self.namespace = ns.into();
        self
    }

    /// Set custom database
    pub fn with_database(mut self, db: impl Into<String>) -> Self {
        self.database = db.into();
        self
    }

    /// Set whether this is a root user
    pub fn with_root(mut self, is_root: bool) -> Self {
        self.is_root = is_root;
        self
    }

    /// Create from environment variables
    ///
    /// Reads:
    /// - VIGIL_DB_ENDPOINT (required)
    /// - VIGIL_DB_USERNAME (required)
    /// - VIGIL_DB_PASSWORD (required)
    /// - VIGIL_DB_NAMESPACE (optional, default: "vigil")
    /// - VIGIL_DB_DATABASE (optional, default: "main")
    /// - VIGIL_DB_ROOT (optional, default: "false")
    pub fn from_env() -> std::result::Result<Self, String> {
        let endpoint =
            std::env::var("VIGIL_DB_ENDPOINT").map_err(|_| "VIGIL_DB_ENDPOINT not set")?;
        let username =
            std::env::var("VIGIL_DB_USERNAME").map_err(|_| "VIGIL_DB_USERNAME not set")?;
        let password =
            std::env::var("VIGIL_DB_PASSWORD").map_err(|_| "VIGIL_DB_PASSWORD not set")?;
        let namespace =
            std::env::var("VIGIL_DB_NAMESPACE").unwrap_or_else(|_| "vigil".to_string());
        let database = std::env::var("VIGIL_DB_DATABASE").unwrap_or_else(|_| "main".to_string());
        let is_root = std::env::var("VIGIL_DB_ROOT")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        Ok(Self {
            endpoint,
            username,
            password,
            namespace,
            database,
            is_root,
        })
    }
}

/// SurrealDB connection handle for Vigil
#[derive(Clone)]
pub struct StoreHandle {
    db: Surreal<Any>,
}

/// QA row as stored, with a ledger-assigned record id.
#[derive(Debug, Serialize)]
struct DbQaRow<'a> {
    record_id: String,
    #[serde(flatten)]
    row: &'a QaEvaluationRecord,
}

#[derive(Debug, Deserialize)]
struct VideoRow {
    video_uuid: String,
}

impl StoreHandle {
    /// Connect to SurrealDB in-memory and set up schema
    #[instrument(skip_all)]
    pub async fn setup_db() -> StoreResult<Self> {
        info!("Connecting to SurrealDB (in-memory)");

        let db = surrealdb::engine::any::connect("mem://")
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        db.use_ns("vigil")
            .use_db("main")
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let handle = StoreHandle { db };
        handle.init_schema().await?;

        info!("SurrealDB connected and schema initialized");
        Ok(handle)
    }

    /// Connect to SurrealDB Cloud
    #[instrument(skip(config), fields(endpoint = %config.endpoint, namespace = %config.namespace, database = %config.database))]
    pub async fn setup_cloud(config: CloudConfig) -> StoreResult<Self> {
        info!("Connecting to SurrealDB Cloud (root={})", config.is_root);

        let db = surrealdb::engine::any::connect(&config.endpoint)
            .await
            .map_err(|e| {
                StoreError::Connection(format!("Failed to connect to {}: {}", config.endpoint, e))
            })?;

        if config.is_root {
            db.signin(Root {
                username: &config.username,
                password: &config.password,
            })
            .await
            .map_err(|e| StoreError::Connection(format!("Root authentication failed: {}", e)))?;
        } else {
            db.signin(Database {
                namespace: &config.namespace,
                database: &config.database,
                username: &config.username,
                password: &config.password,
            })
            .await
            .map_err(|e| {
                StoreError::Connection(format!("Database authentication failed: {}", e))
            })?;
        }

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await
            .map_err(|e| {
                StoreError::Connection(format!("Failed to select namespace/database: {}", e))
            })?;

        let handle = StoreHandle { db };
        handle.init_schema().await?;

        info!("SurrealDB Cloud connected and schema initialized");
        Ok(handle)
    }

    /// Connect using environment variables
    ///
    /// If VIGIL_DB_ENDPOINT is set, connects to cloud.
    /// If VIGIL_DB_URL is set, connects to that URL.
    /// Otherwise, falls back to in-memory.
    #[instrument(skip_all)]
    pub async fn setup_from_env() -> StoreResult<Self> {
        if let Ok(config) = CloudConfig::from_env() {
            info!("Cloud config found, connecting to SurrealDB Cloud");
            return Self::setup_cloud(config).await;
        }

        if let Ok(url) = std::env::var("VIGIL_DB_URL") {
            info!("VIGIL_DB_URL found, connecting to {}", url);
            let db = surrealdb::engine::any::connect(&url)
                .await
                .map_err(|e| StoreError::Connection(e.to_string()))?;

            db.use_ns("vigil")
                .use_db("main")
                .await
                .map_err(|e| StoreError::Connection(e.to_string()))?;

            let handle = StoreHandle { db };
            handle.init_schema().await?;
            return Ok(handle);
        }

        info!("No cloud config found, using in-memory database");
        Self::setup_db().await
    }

    /// Initialize the database schema
    async fn init_schema(&self) -> StoreResult<()> {
        debug!("Initializing Vigil schema");

        let schema = r#"
            -- Memories table (long-term memory store)
            DEFINE TABLE memories SCHEMAFULL;
            DEFINE FIELD id_str ON memories TYPE string;
            DEFINE FIELD user_id ON memories TYPE string;
            DEFINE FIELD memory ON memories TYPE string;
            DEFINE FIELD created_at ON memories TYPE option<string>;
            DEFINE FIELD updated_at ON memories TYPE option<string>;
            DEFINE FIELD metadata ON memories FLEXIBLE TYPE object;
            DEFINE INDEX idx_memory_id ON memories FIELDS id_str UNIQUE;
            DEFINE INDEX idx_memory_user ON memories FIELDS user_id;

            -- Videos table (id resolution for QA persistence)
            DEFINE TABLE videos SCHEMAFULL;
            DEFINE FIELD video_uuid ON videos TYPE string;
            DEFINE FIELD youtube_video_id ON videos TYPE string;
            DEFINE INDEX idx_video_youtube ON videos FIELDS youtube_video_id UNIQUE;

            -- QA evaluations table
            DEFINE TABLE qa_evaluations SCHEMAFULL;
            DEFINE FIELD record_id ON qa_evaluations TYPE string;
            DEFINE FIELD video_id ON qa_evaluations TYPE string;
            DEFINE FIELD evaluated_at ON qa_evaluations TYPE string;
            DEFINE FIELD evaluator ON qa_evaluations TYPE string;
            DEFINE FIELD accuracy_score ON qa_evaluations TYPE float;
            DEFINE FIELD completeness_score ON qa_evaluations TYPE float;
            DEFINE FIELD readability_score ON qa_evaluations TYPE float;
            DEFINE FIELD signal_quality_score ON qa_evaluations TYPE float;
            DEFINE FIELD hype_assessment_score ON qa_evaluations TYPE float;
            DEFINE FIELD structural_quality_score ON qa_evaluations TYPE float;
            DEFINE FIELD claims_quality_score ON qa_evaluations TYPE float;
            DEFINE FIELD total_score ON qa_evaluations TYPE float;
            DEFINE FIELD grade ON qa_evaluations TYPE string;
            DEFINE FIELD issues ON qa_evaluations FLEXIBLE TYPE object;
            DEFINE FIELD recommendations ON qa_evaluations TYPE array<string>;
            DEFINE FIELD strengths ON qa_evaluations TYPE array<string>;
            DEFINE FIELD evaluation_duration_seconds ON qa_evaluations TYPE float;
            DEFINE FIELD tokens_used ON qa_evaluations TYPE option<int>;
            DEFINE INDEX idx_qa_video ON qa_evaluations FIELDS video_id;
        "#;

        self.db
            .query(schema)
            .await
            .map_err(|e| StoreError::SchemaSetup(e.to_string()))?;

        debug!("Schema initialized successfully");
        Ok(())
    }

    /// Register a video's public id against its store-side UUID.
    #[instrument(skip(self))]
    pub async fn register_video(&self, youtube_video_id: &str, video_uuid: &str) -> StoreResult<()> {
        #[derive(Serialize, Deserialize)]
        struct NewVideo {
            video_uuid: String,
            youtube_video_id: String,
        }

        let _created: Option<NewVideo> = self
            .db
            .create("videos")
            .content(NewVideo {
                video_uuid: video_uuid.to_string(),
                youtube_video_id: youtube_video_id.to_string(),
            })
            .await?;
        Ok(())
    }
}

/// Memory row as stored. The domain `id` is a plain string field (`id_str`)
/// because SurrealDB reserves `id` for its own record ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DbMemoryRow {
    id_str: String,
    user_id: String,
    memory: String,
    created_at: Option<String>,
    updated_at: Option<String>,
    metadata: serde_json::Value,
}

impl DbMemoryRow {
    fn into_record(self) -> MemoryRecord {
        MemoryRecord {
            id: self.id_str,
            user_id: self.user_id,
            memory: self.memory,
            created_at: self.created_at,
            updated_at: self.updated_at,
            metadata: self.metadata,
        }
    }
}

#[async_trait]
impl MemoryStore for StoreHandle {
    #[instrument(skip(self, memory, metadata))]
    async fn add(
        &self,
        user_id: &str,
        memory: &str,
        metadata: serde_json::Value,
    ) -> StoreResult<MemoryRecord> {
        let record = MemoryRecord::new(&Uuid::new_v4().to_string(), user_id, memory, metadata);
        debug!(memory_id = %record.id, "Saving memory");

        let row = DbMemoryRow {
            id_str: record.id.clone(),
            user_id: record.user_id.clone(),
            memory: record.memory.clone(),
            created_at: record.created_at.clone(),
            updated_at: record.updated_at.clone(),
            metadata: record.metadata.clone(),
        };

        let created: Option<DbMemoryRow> = self.db.create("memories").content(row).await?;
        created
            .map(DbMemoryRow::into_record)
            .ok_or_else(|| StoreError::Transaction("Failed to create memory".to_string()))
    }

    #[instrument(skip(self))]
    async fn list_all(&self, user_id: &str) -> StoreResult<Vec<MemoryRecord>> {
        debug!("Listing memories");

        let user_owned = user_id.to_string();
        let mut result = self
            .db
            .query("SELECT * FROM memories WHERE user_id = $user")
            .bind(("user", user_owned))
            .await?;

        let rows: Vec<DbMemoryRow> = result.take(0)?;
        Ok(rows.into_iter().map(DbMemoryRow::into_record).collect())
    }

    /// Idempotent: deleting an absent id succeeds.
    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> StoreResult<()> {
        debug!("Deleting memory");

        let id_owned = id.to_string();
        self.db
            .query("DELETE FROM memories WHERE id_str = $id")
            .bind(("id", id_owned))
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn count(&self, user_id: &str) -> StoreResult<usize> {
        let user_owned = user_id.to_string();
        let mut result = self
            .db
            .query("SELECT count() AS total FROM memories WHERE user_id = $user GROUP ALL")
            .bind(("user", user_owned))
            .await?;

        #[derive(Deserialize)]
        struct CountRow {
            total: usize,
        }

        let counts: Vec<CountRow> = result.take(0)?;
        Ok(counts.into_iter().next().map(|c| c.total).unwrap_or(0))
    }
}

#[async_trait]
impl QaLedger for StoreHandle {
    #[instrument(skip(self))]
    async fn resolve_video_uuid(&self, video_id: &str) -> StoreResult<Option<String>> {
        let id_owned = video_id.to_string();
        let mut result = self
            .db
            .query("SELECT video_uuid FROM videos WHERE youtube_video_id = $id LIMIT 1")
            .bind(("id", id_owned))
            .await?;

        let rows: Vec<VideoRow> = result.take(0)?;
        Ok(rows.into_iter().next().map(|r| r.video_uuid))
    }

    #[instrument(skip(self, record), fields(video_id = %record.video_id))]
    async fn save_evaluation(&self, record: &QaEvaluationRecord) -> StoreResult<String> {
        debug!("Saving QA evaluation");

        let record_id = Uuid::new_v4().to_string();
        let row = DbQaRow {
            record_id: record_id.clone(),
            row: record,
        };

        self.db
            .query("CREATE qa_evaluations CONTENT $row")
            .bind(("row", serde_json::to_value(&row)?))
            .await?;

        info!(record_id = %record_id, "QA evaluation saved");
        Ok(record_id)
    }

    #[instrument(skip(self))]
    async fn list_evaluations(&self, video_id: &str) -> StoreResult<Vec<QaEvaluationRecord>> {
        let id_owned = video_id.to_string();
        let mut result = self
            .db
            .query("SELECT * FROM qa_evaluations WHERE video_id = $id ORDER BY evaluated_at DESC")
            .bind(("id", id_owned))
            .await?;

        let rows: Vec<QaEvaluationRecord> = result.take(0)?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_connection_and_schema_creation() {
        let handle = StoreHandle::setup_db().await;
        assert!(handle.is_ok(), "setup failed: {:?}", handle.err());
    }

    #[tokio::test]
    async fn test_add_list_delete_roundtrip() {
        let handle = StoreHandle::setup_db().await.unwrap();

        let rec = handle
            .add("agent", "Rust uses ownership for memory safety", json!({"source": "test"}))
            .await
            .unwrap();
        assert!(!rec.id.is_empty());
        assert!(rec.created_at.is_some());

        let all = handle.list_all("agent").await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].memory, "Rust uses ownership for memory safety");

        handle.delete(&rec.id).await.unwrap();
        assert_eq!(handle.count("agent").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_of_absent_id_is_idempotent() {
        let handle = StoreHandle::setup_db().await.unwrap();
        let result = handle.delete("no-such-id").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_list_all_is_scoped_by_user() {
        let handle = StoreHandle::setup_db().await.unwrap();
        handle.add("alice", "a note", json!({})).await.unwrap();
        handle.add("bob", "b note", json!({})).await.unwrap();

        let alice = handle.list_all("alice").await.unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].user_id, "alice");
    }

    #[tokio::test]
    async fn test_video_resolution_and_evaluation_roundtrip() {
        let handle = StoreHandle::setup_db().await.unwrap();
        handle
            .register_video("dQw4w9WgXcQ", "11111111-1111-1111-1111-111111111111")
            .await
            .unwrap();

        let uuid = handle.resolve_video_uuid("dQw4w9WgXcQ").await.unwrap();
        assert_eq!(
            uuid.as_deref(),
            Some("11111111-1111-1111-1111-111111111111")
        );
        assert!(handle
            .resolve_video_uuid("missing-video")
            .await
            .unwrap()
            .is_none());

        let record = QaEvaluationRecord {
            video_id: "11111111-1111-1111-1111-111111111111".to_string(),
            evaluated_at: "2026-08-30T00:00:00Z".to_string(),
            evaluator: "anthropic/claude-sonnet-4".to_string(),
            accuracy_score: 9.0,
            completeness_score: 8.5,
            readability_score: 9.5,
            signal_quality_score: 8.0,
            hype_assessment_score: 9.0,
            structural_quality_score: 9.0,
            claims_quality_score: 7.5,
            total_score: 8.64,
            grade: "B".to_string(),
            issues: json!({"accuracy": []}),
            recommendations: vec!["tighten conviction".to_string()],
            strengths: vec![],
            evaluation_duration_seconds: 12.3,
            tokens_used: Some(2048),
        };

        let id = handle.save_evaluation(&record).await.unwrap();
        assert!(!id.is_empty());

        let evals = handle
            .list_evaluations("11111111-1111-1111-1111-111111111111")
            .await
            .unwrap();
        assert_eq!(evals.len(), 1);
        assert_eq!(evals[0].grade, "B");
    }
}
