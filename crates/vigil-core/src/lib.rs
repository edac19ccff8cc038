//! Core library for Vigil: memory decay scoring and cleanup, markdown
//! chunking, consolidation reports, and QA score aggregation.
//!
//! The storage layer lives in `vigil-store`; the LLM judge client lives in
//! `vigil-judge`. This crate holds the pure domain logic that both the CLI
//! and tests drive.

pub mod chunk;
pub mod decay;
pub mod error;
pub mod obs;
pub mod qa;
pub mod reflect;
pub mod telemetry;
pub mod workspace;

pub use chunk::{split_into_chunks, MIN_CHUNK_CHARS};
pub use decay::policy::{cleanup, Bucket, CleanupOutcome, DecayAnalysis, RecordAssessment};
pub use decay::retention::{retention_at, score, DecayParams};
pub use error::VigilError;
pub use qa::score::{Dimension, DimensionScores, Grade, QaResult};
pub use workspace::WorkspacePaths;

/// Crate version, taken from Cargo metadata.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
