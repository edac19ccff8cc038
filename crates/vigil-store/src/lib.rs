//! Vigil storage layer.
//!
//! Backend-agnostic traits for the two persistence concerns of the toolkit:
//! - [`MemoryStore`]: the long-term memory store (list/add/delete by owner)
//! - [`QaLedger`]: persisted QA evaluation rows keyed by video
//!
//! A SurrealDB implementation ([`StoreHandle`]) covers both traits; in-memory
//! fakes are provided for testing via the `fakes` module.

pub mod error;
pub mod fakes;
pub mod schema;
pub mod surreal;
pub mod traits;

pub use error::StoreError;
pub use fakes::{MemoryStoreFake, QaLedgerFake};
pub use schema::{MemoryRecord, QaEvaluationRecord};
pub use surreal::{CloudConfig, StoreHandle};
pub use traits::{MemoryStore, QaLedger, StoreResult};
