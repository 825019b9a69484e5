//! Document-store side of the docsync pipeline.
//!
//! - **Query**: the selection window and the predicate it produces
//! - **Store**: the [`RecordStore`] seam the orchestrator reads through
//! - **Mongo**: a MongoDB-backed reader
//! - **Memory**: an in-memory reader for tests and local runs
//!
//! Readers are read-only. They never touch the `shouldIndex` flag or the
//! mark timestamp of the records they return.

mod error;
pub mod memory;
pub mod mongo;
pub mod query;
mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use mongo::{MongoStore, MongoStoreConfig};
pub use query::{Predicate, QueryError, SelectionWindow, DEFAULT_WINDOW_DAYS};
pub use store::{DecodeFailure, DecodePolicy, Fetched, RecordStore};
