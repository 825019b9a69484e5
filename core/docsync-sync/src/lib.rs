//! Selective synchronization from a document store into a search index.
//!
//! # Pipeline
//!
//! 1. **Select**: build a predicate from the selection window
//!    (`shouldIndex == true AND lastMarkedAt >= now - window`)
//! 2. **Fetch**: drain every matching record from the store
//! 3. **Transform**: optionally rewrite attributes
//! 4. **Write**: upsert the whole batch by primary key
//! 5. **Report**: record count plus the engine's task handle
//!
//! A run is single-pass and never retries. Upserts are idempotent, so the
//! retry mechanism is simply running again.
//!
//! # Example
//!
//! ```
//! use docsync_search::MemoryIndex;
//! use docsync_store::MemoryStore;
//! use docsync_sync::{SyncConfig, SyncOrchestrator};
//! use docsync_types::Movie;
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::<Movie>::new());
//! let index = Arc::new(MemoryIndex::new());
//! let orchestrator =
//!     SyncOrchestrator::<Movie>::new(SyncConfig::default(), store, index).unwrap();
//! assert_eq!(orchestrator.config().index_name, "movies");
//! ```

mod config;
mod error;
mod orchestrator;
mod report;
mod service;

pub use config::SyncConfig;
pub use error::{SyncError, SyncErrorKind, SyncResult};
pub use orchestrator::{SyncOrchestrator, Transform};
pub use report::{RunState, SyncFailure, SyncReport};
pub use service::RecordService;
