//! Core type definitions for docsync.
//!
//! This crate defines the shapes that flow through the synchronization
//! pipeline:
//! - Record identity and sync metadata (`shouldIndex` flag + mark timestamp)
//! - The generic [`Record`] envelope and the [`Movie`] attribute set
//! - Search-engine task handles and search results
//!
//! Nothing here performs I/O. Store and search-engine adapters live in
//! `docsync-store` and `docsync-search`.

mod health;
mod record;
mod task;

pub use health::Health;
pub use record::{Movie, Record, RecordAttributes, RecordId, SyncMetadata};
pub use task::{SearchResult, TaskHandle, TaskStatus};

/// Primary-key field used by the search engine when none is configured.
pub const DEFAULT_PRIMARY_KEY: &str = "id";
