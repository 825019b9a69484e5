//! Index writer and search abstractions.

use crate::error::IndexResult;
use async_trait::async_trait;
use docsync_types::{Health, Record, RecordAttributes, SearchResult, TaskHandle};

/// Write side of the pipeline.
///
/// Upserts replace any existing document with the same primary key, so
/// submitting the same records twice leaves the index unchanged.
#[async_trait]
pub trait IndexWriter<A: RecordAttributes>: Send + Sync {
    /// Submits `batch` to `index`, keyed by `primary_key`.
    ///
    /// Returns once the engine has acknowledged the submission.
    async fn upsert(
        &self,
        index: &str,
        batch: &[Record<A>],
        primary_key: &str,
    ) -> IndexResult<TaskHandle>;
}

/// Read access to the search engine.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    async fn search(&self, index: &str, query: &str) -> IndexResult<SearchResult>;

    async fn health(&self) -> Health;
}
