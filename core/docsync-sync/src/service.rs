//! Single-record operations around the same collaborators.

use crate::error::{SyncError, SyncResult};
use docsync_search::IndexWriter;
use docsync_store::RecordStore;
use docsync_types::{Health, Record, RecordAttributes, TaskHandle};
use std::sync::Arc;
use tracing::debug;

/// Store health checks and one-off indexing.
pub struct RecordService<A> {
    store: Arc<dyn RecordStore<A>>,
    writer: Arc<dyn IndexWriter<A>>,
}

impl<A: RecordAttributes> RecordService<A> {
    pub fn new(store: Arc<dyn RecordStore<A>>, writer: Arc<dyn IndexWriter<A>>) -> Self {
        Self { store, writer }
    }

    /// Pings the store.
    pub async fn health_check(&self) -> SyncResult<()> {
        match self.store.health_check().await {
            Health::Available => Ok(()),
            Health::Unreachable(reason) => Err(SyncError::StoreUnavailable(reason)),
        }
    }

    /// Indexes one record outside of any selection window.
    pub async fn index_one(
        &self,
        index: &str,
        record: &Record<A>,
        primary_key: &str,
    ) -> SyncResult<TaskHandle> {
        debug!("Indexing record {} into {}", record.id, index);
        Ok(self
            .writer
            .upsert(index, std::slice::from_ref(record), primary_key)
            .await?)
    }
}
