//! In-memory record store.

use crate::error::StoreResult;
use crate::query::Predicate;
use crate::store::{Fetched, RecordStore};
use async_trait::async_trait;
use docsync_types::{Health, Record, RecordAttributes, RecordId};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Holds records in insertion order and filters them with the predicate.
pub struct MemoryStore<A> {
    records: Arc<RwLock<Vec<Record<A>>>>,
}

impl<A: RecordAttributes> MemoryStore<A> {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: Vec<Record<A>>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    /// Inserts a record, replacing any existing record with the same ID.
    pub async fn put(&self, record: Record<A>) {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
    }

    pub async fn remove(&self, id: &RecordId) -> Option<Record<A>> {
        let mut records = self.records.write().await;
        let pos = records.iter().position(|r| &r.id == id)?;
        Some(records.remove(pos))
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl<A: RecordAttributes> Default for MemoryStore<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<A: RecordAttributes> RecordStore<A> for MemoryStore<A> {
    async fn fetch(&self, predicate: &Predicate) -> StoreResult<Fetched<A>> {
        let records = self.records.read().await;
        let selected: Vec<Record<A>> = records
            .iter()
            .filter(|r| predicate.matches(&r.sync))
            .cloned()
            .collect();
        debug!(
            "Selected {} of {} in-memory records",
            selected.len(),
            records.len()
        );
        Ok(Fetched::new(selected))
    }

    async fn health_check(&self) -> Health {
        Health::Available
    }
}
