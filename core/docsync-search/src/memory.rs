//! In-memory index writer.

use crate::error::{IndexError, IndexResult};
use crate::writer::{IndexWriter, SearchEngine};
use async_trait::async_trait;
use chrono::Utc;
use docsync_types::{Health, Record, RecordAttributes, SearchResult, TaskHandle, TaskStatus};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

type Documents = BTreeMap<String, Value>;

/// Upsert-by-key index held in memory.
///
/// Tasks complete synchronously, so every returned handle is already
/// `Succeeded`.
#[derive(Default)]
pub struct MemoryIndex {
    indexes: Arc<RwLock<HashMap<String, Documents>>>,
    next_task_uid: AtomicU64,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents in `index`, ordered by primary key.
    pub async fn documents(&self, index: &str) -> Vec<Value> {
        self.indexes
            .read()
            .await
            .get(index)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn document(&self, index: &str, key: &str) -> Option<Value> {
        self.indexes.read().await.get(index)?.get(key).cloned()
    }

    /// Number of accepted submissions so far.
    pub fn submissions(&self) -> u64 {
        self.next_task_uid.load(Ordering::SeqCst)
    }
}

fn primary_key_value(document: &Value, primary_key: &str) -> IndexResult<String> {
    match document.get(primary_key) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(IndexError::MissingPrimaryKey {
            field: primary_key.to_string(),
        }),
    }
}

fn contains_text(value: &Value, needle: &str) -> bool {
    match value {
        Value::String(s) => s.to_lowercase().contains(needle),
        Value::Array(items) => items.iter().any(|v| contains_text(v, needle)),
        Value::Object(fields) => fields.values().any(|v| contains_text(v, needle)),
        _ => false,
    }
}

#[async_trait]
impl<A: RecordAttributes> IndexWriter<A> for MemoryIndex {
    async fn upsert(
        &self,
        index: &str,
        batch: &[Record<A>],
        primary_key: &str,
    ) -> IndexResult<TaskHandle> {
        if batch.is_empty() {
            return Err(IndexError::EmptyBatch);
        }

        // Validate the whole batch before touching the index.
        let mut keyed = Vec::with_capacity(batch.len());
        for record in batch {
            let document = serde_json::to_value(record)?;
            keyed.push((primary_key_value(&document, primary_key)?, document));
        }

        let mut indexes = self.indexes.write().await;
        let documents = indexes.entry(index.to_string()).or_default();
        for (key, document) in keyed {
            documents.insert(key, document);
        }

        Ok(TaskHandle {
            task_uid: self.next_task_uid.fetch_add(1, Ordering::SeqCst),
            index_uid: Some(index.to_string()),
            status: TaskStatus::Succeeded,
            kind: "documentAdditionOrUpdate".to_string(),
            enqueued_at: Utc::now(),
        })
    }
}

#[async_trait]
impl SearchEngine for MemoryIndex {
    async fn search(&self, index: &str, query: &str) -> IndexResult<SearchResult> {
        let needle = query.to_lowercase();
        let hits: Vec<Value> = self
            .documents(index)
            .await
            .into_iter()
            .filter(|doc| needle.is_empty() || contains_text(doc, &needle))
            .collect();

        Ok(SearchResult {
            estimated_total_hits: Some(hits.len() as u64),
            hits,
            query: query.to_string(),
            processing_time_ms: 0,
        })
    }

    async fn health(&self) -> Health {
        Health::Available
    }
}
