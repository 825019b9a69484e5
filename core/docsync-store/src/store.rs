//! Store reader abstraction.

use crate::error::StoreResult;
use crate::query::Predicate;
use async_trait::async_trait;
use docsync_types::{Health, Record, RecordAttributes, RecordId};
use serde::Serialize;

/// What a reader does when a stored document cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodePolicy {
    /// Fail the whole read on the first bad document.
    #[default]
    Abort,
    /// Leave bad documents out of the batch and report them alongside it.
    Skip,
}

/// A document left out of a batch under [`DecodePolicy::Skip`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodeFailure {
    pub id: Option<RecordId>,
    pub reason: String,
}

/// Records produced by one read, in store-native order.
#[derive(Debug, Clone)]
pub struct Fetched<A> {
    pub records: Vec<Record<A>>,
    /// Always empty under [`DecodePolicy::Abort`].
    pub rejected: Vec<DecodeFailure>,
}

impl<A> Fetched<A> {
    pub fn new(records: Vec<Record<A>>) -> Self {
        Self {
            records,
            rejected: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Read side of the pipeline.
///
/// A fetch is a single, all-or-nothing pass: either every eligible record
/// comes back or an error does.
#[async_trait]
pub trait RecordStore<A: RecordAttributes>: Send + Sync {
    /// Returns every record matching `predicate`.
    async fn fetch(&self, predicate: &Predicate) -> StoreResult<Fetched<A>>;

    /// Checks that the store is reachable.
    async fn health_check(&self) -> Health;
}
