//! The synchronizable record model.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a record, shared by the document store and the
/// search index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Creates a record ID from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Synchronization metadata written by the upstream producer.
///
/// The pipeline only ever reads these fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncMetadata {
    /// Set when the record is ready to be pushed to the search index.
    pub should_index: bool,
    /// When the record was last marked. Records without a mark are never
    /// selected.
    pub last_marked_at: Option<DateTime<Utc>>,
}

impl SyncMetadata {
    /// Metadata for a record flagged for indexing at `at`.
    #[must_use]
    pub fn marked(at: DateTime<Utc>) -> Self {
        Self {
            should_index: true,
            last_marked_at: Some(at),
        }
    }

    /// Metadata for a record that was touched at `at` but not flagged.
    #[must_use]
    pub fn unmarked(at: DateTime<Utc>) -> Self {
        Self {
            should_index: false,
            last_marked_at: Some(at),
        }
    }
}

/// Bound satisfied by any attribute set the pipeline can carry.
pub trait RecordAttributes:
    Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static
{
}

impl<T> RecordAttributes for T where
    T: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static
{
}

/// One synchronizable entity.
///
/// Serializes to the search-engine document shape: `id` plus the flattened
/// attributes. Sync metadata stays on the store side and is never sent to
/// the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<A> {
    /// Store and search-engine primary key.
    pub id: RecordId,
    /// Indexable attributes, opaque to the pipeline.
    #[serde(flatten)]
    pub attributes: A,
    /// Flag + timestamp consulted by the selection predicate.
    #[serde(skip)]
    pub sync: SyncMetadata,
}

impl<A> Record<A> {
    /// Creates a record with the given identity, attributes and metadata.
    pub fn new(id: impl Into<RecordId>, attributes: A, sync: SyncMetadata) -> Self {
        Self {
            id: id.into(),
            attributes,
            sync,
        }
    }

    /// Applies `f` to the attributes, keeping identity and metadata.
    pub fn map_attributes<B>(self, f: impl FnOnce(A) -> B) -> Record<B> {
        Record {
            id: self.id,
            attributes: f(self.attributes),
            sync: self.sync,
        }
    }
}

/// Attributes of a movie document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Movie {
    pub title: String,
    pub year: i32,
    pub rating: f64,
    pub genres: Vec<String>,
}
