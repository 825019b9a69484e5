//! MongoDB-backed record store.
//!
//! Documents are read as raw BSON and decoded one by one so that a bad
//! document can be reported by its `_id`.

use crate::error::{StoreError, StoreResult};
use crate::query::Predicate;
use crate::store::{DecodeFailure, DecodePolicy, Fetched, RecordStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docsync_types::{Health, Record, RecordAttributes, RecordId, SyncMetadata};
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Bson, DateTime as BsonDateTime, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Flag field set by the upstream writer.
pub const DEFAULT_FLAG_FIELD: &str = "_meiliIndex";
/// Timestamp field bounded by the selection window.
pub const DEFAULT_MARKED_AT_FIELD: &str = "indexedDate";

/// Connection and mapping settings for [`MongoStore`].
#[derive(Debug, Clone)]
pub struct MongoStoreConfig {
    /// Connection string, e.g. `mongodb://localhost:27017`.
    pub uri: String,
    pub database: String,
    pub collection: String,
    /// Boolean field holding the `shouldIndex` flag.
    pub flag_field: String,
    /// Date field holding the last-marked timestamp.
    pub marked_at_field: String,
    pub decode_policy: DecodePolicy,
    pub connect_timeout: Duration,
    pub server_selection_timeout: Duration,
}

impl MongoStoreConfig {
    /// Config for `uri` with every other setting at its default.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Default::default()
        }
    }
}

impl Default for MongoStoreConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            database: "LibreChat".to_string(),
            collection: "messages".to_string(),
            flag_field: DEFAULT_FLAG_FIELD.to_string(),
            marked_at_field: DEFAULT_MARKED_AT_FIELD.to_string(),
            decode_policy: DecodePolicy::Abort,
            connect_timeout: Duration::from_secs(10),
            server_selection_timeout: Duration::from_secs(5),
        }
    }
}

/// Reads records from a single MongoDB collection.
pub struct MongoStore {
    client: Client,
    collection: Collection<Document>,
    config: MongoStoreConfig,
}

impl MongoStore {
    /// Parses the connection string and builds a client.
    ///
    /// The driver connects lazily, so an unreachable server only shows up
    /// on the first fetch or health check.
    pub async fn connect(config: MongoStoreConfig) -> StoreResult<Self> {
        if config.uri.trim().is_empty() {
            return Err(StoreError::Config("connection URI is empty".to_string()));
        }

        let mut options = ClientOptions::parse(&config.uri)
            .await
            .map_err(|e| StoreError::Config(format!("invalid connection URI: {e}")))?;
        options.app_name.get_or_insert_with(|| "docsync".to_string());
        options.connect_timeout = Some(config.connect_timeout);
        options.server_selection_timeout = Some(config.server_selection_timeout);

        let client = Client::with_options(options)?;
        info!(
            "MongoDB client ready for {}.{}",
            config.database, config.collection
        );
        Ok(Self::from_client(client, config))
    }

    /// Wraps an already-built client.
    pub fn from_client(client: Client, config: MongoStoreConfig) -> Self {
        let collection = client
            .database(&config.database)
            .collection::<Document>(&config.collection);
        Self {
            client,
            collection,
            config,
        }
    }

    pub fn config(&self) -> &MongoStoreConfig {
        &self.config
    }

    /// Translates the predicate into a `find` filter.
    pub fn filter_document(&self, predicate: &Predicate) -> Document {
        filter_document(
            predicate,
            &self.config.flag_field,
            &self.config.marked_at_field,
        )
    }
}

/// `{ <flag>: true, <marked_at>: { "$gte": threshold } }`.
pub fn filter_document(predicate: &Predicate, flag_field: &str, marked_at_field: &str) -> Document {
    let threshold = BsonDateTime::from_millis(predicate.threshold().timestamp_millis());
    let mut filter = Document::new();
    filter.insert(flag_field, true);
    filter.insert(marked_at_field, doc! { "$gte": threshold });
    filter
}

/// Splits a raw document into identity, sync metadata and attributes.
pub fn decode_document<A: RecordAttributes>(
    mut document: Document,
    flag_field: &str,
    marked_at_field: &str,
) -> Result<Record<A>, DecodeFailure> {
    let id = match document.remove("_id") {
        Some(Bson::String(s)) => RecordId::new(s),
        Some(Bson::ObjectId(oid)) => RecordId::new(oid.to_hex()),
        Some(Bson::Int32(n)) => RecordId::new(n.to_string()),
        Some(Bson::Int64(n)) => RecordId::new(n.to_string()),
        Some(other) => {
            return Err(DecodeFailure {
                id: None,
                reason: format!("unsupported _id type {:?}", other.element_type()),
            });
        }
        None => {
            return Err(DecodeFailure {
                id: None,
                reason: "document has no _id".to_string(),
            });
        }
    };

    let fail = |reason: String| DecodeFailure {
        id: Some(id.clone()),
        reason,
    };

    let should_index = match document.remove(flag_field) {
        None | Some(Bson::Null) => false,
        Some(Bson::Boolean(flag)) => flag,
        Some(other) => {
            return Err(fail(format!(
                "{flag_field} is {:?}, expected boolean",
                other.element_type()
            )));
        }
    };

    let last_marked_at = match document.remove(marked_at_field) {
        None | Some(Bson::Null) => None,
        Some(Bson::DateTime(dt)) => Some(
            DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis())
                .ok_or_else(|| fail(format!("{marked_at_field} is out of range")))?,
        ),
        Some(other) => {
            return Err(fail(format!(
                "{marked_at_field} is {:?}, expected date",
                other.element_type()
            )));
        }
    };

    let attributes: A = bson::from_document(document).map_err(|e| fail(e.to_string()))?;

    Ok(Record {
        id,
        attributes,
        sync: SyncMetadata {
            should_index,
            last_marked_at,
        },
    })
}

/// Decodes a query result according to `policy`.
///
/// `Abort` stops at the first undecodable document. `Skip` keeps going and
/// collects the failures in [`Fetched::rejected`].
pub fn collect_documents<A, I>(
    documents: I,
    policy: DecodePolicy,
    flag_field: &str,
    marked_at_field: &str,
) -> StoreResult<Fetched<A>>
where
    A: RecordAttributes,
    I: IntoIterator<Item = Document>,
{
    let mut fetched = Fetched::new(Vec::new());

    for document in documents {
        match decode_document::<A>(document, flag_field, marked_at_field) {
            Ok(record) => fetched.records.push(record),
            Err(failure) => match policy {
                DecodePolicy::Abort => {
                    return Err(StoreError::Decode {
                        id: failure.id,
                        reason: failure.reason,
                    });
                }
                DecodePolicy::Skip => {
                    warn!(
                        "Skipping undecodable document {:?}: {}",
                        failure.id.as_ref().map(RecordId::as_str),
                        failure.reason
                    );
                    fetched.rejected.push(failure);
                }
            },
        }
    }

    Ok(fetched)
}

#[async_trait]
impl<A: RecordAttributes> RecordStore<A> for MongoStore {
    async fn fetch(&self, predicate: &Predicate) -> StoreResult<Fetched<A>> {
        let filter = self.filter_document(predicate);
        debug!("Querying {} with filter {}", self.config.collection, filter);

        let documents: Vec<Document> = self.collection.find(filter).await?.try_collect().await?;
        let fetched = collect_documents::<A, _>(
            documents,
            self.config.decode_policy,
            &self.config.flag_field,
            &self.config.marked_at_field,
        )?;

        info!(
            "Got {} documents from MongoDB ({} rejected)",
            fetched.records.len(),
            fetched.rejected.len()
        );
        Ok(fetched)
    }

    async fn health_check(&self) -> Health {
        match self
            .client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
        {
            Ok(_) => Health::Available,
            Err(e) => {
                warn!("MongoDB ping failed: {}", e);
                Health::Unreachable(e.to_string())
            }
        }
    }
}
