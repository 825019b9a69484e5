//! Command-line surface for docsync.
//!
//! Resolves flags and environment variables into the configs the library
//! crates expect. Anything missing or invalid becomes a
//! [`SyncError::Configuration`] before a run can start.

use clap::{Args, Parser, Subcommand};
use docsync_search::MeiliConfig;
use docsync_store::{DecodePolicy, MongoStoreConfig, SelectionWindow};
use docsync_sync::{SyncConfig, SyncError, SyncResult};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "docsync")]
#[command(version, about = "Push flagged MongoDB documents into a Meilisearch index")]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run a single sync pass and print the report
    Run,
    /// Run sync passes on a fixed interval until interrupted
    Watch {
        /// Seconds between the start of consecutive passes
        #[arg(long, default_value_t = 300)]
        interval_secs: u64,
    },
    /// Check that MongoDB and Meilisearch are reachable
    Health,
    /// Query the target index
    Search {
        query: String,
    },
    /// Show the state of an indexing task
    Task {
        uid: u64,
    },
}

/// Connection and selection settings shared by every command.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// MongoDB connection string
    #[arg(long, env = "MONGODB_URI", hide_env_values = true)]
    pub mongo_uri: Option<String>,

    /// MongoDB database holding the documents
    #[arg(long, env = "MONGODB_DATABASE", default_value = "LibreChat")]
    pub database: String,

    /// MongoDB collection holding the documents
    #[arg(long, env = "MONGODB_COLLECTION", default_value = "messages")]
    pub collection: String,

    /// Meilisearch base URL
    #[arg(long, env = "MEILI_HOST", default_value = "http://localhost:7700")]
    pub meili_host: String,

    /// Meilisearch API key
    #[arg(long, env = "MEILI_API_KEY", hide_env_values = true)]
    pub meili_api_key: Option<String>,

    /// Target Meilisearch index
    #[arg(long, env = "MEILI_INDEX", default_value = "movies")]
    pub index: String,

    /// Document field used as the search-engine primary key
    #[arg(long, default_value = "id")]
    pub primary_key: String,

    /// Only records marked within this many days are synced (0 disables)
    #[arg(long, env = "SYNC_WINDOW_DAYS", default_value_t = 7, allow_negative_numbers = true)]
    pub window_days: i64,

    /// Leave undecodable documents out instead of failing the run
    #[arg(long)]
    pub skip_bad_documents: bool,
}

impl ConnectionArgs {
    pub fn store_config(&self) -> SyncResult<MongoStoreConfig> {
        let uri = self
            .mongo_uri
            .as_deref()
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
            .ok_or_else(|| {
                SyncError::Configuration(
                    "you must set MONGODB_URI or pass --mongo-uri".to_string(),
                )
            })?;

        Ok(MongoStoreConfig {
            database: self.database.clone(),
            collection: self.collection.clone(),
            decode_policy: if self.skip_bad_documents {
                DecodePolicy::Skip
            } else {
                DecodePolicy::Abort
            },
            ..MongoStoreConfig::new(uri)
        })
    }

    pub fn meili_config(&self) -> MeiliConfig {
        MeiliConfig {
            host: self.meili_host.clone(),
            api_key: self.meili_api_key.clone().filter(|key| !key.is_empty()),
            ..Default::default()
        }
    }

    pub fn sync_config(&self) -> SyncResult<SyncConfig> {
        let config = SyncConfig {
            index_name: self.index.clone(),
            primary_key: self.primary_key.clone(),
            window: SelectionWindow::days(self.window_days)?,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Reachability of both collaborators, as printed by `health`.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub store: docsync_types::Health,
    pub search: docsync_types::Health,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.store.is_available() && self.search.is_available()
    }
}
