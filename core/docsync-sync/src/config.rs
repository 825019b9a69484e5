//! Orchestrator configuration.

use crate::error::{SyncError, SyncResult};
use docsync_store::SelectionWindow;
use docsync_types::DEFAULT_PRIMARY_KEY;

/// Parameters of a sync run, already resolved by the host.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Target search index.
    pub index_name: String,
    /// Field the search engine keys documents by.
    pub primary_key: String,
    /// How far back to look for marked records.
    pub window: SelectionWindow,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            index_name: "movies".to_string(),
            primary_key: DEFAULT_PRIMARY_KEY.to_string(),
            window: SelectionWindow::default(),
        }
    }
}

impl SyncConfig {
    /// Rejects configurations no run could succeed with.
    pub fn validate(&self) -> SyncResult<()> {
        if self.index_name.trim().is_empty() {
            return Err(SyncError::Configuration("index name is empty".to_string()));
        }
        if self.primary_key.trim().is_empty() {
            return Err(SyncError::Configuration(
                "primary key field is empty".to_string(),
            ));
        }
        Ok(())
    }
}
