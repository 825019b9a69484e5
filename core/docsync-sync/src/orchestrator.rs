//! Sync orchestrator: read, transform, write, report.
//!
//! The orchestrator owns no I/O of its own. It drives a [`RecordStore`] and
//! an [`IndexWriter`] supplied at construction.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::report::{RunState, SyncReport};
use chrono::{DateTime, Utc};
use docsync_search::IndexWriter;
use docsync_store::{Fetched, RecordStore};
use docsync_types::{Record, RecordAttributes};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Attribute rewrite applied to every selected record before writing.
pub type Transform<A> = Arc<dyn Fn(A) -> A + Send + Sync>;

/// Runs the selective sync pipeline.
///
/// Runs are serialized: while one is in flight, further calls fail with
/// [`SyncError::RunInProgress`] instead of racing on upsert order.
pub struct SyncOrchestrator<A> {
    config: SyncConfig,
    store: Arc<dyn RecordStore<A>>,
    writer: Arc<dyn IndexWriter<A>>,
    transform: Option<Transform<A>>,
    state: Arc<RwLock<RunState>>,
    run_guard: Mutex<()>,
}

impl<A: RecordAttributes> SyncOrchestrator<A> {
    /// Creates an orchestrator. Fails with
    /// [`SyncError::Configuration`] before any run can start.
    pub fn new(
        config: SyncConfig,
        store: Arc<dyn RecordStore<A>>,
        writer: Arc<dyn IndexWriter<A>>,
    ) -> SyncResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            writer,
            transform: None,
            state: Arc::new(RwLock::new(RunState::Idle)),
            run_guard: Mutex::new(()),
        })
    }

    /// Sets an attribute rewrite. Record identity and sync metadata are
    /// never passed to it.
    pub fn with_transform(mut self, transform: impl Fn(A) -> A + Send + Sync + 'static) -> Self {
        self.transform = Some(Arc::new(transform));
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// State reached by the latest run, `Idle` before the first.
    pub async fn state(&self) -> RunState {
        *self.state.read().await
    }

    async fn transition(&self, run_id: Uuid, next: RunState) {
        let mut state = self.state.write().await;
        debug!(%run_id, "Run state {:?} -> {:?}", *state, next);
        *state = next;
    }

    /// Runs one pass with the window anchored at the current time.
    pub async fn run(&self) -> SyncResult<SyncReport> {
        self.run_at(Utc::now()).await
    }

    /// Runs one pass with the window anchored at `now`.
    pub async fn run_at(&self, now: DateTime<Utc>) -> SyncResult<SyncReport> {
        let _guard = self
            .run_guard
            .try_lock()
            .map_err(|_| SyncError::RunInProgress)?;

        let run_id = Uuid::now_v7();
        let started_at = Utc::now();
        let predicate = self.config.window.build_filter_at(now);
        info!(
            %run_id,
            "Starting sync into {} (records marked since {})",
            self.config.index_name,
            predicate.threshold()
        );

        self.transition(run_id, RunState::Fetching).await;
        let Fetched { records, rejected } = match self.store.fetch(&predicate).await {
            Ok(fetched) => fetched,
            Err(e) => {
                self.transition(run_id, RunState::FetchFailed).await;
                warn!(%run_id, "Fetch failed: {}", e);
                return Err(e.into());
            }
        };
        self.transition(run_id, RunState::Fetched).await;

        let batch: Vec<Record<A>> = match &self.transform {
            Some(transform) => records
                .into_iter()
                .map(|r| r.map_attributes(transform.as_ref()))
                .collect(),
            None => records,
        };

        let mut report = SyncReport {
            run_id,
            index: self.config.index_name.clone(),
            records_indexed: 0,
            rejected,
            task: None,
            started_at,
            finished_at: started_at,
        };

        if batch.is_empty() {
            self.transition(run_id, RunState::Done).await;
            info!(%run_id, "No records selected; nothing to index");
            report.finished_at = Utc::now();
            return Ok(report);
        }

        self.transition(run_id, RunState::Writing).await;
        let task = match self
            .writer
            .upsert(&self.config.index_name, &batch, &self.config.primary_key)
            .await
        {
            Ok(task) => task,
            Err(e) => {
                self.transition(run_id, RunState::WriteFailed).await;
                warn!(%run_id, "Index submission failed: {}", e);
                return Err(SyncError::from(e));
            }
        };
        self.transition(run_id, RunState::Done).await;

        info!(%run_id, "Submitted {} records: {}", batch.len(), task);
        report.records_indexed = batch.len();
        report.task = Some(task);
        report.finished_at = Utc::now();
        Ok(report)
    }
}
