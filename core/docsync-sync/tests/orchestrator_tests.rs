use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use docsync_search::{IndexError, IndexResult, IndexWriter, MemoryIndex};
use docsync_store::{
    DecodeFailure, Fetched, MemoryStore, Predicate, RecordStore, SelectionWindow, StoreError,
    StoreResult,
};
use docsync_sync::{RunState, SyncConfig, SyncError, SyncErrorKind, SyncFailure, SyncOrchestrator};
use docsync_types::{Health, Movie, Record, RecordId, SyncMetadata, TaskHandle, TaskStatus};
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
}

fn movie(id: &str, sync: SyncMetadata) -> Record<Movie> {
    Record::new(
        id,
        Movie {
            title: format!("Title {id}"),
            year: 2000,
            rating: 7.0,
            genres: vec!["drama".to_string()],
        },
        sync,
    )
}

fn scenario_records() -> Vec<Record<Movie>> {
    vec![
        movie("m1", SyncMetadata::marked(now() - Duration::days(1))),
        movie("m2", SyncMetadata::unmarked(now() - Duration::days(1))),
        movie("m3", SyncMetadata::marked(now() - Duration::days(30))),
    ]
}

// ── Test collaborators ───────────────────────────────────────────

/// One captured `upsert` call: index, record ids, primary key.
type Call = (String, Vec<String>, String);

#[derive(Default)]
struct RecordingWriter {
    calls: Mutex<Vec<Call>>,
    reject: bool,
}

impl RecordingWriter {
    fn rejecting() -> Self {
        Self {
            reject: true,
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl IndexWriter<Movie> for RecordingWriter {
    async fn upsert(
        &self,
        index: &str,
        batch: &[Record<Movie>],
        primary_key: &str,
    ) -> IndexResult<TaskHandle> {
        self.calls.lock().unwrap().push((
            index.to_string(),
            batch.iter().map(|r| r.id.to_string()).collect(),
            primary_key.to_string(),
        ));
        if self.reject {
            return Err(IndexError::Rejected {
                status: 400,
                code: Some("invalid_document_id".to_string()),
                message: "bad document".to_string(),
            });
        }
        Ok(TaskHandle {
            task_uid: 42,
            index_uid: Some(index.to_string()),
            status: TaskStatus::Enqueued,
            kind: "documentAdditionOrUpdate".to_string(),
            enqueued_at: now(),
        })
    }
}

enum Failure {
    Unavailable,
    Decode,
}

struct FailingStore(Failure);

#[async_trait]
impl RecordStore<Movie> for FailingStore {
    async fn fetch(&self, _predicate: &Predicate) -> StoreResult<Fetched<Movie>> {
        Err(match self.0 {
            Failure::Unavailable => StoreError::Unavailable("connection refused".to_string()),
            Failure::Decode => StoreError::Decode {
                id: Some(RecordId::new("m9")),
                reason: "year is string, expected integer".to_string(),
            },
        })
    }

    async fn health_check(&self) -> Health {
        Health::Unreachable("down".to_string())
    }
}

/// Returns a fixed batch plus a fixed list of rejected documents.
struct PartialStore;

#[async_trait]
impl RecordStore<Movie> for PartialStore {
    async fn fetch(&self, _predicate: &Predicate) -> StoreResult<Fetched<Movie>> {
        Ok(Fetched {
            records: vec![movie("good", SyncMetadata::marked(now()))],
            rejected: vec![DecodeFailure {
                id: Some(RecordId::new("bad")),
                reason: "rating is string".to_string(),
            }],
        })
    }

    async fn health_check(&self) -> Health {
        Health::Available
    }
}

/// Parks inside `fetch` until released.
#[derive(Default)]
struct BlockingStore {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl RecordStore<Movie> for BlockingStore {
    async fn fetch(&self, _predicate: &Predicate) -> StoreResult<Fetched<Movie>> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(Fetched::new(Vec::new()))
    }

    async fn health_check(&self) -> Health {
        Health::Available
    }
}

fn orchestrator(
    store: Arc<dyn RecordStore<Movie>>,
    writer: Arc<dyn IndexWriter<Movie>>,
) -> SyncOrchestrator<Movie> {
    SyncOrchestrator::new(SyncConfig::default(), store, writer).unwrap()
}

// ── Happy path ───────────────────────────────────────────────────

#[tokio::test]
async fn end_to_end_selects_only_flagged_recent_records() {
    let store = Arc::new(MemoryStore::with_records(scenario_records()));
    let writer = Arc::new(RecordingWriter::default());
    let orch = orchestrator(store, writer.clone());

    let report = orch.run_at(now()).await.unwrap();

    assert_eq!(
        writer.calls(),
        vec![(
            "movies".to_string(),
            vec!["m1".to_string()],
            "id".to_string()
        )]
    );
    assert_eq!(report.records_indexed, 1);
    assert_eq!(report.task.as_ref().map(|t| t.task_uid), Some(42));
    assert_eq!(report.index, "movies");
    assert!(report.rejected.is_empty());
    assert_eq!(orch.state().await, RunState::Done);
}

#[tokio::test]
async fn boundary_record_is_included() {
    let store = Arc::new(MemoryStore::with_records(vec![movie(
        "edge",
        SyncMetadata::marked(now() - Duration::days(7)),
    )]));
    let writer = Arc::new(RecordingWriter::default());
    let orch = orchestrator(store, writer.clone());

    let report = orch.run_at(now()).await.unwrap();
    assert_eq!(report.records_indexed, 1);
    assert_eq!(writer.calls()[0].1, vec!["edge".to_string()]);
}

#[tokio::test]
async fn custom_index_and_window_are_used() {
    let store = Arc::new(MemoryStore::with_records(scenario_records()));
    let writer = Arc::new(RecordingWriter::default());
    let config = SyncConfig {
        index_name: "films".to_string(),
        primary_key: "id".to_string(),
        window: SelectionWindow::days(60).unwrap(),
    };
    let orch = SyncOrchestrator::<Movie>::new(config, store, writer.clone()).unwrap();

    orch.run_at(now()).await.unwrap();
    let calls = writer.calls();
    assert_eq!(calls[0].0, "films");
    assert_eq!(calls[0].1, vec!["m1".to_string(), "m3".to_string()]);
}

// ── Empty batch short-circuit ────────────────────────────────────

#[tokio::test]
async fn empty_selection_never_calls_writer() {
    let store = Arc::new(MemoryStore::with_records(vec![movie(
        "m2",
        SyncMetadata::unmarked(now()),
    )]));
    let writer = Arc::new(RecordingWriter::default());
    let orch = orchestrator(store, writer.clone());

    let report = orch.run_at(now()).await.unwrap();

    assert!(writer.calls().is_empty());
    assert_eq!(report.records_indexed, 0);
    assert!(report.task.is_none());
    assert_eq!(orch.state().await, RunState::Done);
}

// ── Failures ─────────────────────────────────────────────────────

#[tokio::test]
async fn store_unavailable_aborts_before_write() {
    let writer = Arc::new(RecordingWriter::default());
    let orch = orchestrator(Arc::new(FailingStore(Failure::Unavailable)), writer.clone());

    let err = orch.run_at(now()).await.unwrap_err();

    assert_eq!(err.kind(), SyncErrorKind::StoreUnavailable);
    assert!(writer.calls().is_empty());
    assert_eq!(orch.state().await, RunState::FetchFailed);
}

#[tokio::test]
async fn decode_error_names_the_record() {
    let writer = Arc::new(RecordingWriter::default());
    let orch = orchestrator(Arc::new(FailingStore(Failure::Decode)), writer.clone());

    let err = orch.run_at(now()).await.unwrap_err();

    assert_eq!(err.kind(), SyncErrorKind::RecordDecode);
    assert_eq!(err.record_id(), Some(&RecordId::new("m9")));
    assert!(writer.calls().is_empty());

    let failure = SyncFailure::from(&err);
    assert_eq!(failure.record_id.as_deref(), Some("m9"));

    let json = serde_json::to_value(&failure).unwrap();
    assert_eq!(json["kind"], "RecordDecodeError");
    assert_eq!(json["recordId"], "m9");
}

#[tokio::test]
async fn rejected_submission_is_write_failed() {
    let store = Arc::new(MemoryStore::with_records(scenario_records()));
    let writer = Arc::new(RecordingWriter::rejecting());
    let orch = orchestrator(store, writer.clone());

    let err = orch.run_at(now()).await.unwrap_err();

    assert!(matches!(err, SyncError::IndexSubmission(IndexError::Rejected { status: 400, .. })));
    assert_eq!(writer.calls().len(), 1);
    assert_eq!(orch.state().await, RunState::WriteFailed);
}

#[tokio::test]
async fn failed_run_does_not_poison_next_run() {
    let store = Arc::new(MemoryStore::with_records(scenario_records()));
    let rejecting = orchestrator(store.clone(), Arc::new(RecordingWriter::rejecting()));
    assert!(rejecting.run_at(now()).await.is_err());
    assert!(rejecting.run_at(now()).await.is_err());

    let healthy = orchestrator(store, Arc::new(RecordingWriter::default()));
    assert_eq!(healthy.run_at(now()).await.unwrap().records_indexed, 1);
}

// ── Skip policy passthrough ──────────────────────────────────────

#[tokio::test]
async fn rejected_documents_are_reported() {
    let writer = Arc::new(RecordingWriter::default());
    let orch = orchestrator(Arc::new(PartialStore), writer.clone());

    let report = orch.run_at(now()).await.unwrap();

    assert_eq!(report.records_indexed, 1);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].id, Some(RecordId::new("bad")));
}

// ── Idempotence ──────────────────────────────────────────────────

#[tokio::test]
async fn repeated_runs_leave_same_index_contents() {
    let store = Arc::new(MemoryStore::with_records(scenario_records()));
    let index = Arc::new(MemoryIndex::new());
    let orch = orchestrator(store, index.clone());

    orch.run_at(now()).await.unwrap();
    let after_first = index.documents("movies").await;

    orch.run_at(now()).await.unwrap();
    let after_second = index.documents("movies").await;

    assert_eq!(after_first, after_second);
    assert_eq!(after_second.len(), 1);
    assert_eq!(index.submissions(), 2);
}

#[tokio::test]
async fn indexed_documents_exclude_sync_metadata() {
    let store = Arc::new(MemoryStore::with_records(scenario_records()));
    let index = Arc::new(MemoryIndex::new());
    let orch = orchestrator(store, index.clone());

    orch.run_at(now()).await.unwrap();

    let doc = index.document("movies", "m1").await.unwrap();
    assert_eq!(
        doc,
        serde_json::json!({
            "id": "m1",
            "title": "Title m1",
            "year": 2000,
            "rating": 7.0,
            "genres": ["drama"]
        })
    );
}

// ── Transform ────────────────────────────────────────────────────

#[tokio::test]
async fn transform_rewrites_attributes_only() {
    let store = Arc::new(MemoryStore::with_records(scenario_records()));
    let index = Arc::new(MemoryIndex::new());
    let orch = orchestrator(store, index.clone()).with_transform(|mut m: Movie| {
        m.title = m.title.to_uppercase();
        m
    });

    orch.run_at(now()).await.unwrap();

    let doc = index.document("movies", "m1").await.unwrap();
    assert_eq!(doc["title"], "TITLE M1");
    assert_eq!(doc["id"], "m1");
}

// ── Run serialization ────────────────────────────────────────────

#[tokio::test]
async fn overlapping_run_is_refused() {
    let store = Arc::new(BlockingStore::default());
    let orch = Arc::new(orchestrator(store.clone(), Arc::new(RecordingWriter::default())));

    let first = {
        let orch = orch.clone();
        tokio::spawn(async move { orch.run_at(now()).await })
    };
    store.entered.notified().await;
    assert_eq!(orch.state().await, RunState::Fetching);

    let err = orch.run_at(now()).await.unwrap_err();
    assert_eq!(err.kind(), SyncErrorKind::RunInProgress);

    store.release.notify_one();
    let report = first.await.unwrap().unwrap();
    assert_eq!(report.records_indexed, 0);

    // Guard is released once the first run finishes.
    store.release.notify_one();
    assert!(orch.run_at(now()).await.is_ok());
}

// ── Construction & reporting ─────────────────────────────────────

#[tokio::test]
async fn new_orchestrator_is_idle() {
    let orch = orchestrator(
        Arc::new(MemoryStore::<Movie>::new()),
        Arc::new(RecordingWriter::default()),
    );
    assert_eq!(orch.state().await, RunState::Idle);
    assert!(!orch.state().await.is_terminal());
}

#[test]
fn empty_index_name_is_configuration_error() {
    let config = SyncConfig {
        index_name: String::new(),
        ..Default::default()
    };
    let result = SyncOrchestrator::<Movie>::new(
        config,
        Arc::new(MemoryStore::<Movie>::new()),
        Arc::new(RecordingWriter::default()),
    );
    assert!(matches!(result, Err(SyncError::Configuration(_))));
}

#[test]
fn empty_primary_key_is_configuration_error() {
    let config = SyncConfig {
        primary_key: " ".to_string(),
        ..Default::default()
    };
    assert_eq!(config.validate().unwrap_err().kind(), SyncErrorKind::Configuration);
}

#[tokio::test]
async fn report_serializes_camel_case() {
    let store = Arc::new(MemoryStore::with_records(scenario_records()));
    let orch = orchestrator(store, Arc::new(RecordingWriter::default()));

    let report = orch.run_at(now()).await.unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["recordsIndexed"], 1);
    assert_eq!(json["task"]["taskUid"], 42);
    assert!(json["runId"].is_string());
    assert!(report.finished_at >= report.started_at);
}
