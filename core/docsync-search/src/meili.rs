//! Meilisearch index writer.
//!
//! Talks to the Meilisearch HTTP API directly:
//! - `POST /indexes/{uid}/documents?primaryKey=…` (add or replace)
//! - `POST /indexes/{uid}/search`
//! - `GET /tasks/{uid}`
//! - `GET /health`

use crate::error::{IndexError, IndexResult};
use crate::writer::{IndexWriter, SearchEngine};
use async_trait::async_trait;
use docsync_types::{Health, Record, RecordAttributes, SearchResult, TaskHandle};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Meilisearch connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeiliConfig {
    /// Base URL of the instance (e.g. `http://localhost:7700`).
    pub host: String,
    /// Sent as a bearer token when present.
    pub api_key: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for MeiliConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:7700".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

/// Error body returned by Meilisearch on non-2xx responses.
#[derive(Debug, Deserialize)]
struct MeiliErrorBody {
    message: String,
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HealthBody {
    status: String,
}

/// HTTP client for a single Meilisearch instance.
pub struct MeiliClient {
    config: MeiliConfig,
    client: Client,
}

impl MeiliClient {
    /// Creates a client. No request is made until the first call.
    pub fn new(config: MeiliConfig) -> IndexResult<Self> {
        if config.host.trim().is_empty() {
            return Err(IndexError::Config("host is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| IndexError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &MeiliConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.host.trim_end_matches('/'), path)
    }

    fn index_url(&self, index: &str, suffix: &str) -> String {
        self.url(&format!("/indexes/{}{}", urlencoding::encode(index), suffix))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.api_key.as_deref() {
            Some(key) if !key.is_empty() => request.bearer_auth(key),
            _ => request,
        }
    }

    /// Passes successful responses through and turns the rest into
    /// [`IndexError::Rejected`].
    async fn check(response: Response) -> IndexResult<Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(match serde_json::from_str::<MeiliErrorBody>(&body) {
            Ok(err) => IndexError::Rejected {
                status,
                code: err.code,
                message: err.message,
            },
            Err(_) => IndexError::Rejected {
                status,
                code: None,
                message: body,
            },
        })
    }

    /// Adds or replaces `documents` in `index`.
    pub async fn add_documents<T: Serialize + Sync>(
        &self,
        index: &str,
        documents: &[T],
        primary_key: &str,
    ) -> IndexResult<TaskHandle> {
        if documents.is_empty() {
            return Err(IndexError::EmptyBatch);
        }

        debug!("Submitting {} documents to index {}", documents.len(), index);

        let response = self
            .authorize(self.client.post(self.index_url(index, "/documents")))
            .query(&[("primaryKey", primary_key)])
            .json(documents)
            .send()
            .await?;
        let response = Self::check(response).await?;

        let task: TaskHandle = response.json().await?;
        info!(
            "Indexing task {} enqueued on {} ({} documents)",
            task.task_uid,
            index,
            documents.len()
        );
        Ok(task)
    }

    /// Looks up the current state of a task.
    pub async fn get_task(&self, task_uid: u64) -> IndexResult<TaskHandle> {
        let response = self
            .authorize(self.client.get(self.url(&format!("/tasks/{task_uid}"))))
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl<A: RecordAttributes> IndexWriter<A> for MeiliClient {
    async fn upsert(
        &self,
        index: &str,
        batch: &[Record<A>],
        primary_key: &str,
    ) -> IndexResult<TaskHandle> {
        self.add_documents(index, batch, primary_key).await
    }
}

#[async_trait]
impl SearchEngine for MeiliClient {
    async fn search(&self, index: &str, query: &str) -> IndexResult<SearchResult> {
        let response = self
            .authorize(self.client.post(self.index_url(index, "/search")))
            .json(&serde_json::json!({ "q": query }))
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    async fn health(&self) -> Health {
        let response = match self.client.get(self.url("/health")).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Meilisearch health check failed: {}", e);
                return Health::Unreachable(e.to_string());
            }
        };

        if !response.status().is_success() {
            return Health::Unreachable(format!("health endpoint returned {}", response.status()));
        }

        match response.json::<HealthBody>().await {
            Ok(body) if body.status == "available" => Health::Available,
            Ok(body) => Health::Unreachable(format!("status {}", body.status)),
            Err(e) => Health::Unreachable(format!("unreadable health response: {e}")),
        }
    }
}
