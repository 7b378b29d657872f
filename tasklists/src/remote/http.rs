//! REST client for the task list store.
//!
//! Talks JSON over HTTP to any server implementing the task list REST
//! contract (see `tasklists_proto::api`). Each request carries the
//! configured timeout; nothing is retried.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tasklists_proto::api::{ErrorBody, NameBody, TaskListsBody, paths};
use tasklists_proto::{Task, TaskList, TaskListId, TaskListSummary};
use url::Url;

use super::{RemoteError, RemoteStore};

/// Errors building an [`HttpRemoteStore`].
#[derive(Debug, thiserror::Error)]
pub enum HttpStoreError {
    /// The base URL could not be parsed.
    #[error("invalid API url {url}: {source}")]
    InvalidUrl {
        /// The rejected input.
        url: String,
        /// Parser error.
        source: url::ParseError,
    },

    /// The base URL is not `http` or `https`.
    #[error("unsupported API url scheme: {0}")]
    UnsupportedScheme(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// [`RemoteStore`] speaking the REST contract through reqwest.
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    client: Client,
    /// Base URL without a trailing slash, e.g. `http://127.0.0.1:8080/api`.
    base: String,
}

impl HttpRemoteStore {
    /// Creates a client rooted at `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`HttpStoreError`] if the URL is invalid or not HTTP(S), or
    /// the underlying client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, HttpStoreError> {
        let url = Url::parse(base_url).map_err(|source| HttpStoreError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(HttpStoreError::UnsupportedScheme(url.scheme().to_string()));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base: url.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// The normalized base URL requests are sent under.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    /// Sends the request and returns the body of a successful response.
    async fn send(&self, request: RequestBuilder) -> Result<String, RemoteError> {
        let response = request.send().await.map_err(|e| RemoteError::Transport {
            reason: e.to_string(),
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|e| RemoteError::Transport {
            reason: format!("failed to read response: {e}"),
        })?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(status_error(status, &body))
        }
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, RemoteError> {
        let body = self.send(request).await?;
        decode(&body)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, RemoteError> {
    serde_json::from_str(body).map_err(|e| RemoteError::Decode {
        reason: e.to_string(),
    })
}

/// Maps a non-success response, preferring the server's `{"error": ...}`
/// message over the bare status text.
fn status_error(status: StatusCode, body: &str) -> RemoteError {
    let reason = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .ok()
        .filter(|e| !e.is_empty())
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| status.to_string());
    RemoteError::Status {
        status: status.as_u16(),
        reason,
    }
}

impl RemoteStore for HttpRemoteStore {
    async fn list_task_lists(&self) -> Result<Vec<TaskListSummary>, RemoteError> {
        let request = self.client.get(self.endpoint(&paths::task_lists()));
        let body: TaskListsBody = self.request_json(request).await?;
        Ok(body.task_lists)
    }

    async fn create_task_list(&self, name: &str) -> Result<TaskListSummary, RemoteError> {
        let request = self
            .client
            .post(self.endpoint(&paths::task_lists()))
            .json(&NameBody::new(name));
        self.request_json(request).await
    }

    async fn delete_task_list(&self, id: TaskListId) -> Result<(), RemoteError> {
        let request = self.client.delete(self.endpoint(&paths::task_list(id)));
        self.send(request).await.map(drop)
    }

    async fn get_task_list(&self, id: TaskListId) -> Result<TaskList, RemoteError> {
        let request = self.client.get(self.endpoint(&paths::task_list(id)));
        self.request_json(request).await
    }

    async fn create_task(&self, list_id: TaskListId, name: &str) -> Result<Task, RemoteError> {
        let request = self
            .client
            .post(self.endpoint(&paths::list_tasks(list_id)))
            .json(&NameBody::new(name));
        self.request_json(request).await
    }

    async fn update_task(&self, task: &Task) -> Result<Option<Task>, RemoteError> {
        let request = self
            .client
            .put(self.endpoint(&paths::task(task.id)))
            .json(task);
        let body = self.send(request).await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        decode(&body).map(Some)
    }

    async fn clear_completed(&self, list_id: TaskListId) -> Result<TaskList, RemoteError> {
        let request = self
            .client
            .delete(self.endpoint(&paths::completed_tasks(list_id)));
        self.request_json(request).await
    }
}
