//! REST API: routing, handlers, and error mapping.
//!
//! Every handler works against a shared [`TaskStore`]. Failures are
//! answered with an [`ErrorBody`] (`{"error": "..."}`) and the matching
//! HTTP status: 400 for invalid names or malformed bodies, 404 for unknown
//! lists or tasks.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use tasklists_proto::api::{ErrorBody, NameBody, TaskListsBody, routes};
use tasklists_proto::{Task, TaskId, TaskList, TaskListId, TaskListSummary};

use crate::store::{StoreError, TaskStore};

/// Errors surfaced by API handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The store rejected the operation.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The request body could not be decoded.
    #[error("malformed request body: {0}")]
    MalformedBody(String),
}

impl ApiError {
    /// HTTP status this error is reported with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Store(StoreError::ListNotFound(_) | StoreError::TaskNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            Self::Store(StoreError::InvalidName(_)) | Self::MalformedBody(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::info!(status = status.as_u16(), error = %self, "request failed");
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Builds the API router, nested under `base_path` when it is not the root.
pub fn router(store: Arc<TaskStore>, base_path: &str) -> Router {
    let api = Router::new()
        .route(
            routes::TASK_LISTS,
            get(list_task_lists).post(create_task_list),
        )
        .route(
            routes::TASK_LIST,
            get(get_task_list).delete(delete_task_list),
        )
        .route(routes::LIST_TASKS, post(create_task))
        .route(routes::COMPLETED_TASKS, delete(clear_completed))
        .route(routes::TASK, put(update_task).delete(delete_task))
        .with_state(store);

    let base = normalize_base_path(base_path);
    let app = if base.is_empty() {
        api
    } else {
        Router::new().nest(&base, api)
    };
    app.layer(middleware::from_fn(log_request))
}

/// Normalizes a configured base path to `""` (root) or `/segment[/...]`
/// without a trailing slash.
#[must_use]
pub fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    tracing::debug!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        "handled request"
    );
    response
}

async fn list_task_lists(State(store): State<Arc<TaskStore>>) -> Json<TaskListsBody> {
    Json(TaskListsBody {
        task_lists: store.list_summaries().await,
    })
}

async fn create_task_list(
    State(store): State<Arc<TaskStore>>,
    body: Result<Json<NameBody>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskListSummary>), ApiError> {
    let Json(body) = body?;
    let created = store.create_list(&body.name).await?;
    tracing::info!(list_id = %created.id, name = %created.name, "task list created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_task_list(
    State(store): State<Arc<TaskStore>>,
    Path(id): Path<u64>,
) -> Result<Json<TaskList>, ApiError> {
    Ok(Json(store.get_list(TaskListId::new(id)).await?))
}

async fn delete_task_list(
    State(store): State<Arc<TaskStore>>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    let id = TaskListId::new(id);
    store.delete_list(id).await?;
    tracing::info!(list_id = %id, "task list deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn create_task(
    State(store): State<Arc<TaskStore>>,
    Path(id): Path<u64>,
    body: Result<Json<NameBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let Json(body) = body?;
    let list_id = TaskListId::new(id);
    let task = store.create_task(list_id, &body.name).await?;
    tracing::info!(list_id = %list_id, task_id = %task.id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// The path id is authoritative; an id inside the body is ignored.
async fn update_task(
    State(store): State<Arc<TaskStore>>,
    Path(id): Path<u64>,
    body: Result<Json<Task>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let Json(body) = body?;
    let task = store
        .update_task(TaskId::new(id), &body.name, body.completed)
        .await?;
    tracing::info!(task_id = %task.id, completed = task.completed, "task updated");
    Ok(Json(task))
}

async fn delete_task(
    State(store): State<Arc<TaskStore>>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    store.delete_task(TaskId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_completed(
    State(store): State<Arc<TaskStore>>,
    Path(id): Path<u64>,
) -> Result<Json<TaskList>, ApiError> {
    let list = store.clear_completed(TaskListId::new(id)).await?;
    tracing::info!(list_id = %list.id, remaining = list.remaining, "completed tasks cleared");
    Ok(Json(list))
}

/// Starts the server on `addr` with an empty store.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
    base_path: &str,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    start_server_with_store(addr, base_path, Arc::new(TaskStore::new())).await
}

/// Starts the server with a pre-populated [`TaskStore`] and returns the
/// bound address and a join handle.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server_with_store(
    addr: &str,
    base_path: &str,
    store: Arc<TaskStore>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let app = router(store, base_path);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "server error");
        }
    });

    Ok((bound_addr, handle))
}
