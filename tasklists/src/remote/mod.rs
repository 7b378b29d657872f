//! Remote store client contract.
//!
//! Defines the [`RemoteStore`] trait that every store client must satisfy.
//! Concrete implementations include:
//! - [`http::HttpRemoteStore`]: REST client over HTTP (reqwest)
//! - [`memory::InMemoryRemoteStore`]: in-process store for the offline
//!   demo mode and for tests
//!
//! Every call is single-shot: no retries happen at this layer. Failures are
//! returned as [`RemoteError`] and never panic.

pub mod http;
pub mod memory;

use tasklists_proto::{Task, TaskList, TaskListId, TaskListSummary};

/// Errors reported by a remote store call.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RemoteError {
    /// The request never produced a response (connection refused, timeout).
    #[error("request failed: {reason}")]
    Transport {
        /// What went wrong.
        reason: String,
    },

    /// The store answered with a non-success status.
    #[error("store returned {status}: {reason}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body, or the status text.
        reason: String,
    },

    /// The response body could not be decoded.
    #[error("malformed response: {reason}")]
    Decode {
        /// Decoder error message.
        reason: String,
    },
}

impl RemoteError {
    /// Returns the failure reason regardless of the variant.
    #[must_use]
    pub fn reason(&self) -> &str {
        match self {
            Self::Transport { reason } | Self::Status { reason, .. } | Self::Decode { reason } => {
                reason
            }
        }
    }

    /// Whether the store reported that the addressed entity does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

/// Async CRUD contract against the task list store.
///
/// Each method either returns the store-confirmed entity or fails with a
/// [`RemoteError`]. Implementations must be usable from spawned tokio
/// tasks, hence the `Send` futures.
pub trait RemoteStore: Send + Sync {
    /// Fetches the id and name of every list.
    fn list_task_lists(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<TaskListSummary>, RemoteError>> + Send;

    /// Creates a list with the given (already validated) name.
    fn create_task_list(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<TaskListSummary, RemoteError>> + Send;

    /// Deletes a list. No payload on success.
    fn delete_task_list(
        &self,
        id: TaskListId,
    ) -> impl std::future::Future<Output = Result<(), RemoteError>> + Send;

    /// Fetches a list with its tasks and remaining count.
    fn get_task_list(
        &self,
        id: TaskListId,
    ) -> impl std::future::Future<Output = Result<TaskList, RemoteError>> + Send;

    /// Creates a task in a list. The returned task is not completed.
    fn create_task(
        &self,
        list_id: TaskListId,
        name: &str,
    ) -> impl std::future::Future<Output = Result<Task, RemoteError>> + Send;

    /// Replaces a task's state with `task`.
    ///
    /// Returns the store's copy when the response carries one, or `None`
    /// for an empty success response.
    fn update_task(
        &self,
        task: &Task,
    ) -> impl std::future::Future<Output = Result<Option<Task>, RemoteError>> + Send;

    /// Deletes every completed task of a list and returns the list as left.
    fn clear_completed(
        &self,
        list_id: TaskListId,
    ) -> impl std::future::Future<Output = Result<TaskList, RemoteError>> + Send;
}

/// Names of the [`RemoteStore`] operations, used for failure injection and
/// call accounting in [`memory::InMemoryRemoteStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOp {
    /// [`RemoteStore::list_task_lists`]
    ListTaskLists,
    /// [`RemoteStore::create_task_list`]
    CreateTaskList,
    /// [`RemoteStore::delete_task_list`]
    DeleteTaskList,
    /// [`RemoteStore::get_task_list`]
    GetTaskList,
    /// [`RemoteStore::create_task`]
    CreateTask,
    /// [`RemoteStore::update_task`]
    UpdateTask,
    /// [`RemoteStore::clear_completed`]
    ClearCompleted,
}

impl std::fmt::Display for RemoteOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ListTaskLists => "list_task_lists",
            Self::CreateTaskList => "create_task_list",
            Self::DeleteTaskList => "delete_task_list",
            Self::GetTaskList => "get_task_list",
            Self::CreateTask => "create_task",
            Self::UpdateTask => "update_task",
            Self::ClearCompleted => "clear_completed",
        };
        write!(f, "{name}")
    }
}
