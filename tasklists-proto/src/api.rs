//! REST wire contract shared by the client and the server.
//!
//! Request/response bodies are JSON records with fixed field names. The
//! [`paths`] module builds resource paths relative to the API root
//! (for example `/api`), and [`routes`] holds the matching axum route
//! templates.

use serde::{Deserialize, Serialize};

use crate::model::TaskListSummary;

/// Response body of `GET {root}/tasklists`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskListsBody {
    /// Every task list known to the store, in creation order.
    #[serde(rename = "taskLists")]
    pub task_lists: Vec<TaskListSummary>,
}

/// Request body for creating a list or a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameBody {
    /// Display name of the new entity.
    pub name: String,
}

impl NameBody {
    /// Creates a body carrying the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Error body returned by the server with every non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable failure reason.
    pub error: String,
}

/// Resource paths relative to the API root.
pub mod paths {
    use crate::model::{TaskId, TaskListId};

    /// `/tasklists`
    #[must_use]
    pub fn task_lists() -> String {
        "/tasklists".to_string()
    }

    /// `/tasklists/{id}`
    #[must_use]
    pub fn task_list(id: TaskListId) -> String {
        format!("/tasklists/{id}")
    }

    /// `/tasklists/{id}/tasks`
    #[must_use]
    pub fn list_tasks(id: TaskListId) -> String {
        format!("/tasklists/{id}/tasks")
    }

    /// `/tasklists/{id}/tasks/completed`
    #[must_use]
    pub fn completed_tasks(id: TaskListId) -> String {
        format!("/tasklists/{id}/tasks/completed")
    }

    /// `/tasks/{id}`
    #[must_use]
    pub fn task(id: TaskId) -> String {
        format!("/tasks/{id}")
    }
}

/// Route templates in axum's `{param}` syntax, matching [`paths`].
pub mod routes {
    /// Collection of task lists.
    pub const TASK_LISTS: &str = "/tasklists";
    /// A single task list.
    pub const TASK_LIST: &str = "/tasklists/{id}";
    /// Tasks of a list.
    pub const LIST_TASKS: &str = "/tasklists/{id}/tasks";
    /// Completed tasks of a list.
    pub const COMPLETED_TASKS: &str = "/tasklists/{id}/tasks/completed";
    /// A single task.
    pub const TASK: &str = "/tasks/{id}";
}
