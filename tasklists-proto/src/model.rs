//! Entity model for task lists and tasks.
//!
//! Identifiers are assigned by the remote store and travel as JSON
//! integers. A [`TaskList`] carries a derived `remaining` count that must
//! always equal the number of incomplete tasks it holds.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a task, assigned by the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    /// Wraps a raw store-assigned identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a task list, assigned by the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskListId(u64);

impl TaskListId {
    /// Wraps a raw store-assigned identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TaskListId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named unit of work with a completion flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned identifier.
    pub id: TaskId,
    /// Display name (non-empty).
    pub name: String,
    /// Whether the task is done. Absent in a payload means `false`.
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    /// Returns a copy of this task with the completion flag replaced.
    #[must_use]
    pub fn with_completed(&self, completed: bool) -> Self {
        Self {
            completed,
            ..self.clone()
        }
    }
}

/// Index entry for a task list: identity and name only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskListSummary {
    /// Store-assigned identifier.
    pub id: TaskListId,
    /// Display name (non-empty).
    pub name: String,
}

/// A task list with its tasks and the derived remaining count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    /// Store-assigned identifier.
    pub id: TaskListId,
    /// Display name (non-empty).
    pub name: String,
    /// Tasks in creation order.
    #[serde(default)]
    pub tasks: Vec<Task>,
    /// Number of tasks with `completed == false`.
    #[serde(default)]
    pub remaining: usize,
}

impl TaskList {
    /// Builds a list, deriving `remaining` from `tasks`.
    #[must_use]
    pub fn new(id: TaskListId, name: impl Into<String>, tasks: Vec<Task>) -> Self {
        let remaining = count_remaining(&tasks);
        Self {
            id,
            name: name.into(),
            tasks,
            remaining,
        }
    }

    /// Returns the id/name summary of this list.
    #[must_use]
    pub fn summary(&self) -> TaskListSummary {
        TaskListSummary {
            id: self.id,
            name: self.name.clone(),
        }
    }

    /// Whether `remaining` agrees with the tasks actually held.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.remaining == count_remaining(&self.tasks)
    }
}

/// Counts the tasks that are not completed.
#[must_use]
pub fn count_remaining(tasks: &[Task]) -> usize {
    tasks.iter().filter(|t| !t.completed).count()
}

/// Reasons a list or task name is rejected.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum NameError {
    /// The name is empty or whitespace only.
    #[error("name cannot be empty")]
    Empty,
}

/// Validates a user-entered name and returns it trimmed.
///
/// # Errors
///
/// Returns [`NameError::Empty`] for empty or whitespace-only input.
pub fn validate_name(name: &str) -> Result<&str, NameError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(NameError::Empty);
    }
    Ok(trimmed)
}
