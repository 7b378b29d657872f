//! Error taxonomy of the client-side sync layer.

use tasklists_proto::{NameError, TaskId, TaskListId};

use crate::remote::RemoteError;

/// Why a registry or session operation did not change local state.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SyncError {
    /// Input rejected before any remote call was made.
    #[error("{0}")]
    Validation(#[from] NameError),

    /// The remote call failed; local state stays at its last confirmed value.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The response belongs to a list that is no longer current.
    #[error("discarded stale response for list {0}")]
    StaleResponse(TaskListId),

    /// A task mutation was attempted while no list is loaded.
    #[error("no task list is loaded")]
    NotReady,

    /// The task is not part of the loaded list.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
}

impl SyncError {
    /// Whether this error should be surfaced to the user.
    ///
    /// Stale responses are expected during rapid selection changes and are
    /// dropped silently.
    #[must_use]
    pub const fn is_reportable(&self) -> bool {
        !matches!(self, Self::StaleResponse(_))
    }
}
