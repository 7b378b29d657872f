//! List registry: the collection of task lists and the selection pointer.
//!
//! The registry is the only owner of the list index and of which list is
//! selected. Remote-backed operations are confirm-then-apply: local state
//! changes only once the store has answered successfully.
//!
//! Each operation comes in two shapes:
//! - an `async` method that performs the remote call and applies its result
//!   in one go (used by [`crate::board::TaskBoard`]);
//! - a `prepare_*` / `apply_*` pair, so the call can run on the sync worker
//!   while the UI keeps handling input (used by [`crate::app::App`]).

use tasklists_proto::{TaskListId, TaskListSummary, validate_name};

use crate::error::SyncError;
use crate::remote::{RemoteError, RemoteStore};

/// A change of the selected list.
///
/// Returned only when the selected id actually changed; this is what the
/// task session re-initialises on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionChange {
    /// Selection before the change.
    pub previous: Option<TaskListId>,
    /// Selection after the change.
    pub current: Option<TaskListId>,
}

/// Task lists known to the client, plus selection and pending input.
#[derive(Debug, Default)]
pub struct ListRegistry {
    lists: Vec<TaskListSummary>,
    selected: Option<TaskListId>,
    draft: String,
}

impl ListRegistry {
    /// Creates an empty registry with nothing selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lists in the order the store returned or created them.
    #[must_use]
    pub fn lists(&self) -> &[TaskListSummary] {
        &self.lists
    }

    /// The selected list id, if any.
    #[must_use]
    pub const fn selected(&self) -> Option<TaskListId> {
        self.selected
    }

    /// The selected list's summary, if any.
    #[must_use]
    pub fn selected_summary(&self) -> Option<&TaskListSummary> {
        let id = self.selected?;
        self.lists.iter().find(|l| l.id == id)
    }

    /// Pending name input for a new list.
    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Mutable access to the pending input.
    pub const fn draft_mut(&mut self) -> &mut String {
        &mut self.draft
    }

    /// Replaces the list index with a fetched one.
    ///
    /// If the selected list is missing from the new index, the selection is
    /// cleared and the change returned so the caller can reset the task
    /// session. On failure the current lists are kept as they are.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Remote`] if the fetch failed.
    pub fn apply_loaded(
        &mut self,
        result: Result<Vec<TaskListSummary>, RemoteError>,
    ) -> Result<Option<SelectionChange>, SyncError> {
        let lists = result.map_err(|e| {
            tracing::warn!(error = %e, "failed to load task lists");
            SyncError::Remote(e)
        })?;
        tracing::debug!(count = lists.len(), "task lists loaded");
        self.lists = lists;

        let Some(id) = self.selected else {
            return Ok(None);
        };
        if self.lists.iter().any(|l| l.id == id) {
            return Ok(None);
        }
        tracing::info!(list_id = %id, "selected list is gone, clearing selection");
        self.selected = None;
        Ok(Some(SelectionChange {
            previous: Some(id),
            current: None,
        }))
    }

    /// Fetches every list from the store and replaces the local index.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Remote`] if the fetch failed; lists are unchanged.
    pub async fn load<R: RemoteStore>(
        &mut self,
        remote: &R,
    ) -> Result<Option<SelectionChange>, SyncError> {
        let result = remote.list_task_lists().await;
        self.apply_loaded(result)
    }

    /// Validates a new list name and returns the trimmed form to send.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Validation`] for an empty or whitespace-only name.
    pub fn prepare_create(&self, name: &str) -> Result<String, SyncError> {
        match validate_name(name) {
            Ok(valid) => Ok(valid.to_string()),
            Err(e) => {
                tracing::debug!(error = %e, "rejected task list name");
                Err(SyncError::Validation(e))
            }
        }
    }

    /// Appends a list the store confirmed and clears the pending input.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Remote`] if the create call failed; lists and
    /// draft are unchanged.
    pub fn apply_created(
        &mut self,
        result: Result<TaskListSummary, RemoteError>,
    ) -> Result<TaskListSummary, SyncError> {
        match result {
            Ok(summary) => {
                tracing::info!(list_id = %summary.id, name = %summary.name, "task list created");
                self.lists.push(summary.clone());
                self.draft.clear();
                Ok(summary)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to create task list");
                Err(SyncError::Remote(e))
            }
        }
    }

    /// Creates a list in the store and appends it once confirmed.
    ///
    /// Invalid names are rejected without a remote call.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Validation`] or [`SyncError::Remote`].
    pub async fn create<R: RemoteStore>(
        &mut self,
        remote: &R,
        name: &str,
    ) -> Result<TaskListSummary, SyncError> {
        let name = self.prepare_create(name)?;
        let result = remote.create_task_list(&name).await;
        self.apply_created(result)
    }

    /// Selects a list, or clears the selection with `None`.
    ///
    /// Returns the change when the selected id differs from the current
    /// one. Re-selecting the current list, or selecting an id that is not
    /// in the registry, changes nothing.
    pub fn select(&mut self, id: Option<TaskListId>) -> Option<SelectionChange> {
        if id == self.selected {
            return None;
        }
        if let Some(id) = id {
            if !self.lists.iter().any(|l| l.id == id) {
                tracing::debug!(list_id = %id, "ignoring selection of unknown list");
                return None;
            }
        }
        let change = SelectionChange {
            previous: self.selected,
            current: id,
        };
        self.selected = id;
        Some(change)
    }

    /// Removes a list the store confirmed deleted.
    ///
    /// If it was selected, the selection is cleared and the change returned
    /// so the caller can reset the task session.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Remote`] if the delete call failed; lists and
    /// selection are unchanged.
    pub fn apply_deleted(
        &mut self,
        id: TaskListId,
        result: Result<(), RemoteError>,
    ) -> Result<Option<SelectionChange>, SyncError> {
        if let Err(e) = result {
            tracing::warn!(list_id = %id, error = %e, "failed to delete task list");
            return Err(SyncError::Remote(e));
        }
        tracing::info!(list_id = %id, "task list deleted");
        self.lists.retain(|l| l.id != id);
        if self.selected == Some(id) {
            self.selected = None;
            return Ok(Some(SelectionChange {
                previous: Some(id),
                current: None,
            }));
        }
        Ok(None)
    }

    /// Deletes a list in the store and removes it locally once confirmed.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Remote`] if the delete call failed.
    pub async fn delete<R: RemoteStore>(
        &mut self,
        remote: &R,
        id: TaskListId,
    ) -> Result<Option<SelectionChange>, SyncError> {
        let result = remote.delete_task_list(id).await;
        self.apply_deleted(id, result)
    }
}
