//! Sequential driver tying the registry and the session to one store.
//!
//! [`TaskBoard`] awaits each remote call before taking the next step and
//! cascades selection changes from the registry into the session. The TUI
//! uses the sync worker instead so calls can overlap.

use tasklists_proto::{TaskId, TaskListId, TaskListSummary};

use crate::error::SyncError;
use crate::registry::{ListRegistry, SelectionChange};
use crate::remote::RemoteStore;
use crate::session::TaskSession;

/// A remote store together with the list registry and task session it feeds.
#[derive(Debug)]
pub struct TaskBoard<R> {
    remote: R,
    registry: ListRegistry,
    session: TaskSession,
}

impl<R: RemoteStore> TaskBoard<R> {
    /// Creates a board with nothing loaded.
    pub fn new(remote: R) -> Self {
        Self {
            remote,
            registry: ListRegistry::new(),
            session: TaskSession::new(),
        }
    }

    /// The underlying store.
    pub const fn remote(&self) -> &R {
        &self.remote
    }

    /// The list registry.
    pub const fn registry(&self) -> &ListRegistry {
        &self.registry
    }

    /// The task session of the selected list.
    pub const fn session(&self) -> &TaskSession {
        &self.session
    }

    /// Loads the list index, resetting the session if the selected list
    /// is no longer in it.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Remote`] if the fetch failed.
    pub async fn load_lists(&mut self) -> Result<(), SyncError> {
        let change = self.registry.load(&self.remote).await?;
        self.cascade(change).await
    }

    /// Creates a list.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Validation`] or [`SyncError::Remote`].
    pub async fn create_list(&mut self, name: &str) -> Result<TaskListSummary, SyncError> {
        self.registry.create(&self.remote, name).await
    }

    /// Selects a list (or none) and loads its tasks if the selection changed.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Remote`] if loading the new list failed; the
    /// selection itself still took effect.
    pub async fn select_list(&mut self, id: Option<TaskListId>) -> Result<(), SyncError> {
        let change = self.registry.select(id);
        self.cascade(change).await
    }

    /// Deletes a list, resetting the session if it was selected.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Remote`] if the delete failed.
    pub async fn delete_list(&mut self, id: TaskListId) -> Result<(), SyncError> {
        let change = self.registry.delete(&self.remote, id).await?;
        self.cascade(change).await
    }

    /// Adds a task to the selected list.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotReady`], [`SyncError::Validation`] or
    /// [`SyncError::Remote`].
    pub async fn add_task(&mut self, name: &str) -> Result<(), SyncError> {
        self.session.add_task(&self.remote, name).await
    }

    /// Sets a task's completion flag.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotReady`], [`SyncError::TaskNotFound`] or
    /// [`SyncError::Remote`].
    pub async fn toggle_task(&mut self, task_id: TaskId, completed: bool) -> Result<(), SyncError> {
        self.session
            .toggle_task(&self.remote, task_id, completed)
            .await
    }

    /// Deletes the selected list's completed tasks.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotReady`] or [`SyncError::Remote`].
    pub async fn clear_completed(&mut self) -> Result<(), SyncError> {
        self.session.clear_completed(&self.remote).await
    }

    /// Refetches the selected list, e.g. after a failed load.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Remote`] if the fetch failed.
    pub async fn reload(&mut self) -> Result<(), SyncError> {
        match self.session.reload() {
            Some(ticket) => self.session.load(&self.remote, ticket).await,
            None => Ok(()),
        }
    }

    async fn cascade(&mut self, change: Option<SelectionChange>) -> Result<(), SyncError> {
        let Some(change) = change else {
            return Ok(());
        };
        match self.session.on_selection_changed(change.current) {
            Some(ticket) => self.session.load(&self.remote, ticket).await,
            None => Ok(()),
        }
    }
}
