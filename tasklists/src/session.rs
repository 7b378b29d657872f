//! Task session: the live tasks and remaining count of the selected list.
//!
//! The session is re-initialised whenever the selection changes. Every
//! request it issues is stamped with a [`LoadTicket`] (list id plus a
//! generation counter bumped on each re-initialisation), and a response is
//! only applied while its ticket is still current. Anything else is a
//! stale response and is dropped.
//!
//! Mutations are confirm-then-apply: the local copy changes only after the
//! store accepted the change, and `remaining` is adjusted in the same step
//! so it always equals the number of incomplete tasks.

use tasklists_proto::{Task, TaskId, TaskList, TaskListId, count_remaining, validate_name};

use crate::error::SyncError;
use crate::remote::{RemoteError, RemoteStore};

/// Lifecycle of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No list selected.
    Empty,
    /// A list is selected but its tasks are not loaded (fetch in flight, or
    /// the last fetch failed).
    Loading,
    /// Tasks are loaded and may be mutated.
    Ready,
}

/// Identifies the session state a request was issued against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    /// List the request targets.
    pub list_id: TaskListId,
    /// Session generation at the time the request was issued.
    pub generation: u64,
}

/// A validated add-task request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddRequest {
    /// Session state the request was issued against.
    pub ticket: LoadTicket,
    /// Trimmed task name.
    pub name: String,
}

/// A validated toggle request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleRequest {
    /// Session state the request was issued against.
    pub ticket: LoadTicket,
    /// Copy of the task with the requested completion value.
    pub candidate: Task,
}

/// Tasks of the selected list and the derived remaining count.
#[derive(Debug)]
pub struct TaskSession {
    list_id: Option<TaskListId>,
    generation: u64,
    phase: SessionPhase,
    tasks: Vec<Task>,
    remaining: usize,
    draft: String,
}

impl Default for TaskSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskSession {
    /// Creates a session with nothing selected.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            list_id: None,
            generation: 0,
            phase: SessionPhase::Empty,
            tasks: Vec::new(),
            remaining: 0,
            draft: String::new(),
        }
    }

    /// Id of the list this session shows.
    #[must_use]
    pub const fn list_id(&self) -> Option<TaskListId> {
        self.list_id
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Whether tasks are loaded.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.phase == SessionPhase::Ready
    }

    /// Tasks in creation order. Empty unless [`SessionPhase::Ready`].
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Number of incomplete tasks. This is the value to display.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.remaining
    }

    /// Pending name input for a new task.
    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Mutable access to the pending input.
    pub const fn draft_mut(&mut self) -> &mut String {
        &mut self.draft
    }

    /// The ticket a request issued now would carry.
    #[must_use]
    pub fn current_ticket(&self) -> Option<LoadTicket> {
        self.list_id.map(|list_id| LoadTicket {
            list_id,
            generation: self.generation,
        })
    }

    /// Re-initialises the session for a newly selected list.
    ///
    /// Does nothing when `id` is already the session's list. Otherwise the
    /// loaded tasks are discarded and, if a list was selected, the ticket for
    /// fetching it is returned.
    pub fn on_selection_changed(&mut self, id: Option<TaskListId>) -> Option<LoadTicket> {
        if id == self.list_id {
            return None;
        }
        self.list_id = id;
        self.restart()
    }

    /// Issues a fresh ticket for the current list, e.g. to retry a failed
    /// load. Responses to earlier requests become stale.
    pub fn reload(&mut self) -> Option<LoadTicket> {
        self.list_id?;
        self.restart()
    }

    fn restart(&mut self) -> Option<LoadTicket> {
        self.generation += 1;
        self.tasks.clear();
        self.remaining = 0;
        self.phase = if self.list_id.is_some() {
            SessionPhase::Loading
        } else {
            SessionPhase::Empty
        };
        tracing::debug!(
            list_id = ?self.list_id,
            generation = self.generation,
            "task session reset"
        );
        self.current_ticket()
    }

    fn ensure_current(&self, ticket: LoadTicket) -> Result<(), SyncError> {
        if self.current_ticket() == Some(ticket) {
            Ok(())
        } else {
            tracing::debug!(
                list_id = %ticket.list_id,
                generation = ticket.generation,
                current_generation = self.generation,
                "discarding stale response"
            );
            Err(SyncError::StaleResponse(ticket.list_id))
        }
    }

    fn ready_ticket(&self) -> Result<LoadTicket, SyncError> {
        match (self.phase, self.current_ticket()) {
            (SessionPhase::Ready, Some(ticket)) => Ok(ticket),
            _ => Err(SyncError::NotReady),
        }
    }

    /// Replaces tasks and remaining from a server payload.
    fn adopt(&mut self, list: TaskList) {
        let remaining = if list.is_consistent() {
            list.remaining
        } else {
            let counted = count_remaining(&list.tasks);
            tracing::warn!(
                list_id = %list.id,
                reported = list.remaining,
                counted,
                "server remaining count contradicts its tasks, using counted value"
            );
            counted
        };
        self.tasks = list.tasks;
        self.remaining = remaining;
        self.phase = SessionPhase::Ready;
    }

    /// Applies the result of fetching the list for `ticket`.
    ///
    /// On failure the session stays in [`SessionPhase::Loading`] with no
    /// tasks until [`reload`](Self::reload) or another selection.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::StaleResponse`] if the ticket is no longer
    /// current, or [`SyncError::Remote`] if the fetch failed.
    pub fn apply_loaded(
        &mut self,
        ticket: LoadTicket,
        result: Result<TaskList, RemoteError>,
    ) -> Result<(), SyncError> {
        self.ensure_current(ticket)?;
        match result {
            Ok(list) => {
                tracing::debug!(list_id = %ticket.list_id, tasks = list.tasks.len(), "task list loaded");
                self.adopt(list);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(list_id = %ticket.list_id, error = %e, "failed to load task list");
                Err(SyncError::Remote(e))
            }
        }
    }

    /// Fetches the list for `ticket` and applies the result.
    ///
    /// # Errors
    ///
    /// See [`apply_loaded`](Self::apply_loaded).
    pub async fn load<R: RemoteStore>(
        &mut self,
        remote: &R,
        ticket: LoadTicket,
    ) -> Result<(), SyncError> {
        let result = remote.get_task_list(ticket.list_id).await;
        self.apply_loaded(ticket, result)
    }

    /// Validates an add-task request against the current state.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotReady`] unless tasks are loaded, or
    /// [`SyncError::Validation`] for an invalid name.
    pub fn prepare_add(&self, name: &str) -> Result<AddRequest, SyncError> {
        let ticket = self.ready_ticket()?;
        let name = validate_name(name).map_err(|e| {
            tracing::debug!(error = %e, "rejected task name");
            SyncError::Validation(e)
        })?;
        Ok(AddRequest {
            ticket,
            name: name.to_string(),
        })
    }

    /// Appends a task the store created and clears the pending input.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::StaleResponse`] or [`SyncError::Remote`]; in
    /// both cases tasks and remaining are unchanged.
    pub fn apply_added(
        &mut self,
        ticket: LoadTicket,
        result: Result<Task, RemoteError>,
    ) -> Result<(), SyncError> {
        self.ensure_current(ticket)?;
        match result {
            Ok(task) => {
                tracing::info!(list_id = %ticket.list_id, task_id = %task.id, "task added");
                if !task.completed {
                    self.remaining += 1;
                }
                self.tasks.push(task);
                self.draft.clear();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(list_id = %ticket.list_id, error = %e, "failed to add task");
                Err(SyncError::Remote(e))
            }
        }
    }

    /// Creates a task in the store and appends it once confirmed.
    ///
    /// # Errors
    ///
    /// See [`prepare_add`](Self::prepare_add) and
    /// [`apply_added`](Self::apply_added).
    pub async fn add_task<R: RemoteStore>(
        &mut self,
        remote: &R,
        name: &str,
    ) -> Result<(), SyncError> {
        let request = self.prepare_add(name)?;
        let result = remote.create_task(request.ticket.list_id, &request.name).await;
        self.apply_added(request.ticket, result)
    }

    /// Builds the candidate task for setting `task_id`'s completion flag.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotReady`] unless tasks are loaded, or
    /// [`SyncError::TaskNotFound`] if the task is not in this list.
    pub fn prepare_toggle(
        &self,
        task_id: TaskId,
        completed: bool,
    ) -> Result<ToggleRequest, SyncError> {
        let ticket = self.ready_ticket()?;
        let task = self
            .tasks
            .iter()
            .find(|t| t.id == task_id)
            .ok_or(SyncError::TaskNotFound(task_id))?;
        Ok(ToggleRequest {
            ticket,
            candidate: task.with_completed(completed),
        })
    }

    /// Applies a confirmed toggle.
    ///
    /// The entry with the candidate's id is replaced by the store's copy (or
    /// the candidate when the store sent none) and `remaining` moves by the
    /// transition from the entry's current value: completing subtracts one,
    /// reopening adds one, an unchanged flag leaves it alone.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::StaleResponse`], [`SyncError::Remote`], or
    /// [`SyncError::TaskNotFound`] if the task left the list meanwhile. No
    /// state changes in any of these cases.
    pub fn apply_toggled(
        &mut self,
        request: ToggleRequest,
        result: Result<Option<Task>, RemoteError>,
    ) -> Result<(), SyncError> {
        let ToggleRequest { ticket, candidate } = request;
        self.ensure_current(ticket)?;
        let task_id = candidate.id;
        let confirmed = match result {
            Ok(Some(task)) => task,
            Ok(None) => candidate,
            Err(e) => {
                tracing::warn!(
                    list_id = %ticket.list_id,
                    task_id = %task_id,
                    error = %e,
                    "failed to update task"
                );
                return Err(SyncError::Remote(e));
            }
        };

        let Some(entry) = self.tasks.iter_mut().find(|t| t.id == task_id) else {
            tracing::debug!(task_id = %task_id, "toggled task no longer in list");
            return Err(SyncError::TaskNotFound(task_id));
        };
        match (entry.completed, confirmed.completed) {
            (false, true) => self.remaining = self.remaining.saturating_sub(1),
            (true, false) => self.remaining += 1,
            _ => {}
        }
        tracing::debug!(task_id = %confirmed.id, completed = confirmed.completed, "task updated");
        *entry = confirmed;
        Ok(())
    }

    /// Sets a task's completion flag in the store and applies it once
    /// confirmed.
    ///
    /// # Errors
    ///
    /// See [`prepare_toggle`](Self::prepare_toggle) and
    /// [`apply_toggled`](Self::apply_toggled).
    pub async fn toggle_task<R: RemoteStore>(
        &mut self,
        remote: &R,
        task_id: TaskId,
        completed: bool,
    ) -> Result<(), SyncError> {
        let request = self.prepare_toggle(task_id, completed)?;
        let result = remote.update_task(&request.candidate).await;
        self.apply_toggled(request, result)
    }

    /// Ticket for a clear-completed request.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotReady`] unless tasks are loaded.
    pub fn prepare_clear(&self) -> Result<LoadTicket, SyncError> {
        self.ready_ticket()
    }

    /// Replaces tasks with the list the store returned after clearing.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::StaleResponse`] or [`SyncError::Remote`].
    pub fn apply_cleared(
        &mut self,
        ticket: LoadTicket,
        result: Result<TaskList, RemoteError>,
    ) -> Result<(), SyncError> {
        self.ensure_current(ticket)?;
        match result {
            Ok(list) => {
                tracing::info!(
                    list_id = %ticket.list_id,
                    removed = self.tasks.len().saturating_sub(list.tasks.len()),
                    "completed tasks cleared"
                );
                self.adopt(list);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(list_id = %ticket.list_id, error = %e, "failed to clear completed tasks");
                Err(SyncError::Remote(e))
            }
        }
    }

    /// Deletes every completed task in the store and adopts the result.
    ///
    /// # Errors
    ///
    /// See [`prepare_clear`](Self::prepare_clear) and
    /// [`apply_cleared`](Self::apply_cleared).
    pub async fn clear_completed<R: RemoteStore>(&mut self, remote: &R) -> Result<(), SyncError> {
        let ticket = self.prepare_clear()?;
        let result = remote.clear_completed(ticket.list_id).await;
        self.apply_cleared(ticket, result)
    }
}
