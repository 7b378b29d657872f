//! Application state and event handling.
//!
//! [`App`] owns the list registry and the task session and translates key
//! presses into [`SyncCommand`]s for the sync worker. Results come back as
//! [`SyncEvent`]s through [`App::apply_event`], which routes them into the
//! components and writes a status message for anything the user should
//! know about.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tasklists_proto::Task;

use crate::error::SyncError;
use crate::registry::{ListRegistry, SelectionChange};
use crate::session::TaskSession;
use crate::sync::{SyncCommand, SyncEvent};

/// Which panel is currently focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    /// Task list sidebar (default).
    Lists,
    /// Tasks of the selected list.
    Tasks,
    /// Text input for a new list or task name.
    Input,
}

/// What the input line creates on Enter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTarget {
    /// A new task list.
    NewList,
    /// A new task in the selected list.
    NewTask,
}

/// A message shown in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    /// Message text.
    pub text: String,
    /// Whether this reports a failure.
    pub is_error: bool,
    /// Formatted local time the message was set.
    pub timestamp: String,
}

/// Main application state.
#[derive(Debug)]
pub struct App {
    /// Task lists and selection.
    pub registry: ListRegistry,
    /// Tasks of the selected list.
    pub session: TaskSession,
    /// Which panel is focused.
    pub focus: PanelFocus,
    /// What the input line creates.
    pub input_target: InputTarget,
    /// Highlighted row in the sidebar.
    pub list_cursor: usize,
    /// Highlighted row in the task panel.
    pub task_cursor: usize,
    /// Latest status message.
    pub status: Option<StatusMessage>,
    /// Commands sent to the sync worker that have not answered yet.
    pub pending: usize,
    /// Whether the app should quit.
    pub should_quit: bool,
    timestamp_format: String,
}

impl App {
    /// Creates an app with nothing loaded.
    #[must_use]
    pub fn new(timestamp_format: impl Into<String>) -> Self {
        Self {
            registry: ListRegistry::new(),
            session: TaskSession::new(),
            focus: PanelFocus::Lists,
            input_target: InputTarget::NewList,
            list_cursor: 0,
            task_cursor: 0,
            status: None,
            pending: 0,
            should_quit: false,
            timestamp_format: timestamp_format.into(),
        }
    }

    /// The command that populates the sidebar at startup.
    #[must_use]
    pub const fn startup_command() -> SyncCommand {
        SyncCommand::LoadLists
    }

    /// Draft text of the current input target.
    #[must_use]
    pub fn input(&self) -> &str {
        match self.input_target {
            InputTarget::NewList => self.registry.draft(),
            InputTarget::NewTask => self.session.draft(),
        }
    }

    const fn input_mut(&mut self) -> &mut String {
        match self.input_target {
            InputTarget::NewList => self.registry.draft_mut(),
            InputTarget::NewTask => self.session.draft_mut(),
        }
    }

    /// The task under the task panel cursor.
    #[must_use]
    pub fn highlighted_task(&self) -> Option<&Task> {
        self.session.tasks().get(self.task_cursor)
    }

    /// Sets an informational status message.
    pub fn set_info(&mut self, text: impl Into<String>) {
        self.set_status(text.into(), false);
    }

    /// Sets an error status message.
    pub fn set_error(&mut self, text: impl Into<String>) {
        self.set_status(text.into(), true);
    }

    fn set_status(&mut self, text: String, is_error: bool) {
        self.status = Some(StatusMessage {
            text,
            is_error,
            timestamp: chrono::Local::now()
                .format(&self.timestamp_format)
                .to_string(),
        });
    }

    /// Records that a command was handed to the sync worker.
    pub const fn note_dispatched(&mut self) {
        self.pending += 1;
    }

    /// Handles a key event, returning the command to dispatch, if any.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        // Global shortcuts
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return None;
            }
            (KeyCode::Tab | KeyCode::BackTab, _) => {
                self.cycle_focus();
                return None;
            }
            _ => {}
        }

        match self.focus {
            PanelFocus::Lists => self.handle_lists_key(key),
            PanelFocus::Tasks => self.handle_tasks_key(key),
            PanelFocus::Input => self.handle_input_key(key),
        }
    }

    fn handle_lists_key(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.list_cursor = self.list_cursor.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.list_cursor + 1 < self.registry.lists().len() {
                    self.list_cursor += 1;
                }
                None
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.select_highlighted(),
            KeyCode::Char('d') => {
                let id = self.registry.lists().get(self.list_cursor)?.id;
                Some(SyncCommand::DeleteList { id })
            }
            KeyCode::Char('a' | 'i') => {
                self.start_input(InputTarget::NewList);
                None
            }
            KeyCode::Char('r') => Some(SyncCommand::LoadLists),
            _ => None,
        }
    }

    fn handle_tasks_key(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.task_cursor = self.task_cursor.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.task_cursor + 1 < self.session.tasks().len() {
                    self.task_cursor += 1;
                }
                None
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                let (id, completed) = {
                    let task = self.highlighted_task()?;
                    (task.id, task.completed)
                };
                self.dispatch_or_report(
                    "Cannot update task",
                    self.session
                        .prepare_toggle(id, !completed)
                        .map(SyncCommand::ToggleTask),
                )
            }
            KeyCode::Char('c') => self.dispatch_or_report(
                "Cannot clear completed tasks",
                self.session
                    .prepare_clear()
                    .map(|ticket| SyncCommand::ClearCompleted { ticket }),
            ),
            KeyCode::Char('a' | 'i') => {
                self.start_input(InputTarget::NewTask);
                None
            }
            KeyCode::Char('r') => self
                .session
                .reload()
                .map(|ticket| SyncCommand::LoadTasks { ticket }),
            _ => None,
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        match key.code {
            KeyCode::Enter => self.submit_input(),
            KeyCode::Esc => {
                self.focus = self.target_panel();
                None
            }
            KeyCode::Char(c) => {
                self.input_mut().push(c);
                None
            }
            KeyCode::Backspace => {
                self.input_mut().pop();
                None
            }
            _ => None,
        }
    }

    fn submit_input(&mut self) -> Option<SyncCommand> {
        match self.input_target {
            InputTarget::NewList => {
                let prepared = self
                    .registry
                    .prepare_create(self.registry.draft())
                    .map(|name| SyncCommand::CreateList { name });
                self.dispatch_or_report("Cannot create list", prepared)
            }
            InputTarget::NewTask => {
                let prepared = self
                    .session
                    .prepare_add(self.session.draft())
                    .map(SyncCommand::AddTask);
                self.dispatch_or_report("Cannot add task", prepared)
            }
        }
    }

    fn dispatch_or_report(
        &mut self,
        action: &str,
        prepared: Result<SyncCommand, SyncError>,
    ) -> Option<SyncCommand> {
        match prepared {
            Ok(cmd) => Some(cmd),
            Err(e) => {
                self.set_error(format!("{action}: {e}"));
                None
            }
        }
    }

    /// "List changed" hook: selects the highlighted list.
    fn select_highlighted(&mut self) -> Option<SyncCommand> {
        let id = self.registry.lists().get(self.list_cursor)?.id;
        let change = self.registry.select(Some(id));
        self.on_selection_change(change)
    }

    /// Cascades a registry selection change into the session.
    fn on_selection_change(&mut self, change: Option<SelectionChange>) -> Option<SyncCommand> {
        let change = change?;
        self.task_cursor = 0;
        self.session
            .on_selection_changed(change.current)
            .map(|ticket| SyncCommand::LoadTasks { ticket })
    }

    const fn start_input(&mut self, target: InputTarget) {
        self.input_target = target;
        self.focus = PanelFocus::Input;
    }

    const fn target_panel(&self) -> PanelFocus {
        match self.input_target {
            InputTarget::NewList => PanelFocus::Lists,
            InputTarget::NewTask => PanelFocus::Tasks,
        }
    }

    /// Cycle focus: Lists -> Tasks -> Lists. From the input, return to the
    /// panel it belongs to.
    const fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            PanelFocus::Lists => PanelFocus::Tasks,
            PanelFocus::Tasks => PanelFocus::Lists,
            PanelFocus::Input => self.target_panel(),
        };
    }

    /// Applies a sync worker result, returning a follow-up command if the
    /// result changed the selection.
    pub fn apply_event(&mut self, event: SyncEvent) -> Option<SyncCommand> {
        self.pending = self.pending.saturating_sub(1);
        let follow_up = match event {
            SyncEvent::ListsLoaded(result) => match self.registry.apply_loaded(result) {
                Ok(change) => self.on_selection_change(change),
                Err(e) => {
                    self.report("Failed to load lists", Err(e));
                    None
                }
            },
            SyncEvent::ListCreated(result) => {
                match self.registry.apply_created(result) {
                    Ok(summary) => self.set_info(format!("Created list '{}'", summary.name)),
                    Err(e) => self.report("Failed to create list", Err(e)),
                }
                None
            }
            SyncEvent::ListDeleted { id, result } => match self.registry.apply_deleted(id, result) {
                Ok(change) => {
                    self.set_info("List deleted");
                    self.on_selection_change(change)
                }
                Err(e) => {
                    self.report("Failed to delete list", Err(e));
                    None
                }
            },
            SyncEvent::TasksLoaded { ticket, result } => {
                let outcome = self.session.apply_loaded(ticket, result);
                self.report("Failed to load tasks (r to retry)", outcome);
                None
            }
            SyncEvent::TaskAdded { ticket, result } => {
                let outcome = self.session.apply_added(ticket, result);
                self.report("Failed to add task", outcome);
                None
            }
            SyncEvent::TaskToggled { request, result } => {
                let outcome = self.session.apply_toggled(request, result);
                self.report("Failed to update task", outcome);
                None
            }
            SyncEvent::CompletedCleared { ticket, result } => {
                let outcome = self.session.apply_cleared(ticket, result);
                self.report("Failed to clear completed tasks", outcome);
                None
            }
        };
        self.clamp_cursors();
        follow_up
    }

    fn report(&mut self, action: &str, outcome: Result<(), SyncError>) {
        if let Err(e) = outcome {
            if e.is_reportable() {
                self.set_error(format!("{action}: {e}"));
            }
        }
    }

    fn clamp_cursors(&mut self) {
        self.list_cursor = self
            .list_cursor
            .min(self.registry.lists().len().saturating_sub(1));
        self.task_cursor = self
            .task_cursor
            .min(self.session.tasks().len().saturating_sub(1));
    }
}
