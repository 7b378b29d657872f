//! Background sync worker bridging the TUI loop and the remote store.
//!
//! The TUI runs a synchronous, poll-based loop, while store calls are async.
//! [`spawn_sync`] starts a dispatcher task that receives [`SyncCommand`]s
//! and runs each one on its own tokio task, so calls overlap and the UI
//! never waits on the network. Every result comes back as a [`SyncEvent`]
//! carrying the ticket or request it answers.
//!
//! ```text
//! TUI (main thread)  ←── SyncEvent ───  dispatcher ──spawn──> call tasks
//!                     ─── SyncCommand →
//! ```
//!
//! The worker applies nothing itself: the UI feeds events to the
//! registry's and session's `apply_*` methods in arrival order, which is
//! where stale responses are discarded.

use std::sync::Arc;

use tasklists_proto::{Task, TaskList, TaskListId, TaskListSummary};
use tokio::sync::mpsc;

use crate::remote::{RemoteError, RemoteStore};
use crate::session::{AddRequest, LoadTicket, ToggleRequest};

/// Default capacity of the command and event channels.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Work for the sync worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncCommand {
    /// Fetch the list index.
    LoadLists,
    /// Create a list with an already validated name.
    CreateList {
        /// Trimmed list name.
        name: String,
    },
    /// Delete a list.
    DeleteList {
        /// List to delete.
        id: TaskListId,
    },
    /// Fetch a list's tasks for the session.
    LoadTasks {
        /// Session state the fetch belongs to.
        ticket: LoadTicket,
    },
    /// Create a task.
    AddTask(AddRequest),
    /// Update a task's completion flag.
    ToggleTask(ToggleRequest),
    /// Delete a list's completed tasks.
    ClearCompleted {
        /// Session state the request belongs to.
        ticket: LoadTicket,
    },
    /// Stop accepting commands. Calls already running still report back.
    Shutdown,
}

/// Outcome of a [`SyncCommand`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Answer to [`SyncCommand::LoadLists`].
    ListsLoaded(Result<Vec<TaskListSummary>, RemoteError>),
    /// Answer to [`SyncCommand::CreateList`].
    ListCreated(Result<TaskListSummary, RemoteError>),
    /// Answer to [`SyncCommand::DeleteList`].
    ListDeleted {
        /// List that was addressed.
        id: TaskListId,
        /// Store result.
        result: Result<(), RemoteError>,
    },
    /// Answer to [`SyncCommand::LoadTasks`].
    TasksLoaded {
        /// Ticket of the request.
        ticket: LoadTicket,
        /// Store result.
        result: Result<TaskList, RemoteError>,
    },
    /// Answer to [`SyncCommand::AddTask`].
    TaskAdded {
        /// Ticket of the request.
        ticket: LoadTicket,
        /// Store result.
        result: Result<Task, RemoteError>,
    },
    /// Answer to [`SyncCommand::ToggleTask`].
    TaskToggled {
        /// The request as sent.
        request: ToggleRequest,
        /// Store result.
        result: Result<Option<Task>, RemoteError>,
    },
    /// Answer to [`SyncCommand::ClearCompleted`].
    CompletedCleared {
        /// Ticket of the request.
        ticket: LoadTicket,
        /// Store result.
        result: Result<TaskList, RemoteError>,
    },
}

/// Spawns the sync worker and returns its channel handles.
///
/// Must be called from within a tokio runtime. The worker stops on
/// [`SyncCommand::Shutdown`] or when the command sender is dropped.
pub fn spawn_sync<R>(
    remote: Arc<R>,
    capacity: usize,
) -> (mpsc::Sender<SyncCommand>, mpsc::Receiver<SyncEvent>)
where
    R: RemoteStore + 'static,
{
    let capacity = capacity.max(1);
    let (cmd_tx, cmd_rx) = mpsc::channel::<SyncCommand>(capacity);
    let (evt_tx, evt_rx) = mpsc::channel::<SyncEvent>(capacity);

    tokio::spawn(async move {
        dispatcher(remote, cmd_rx, evt_tx).await;
    });

    (cmd_tx, evt_rx)
}

/// Background task: receive commands and run each on its own task.
async fn dispatcher<R>(
    remote: Arc<R>,
    mut cmd_rx: mpsc::Receiver<SyncCommand>,
    evt_tx: mpsc::Sender<SyncEvent>,
) where
    R: RemoteStore + 'static,
{
    while let Some(cmd) = cmd_rx.recv().await {
        if cmd == SyncCommand::Shutdown {
            tracing::info!("sync worker shutting down");
            break;
        }
        tracing::debug!(command = ?cmd, "dispatching sync command");
        let remote = Arc::clone(&remote);
        let evt_tx = evt_tx.clone();
        tokio::spawn(async move {
            let Some(event) = execute(remote.as_ref(), cmd).await else {
                return;
            };
            if evt_tx.send(event).await.is_err() {
                tracing::debug!("sync event receiver dropped");
            }
        });
    }
}

/// Performs one command against the store.
async fn execute<R: RemoteStore>(remote: &R, cmd: SyncCommand) -> Option<SyncEvent> {
    let event = match cmd {
        SyncCommand::LoadLists => SyncEvent::ListsLoaded(remote.list_task_lists().await),
        SyncCommand::CreateList { name } => {
            SyncEvent::ListCreated(remote.create_task_list(&name).await)
        }
        SyncCommand::DeleteList { id } => SyncEvent::ListDeleted {
            id,
            result: remote.delete_task_list(id).await,
        },
        SyncCommand::LoadTasks { ticket } => SyncEvent::TasksLoaded {
            ticket,
            result: remote.get_task_list(ticket.list_id).await,
        },
        SyncCommand::AddTask(AddRequest { ticket, name }) => SyncEvent::TaskAdded {
            ticket,
            result: remote.create_task(ticket.list_id, &name).await,
        },
        SyncCommand::ToggleTask(request) => {
            let result = remote.update_task(&request.candidate).await;
            SyncEvent::TaskToggled { request, result }
        }
        SyncCommand::ClearCompleted { ticket } => SyncEvent::CompletedCleared {
            ticket,
            result: remote.clear_completed(ticket.list_id).await,
        },
        SyncCommand::Shutdown => return None,
    };
    Some(event)
}
