//! In-process remote store.
//!
//! [`InMemoryRemoteStore`] answers every [`RemoteStore`] call from local
//! state with the same semantics as the REST server (ids from 1, never
//! reused, 404/400 statuses for unknown ids and invalid names). It backs the
//! offline demo mode and gives tests three hooks the network never offers on
//! demand: injected failures, per-list fetch latency, and call accounting.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use parking_lot::Mutex;
use tasklists_proto::{Task, TaskId, TaskList, TaskListId, TaskListSummary, validate_name};

use super::{RemoteError, RemoteOp, RemoteStore};

#[derive(Debug)]
struct StoredList {
    id: TaskListId,
    name: String,
    tasks: Vec<Task>,
}

#[derive(Debug, Default)]
struct Inner {
    lists: Vec<StoredList>,
    last_list_id: u64,
    last_task_id: u64,
    failures: HashMap<RemoteOp, VecDeque<RemoteError>>,
    latency: HashMap<TaskListId, Duration>,
    calls: HashMap<RemoteOp, usize>,
    empty_update_responses: bool,
}

impl Inner {
    fn list(&self, id: TaskListId) -> Result<&StoredList, RemoteError> {
        self.lists
            .iter()
            .find(|l| l.id == id)
            .ok_or_else(|| not_found(format!("task list not found: {id}")))
    }

    fn list_mut(&mut self, id: TaskListId) -> Result<&mut StoredList, RemoteError> {
        self.lists
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| not_found(format!("task list not found: {id}")))
    }

    fn insert_list(&mut self, name: String, tasks: Vec<Task>) -> TaskListSummary {
        self.last_list_id += 1;
        let id = TaskListId::new(self.last_list_id);
        self.lists.push(StoredList {
            id,
            name: name.clone(),
            tasks,
        });
        TaskListSummary { id, name }
    }

    fn next_task(&mut self, name: String, completed: bool) -> Task {
        self.last_task_id += 1;
        Task {
            id: TaskId::new(self.last_task_id),
            name,
            completed,
        }
    }

    fn insert_task(
        &mut self,
        list_id: TaskListId,
        name: String,
        completed: bool,
    ) -> Result<Task, RemoteError> {
        self.list(list_id)?;
        let task = self.next_task(name, completed);
        self.list_mut(list_id)?.tasks.push(task.clone());
        Ok(task)
    }
}

fn not_found(reason: String) -> RemoteError {
    RemoteError::Status {
        status: 404,
        reason,
    }
}

fn checked_name(name: &str) -> Result<String, RemoteError> {
    validate_name(name)
        .map(str::to_string)
        .map_err(|e| RemoteError::Status {
            status: 400,
            reason: format!("invalid name: {e}"),
        })
}

/// [`RemoteStore`] backed by process memory.
#[derive(Debug, Default)]
pub struct InMemoryRemoteStore {
    inner: Mutex<Inner>,
}

impl InMemoryRemoteStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with a couple of lists for the offline
    /// demo mode.
    #[must_use]
    pub fn with_demo_data() -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.lock();
            let groceries = vec![
                inner.next_task("Milk".to_string(), false),
                inner.next_task("Eggs".to_string(), true),
                inner.next_task("Bread".to_string(), false),
            ];
            inner.insert_list("Groceries".to_string(), groceries);
            let work = vec![
                inner.next_task("Review pull requests".to_string(), false),
                inner.next_task("Write release notes".to_string(), false),
            ];
            inner.insert_list("Work".to_string(), work);
        }
        store
    }

    /// Adds a list directly, bypassing call accounting and failure injection.
    pub fn seed_list(&self, name: &str) -> TaskListId {
        self.inner.lock().insert_list(name.to_string(), Vec::new()).id
    }

    /// Adds a task directly, bypassing call accounting and failure injection.
    ///
    /// # Errors
    ///
    /// Returns a 404 [`RemoteError::Status`] if the list does not exist.
    pub fn seed_task(
        &self,
        list_id: TaskListId,
        name: &str,
        completed: bool,
    ) -> Result<TaskId, RemoteError> {
        self.inner
            .lock()
            .insert_task(list_id, name.to_string(), completed)
            .map(|t| t.id)
    }

    /// Makes the next call of `op` fail with a transport error.
    pub fn fail_next(&self, op: RemoteOp) {
        self.fail_next_with(
            op,
            RemoteError::Transport {
                reason: format!("injected failure in {op}"),
            },
        );
    }

    /// Makes the next call of `op` fail with `error`. Repeated calls queue
    /// further failures.
    pub fn fail_next_with(&self, op: RemoteOp, error: RemoteError) {
        self.inner
            .lock()
            .failures
            .entry(op)
            .or_default()
            .push_back(error);
    }

    /// Delays every `get_task_list` for `list_id` by `delay`.
    pub fn set_latency(&self, list_id: TaskListId, delay: Duration) {
        self.inner.lock().latency.insert(list_id, delay);
    }

    /// When set, successful `update_task` calls answer without a payload,
    /// like a server replying with an empty body.
    pub fn set_empty_update_responses(&self, empty: bool) {
        self.inner.lock().empty_update_responses = empty;
    }

    /// Total number of remote calls received, including failed ones.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.inner.lock().calls.values().sum()
    }

    /// Number of calls received for one operation.
    #[must_use]
    pub fn calls_to(&self, op: RemoteOp) -> usize {
        self.inner.lock().calls.get(&op).copied().unwrap_or(0)
    }

    /// Current server-side state of a list, without counting a call.
    #[must_use]
    pub fn snapshot(&self, id: TaskListId) -> Option<TaskList> {
        let inner = self.inner.lock();
        inner
            .list(id)
            .ok()
            .map(|l| TaskList::new(l.id, l.name.clone(), l.tasks.clone()))
    }

    /// Records the call and pops an injected failure, if any.
    fn begin(&self, op: RemoteOp) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock();
        *inner.calls.entry(op).or_insert(0) += 1;
        let injected = inner.failures.get_mut(&op).and_then(VecDeque::pop_front);
        drop(inner);
        match injected {
            Some(error) => {
                tracing::debug!(%op, error = %error, "injecting remote failure");
                Err(error)
            }
            None => Ok(()),
        }
    }
}

impl RemoteStore for InMemoryRemoteStore {
    async fn list_task_lists(&self) -> Result<Vec<TaskListSummary>, RemoteError> {
        self.begin(RemoteOp::ListTaskLists)?;
        let inner = self.inner.lock();
        Ok(inner
            .lists
            .iter()
            .map(|l| TaskListSummary {
                id: l.id,
                name: l.name.clone(),
            })
            .collect())
    }

    async fn create_task_list(&self, name: &str) -> Result<TaskListSummary, RemoteError> {
        self.begin(RemoteOp::CreateTaskList)?;
        let name = checked_name(name)?;
        Ok(self.inner.lock().insert_list(name, Vec::new()))
    }

    async fn delete_task_list(&self, id: TaskListId) -> Result<(), RemoteError> {
        self.begin(RemoteOp::DeleteTaskList)?;
        let mut inner = self.inner.lock();
        let index = inner
            .lists
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| not_found(format!("task list not found: {id}")))?;
        inner.lists.remove(index);
        drop(inner);
        Ok(())
    }

    async fn get_task_list(&self, id: TaskListId) -> Result<TaskList, RemoteError> {
        let outcome = self.begin(RemoteOp::GetTaskList);
        let delay = self.inner.lock().latency.get(&id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        outcome?;
        self.snapshot(id)
            .ok_or_else(|| not_found(format!("task list not found: {id}")))
    }

    async fn create_task(&self, list_id: TaskListId, name: &str) -> Result<Task, RemoteError> {
        self.begin(RemoteOp::CreateTask)?;
        let name = checked_name(name)?;
        self.inner.lock().insert_task(list_id, name, false)
    }

    async fn update_task(&self, task: &Task) -> Result<Option<Task>, RemoteError> {
        self.begin(RemoteOp::UpdateTask)?;
        let name = checked_name(&task.name)?;
        let mut inner = self.inner.lock();
        let stored = inner
            .lists
            .iter_mut()
            .flat_map(|l| l.tasks.iter_mut())
            .find(|t| t.id == task.id)
            .ok_or_else(|| not_found(format!("task not found: {}", task.id)))?;
        stored.name = name;
        stored.completed = task.completed;
        let confirmed = stored.clone();
        let empty = inner.empty_update_responses;
        drop(inner);
        Ok((!empty).then_some(confirmed))
    }

    async fn clear_completed(&self, list_id: TaskListId) -> Result<TaskList, RemoteError> {
        self.begin(RemoteOp::ClearCompleted)?;
        let mut inner = self.inner.lock();
        let list = inner.list_mut(list_id)?;
        list.tasks.retain(|t| !t.completed);
        let result = TaskList::new(list.id, list.name.clone(), list.tasks.clone());
        drop(inner);
        Ok(result)
    }
}
