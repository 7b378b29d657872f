//! In-memory task list store.
//!
//! The [`TaskStore`] keeps every list in creation order together with its
//! tasks, assigns identifiers, and answers with the same entity shapes the
//! REST contract returns. Contents are lost on restart.

use std::collections::HashMap;

use tasklists_proto::{
    NameError, Task, TaskId, TaskList, TaskListId, TaskListSummary, validate_name,
};
use tokio::sync::RwLock;

/// Errors returned by [`TaskStore`] operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    /// No list with the given id exists.
    #[error("task list not found: {0}")]
    ListNotFound(TaskListId),
    /// No task with the given id exists.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    /// The submitted name failed validation.
    #[error("invalid name: {0}")]
    InvalidName(#[from] NameError),
}

#[derive(Debug)]
struct StoredList {
    id: TaskListId,
    name: String,
    tasks: Vec<Task>,
}

impl StoredList {
    fn to_task_list(&self) -> TaskList {
        TaskList::new(self.id, self.name.clone(), self.tasks.clone())
    }
}

#[derive(Debug, Default)]
struct StoreState {
    lists: Vec<StoredList>,
    task_owner: HashMap<TaskId, TaskListId>,
    last_list_id: u64,
    last_task_id: u64,
}

impl StoreState {
    fn list(&self, id: TaskListId) -> Result<&StoredList, StoreError> {
        self.lists
            .iter()
            .find(|l| l.id == id)
            .ok_or(StoreError::ListNotFound(id))
    }

    fn list_mut(&mut self, id: TaskListId) -> Result<&mut StoredList, StoreError> {
        self.lists
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(StoreError::ListNotFound(id))
    }

    fn task_mut(&mut self, id: TaskId) -> Result<&mut Task, StoreError> {
        let owner = *self
            .task_owner
            .get(&id)
            .ok_or(StoreError::TaskNotFound(id))?;
        self.list_mut(owner)?
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::TaskNotFound(id))
    }
}

/// Thread-safe in-memory store of task lists and tasks.
///
/// Identifiers start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct TaskStore {
    state: RwLock<StoreState>,
}

impl TaskStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id and name of every list, in creation order.
    pub async fn list_summaries(&self) -> Vec<TaskListSummary> {
        let state = self.state.read().await;
        state
            .lists
            .iter()
            .map(|l| TaskListSummary {
                id: l.id,
                name: l.name.clone(),
            })
            .collect()
    }

    /// Creates an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidName`] if the name fails validation.
    pub async fn create_list(&self, name: &str) -> Result<TaskListSummary, StoreError> {
        let name = validate_name(name)?.to_string();
        let mut state = self.state.write().await;
        state.last_list_id += 1;
        let id = TaskListId::new(state.last_list_id);
        state.lists.push(StoredList {
            id,
            name: name.clone(),
            tasks: Vec::new(),
        });
        drop(state);
        Ok(TaskListSummary { id, name })
    }

    /// Returns a list with its tasks and remaining count.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ListNotFound`] for an unknown id.
    pub async fn get_list(&self, id: TaskListId) -> Result<TaskList, StoreError> {
        let state = self.state.read().await;
        state.list(id).map(StoredList::to_task_list)
    }

    /// Deletes a list and every task it holds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ListNotFound`] for an unknown id.
    pub async fn delete_list(&self, id: TaskListId) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let index = state
            .lists
            .iter()
            .position(|l| l.id == id)
            .ok_or(StoreError::ListNotFound(id))?;
        let removed = state.lists.remove(index);
        for task in &removed.tasks {
            state.task_owner.remove(&task.id);
        }
        drop(state);
        Ok(())
    }

    /// Appends a new, uncompleted task to a list.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidName`] or [`StoreError::ListNotFound`].
    pub async fn create_task(&self, list_id: TaskListId, name: &str) -> Result<Task, StoreError> {
        let name = validate_name(name)?.to_string();
        let mut state = self.state.write().await;
        state.list(list_id)?;
        state.last_task_id += 1;
        let task = Task {
            id: TaskId::new(state.last_task_id),
            name,
            completed: false,
        };
        state.task_owner.insert(task.id, list_id);
        state.list_mut(list_id)?.tasks.push(task.clone());
        drop(state);
        Ok(task)
    }

    /// Replaces a task's name and completion flag.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidName`] or [`StoreError::TaskNotFound`].
    pub async fn update_task(
        &self,
        id: TaskId,
        name: &str,
        completed: bool,
    ) -> Result<Task, StoreError> {
        let name = validate_name(name)?.to_string();
        let mut state = self.state.write().await;
        let task = state.task_mut(id)?;
        task.name = name;
        task.completed = completed;
        let updated = task.clone();
        drop(state);
        Ok(updated)
    }

    /// Deletes a single task.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TaskNotFound`] for an unknown id.
    pub async fn delete_task(&self, id: TaskId) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let owner = state
            .task_owner
            .remove(&id)
            .ok_or(StoreError::TaskNotFound(id))?;
        state.list_mut(owner)?.tasks.retain(|t| t.id != id);
        drop(state);
        Ok(())
    }

    /// Removes every completed task of a list and returns what is left.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ListNotFound`] for an unknown id.
    pub async fn clear_completed(&self, list_id: TaskListId) -> Result<TaskList, StoreError> {
        let mut state = self.state.write().await;
        let list = state.list_mut(list_id)?;
        let (done, open): (Vec<Task>, Vec<Task>) = list.tasks.drain(..).partition(|t| t.completed);
        list.tasks = open;
        let result = list.to_task_list();
        for task in &done {
            state.task_owner.remove(&task.id);
        }
        drop(state);
        Ok(result)
    }
}
