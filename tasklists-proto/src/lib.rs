//! Shared entity model and REST wire contract for task lists.

pub mod api;
pub mod model;

pub use model::{
    NameError, Task, TaskId, TaskList, TaskListId, TaskListSummary, count_remaining, validate_name,
};
