//! `tasklists`: terminal task lists kept in sync with a REST store.
//!
//! The [`registry`] owns the list index and selection, the [`session`] owns
//! the tasks of the selected list, and both talk to a [`remote`] store with
//! confirm-then-apply updates. [`board`] drives them sequentially; [`sync`]
//! runs the same calls on background tasks for the TUI.

pub mod app;
pub mod board;
pub mod config;
pub mod error;
pub mod registry;
pub mod remote;
pub mod session;
pub mod sync;
pub mod ui;

pub use error::SyncError;
