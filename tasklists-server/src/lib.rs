//! Task list REST server library.
//!
//! Exposes the router, the in-memory store, and the server entry points for
//! use in tests and embedding. The server answers the task list REST
//! contract defined in `tasklists_proto::api`.

pub mod api;
pub mod config;
pub mod store;
