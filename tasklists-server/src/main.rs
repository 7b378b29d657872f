//! Task list REST server.
//!
//! An axum server holding task lists and tasks in memory and serving them
//! under a configurable base path (default `/api`).
//!
//! # Usage
//!
//! ```bash
//! # Run on default address 0.0.0.0:8080, API under /api
//! cargo run --bin tasklists-server
//!
//! # Run on custom address without a prefix
//! cargo run --bin tasklists-server -- --bind 127.0.0.1:29292 --base-path /
//!
//! # Or via environment variable
//! TASKLISTS_SERVER_ADDR=127.0.0.1:29292 cargo run --bin tasklists-server
//! ```

use std::sync::Arc;

use clap::Parser;
use tasklists_server::api;
use tasklists_server::config::{ServerCliArgs, ServerConfig};
use tasklists_server::store::TaskStore;

#[tokio::main]
async fn main() {
    let cli = ServerCliArgs::parse();

    let config = match ServerConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(
        addr = %config.bind_addr,
        base_path = %config.base_path,
        "starting task list server"
    );

    let store = Arc::new(TaskStore::new());

    match api::start_server_with_store(&config.bind_addr, &config.base_path, store).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start server");
            std::process::exit(1);
        }
    }
}
