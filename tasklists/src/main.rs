//! `tasklists`: terminal task lists backed by a REST store.
//!
//! Launches the TUI against the configured API, or against an in-memory
//! store with demo data when no API URL is set. Configuration via CLI
//! flags, environment variables, or config file
//! (`~/.config/tasklists/config.toml`).
//!
//! ```bash
//! # Offline demo mode
//! cargo run --bin tasklists
//!
//! # Against a running server
//! cargo run --bin tasklists -- --api-url http://127.0.0.1:8080/api
//! TASKLISTS_API_URL=http://127.0.0.1:8080/api cargo run --bin tasklists
//! ```

use std::io;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;

use tasklists::app::App;
use tasklists::config::{CliArgs, ClientConfig};
use tasklists::remote::RemoteStore;
use tasklists::remote::http::HttpRemoteStore;
use tasklists::remote::memory::InMemoryRemoteStore;
use tasklists::sync::{self, SyncCommand, SyncEvent};
use tasklists::ui;

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::default()
        }
    };

    // Logs go to a file, the terminal belongs to the UI.
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!(api_url = ?config.api_url, "tasklists starting");

    let mut app = App::new(config.timestamp_format.clone());
    let (cmd_tx, evt_rx) = match &config.api_url {
        Some(url) => match HttpRemoteStore::new(url, config.request_timeout) {
            Ok(store) => {
                app.set_info(format!("Connected to {}", store.base_url()));
                spawn_worker(store, &config)
            }
            Err(e) => {
                eprintln!("Error: {e}");
                return Err(io::Error::new(io::ErrorKind::InvalidInput, e.to_string()));
            }
        },
        None => {
            app.set_info("Offline demo: changes are kept in memory only");
            spawn_worker(InMemoryRemoteStore::with_demo_data(), &config)
        }
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &cmd_tx, evt_rx, &config);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("tasklists exiting");
    result
}

fn spawn_worker<R: RemoteStore + 'static>(
    store: R,
    config: &ClientConfig,
) -> (mpsc::Sender<SyncCommand>, mpsc::Receiver<SyncEvent>) {
    sync::spawn_sync(Arc::new(store), config.channel_capacity)
}

/// Initialize file-based logging.
///
/// Returns a [`WorkerGuard`] that must be held until shutdown so buffered
/// log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("tasklists.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Main application loop.
///
/// Runs on the main thread. Blocking on `event::poll` is fine here because
/// the sync worker's tasks run on the runtime's worker threads.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    cmd_tx: &mpsc::Sender<SyncCommand>,
    mut evt_rx: mpsc::Receiver<SyncEvent>,
    config: &ClientConfig,
) -> io::Result<()> {
    dispatch(app, cmd_tx, App::startup_command());

    loop {
        // Step 1: Draw the UI frame.
        terminal.draw(|frame| ui::draw(frame, app))?;

        // Step 2: Apply every finished remote call, in arrival order.
        while let Ok(event) = evt_rx.try_recv() {
            if let Some(cmd) = app.apply_event(event) {
                dispatch(app, cmd_tx, cmd);
            }
        }

        // Step 3: Poll for terminal input events.
        if event::poll(config.poll_timeout)?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(cmd) = app.handle_key_event(key) {
                dispatch(app, cmd_tx, cmd);
            }
        }

        if app.should_quit {
            let _ = cmd_tx.try_send(SyncCommand::Shutdown);
            return Ok(());
        }
    }
}

/// Hand a command to the sync worker without blocking the UI.
fn dispatch(app: &mut App, cmd_tx: &mpsc::Sender<SyncCommand>, cmd: SyncCommand) {
    match cmd_tx.try_send(cmd) {
        Ok(()) => app.note_dispatched(),
        Err(mpsc::error::TrySendError::Full(cmd)) => {
            tracing::warn!(command = ?cmd, "sync queue full, dropping command");
            app.set_error("Busy: too many requests in flight, try again");
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            app.set_error("Sync worker stopped");
        }
    }
}
