//! End-to-end tests: `HttpRemoteStore` against the reference server.
//!
//! Each test starts the axum server on an ephemeral port and drives it
//! through the client-side components.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;

use tasklists::SyncError;
use tasklists::board::TaskBoard;
use tasklists::remote::http::HttpRemoteStore;
use tasklists::remote::{RemoteError, RemoteStore};
use tasklists::session::SessionPhase;
use tasklists_proto::{Task, TaskId, TaskListId};

async fn start() -> HttpRemoteStore {
    let (addr, _handle) = tasklists_server::api::start_server("127.0.0.1:0", "/api")
        .await
        .expect("server should start");
    HttpRemoteStore::new(&format!("http://{addr}/api"), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn full_flow_over_http() {
    let mut board = TaskBoard::new(start().await);
    board.load_lists().await.unwrap();
    assert!(board.registry().lists().is_empty());

    let groceries = board.create_list("  Groceries ").await.unwrap();
    assert_eq!(groceries.name, "Groceries");
    board.select_list(Some(groceries.id)).await.unwrap();
    assert_eq!(board.session().phase(), SessionPhase::Ready);

    board.add_task("Milk").await.unwrap();
    board.add_task("Eggs").await.unwrap();
    assert_eq!(board.session().remaining(), 2);

    let milk = board.session().tasks()[0].id;
    board.toggle_task(milk, true).await.unwrap();
    assert_eq!(board.session().remaining(), 1);

    board.clear_completed().await.unwrap();
    assert_eq!(board.session().tasks().len(), 1);
    assert_eq!(board.session().tasks()[0].name, "Eggs");

    // A fresh fetch agrees with the local view.
    let fetched = board.remote().get_task_list(groceries.id).await.unwrap();
    assert_eq!(fetched.tasks, board.session().tasks());
    assert_eq!(fetched.remaining, board.session().remaining());

    board.delete_list(groceries.id).await.unwrap();
    assert_eq!(board.session().phase(), SessionPhase::Empty);
    assert!(board.remote().list_task_lists().await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_list_maps_to_404() {
    let store = start().await;
    let err = store.get_task_list(TaskListId::new(42)).await.unwrap_err();
    assert_eq!(
        err,
        RemoteError::Status {
            status: 404,
            reason: "task list not found: 42".to_string(),
        }
    );
}

#[tokio::test]
async fn unknown_task_update_maps_to_404() {
    let store = start().await;
    let ghost = Task {
        id: TaskId::new(7),
        name: "ghost".to_string(),
        completed: true,
    };
    let err = store.update_task(&ghost).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.reason(), "task not found: 7");
}

#[tokio::test]
async fn server_side_validation_is_reported() {
    let store = start().await;
    let err = store.create_task_list("   ").await.unwrap_err();
    assert_eq!(
        err,
        RemoteError::Status {
            status: 400,
            reason: "invalid name: name cannot be empty".to_string(),
        }
    );
}

#[tokio::test]
async fn failed_toggle_over_http_changes_nothing() {
    let mut board = TaskBoard::new(start().await);
    let list = board.create_list("L").await.unwrap();
    board.select_list(Some(list.id)).await.unwrap();
    board.add_task("Milk").await.unwrap();

    // Remove the list behind the board's back so the update 404s.
    board.remote().delete_task_list(list.id).await.unwrap();
    let milk = board.session().tasks()[0].id;
    let err = board.toggle_task(milk, true).await.unwrap_err();

    assert!(matches!(err, SyncError::Remote(ref e) if e.is_not_found()));
    assert!(!board.session().tasks()[0].completed);
    assert_eq!(board.session().remaining(), 1);
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    // Reserve a free port, then release it so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let offline =
        HttpRemoteStore::new(&format!("http://127.0.0.1:{port}/api"), Duration::from_secs(2))
            .unwrap();
    let err = offline.list_task_lists().await.unwrap_err();
    assert!(matches!(err, RemoteError::Transport { .. }));
}
