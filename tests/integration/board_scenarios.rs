//! Integration tests for the list/task synchronization scenarios.
//!
//! Drives a `TaskBoard` over the in-memory store and checks the
//! confirm-then-apply behaviour end to end: validation before any remote
//! call, selection cascades, and state left untouched by failures.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use tasklists::SyncError;
use tasklists::board::TaskBoard;
use tasklists::remote::RemoteOp;
use tasklists::remote::memory::InMemoryRemoteStore;
use tasklists::session::SessionPhase;
use tasklists_proto::{NameError, TaskListId};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// A board with one selected, loaded, empty list named "Groceries".
async fn board_with_groceries() -> (TaskBoard<InMemoryRemoteStore>, TaskListId) {
    let mut board = TaskBoard::new(InMemoryRemoteStore::new());
    board.load_lists().await.unwrap();
    let list = board.create_list("Groceries").await.unwrap();
    board.select_list(Some(list.id)).await.unwrap();
    (board, list.id)
}

// ===========================================================================
// Lists
// ===========================================================================

#[tokio::test]
async fn create_select_add_toggle() {
    let mut board = TaskBoard::new(InMemoryRemoteStore::new());
    board.load_lists().await.unwrap();

    let err = board.create_list("").await.unwrap_err();
    assert_eq!(err, SyncError::Validation(NameError::Empty));
    assert!(board.registry().lists().is_empty());

    let groceries = board.create_list("Groceries").await.unwrap();
    assert_eq!(board.registry().lists().len(), 1);

    board.select_list(Some(groceries.id)).await.unwrap();
    assert_eq!(board.session().phase(), SessionPhase::Ready);

    board.add_task("Milk").await.unwrap();
    assert_eq!(board.session().remaining(), 1);

    let milk = board.session().tasks()[0].id;
    board.toggle_task(milk, true).await.unwrap();
    assert_eq!(board.session().remaining(), 0);
    assert!(board.session().tasks()[0].completed);
}

#[tokio::test]
async fn rejected_list_name_makes_no_remote_call() {
    let mut board = TaskBoard::new(InMemoryRemoteStore::new());
    let err = board.create_list(" \t ").await.unwrap_err();
    assert_eq!(err, SyncError::Validation(NameError::Empty));
    assert_eq!(board.remote().calls(), 0);
}

#[tokio::test]
async fn long_list_name_is_sent_to_the_store() {
    let mut board = TaskBoard::new(InMemoryRemoteStore::new());
    let name = "x".repeat(300);
    let created = board.create_list(&name).await.unwrap();
    assert_eq!(created.name, name);
    assert_eq!(board.remote().calls(), 1);
}

#[tokio::test]
async fn failed_list_load_keeps_degraded_state() {
    let store = InMemoryRemoteStore::new();
    store.seed_list("Existing");
    store.fail_next(RemoteOp::ListTaskLists);
    let mut board = TaskBoard::new(store);

    assert!(matches!(
        board.load_lists().await,
        Err(SyncError::Remote(_))
    ));
    assert!(board.registry().lists().is_empty());

    board.load_lists().await.unwrap();
    assert_eq!(board.registry().lists().len(), 1);
}

#[tokio::test]
async fn deleting_selected_list_empties_session() {
    let (mut board, groceries) = board_with_groceries().await;
    board.add_task("Milk").await.unwrap();

    board.delete_list(groceries).await.unwrap();
    assert_eq!(board.registry().selected(), None);
    assert_eq!(board.session().phase(), SessionPhase::Empty);
    assert!(board.session().tasks().is_empty());
    assert_eq!(board.session().remaining(), 0);
}

#[tokio::test]
async fn failed_delete_keeps_selection_and_tasks() {
    let (mut board, groceries) = board_with_groceries().await;
    board.add_task("Milk").await.unwrap();
    board.remote().fail_next(RemoteOp::DeleteTaskList);

    assert!(board.delete_list(groceries).await.is_err());
    assert_eq!(board.registry().selected(), Some(groceries));
    assert_eq!(board.session().tasks().len(), 1);
}

// ===========================================================================
// Tasks
// ===========================================================================

#[tokio::test]
async fn blank_task_is_rejected_without_remote_call() {
    let (mut board, _) = board_with_groceries().await;
    board.add_task("Milk").await.unwrap();
    let calls = board.remote().calls();
    let before = board.session().tasks().to_vec();

    let err = board.add_task("   ").await.unwrap_err();
    assert_eq!(err, SyncError::Validation(NameError::Empty));
    assert_eq!(board.session().tasks(), before.as_slice());
    assert_eq!(board.remote().calls(), calls);
}

#[tokio::test]
async fn add_without_selection_is_not_ready() {
    let mut board = TaskBoard::new(InMemoryRemoteStore::new());
    assert_eq!(board.add_task("Milk").await.unwrap_err(), SyncError::NotReady);
    assert_eq!(board.remote().calls(), 0);
}

#[tokio::test]
async fn toggle_failure_leaves_snapshot() {
    let (mut board, _) = board_with_groceries().await;
    board.add_task("Milk").await.unwrap();
    board.add_task("Eggs").await.unwrap();
    let tasks_before = board.session().tasks().to_vec();
    let remaining_before = board.session().remaining();

    board.remote().fail_next(RemoteOp::UpdateTask);
    let milk = tasks_before[0].id;
    assert!(matches!(
        board.toggle_task(milk, true).await,
        Err(SyncError::Remote(_))
    ));

    assert_eq!(board.session().tasks(), tasks_before.as_slice());
    assert_eq!(board.session().remaining(), remaining_before);
}

#[tokio::test]
async fn same_value_toggle_is_net_no_op() {
    let (mut board, _) = board_with_groceries().await;
    board.add_task("Milk").await.unwrap();
    let milk = board.session().tasks()[0].id;

    board.toggle_task(milk, false).await.unwrap();
    assert_eq!(board.session().remaining(), 1);

    board.toggle_task(milk, true).await.unwrap();
    board.toggle_task(milk, true).await.unwrap();
    assert_eq!(board.session().remaining(), 0);
}

#[tokio::test]
async fn empty_update_response_applies_candidate() {
    let (mut board, _) = board_with_groceries().await;
    board.add_task("Milk").await.unwrap();
    board.remote().set_empty_update_responses(true);
    let milk = board.session().tasks()[0].id;

    board.toggle_task(milk, true).await.unwrap();
    assert!(board.session().tasks()[0].completed);
    assert_eq!(board.session().remaining(), 0);
}

#[tokio::test]
async fn failed_load_then_reload_recovers() {
    let store = InMemoryRemoteStore::new();
    let list = store.seed_list("Groceries");
    store.seed_task(list, "Milk", false).unwrap();
    let mut board = TaskBoard::new(store);
    board.load_lists().await.unwrap();

    board.remote().fail_next(RemoteOp::GetTaskList);
    assert!(board.select_list(Some(list)).await.is_err());
    assert_eq!(board.registry().selected(), Some(list));
    assert_eq!(board.session().phase(), SessionPhase::Loading);
    assert!(board.session().tasks().is_empty());

    board.reload().await.unwrap();
    assert_eq!(board.session().phase(), SessionPhase::Ready);
    assert_eq!(board.session().remaining(), 1);
}

#[tokio::test]
async fn switching_lists_does_not_bleed_tasks() {
    let store = InMemoryRemoteStore::new();
    let a = store.seed_list("A");
    let b = store.seed_list("B");
    store.seed_task(a, "only in a", false).unwrap();
    let mut board = TaskBoard::new(store);
    board.load_lists().await.unwrap();

    board.select_list(Some(a)).await.unwrap();
    assert_eq!(board.session().tasks().len(), 1);

    board.select_list(Some(b)).await.unwrap();
    assert!(board.session().tasks().is_empty());
    assert_eq!(board.session().remaining(), 0);
}

#[tokio::test]
async fn clear_completed_matches_store() {
    let (mut board, groceries) = board_with_groceries().await;
    for name in ["Milk", "Eggs", "Bread"] {
        board.add_task(name).await.unwrap();
    }
    let eggs = board.session().tasks()[1].id;
    board.toggle_task(eggs, true).await.unwrap();

    board.clear_completed().await.unwrap();
    let names: Vec<&str> = board
        .session()
        .tasks()
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(names, ["Milk", "Bread"]);
    assert_eq!(board.session().remaining(), 2);
    assert_eq!(
        board.remote().snapshot(groceries).unwrap().tasks,
        board.session().tasks()
    );
}
