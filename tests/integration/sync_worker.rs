//! Integration tests for the background sync worker.
//!
//! Commands run concurrently on the worker; these tests check that the
//! registry and session, fed the resulting events in arrival order, end up
//! showing the latest selection no matter which response lands first.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use tasklists::SyncError;
use tasklists::registry::ListRegistry;
use tasklists::remote::memory::InMemoryRemoteStore;
use tasklists::session::TaskSession;
use tasklists::sync::{SyncCommand, SyncEvent, spawn_sync};
use tasklists_proto::TaskListId;

async fn next_event(rx: &mut mpsc::Receiver<SyncEvent>) -> SyncEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for sync event")
        .expect("sync worker stopped")
}

fn two_lists() -> (InMemoryRemoteStore, TaskListId, TaskListId) {
    let store = InMemoryRemoteStore::new();
    let a = store.seed_list("A");
    let b = store.seed_list("B");
    store.seed_task(a, "a1", false).unwrap();
    store.seed_task(a, "a2", false).unwrap();
    store.seed_task(b, "b1", true).unwrap();
    (store, a, b)
}

#[tokio::test]
async fn slow_response_for_previous_selection_is_discarded() {
    let (store, a, b) = two_lists();
    store.set_latency(a, Duration::from_millis(300));
    let (tx, mut rx) = spawn_sync(Arc::new(store), 8);

    let mut session = TaskSession::new();
    let ticket_a = session.on_selection_changed(Some(a)).unwrap();
    tx.send(SyncCommand::LoadTasks { ticket: ticket_a }).await.unwrap();
    let ticket_b = session.on_selection_changed(Some(b)).unwrap();
    tx.send(SyncCommand::LoadTasks { ticket: ticket_b }).await.unwrap();

    // B answers first, A afterwards.
    let mut outcomes = Vec::new();
    for _ in 0..2 {
        let SyncEvent::TasksLoaded { ticket, result } = next_event(&mut rx).await else {
            panic!("expected TasksLoaded");
        };
        outcomes.push((ticket.list_id, session.apply_loaded(ticket, result)));
    }

    assert_eq!(outcomes[0], (b, Ok(())));
    assert_eq!(outcomes[1], (a, Err(SyncError::StaleResponse(a))));
    assert_eq!(session.list_id(), Some(b));
    assert_eq!(session.tasks().len(), 1);
    assert_eq!(session.tasks()[0].name, "b1");
    assert_eq!(session.remaining(), 0);
}

#[tokio::test]
async fn registry_cascade_through_worker() {
    let (store, a, _b) = two_lists();
    let (tx, mut rx) = spawn_sync(Arc::new(store), 8);
    let mut registry = ListRegistry::new();
    let mut session = TaskSession::new();

    tx.send(SyncCommand::LoadLists).await.unwrap();
    let SyncEvent::ListsLoaded(result) = next_event(&mut rx).await else {
        panic!("expected ListsLoaded");
    };
    registry.apply_loaded(result).unwrap();
    assert_eq!(registry.lists().len(), 2);

    let change = registry.select(Some(a)).unwrap();
    let ticket = session.on_selection_changed(change.current).unwrap();
    tx.send(SyncCommand::LoadTasks { ticket }).await.unwrap();
    let SyncEvent::TasksLoaded { ticket, result } = next_event(&mut rx).await else {
        panic!("expected TasksLoaded");
    };
    session.apply_loaded(ticket, result).unwrap();
    assert_eq!(session.remaining(), 2);

    let request = session.prepare_add("a3").unwrap();
    tx.send(SyncCommand::AddTask(request)).await.unwrap();
    let SyncEvent::TaskAdded { ticket, result } = next_event(&mut rx).await else {
        panic!("expected TaskAdded");
    };
    session.apply_added(ticket, result).unwrap();
    assert_eq!(session.remaining(), 3);

    tx.send(SyncCommand::DeleteList { id: a }).await.unwrap();
    let SyncEvent::ListDeleted { id, result } = next_event(&mut rx).await else {
        panic!("expected ListDeleted");
    };
    let change = registry.apply_deleted(id, result).unwrap().unwrap();
    assert_eq!(session.on_selection_changed(change.current), None);
    assert!(session.tasks().is_empty());
}

#[tokio::test]
async fn overlapping_toggles_keep_remaining_consistent() {
    let (store, a, _b) = two_lists();
    let store = Arc::new(store);
    let (tx, mut rx) = spawn_sync(Arc::clone(&store), 16);

    let mut session = TaskSession::new();
    let ticket = session.on_selection_changed(Some(a)).unwrap();
    session
        .apply_loaded(ticket, Ok(store.snapshot(a).unwrap()))
        .unwrap();

    let ids: Vec<_> = session.tasks().iter().map(|t| t.id).collect();
    for id in &ids {
        let request = session.prepare_toggle(*id, true).unwrap();
        tx.send(SyncCommand::ToggleTask(request)).await.unwrap();
    }
    // A duplicate of the first toggle, sent before any answer arrived.
    let request = session.prepare_toggle(ids[0], true).unwrap();
    tx.send(SyncCommand::ToggleTask(request)).await.unwrap();

    for _ in 0..=ids.len() {
        let SyncEvent::TaskToggled { request, result } = next_event(&mut rx).await else {
            panic!("expected TaskToggled");
        };
        session.apply_toggled(request, result).unwrap();
    }

    assert_eq!(session.remaining(), 0);
    assert_eq!(store.snapshot(a).unwrap().remaining, 0);
}
