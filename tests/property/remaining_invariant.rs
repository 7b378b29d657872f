//! Property-based tests for the session's remaining count.
//!
//! Uses proptest to drive a `TaskSession` through random sequences of
//! add/toggle/clear requests whose responses arrive in random order and
//! randomly fail, and verifies after every step that `remaining` equals
//! the number of incomplete tasks.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;
use tasklists::remote::RemoteError;
use tasklists::session::{LoadTicket, TaskSession, ToggleRequest};
use tasklists_proto::{Task, TaskId, TaskList, TaskListId, count_remaining};

/// A request issued by the user.
#[derive(Debug, Clone)]
enum Issue {
    Add,
    Toggle { index: usize, completed: bool },
    Clear,
}

/// One step of the simulation.
#[derive(Debug, Clone)]
enum Step {
    /// Issue a new request; it stays in flight until resolved.
    Issue(Issue),
    /// Resolve an in-flight request (index modulo the number in flight).
    Resolve {
        pick: usize,
        fail: bool,
        echo: bool,
    },
}

#[derive(Debug)]
enum InFlight {
    Add(LoadTicket),
    Toggle(ToggleRequest),
    Clear(LoadTicket),
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        2 => Just(Step::Issue(Issue::Add)),
        3 => (any::<usize>(), any::<bool>())
            .prop_map(|(index, completed)| Step::Issue(Issue::Toggle { index, completed })),
        1 => Just(Step::Issue(Issue::Clear)),
        5 => (any::<usize>(), any::<bool>(), any::<bool>())
            .prop_map(|(pick, fail, echo)| Step::Resolve { pick, fail, echo }),
    ]
}

fn failure() -> RemoteError {
    RemoteError::Transport {
        reason: "injected".to_string(),
    }
}

fn assert_invariant(session: &TaskSession) -> Result<(), TestCaseError> {
    prop_assert_eq!(session.remaining(), count_remaining(session.tasks()));
    Ok(())
}

proptest! {
    #[test]
    fn remaining_matches_tasks_in_every_state(
        initial in prop::collection::vec(any::<bool>(), 0..8),
        steps in prop::collection::vec(arb_step(), 0..80),
    ) {
        let list_id = TaskListId::new(1);
        let mut next_id = 1u64;
        let tasks: Vec<Task> = initial
            .iter()
            .map(|&completed| {
                let task = Task { id: TaskId::new(next_id), name: format!("t{next_id}"), completed };
                next_id += 1;
                task
            })
            .collect();

        let mut session = TaskSession::new();
        let ticket = session.on_selection_changed(Some(list_id)).unwrap();
        session.apply_loaded(ticket, Ok(TaskList::new(list_id, "L", tasks))).unwrap();
        assert_invariant(&session)?;

        let mut in_flight: Vec<InFlight> = Vec::new();
        for step in steps {
            match step {
                Step::Issue(Issue::Add) => {
                    let request = session.prepare_add("task").unwrap();
                    in_flight.push(InFlight::Add(request.ticket));
                }
                Step::Issue(Issue::Toggle { index, completed }) => {
                    if session.tasks().is_empty() {
                        continue;
                    }
                    let id = session.tasks()[index % session.tasks().len()].id;
                    let request = session.prepare_toggle(id, completed).unwrap();
                    in_flight.push(InFlight::Toggle(request));
                }
                Step::Issue(Issue::Clear) => {
                    in_flight.push(InFlight::Clear(session.prepare_clear().unwrap()));
                }
                Step::Resolve { pick, fail, echo } => {
                    if in_flight.is_empty() {
                        continue;
                    }
                    let request = in_flight.remove(pick % in_flight.len());
                    // Failures and tasks cleared meanwhile are both fine here;
                    // only the invariant matters.
                    let _ = match request {
                        InFlight::Add(ticket) => {
                            let result = if fail {
                                Err(failure())
                            } else {
                                let task = Task {
                                    id: TaskId::new(next_id),
                                    name: "task".to_string(),
                                    completed: false,
                                };
                                next_id += 1;
                                Ok(task)
                            };
                            session.apply_added(ticket, result)
                        }
                        InFlight::Toggle(request) => {
                            let result = if fail {
                                Err(failure())
                            } else if echo {
                                Ok(Some(request.candidate.clone()))
                            } else {
                                Ok(None)
                            };
                            session.apply_toggled(request, result)
                        }
                        InFlight::Clear(ticket) => {
                            let result = if fail {
                                Err(failure())
                            } else {
                                let open: Vec<Task> = session
                                    .tasks()
                                    .iter()
                                    .filter(|t| !t.completed)
                                    .cloned()
                                    .collect();
                                Ok(TaskList::new(list_id, "L", open))
                            };
                            session.apply_cleared(ticket, result)
                        }
                    };
                }
            }
            assert_invariant(&session)?;
        }
    }

    #[test]
    fn stale_responses_never_touch_state(
        tasks_a in prop::collection::vec(any::<bool>(), 0..8),
        tasks_b in prop::collection::vec(any::<bool>(), 0..8),
    ) {
        let a = TaskListId::new(1);
        let b = TaskListId::new(2);
        let make = |flags: &[bool], offset: u64| -> Vec<Task> {
            flags
                .iter()
                .zip(offset..)
                .map(|(&completed, id)| Task { id: TaskId::new(id), name: format!("t{id}"), completed })
                .collect()
        };

        let mut session = TaskSession::new();
        let ticket_a = session.on_selection_changed(Some(a)).unwrap();
        let ticket_b = session.on_selection_changed(Some(b)).unwrap();
        session.apply_loaded(ticket_b, Ok(TaskList::new(b, "B", make(&tasks_b, 100)))).unwrap();
        let before = session.tasks().to_vec();

        prop_assert!(session.apply_loaded(ticket_a, Ok(TaskList::new(a, "A", make(&tasks_a, 1)))).is_err());
        prop_assert_eq!(session.tasks(), before.as_slice());
        assert_invariant(&session)?;
    }
}
