//! Property-based tests for the entity model and wire bodies.
//!
//! Uses proptest to verify:
//! 1. `TaskList::new` always derives a `remaining` that matches its tasks.
//! 2. Lists survive JSON encode → decode with the invariant intact.
//! 3. Arbitrary text never causes a panic when decoded as a wire body.
//! 4. `validate_name` accepts exactly the non-blank, bounded names.

use proptest::prelude::*;
use tasklists_proto::api::{ErrorBody, TaskListsBody};
use tasklists_proto::{
    NameError, Task, TaskId, TaskList, TaskListId, count_remaining, validate_name,
};

fn arb_task() -> impl Strategy<Value = Task> {
    (any::<u64>(), "[a-zA-Z0-9 ]{1,32}", any::<bool>()).prop_map(|(id, name, completed)| Task {
        id: TaskId::new(id),
        name,
        completed,
    })
}

fn arb_task_list() -> impl Strategy<Value = TaskList> {
    (
        any::<u64>(),
        "[a-zA-Z0-9 ]{1,32}",
        prop::collection::vec(arb_task(), 0..64),
    )
        .prop_map(|(id, name, tasks)| TaskList::new(TaskListId::new(id), name, tasks))
}

proptest! {
    #[test]
    fn new_list_is_always_consistent(list in arb_task_list()) {
        prop_assert!(list.is_consistent());
        prop_assert_eq!(list.remaining, list.tasks.iter().filter(|t| !t.completed).count());
    }

    #[test]
    fn json_preserves_list_and_invariant(list in arb_task_list()) {
        let json = serde_json::to_string(&list).unwrap();
        let decoded: TaskList = serde_json::from_str(&json).unwrap();
        prop_assert!(decoded.is_consistent());
        prop_assert_eq!(decoded, list);
    }

    #[test]
    fn remaining_never_exceeds_task_count(tasks in prop::collection::vec(arb_task(), 0..64)) {
        prop_assert!(count_remaining(&tasks) <= tasks.len());
    }

    #[test]
    fn decoding_arbitrary_text_never_panics(text in ".{0,256}") {
        let _ = serde_json::from_str::<TaskList>(&text);
        let _ = serde_json::from_str::<TaskListsBody>(&text);
        let _ = serde_json::from_str::<ErrorBody>(&text);
    }

    #[test]
    fn validate_name_accepts_any_non_blank(name in "\\PC{0,300}") {
        let trimmed = name.trim();
        match validate_name(&name) {
            Ok(valid) => {
                prop_assert_eq!(valid, trimmed);
                prop_assert!(!valid.is_empty());
            }
            Err(NameError::Empty) => prop_assert!(trimmed.is_empty()),
        }
    }
}
