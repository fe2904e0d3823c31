//! Contract behavior both bundled backends must share.

mod tasks;

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use store_contract::{
    AnyStore, FileStore, InMemoryStore, ListOpt, ManualClock, Sort, Store, StoreError,
};
use tasks::{Marker, Task, TaskFactory, Unreadable, TASKS};

/// Runs `check` once per backend, each with a fresh store and clock.
fn each_backend(check: impl Fn(&AnyStore, &ManualClock)) {
    let clock = Arc::new(ManualClock::new(1_000));
    let memory = AnyStore::Memory(InMemoryStore::with_clock(clock.clone()));
    check(&memory, clock.as_ref());

    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(1_000));
    let file = FileStore::open_with_clock(dir.path().join("tasks.json"), clock.clone()).unwrap();
    check(&AnyStore::File(file), clock.as_ref());
}

fn seed(store: &AnyStore, count: u8) -> Vec<String> {
    (0..count)
        .map(|i| {
            let mut task = Task::new(&format!("t-{i}"), &format!("task {i}"), i);
            store.create(&mut task).unwrap();
            task.id
        })
        .collect()
}

#[test]
fn paging_visits_every_item_once() {
    each_backend(|store, _| {
        let created = seed(store, 7);

        let mut seen = Vec::new();
        for (page, expected) in [3usize, 3, 1, 0].into_iter().enumerate() {
            let listing = store.list(&TaskFactory, &ListOpt::new(page, 3)).unwrap();
            assert_eq!(listing.len(), expected, "page {page}");
            assert_eq!(listing.total, 7);
            seen.extend(listing.into_iter().map(|task| task.id));
        }
        assert_eq!(seen, created);
    });
}

#[test]
fn filter_can_combine_conditions() {
    each_backend(|store, _| {
        for priority in 1..=6u8 {
            let mut task = Task::new(&format!("p-{priority}"), "x", priority);
            task.done = priority % 2 == 0;
            store.create(&mut task).unwrap();
        }

        let filtered = || ListOpt::new(0, 1).filter(|task: &Task| task.done && task.priority > 2);
        let first = store.list(&TaskFactory, &filtered()).unwrap();
        let second = store.list(&TaskFactory, &filtered().with_page(1)).unwrap();
        let third = store.list(&TaskFactory, &filtered().with_page(2)).unwrap();

        assert_eq!(first.total, 2);
        assert_eq!(first.items[0].id, "p-4");
        assert_eq!(second.items[0].id, "p-6");
        assert!(third.is_empty());
    });
}

#[test]
fn equal_timestamps_keep_insertion_order() {
    each_backend(|store, _| {
        let created = seed(store, 3);
        for sort in [Sort::CreatedAsc, Sort::CreatedDesc, Sort::UpdatedDesc] {
            let listing = store
                .list(&TaskFactory, &ListOpt::new(0, 10).sort(sort))
                .unwrap();
            let ids: Vec<String> = listing.into_iter().map(|task| task.id).collect();
            assert_eq!(ids, created, "{sort}");
        }
    });
}

#[test]
fn update_refreshes_only_updated_at() {
    each_backend(|store, clock| {
        let mut task = Task::new("t-1", "draft", 1);
        store.create(&mut task).unwrap();
        let created_at = task.created_at;

        clock.advance(5);
        task.title = "final".into();
        task.created_at = 0;
        store.update(&mut task).unwrap();
        assert_eq!(task.created_at, created_at);
        assert_eq!(task.updated_at, created_at + 5);

        let mut loaded = Task::new("t-1", "", 0);
        store.read(&mut loaded).unwrap();
        assert_eq!(loaded.title, "final");
        assert_eq!(loaded.created_at, created_at);
        assert_eq!(loaded.updated_at, created_at + 5);
    });
}

#[test]
fn zero_limit_is_invalid_query() {
    each_backend(|store, _| {
        let err = store.list(&TaskFactory, &ListOpt::new(0, 0)).unwrap_err();
        assert!(matches!(err, StoreError::InvalidQuery(_)));
    });
}

#[test]
fn version_does_not_change_results() {
    each_backend(|store, _| {
        seed(store, 4);
        let plain = store.list(&TaskFactory, &ListOpt::new(0, 10)).unwrap();
        let versioned = store
            .list(&TaskFactory, &ListOpt::new(0, 10).version(3))
            .unwrap();
        assert_eq!(plain, versioned);
    });
}

#[test]
fn bare_items_are_storable() {
    each_backend(|store, _| {
        let mut marker = Marker::new("m-1");
        store.create(&mut marker).unwrap();
        store.read(&mut marker).unwrap();
        store.update(&mut marker).unwrap();
        assert!(store.create(&mut Marker::new("m-1")).unwrap_err().is_duplicate_key());
        store.delete(&marker).unwrap();
        assert!(store.delete(&marker).unwrap_err().is_not_found());

        let err = store.create(&mut Marker::new("")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)));
    });
}

#[test]
fn decode_failure_is_serialization_error() {
    each_backend(|store, _| {
        let mut item = Unreadable { id: "u-1".into() };
        store.create(&mut item).unwrap();
        let err = store.read(&mut item).unwrap_err();
        assert_eq!(err, StoreError::Serialization("unreadable on purpose".into()));
    });
}

#[test]
fn deleted_key_can_be_created_again() {
    each_backend(|store, _| {
        let mut task = Task::new("t-1", "first", 1);
        store.create(&mut task).unwrap();
        store.delete(&task).unwrap();

        let mut again = Task::new("t-1", "second", 2);
        store.create(&mut again).unwrap();
        let mut loaded = Task::new("t-1", "", 0);
        store.read(&mut loaded).unwrap();
        assert_eq!(loaded.title, "second");
    });
}

#[test]
fn assigned_ids_are_listed() {
    each_backend(|store, _| {
        let mut task = Task::new("", "anonymous", 1);
        store.create(&mut task).unwrap();
        assert!(!task.id.is_empty());

        let listing = store.list(&TaskFactory, &ListOpt::default()).unwrap();
        assert_eq!(listing.items, vec![task]);
    });
}

#[test]
fn namespaces_are_isolated() {
    each_backend(|store, _| {
        seed(store, 2);
        let mut foreign = Task::new("t-0", "same id, other namespace", 0);
        foreign.namespace = "archive".into();
        store.create(&mut foreign).unwrap();

        let factory = || Task {
            namespace: "archive".into(),
            ..Task::default()
        };
        let listing = store.list(&factory, &ListOpt::default()).unwrap();
        assert_eq!(listing.total, 1);
        assert_eq!(listing.items[0].title, "same id, other namespace");

        let tasks = store.list(&TaskFactory, &ListOpt::default()).unwrap();
        assert!(tasks.items.iter().all(|task| task.namespace == TASKS));
        assert_eq!(tasks.total, 2);
    });
}

#[test]
fn concurrent_creates_on_distinct_keys_all_land() {
    each_backend(|store, _| {
        let handles: Vec<_> = (0..8u8)
            .map(|i| {
                let store = store.clone();
                thread::spawn(move || {
                    let mut task = Task::new(&format!("c-{i}"), "parallel", i);
                    store.create(&mut task)
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        let listing = store.list(&TaskFactory, &ListOpt::default()).unwrap();
        let ids: HashSet<String> = listing.into_iter().map(|task| task.id).collect();
        assert_eq!(ids.len(), 8);
    });
}

#[test]
fn closed_store_rejects_every_operation() {
    each_backend(|store, _| {
        let mut task = Task::new("t-1", "x", 1);
        store.create(&mut task).unwrap();
        store.close().unwrap();
        store.close().unwrap();

        let closed = |result: Result<(), StoreError>| {
            assert_eq!(result, Err(StoreError::Backend("store is closed".into())));
        };
        closed(store.read(&mut task));
        closed(store.update(&mut task));
        closed(store.delete(&task));
        closed(store.create(&mut Task::new("t-2", "y", 2)));
        assert!(store.list(&TaskFactory, &ListOpt::default()).is_err());
    });
}
