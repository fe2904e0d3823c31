//! Scenario bodies. Each returns the reason it failed, quoting store errors verbatim.

use uuid::Uuid;

use super::fixtures::{SuiteFactory, SuiteItem, UntimedItem, FIXED_ID, NAMESPACE, OTHER_NAMESPACE};
use crate::clock::Clock;
use crate::query::{ListOpt, Sort};
use crate::store::{Store, StoreError, StoreResult};

pub(super) type Outcome = Result<(), String>;

const DUPLICATE_NAMESPACE: &str = "Duplicates";
const ASSIGNED_NAMESPACE: &str = "Assigned";
const FILTER_NAMESPACE: &str = "FilterSpace";
const UNTIMED_NAMESPACE: &str = "Untimed";

/// Safety valve for backends whose paging never runs dry.
const MAX_PAGES: usize = 1_000;

macro_rules! ensure {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err(format!($($arg)+));
        }
    };
}

fn step<T>(what: &str, result: StoreResult<T>) -> Result<T, String> {
    result.map_err(|err| format!("{what}: {err}"))
}

fn expect_not_found(what: &str, result: StoreResult<()>) -> Outcome {
    match result {
        Err(err) if err.is_not_found() => Ok(()),
        Err(err) => Err(format!("{what}: expected not found, got {err}")),
        Ok(()) => Err(format!("{what}: expected not found, but it succeeded")),
    }
}

fn ids(items: &[SuiteItem]) -> Vec<&str> {
    items.iter().map(|item| item.id.as_str()).collect()
}

fn ensure_strictly_ordered(label: &str, values: &[i64], ascending: bool) -> Outcome {
    for pair in values.windows(2) {
        let in_order = if ascending {
            pair[0] < pair[1]
        } else {
            pair[0] > pair[1]
        };
        ensure!(in_order, "{label} out of order: {values:?}");
    }
    Ok(())
}

/// Walks pages of `limit` until an empty one, checking every page bound.
fn collect_pages<S: Store>(
    store: &S,
    namespace: &'static str,
    sort: Sort,
    limit: usize,
) -> Result<Vec<SuiteItem>, String> {
    let factory = SuiteFactory::new(namespace);
    let mut all = Vec::new();
    let mut page = 0;
    loop {
        ensure!(page < MAX_PAGES, "paging {namespace} never reached an empty page");
        let opts = ListOpt::new(page, limit).sort(sort);
        let listing = step(
            &format!("list {namespace} sorted {sort} page {page}"),
            store.list(&factory, &opts),
        )?;
        ensure!(
            listing.len() <= limit,
            "page {page} returned {} items with limit {limit}",
            listing.len()
        );
        if listing.is_empty() {
            ensure!(
                all.len() == listing.total,
                "paging visited {} items but total reports {}",
                all.len(),
                listing.total
            );
            return Ok(all);
        }
        all.extend(listing.items);
        page += 1;
    }
}

/// Three items created one clock tick apart.
fn seed_timeline<S: Store>(
    store: &S,
    clock: &dyn Clock,
    namespace: &'static str,
) -> Result<Vec<SuiteItem>, String> {
    let mut items = Vec::with_capacity(3);
    for i in 0..3 {
        if i > 0 {
            clock.tick();
        }
        let mut item = SuiteItem::new(
            namespace,
            &format!("{namespace}-{i}"),
            &format!("random {i}"),
        );
        step(&format!("create {}", item.id), store.create(&mut item))?;
        items.push(item);
    }
    Ok(items)
}

pub(super) fn nil_storage<S: Store>(store: Option<&S>) -> Outcome {
    ensure!(store.is_some(), "store should not be nil");
    Ok(())
}

pub(super) fn crud_round_trip<S: Store>(store: &S, _clock: &dyn Clock) -> Outcome {
    let mut item = SuiteItem::new(NAMESPACE, FIXED_ID, "created");
    step("create", store.create(&mut item))?;
    ensure!(
        item.created_at == item.updated_at,
        "create stamped created_at {} but updated_at {}",
        item.created_at,
        item.updated_at
    );

    let mut loaded = item.key_only();
    step("read after create", store.read(&mut loaded))?;
    ensure!(
        loaded.rand_str == "created",
        "read after create returned rand_str {:?}",
        loaded.rand_str
    );
    ensure!(
        loaded.created_at == item.created_at,
        "read after create returned created_at {}, create stamped {}",
        loaded.created_at,
        item.created_at
    );

    item.rand_str = "updated".into();
    step("update", store.update(&mut item))?;

    let mut loaded = item.key_only();
    step("read after update", store.read(&mut loaded))?;
    ensure!(
        loaded.rand_str == "updated",
        "read after update returned rand_str {:?}",
        loaded.rand_str
    );
    ensure!(
        loaded.created_at == item.created_at,
        "update moved created_at from {} to {}",
        item.created_at,
        loaded.created_at
    );
    ensure!(
        loaded.updated_at >= loaded.created_at,
        "updated_at {} precedes created_at {}",
        loaded.updated_at,
        loaded.created_at
    );

    step("delete", store.delete(&item))?;
    expect_not_found("read after delete", store.read(&mut item.key_only()))?;
    expect_not_found("update after delete", store.update(&mut item))?;
    expect_not_found("delete after delete", store.delete(&item))
}

pub(super) fn duplicate_create<S: Store>(store: &S, _clock: &dyn Clock) -> Outcome {
    let mut first = SuiteItem::new(DUPLICATE_NAMESPACE, "dup-1", "first");
    step("create", store.create(&mut first))?;

    let mut second = SuiteItem::new(DUPLICATE_NAMESPACE, "dup-1", "second");
    match store.create(&mut second) {
        Err(err) if err.is_duplicate_key() => {}
        Err(err) => return Err(format!("second create: expected duplicate key, got {err}")),
        Ok(()) => return Err("second create of the same key succeeded".into()),
    }

    let mut loaded = first.key_only();
    step("read after rejected create", store.read(&mut loaded))?;
    ensure!(
        loaded.rand_str == "first",
        "rejected create overwrote content with {:?}",
        loaded.rand_str
    );
    Ok(())
}

pub(super) fn missing_key<S: Store>(store: &S, _clock: &dyn Clock) -> Outcome {
    let mut ghost = SuiteItem::new(NAMESPACE, "never-created", "ghost");
    expect_not_found("read of never-created key", store.read(&mut ghost))?;
    expect_not_found("update of never-created key", store.update(&mut ghost))?;
    expect_not_found("delete of never-created key", store.delete(&ghost))
}

pub(super) fn assigned_id<S: Store>(store: &S, _clock: &dyn Clock) -> Outcome {
    let mut first = SuiteItem::new(ASSIGNED_NAMESPACE, "", "a");
    let mut second = SuiteItem::new(ASSIGNED_NAMESPACE, "", "b");
    step("create first", store.create(&mut first))?;
    step("create second", store.create(&mut second))?;
    ensure!(!first.id.is_empty(), "create left an empty id unassigned");
    ensure!(
        first.id != second.id,
        "create assigned the same id {:?} twice",
        first.id
    );

    let mut loaded = first.key_only();
    step("read by assigned id", store.read(&mut loaded))?;
    ensure!(
        loaded.rand_str == "a",
        "read by assigned id returned rand_str {:?}",
        loaded.rand_str
    );
    Ok(())
}

pub(super) fn natural_list<S: Store>(store: &S, _clock: &dyn Clock) -> Outcome {
    let mut created = Vec::with_capacity(5);
    for i in 0..5 {
        let id = Uuid::new_v4().to_string();
        let mut item = SuiteItem::new(NAMESPACE, &id, &format!("random {i}"));
        step(&format!("create {NAMESPACE}/{id}"), store.create(&mut item))?;
        created.push(id);
    }
    for i in 0..5 {
        let id = Uuid::new_v4().to_string();
        let mut item = SuiteItem::new(OTHER_NAMESPACE, &id, &format!("random {i}"));
        step(&format!("create {OTHER_NAMESPACE}/{id}"), store.create(&mut item))?;
    }

    let factory = SuiteFactory::new(NAMESPACE);
    let mut seen = Vec::with_capacity(5);
    for (page, expected) in [2usize, 2, 1].into_iter().enumerate() {
        let listing = step(
            &format!("list page {page}"),
            store.list(&factory, &ListOpt::new(page, 2)),
        )?;
        ensure!(
            listing.len() == expected,
            "page {page} returned {} items, expected {expected}",
            listing.len()
        );
        ensure!(
            listing.total == 5,
            "page {page} reported total {}, expected 5",
            listing.total
        );
        for item in listing {
            ensure!(
                item.namespace == NAMESPACE,
                "page {page} returned an item from namespace {:?}",
                item.namespace
            );
            seen.push(item.id);
        }
    }

    let past_end = step("list page 3", store.list(&factory, &ListOpt::new(3, 2)))?;
    ensure!(
        past_end.is_empty(),
        "page past the end returned {} items",
        past_end.len()
    );

    let mut unique = seen.clone();
    unique.sort();
    unique.dedup();
    let mut expected = created;
    expected.sort();
    ensure!(
        unique == expected,
        "paging returned {seen:?}, expected each of {expected:?} exactly once"
    );

    let again = step("list all", store.list(&factory, &ListOpt::new(0, 5)))?;
    let again: Vec<String> = again.into_iter().map(|item| item.id).collect();
    ensure!(
        again == seen,
        "natural order changed between calls: {seen:?} then {again:?}"
    );
    Ok(())
}

fn created_order<S: Store>(
    store: &S,
    clock: &dyn Clock,
    namespace: &'static str,
    sort: Sort,
) -> Outcome {
    let items = seed_timeline(store, clock, namespace)?;
    let ascending = sort == Sort::CreatedAsc;
    let mut expected = ids(&items);
    if !ascending {
        expected.reverse();
    }

    let listed = collect_pages(store, namespace, sort, 2)?;
    ensure!(
        ids(&listed) == expected,
        "{sort} returned {:?}, expected {expected:?}",
        ids(&listed)
    );
    let stamps: Vec<i64> = listed.iter().map(|item| item.created_at).collect();
    ensure_strictly_ordered("created_at", &stamps, ascending)
}

fn updated_order<S: Store>(
    store: &S,
    clock: &dyn Clock,
    namespace: &'static str,
    sort: Sort,
) -> Outcome {
    let mut items = seed_timeline(store, clock, namespace)?;
    for item in items.iter_mut().rev() {
        clock.tick();
        item.rand_str = format!("{} touched", item.rand_str);
        step(&format!("update {}", item.id), store.update(item))?;
    }

    // Updated newest-first is creation order, since updates ran in reverse.
    let ascending = sort == Sort::UpdatedAsc;
    let mut expected = ids(&items);
    if ascending {
        expected.reverse();
    }

    let listed = collect_pages(store, namespace, sort, 2)?;
    ensure!(
        ids(&listed) == expected,
        "{sort} returned {:?}, expected {expected:?}",
        ids(&listed)
    );
    for item in &listed {
        ensure!(
            item.updated_at > item.created_at,
            "{} has updated_at {} not after created_at {}",
            item.id,
            item.updated_at,
            item.created_at
        );
        ensure!(
            item.rand_str.ends_with("touched"),
            "{} lost its update: {:?}",
            item.id,
            item.rand_str
        );
    }
    let stamps: Vec<i64> = listed.iter().map(|item| item.updated_at).collect();
    ensure_strictly_ordered("updated_at", &stamps, ascending)
}

pub(super) fn created_asc<S: Store>(store: &S, clock: &dyn Clock) -> Outcome {
    created_order(store, clock, "SortCreatedAsc", Sort::CreatedAsc)
}

pub(super) fn created_desc<S: Store>(store: &S, clock: &dyn Clock) -> Outcome {
    created_order(store, clock, "SortCreatedDesc", Sort::CreatedDesc)
}

pub(super) fn updated_asc<S: Store>(store: &S, clock: &dyn Clock) -> Outcome {
    updated_order(store, clock, "SortUpdatedAsc", Sort::UpdatedAsc)
}

pub(super) fn updated_desc<S: Store>(store: &S, clock: &dyn Clock) -> Outcome {
    updated_order(store, clock, "SortUpdatedDesc", Sort::UpdatedDesc)
}

pub(super) fn filter<S: Store>(store: &S, _clock: &dyn Clock) -> Outcome {
    for i in 0..5 {
        let mut item = SuiteItem::new(
            FILTER_NAMESPACE,
            &Uuid::new_v4().to_string(),
            &format!("random {i}"),
        );
        step(&format!("create random {i}"), store.create(&mut item))?;
    }

    let factory = SuiteFactory::new(FILTER_NAMESPACE);
    let opts: ListOpt<SuiteItem> =
        ListOpt::new(0, 10).filter(|item: &SuiteItem| item.rand_str == "random 3");
    let listing = step("filtered list", store.list(&factory, &opts))?;
    ensure!(
        listing.len() == 1 && listing.total == 1,
        "filter matched {} items (total {}), expected exactly 1",
        listing.len(),
        listing.total
    );
    ensure!(
        listing.items[0].rand_str == "random 3",
        "filter returned rand_str {:?}",
        listing.items[0].rand_str
    );

    let opts: ListOpt<SuiteItem> =
        ListOpt::new(0, 10).filter(|item: &SuiteItem| item.rand_str == "random 9");
    let listing = step("list with a filter nothing matches", store.list(&factory, &opts))?;
    ensure!(
        listing.is_empty() && listing.total == 0,
        "filter matching nothing returned {} items (total {})",
        listing.len(),
        listing.total
    );
    Ok(())
}

pub(super) fn untracked_sort<S: Store>(store: &S, _clock: &dyn Clock) -> Outcome {
    let mut item = UntimedItem {
        namespace: UNTIMED_NAMESPACE.into(),
        id: "untimed-1".into(),
    };
    step("create untimed item", store.create(&mut item))?;

    let factory = || UntimedItem {
        namespace: UNTIMED_NAMESPACE.into(),
        id: String::new(),
    };
    for sort in Sort::ALL {
        match store.list(&factory, &ListOpt::new(0, 10).sort(sort)) {
            Ok(listing) if !sort.needs_time_tracker() => {
                ensure!(
                    listing.total == 1,
                    "natural list of untimed items reported total {}",
                    listing.total
                );
            }
            Err(StoreError::InvalidQuery(_)) if sort.needs_time_tracker() => {}
            Ok(_) => return Err(format!("sort {sort} on an item without timestamps succeeded")),
            Err(err) => return Err(format!("list sorted {sort}: {err}")),
        }
    }
    Ok(())
}

pub(super) fn close_twice<S: Store>(store: &S, _clock: &dyn Clock) -> Outcome {
    step("first close", store.close())?;
    step("second close", store.close())
}
