//! The decode, filter, sort and window pipeline behind `list`.
//!
//! Bundled backends hand their namespace-scoped records to [`select`] while
//! holding a read lock, so every backend orders and pages the same way.
//! Third-party backends can reuse it the same way.

use std::cmp::Reverse;

use tracing::trace;

use super::{ListOpt, Listing, Sort};
use crate::item::{Factory, Item, Serializable};
use crate::store::{StoreError, StoreResult};

/// One stored record as seen by the list pipeline.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    /// Insertion sequence. Defines natural order and breaks timestamp ties.
    pub seq: u64,
    pub created_at: i64,
    pub updated_at: i64,
    pub payload: &'a [u8],
}

/// Runs `opts` over `rows`, which must all belong to the factory's namespace.
pub fn select<'a, F, I>(
    rows: I,
    factory: &F,
    opts: &ListOpt<F::Item>,
) -> StoreResult<Listing<F::Item>>
where
    F: Factory,
    I: IntoIterator<Item = Row<'a>>,
{
    opts.validate()?;
    if opts.sort.needs_time_tracker() && factory.create().as_time_tracker().is_none() {
        return Err(StoreError::InvalidQuery(format!(
            "sort {} requires an item type that tracks time",
            opts.sort
        )));
    }

    let mut rows: Vec<Row<'a>> = rows.into_iter().collect();
    rows.sort_by_key(|row| row.seq);
    let scanned = rows.len();

    let mut matched = Vec::with_capacity(rows.len());
    for row in rows {
        let item = materialize(factory, &row)?;
        if opts.matches(&item) {
            matched.push((row, item));
        }
    }

    // Stable sorts: equal timestamps keep insertion order.
    match opts.sort {
        Sort::Natural => {}
        Sort::CreatedAsc => matched.sort_by_key(|(row, _)| row.created_at),
        Sort::CreatedDesc => matched.sort_by_key(|(row, _)| Reverse(row.created_at)),
        Sort::UpdatedAsc => matched.sort_by_key(|(row, _)| row.updated_at),
        Sort::UpdatedDesc => matched.sort_by_key(|(row, _)| Reverse(row.updated_at)),
    }

    let total = matched.len();
    let window = opts.window_bounds();
    let items: Vec<F::Item> = matched
        .into_iter()
        .skip(window.start)
        .take(opts.limit)
        .map(|(_, item)| item)
        .collect();

    trace!(
        scanned,
        total,
        returned = items.len(),
        page = opts.page,
        sort = %opts.sort,
        "list window selected"
    );

    Ok(Listing { total, items })
}

fn materialize<F: Factory>(factory: &F, row: &Row<'_>) -> StoreResult<F::Item> {
    let mut item = factory.create();
    if !row.payload.is_empty() {
        item.unmarshal(row.payload)?;
    }
    if let Some(tracker) = item.as_time_tracker_mut() {
        tracker.set_created_at(row.created_at);
        tracker.set_updated_at(row.updated_at);
    }
    Ok(item)
}
