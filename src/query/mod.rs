//! List options: paging, ordering and a single filter predicate.

mod window;

use std::fmt;
use std::ops::Range;

use crate::store::{StoreError, StoreResult};

pub use window::{select, Row};

/// Page size used by [`ListOpt::default`].
pub const DEFAULT_LIMIT: usize = 50;

/// Result ordering for `list`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Sort {
    /// Backend-defined but stable order. The bundled stores use insertion order.
    #[default]
    Natural,
    CreatedAsc,
    CreatedDesc,
    UpdatedAsc,
    UpdatedDesc,
}

impl Sort {
    pub const ALL: [Sort; 5] = [
        Sort::Natural,
        Sort::CreatedAsc,
        Sort::CreatedDesc,
        Sort::UpdatedAsc,
        Sort::UpdatedDesc,
    ];

    /// Timestamp orderings need the item type to expose `TimeTracker`.
    pub fn needs_time_tracker(self) -> bool {
        !matches!(self, Sort::Natural)
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Sort::Natural => "natural",
            Sort::CreatedAsc => "created_asc",
            Sort::CreatedDesc => "created_desc",
            Sort::UpdatedAsc => "updated_asc",
            Sort::UpdatedDesc => "updated_desc",
        };
        f.write_str(name)
    }
}

/// Predicate restricting which items `list` returns.
///
/// Only one filter applies per call. Combine conditions inside `compare`.
pub trait Filter<T: ?Sized> {
    fn compare(&self, candidate: &T) -> bool;
}

impl<T: ?Sized, F> Filter<T> for F
where
    F: Fn(&T) -> bool,
{
    fn compare(&self, candidate: &T) -> bool {
        self(candidate)
    }
}

/// Options for a single `list` call.
pub struct ListOpt<T> {
    /// Zero-based window index into the filtered set.
    pub page: usize,
    /// Window size. Must be positive.
    pub limit: usize,
    pub sort: Sort,
    /// Optional schema discriminant, passed through to the backend.
    pub version: Option<i64>,
    pub filter: Option<Box<dyn Filter<T>>>,
}

impl<T> Default for ListOpt<T> {
    fn default() -> Self {
        Self::new(0, DEFAULT_LIMIT)
    }
}

impl<T> fmt::Debug for ListOpt<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListOpt")
            .field("page", &self.page)
            .field("limit", &self.limit)
            .field("sort", &self.sort)
            .field("version", &self.version)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

impl<T> ListOpt<T> {
    pub fn new(page: usize, limit: usize) -> Self {
        ListOpt {
            page,
            limit,
            sort: Sort::Natural,
            version: None,
            filter: None,
        }
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    pub fn version(mut self, version: i64) -> Self {
        self.version = Some(version);
        self
    }

    pub fn filter(mut self, filter: impl Filter<T> + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Same options, pointed at another page.
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    /// Whether `candidate` belongs to the logical result set.
    pub fn matches(&self, candidate: &T) -> bool {
        self.filter
            .as_ref()
            .map_or(true, |filter| filter.compare(candidate))
    }

    /// Half-open index range of this page within the filtered set.
    pub fn window_bounds(&self) -> Range<usize> {
        let start = self.page.saturating_mul(self.limit);
        start..start.saturating_add(self.limit)
    }

    pub fn validate(&self) -> StoreResult<()> {
        if self.limit == 0 {
            return Err(StoreError::InvalidQuery("limit must be positive".into()));
        }
        Ok(())
    }
}

/// One page of `list` results plus the size of the whole filtered set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<T> {
    pub total: usize,
    pub items: Vec<T>,
}

impl<T> Listing<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> IntoIterator for Listing<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
