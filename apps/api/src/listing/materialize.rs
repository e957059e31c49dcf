//! Result materializer: filter, sort and paginate a job collection into the
//! page a caller renders.

use serde::Serialize;

use crate::listing::filters::{compile, FilterState};
use crate::listing::pagination::paginate;
use crate::listing::sorting::{comparator, SortKey};
use crate::models::Job;

/// Default page size for job listings.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 12;

/// The page a caller asked for. `current_page` is signed so that raw,
/// out-of-range requests can be passed straight through and clamped here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub current_page: i64,
    pub items_per_page: usize,
}

impl PageRequest {
    pub fn new(current_page: i64, items_per_page: usize) -> Self {
        Self {
            current_page,
            items_per_page: items_per_page.max(1),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_ITEMS_PER_PAGE)
    }
}

/// A render-ready page of jobs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub items: Vec<Job>,
    /// Jobs that passed the filters, across all pages.
    pub total_count: usize,
    pub total_pages: usize,
    /// The clamped page number of `items`.
    pub page: usize,
    pub per_page: usize,
    pub start_index: usize,
    pub end_index: usize,
}

/// Filters, stably sorts and paginates `jobs`. The input is never reordered;
/// only the returned page is cloned.
pub fn materialize(
    jobs: &[Job],
    filters: &FilterState,
    sort_key: &SortKey,
    page: PageRequest,
) -> Listing {
    let predicate = compile(filters);
    let mut matched: Vec<&Job> = jobs.iter().filter(predicate.as_fn()).collect();

    let cmp = comparator(sort_key);
    matched.sort_by(|a, b| cmp(a, b));

    let per_page = page.items_per_page.max(1);
    let slice = paginate(&matched, page.current_page, per_page);

    Listing {
        items: slice.page_items.iter().map(|job| (*job).clone()).collect(),
        total_count: matched.len(),
        total_pages: slice.total_pages,
        page: slice.page,
        per_page,
        start_index: slice.start_index,
        end_index: slice.end_index,
    }
}
