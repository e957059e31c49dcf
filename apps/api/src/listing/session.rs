//! Listing session: the filter/sort/page state a stateful caller keeps
//! between renders, with the rule that any change to what is being listed
//! sends the user back to page 1.

use crate::listing::filters::{FilterPatch, FilterState, ALL};
use crate::listing::materialize::{materialize, Listing, PageRequest, DEFAULT_ITEMS_PER_PAGE};
use crate::listing::sorting::SortKey;
use crate::models::Job;

#[derive(Debug, Clone, PartialEq)]
pub struct ListingSession {
    filters: FilterState,
    sort: SortKey,
    page: i64,
    per_page: usize,
}

impl Default for ListingSession {
    fn default() -> Self {
        Self::new(DEFAULT_ITEMS_PER_PAGE)
    }
}

impl ListingSession {
    pub fn new(per_page: usize) -> Self {
        Self {
            filters: FilterState::default(),
            sort: SortKey::default(),
            page: 1,
            per_page: per_page.max(1),
        }
    }

    /// A session pinned to one category, as on a category landing page.
    pub fn for_category(category: &str, per_page: usize) -> Self {
        let mut session = Self::new(per_page);
        session.filters.category = category.to_string();
        session
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn sort(&self) -> &SortKey {
        &self.sort
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn update_filters(&mut self, patch: FilterPatch) {
        self.filters.apply(patch);
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
        self.page = 1;
    }

    /// Clears every filter, keeping `default_category` when the session is
    /// scoped to one.
    pub fn reset_filters(&mut self, default_category: Option<&str>) {
        self.filters = FilterState {
            category: default_category.unwrap_or(ALL).to_string(),
            ..Default::default()
        };
        self.page = 1;
    }

    /// Call when the underlying job collection was refetched.
    pub fn jobs_changed(&mut self) {
        self.page = 1;
    }

    pub fn go_to_page(&mut self, page: i64) {
        self.page = page;
    }

    /// Materializes the current state and stores the clamped page back, so
    /// the next "previous"/"next" step starts from a valid page.
    pub fn view(&mut self, jobs: &[Job]) -> Listing {
        let listing = materialize(
            jobs,
            &self.filters,
            &self.sort,
            PageRequest::new(self.page, self.per_page),
        );
        self.page = listing.page as i64;
        listing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobId;

    fn jobs(n: i64) -> Vec<Job> {
        (0..n)
            .map(|i| {
                let mut j = Job::with_id(JobId::Int(i));
                j.category = Some(if i % 2 == 0 { "IT" } else { "Y tế" }.to_string());
                j
            })
            .collect()
    }

    #[test]
    fn test_filter_change_resets_page() {
        let mut session = ListingSession::new(2);
        session.go_to_page(3);
        session.update_filters(FilterPatch {
            category: Some("IT".to_string()),
            ..Default::default()
        });
        assert_eq!(session.page(), 1);
        assert_eq!(session.filters().category, "IT");
    }

    #[test]
    fn test_sort_change_resets_page() {
        let mut session = ListingSession::new(2);
        session.go_to_page(2);
        session.set_sort(SortKey::SalaryLow);
        assert_eq!(session.page(), 1);
        assert_eq!(session.sort(), &SortKey::SalaryLow);
    }

    #[test]
    fn test_jobs_changed_resets_page() {
        let mut session = ListingSession::new(2);
        session.go_to_page(4);
        session.jobs_changed();
        assert_eq!(session.page(), 1);
    }

    #[test]
    fn test_view_clamps_and_remembers_page() {
        let mut session = ListingSession::new(3);
        session.go_to_page(50);
        let listing = session.view(&jobs(7));
        assert_eq!(listing.page, 3);
        assert_eq!(session.page(), 3);
        assert_eq!(listing.items.len(), 1);
    }

    #[test]
    fn test_reset_keeps_scoped_category() {
        let mut session = ListingSession::for_category("IT", 12);
        session.update_filters(FilterPatch {
            location: Some("Huế".to_string()),
            category: Some("Y tế".to_string()),
            ..Default::default()
        });
        session.reset_filters(Some("IT"));
        assert_eq!(session.filters().category, "IT");
        assert_eq!(session.filters().location, ALL);

        session.reset_filters(None);
        assert_eq!(session.filters().category, ALL);
    }

    #[test]
    fn test_scoped_session_only_lists_its_category() {
        let mut session = ListingSession::for_category("it", 12);
        let listing = session.view(&jobs(6));
        assert_eq!(listing.total_count, 3);
    }
}
