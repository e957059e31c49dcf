//! URL query adapter: turns `?q=..&category=..&page=..` into engine inputs.

use crate::listing::categories::canonical_category;
use crate::listing::filters::{FilterState, ALL};
use crate::listing::materialize::PageRequest;
use crate::listing::sorting::SortKey;

/// Raw query string of `GET /api/v1/jobs`. Every field is optional text so
/// that malformed values degrade instead of rejecting the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    pub q: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub experience: Option<String>,
    pub job_type: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl<K, V> FromIterator<(K, V)> for ListingQuery
where
    K: AsRef<str>,
    V: Into<String>,
{
    /// Folds decoded query pairs. A repeated key, or a key and its alias,
    /// keeps the first value; unknown keys are ignored.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(pairs: I) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "q" | "search" => &mut query.q,
                "location" => &mut query.location,
                "salary" => &mut query.salary,
                "experience" => &mut query.experience,
                "job_type" | "jobType" => &mut query.job_type,
                "category" => &mut query.category,
                "sort" => &mut query.sort,
                "page" => &mut query.page,
                "per_page" | "limit" => &mut query.per_page,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        query
    }
}

impl ListingQuery {
    pub fn filters(&self) -> FilterState {
        FilterState {
            location: bucket_or_all(&self.location),
            salary: bucket_or_all(&self.salary),
            experience: bucket_or_all(&self.experience),
            job_type: bucket_or_all(&self.job_type),
            category: self
                .category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map_or_else(|| ALL.to_string(), |c| canonical_category(c).to_string()),
            search_query: self.q.as_deref().map(str::trim).unwrap_or_default().to_string(),
        }
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(SortKey::from)
            .unwrap_or_default()
    }

    /// `default_per_page` applies when no size is given; any size is capped
    /// at `max_per_page`.
    pub fn page_request(&self, default_per_page: usize, max_per_page: usize) -> PageRequest {
        let per_page = self
            .per_page
            .as_deref()
            .and_then(parse_count)
            .unwrap_or(default_per_page as i64)
            .clamp(1, max_per_page.max(1) as i64);
        PageRequest::new(
            self.page.as_deref().and_then(parse_count).unwrap_or(1),
            per_page as usize,
        )
    }
}

fn bucket_or_all(value: &Option<String>) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => ALL.to_string(),
    }
}

/// Reads a page number or size. Accepts integers and finite decimals
/// (truncated); `NaN`, infinities and text yield `None`.
fn parse_count(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f.trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> ListingQuery {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn test_empty_query_is_unconstrained() {
        let q = query(&[]);
        assert!(q.filters().is_unconstrained());
        assert_eq!(q.sort_key(), SortKey::Newest);
        assert_eq!(q.page_request(12, 100), PageRequest::new(1, 12));
    }

    #[test]
    fn test_empty_location_means_all() {
        let q = query(&[("location", ""), ("q", "react")]);
        let f = q.filters();
        assert_eq!(f.location, ALL);
        assert_eq!(f.search_query, "react");
    }

    #[test]
    fn test_aliases() {
        let q = query(&[("search", "java"), ("jobType", "remote"), ("limit", "5")]);
        assert_eq!(q.filters().search_query, "java");
        assert_eq!(q.filters().job_type, "remote");
        assert_eq!(q.page_request(12, 100).items_per_page, 5);
    }

    #[test]
    fn test_repeated_keys_keep_the_first_value() {
        let q = query(&[("page", "1"), ("page", "2"), ("q", "a"), ("search", "b")]);
        assert_eq!(q.page.as_deref(), Some("1"));
        assert_eq!(q.filters().search_query, "a");

        let q = query(&[("limit", "5"), ("per_page", "50"), ("utm_source", "x")]);
        assert_eq!(q.page_request(12, 100).items_per_page, 5);
    }

    #[test]
    fn test_blank_search_is_no_constraint() {
        let q = query(&[("q", "   ")]);
        assert_eq!(q.filters().search_query, "");
        assert!(q.filters().is_unconstrained());
    }

    #[test]
    fn test_category_label_is_canonicalised() {
        let q = query(&[("category", "Marketing")]);
        assert_eq!(q.filters().category, "Marketing - Truyền thông");
    }

    #[test]
    fn test_bad_page_values_fall_back_to_first_page() {
        for raw in ["NaN", "abc", "inf", ""] {
            let q = query(&[("page", raw)]);
            assert_eq!(q.page_request(12, 100).current_page, 1, "{raw}");
        }
        let q = query(&[("page", "2.7")]);
        assert_eq!(q.page_request(12, 100).current_page, 2);
        let q = query(&[("page", "-3")]);
        assert_eq!(q.page_request(12, 100).current_page, -3);
    }

    #[test]
    fn test_page_size_is_capped() {
        let q = query(&[("per_page", "500")]);
        assert_eq!(q.page_request(12, 100).items_per_page, 100);
        let q = query(&[("per_page", "0")]);
        assert_eq!(q.page_request(12, 100).items_per_page, 1);
    }

    #[test]
    fn test_unknown_sort_is_kept() {
        let q = query(&[("sort", "relevance")]);
        assert_eq!(q.sort_key(), SortKey::Unordered("relevance".to_string()));
    }
}
