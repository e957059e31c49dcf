//! Sort strategy selector: maps a sort key to a comparator over jobs.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::Job;

/// Sort order requested by the caller. Unknown keys are kept verbatim and
/// leave the input order untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    SalaryHigh,
    SalaryLow,
    Unordered(String),
}

impl From<&str> for SortKey {
    fn from(raw: &str) -> Self {
        match raw {
            "newest" => SortKey::Newest,
            "oldest" => SortKey::Oldest,
            "salary_high" => SortKey::SalaryHigh,
            "salary_low" => SortKey::SalaryLow,
            other => SortKey::Unordered(other.to_string()),
        }
    }
}

impl From<String> for SortKey {
    fn from(raw: String) -> Self {
        SortKey::from(raw.as_str())
    }
}

impl From<SortKey> for String {
    fn from(key: SortKey) -> Self {
        key.to_string()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Newest => f.write_str("newest"),
            SortKey::Oldest => f.write_str("oldest"),
            SortKey::SalaryHigh => f.write_str("salary_high"),
            SortKey::SalaryLow => f.write_str("salary_low"),
            SortKey::Unordered(raw) => f.write_str(raw),
        }
    }
}

/// Returns the comparator for `key`. Must be used with a stable sort: the
/// `Unordered` comparator reports every pair as equal.
pub fn comparator(key: &SortKey) -> fn(&Job, &Job) -> Ordering {
    match key {
        SortKey::Newest => |a, b| listed_millis(b).cmp(&listed_millis(a)),
        SortKey::Oldest => |a, b| listed_millis(a).cmp(&listed_millis(b)),
        // Raw byte order of the text: "9 triệu" ranks above "15 triệu", and
        // case matters ("Thỏa thuận" sorts before "thỏa thuận").
        SortKey::SalaryHigh => |a, b| salary_text(b).cmp(salary_text(a)),
        SortKey::SalaryLow => |a, b| salary_text(a).cmp(salary_text(b)),
        SortKey::Unordered(_) => |_, _| Ordering::Equal,
    }
}

fn salary_text(job: &Job) -> &str {
    job.salary.as_deref().unwrap_or_default()
}

fn listed_millis(job: &Job) -> i64 {
    job.listed_at().map_or(0, parse_timestamp_millis)
}

/// Parses the date formats the listing API and imported fixtures use into
/// epoch milliseconds. Offset-less values are read as UTC. Anything
/// unparsable is the epoch.
pub fn parse_timestamp_millis(raw: &str) -> i64 {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.timestamp_millis();
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return dt.timestamp_millis();
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return dt.timestamp_millis();
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return naive.and_utc().timestamp_millis();
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map_or(0, |naive| naive.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobId;

    fn posted(id: i64, at: Option<&str>) -> Job {
        let mut job = Job::with_id(JobId::Int(id));
        job.posted_at = at.map(str::to_string);
        job
    }

    fn salaried(id: i64, salary: Option<&str>) -> Job {
        let mut job = Job::with_id(JobId::Int(id));
        job.salary = salary.map(str::to_string);
        job
    }

    fn ids(jobs: &[Job]) -> Vec<JobId> {
        jobs.iter().map(|j| j.id.clone()).collect()
    }

    #[test]
    fn test_newest_puts_latest_first() {
        let mut jobs = vec![posted(1, Some("2024-01-01")), posted(2, Some("2024-06-01"))];
        jobs.sort_by(comparator(&SortKey::Newest));
        assert_eq!(ids(&jobs), vec![JobId::Int(2), JobId::Int(1)]);
    }

    #[test]
    fn test_oldest_puts_earliest_first() {
        let mut jobs = vec![
            posted(1, Some("2024-06-01T08:00:00.000Z")),
            posted(2, Some("2024-01-01T08:00:00.000Z")),
        ];
        jobs.sort_by(comparator(&SortKey::Oldest));
        assert_eq!(ids(&jobs), vec![JobId::Int(2), JobId::Int(1)]);
    }

    #[test]
    fn test_unparsable_dates_sort_as_epoch() {
        let mut jobs = vec![
            posted(1, Some("not a date")),
            posted(2, Some("1971-01-01")),
            posted(3, None),
        ];
        jobs.sort_by(comparator(&SortKey::Oldest));
        // 1 and 3 tie at the epoch and keep their relative order
        assert_eq!(ids(&jobs), vec![JobId::Int(1), JobId::Int(3), JobId::Int(2)]);
    }

    #[test]
    fn test_created_at_is_the_fallback_date() {
        let mut a = posted(1, None);
        a.created_at = Some("2024-09-01".to_string());
        let b = posted(2, Some("2024-03-01"));
        let mut jobs = vec![b, a];
        jobs.sort_by(comparator(&SortKey::Newest));
        assert_eq!(ids(&jobs), vec![JobId::Int(1), JobId::Int(2)]);
    }

    #[test]
    fn test_salary_order_is_textual() {
        let mut jobs = vec![
            salaried(1, Some("15 triệu")),
            salaried(2, Some("9 triệu")),
            salaried(3, None),
        ];
        jobs.sort_by(comparator(&SortKey::SalaryHigh));
        assert_eq!(ids(&jobs), vec![JobId::Int(2), JobId::Int(1), JobId::Int(3)]);

        jobs.sort_by(comparator(&SortKey::SalaryLow));
        assert_eq!(ids(&jobs), vec![JobId::Int(3), JobId::Int(1), JobId::Int(2)]);
    }

    #[test]
    fn test_salary_order_is_case_sensitive() {
        let mut jobs = vec![salaried(1, Some("thỏa thuận")), salaried(2, Some("Thỏa thuận"))];
        jobs.sort_by(comparator(&SortKey::SalaryLow));
        assert_eq!(ids(&jobs), vec![JobId::Int(2), JobId::Int(1)]);
    }

    #[test]
    fn test_unknown_key_preserves_order() {
        let mut jobs = vec![
            posted(3, Some("2024-01-01")),
            posted(1, Some("2025-01-01")),
            posted(2, None),
        ];
        let key = SortKey::from("relevance");
        assert_eq!(key, SortKey::Unordered("relevance".to_string()));
        jobs.sort_by(comparator(&key));
        assert_eq!(ids(&jobs), vec![JobId::Int(3), JobId::Int(1), JobId::Int(2)]);
    }

    #[test]
    fn test_sort_key_serde_uses_wire_names() {
        let key: SortKey = serde_json::from_str("\"salary_high\"").unwrap();
        assert_eq!(key, SortKey::SalaryHigh);
        assert_eq!(serde_json::to_string(&SortKey::Oldest).unwrap(), "\"oldest\"");
    }

    #[test]
    fn test_timestamp_formats() {
        let day = parse_timestamp_millis("2024-01-02");
        assert_eq!(day, 1_704_153_600_000);
        assert_eq!(parse_timestamp_millis("2024-01-02T00:00:00Z"), day);
        assert_eq!(parse_timestamp_millis("2024-01-02 07:00:00+07"), day);
        assert_eq!(parse_timestamp_millis("2024-01-02T00:00:00.000"), day);
        assert_eq!(parse_timestamp_millis(""), 0);
    }
}
