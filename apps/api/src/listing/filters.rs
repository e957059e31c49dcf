//! Predicate compiler: turns a `FilterState` into a reusable job predicate.
//!
//! All active filters are ANDed. Text comparisons lowercase both sides, and a
//! missing job field is matched as the empty string, so malformed data simply
//! fails to match.

use serde::{Deserialize, Serialize};

use crate::models::Job;

/// Sentinel meaning "no constraint" for the bucketed filters.
pub const ALL: &str = "all";

/// Filter values as chosen in the UI. Each field is either `"all"`, empty, or
/// a concrete bucket key. A missing key deserializes to `"all"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    pub location: String,
    pub salary: String,
    pub experience: String,
    pub job_type: String,
    pub category: String,
    pub search_query: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            location: ALL.to_string(),
            salary: ALL.to_string(),
            experience: ALL.to_string(),
            job_type: ALL.to_string(),
            category: ALL.to_string(),
            search_query: String::new(),
        }
    }
}

/// A partial update to a `FilterState`. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterPatch {
    pub location: Option<String>,
    pub salary: Option<String>,
    pub experience: Option<String>,
    pub job_type: Option<String>,
    pub category: Option<String>,
    pub search_query: Option<String>,
}

impl FilterState {
    pub fn apply(&mut self, patch: FilterPatch) {
        let FilterPatch {
            location,
            salary,
            experience,
            job_type,
            category,
            search_query,
        } = patch;
        if let Some(v) = location {
            self.location = v;
        }
        if let Some(v) = salary {
            self.salary = v;
        }
        if let Some(v) = experience {
            self.experience = v;
        }
        if let Some(v) = job_type {
            self.job_type = v;
        }
        if let Some(v) = category {
            self.category = v;
        }
        if let Some(v) = search_query {
            self.search_query = v;
        }
    }

    /// True when no filter constrains the result.
    pub fn is_unconstrained(&self) -> bool {
        self.search_query.is_empty()
            && [
                &self.location,
                &self.salary,
                &self.experience,
                &self.job_type,
                &self.category,
            ]
            .iter()
            .all(|v| bucket(v).is_none())
    }
}

/// Salary buckets offered by the filter panel.
///
/// `Under15` and `From15To30` are substring heuristics over the raw salary
/// text, not numeric ranges: "150 triệu" lands in `Under15` through "15".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalaryBucket {
    Negotiate,
    Under15,
    From15To30,
    Over30,
}

const NEGOTIABLE: &str = "thỏa thuận";
const UNDER_15_MARKERS: [&str; 3] = ["10", "12", "15"];
const FROM_15_TO_30_MARKERS: [&str; 4] = ["15", "20", "25", "30"];

impl SalaryBucket {
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "negotiate" => Some(SalaryBucket::Negotiate),
            "under15" => Some(SalaryBucket::Under15),
            "15to30" => Some(SalaryBucket::From15To30),
            "over30" => Some(SalaryBucket::Over30),
            _ => None,
        }
    }

    /// `salary` must already be lowercased.
    fn matches(self, salary: &str) -> bool {
        match self {
            SalaryBucket::Negotiate => salary.contains(NEGOTIABLE),
            SalaryBucket::Under15 => UNDER_15_MARKERS.iter().any(|m| salary.contains(m)),
            SalaryBucket::From15To30 => FROM_15_TO_30_MARKERS.iter().any(|m| salary.contains(m)),
            SalaryBucket::Over30 => leading_integer(salary).is_some_and(|n| n >= 30),
        }
    }
}

/// Parses the integer prefix of `s` the way a lenient form parser does:
/// leading whitespace, an optional sign, then digits. Anything else yields
/// `None`. "30-50 triệu" parses as 30.
pub fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let magnitude = rest[..digits_len].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Returns the active bucket key, or `None` for `"all"` / empty.
fn bucket(value: &str) -> Option<&str> {
    if value.is_empty() || value == ALL {
        None
    } else {
        Some(value)
    }
}

fn lower(field: &Option<String>) -> String {
    field.as_deref().unwrap_or_default().to_lowercase()
}

/// Salary constraint as compiled. An unknown bucket key passes every job.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SalaryRule {
    Bucket(SalaryBucket),
    PassThrough,
}

/// A `FilterState` with its needles pre-lowercased, ready to test many jobs.
#[derive(Debug, Clone)]
pub struct JobPredicate {
    search: Option<String>,
    location: Option<String>,
    salary: Option<SalaryRule>,
    experience: Option<String>,
    job_type: Option<String>,
    category: Option<String>,
}

/// Compiles the filter state into a predicate over jobs.
pub fn compile(filters: &FilterState) -> JobPredicate {
    let needle = |v: &str| bucket(v).map(str::to_lowercase);
    JobPredicate {
        search: (!filters.search_query.is_empty()).then(|| filters.search_query.to_lowercase()),
        location: needle(&filters.location),
        salary: bucket(&filters.salary).map(|key| match SalaryBucket::parse(key) {
            Some(b) => SalaryRule::Bucket(b),
            None => SalaryRule::PassThrough,
        }),
        experience: needle(&filters.experience),
        job_type: needle(&filters.job_type),
        category: needle(&filters.category),
    }
}

impl JobPredicate {
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(q) = &self.search {
            let hit = [&job.title, &job.company_name, &job.description]
                .into_iter()
                .any(|field| lower(field).contains(q.as_str()));
            if !hit {
                return false;
            }
        }
        if let Some(loc) = &self.location {
            if !lower(&job.location).contains(loc.as_str()) {
                return false;
            }
        }
        if let Some(SalaryRule::Bucket(b)) = &self.salary {
            if !b.matches(&lower(&job.salary)) {
                return false;
            }
        }
        if let Some(exp) = &self.experience {
            if !lower(&job.experience).contains(exp.as_str()) {
                return false;
            }
        }
        if let Some(jt) = &self.job_type {
            if lower(&job.job_type) != *jt {
                return false;
            }
        }
        if let Some(cat) = &self.category {
            if lower(&job.category) != *cat {
                return false;
            }
        }
        true
    }

    /// Borrowing closure form, for `Iterator::filter`.
    pub fn as_fn(&self) -> impl Fn(&&Job) -> bool + '_ {
        move |job: &&Job| self.matches(job)
    }
}
