use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Opaque job identifier. The upstream API emits integer ids, imported
/// fixtures sometimes carry string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobId {
    Int(i64),
    Text(String),
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobId::Int(n) => write!(f, "{n}"),
            JobId::Text(s) => f.write_str(s),
        }
    }
}

impl JobId {
    /// Compares against an id taken from a URL path segment.
    pub fn matches_raw(&self, raw: &str) -> bool {
        match self {
            JobId::Int(n) => raw.trim().parse::<i64>().map_or(false, |r| r == *n),
            JobId::Text(s) => s == raw,
        }
    }
}

/// A job posting as received from the listing API.
///
/// Only the fields the listing engine reads are typed. Everything else the
/// upstream sends (salary bounds, status, company id, ...) rides along in
/// `extra` and is serialized back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub salary: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub experience: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub job_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub posted_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Job {
    /// A job with only an id set. Used by fixtures and tests.
    pub fn with_id(id: JobId) -> Self {
        Self {
            id,
            title: None,
            company_name: None,
            description: None,
            location: None,
            salary: None,
            experience: None,
            job_type: None,
            category: None,
            posted_at: None,
            created_at: None,
            extra: Map::new(),
        }
    }

    /// The date used for chronological ordering: `posted_at`, falling back to
    /// `created_at` when the former is missing or empty.
    pub fn listed_at(&self) -> Option<&str> {
        non_empty(self.posted_at.as_deref()).or_else(|| non_empty(self.created_at.as_deref()))
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// Accepts a string, number, bool or null and yields optional text.
/// Arrays and objects are treated as absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Upstream pagination block. The backend has shipped both spellings of the
/// page count.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamPagination {
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default, rename = "totalPages", alias = "total_pages")]
    pub total_pages: Option<u64>,
}

/// `{ success, message, data, pagination }` as returned by `GET /jobs`.
#[derive(Debug, Deserialize)]
pub struct JobsEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient_jobs")]
    pub data: Vec<Job>,
    #[serde(default)]
    pub pagination: Option<UpstreamPagination>,
}

/// A `data` field that is missing, null or not an array becomes an empty list.
fn lenient_jobs<'de, D>(deserializer: D) -> Result<Vec<Job>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => decode_jobs(items),
        _ => Vec::new(),
    })
}

/// Decodes each record on its own. A record that is not a job (no usable
/// `id`, not an object) is logged and skipped.
pub fn decode_jobs(items: Vec<Value>) -> Vec<Job> {
    let total = items.len();
    let jobs: Vec<Job> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<Job>(item) {
            Ok(job) => Some(job),
            Err(e) => {
                warn!("Skipping job record {index}: {e}");
                None
            }
        })
        .collect();
    if jobs.len() < total {
        warn!("Dropped {} of {} job records", total - jobs.len(), total);
    }
    jobs
}
