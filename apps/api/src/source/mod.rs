//! Job sources: where the raw job collection comes from.
//!
//! The listing engine never performs I/O. Handlers ask a `JobSource` for the
//! collection, then hand it to the engine. `AppState` holds an
//! `Arc<dyn JobSource>` chosen at startup from config.

pub mod cache;
pub mod file;
pub mod http;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Job;

pub use cache::CachedJobSource;
pub use file::FileJobSource;
pub use http::HttpJobSource;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upstream unavailable after {retries} attempts")]
    Exhausted { retries: u32 },

    #[error("Invalid upstream URL: {0}")]
    InvalidUrl(String),

    #[error("Job {0} not found")]
    NotFound(String),
}

#[async_trait]
pub trait JobSource: Send + Sync {
    /// Every job currently listed.
    async fn fetch_jobs(&self) -> Result<Vec<Job>, SourceError>;

    /// A single job by the id as it appears in a URL.
    async fn fetch_job(&self, id: &str) -> Result<Job, SourceError>;
}

/// In-memory source for handler tests.
#[cfg(test)]
pub struct StaticJobSource(pub Vec<Job>);

#[cfg(test)]
#[async_trait]
impl JobSource for StaticJobSource {
    async fn fetch_jobs(&self) -> Result<Vec<Job>, SourceError> {
        Ok(self.0.clone())
    }

    async fn fetch_job(&self, id: &str) -> Result<Job, SourceError> {
        self.0
            .iter()
            .find(|job| job.id.matches_raw(id))
            .cloned()
            .ok_or_else(|| SourceError::NotFound(id.to_string()))
    }
}
