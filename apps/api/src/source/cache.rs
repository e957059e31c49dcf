//! Short-lived cache in front of another `JobSource`.
//!
//! Listing and category requests each need the full collection, and the
//! upstream only hands it out page by page. One fetch is shared for `ttl`;
//! concurrent misses wait on the same refresh instead of each walking the
//! upstream. Failed fetches are not cached.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::models::Job;
use crate::source::{JobSource, SourceError};

pub struct CachedJobSource {
    inner: Arc<dyn JobSource>,
    ttl: Duration,
    cached: Mutex<Option<(Instant, Vec<Job>)>>,
}

impl CachedJobSource {
    pub fn new(inner: Arc<dyn JobSource>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cached: Mutex::new(None),
        }
    }
}

#[async_trait]
impl JobSource for CachedJobSource {
    async fn fetch_jobs(&self) -> Result<Vec<Job>, SourceError> {
        let mut cached = self.cached.lock().await;
        if let Some((fetched_at, jobs)) = cached.as_ref() {
            if fetched_at.elapsed() < self.ttl {
                return Ok(jobs.clone());
            }
        }

        let jobs = self.inner.fetch_jobs().await?;
        debug!("Refreshed job cache ({} jobs)", jobs.len());
        *cached = Some((Instant::now(), jobs.clone()));
        Ok(jobs)
    }

    /// Details always go to the inner source so a saved copy is current.
    async fn fetch_job(&self, id: &str) -> Result<Job, SourceError> {
        self.inner.fetch_job(id).await
    }
}
