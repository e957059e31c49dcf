//! Saved jobs and recently viewed jobs, kept per visitor in process memory.

pub mod handlers;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{Job, JobId};

/// Recent views kept per visitor.
pub const RECENT_VIEWS_LIMIT: usize = 10;

/// Visitors tracked at once before the least recently active is evicted.
pub const DEFAULT_MAX_VISITORS: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedJob {
    #[serde(flatten)]
    pub job: Job,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentView {
    #[serde(flatten)]
    pub job: Job,
    pub viewed_at: DateTime<Utc>,
}

/// One visitor's saved list (oldest first) and recent views (newest first).
#[derive(Debug, Clone, Default)]
pub struct Shelf {
    saved: Vec<SavedJob>,
    recent: Vec<RecentView>,
    last_touch: u64,
}

impl Shelf {
    /// Saves `job` unless a job with the same id is already saved.
    /// Returns whether the list changed.
    pub fn save(&mut self, job: Job, now: DateTime<Utc>) -> bool {
        if self.is_saved(&job.id) {
            return false;
        }
        self.saved.push(SavedJob { job, saved_at: now });
        true
    }

    pub fn unsave(&mut self, id: &JobId) -> bool {
        let before = self.saved.len();
        self.saved.retain(|s| &s.job.id != id);
        self.saved.len() != before
    }

    pub fn is_saved(&self, id: &JobId) -> bool {
        self.saved.iter().any(|s| &s.job.id == id)
    }

    /// Moves `job` to the front of the recent list, dropping any earlier view
    /// of the same job and anything past the limit.
    pub fn record_view(&mut self, job: Job, now: DateTime<Utc>) {
        self.recent.retain(|r| r.job.id != job.id);
        self.recent.insert(0, RecentView { job, viewed_at: now });
        self.recent.truncate(RECENT_VIEWS_LIMIT);
    }

    pub fn saved(&self) -> &[SavedJob] {
        &self.saved
    }

    pub fn recent(&self) -> &[RecentView] {
        &self.recent
    }

    pub fn is_empty(&self) -> bool {
        self.saved.is_empty() && self.recent.is_empty()
    }
}

#[derive(Debug, Default)]
struct Shelves {
    by_visitor: HashMap<String, Shelf>,
    clock: u64,
}

impl Shelves {
    /// The visitor's shelf, created if needed and marked most recently used.
    /// Creating one at capacity first evicts the least recently used shelf.
    fn touch(&mut self, visitor: &str, capacity: usize) -> &mut Shelf {
        self.clock += 1;
        if !self.by_visitor.contains_key(visitor) && self.by_visitor.len() >= capacity {
            let oldest = self
                .by_visitor
                .iter()
                .min_by_key(|(_, shelf)| shelf.last_touch)
                .map(|(id, _)| id.clone());
            if let Some(oldest) = oldest {
                debug!("Evicting visitor {oldest}");
                self.by_visitor.remove(&oldest);
            }
        }
        let shelf = self.by_visitor.entry(visitor.to_string()).or_default();
        shelf.last_touch = self.clock;
        shelf
    }

    /// Applies `f` to an existing shelf and drops the shelf if it ends up empty.
    fn update<R>(&mut self, visitor: &str, f: impl FnOnce(&mut Shelf) -> R) -> Option<R> {
        let shelf = self.by_visitor.get_mut(visitor)?;
        let out = f(shelf);
        if shelf.is_empty() {
            self.by_visitor.remove(visitor);
        }
        Some(out)
    }
}

/// Shared store of shelves keyed by an opaque visitor id, bounded to
/// `capacity` visitors.
#[derive(Clone)]
pub struct VisitorStore {
    shelves: Arc<RwLock<Shelves>>,
    capacity: usize,
}

impl Default for VisitorStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_VISITORS)
    }
}

impl VisitorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            shelves: Arc::new(RwLock::new(Shelves::default())),
            capacity: capacity.max(1),
        }
    }

    pub async fn visitor_count(&self) -> usize {
        self.shelves.read().await.by_visitor.len()
    }

    pub async fn saved(&self, visitor: &str) -> Vec<SavedJob> {
        let shelves = self.shelves.read().await;
        shelves
            .by_visitor
            .get(visitor)
            .map(|s| s.saved().to_vec())
            .unwrap_or_default()
    }

    pub async fn recent(&self, visitor: &str) -> Vec<RecentView> {
        let shelves = self.shelves.read().await;
        shelves
            .by_visitor
            .get(visitor)
            .map(|s| s.recent().to_vec())
            .unwrap_or_default()
    }

    pub async fn save(&self, visitor: &str, job: Job) -> bool {
        let mut shelves = self.shelves.write().await;
        shelves.touch(visitor, self.capacity).save(job, Utc::now())
    }

    /// Unsaves by the id as written in a URL.
    pub async fn unsave_raw(&self, visitor: &str, raw_id: &str) -> bool {
        let mut shelves = self.shelves.write().await;
        shelves
            .update(visitor, |shelf| {
                let ids: Vec<JobId> = shelf
                    .saved()
                    .iter()
                    .filter(|s| s.job.id.matches_raw(raw_id))
                    .map(|s| s.job.id.clone())
                    .collect();
                ids.iter().fold(false, |removed, id| shelf.unsave(id) || removed)
            })
            .unwrap_or(false)
    }

    pub async fn clear_saved(&self, visitor: &str) {
        let mut shelves = self.shelves.write().await;
        shelves.update(visitor, |shelf| shelf.saved.clear());
    }

    pub async fn record_view(&self, visitor: &str, job: Job) {
        let mut shelves = self.shelves.write().await;
        shelves
            .touch(visitor, self.capacity)
            .record_view(job, Utc::now());
    }

    pub async fn clear_recent(&self, visitor: &str) {
        let mut shelves = self.shelves.write().await;
        shelves.update(visitor, |shelf| shelf.recent.clear());
    }
}
