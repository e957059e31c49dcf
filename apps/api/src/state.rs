use std::sync::Arc;

use crate::config::Config;
use crate::source::JobSource;
use crate::visitors::VisitorStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Where job collections come from. Upstream API by default, a JSON file
    /// when `JOBS_FILE` is set.
    pub source: Arc<dyn JobSource>,
    pub visitors: VisitorStore,
}
