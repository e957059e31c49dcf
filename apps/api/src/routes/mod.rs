pub mod health;

use axum::{
    routing::{get, put},
    Router,
};

use crate::listing::handlers as listing;
use crate::state::AppState;
use crate::visitors::handlers as visitors;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Listing API
        .route("/api/v1/jobs", get(listing::handle_list_jobs))
        .route("/api/v1/jobs/:id", get(listing::handle_get_job))
        .route("/api/v1/categories", get(listing::handle_list_categories))
        // Visitor shelves
        .route(
            "/api/v1/visitors/:visitor/saved",
            get(visitors::handle_list_saved).delete(visitors::handle_clear_saved),
        )
        .route(
            "/api/v1/visitors/:visitor/saved/:job_id",
            put(visitors::handle_save).delete(visitors::handle_unsave),
        )
        .route(
            "/api/v1/visitors/:visitor/recent",
            get(visitors::handle_list_recent).delete(visitors::handle_clear_recent),
        )
        .with_state(state)
}
