//! Axum route handlers for the Listing API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use tracing::debug;

use crate::errors::AppError;
use crate::listing::categories::{count_by_category, CategoryCount};
use crate::listing::filters::FilterState;
use crate::listing::materialize::{materialize, Listing};
use crate::listing::pagination::{page_buttons, PageButton};
use crate::listing::query::ListingQuery;
use crate::listing::sorting::SortKey;
use crate::models::Job;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ListingResponse {
    #[serde(flatten)]
    pub listing: Listing,
    pub page_buttons: Vec<PageButton>,
    /// The filters and sort actually applied, after defaults and aliases.
    pub filters: FilterState,
    pub sort: SortKey,
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ListingResponse>, AppError> {
    let query: ListingQuery = pairs.into_iter().collect();
    let jobs = state.source.fetch_jobs().await?;

    let filters = query.filters();
    let sort = query.sort_key();
    let page = query.page_request(state.config.items_per_page, state.config.upstream_page_limit);

    let listing = materialize(&jobs, &filters, &sort, page);
    debug!(
        "Listed page {}/{} ({} of {} jobs matched)",
        listing.page,
        listing.total_pages,
        listing.total_count,
        jobs.len()
    );

    Ok(Json(ListingResponse {
        page_buttons: page_buttons(listing.total_pages, listing.page),
        listing,
        filters,
        sort,
    }))
}

/// GET /api/v1/jobs/:id
///
/// With `?visitor=<id>` the job is also pushed onto that visitor's recent views.
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Job>, AppError> {
    let job = state.source.fetch_job(&id).await?;

    let visitor = pairs
        .iter()
        .find(|(key, _)| key == "visitor")
        .map(|(_, value)| value.trim())
        .filter(|v| !v.is_empty());
    if let Some(visitor) = visitor {
        state.visitors.record_view(visitor, job.clone()).await;
    }

    Ok(Json(job))
}

/// GET /api/v1/categories
pub async fn handle_list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryCount>>, AppError> {
    let jobs = state.source.fetch_jobs().await?;
    Ok(Json(count_by_category(&jobs)))
}
