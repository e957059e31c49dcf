use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::errors::AppError;
use crate::state::AppState;
use crate::visitors::{RecentView, SavedJob};

fn visitor_id(raw: &str) -> Result<&str, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("visitor id must not be empty".to_string()));
    }
    Ok(trimmed)
}

/// GET /api/v1/visitors/:visitor/saved
pub async fn handle_list_saved(
    State(state): State<AppState>,
    Path(visitor): Path<String>,
) -> Result<Json<Vec<SavedJob>>, AppError> {
    Ok(Json(state.visitors.saved(visitor_id(&visitor)?).await))
}

/// PUT /api/v1/visitors/:visitor/saved/:job_id
///
/// Looks the job up so the saved copy carries its current details.
pub async fn handle_save(
    State(state): State<AppState>,
    Path((visitor, job_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let visitor = visitor_id(&visitor)?;
    let job = state.source.fetch_job(&job_id).await?;
    if state.visitors.save(visitor, job).await {
        Ok(StatusCode::CREATED)
    } else {
        Ok(StatusCode::NO_CONTENT)
    }
}

/// DELETE /api/v1/visitors/:visitor/saved/:job_id
pub async fn handle_unsave(
    State(state): State<AppState>,
    Path((visitor, job_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    if state.visitors.unsave_raw(visitor_id(&visitor)?, &job_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Job {job_id} is not saved")))
    }
}

/// DELETE /api/v1/visitors/:visitor/saved
pub async fn handle_clear_saved(
    State(state): State<AppState>,
    Path(visitor): Path<String>,
) -> Result<StatusCode, AppError> {
    state.visitors.clear_saved(visitor_id(&visitor)?).await;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/visitors/:visitor/recent
pub async fn handle_list_recent(
    State(state): State<AppState>,
    Path(visitor): Path<String>,
) -> Result<Json<Vec<RecentView>>, AppError> {
    Ok(Json(state.visitors.recent(visitor_id(&visitor)?).await))
}

/// DELETE /api/v1/visitors/:visitor/recent
pub async fn handle_clear_recent(
    State(state): State<AppState>,
    Path(visitor): Path<String>,
) -> Result<StatusCode, AppError> {
    state.visitors.clear_recent(visitor_id(&visitor)?).await;
    Ok(StatusCode::NO_CONTENT)
}
