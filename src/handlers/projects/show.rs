use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};

use crate::error::ApiError;
use crate::routes::AppState;
use crate::services::ProjectLifecycle;

use super::super::no_cache;

/// GET /api/classes/:classid/students/:studentid/projects/:projectid - one project
pub async fn show(
    State(state): State<AppState>,
    Path((classid, studentid, projectid)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let project = ProjectLifecycle::new(state.store)
        .get(&studentid, &classid, &projectid)
        .await?;
    Ok((no_cache(), Json(project)))
}
