use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::error::ApiError;
use crate::routes::AppState;
use crate::services::ProjectLifecycle;

/// DELETE /api/classes/:classid/students/:studentid/projects/:projectid -
/// delete a project and everything that depends on it
pub async fn delete(
    State(state): State<AppState>,
    Path((classid, studentid, projectid)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    ProjectLifecycle::new(state.store)
        .delete(&studentid, &classid, &projectid)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
