use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::error::ApiError;
use crate::routes::AppState;
use crate::services::{CreateProject, ProjectLifecycle};

/// POST /api/classes/:classid/students/:studentid/projects - create a project
///
/// A missing or unreadable body is treated the same as a body missing its
/// required fields.
pub async fn create(
    State(state): State<AppState>,
    Path((classid, studentid)): Path<(String, String)>,
    body: Option<Json<CreateProject>>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body.ok_or_else(|| ApiError::validation("Missing required field"))?;

    let project = ProjectLifecycle::new(state.store)
        .create(&studentid, &classid, request)
        .await?;

    Ok((StatusCode::CREATED, Json(project)))
}
