use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};

use crate::error::ApiError;
use crate::routes::AppState;
use crate::services::ProjectLifecycle;

use super::super::no_cache;

/// GET /api/classes/:classid/projects - every project in the class
/// (supervisor only; the gate enforces the role)
pub async fn list_by_class(
    State(state): State<AppState>,
    Path(classid): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let projects = ProjectLifecycle::new(state.store).list_by_class(&classid).await?;
    Ok((no_cache(), Json(projects)))
}

/// GET /api/classes/:classid/students/:studentid/projects - one student's projects
pub async fn list_by_user(
    State(state): State<AppState>,
    Path((classid, studentid)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let projects = ProjectLifecycle::new(state.store)
        .list_by_user(&studentid, &classid)
        .await?;
    Ok((no_cache(), Json(projects)))
}
