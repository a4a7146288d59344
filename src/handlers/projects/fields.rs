use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};

use crate::error::ApiError;
use crate::routes::AppState;
use crate::services::ProjectLifecycle;

use super::super::no_cache;

/// GET /api/classes/:classid/students/:studentid/projects/:projectid/fields -
/// numeric field definitions for a numbers project
pub async fn fields(
    State(state): State<AppState>,
    Path((classid, studentid, projectid)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let fields = ProjectLifecycle::new(state.store)
        .fields(&studentid, &classid, &projectid)
        .await?;
    Ok((no_cache(), Json(fields)))
}
