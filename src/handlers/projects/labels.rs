use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::error::ApiError;
use crate::routes::AppState;
use crate::services::{parse_patch, LabelPatchEngine};

/// PATCH /api/classes/:classid/students/:studentid/projects/:projectid -
/// apply one label operation to a project
///
/// Validation happens entirely before any store call; the response body is
/// the store's post-mutation label list.
pub async fn modify(
    State(state): State<AppState>,
    Path((classid, studentid, projectid)): Path<(String, String, String)>,
    body: Option<Json<Value>>,
) -> Result<Json<Vec<String>>, ApiError> {
    let Json(body) = body.ok_or_else(|| ApiError::validation("PATCH body should be an array"))?;
    let operation = parse_patch(&body)?;

    let labels = LabelPatchEngine::new(state.store)
        .apply(&studentid, &classid, &projectid, operation)
        .await?;

    Ok(Json(labels))
}
