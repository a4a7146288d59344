use axum::{
    extract::{Path, Request},
    middleware::Next,
    response::Response,
    Extension,
};
use std::collections::HashMap;

use crate::error::ApiError;
use crate::types::Role;

use super::auth::AuthUser;

/// Second gate: the principal must belong to the addressed class, and when a
/// route addresses a specific student it must be that student or a
/// supervisor acting within the class. Resource-level ownership is still
/// re-checked by the core against the store.
pub async fn check_valid_user(
    Path(params): Path<HashMap<String, String>>,
    Extension(user): Extension<AuthUser>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let classid = params.get("classid").ok_or_else(|| {
        tracing::error!("Route without a classid parameter behind the user gate");
        ApiError::invalid_access()
    })?;

    if user.tenant != *classid {
        tracing::warn!(
            user = %user.user_id,
            tenant = %user.tenant,
            classid = %classid,
            "Rejected cross-class request"
        );
        return Err(ApiError::invalid_access());
    }

    if let Some(studentid) = params.get("studentid") {
        if user.role != Role::Supervisor && user.user_id != *studentid {
            tracing::warn!(
                user = %user.user_id,
                studentid = %studentid,
                "Rejected request addressing another student"
            );
            return Err(ApiError::invalid_access());
        }
    }

    Ok(next.run(request).await)
}
