use axum::{extract::Request, middleware::Next, response::Response, Extension};

use crate::error::ApiError;
use crate::types::Role;

use super::auth::AuthUser;

/// Third gate, applied to class-wide routes only: the principal must hold
/// the supervisor role.
pub async fn require_supervisor(
    Extension(user): Extension<AuthUser>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if user.role != Role::Supervisor {
        tracing::warn!(user = %user.user_id, "Rejected non-supervisor on a supervisor route");
        return Err(ApiError::invalid_access());
    }

    Ok(next.run(request).await)
}
