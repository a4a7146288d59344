use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::routes::AppState;

/// GET /api/auth/whoami - the authenticated principal, enriched with the
/// identity-provider profile when the provider is configured
pub async fn whoami_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let mut body = json!({
        "id": user.user_id,
        "classid": user.tenant,
        "role": user.role,
    });

    if let Some(identity) = &state.identity {
        match fetch_profile(identity, &user.user_id).await {
            Ok(profile) => {
                body["profile"] = serde_json::to_value(profile)
                    .map_err(|e| ApiError::unknown(format!("profile serialization failed: {}", e)))?;
            }
            // the claims are still a usable answer without the profile
            Err(e) => {
                tracing::warn!(user = %user.user_id, error = %e, "Identity profile lookup failed");
            }
        }
    }

    Ok(Json(body))
}

async fn fetch_profile(
    identity: &crate::identity::IdentityClient,
    userid: &str,
) -> Result<crate::identity::IdentityUser, crate::identity::IdentityError> {
    let token = identity.oauth_token().await?;
    identity.get_user(&token, userid).await
}
