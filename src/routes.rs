use axum::{middleware, routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{auth, projects};
use crate::identity::IdentityClient;
use crate::middleware::{authenticate, check_valid_user, require_supervisor};
use crate::store::ProjectStore;

/// Shared per-request context: the store handle and, when configured, the
/// identity-provider client. Everything else is stateless.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProjectStore>,
    pub identity: Option<Arc<IdentityClient>>,
}

pub fn build_router(state: AppState) -> Router {
    // Class-wide listing needs the supervisor role on top of the user gate
    let class_routes = Router::new()
        .route("/api/classes/:classid/projects", get(projects::list_by_class))
        .route_layer(middleware::from_fn(require_supervisor));

    let student_routes = Router::new()
        .route(
            "/api/classes/:classid/students/:studentid/projects",
            get(projects::list_by_user).post(projects::create),
        )
        .route(
            "/api/classes/:classid/students/:studentid/projects/:projectid",
            get(projects::show)
                .delete(projects::delete)
                .patch(projects::modify),
        )
        .route(
            "/api/classes/:classid/students/:studentid/projects/:projectid/fields",
            get(projects::fields),
        );

    // Gate order: authenticate runs first, then the class/student check,
    // then (where applied) the supervisor check
    let gated = class_routes
        .merge(student_routes)
        .route_layer(middleware::from_fn(check_valid_user))
        .route_layer(middleware::from_fn(authenticate));

    let auth_routes = Router::new()
        .route("/api/auth/whoami", get(auth::whoami_get))
        .route_layer(middleware::from_fn(authenticate));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(gated)
        .merge(auth_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "codeclass API",
        "version": version,
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "whoami": "/api/auth/whoami (authenticated)",
            "class_projects": "/api/classes/:classid/projects (supervisor)",
            "projects": "/api/classes/:classid/students/:studentid/projects[/:projectid[/fields]] (authenticated)",
        }
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "store": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Store health check failed");
            (
                axum::http::StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "store": "unavailable"
                })),
            )
        }
    }
}
