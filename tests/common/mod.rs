// Shared helpers for the integration suites: an in-process router over the
// in-memory store, plus token minting and request plumbing.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use codeclass_api::auth::{generate_jwt, Claims};
use codeclass_api::routes::{build_router, AppState};
use codeclass_api::store::MemoryProjectStore;
use codeclass_api::types::Role;

/// Build the real router over a fresh in-memory store. The store handle is
/// returned so tests can seed tenant policy.
pub fn test_app() -> (Router, Arc<MemoryProjectStore>) {
    let store = Arc::new(MemoryProjectStore::new());
    let app = build_router(AppState {
        store: store.clone(),
        identity: None,
    });
    (app, store)
}

/// Mint a token the way the platform would issue one
pub fn token(userid: &str, classid: &str, role: Role) -> String {
    generate_jwt(Claims::new(userid.to_string(), classid.to_string(), role)).expect("token")
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<&Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

/// Drive one request through the router and decode the JSON body (Null for
/// an empty body)
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}
