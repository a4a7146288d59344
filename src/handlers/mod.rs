// HTTP handlers. These stay thin; all decision logic lives in the services
// and the store.

pub mod auth;
pub mod projects;

use axum::http::{header, HeaderName, HeaderValue};

/// Response headers for reads whose results must not be cached
pub(crate) fn no_cache() -> [(HeaderName, HeaderValue); 1] {
    [(
        header::CACHE_CONTROL,
        HeaderValue::from_static("max-age=0, no-cache, must-revalidate, proxy-revalidate"),
    )]
}
