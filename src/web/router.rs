//! Router configuration for the feed endpoint.

use axum::{
    http::{header, HeaderValue},
    routing::{any, get},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{health_check, relay_feed, SharedFetcher};
use crate::transport::Transport;

/// Create the router serving the envelope at `path`.
///
/// Every response, errors and preflight included, carries permissive
/// cross-origin headers.
pub fn create_router<T>(path: &str, fetcher: SharedFetcher<T>) -> Router
where
    T: Transport + 'static,
{
    Router::new()
        .route(path, any(relay_feed::<T>))
        .route("/health", get(health_check))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(fetcher)
}
