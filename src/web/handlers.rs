//! Request handlers for the feed endpoint.

use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::envelope::Envelope;
use crate::feed::FeedFetcher;
use crate::transport::Transport;

/// Shared, immutable fetcher handed to every request.
pub type SharedFetcher<T> = Arc<FeedFetcher<T>>;

/// Answers one invocation of the feed endpoint.
///
/// - `OPTIONS`: empty 200 (CORS headers are added by the router), no fetch
/// - `GET`: runs the fallback chain; 200 with the success envelope or 502
///   with the failure envelope
/// - anything else: 405 with a failure envelope, no outbound requests
pub async fn relay_feed<T>(State(fetcher): State<SharedFetcher<T>>, method: Method) -> Response
where
    T: Transport + 'static,
{
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }

    let policy = fetcher.policy();

    if method != Method::GET {
        tracing::warn!(method = %method, "Rejecting request method");
        let envelope = Envelope::failure(
            &policy.source_label,
            "Method not allowed",
            Vec::new(),
            policy.max_diagnostics,
        );
        return (StatusCode::METHOD_NOT_ALLOWED, Json(envelope)).into_response();
    }

    let envelope = fetcher.fetch().await;
    let status = if envelope.is_success() {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    (status, Json(envelope)).into_response()
}

/// Health check handler.
pub async fn health_check() -> &'static str {
    "OK"
}
