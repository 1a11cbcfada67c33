//! Integration tests for the HTTP endpoint.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`, over a
//! transport that counts outbound requests instead of touching the network.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use feedrelay::feed::{Candidate, CandidateKind, FeedFetcher, FetchPolicy};
use feedrelay::transport::{RequestHeaders, Transport, TransportError, TransportResponse};
use feedrelay::web::create_router;
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const VALID_RSS: &str = r#"<?xml version="1.0"?><rss version="2.0"><channel><title>NCSC-FI</title></channel></rss>"#;

/// Answers every request with the same status and body.
struct FixedTransport {
    status: u16,
    body: &'static str,
    calls: Arc<AtomicUsize>,
}

impl Transport for FixedTransport {
    async fn get(
        &self,
        _url: &str,
        _headers: &RequestHeaders,
        _timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(TransportResponse {
            status: self.status,
            body: self.body.to_string(),
        })
    }
}

fn router(status: u16, body: &'static str) -> (Router, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let transport = FixedTransport {
        status,
        body,
        calls: calls.clone(),
    };
    let candidates = vec![
        Candidate::new("direct", CandidateKind::Direct, "https://feed.example/rss", 2, Duration::ZERO),
        Candidate::new("relay", CandidateKind::Proxy, "https://relay.example/?u=x", 2, Duration::ZERO),
    ];
    let fetcher = FeedFetcher::new(transport, FetchPolicy::new(candidates));
    (create_router("/api/feed", Arc::new(fetcher)), calls)
}

async fn call(app: Router, method: Method, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = tower::ServiceExt::oneshot(
        app,
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, headers, body)
}

fn assert_cors(headers: &axum::http::HeaderMap) {
    assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");
    assert_eq!(headers.get("access-control-allow-methods").unwrap(), "GET, OPTIONS");
    assert_eq!(headers.get("access-control-allow-headers").unwrap(), "Content-Type");
}

#[tokio::test]
async fn test_get_returns_success_envelope() {
    let (app, calls) = router(200, VALID_RSS);

    let (status, headers, body) = call(app, Method::GET, "/api/feed").await;

    assert_eq!(status, StatusCode::OK);
    assert_cors(&headers);
    assert_eq!(headers.get("content-type").unwrap(), "application/json");
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["success"], true);
    assert_eq!(value["source"], "NCSC-FI RSS Feed");
    assert_eq!(value["content"], VALID_RSS);
    assert_eq!(value["contentLength"], VALID_RSS.len());
    assert!(value.get("error").is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_options_is_empty_and_skips_fetch() {
    let (app, calls) = router(200, VALID_RSS);

    let (status, headers, body) = call(app, Method::OPTIONS, "/api/feed").await;

    assert_eq!(status, StatusCode::OK);
    assert_cors(&headers);
    assert!(body.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_other_methods_rejected_without_fetch() {
    for method in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
        let (app, calls) = router(200, VALID_RSS);

        let (status, headers, body) = call(app, method.clone(), "/api/feed").await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method}");
        assert_cors(&headers);
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "Method not allowed");
        assert!(value.get("content").is_none());
        assert!(value["timestamp"].is_string());
        assert_eq!(calls.load(Ordering::SeqCst), 0, "{method}");
    }
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway_json() {
    let (app, calls) = router(200, "<html>Access denied</html>");

    let (status, headers, body) = call(app, Method::GET, "/api/feed").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_cors(&headers);
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["success"], false);
    assert_eq!(
        value["error"],
        "All fetch methods exhausted. Last error: Response is not valid RSS"
    );
    assert_eq!(value["attempts"].as_array().unwrap().len(), 2);
    assert!(value.get("content").is_none());
    // Invalid content is not retried within a candidate.
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_server_errors_use_full_budget() {
    let (app, calls) = router(503, "");

    let (status, _, _) = call(app, Method::GET, "/api/feed").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_health_check() {
    let (app, calls) = router(200, VALID_RSS);

    let (status, headers, body) = call(app, Method::GET, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_cors(&headers);
    assert_eq!(body, b"OK");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
