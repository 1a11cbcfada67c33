//! HTTP transport capability used by the fetcher.
//!
//! The fetcher only ever needs one operation, a GET with a fixed header set
//! and a deadline. Hiding it behind [`Transport`] lets tests run the whole
//! fallback chain against an in-memory fake instead of the network.

use futures::StreamExt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Response bodies larger than this are rejected while streaming.
pub const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

const MAX_REDIRECTS: usize = 10;

/// Errors raised below the HTTP status layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network-level error (DNS, connection, TLS, body read)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Request exceeded the configured deadline
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
}

/// The fixed header set sent with every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHeaders {
    pub user_agent: String,
    pub accept: String,
}

/// A delivered response. Any status code, including errors, lands here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

pub trait Transport: Send + Sync {
    fn get(
        &self,
        url: &str,
        headers: &RequestHeaders,
        timeout: Duration,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds a client that follows a bounded number of redirects.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .pool_idle_timeout(Duration::from_secs(30)) // Close idle connections promptly
            .tcp_keepalive(Duration::from_secs(60))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    async fn get(
        &self,
        url: &str,
        headers: &RequestHeaders,
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        let request = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, &headers.user_agent)
            .header(reqwest::header::ACCEPT, &headers.accept);

        // The deadline covers headers and body together.
        tokio::time::timeout(timeout, async move {
            let response = request.send().await?;
            let status = response.status().as_u16();
            let bytes = read_limited_bytes(response, MAX_FEED_SIZE).await?;
            Ok::<_, TransportError>(TransportResponse {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            })
        })
        .await
        .map_err(|_| TransportError::Timeout(timeout))?
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, TransportError> {
    let expected_length = response.content_length();

    // Fast path: check Content-Length header
    if let Some(len) = expected_length {
        if len > limit as u64 {
            return Err(TransportError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(TransportError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(TransportError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}
