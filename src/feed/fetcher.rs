use crate::envelope::{Envelope, FetchAttempt};
use crate::feed::candidate::Candidate;
use crate::feed::validate::{looks_like_rss, Validator};
use crate::transport::{RequestHeaders, Transport, TransportError};
use std::time::Duration;
use thiserror::Error;

/// Default label written to the envelope's `source` field.
pub const DEFAULT_SOURCE_LABEL: &str = "NCSC-FI RSS Feed";
/// Default number of per-candidate diagnostics kept in a failure envelope.
pub const DEFAULT_MAX_DIAGNOSTICS: usize = 10;

/// Why a single request against a candidate did not yield a feed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Timeout, connection failure or unreadable body
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// 2xx response whose body failed the content check
    #[error("Response is not valid RSS")]
    InvalidContent,
}

impl FetchError {
    /// Returns true if another request against the same candidate may succeed.
    ///
    /// Server errors and transport failures are transient. A 4xx or a body
    /// that is not RSS will come back the same way, so the fetcher moves on.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport(_) => true,
            FetchError::HttpStatus(status) => *status >= 500,
            FetchError::InvalidContent => false,
        }
    }

    fn http_status(&self) -> Option<u16> {
        match self {
            FetchError::HttpStatus(status) => Some(*status),
            FetchError::Transport(_) | FetchError::InvalidContent => None,
        }
    }
}

/// Everything that parameterizes one fetch run.
#[derive(Clone)]
pub struct FetchPolicy {
    /// Tried strictly in order; the first validated body wins.
    pub candidates: Vec<Candidate>,
    pub user_agent: String,
    /// Deadline for each individual request.
    pub request_timeout: Duration,
    pub source_label: String,
    pub max_diagnostics: usize,
    pub validator: Validator,
}

impl std::fmt::Debug for FetchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchPolicy")
            .field("candidates", &self.candidates)
            .field("user_agent", &self.user_agent)
            .field("request_timeout", &self.request_timeout)
            .field("source_label", &self.source_label)
            .field("max_diagnostics", &self.max_diagnostics)
            .finish_non_exhaustive()
    }
}

impl FetchPolicy {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            user_agent: crate::config::DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(20),
            source_label: DEFAULT_SOURCE_LABEL.to_string(),
            max_diagnostics: DEFAULT_MAX_DIAGNOSTICS,
            validator: looks_like_rss,
        }
    }
}

/// Runs the direct-then-proxy fallback chain over a [`Transport`].
///
/// Holds no per-run state, so one instance can serve any number of
/// concurrent invocations.
#[derive(Debug, Clone)]
pub struct FeedFetcher<T> {
    transport: T,
    policy: FetchPolicy,
}

impl<T: Transport> FeedFetcher<T> {
    pub fn new(transport: T, policy: FetchPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    /// Fetches the feed and builds the envelope for this invocation.
    ///
    /// # Behavior
    ///
    /// - Candidates are tried sequentially, never concurrently
    /// - Each candidate gets up to `attempts` requests; 5xx and transport
    ///   errors are retried after the candidate's `retry_delay`
    /// - 4xx (and any other non-2xx) or a non-RSS body fails the candidate
    ///   immediately
    /// - The first validated body returns a success envelope; later
    ///   candidates are not contacted
    /// - Otherwise the failure envelope carries each candidate's last
    ///   outcome, capped at `max_diagnostics`
    pub async fn fetch(&self) -> Envelope {
        let policy = &self.policy;

        if policy.candidates.is_empty() {
            tracing::error!("No candidate URLs configured");
            return Envelope::failure(
                &policy.source_label,
                "No candidate URLs configured",
                Vec::new(),
                policy.max_diagnostics,
            );
        }

        let total = policy.candidates.len();
        let mut diagnostics = Vec::with_capacity(total.min(policy.max_diagnostics));
        let mut last_error = None;

        for (index, candidate) in policy.candidates.iter().enumerate() {
            tracing::info!(
                candidate = %candidate.name,
                url = %candidate.url,
                position = index + 1,
                total = total,
                "Trying candidate"
            );

            match self.fetch_candidate(candidate).await {
                Ok(content) => {
                    tracing::info!(
                        candidate = %candidate.name,
                        content_length = content.len(),
                        "Fetched valid RSS"
                    );
                    return Envelope::success(&policy.source_label, content);
                }
                Err(e) => {
                    tracing::warn!(candidate = %candidate.name, error = %e, "Candidate failed");
                    if diagnostics.len() < policy.max_diagnostics {
                        diagnostics.push(FetchAttempt::failed(
                            &candidate.url,
                            e.http_status(),
                            e.to_string(),
                        ));
                    }
                    last_error = Some(e);
                }
            }
        }

        let message = match last_error {
            Some(e) => format!("All fetch methods exhausted. Last error: {e}"),
            None => "All fetch methods exhausted".to_string(),
        };
        tracing::error!(candidates = total, "{}", message);
        Envelope::failure(&policy.source_label, message, diagnostics, policy.max_diagnostics)
    }

    async fn fetch_candidate(&self, candidate: &Candidate) -> Result<String, FetchError> {
        let headers = candidate.headers(&self.policy.user_agent);
        let mut attempt = 1;

        loop {
            match self.attempt_once(candidate, &headers).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt < candidate.attempts => {
                    tracing::warn!(
                        candidate = %candidate.name,
                        error = %e,
                        attempt = attempt,
                        max_attempts = candidate.attempts,
                        delay_ms = candidate.retry_delay.as_millis() as u64,
                        "Attempt failed, retrying after delay"
                    );
                    tokio::time::sleep(candidate.retry_delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn attempt_once(
        &self,
        candidate: &Candidate,
        headers: &RequestHeaders,
    ) -> Result<String, FetchError> {
        let response = self
            .transport
            .get(&candidate.url, headers, self.policy.request_timeout)
            .await?;

        if !(200..300).contains(&response.status) {
            return Err(FetchError::HttpStatus(response.status));
        }

        if !(self.policy.validator)(&response.body) {
            return Err(FetchError::InvalidContent);
        }

        Ok(response.body)
    }
}
