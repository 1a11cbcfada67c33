use crate::transport::RequestHeaders;
use crate::util::{validate_url, UrlValidationError};
use serde::Deserialize;
use std::time::Duration;

/// Accept header for requests that go straight to the feed host.
pub const DIRECT_ACCEPT: &str = "application/rss+xml, application/xml, text/xml, */*";
/// Relays may not forward content negotiation, so ask for anything.
pub const PROXY_ACCEPT: &str = "*/*";

const RAW_PLACEHOLDER: &str = "{url}";
const ENCODED_PLACEHOLDER: &str = "{url_encoded}";

/// How a candidate reaches the feed host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    /// Request the source URL itself.
    Direct,
    /// Request a public relay that fetches the source URL on our behalf.
    Proxy,
}

/// One entry of the configured fallback chain, before rendering.
///
/// `template` may contain `{url}` (the raw source URL) and `{url_encoded}`
/// (the source URL percent-encoded as a query or path component).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CandidateTemplate {
    pub name: String,
    pub kind: CandidateKind,
    pub template: String,
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_attempts() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    1500
}

impl CandidateTemplate {
    pub fn new(name: &str, kind: CandidateKind, template: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            template: template.to_string(),
            attempts: default_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }

    /// The fallback chain used when no config file overrides it: direct
    /// first, then the public relays in order.
    pub fn default_chain() -> Vec<Self> {
        vec![
            Self::new("direct", CandidateKind::Direct, RAW_PLACEHOLDER),
            Self::new(
                "allorigins",
                CandidateKind::Proxy,
                "https://api.allorigins.win/raw?url={url_encoded}",
            ),
            Self::new(
                "corsproxy",
                CandidateKind::Proxy,
                "https://corsproxy.io/?{url_encoded}",
            ),
            Self::new(
                "isomorphic-git",
                CandidateKind::Proxy,
                "https://cors.isomorphic-git.org/{url}",
            ),
        ]
    }

    /// Substitutes the source URL into the template and validates the result.
    pub fn render(&self, source_url: &str) -> Result<Candidate, UrlValidationError> {
        let encoded = urlencoding::encode(source_url);
        let rendered = self
            .template
            .replace(ENCODED_PLACEHOLDER, &encoded)
            .replace(RAW_PLACEHOLDER, source_url);
        let url = validate_url(&rendered)?;

        Ok(Candidate {
            name: self.name.clone(),
            kind: self.kind,
            url: url.to_string(),
            attempts: self.attempts.max(1),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        })
    }
}

/// A concrete URL to attempt, with its own retry budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub kind: CandidateKind,
    pub url: String,
    /// Total number of requests allowed against this candidate (at least 1).
    pub attempts: u32,
    /// Pause between retryable failures on this candidate.
    pub retry_delay: Duration,
}

impl Candidate {
    /// Builds a candidate without going through a template.
    pub fn new(
        name: &str,
        kind: CandidateKind,
        url: &str,
        attempts: u32,
        retry_delay: Duration,
    ) -> Self {
        Self {
            name: name.to_string(),
            kind,
            url: url.to_string(),
            attempts: attempts.max(1),
            retry_delay,
        }
    }

    pub fn headers(&self, user_agent: &str) -> RequestHeaders {
        let accept = match self.kind {
            CandidateKind::Direct => DIRECT_ACCEPT,
            CandidateKind::Proxy => PROXY_ACCEPT,
        };
        RequestHeaders {
            user_agent: user_agent.to_string(),
            accept: accept.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = "https://www.kyberturvallisuuskeskus.fi/feed/rss/fi";

    #[test]
    fn test_direct_renders_source_unchanged() {
        let candidate = CandidateTemplate::new("direct", CandidateKind::Direct, "{url}")
            .render(SOURCE)
            .unwrap();
        assert_eq!(candidate.url, SOURCE);
    }

    #[test]
    fn test_query_proxy_encodes_source() {
        let candidate = CandidateTemplate::new(
            "allorigins",
            CandidateKind::Proxy,
            "https://api.allorigins.win/raw?url={url_encoded}",
        )
        .render(SOURCE)
        .unwrap();
        assert_eq!(
            candidate.url,
            "https://api.allorigins.win/raw?url=https%3A%2F%2Fwww.kyberturvallisuuskeskus.fi%2Ffeed%2Frss%2Ffi"
        );
    }

    #[test]
    fn test_path_proxy_appends_raw_source() {
        let candidate = CandidateTemplate::new(
            "isomorphic-git",
            CandidateKind::Proxy,
            "https://cors.isomorphic-git.org/{url}",
        )
        .render(SOURCE)
        .unwrap();
        assert!(candidate
            .url
            .starts_with("https://cors.isomorphic-git.org/https:"));
        assert!(candidate.url.ends_with("/feed/rss/fi"));
    }

    #[test]
    fn test_render_rejects_non_http_result() {
        let result = CandidateTemplate::new("bad", CandidateKind::Proxy, "ftp://relay/{url}")
            .render(SOURCE);
        assert!(matches!(
            result,
            Err(UrlValidationError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_zero_attempts_clamped_to_one() {
        let mut template = CandidateTemplate::new("direct", CandidateKind::Direct, "{url}");
        template.attempts = 0;
        assert_eq!(template.render(SOURCE).unwrap().attempts, 1);
    }

    #[test]
    fn test_default_chain_starts_direct() {
        let chain = CandidateTemplate::default_chain();
        assert_eq!(chain.len(), 4);
        assert_eq!(chain[0].kind, CandidateKind::Direct);
        assert!(chain[1..].iter().all(|c| c.kind == CandidateKind::Proxy));
        assert!(chain.iter().all(|c| c.render(SOURCE).is_ok()));
    }

    #[test]
    fn test_accept_header_depends_on_kind() {
        let direct = Candidate::new("d", CandidateKind::Direct, SOURCE, 1, Duration::ZERO);
        let proxy = Candidate::new("p", CandidateKind::Proxy, SOURCE, 1, Duration::ZERO);
        assert_eq!(direct.headers("ua").accept, DIRECT_ACCEPT);
        assert_eq!(proxy.headers("ua").accept, PROXY_ACCEPT);
        assert_eq!(proxy.headers("ua").user_agent, "ua");
    }
}
