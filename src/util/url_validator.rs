use thiserror::Error;
use url::Url;

/// Errors that can occur while validating a rendered candidate URL.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// The URL parsed but carries no host to connect to.
    #[error("URL has no host")]
    MissingHost,
}

/// Validates a URL string for use as a fetch candidate.
///
/// Only absolute `http`/`https` URLs with a host are accepted. Hosts are not
/// otherwise restricted: relays and local test servers are legitimate
/// targets here.
///
/// # Examples
///
/// ```
/// use feedrelay::util::validate_url;
///
/// let url = validate_url("https://api.allorigins.win/raw?url=x").unwrap();
/// assert_eq!(url.host_str(), Some("api.allorigins.win"));
///
/// assert!(validate_url("file:///etc/passwd").is_err());
/// assert!(validate_url("not a url").is_err());
/// ```
pub fn validate_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(url)
}
