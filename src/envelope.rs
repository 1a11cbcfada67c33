//! The JSON envelope that is the entire output of one invocation.
//!
//! Exactly one of `content` and `error` is present: the two outcomes are
//! separate variants of [`Outcome`], so an envelope carrying both (or
//! neither) cannot be constructed.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// Outcome of one candidate, kept for the failure envelope only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchAttempt {
    pub url: String,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FetchAttempt {
    pub fn failed(url: &str, http_status: Option<u16>, error: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            succeeded: false,
            http_status,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Delivered {
        content: String,
        #[serde(rename = "contentLength")]
        content_length: usize,
    },
    Failed {
        error: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        attempts: Vec<FetchAttempt>,
    },
}

/// Success or failure envelope, serialized as a flat JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope {
    success: bool,
    #[serde(serialize_with = "serialize_timestamp")]
    timestamp: DateTime<Utc>,
    source: String,
    #[serde(flatten)]
    outcome: Outcome,
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

impl Envelope {
    /// Success envelope. `contentLength` is the UTF-8 byte length of `content`.
    pub fn success(source: &str, content: String) -> Self {
        let content_length = content.len();
        Self {
            success: true,
            timestamp: Utc::now(),
            source: source.to_string(),
            outcome: Outcome::Delivered {
                content,
                content_length,
            },
        }
    }

    /// Failure envelope. `attempts` is truncated to `max_attempts` entries.
    pub fn failure(
        source: &str,
        error: impl Into<String>,
        mut attempts: Vec<FetchAttempt>,
        max_attempts: usize,
    ) -> Self {
        attempts.truncate(max_attempts);
        Self {
            success: false,
            timestamp: Utc::now(),
            source: source.to_string(),
            outcome: Outcome::Failed {
                error: error.into(),
                attempts,
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn content(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Delivered { content, .. } => Some(content),
            Outcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Delivered { .. } => None,
            Outcome::Failed { error, .. } => Some(error),
        }
    }

    pub fn attempts(&self) -> &[FetchAttempt] {
        match &self.outcome {
            Outcome::Delivered { .. } => &[],
            Outcome::Failed { attempts, .. } => attempts,
        }
    }
}
