//! Feed retrieval through an ordered fallback chain.
//!
//! - [`candidate`] - Candidate templates and their rendering into concrete URLs
//! - [`validate`] - Syntactic RSS shape check run against delivered bodies
//! - [`fetcher`] - The sequential retry/fallback loop that produces an [`Envelope`]
//!
//! # Example
//!
//! ```ignore
//! use feedrelay::feed::{FeedFetcher, FetchPolicy};
//! use feedrelay::transport::HttpTransport;
//!
//! let fetcher = FeedFetcher::new(HttpTransport::new()?, config.fetch_policy()?);
//! let envelope = fetcher.fetch().await;
//! ```
//!
//! [`Envelope`]: crate::envelope::Envelope

pub mod candidate;
pub mod fetcher;
pub mod validate;

pub use candidate::{Candidate, CandidateKind, CandidateTemplate};
pub use fetcher::{FeedFetcher, FetchError, FetchPolicy};
pub use validate::{looks_like_rss, Validator};
