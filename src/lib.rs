//! Fetches a single RSS feed through an ordered direct-then-proxy fallback
//! chain and reports the outcome as a JSON envelope.
//!
//! Two entry points share the same [`feed::FeedFetcher`]:
//!
//! - [`web`] serves the envelope over HTTP, one fetch per GET request
//! - [`output`] writes the envelope to a JSON file for one-shot runs

pub mod config;
pub mod envelope;
pub mod feed;
pub mod output;
pub mod transport;
pub mod util;
pub mod web;
