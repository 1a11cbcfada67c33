//! Utility functions shared by the configuration and fetch layers.
//!
//! - **URL validation**: checks that rendered candidate URLs are absolute
//!   `http`/`https` URLs before any request is made.

mod url_validator;

pub use url_validator::{validate_url, UrlValidationError};
