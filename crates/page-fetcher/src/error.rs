//! Fetch Error Types

use thiserror::Error;

/// Reasons a fetch is abandoned.
///
/// Logged at debug level by [`crate::PageFetcher`] and never returned to callers
/// of [`crate::PageSource::fetch`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Fetch timed out after {0}ms")]
    Timeout(u64),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Redirect without a usable Location header")]
    BrokenRedirect,

    #[error("Too many redirects (limit {0})")]
    TooManyRedirects(usize),
}
