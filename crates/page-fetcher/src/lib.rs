//! Page Fetcher
//!
//! Performs one best-effort GET per URL and reduces the HTML to the facts
//! content signals need. Any failure produces an absent snapshot.

mod dom;
mod error;
mod fetcher;

pub use dom::PageDom;
pub use error::FetchError;
pub use fetcher::{FetchConfig, PageFetcher};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A page that was successfully retrieved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedPage {
    /// Final HTTP status after redirects
    pub status: u16,
    /// Number of redirects followed
    pub redirect_count: usize,
    /// URL the body was served from
    pub final_url: String,
    /// Reduced document, `None` when the body was not HTML
    pub dom: Option<PageDom>,
}

/// `None` when the fetch failed or timed out
pub type PageSnapshot = Option<FetchedPage>;

/// Seam consumed by the feature assembler
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch a URL. Never fails; errors yield `None`.
    async fn fetch(&self, url: &str) -> PageSnapshot;
}
