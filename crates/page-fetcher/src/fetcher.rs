//! HTTP Page Fetcher

use crate::dom::PageDom;
use crate::error::FetchError;
use crate::{FetchedPage, PageSnapshot, PageSource};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::redirect::Policy;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};
use url::Url;

/// Fetcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Deadline for the whole fetch including redirects (ms)
    pub timeout_ms: u64,
    /// Redirect hops followed before giving up
    pub max_redirects: usize,
    /// Body bytes read before truncating
    pub max_body_bytes: usize,
    /// User-Agent header
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            max_redirects: 10,
            max_body_bytes: 2 * 1024 * 1024,
            user_agent: format!("phishguard/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Best-effort page fetcher.
///
/// Certificate verification is disabled so that hosts with broken TLS are
/// still inspected.
pub struct PageFetcher {
    client: Client,
    config: FetchConfig,
}

impl PageFetcher {
    /// Create a new fetcher
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        info!(
            "Creating page fetcher: timeout={}ms, max_redirects={}",
            config.timeout_ms, config.max_redirects
        );

        let client = Client::builder()
            .redirect(Policy::none())
            .danger_accept_invalid_certs(true)
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Fetch a URL, following redirects by hand so they can be counted
    pub async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let mut current = parse_lenient(url)?;
        let mut redirect_count = 0;

        loop {
            let response = self.client.get(current.clone()).send().await?;
            let status = response.status();

            if status.is_redirection() {
                if redirect_count >= self.config.max_redirects {
                    return Err(FetchError::TooManyRedirects(self.config.max_redirects));
                }
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or(FetchError::BrokenRedirect)?;
                current = current
                    .join(location)
                    .map_err(|_| FetchError::BrokenRedirect)?;
                redirect_count += 1;
                debug!("Redirect {} -> {}", redirect_count, current);
                continue;
            }

            let html = is_html(&response);
            let body = read_capped(response, self.config.max_body_bytes).await?;
            let dom = html.then(|| PageDom::parse(&body));

            return Ok(FetchedPage {
                status: status.as_u16(),
                redirect_count,
                final_url: current.to_string(),
                dom,
            });
        }
    }
}

#[async_trait]
impl PageSource for PageFetcher {
    async fn fetch(&self, url: &str) -> PageSnapshot {
        let deadline = Duration::from_millis(self.config.timeout_ms);
        let outcome = match timeout(deadline, self.fetch_page(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.config.timeout_ms)),
        };

        match outcome {
            Ok(page) => Some(page),
            Err(e) => {
                debug!("Fetch of {} abandoned: {}", url, e);
                None
            }
        }
    }
}

/// Parse a URL, assuming `http` when the scheme is missing
fn parse_lenient(url: &str) -> Result<Url, FetchError> {
    let trimmed = url.trim();
    match Url::parse(trimmed) {
        Ok(parsed) => Ok(parsed),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("http://{}", trimmed))
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", trimmed, e))),
        Err(e) => Err(FetchError::InvalidUrl(format!("{}: {}", trimmed, e))),
    }
}

/// Missing content types are parsed as HTML
fn is_html(response: &Response) -> bool {
    match response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    {
        Some(ct) => {
            let ct = ct.to_ascii_lowercase();
            ct.contains("html") || ct.contains("xml")
        }
        None => true,
    }
}

async fn read_capped(mut response: Response, limit: usize) -> Result<String, FetchError> {
    let mut buf: Vec<u8> = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let room = limit.saturating_sub(buf.len());
        buf.extend_from_slice(&chunk[..chunk.len().min(room)]);
        if buf.len() >= limit {
            debug!("Body truncated at {} bytes", limit);
            break;
        }
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
