//! URL Parsing and Domain Splitting

use crate::error::FeatureError;
use std::net::IpAddr;
use tldextract::{TldExtractor, TldOption};
use tracing::debug;
use url::Url;

/// Trim an input URL, rejecting empty input
pub fn validate_url(raw: &str) -> Result<&str, FeatureError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FeatureError::EmptyUrl);
    }
    Ok(trimmed)
}

/// Structural parts of a URL, derived once per extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    /// Lowercased scheme, `http` when the input had none
    pub scheme: String,
    /// Lowercased host without port
    pub host: String,
    /// Explicit port, `None` when absent or equal to the scheme default
    pub port: Option<u16>,
    /// Path component
    pub path: String,
    /// Absolute URL used for fetching
    pub fetch_url: String,
}

impl ParsedUrl {
    /// Parse leniently. Never fails; unparseable input keeps a best-effort host.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let absolute = if raw.contains("://") {
            raw.to_string()
        } else {
            format!("http://{}", raw)
        };

        match Url::parse(&absolute) {
            Ok(url) => Self {
                scheme: url.scheme().to_string(),
                host: url.host_str().unwrap_or_default().to_string(),
                port: url.port(),
                path: url.path().to_string(),
                fetch_url: url.to_string(),
            },
            Err(e) => {
                debug!("Lenient parse of '{}': {}", raw, e);
                Self::fallback(&absolute)
            }
        }
    }

    fn fallback(absolute: &str) -> Self {
        let (scheme, rest) = absolute.split_once("://").unwrap_or(("http", absolute));
        let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
        let authority = &rest[..end];
        let host_port = authority.rsplit('@').next().unwrap_or(authority);
        let host = match host_port.rsplit_once(':') {
            Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host,
            _ => host_port,
        };

        Self {
            scheme: scheme.to_ascii_lowercase(),
            host: host.to_ascii_lowercase(),
            port: None,
            path: rest[end..].to_string(),
            fetch_url: absolute.to_string(),
        }
    }

    /// Whether the host is an IP literal
    pub fn is_ip(&self) -> bool {
        self.host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .is_ok()
    }
}

/// Public-suffix-aware host split
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainParts {
    pub subdomain: String,
    pub domain: String,
    pub suffix: String,
}

impl DomainParts {
    /// `domain.suffix`, or just `domain` when there is no suffix
    pub fn registrable(&self) -> String {
        if self.suffix.is_empty() {
            self.domain.clone()
        } else {
            format!("{}.{}", self.domain, self.suffix)
        }
    }

    /// Split on labels only: last label is the suffix
    fn naive(host: &str) -> Self {
        let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
        match labels.len() {
            0 => Self::default(),
            1 => Self {
                domain: labels[0].to_string(),
                ..Self::default()
            },
            n => Self {
                subdomain: labels[..n - 2].join("."),
                domain: labels[n - 2].to_string(),
                suffix: labels[n - 1].to_string(),
            },
        }
    }
}

/// Splits hosts into [`DomainParts`] using the public suffix list
pub struct DomainSplitter {
    extractor: TldExtractor,
}

impl DomainSplitter {
    /// Create a splitter backed by the bundled suffix list
    pub fn new() -> Self {
        Self {
            extractor: TldExtractor::new(TldOption::default()),
        }
    }

    /// Split a host. IP literals become the domain with empty suffix.
    pub fn split(&self, url: &ParsedUrl) -> DomainParts {
        let host = url.host.trim_end_matches('.');
        if url.is_ip() {
            return DomainParts {
                domain: host.to_string(),
                ..DomainParts::default()
            };
        }

        match self.extractor.extract(&format!("http://{}", host)) {
            Ok(result) => match (result.domain, result.suffix) {
                (Some(domain), Some(suffix)) => DomainParts {
                    subdomain: result.subdomain.unwrap_or_default(),
                    domain,
                    suffix,
                },
                _ => DomainParts::naive(host),
            },
            Err(e) => {
                debug!("Suffix split failed for '{}': {}", host, e);
                DomainParts::naive(host)
            }
        }
    }
}

impl Default for DomainSplitter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert_eq!(validate_url("  http://a.com \n"), Ok("http://a.com"));
        assert_eq!(validate_url("   "), Err(FeatureError::EmptyUrl));
    }

    #[test]
    fn test_parse_full_url() {
        let url = ParsedUrl::parse("https://Login.Example.com:8443/a/b?q=1");
        assert_eq!(url.scheme, "https");
        assert_eq!(url.host, "login.example.com");
        assert_eq!(url.port, Some(8443));
        assert_eq!(url.path, "/a/b");
    }

    #[test]
    fn test_missing_scheme_defaults_to_http() {
        let url = ParsedUrl::parse("example.com/path");
        assert_eq!(url.scheme, "http");
        assert_eq!(url.host, "example.com");
        assert_eq!(url.fetch_url, "http://example.com/path");
    }

    #[test]
    fn test_default_port_is_implicit() {
        assert_eq!(ParsedUrl::parse("http://example.com:80/").port, None);
    }

    #[test]
    fn test_fallback_host_on_bad_url() {
        let url = ParsedUrl::parse("http://exa mple.com:99/x");
        assert_eq!(url.host, "exa mple.com");
        assert_eq!(url.path, "/x");
    }

    #[test]
    fn test_fallback_host_is_lowercased() {
        // port out of range: rejected by the url crate
        let url = ParsedUrl::parse("http://BIT.LY:99999/abc");
        assert_eq!(url.host, "bit.ly");
        assert_eq!(url.port, None);

        let url = ParsedUrl::parse("HTTP://192.168.1.1:70000/login");
        assert_eq!(url.scheme, "http");
        assert!(url.is_ip());
    }

    #[test]
    fn test_ip_host() {
        let url = ParsedUrl::parse("http://192.168.1.1/login");
        assert!(url.is_ip());

        let parts = DomainSplitter::new().split(&url);
        assert_eq!(parts.domain, "192.168.1.1");
        assert!(parts.suffix.is_empty());
        assert_eq!(parts.registrable(), "192.168.1.1");
    }

    #[test]
    fn test_split_subdomain() {
        let url = ParsedUrl::parse("http://www.example.com/");
        let parts = DomainSplitter::new().split(&url);
        assert_eq!(parts.subdomain, "www");
        assert_eq!(parts.domain, "example");
        assert_eq!(parts.suffix, "com");
    }

    #[test]
    fn test_naive_split() {
        let parts = DomainParts::naive("a.b.c.zz");
        assert_eq!(parts.subdomain, "a.b");
        assert_eq!(parts.domain, "c");
        assert_eq!(parts.suffix, "zz");
        assert_eq!(DomainParts::naive("localhost").registrable(), "localhost");
    }
}
