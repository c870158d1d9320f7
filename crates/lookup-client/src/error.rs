//! Lookup Error Types

use thiserror::Error;

/// Errors raised by the individual lookup sources.
///
/// These never leave [`crate::LookupClient`]; they are logged and turned
/// into absent fields.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Query exceeded its deadline
    #[error("{source_name} lookup timed out after {timeout_ms}ms")]
    Timeout {
        source_name: &'static str,
        timeout_ms: u64,
    },

    /// Domain is not something we can query
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    /// DNS resolution error
    #[error("DNS error: {0}")]
    Dns(String),

    /// WHOIS client or registry error
    #[error("WHOIS error: {0}")]
    Whois(String),

    /// WHOIS answered but without any recognizable dates
    #[error("WHOIS response for {0} had no registration dates")]
    NoRegistrationData(String),
}
