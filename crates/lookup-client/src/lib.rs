//! Domain Lookup Client
//!
//! Provides memoized DNS and WHOIS queries, each bounded by its own deadline.
//! Every failure degrades to an absent field; nothing here surfaces an error
//! to the feature pipeline.

mod cache;
mod client;
mod dns;
mod error;
mod whois;

pub use cache::{normalize_domain, LookupCache, DEFAULT_CACHE_CAPACITY};
pub use client::{LookupClient, LookupConfig};
pub use dns::{DnsCheck, HickoryDns};
pub use error::LookupError;
pub use whois::{parse_whois_dates, RegistryWhois, WhoisSource};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Registration dates reported by a WHOIS server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhoisRecord {
    pub creation_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
}

impl WhoisRecord {
    /// Whether the record carries at least one usable date
    pub fn is_empty(&self) -> bool {
        self.creation_date.is_none() && self.expiration_date.is_none()
    }
}

/// Outcome of looking up one domain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResult {
    /// Any of A, MX or NS resolved
    pub dns_present: bool,
    /// WHOIS dates, `None` when the query failed or timed out
    pub whois: Option<WhoisRecord>,
}

impl LookupResult {
    /// Result used when nothing could be looked up
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn creation_date(&self) -> Option<NaiveDate> {
        self.whois.and_then(|w| w.creation_date)
    }

    pub fn expiration_date(&self) -> Option<NaiveDate> {
        self.whois.and_then(|w| w.expiration_date)
    }
}

/// Seam consumed by the feature assembler
#[async_trait]
pub trait DomainLookup: Send + Sync {
    /// Look up a registrable domain. Never fails; failures are absent fields.
    async fn lookup(&self, domain: &str) -> LookupResult;
}
