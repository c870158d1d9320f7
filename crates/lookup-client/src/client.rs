//! Memoizing Lookup Client
//!
//! Combines a DNS presence check and a WHOIS source behind one bounded cache.

use crate::cache::{normalize_domain, LookupCache, DEFAULT_CACHE_CAPACITY};
use crate::dns::{DnsCheck, HickoryDns};
use crate::whois::{RegistryWhois, WhoisSource};
use crate::{DomainLookup, LookupResult, WhoisRecord};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default per-query deadline for DNS and WHOIS (ms)
const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 4000;

/// Lookup client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Deadline for each DNS record-type query (ms)
    pub dns_timeout_ms: u64,
    /// Deadline for one complete WHOIS exchange (ms)
    pub whois_timeout_ms: u64,
    /// Maximum memoized domains
    pub cache_capacity: usize,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            dns_timeout_ms: DEFAULT_LOOKUP_TIMEOUT_MS,
            whois_timeout_ms: DEFAULT_LOOKUP_TIMEOUT_MS,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// DNS + WHOIS client with a bounded memo keyed by normalized domain
pub struct LookupClient {
    dns: Arc<dyn DnsCheck>,
    whois: Arc<dyn WhoisSource>,
    cache: LookupCache,
}

impl LookupClient {
    /// Create a client using hickory DNS and registry WHOIS
    pub fn new(config: &LookupConfig) -> Self {
        info!(
            "Creating lookup client: dns_timeout={}ms, whois_timeout={}ms, cache={}",
            config.dns_timeout_ms, config.whois_timeout_ms, config.cache_capacity
        );
        Self::with_sources(
            Arc::new(HickoryDns::new(Duration::from_millis(config.dns_timeout_ms))),
            Arc::new(RegistryWhois::new(Duration::from_millis(config.whois_timeout_ms))),
            LookupCache::new(config.cache_capacity),
        )
    }

    /// Create a client over explicit sources (used by tests and offline runs)
    pub fn with_sources(
        dns: Arc<dyn DnsCheck>,
        whois: Arc<dyn WhoisSource>,
        cache: LookupCache,
    ) -> Self {
        Self { dns, whois, cache }
    }

    /// Access the memo (for statistics)
    pub fn cache(&self) -> &LookupCache {
        &self.cache
    }

    async fn query_whois(&self, domain: &str) -> Option<WhoisRecord> {
        match self.whois.query(domain).await {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("WHOIS lookup failed for {}: {}", domain, e);
                None
            }
        }
    }
}

/// Only registrable hostnames are worth querying
fn is_queryable(domain: &str) -> bool {
    !domain.is_empty() && domain.contains('.') && domain.parse::<IpAddr>().is_err()
}

#[async_trait]
impl DomainLookup for LookupClient {
    async fn lookup(&self, domain: &str) -> LookupResult {
        let key = normalize_domain(domain);
        if !is_queryable(&key) {
            debug!("Skipping lookup for non-registrable host '{}'", key);
            return LookupResult::absent();
        }

        if let Some(cached) = self.cache.get(&key) {
            return cached;
        }

        let (dns_present, whois) =
            tokio::join!(self.dns.has_records(&key), self.query_whois(&key));

        let result = LookupResult { dns_present, whois };
        debug!("Lookup for {}: dns={}, whois={:?}", key, dns_present, whois);
        self.cache.insert(&key, result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LookupError;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingDns {
        answer: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DnsCheck for CountingDns {
        async fn has_records(&self, _domain: &str) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
        }
    }

    struct FailingWhois;

    #[async_trait]
    impl WhoisSource for FailingWhois {
        async fn query(&self, _domain: &str) -> Result<WhoisRecord, LookupError> {
            Err(LookupError::Timeout {
                source_name: "WHOIS",
                timeout_ms: 4000,
            })
        }
    }

    struct FixedWhois(WhoisRecord);

    #[async_trait]
    impl WhoisSource for FixedWhois {
        async fn query(&self, _domain: &str) -> Result<WhoisRecord, LookupError> {
            Ok(self.0)
        }
    }

    fn client(dns: Arc<CountingDns>, whois: Arc<dyn WhoisSource>) -> LookupClient {
        LookupClient::with_sources(dns, whois, LookupCache::new(16))
    }

    #[tokio::test]
    async fn test_failures_degrade_to_absent_fields() {
        let dns = Arc::new(CountingDns {
            answer: false,
            calls: AtomicUsize::new(0),
        });
        let client = client(dns, Arc::new(FailingWhois));

        let result = client.lookup("example.com").await;
        assert!(!result.dns_present);
        assert!(result.whois.is_none());
    }

    #[tokio::test]
    async fn test_results_are_memoized() {
        let dns = Arc::new(CountingDns {
            answer: true,
            calls: AtomicUsize::new(0),
        });
        let record = WhoisRecord {
            creation_date: NaiveDate::from_ymd_opt(2001, 1, 1),
            expiration_date: NaiveDate::from_ymd_opt(2030, 1, 1),
        };
        let client = client(dns.clone(), Arc::new(FixedWhois(record)));

        let first = client.lookup("Example.com").await;
        let second = client.lookup("https://example.com/").await;

        assert_eq!(first, second);
        assert_eq!(first.whois, Some(record));
        assert_eq!(dns.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unresponsive_backends_degrade_to_absent() {
        let silent = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let deadline = Duration::from_millis(100);
        let client = LookupClient::with_sources(
            Arc::new(HickoryDns::with_nameserver(
                silent.local_addr().unwrap(),
                deadline,
            )),
            Arc::new(RegistryWhois::new(Duration::from_millis(20))),
            LookupCache::new(4),
        );

        let started = std::time::Instant::now();
        let result = client.lookup("example.com").await;

        assert_eq!(result, LookupResult::absent());
        assert!(started.elapsed() < Duration::from_secs(3));
        // failures are memoized like answers
        assert_eq!(client.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_ip_hosts_are_not_queried() {
        let dns = Arc::new(CountingDns {
            answer: true,
            calls: AtomicUsize::new(0),
        });
        let client = client(dns.clone(), Arc::new(FailingWhois));

        let result = client.lookup("192.168.1.1").await;
        assert_eq!(result, LookupResult::absent());
        assert_eq!(dns.calls.load(Ordering::SeqCst), 0);
        assert!(client.cache().is_empty());
    }
}
