//! DNS Presence Check

use crate::error::LookupError;
use async_trait::async_trait;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::proto::rr::RecordType;
use hickory_resolver::TokioAsyncResolver;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Record types checked, in order, when probing a domain
const QUERIED_RECORDS: [RecordType; 3] = [RecordType::A, RecordType::MX, RecordType::NS];

/// Answers whether a domain has any DNS footprint
#[async_trait]
pub trait DnsCheck: Send + Sync {
    /// True if any of A, MX or NS resolves. Failures and timeouts are `false`.
    async fn has_records(&self, domain: &str) -> bool;
}

/// DNS presence check backed by hickory's async resolver
pub struct HickoryDns {
    resolver: TokioAsyncResolver,
    /// Deadline applied to each record-type query
    query_timeout: Duration,
}

impl HickoryDns {
    /// Create a checker on the default upstream resolvers, with individual
    /// queries bounded by `query_timeout`
    pub fn new(query_timeout: Duration) -> Self {
        Self::with_config(ResolverConfig::default(), query_timeout)
    }

    /// Create a checker that asks only `nameserver` (plain UDP/TCP)
    pub fn with_nameserver(nameserver: SocketAddr, query_timeout: Duration) -> Self {
        let servers =
            NameServerConfigGroup::from_ips_clear(&[nameserver.ip()], nameserver.port(), true);
        Self::with_config(ResolverConfig::from_parts(None, vec![], servers), query_timeout)
    }

    fn with_config(config: ResolverConfig, query_timeout: Duration) -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = query_timeout;
        opts.attempts = 1;

        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
            query_timeout,
        }
    }

    async fn resolves(&self, domain: &str, record_type: RecordType) -> Result<bool, LookupError> {
        match timeout(self.query_timeout, self.resolver.lookup(domain, record_type)).await {
            Ok(Ok(answer)) => Ok(answer.iter().next().is_some()),
            Ok(Err(e)) => Err(LookupError::Dns(e.to_string())),
            Err(_) => Err(LookupError::Timeout {
                source_name: "DNS",
                timeout_ms: self.query_timeout.as_millis() as u64,
            }),
        }
    }
}

#[async_trait]
impl DnsCheck for HickoryDns {
    async fn has_records(&self, domain: &str) -> bool {
        for record_type in QUERIED_RECORDS {
            match self.resolves(domain, record_type).await {
                Ok(true) => return true,
                Ok(false) => {}
                Err(e) => debug!("DNS {:?} lookup for {}: {}", record_type, domain, e),
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio::net::UdpSocket;

    #[tokio::test]
    async fn test_silent_nameserver_is_bounded() {
        // bound but never read: every query goes unanswered
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let dns = HickoryDns::with_nameserver(
            silent.local_addr().unwrap(),
            Duration::from_millis(100),
        );

        let started = Instant::now();
        let present = dns.has_records("example.com").await;

        assert!(!present);
        // three record types, each bounded by its own deadline
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_timeout_is_reported_as_error() {
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let dns = HickoryDns::with_nameserver(
            silent.local_addr().unwrap(),
            Duration::from_millis(50),
        );

        let err = dns
            .resolves("example.com", RecordType::A)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LookupError::Timeout { .. } | LookupError::Dns(_)
        ));
    }
}
