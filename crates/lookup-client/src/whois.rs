//! Registry WHOIS

use crate::error::LookupError;
use crate::WhoisRecord;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::time::timeout;
use tracing::debug;
use whois_service::{WhoisClient, WhoisResponse};

/// Labels registries use for the registration date
const CREATION_LABELS: &[&str] = &[
    "creation date",
    "created on",
    "created",
    "registration time",
    "registered on",
    "registered",
    "domain registration date",
    "domain name commencement date",
];

/// Labels registries use for the expiry date
const EXPIRATION_LABELS: &[&str] = &[
    "registry expiry date",
    "registrar registration expiration date",
    "expiration date",
    "expiry date",
    "expires on",
    "expires",
    "expire date",
    "expiration time",
    "paid-till",
    "renewal date",
];

/// Date layouts tried against the first token of a date value
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d", "%d-%b-%Y", "%d.%m.%Y", "%d/%m/%Y", "%Y%m%d",
];

/// Source of WHOIS registration dates
#[async_trait]
pub trait WhoisSource: Send + Sync {
    /// Query a registrable domain (e.g. `example.co.uk`)
    async fn query(&self, domain: &str) -> Result<WhoisRecord, LookupError>;
}

/// WHOIS through the registry servers discovered by `whois-service`
pub struct RegistryWhois {
    /// Deadline for the whole exchange, client setup included
    query_timeout: Duration,
    client: OnceCell<WhoisClient>,
}

impl RegistryWhois {
    /// Create a source whose full exchange is bounded by `query_timeout`.
    /// The underlying client is built on first use.
    pub fn new(query_timeout: Duration) -> Self {
        Self {
            query_timeout,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> Result<&WhoisClient, LookupError> {
        self.client
            .get_or_try_init(|| async {
                // lookups are memoized by LookupCache
                WhoisClient::new_without_cache()
                    .await
                    .map_err(|e| LookupError::Whois(e.to_string()))
            })
            .await
    }

    async fn query_registry(&self, domain: &str) -> Result<WhoisRecord, LookupError> {
        if domain.is_empty() || !domain.contains('.') {
            return Err(LookupError::InvalidDomain(domain.to_string()));
        }

        let response = self
            .client()
            .await?
            .lookup(domain)
            .await
            .map_err(|e| LookupError::Whois(e.to_string()))?;
        debug!("WHOIS for {} answered by {}", domain, response.whois_server);

        let record = record_from_response(&response);
        if record.is_empty() {
            return Err(LookupError::NoRegistrationData(domain.to_string()));
        }
        Ok(record)
    }
}

#[async_trait]
impl WhoisSource for RegistryWhois {
    async fn query(&self, domain: &str) -> Result<WhoisRecord, LookupError> {
        match timeout(self.query_timeout, self.query_registry(domain)).await {
            Ok(result) => result,
            Err(_) => Err(LookupError::Timeout {
                source_name: "WHOIS",
                timeout_ms: self.query_timeout.as_millis() as u64,
            }),
        }
    }
}

/// Structured dates first, then the registry labels in the raw text
fn record_from_response(response: &WhoisResponse) -> WhoisRecord {
    let parsed = response.parsed_data.as_ref();
    let from_raw = parse_whois_dates(&response.raw_data);

    WhoisRecord {
        creation_date: parsed
            .and_then(|p| p.creation_date.as_deref())
            .and_then(parse_date)
            .or(from_raw.creation_date),
        expiration_date: parsed
            .and_then(|p| p.expiration_date.as_deref())
            .and_then(parse_date)
            .or(from_raw.expiration_date),
    }
}

/// Parse a date value such as `2020-01-31T05:00:00Z` or `31-Jan-2020`
fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.date_naive());
    }

    let token = value.split_whitespace().next()?;
    let date_part = token.split('T').next().unwrap_or(token);

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// Extract creation and expiration dates from a raw WHOIS response.
///
/// The first parseable value for each label family wins.
pub fn parse_whois_dates(response: &str) -> WhoisRecord {
    let mut record = WhoisRecord::default();

    for line in response.lines() {
        let Some((label, value)) = line.split_once(':') else {
            continue;
        };
        let label = label.trim().to_lowercase();

        if record.creation_date.is_none() && CREATION_LABELS.contains(&label.as_str()) {
            record.creation_date = parse_date(value);
        } else if record.expiration_date.is_none()
            && EXPIRATION_LABELS.contains(&label.as_str())
        {
            record.expiration_date = parse_date(value);
        }

        if record.creation_date.is_some() && record.expiration_date.is_some() {
            break;
        }
    }

    record
}
