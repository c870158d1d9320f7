//! Feature Schema
//!
//! The single ordered list of feature names shared by training, scaling and
//! inference. Tri-state signals use +1 = legitimate-looking, 0 = unknown,
//! -1 = suspicious.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of features in a vector
pub const FEATURE_DIMENSION: usize = 31;

/// Values a feature may take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueDomain {
    /// One of -1, 0, +1
    TriState,
    /// Non-negative integer
    Count,
    /// Non-negative real
    NonNegative,
}

impl ValueDomain {
    /// Whether a value belongs to this domain
    pub fn contains(&self, value: f64) -> bool {
        match self {
            ValueDomain::TriState => value == -1.0 || value == 0.0 || value == 1.0,
            ValueDomain::Count => value >= 0.0 && value.fract() == 0.0,
            ValueDomain::NonNegative => value >= 0.0,
        }
    }
}

/// Feature names in schema order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureName {
    /// -1 when the host is a dotted-quad IPv4 literal
    UsingIp,
    /// +1 below 54 chars, 0 up to 75, -1 above
    UrlLength,
    /// -1 when the host is a known shortener
    ShortenedUrl,
    /// -1 when the URL contains `@`
    AtSymbol,
    /// -1 when the last `//` sits after index 7
    DoubleSlashRedirect,
    /// -1 when the host contains `-`
    PrefixSuffix,
    /// Dots in host: 1 is +1, 2 is 0, otherwise -1
    SubDomains,
    /// +1 for the https scheme
    Https,
    /// +1 when registered for more than a year; 0 without WHOIS
    DomainRegistrationLength,
    /// +1 when the page declares an icon link
    Favicon,
    /// -1 for an explicit port other than 80/443
    NonStandardPort,
    /// -1 when the domain label contains `http`
    HttpsDomain,
    /// Share of cross-host images
    RequestUrl,
    /// Share of unsafe anchors
    AnchorUrl,
    /// Share of cross-host script sources
    LinksInScripts,
    /// -1 when a form posts to an empty action or `about:blank`
    ServerFormHandler,
    /// -1 when the URL embeds `mailto:` or `mail(`
    InfoEmail,
    /// -1 when the URL contains a phishing keyword
    AbnormalUrl,
    /// Redirects followed: up to 1 is +1, 2 is 0, more is -1
    WebsiteForwarding,
    StatusBarCustomization,
    DisableRightClick,
    PopupWindow,
    IframeRedirection,
    /// +1 when created more than 180 days ago; 0 without WHOIS
    AgeOfDomain,
    /// +1 when any of A/MX/NS resolves, -1 otherwise
    DnsRecord,
    /// Count of `<a>` elements
    LinksPointingToPage,
    /// -1 when the URL contains a host from public abuse reports
    StatisticalReport,
    /// Length of the domain label
    DomainLength,
    /// Shannon entropy of the domain label
    Entropy,
    /// Characters in the domain label outside `[A-Za-z0-9.-]`
    SpecialChars,
    /// -1 for cheap TLDs popular with phishing kits
    SuspiciousTld,
}

impl FeatureName {
    /// All features in schema order
    pub const ALL: [FeatureName; FEATURE_DIMENSION] = [
        FeatureName::UsingIp,
        FeatureName::UrlLength,
        FeatureName::ShortenedUrl,
        FeatureName::AtSymbol,
        FeatureName::DoubleSlashRedirect,
        FeatureName::PrefixSuffix,
        FeatureName::SubDomains,
        FeatureName::Https,
        FeatureName::DomainRegistrationLength,
        FeatureName::Favicon,
        FeatureName::NonStandardPort,
        FeatureName::HttpsDomain,
        FeatureName::RequestUrl,
        FeatureName::AnchorUrl,
        FeatureName::LinksInScripts,
        FeatureName::ServerFormHandler,
        FeatureName::InfoEmail,
        FeatureName::AbnormalUrl,
        FeatureName::WebsiteForwarding,
        FeatureName::StatusBarCustomization,
        FeatureName::DisableRightClick,
        FeatureName::PopupWindow,
        FeatureName::IframeRedirection,
        FeatureName::AgeOfDomain,
        FeatureName::DnsRecord,
        FeatureName::LinksPointingToPage,
        FeatureName::StatisticalReport,
        FeatureName::DomainLength,
        FeatureName::Entropy,
        FeatureName::SpecialChars,
        FeatureName::SuspiciousTld,
    ];

    /// Column name used in tables, parameters and models
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureName::UsingIp => "using_ip",
            FeatureName::UrlLength => "url_length",
            FeatureName::ShortenedUrl => "shortened_url",
            FeatureName::AtSymbol => "at_symbol",
            FeatureName::DoubleSlashRedirect => "double_slash_redirect",
            FeatureName::PrefixSuffix => "prefix_suffix",
            FeatureName::SubDomains => "sub_domains",
            FeatureName::Https => "https",
            FeatureName::DomainRegistrationLength => "domain_registration_length",
            FeatureName::Favicon => "favicon",
            FeatureName::NonStandardPort => "non_standard_port",
            FeatureName::HttpsDomain => "https_domain",
            FeatureName::RequestUrl => "request_url",
            FeatureName::AnchorUrl => "anchor_url",
            FeatureName::LinksInScripts => "links_in_scripts",
            FeatureName::ServerFormHandler => "server_form_handler",
            FeatureName::InfoEmail => "info_email",
            FeatureName::AbnormalUrl => "abnormal_url",
            FeatureName::WebsiteForwarding => "website_forwarding",
            FeatureName::StatusBarCustomization => "status_bar_customization",
            FeatureName::DisableRightClick => "disable_right_click",
            FeatureName::PopupWindow => "popup_window",
            FeatureName::IframeRedirection => "iframe_redirection",
            FeatureName::AgeOfDomain => "age_of_domain",
            FeatureName::DnsRecord => "dns_record",
            FeatureName::LinksPointingToPage => "links_pointing_to_page",
            FeatureName::StatisticalReport => "statistical_report",
            FeatureName::DomainLength => "domain_length",
            FeatureName::Entropy => "entropy",
            FeatureName::SpecialChars => "special_chars",
            FeatureName::SuspiciousTld => "suspicious_tld",
        }
    }

    /// Declared value domain
    pub fn domain(&self) -> ValueDomain {
        match self {
            FeatureName::LinksPointingToPage
            | FeatureName::DomainLength
            | FeatureName::SpecialChars => ValueDomain::Count,
            FeatureName::Entropy => ValueDomain::NonNegative,
            _ => ValueDomain::TriState,
        }
    }

    /// Whether the feature is a tri-state signal
    pub fn is_tristate(&self) -> bool {
        self.domain() == ValueDomain::TriState
    }

    /// Value used when the whole row falls back
    pub fn default_value(&self) -> f64 {
        0.0
    }

    /// Schema column names in order
    pub fn column_names() -> Vec<String> {
        Self::ALL.iter().map(|f| f.as_str().to_string()).collect()
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("unknown feature '{}'", s))
    }
}
