//! Signal Functions
//!
//! Every signal is a total function of a [`SignalContext`]. Page-derived
//! signals are 0 when no parsed document is available.

use crate::address::{DomainParts, ParsedUrl};
use crate::schema::FeatureName;
use crate::statistics::{matching_ratio, DomainStatistics};
use chrono::NaiveDate;
use lookup_client::LookupResult;
use once_cell::sync::Lazy;
use page_fetcher::{FetchedPage, PageDom};
use regex::Regex;
use std::net::Ipv4Addr;
use url::Url;

/// Keywords common in credential-harvesting paths
const PHISHING_KEYWORDS: &[&str] = &[
    "login", "verify", "secure", "account", "banking", "confirm", "password", "pay",
];

/// TLDs with cheap or free registration
const SUSPICIOUS_TLDS: &[&str] = &[
    "tk", "ml", "ga", "cf", "gq", "xyz", "work", "party", "date", "wang", "faith",
];

/// URL shortening services
const SHORTENING_SERVICES: &[&str] = &[
    "bit.ly", "goo.gl", "shorte.st", "go2l.ink", "x.co", "ow.ly", "t.co", "tinyurl.com",
    "tr.im", "is.gd", "cli.gs", "yfrog.com", "migre.me", "ff.im", "tiny.cc", "url4.eu",
    "twit.ac", "su.pr", "twurl.nl", "snipurl.com", "short.to", "budurl.com", "ping.fm",
];

/// Hosts that dominate public phishing reports
const REPORTED_PATTERNS: &[&str] = &[
    "at.ua", "usa.cc", "baltazarpresentes.com.br", "pe.hu", "esy.es", "hol.es",
    "sweddy.com", "myjino.ru", "96.lt", "ow.ly",
];

/// URL length thresholds (chars)
const SHORT_URL_MAX: usize = 53;
const MEDIUM_URL_MAX: usize = 75;

/// Days of registration considered long-lived
const LONG_REGISTRATION_DAYS: i64 = 365;

/// Days since creation considered established
const ESTABLISHED_AGE_DAYS: i64 = 180;

/// Share of foreign references above which a page is suspicious
const FOREIGN_RATIO_THRESHOLD: f64 = 0.5;

static STATUS_BAR: Lazy<Regex> =
    Lazy::new(|| Regex::new("onmouseover|onclick").expect("valid status bar pattern"));
static RIGHT_CLICK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"event.button ?== ?2").expect("valid right click pattern"));
static POPUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"alert\(|confirm\(|prompt\(").expect("valid popup pattern"));

/// Everything a signal may read for one URL
#[derive(Debug, Clone, Copy)]
pub struct SignalContext<'a> {
    /// Trimmed input URL
    pub raw: &'a str,
    pub url: &'a ParsedUrl,
    pub parts: &'a DomainParts,
    pub lookup: &'a LookupResult,
    pub page: Option<&'a FetchedPage>,
    /// Reference date for domain age
    pub today: NaiveDate,
}

impl<'a> SignalContext<'a> {
    fn dom(&self) -> Option<&'a PageDom> {
        self.page.and_then(|p| p.dom.as_ref())
    }

    fn base_url(&self) -> Option<Url> {
        self.page
            .and_then(|p| Url::parse(&p.final_url).ok())
            .or_else(|| Url::parse(&self.url.fetch_url).ok())
    }

    /// Host belongs to the requested site: the request host itself, or any
    /// host under its registrable domain (apex, `www`, `cdn`, ...)
    fn is_same_site(&self, host: &str) -> bool {
        if host == self.url.host {
            return true;
        }
        let site = self.parts.registrable();
        !site.is_empty()
            && (host == site
                || host
                    .strip_suffix(site.as_str())
                    .is_some_and(|rest| rest.ends_with('.')))
    }

    /// Resolved host is neither on the requested site nor the page's final host
    fn is_cross_host(&self, base: Option<&Url>, reference: &str) -> bool {
        let resolved = match base {
            Some(base) => base.join(reference.trim()),
            None => Url::parse(reference.trim()),
        };
        let Ok(url) = resolved else {
            return true;
        };
        match url.host_str() {
            Some(host) => {
                !(self.is_same_site(host) || base.and_then(Url::host_str) == Some(host))
            }
            None => true,
        }
    }

    fn is_unsafe_anchor(&self, base: Option<&Url>, href: &str) -> bool {
        let href = href.trim().to_ascii_lowercase();
        href.starts_with('#')
            || href.starts_with("javascript:")
            || href.starts_with("mailto:")
            || self.is_cross_host(base, &href)
    }
}

/// Evaluate one signal
pub fn evaluate(name: FeatureName, ctx: &SignalContext<'_>) -> f64 {
    match name {
        FeatureName::UsingIp => flag(ctx.url.host.parse::<Ipv4Addr>().is_ok()),
        FeatureName::UrlLength => url_length(ctx.raw),
        FeatureName::ShortenedUrl => flag(is_shortener(&ctx.url.host)),
        FeatureName::AtSymbol => flag(ctx.raw.contains('@')),
        FeatureName::DoubleSlashRedirect => {
            flag(ctx.raw.rfind("//").map(|i| i > 7).unwrap_or(false))
        }
        FeatureName::PrefixSuffix => flag(ctx.url.host.contains('-')),
        FeatureName::SubDomains => match ctx.url.host.matches('.').count() {
            1 => 1.0,
            2 => 0.0,
            _ => -1.0,
        },
        FeatureName::Https => flag(ctx.url.scheme != "https"),
        FeatureName::DomainRegistrationLength => {
            match (ctx.lookup.creation_date(), ctx.lookup.expiration_date()) {
                (Some(created), Some(expires)) => {
                    flag((expires - created).num_days() <= LONG_REGISTRATION_DAYS)
                }
                _ => 0.0,
            }
        }
        FeatureName::Favicon => on_page(ctx, |dom| flag(dom.icon_links == 0)),
        FeatureName::NonStandardPort => {
            flag(matches!(ctx.url.port, Some(port) if port != 80 && port != 443))
        }
        FeatureName::HttpsDomain => flag(ctx.parts.domain.to_ascii_lowercase().contains("http")),
        FeatureName::RequestUrl => on_page(ctx, |dom| {
            let base = ctx.base_url();
            foreign_share(matching_ratio(&dom.image_sources, |src| {
                ctx.is_cross_host(base.as_ref(), src)
            }))
        }),
        FeatureName::AnchorUrl => on_page(ctx, |dom| {
            let base = ctx.base_url();
            foreign_share(matching_ratio(&dom.anchor_hrefs, |href| {
                ctx.is_unsafe_anchor(base.as_ref(), href)
            }))
        }),
        FeatureName::LinksInScripts => on_page(ctx, |dom| {
            let base = ctx.base_url();
            foreign_share(matching_ratio(&dom.script_sources, |src| {
                ctx.is_cross_host(base.as_ref(), src)
            }))
        }),
        FeatureName::ServerFormHandler => on_page(ctx, |dom| {
            flag(dom.form_actions.iter().any(|action| {
                let action = action.trim();
                action.is_empty() || action.to_ascii_lowercase().contains("about:blank")
            }))
        }),
        FeatureName::InfoEmail => {
            let lower = ctx.raw.to_ascii_lowercase();
            flag(lower.contains("mailto:") || lower.contains("mail("))
        }
        FeatureName::AbnormalUrl => {
            let lower = ctx.raw.to_ascii_lowercase();
            flag(PHISHING_KEYWORDS.iter().any(|k| lower.contains(k)))
        }
        FeatureName::WebsiteForwarding => match ctx.page {
            Some(page) => match page.redirect_count {
                0 | 1 => 1.0,
                2 => 0.0,
                _ => -1.0,
            },
            None => 0.0,
        },
        FeatureName::StatusBarCustomization => on_page(ctx, |dom| script_matches(dom, &STATUS_BAR)),
        FeatureName::DisableRightClick => on_page(ctx, |dom| script_matches(dom, &RIGHT_CLICK)),
        FeatureName::PopupWindow => on_page(ctx, |dom| script_matches(dom, &POPUP)),
        FeatureName::IframeRedirection => on_page(ctx, |dom| flag(dom.iframe_count > 0)),
        FeatureName::AgeOfDomain => match ctx.lookup.creation_date() {
            Some(created) => flag((ctx.today - created).num_days() <= ESTABLISHED_AGE_DAYS),
            None => 0.0,
        },
        FeatureName::DnsRecord => flag(!ctx.lookup.dns_present),
        FeatureName::LinksPointingToPage => on_page(ctx, |dom| dom.anchor_count as f64),
        FeatureName::StatisticalReport => {
            let lower = ctx.raw.to_ascii_lowercase();
            flag(REPORTED_PATTERNS.iter().any(|p| lower.contains(p)))
        }
        FeatureName::DomainLength => DomainStatistics::compute(&ctx.parts.domain).length as f64,
        FeatureName::Entropy => DomainStatistics::compute(&ctx.parts.domain).entropy,
        FeatureName::SpecialChars => {
            DomainStatistics::compute(&ctx.parts.domain).special_chars as f64
        }
        FeatureName::SuspiciousTld => {
            let suffix = ctx.parts.suffix.to_ascii_lowercase();
            flag(SUSPICIOUS_TLDS.contains(&suffix.as_str()))
        }
    }
}

/// -1 when suspicious, +1 otherwise
fn flag(suspicious: bool) -> f64 {
    if suspicious {
        -1.0
    } else {
        1.0
    }
}

fn on_page(ctx: &SignalContext<'_>, signal: impl FnOnce(&PageDom) -> f64) -> f64 {
    ctx.dom().map(signal).unwrap_or(0.0)
}

fn url_length(raw: &str) -> f64 {
    match raw.chars().count() {
        n if n <= SHORT_URL_MAX => 1.0,
        n if n <= MEDIUM_URL_MAX => 0.0,
        _ => -1.0,
    }
}

fn is_shortener(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    SHORTENING_SERVICES.iter().any(|service| {
        host == *service
            || host
                .strip_suffix(service)
                .map(|rest| rest.ends_with('.'))
                .unwrap_or(false)
    })
}

/// No references is +1, a foreign majority is -1, otherwise 0
fn foreign_share(ratio: Option<f64>) -> f64 {
    match ratio {
        None => 1.0,
        Some(r) if r > FOREIGN_RATIO_THRESHOLD => -1.0,
        Some(_) => 0.0,
    }
}

fn script_matches(dom: &PageDom, pattern: &Regex) -> f64 {
    flag(dom.inline_scripts.iter().any(|s| pattern.is_match(s)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::DomainSplitter;
    use lookup_client::WhoisRecord;

    struct Fixture {
        raw: String,
        url: ParsedUrl,
        parts: DomainParts,
        lookup: LookupResult,
        page: Option<FetchedPage>,
    }

    impl Fixture {
        fn new(raw: &str) -> Self {
            let url = ParsedUrl::parse(raw);
            let parts = DomainSplitter::new().split(&url);
            Self {
                raw: raw.trim().to_string(),
                url,
                parts,
                lookup: LookupResult::absent(),
                page: None,
            }
        }

        fn with_dom(mut self, dom: PageDom) -> Self {
            self.page = Some(FetchedPage {
                status: 200,
                redirect_count: 0,
                final_url: self.url.fetch_url.clone(),
                dom: Some(dom),
            });
            self
        }

        fn eval(&self, name: FeatureName) -> f64 {
            let ctx = SignalContext {
                raw: &self.raw,
                url: &self.url,
                parts: &self.parts,
                lookup: &self.lookup,
                page: self.page.as_ref(),
                today: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            };
            evaluate(name, &ctx)
        }
    }

    fn url_of_len(n: usize) -> String {
        let prefix = "http://a.com/";
        format!("{}{}", prefix, "x".repeat(n - prefix.len()))
    }

    #[test]
    fn test_url_length_boundaries() {
        assert_eq!(Fixture::new(&url_of_len(53)).eval(FeatureName::UrlLength), 1.0);
        assert_eq!(Fixture::new(&url_of_len(54)).eval(FeatureName::UrlLength), 0.0);
        assert_eq!(Fixture::new(&url_of_len(75)).eval(FeatureName::UrlLength), 0.0);
        assert_eq!(Fixture::new(&url_of_len(76)).eval(FeatureName::UrlLength), -1.0);
    }

    #[test]
    fn test_ip_login_url() {
        let f = Fixture::new("http://192.168.1.1/login");
        assert_eq!(f.eval(FeatureName::UsingIp), -1.0);
        assert_eq!(f.eval(FeatureName::AbnormalUrl), -1.0);
        assert_eq!(f.eval(FeatureName::SuspiciousTld), 1.0);
    }

    #[test]
    fn test_lexical_signals() {
        let f = Fixture::new("https://secure-paypal.example.tk:8080/a//b@c");
        assert_eq!(f.eval(FeatureName::UsingIp), 1.0);
        assert_eq!(f.eval(FeatureName::AtSymbol), -1.0);
        assert_eq!(f.eval(FeatureName::DoubleSlashRedirect), -1.0);
        assert_eq!(f.eval(FeatureName::PrefixSuffix), -1.0);
        assert_eq!(f.eval(FeatureName::SubDomains), 0.0);
        assert_eq!(f.eval(FeatureName::Https), 1.0);
        assert_eq!(f.eval(FeatureName::NonStandardPort), -1.0);
        assert_eq!(f.eval(FeatureName::SuspiciousTld), -1.0);

        let plain = Fixture::new("http://example.com");
        assert_eq!(plain.eval(FeatureName::DoubleSlashRedirect), 1.0);
        assert_eq!(plain.eval(FeatureName::SubDomains), 1.0);
        assert_eq!(plain.eval(FeatureName::Https), -1.0);
        assert_eq!(plain.eval(FeatureName::NonStandardPort), 1.0);
        assert_eq!(plain.eval(FeatureName::InfoEmail), 1.0);
        assert_eq!(plain.eval(FeatureName::DomainLength), 7.0);
    }

    #[test]
    fn test_shortener_matches_host_only() {
        assert_eq!(Fixture::new("http://bit.ly/abc").eval(FeatureName::ShortenedUrl), -1.0);
        assert_eq!(Fixture::new("http://www.bit.ly/abc").eval(FeatureName::ShortenedUrl), -1.0);
        assert_eq!(Fixture::new("http://habit.ly/abc").eval(FeatureName::ShortenedUrl), 1.0);
        assert_eq!(Fixture::new("http://rabbit.com/t.co").eval(FeatureName::ShortenedUrl), 1.0);
    }

    #[test]
    fn test_http_token_in_domain() {
        assert_eq!(
            Fixture::new("http://https-secure.com").eval(FeatureName::HttpsDomain),
            -1.0
        );
    }

    #[test]
    fn test_mail_and_reports() {
        let f = Fixture::new("http://example.com/?to=mailto:x@y.z");
        assert_eq!(f.eval(FeatureName::InfoEmail), -1.0);

        let f = Fixture::new("http://foo.esy.es/index");
        assert_eq!(f.eval(FeatureName::StatisticalReport), -1.0);
    }

    #[test]
    fn test_lookup_absent_defaults() {
        let f = Fixture::new("http://example.com");
        assert_eq!(f.eval(FeatureName::DomainRegistrationLength), 0.0);
        assert_eq!(f.eval(FeatureName::AgeOfDomain), 0.0);
        assert_eq!(f.eval(FeatureName::DnsRecord), -1.0);
    }

    #[test]
    fn test_lookup_present() {
        let mut f = Fixture::new("http://example.com");
        f.lookup = LookupResult {
            dns_present: true,
            whois: Some(WhoisRecord {
                creation_date: NaiveDate::from_ymd_opt(2024, 3, 1),
                expiration_date: NaiveDate::from_ymd_opt(2025, 3, 1),
            }),
        };
        assert_eq!(f.eval(FeatureName::DnsRecord), 1.0);
        assert_eq!(f.eval(FeatureName::DomainRegistrationLength), -1.0);
        assert_eq!(f.eval(FeatureName::AgeOfDomain), -1.0);

        f.lookup.whois = Some(WhoisRecord {
            creation_date: NaiveDate::from_ymd_opt(1999, 1, 1),
            expiration_date: NaiveDate::from_ymd_opt(2030, 1, 1),
        });
        assert_eq!(f.eval(FeatureName::DomainRegistrationLength), 1.0);
        assert_eq!(f.eval(FeatureName::AgeOfDomain), 1.0);
    }

    #[test]
    fn test_page_absent_is_neutral() {
        let f = Fixture::new("http://example.com");
        for name in [
            FeatureName::Favicon,
            FeatureName::RequestUrl,
            FeatureName::AnchorUrl,
            FeatureName::LinksInScripts,
            FeatureName::ServerFormHandler,
            FeatureName::WebsiteForwarding,
            FeatureName::PopupWindow,
            FeatureName::IframeRedirection,
            FeatureName::LinksPointingToPage,
        ] {
            assert_eq!(f.eval(name), 0.0, "{}", name);
        }
    }

    #[test]
    fn test_empty_page_is_clean() {
        let f = Fixture::new("http://example.com").with_dom(PageDom::default());
        assert_eq!(f.eval(FeatureName::Favicon), -1.0);
        assert_eq!(f.eval(FeatureName::RequestUrl), 1.0);
        assert_eq!(f.eval(FeatureName::AnchorUrl), 1.0);
        assert_eq!(f.eval(FeatureName::LinksInScripts), 1.0);
        assert_eq!(f.eval(FeatureName::ServerFormHandler), 1.0);
        assert_eq!(f.eval(FeatureName::WebsiteForwarding), 1.0);
        assert_eq!(f.eval(FeatureName::IframeRedirection), 1.0);
        assert_eq!(f.eval(FeatureName::LinksPointingToPage), 0.0);
    }

    #[test]
    fn test_cross_host_references() {
        let dom = PageDom {
            image_sources: vec![
                "/logo.png".into(),
                "https://cdn.other.net/a.png".into(),
                "https://cdn.other.net/b.png".into(),
            ],
            anchor_hrefs: vec!["/about".into(), "/contact".into(), "#".into()],
            anchor_count: 4,
            script_sources: vec!["/app.js".into(), "https://other.net/x.js".into()],
            ..PageDom::default()
        };
        let f = Fixture::new("http://example.com/").with_dom(dom);

        assert_eq!(f.eval(FeatureName::RequestUrl), -1.0);
        assert_eq!(f.eval(FeatureName::AnchorUrl), 0.0);
        assert_eq!(f.eval(FeatureName::LinksInScripts), 0.0);
        assert_eq!(f.eval(FeatureName::LinksPointingToPage), 4.0);
    }

    #[test]
    fn test_redirect_to_www_keeps_references_internal() {
        let dom = PageDom {
            image_sources: vec!["/a.png".into(), "/b.png".into()],
            anchor_hrefs: vec!["/about".into(), "/contact".into()],
            anchor_count: 2,
            script_sources: vec!["/app.js".into()],
            ..PageDom::default()
        };
        let mut f = Fixture::new("http://example.com/").with_dom(dom);
        if let Some(page) = f.page.as_mut() {
            page.final_url = "https://www.example.com/".to_string();
            page.redirect_count = 1;
        }

        // references present but none foreign: neutral, never suspicious
        assert_eq!(f.eval(FeatureName::RequestUrl), 0.0);
        assert_eq!(f.eval(FeatureName::LinksInScripts), 0.0);
        assert_eq!(f.eval(FeatureName::AnchorUrl), 0.0);
        assert_eq!(f.eval(FeatureName::WebsiteForwarding), 1.0);
    }

    #[test]
    fn test_sibling_subdomains_are_same_site() {
        let dom = PageDom {
            image_sources: vec![
                "https://cdn.example.com/a.png".into(),
                "https://static.example.com/b.png".into(),
                "https://notexample.com/c.png".into(),
            ],
            ..PageDom::default()
        };
        let f = Fixture::new("https://www.example.com/").with_dom(dom);

        // one foreign image out of three stays under the threshold
        assert_eq!(f.eval(FeatureName::RequestUrl), 0.0);
    }

    #[test]
    fn test_unsafe_anchors() {
        let dom = PageDom {
            anchor_hrefs: vec!["#".into(), "javascript:void(0)".into(), "/ok".into()],
            anchor_count: 3,
            ..PageDom::default()
        };
        let f = Fixture::new("http://example.com/").with_dom(dom);
        assert_eq!(f.eval(FeatureName::AnchorUrl), -1.0);
    }

    #[test]
    fn test_script_and_form_signals() {
        let dom = PageDom {
            inline_scripts: vec![
                "if (event.button == 2) { alert('no'); }".into(),
                "el.onmouseover = hide;".into(),
            ],
            form_actions: vec!["about:blank".into()],
            iframe_count: 2,
            icon_links: 1,
            ..PageDom::default()
        };
        let f = Fixture::new("http://example.com/").with_dom(dom);

        assert_eq!(f.eval(FeatureName::DisableRightClick), -1.0);
        assert_eq!(f.eval(FeatureName::PopupWindow), -1.0);
        assert_eq!(f.eval(FeatureName::StatusBarCustomization), -1.0);
        assert_eq!(f.eval(FeatureName::ServerFormHandler), -1.0);
        assert_eq!(f.eval(FeatureName::IframeRedirection), -1.0);
        assert_eq!(f.eval(FeatureName::Favicon), 1.0);
    }

    #[test]
    fn test_website_forwarding_levels() {
        let mut f = Fixture::new("http://example.com/").with_dom(PageDom::default());
        for (redirects, expected) in [(1, 1.0), (2, 0.0), (3, -1.0)] {
            if let Some(page) = f.page.as_mut() {
                page.redirect_count = redirects;
            }
            assert_eq!(f.eval(FeatureName::WebsiteForwarding), expected);
        }
    }
}
