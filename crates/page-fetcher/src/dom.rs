//! HTML Reduction
//!
//! `scraper::Html` is not `Send`, so documents are parsed and reduced in one
//! synchronous step and only the owned summary crosses await points.

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

/// The parts of a document that content signals inspect
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDom {
    /// `src` of every `<img src>`
    pub image_sources: Vec<String>,
    /// `href` of every `<a href>`
    pub anchor_hrefs: Vec<String>,
    /// Count of all `<a>` elements, with or without `href`
    pub anchor_count: usize,
    /// `src` of every `<script src>`
    pub script_sources: Vec<String>,
    /// Text of inline scripts
    pub inline_scripts: Vec<String>,
    /// Count of `<link>` elements whose `rel` includes `icon`
    pub icon_links: usize,
    /// `action` of every `<form action>`
    pub form_actions: Vec<String>,
    /// Count of `<iframe>` elements
    pub iframe_count: usize,
}

impl PageDom {
    /// Parse an HTML body. Malformed markup is recovered by the parser.
    pub fn parse(body: &str) -> Self {
        let document = Html::parse_document(body);

        let inline_scripts = select(&document, "script")
            .into_iter()
            .filter(|el| el.value().attr("src").is_none())
            .map(|el| el.text().collect::<String>())
            .filter(|text| !text.trim().is_empty())
            .collect();

        let icon_links = select(&document, "link[rel]")
            .into_iter()
            .filter(|el| {
                el.value()
                    .attr("rel")
                    .map(|rel| {
                        rel.split_whitespace()
                            .any(|token| token.eq_ignore_ascii_case("icon"))
                    })
                    .unwrap_or(false)
            })
            .count();

        Self {
            image_sources: attr_values(&document, "img[src]", "src"),
            anchor_hrefs: attr_values(&document, "a[href]", "href"),
            anchor_count: select(&document, "a").len(),
            script_sources: attr_values(&document, "script[src]", "src"),
            inline_scripts,
            icon_links,
            form_actions: attr_values(&document, "form[action]", "action"),
            iframe_count: select(&document, "iframe").len(),
        }
    }
}

fn select<'a>(document: &'a Html, selector: &str) -> Vec<scraper::ElementRef<'a>> {
    match Selector::parse(selector) {
        Ok(sel) => document.select(&sel).collect(),
        Err(_) => Vec::new(),
    }
}

fn attr_values(document: &Html, selector: &str, attr: &str) -> Vec<String> {
    select(document, selector)
        .into_iter()
        .filter_map(|el| el.value().attr(attr).map(|v| v.trim().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"<!doctype html>
<html>
<head>
  <link rel="shortcut icon" href="/favicon.ico">
  <link rel="stylesheet" href="/site.css">
  <script src="https://cdn.example.net/lib.js"></script>
  <script>document.onmouseover = function() { window.status = 'x'; };</script>
</head>
<body>
  <img src="/logo.png"><img src="https://other.example/pixel.gif">
  <a href="/about">About</a>
  <a href="#">Top</a>
  <a name="anchor-only">no href</a>
  <form action="about:blank"><input name="pw"></form>
  <iframe src="https://evil.example/frame"></iframe>
</body>
</html>"##;

    #[test]
    fn test_parse_collects_references() {
        let dom = PageDom::parse(SAMPLE);

        assert_eq!(dom.image_sources.len(), 2);
        assert_eq!(dom.anchor_hrefs, vec!["/about".to_string(), "#".to_string()]);
        assert_eq!(dom.anchor_count, 3);
        assert_eq!(dom.script_sources, vec!["https://cdn.example.net/lib.js".to_string()]);
        assert_eq!(dom.inline_scripts.len(), 1);
        assert_eq!(dom.icon_links, 1);
        assert_eq!(dom.form_actions, vec!["about:blank".to_string()]);
        assert_eq!(dom.iframe_count, 1);
    }

    #[test]
    fn test_garbage_is_tolerated() {
        let dom = PageDom::parse("<<<not html at all </a></form>");
        assert!(dom.image_sources.is_empty());
        assert_eq!(dom.icon_links, 0);
    }
}
