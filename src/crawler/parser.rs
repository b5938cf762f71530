//! HTML parser for discovering referenced resources
//!
//! This module scans a fixed set of tag/attribute pairs that carry navigable
//! or embedded references. Script-built URLs and CSS `url()` references are
//! not discovered.

use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// Tag/attribute pairs scanned for references
pub const LINK_ATTRIBUTES: &[(&str, &str)] = &[
    ("a", "href"),
    ("img", "src"),
    ("script", "src"),
    ("link", "href"),
    ("iframe", "src"),
    ("frame", "src"),
    ("form", "action"),
];

/// Schemes that never lead to a fetchable resource
const SKIPPED_SCHEMES: &[&str] = &["mailto:", "javascript:", "tel:", "data:"];

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Absolute candidate URLs, sorted and de-duplicated
    pub links: Vec<String>,
}

/// Parses HTML content and extracts the title and every candidate link
///
/// # Link Extraction Rules
///
/// **Include:** the attribute values listed in [`LINK_ATTRIBUTES`]
///
/// **Exclude:**
/// - Empty values
/// - `mailto:`, `javascript:`, `tel:` and `data:` references
/// - Fragment-only references (same page anchors)
/// - Anything that does not resolve to an http(s) URL
///
/// # Example
///
/// ```
/// use footbag_mirror::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Events</title></head>
///     <body><a href="show/12">Worlds</a><img src="/img/logo.gif"></body></html>"#;
/// let base_url = Url::parse("http://www.footbag.org/events/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, Some("Events".to_string()));
/// assert_eq!(
///     parsed.links,
///     vec![
///         "http://www.footbag.org/events/show/12".to_string(),
///         "http://www.footbag.org/img/logo.gif".to_string(),
///     ]
/// );
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        links: extract_links(&document, base_url),
    }
}

/// Returns the sorted, de-duplicated absolute URLs referenced by `html`
///
/// Identical HTML and base URL always produce identical output.
pub fn discover_links(html: &str, base_url: &Url) -> Vec<String> {
    parse_html(html, base_url).links
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut links = BTreeSet::new();

    for (tag, attr) in LINK_ATTRIBUTES {
        let Ok(selector) = Selector::parse(&format!("{}[{}]", tag, attr)) else {
            continue;
        };

        for element in document.select(&selector) {
            if let Some(value) = element.value().attr(attr) {
                if let Some(absolute) = resolve_link(value, base_url) {
                    links.insert(absolute);
                }
            }
        }
    }

    links.into_iter().collect()
}

/// Resolves a reference to an absolute URL
///
/// Returns None if the reference should be excluded.
fn resolve_link(value: &str, base_url: &Url) -> Option<String> {
    let value = value.trim();

    if value.is_empty() || value.starts_with('#') {
        return None;
    }

    let lowered = value.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme)) {
        return None;
    }

    match base_url.join(value) {
        Ok(absolute) if matches!(absolute.scheme(), "http" | "https") => {
            Some(absolute.to_string())
        }
        _ => None,
    }
}
