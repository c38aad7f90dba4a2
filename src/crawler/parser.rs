//! HTML flattening for threadmark and index pages
//!
//! This module turns raw page HTML into the two views the crawler needs:
//! - The page's text content with newlines removed
//! - The ordered list of anchors (display text + href)

use scraper::{Html, Selector};

/// An `<a>` element found on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Concatenated text content of the anchor
    pub text: String,

    /// Raw `href` attribute, if present
    pub href: Option<String>,
}

impl Anchor {
    /// Creates an anchor with an href
    pub fn new(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: Some(href.into()),
        }
    }
}

/// Extracted views of an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// All text content, newlines removed
    pub text: String,

    /// Every anchor in document order
    pub anchors: Vec<Anchor>,
}

/// Parses HTML content and extracts its text and anchors
///
/// # Example
///
/// ```
/// use si_census::crawler::parse_html;
///
/// let html = r#"<html><body><p>Statistics (3 threadmarks, 9k words)</p><a href="https://example.com/t.1">Story</a></body></html>"#;
/// let parsed = parse_html(html);
/// assert!(parsed.text.contains("Statistics (3 threadmarks"));
/// assert_eq!(parsed.anchors[0].text, "Story");
/// ```
pub fn parse_html(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        text: flatten_text(&document),
        anchors: extract_anchors(&document),
    }
}

/// Returns the document's text content with all newlines removed
///
/// Newlines are dropped rather than replaced so the text can be embedded in a
/// single output line.
pub fn flatten_text(document: &Html) -> String {
    document
        .root_element()
        .text()
        .collect::<String>()
        .replace('\n', "")
}

/// Extracts every anchor in document order
fn extract_anchors(document: &Html) -> Vec<Anchor> {
    let Ok(a_selector) = Selector::parse("a") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .map(|element| Anchor {
            text: element.text().collect::<String>(),
            href: element.value().attr("href").map(str::to_string),
        })
        .collect()
}
