//! Index page enumeration
//!
//! Archive threads list their stories as plain links inside long posts, mixed
//! with navigation chrome and footer links. Enumeration walks the anchors in
//! document order and keeps the ones between a named first story and a named
//! last story.

use crate::crawler::fetcher::fetch_page;
use crate::crawler::parser::Anchor;
use crate::crawler::Thread;
use crate::output::SEPARATOR;
use crate::{CensusError, Result};
use reqwest::Client;

/// Links that look like threads but never are
pub const DEFAULT_IGNORED_URLS: &[&str] = &["/threads/rules-terms-of-service"];

/// Anchor text fragments from housekeeping posts and error banners
pub const DEFAULT_BOILERPLATE: &[&str] = &["Sufficiently Velocity", "into a problem"];

/// Decides whether an index page anchor is a story link
#[derive(Debug, Clone)]
pub struct LinkFilter {
    /// Hrefs containing any of these are rejected
    pub ignored_urls: Vec<String>,

    /// Anchor texts containing any of these are rejected
    pub boilerplate: Vec<String>,
}

impl Default for LinkFilter {
    fn default() -> Self {
        Self {
            ignored_urls: DEFAULT_IGNORED_URLS.iter().map(|s| s.to_string()).collect(),
            boilerplate: DEFAULT_BOILERPLATE.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl LinkFilter {
    /// Checks if a link found on an index page is useful
    ///
    /// A link is rejected if:
    /// - its href or text is missing or blank
    /// - its href does not start with `http`
    /// - its href matches the ignore list
    /// - its text contains a boilerplate phrase
    pub fn is_useful(&self, href: Option<&str>, text: &str) -> bool {
        let Some(href) = href.map(str::trim) else {
            return false;
        };
        let text = text.trim();

        if href.is_empty() || text.is_empty() {
            return false;
        }

        if !href.starts_with("http") {
            return false;
        }

        if self.ignored_urls.iter().any(|ignored| href.contains(ignored.as_str())) {
            return false;
        }

        !self.boilerplate.iter().any(|phrase| text.contains(phrase.as_str()))
    }
}

/// Collects the threads between two named anchors
///
/// Collection starts after the anchor whose text equals `start` (that anchor
/// is not collected) and stops after collecting the anchor whose text equals
/// `end`. The separator character is removed from thread names.
pub fn collect_threads(anchors: &[Anchor], start: &str, end: &str, filter: &LinkFilter) -> Vec<Thread> {
    let mut threads = Vec::new();
    let mut active = false;
    let mut reached_end = false;

    for anchor in anchors {
        if anchor.text == start {
            active = true;
            continue;
        }

        if !active {
            continue;
        }

        let name = anchor.text.replace(SEPARATOR, "");
        if !filter.is_useful(anchor.href.as_deref(), &name) {
            tracing::trace!("Skipping link '{}'", name);
            continue;
        }

        let Some(href) = anchor.href.as_deref() else {
            continue;
        };

        let is_end = name == end;
        threads.push(Thread::new(name, href.trim()));

        if is_end {
            reached_end = true;
            break;
        }
    }

    if !active {
        tracing::warn!("Start marker '{}' not found on index page", start);
    } else if !reached_end {
        tracing::warn!("End marker '{}' not found, collected to end of page", end);
    }

    threads
}

/// Fetches an index page and enumerates its threads
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The index page URL
/// * `start` - Text of the anchor just before the first thread to collect
/// * `end` - Text of the last thread to collect
/// * `filter` - Link usefulness filter
/// * `carry_forward` - Threads from earlier pages; new threads are appended
///
/// # Returns
///
/// * `Ok(Vec<Thread>)` - `carry_forward` followed by this page's threads
/// * `Err(CensusError)` - The page could not be fetched
pub async fn enumerate_index(
    client: &Client,
    url: &str,
    start: &str,
    end: &str,
    filter: &LinkFilter,
    carry_forward: Vec<Thread>,
) -> Result<Vec<Thread>> {
    tracing::info!("Parse {}", url);

    let page = fetch_page(client, url).await?;
    if !page.status.is_success() {
        return Err(CensusError::IndexStatus {
            url: url.to_string(),
            status: page.status.as_u16(),
        });
    }

    if page.url != url {
        tracing::debug!("{} redirected to {}", url, page.url);
    }

    let found = collect_threads(&page.anchors(), start, end, filter);
    tracing::debug!("Collected {} threads from {}", found.len(), page.url);

    let mut threads = carry_forward;
    threads.extend(found);
    Ok(threads)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(threads: &[Thread]) -> Vec<&str> {
        threads.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_collect_between_markers() {
        let anchors = vec![
            Anchor::new("skip-me", "x"),
            Anchor::new("Start", "http://a"),
            Anchor::new("Keep", "http://b"),
            Anchor::new("End", "http://c"),
            Anchor::new("ignored", "http://d"),
        ];

        let threads = collect_threads(&anchors, "Start", "End", &LinkFilter::default());
        assert_eq!(
            threads,
            vec![Thread::new("Keep", "http://b"), Thread::new("End", "http://c")]
        );
    }

    #[test]
    fn test_collect_excludes_non_http_and_ignored() {
        let anchors = vec![
            Anchor::new("Start", "http://a"),
            Anchor::new("Relative", "/threads/relative.1"),
            Anchor::new("Rules", "https://forum.example/threads/rules-terms-of-service"),
            Anchor::new("Mail", "mailto:someone@example.com"),
            Anchor::new("Story", "https://forum.example/threads/story.2"),
            Anchor::new("End", "https://forum.example/threads/end.3"),
        ];

        let threads = collect_threads(&anchors, "Start", "End", &LinkFilter::default());
        assert_eq!(names(&threads), vec!["Story", "End"]);
    }

    #[test]
    fn test_collect_strips_separator() {
        let anchors = vec![
            Anchor::new("Start", "http://a"),
            Anchor::new("Either | Or (Worm SI)", "http://b"),
            Anchor::new("End", "http://c"),
        ];

        let threads = collect_threads(&anchors, "Start", "End", &LinkFilter::default());
        assert_eq!(threads[0].name, "Either  Or (Worm SI)");
    }

    #[test]
    fn test_collect_end_marker_matches_stripped_text() {
        let anchors = vec![
            Anchor::new("Start", "http://a"),
            Anchor::new("The|End", "http://b"),
            Anchor::new("After", "http://c"),
        ];

        let threads = collect_threads(&anchors, "Start", "TheEnd", &LinkFilter::default());
        assert_eq!(names(&threads), vec!["TheEnd"]);
    }

    #[test]
    fn test_collect_without_start_is_empty() {
        let anchors = vec![Anchor::new("Keep", "http://b"), Anchor::new("End", "http://c")];
        let threads = collect_threads(&anchors, "Start", "End", &LinkFilter::default());
        assert!(threads.is_empty());
    }

    #[test]
    fn test_collect_without_end_runs_to_page_end() {
        let anchors = vec![
            Anchor::new("Start", "http://a"),
            Anchor::new("One", "http://b"),
            Anchor::new("Two", "http://c"),
        ];
        let threads = collect_threads(&anchors, "Start", "End", &LinkFilter::default());
        assert_eq!(names(&threads), vec!["One", "Two"]);
    }

    #[test]
    fn test_filter_rejects_missing_or_blank() {
        let filter = LinkFilter::default();
        assert!(!filter.is_useful(None, "Story"));
        assert!(!filter.is_useful(Some(""), "Story"));
        assert!(!filter.is_useful(Some("https://example.com/t.1"), ""));
        assert!(!filter.is_useful(Some("https://example.com/t.1"), "   "));
    }

    #[test]
    fn test_filter_rejects_boilerplate() {
        let filter = LinkFilter::default();
        assert!(!filter.is_useful(
            Some("https://example.com/t.1"),
            "Welcome to Sufficiently Velocity's archive"
        ));
        assert!(!filter.is_useful(
            Some("https://example.com/t.1"),
            "Oops! We ran into a problem"
        ));
        assert!(filter.is_useful(Some(" https://example.com/t.1 "), "A Story (Naruto SI)"));
    }

    #[test]
    fn test_filter_custom_lists() {
        let filter = LinkFilter {
            ignored_urls: vec!["/members/".to_string()],
            boilerplate: vec![],
        };
        assert!(!filter.is_useful(Some("https://example.com/members/bob.1"), "bob"));
        assert!(filter.is_useful(Some("https://example.com/threads/x.1"), "Sufficiently Velocity"));
    }
}
