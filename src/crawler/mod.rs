//! Crawler module for index enumeration and word-count retrieval
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and HTML flattening
//! - Index page enumeration between named markers
//! - Threadmark page fetching with rate-limit handling
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod index;
mod parser;
mod rate;
mod word_count;

pub use coordinator::{Coordinator, CrawlReport, ThreadFailure};
pub use fetcher::{build_http_client, fetch_page, user_agent_string, FetchedPage};
pub use index::{collect_threads, enumerate_index, LinkFilter, DEFAULT_BOILERPLATE, DEFAULT_IGNORED_URLS};
pub use parser::{parse_html, Anchor, ParsedPage};
pub use rate::{format_hms, RateEstimate, RateLimitEstimator, RateLimitSample, ThrottleWindow, RATE_WINDOW};
pub use word_count::{RetryPolicy, WordCountFetcher};

/// Word count a thread keeps until one is retrieved
pub const DEFAULT_WORD_COUNT: &str = "-1";

/// A story thread found on an index page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thread {
    /// Thread title as shown on the index page
    pub name: String,

    /// Thread URL
    pub url: String,

    /// Word count text, a sentinel until retrieved
    pub word_count: String,
}

impl Thread {
    /// Creates a thread with the default word count
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            word_count: DEFAULT_WORD_COUNT.to_string(),
        }
    }

    /// Removes embedded newlines from the name and word count
    pub fn strip_newlines(&mut self) {
        self.name.retain(|c| c != '\n' && c != '\r');
        self.word_count.retain(|c| c != '\n' && c != '\r');
    }
}
