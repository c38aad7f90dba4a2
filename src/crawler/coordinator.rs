//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinator drives a site crawl in two phases:
//! - Enumerating threads from one or more index pages
//! - Fetching each thread's word count in order, isolating failures
//!
//! Everything runs sequentially: one request at a time, in index order.

use crate::config::Config;
use crate::crawler::fetcher::build_http_client;
use crate::crawler::index::{enumerate_index, LinkFilter};
use crate::crawler::rate::ThrottleWindow;
use crate::crawler::word_count::{RetryPolicy, WordCountFetcher};
use crate::crawler::Thread;
use crate::site::SiteProfile;
use crate::{CensusError, Result};
use reqwest::Client;

/// A thread whose word count could not be retrieved
#[derive(Debug, Clone)]
pub struct ThreadFailure {
    /// The thread URL
    pub url: String,

    /// Error message
    pub message: String,
}

/// Outcome of a word-count pass
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Number of threads processed
    pub total: usize,

    /// Threads whose word count was set
    pub succeeded: usize,

    /// Threads left at their default word count
    pub failures: Vec<ThreadFailure>,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    client: Client,
    filter: LinkFilter,
    fetcher: WordCountFetcher,
}

impl Coordinator {
    /// Creates a coordinator from its parts
    pub fn new(
        client: Client,
        profile: SiteProfile,
        filter: LinkFilter,
        window: ThrottleWindow,
        retry: RetryPolicy,
    ) -> Self {
        let fetcher = WordCountFetcher::new(client.clone(), profile, window, retry);
        Self {
            client,
            filter,
            fetcher,
        }
    }

    /// Creates a coordinator for a site using the crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(CensusError)` - The HTTP client could not be built
    pub fn from_config(config: &Config, profile: SiteProfile) -> Result<Self> {
        let client = build_http_client(&config.user_agent, &config.crawler)?;
        let retry = RetryPolicy {
            max_throttle_retries: config.crawler.max_throttle_retries,
        };

        Ok(Self::new(
            client,
            profile,
            config.filter.to_link_filter(),
            config.crawler.throttle_window,
            retry,
        ))
    }

    /// The site profile in use
    pub fn profile(&self) -> &SiteProfile {
        self.fetcher.profile()
    }

    /// Enumerates the threads on one index page
    ///
    /// New threads are appended after `carry_forward`. Errors propagate; a
    /// page is either enumerated completely or not at all.
    pub async fn enumerate(
        &self,
        url: &str,
        start: &str,
        end: &str,
        carry_forward: Vec<Thread>,
    ) -> Result<Vec<Thread>> {
        enumerate_index(&self.client, url, start, end, &self.filter, carry_forward).await
    }

    /// Retrieves the word count of every thread
    ///
    /// A failure on one thread is logged and the crawl moves on; that thread
    /// keeps its current word count.
    pub async fn retrieve_word_counts(&mut self, threads: &mut [Thread]) -> CrawlReport {
        let total = threads.len();
        let mut report = CrawlReport {
            total,
            ..CrawlReport::default()
        };

        for (i, thread) in threads.iter_mut().enumerate() {
            match self.fetcher.fetch(thread, i + 1, total).await {
                Ok(word_count) => {
                    thread.word_count = word_count;
                    report.succeeded += 1;
                }
                Err(e) => {
                    tracing::error!("Error with '{}': '{}'", thread.url, e);
                    if let CensusError::SiteError { excerpt, .. } = &e {
                        tracing::debug!("Error page text: {}", excerpt);
                    }
                    report.failures.push(ThreadFailure {
                        url: thread.url.clone(),
                        message: e.to_string(),
                    });
                }
            }

            thread.strip_newlines();
            tracing::info!("{}: {}", thread.name, thread.word_count);
        }

        tracing::info!(
            "Word counts retrieved: {} of {} ({} failed)",
            report.succeeded,
            report.total,
            report.failures.len()
        );

        report
    }
}
