//! Threadmark page fetching
//!
//! One thread's word count is obtained by requesting its threadmark page until
//! the forum stops throttling, then handing the page text to the site profile.
//!
//! | Response | Action |
//! |----------|--------|
//! | HTTP 404 | Fail with `NotFound` (unlisted stories answer 404 when logged out) |
//! | HTTP 429 | Update the rate estimate, wait the site cooldown, retry |
//! | Error banner in text | Fail with `SiteError` |
//! | Anything else | Extract the word count |

use crate::crawler::fetcher::fetch_page;
use crate::crawler::rate::{RateLimitEstimator, ThrottleWindow};
use crate::crawler::Thread;
use crate::site::SiteProfile;
use crate::{CensusError, Result};
use reqwest::{Client, StatusCode};

/// How many throttled responses a single thread may absorb
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    /// `None` retries forever
    pub max_throttle_retries: Option<u32>,
}

impl RetryPolicy {
    /// Retry throttled requests forever
    pub fn unbounded() -> Self {
        Self {
            max_throttle_retries: None,
        }
    }

    /// Give up after `retries` throttled responses
    pub fn bounded(retries: u32) -> Self {
        Self {
            max_throttle_retries: Some(retries),
        }
    }

    fn exhausted(&self, retries: u32) -> bool {
        self.max_throttle_retries.is_some_and(|max| retries >= max)
    }
}

/// Fetches threadmark pages and extracts word counts
pub struct WordCountFetcher {
    client: Client,
    profile: SiteProfile,
    estimator: RateLimitEstimator,
    retry: RetryPolicy,
}

impl WordCountFetcher {
    /// Creates a fetcher for one site
    pub fn new(client: Client, profile: SiteProfile, window: ThrottleWindow, retry: RetryPolicy) -> Self {
        Self {
            client,
            profile,
            estimator: RateLimitEstimator::new(window),
            retry,
        }
    }

    /// The site profile in use
    pub fn profile(&self) -> &SiteProfile {
        &self.profile
    }

    /// The rate-limit estimator state
    pub fn estimator(&self) -> &RateLimitEstimator {
        &self.estimator
    }

    /// Gets the word count of a thread from its threadmark page
    ///
    /// # Arguments
    ///
    /// * `thread` - The thread to look up
    /// * `index` - 1-based position of the thread in the crawl
    /// * `max` - Number of threads in the crawl
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The word count text, or the not-found sentinel
    /// * `Err(CensusError)` - The page is missing, reports an error, or could
    ///   not be fetched
    pub async fn fetch(&mut self, thread: &Thread, index: usize, max: usize) -> Result<String> {
        let url = self.profile.stats_url(&thread.url);
        let mut throttled = 0u32;

        loop {
            let page = fetch_page(&self.client, &url).await?;

            if page.status == StatusCode::NOT_FOUND {
                return Err(CensusError::NotFound { url });
            }

            if page.status == StatusCode::TOO_MANY_REQUESTS {
                if self.retry.exhausted(throttled) {
                    return Err(CensusError::ThrottleLimit {
                        url,
                        retries: throttled,
                    });
                }
                throttled += 1;
                self.wait_out_throttle(index, max).await;
                continue;
            }

            let text = page.text();
            if let Some(excerpt) = self.profile.error_excerpt(&text) {
                return Err(CensusError::SiteError {
                    url,
                    status: page.status.as_u16(),
                    excerpt,
                });
            }

            self.estimator.on_success();
            return Ok(self.profile.extract_word_count(&text).into_word_count());
        }
    }

    async fn wait_out_throttle(&mut self, index: usize, max: usize) {
        if let Some(estimate) = self.estimator.on_throttle(index, max) {
            tracing::info!(
                "Rate limited! Rate: {:.2} req/s, ETA: {}",
                estimate.rate,
                estimate.eta_display()
            );
        }

        tracing::info!("(..{}/{}..)", index, max);
        tokio::time::sleep(self.profile.rate_limit_cooldown).await;
    }
}
