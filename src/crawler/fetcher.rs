//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building HTTP clients with a proper user agent string
//! - GET requests returning the status code and body, whatever the status
//!
//! Status interpretation (404, 429, error banners) is left to the caller.

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::crawler::parser::{parse_html, Anchor, ParsedPage};
use crate::{CensusError, Result};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// A fetched page, successful or not
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,

    /// HTTP status code
    pub status: StatusCode,

    /// Page body content
    pub body: String,
}

impl FetchedPage {
    /// Parses the body into text and anchors
    pub fn parse(&self) -> ParsedPage {
        parse_html(&self.body)
    }

    /// Returns the page text with newlines removed
    pub fn text(&self) -> String {
        self.parse().text
    }

    /// Returns the page's anchors in document order
    pub fn anchors(&self) -> Vec<Anchor> {
        self.parse().anchors
    }
}

/// Formats the user agent string: `Name/Version (+ContactURL)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    match &config.contact_url {
        Some(contact) => format!(
            "{}/{} (+{})",
            config.crawler_name, config.crawler_version, contact
        ),
        None => format!("{}/{}", config.crawler_name, config.crawler_version),
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use si_census::config::{CrawlerConfig, UserAgentConfig};
/// use si_census::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(user_agent))
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(crawler.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns its status and body
///
/// Only transport failures (connection refused, timeout, body decoding) are
/// errors; every HTTP status is returned to the caller.
pub async fn fetch_page(client: &Client, url: &str) -> Result<FetchedPage> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| http_error(url, source))?;

    let status = response.status();
    let final_url = response.url().to_string();
    tracing::trace!("GET {} -> {}", url, status);

    let body = response
        .text()
        .await
        .map_err(|source| http_error(url, source))?;

    Ok(FetchedPage {
        url: final_url,
        status,
        body,
    })
}

fn http_error(url: &str, source: reqwest::Error) -> CensusError {
    if source.is_timeout() {
        tracing::debug!("Request timeout for {}", url);
    } else if source.is_connect() {
        tracing::debug!("Connection refused for {}", url);
    }

    CensusError::Http {
        url: url.to_string(),
        source,
    }
}
