use crate::crawler::{LinkFilter, ThrottleWindow, DEFAULT_BOILERPLATE, DEFAULT_IGNORED_URLS};
use crate::site::{ExtractionRule, SiteKind, SiteProfile};
use crate::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// AO3 tag search sorted by word count, without the page number
pub const DEFAULT_AO3_TAG_URL: &str = "https://archiveofourown.org/tags/Self-Insert/works?commit=Sort+and+Filter&page=1&work_search%5Bcomplete%5D=&work_search%5Bcrossover%5D=&work_search%5Bdate_from%5D=&work_search%5Bdate_to%5D=&work_search%5Bexcluded_tag_names%5D=&work_search%5Blanguage_id%5D=&work_search%5Bother_tag_names%5D=&work_search%5Bquery%5D=&work_search%5Bsort_column%5D=word_count&work_search%5Bwords_from%5D=&work_search%5Bwords_to%5D=";

/// Main configuration structure for SI-Census
///
/// Every section is optional; missing sections fall back to the built-in
/// archive threads and markers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default, rename = "sufficient-velocity")]
    pub sufficient_velocity: SiteConfig,
    #[serde(default, rename = "questionable-questing")]
    pub questionable_questing: SiteConfig,
    #[serde(default)]
    pub ao3: Ao3Config,
}

impl Config {
    /// Returns the configuration section for a site
    pub fn site(&self, kind: SiteKind) -> &SiteConfig {
        match kind {
            SiteKind::SufficientVelocity => &self.sufficient_velocity,
            SiteKind::QuestionableQuesting => &self.questionable_questing,
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Directory output files and snapshots are written to
    #[serde(rename = "output-dir", default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Give up on a thread after this many HTTP 429 responses (unset: never)
    #[serde(rename = "max-throttle-retries", default)]
    pub max_throttle_retries: Option<u32>,

    /// Whether a successful response resets the throttle sample window
    #[serde(rename = "throttle-window", default)]
    pub throttle_window: ThrottleWindow,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            max_throttle_retries: None,
            throttle_window: ThrottleWindow::default(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
        }
    }
}

fn default_crawler_name() -> String {
    "SI-Census".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Index page link filter lists
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// Hrefs containing any of these are never threads
    #[serde(rename = "ignored-urls", default = "default_ignored_urls")]
    pub ignored_urls: Vec<String>,

    /// Anchor text containing any of these is never a thread title
    #[serde(default = "default_boilerplate")]
    pub boilerplate: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            ignored_urls: default_ignored_urls(),
            boilerplate: default_boilerplate(),
        }
    }
}

impl FilterConfig {
    /// Builds the link filter used during enumeration
    pub fn to_link_filter(&self) -> LinkFilter {
        LinkFilter {
            ignored_urls: self.ignored_urls.clone(),
            boilerplate: self.boilerplate.clone(),
        }
    }
}

fn default_ignored_urls() -> Vec<String> {
    DEFAULT_IGNORED_URLS.iter().map(|s| s.to_string()).collect()
}

fn default_boilerplate() -> Vec<String> {
    DEFAULT_BOILERPLATE.iter().map(|s| s.to_string()).collect()
}

/// One index page of an archive thread
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IndexPageConfig {
    /// Suffix appended to the site's base URL (e.g. `/page-2`)
    #[serde(default)]
    pub path: String,

    /// Text of the anchor right before the first story to collect
    pub start: String,

    /// Text of the last story to collect
    pub end: String,
}

impl IndexPageConfig {
    fn new(path: &str, start: &str, end: &str) -> Self {
        Self {
            path: path.to_string(),
            start: start.to_string(),
            end: end.to_string(),
        }
    }
}

/// Per-site overrides; unset fields use the built-in profile
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteConfig {
    /// Archive thread URL
    #[serde(rename = "base-url", default)]
    pub base_url: Option<String>,

    /// Threadmark page template, `{}` is the thread URL
    #[serde(rename = "url-pattern", default)]
    pub url_pattern: Option<String>,

    /// Text marking an error page
    #[serde(rename = "error-text", default)]
    pub error_text: Option<String>,

    /// Wait after HTTP 429 (seconds)
    #[serde(rename = "cooldown", default)]
    pub cooldown_secs: Option<u64>,

    /// Word count start marker
    #[serde(rename = "start-marker", default)]
    pub start_marker: Option<String>,

    /// Word count end marker (marker-bounded sites)
    #[serde(rename = "end-marker", default)]
    pub end_marker: Option<String>,

    /// Threadmark summary pattern (pattern-bounded sites)
    #[serde(default)]
    pub pattern: Option<String>,

    /// Whether to write a snapshot database alongside the output
    #[serde(default)]
    pub snapshot: Option<bool>,

    /// Index pages to enumerate, in order
    #[serde(default)]
    pub pages: Option<Vec<IndexPageConfig>>,
}

/// A site configuration with all defaults applied
#[derive(Debug, Clone)]
pub struct ResolvedSite {
    pub profile: SiteProfile,
    pub pages: Vec<IndexPageConfig>,
    pub snapshot: bool,
}

impl ResolvedSite {
    /// Absolute URL of an index page
    pub fn page_url(&self, page: &IndexPageConfig) -> String {
        format!("{}{}", self.profile.base_url, page.path)
    }
}

impl SiteConfig {
    /// Applies these overrides on top of the built-in profile for `kind`
    pub fn resolve(&self, kind: SiteKind) -> Result<ResolvedSite, ConfigError> {
        let mut profile = SiteProfile::builtin(kind);

        if let Some(base_url) = &self.base_url {
            profile.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(pattern) = &self.url_pattern {
            profile.url_pattern = pattern.clone();
        }
        if let Some(error_text) = &self.error_text {
            profile.error_text = error_text.clone();
        }
        if let Some(secs) = self.cooldown_secs {
            profile.rate_limit_cooldown = Duration::from_secs(secs);
        }

        profile.rule = match profile.rule {
            ExtractionRule::MarkerBounded { start, end } => ExtractionRule::MarkerBounded {
                start: self.start_marker.clone().unwrap_or(start),
                end: self.end_marker.clone().unwrap_or(end),
            },
            ExtractionRule::PatternBounded { start, pattern } => {
                let start = self.start_marker.clone().unwrap_or(start);
                match &self.pattern {
                    Some(custom) => ExtractionRule::pattern_bounded(start, custom).map_err(|e| {
                        ConfigError::Validation(format!("Invalid pattern for {}: {}", kind, e))
                    })?,
                    None => ExtractionRule::PatternBounded { start, pattern },
                }
            }
        };

        Ok(ResolvedSite {
            profile,
            pages: self.pages.clone().unwrap_or_else(|| default_pages(kind)),
            snapshot: self
                .snapshot
                .unwrap_or(kind == SiteKind::SufficientVelocity),
        })
    }
}

/// The index pages and story markers of the built-in archive threads
pub fn default_pages(kind: SiteKind) -> Vec<IndexPageConfig> {
    match kind {
        SiteKind::SufficientVelocity => vec![
            IndexPageConfig::new(
                "",
                "Go! Unashamed Reincarnation Protagonist Sakura! (Naruto SI)",
                "Come Hell or Helheim (Worm Duo-SI)",
            ),
            IndexPageConfig::new(
                "/page-2",
                "The Gardener's Tale (Star Wars SI)",
                "My Wish (Worm CYOA SI)",
            ),
        ],
        SiteKind::QuestionableQuesting => vec![IndexPageConfig::new(
            "",
            "Complete Detachment (Star Wars Prequel SI)",
            "Bruh...I'm Dead AF (DxD SI)",
        )],
    }
}

/// AO3 scraping is delegated to the AO3Scraper project
#[derive(Debug, Clone, Deserialize)]
pub struct Ao3Config {
    /// Python interpreter
    #[serde(default = "default_python")]
    pub python: String,

    /// Path to `ao3_work_ids.py`
    #[serde(default = "default_ao3_script")]
    pub script: PathBuf,

    /// Tag search URL
    #[serde(rename = "tag-url", default = "default_ao3_tag_url")]
    pub tag_url: String,
}

impl Default for Ao3Config {
    fn default() -> Self {
        Self {
            python: default_python(),
            script: default_ao3_script(),
            tag_url: default_ao3_tag_url(),
        }
    }
}

fn default_python() -> String {
    "python".to_string()
}

fn default_ao3_script() -> PathBuf {
    PathBuf::from("AO3Scraper/ao3_work_ids.py")
}

fn default_ao3_tag_url() -> String {
    DEFAULT_AO3_TAG_URL.to_string()
}
