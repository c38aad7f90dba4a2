//! SI-Census: word counts for self-insert story archives
//!
//! This crate walks forum index threads that list self-insert stories, visits
//! each story's threadmark page, and extracts a word-count figure from it. The
//! results are written as `name|url|word_count` records.

pub mod config;
pub mod crawler;
pub mod output;
pub mod runs;
pub mod site;
pub mod storage;

use thiserror::Error;

/// Main error type for SI-Census operations
#[derive(Debug, Error)]
pub enum CensusError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Index page {url} returned HTTP {status}")]
    IndexStatus { url: String, status: u16 },

    #[error("Threadmark page not found (404): {url}")]
    NotFound { url: String },

    #[error("Some other error happened at {url}, code: {status}")]
    SiteError {
        url: String,
        status: u16,
        /// Page text surrounding the site's error marker
        excerpt: String,
    },

    #[error("Gave up on {url} after {retries} rate-limited retries")]
    ThrottleLimit { url: String, retries: u32 },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Cleanup refused: {0}")]
    Cleanup(String),

    #[error("Subprocess error: {0}")]
    Subprocess(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for SI-Census operations
pub type Result<T> = std::result::Result<T, CensusError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, Thread};
pub use site::{Extraction, SiteKind, SiteProfile};
