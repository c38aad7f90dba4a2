//! Configuration module for SI-Census
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A missing configuration file is not an error: [`Config::default`] carries the
//! archive threads and markers the crawler was built for.
//!
//! # Example
//!
//! ```no_run
//! use si_census::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("census.toml")).unwrap();
//! println!("Writing output to {}", config.crawler.output_dir.display());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    default_pages, Ao3Config, Config, CrawlerConfig, FilterConfig, IndexPageConfig, ResolvedSite,
    SiteConfig, UserAgentConfig, DEFAULT_AO3_TAG_URL,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
