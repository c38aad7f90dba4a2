use crate::config::types::{Ao3Config, Config, CrawlerConfig, ResolvedSite, UserAgentConfig};
use crate::site::SiteKind;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;

    for kind in [SiteKind::SufficientVelocity, SiteKind::QuestionableQuesting] {
        let resolved = config.site(kind).resolve(kind)?;
        validate_site(kind, &resolved)?;
    }

    validate_ao3_config(&config.ao3)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout must be >= 1 second".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect-timeout must be >= 1 second".to_string(),
        ));
    }

    if config.output_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output-dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;
    }

    Ok(())
}

/// Validates a resolved site section
fn validate_site(kind: SiteKind, site: &ResolvedSite) -> Result<(), ConfigError> {
    validate_http_url(&site.profile.base_url, &format!("{} base-url", kind))?;

    if !site.profile.url_pattern.contains("{}") {
        return Err(ConfigError::Validation(format!(
            "{} url-pattern must contain '{{}}', got '{}'",
            kind, site.profile.url_pattern
        )));
    }

    if site.pages.is_empty() {
        return Err(ConfigError::Validation(format!(
            "{} must have at least one index page",
            kind
        )));
    }

    for page in &site.pages {
        if page.start.is_empty() || page.end.is_empty() {
            return Err(ConfigError::Validation(format!(
                "{} index page '{}' needs non-empty start and end markers",
                kind, page.path
            )));
        }
    }

    Ok(())
}

/// Validates the AO3 delegation settings
fn validate_ao3_config(config: &Ao3Config) -> Result<(), ConfigError> {
    if config.python.is_empty() {
        return Err(ConfigError::Validation(
            "ao3 python cannot be empty".to_string(),
        ));
    }

    validate_http_url(&config.tag_url, "ao3 tag-url")
}

/// Checks that a URL parses and uses HTTP(S)
fn validate_http_url(raw: &str, what: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", what, raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use HTTP(S)",
            what, raw
        )));
    }

    Ok(())
}
