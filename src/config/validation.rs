use crate::config::types::{
    BrowserConfig, Config, OutputConfig, RetryConfig, ScrapingConfig, TargetConfig,
};
use crate::ConfigError;
use url::Url;

/// Shortest timeout accepted for any single operation
const MIN_TIMEOUT_MS: u64 = 100;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_target_config(&config.target)?;
    validate_browser_config(&config.browser)?;
    validate_scraping_config(&config.scraping)?;
    validate_retry_config(&config.scraping.retry)?;
    validate_output_config(&config.output)?;

    if config.email.website_timeout_ms < MIN_TIMEOUT_MS {
        return Err(ConfigError::Validation(format!(
            "website_timeout_ms must be >= {}ms, got {}ms",
            MIN_TIMEOUT_MS, config.email.website_timeout_ms
        )));
    }

    Ok(())
}

/// Validates the directory target
fn validate_target_config(config: &TargetConfig) -> Result<(), ConfigError> {
    validate_http_url("base_url", &config.base_url)?;

    if let Some(start_url) = &config.start_url {
        validate_http_url("start_url", start_url)?;
    }

    if config.search_term.trim().is_empty() {
        return Err(ConfigError::Validation(
            "search_term cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates browser timeouts
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("navigation_timeout_ms", config.navigation_timeout_ms),
        ("selector_timeout_ms", config.selector_timeout_ms),
        ("consent_timeout_ms", config.consent_timeout_ms),
    ] {
        if value < MIN_TIMEOUT_MS {
            return Err(ConfigError::Validation(format!(
                "{} must be >= {}ms, got {}ms",
                name, MIN_TIMEOUT_MS, value
            )));
        }
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates traversal limits and pacing bounds
fn validate_scraping_config(config: &ScrapingConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.delay_min_ms > config.delay_max_ms {
        return Err(ConfigError::Validation(format!(
            "delay_min_ms ({}) must not exceed delay_max_ms ({})",
            config.delay_min_ms, config.delay_max_ms
        )));
    }

    if config.entries_per_page < 1 {
        return Err(ConfigError::Validation(format!(
            "entries_per_page must be >= 1, got {}",
            config.entries_per_page
        )));
    }

    if config.test_mode && config.test_record_limit < 1 {
        return Err(ConfigError::Validation(
            "test_record_limit must be >= 1 in test mode".to_string(),
        ));
    }

    Ok(())
}

/// Validates the backoff policy
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "retry max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.base_delay_ms > config.max_delay_ms {
        return Err(ConfigError::Validation(format!(
            "retry base_delay_ms ({}) must not exceed max_delay_ms ({})",
            config.base_delay_ms, config.max_delay_ms
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if !config.filename.ends_with(".csv") {
        return Err(ConfigError::Validation(format!(
            "filename must end with '.csv', got '{}'",
            config.filename
        )));
    }

    if config.filename.contains('/') || config.filename.contains('\\') {
        return Err(ConfigError::Validation(format!(
            "filename must not contain path separators, got '{}'",
            config.filename
        )));
    }

    Ok(())
}

/// Validates that a URL parses and uses http(s)
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' has no host",
            field, value
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_http_url() {
        assert!(validate_http_url("base_url", "https://www.11880.com").is_ok());
        assert!(validate_http_url("base_url", "http://127.0.0.1:8080").is_ok());

        assert!(validate_http_url("base_url", "").is_err());
        assert!(validate_http_url("base_url", "ftp://example.org").is_err());
        assert!(validate_http_url("base_url", "not a url").is_err());
    }

    #[test]
    fn test_rejects_zero_max_pages() {
        let mut config = Config::default();
        config.scraping.max_pages = 0;
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_rejects_inverted_delay_bounds() {
        let mut config = Config::default();
        config.scraping.delay_min_ms = 10;
        config.scraping.delay_max_ms = 5;
        assert!(validate(&config).is_err());

        config.scraping.delay_max_ms = 10;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_rejects_zero_attempts() {
        let mut config = Config::default();
        config.scraping.retry.max_attempts = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_tiny_timeouts() {
        let mut config = Config::default();
        config.browser.navigation_timeout_ms = 10;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_filename_rules() {
        let mut config = Config::default();
        config.output.filename = "results.txt".to_string();
        assert!(validate(&config).is_err());

        config.output.filename = "../escape.csv".to_string();
        assert!(validate(&config).is_err());

        config.output.filename = "run_{timestamp}.csv".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_rejects_blank_search_term() {
        let mut config = Config::default();
        config.target.search_term = "   ".to_string();
        assert!(validate(&config).is_err());
    }
}
