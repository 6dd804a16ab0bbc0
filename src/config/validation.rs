use crate::config::types::{Config, CrawlOptions, OutputConfig, ScoringConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_options(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_scoring_config(&config.scoring)?;
    Ok(())
}

/// Validates crawl options, from the config file or a run override
pub fn validate_crawl_options(options: &CrawlOptions) -> Result<(), ConfigError> {
    if options.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            options.max_pages
        )));
    }

    if options.concurrency < 1 || options.concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 100, got {}",
            options.concurrency
        )));
    }

    if options.crawl_delay_ms > 60_000 {
        return Err(ConfigError::Validation(format!(
            "crawl_delay_ms must be <= 60000ms, got {}ms",
            options.crawl_delay_ms
        )));
    }

    if options.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout must be >= 1s, got {}s",
            options.timeout_secs
        )));
    }

    if options.max_redirects > 20 {
        return Err(ConfigError::Validation(format!(
            "max_redirects must be <= 20, got {}",
            options.max_redirects
        )));
    }

    for prefix in options.allowed_paths.iter().chain(&options.blocked_paths) {
        if !prefix.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "path prefix '{}' must start with '/'",
                prefix
            )));
        }
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Crawler name is matched against robots.txt groups: alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if matches!(config.content_path.as_deref(), Some("")) {
        return Err(ConfigError::Validation(
            "content_path cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates scoring weights: all positive, summing to 100
fn validate_scoring_config(config: &ScoringConfig) -> Result<(), ConfigError> {
    let weights = [config.technical, config.onpage, config.local];

    if weights.iter().any(|w| !w.is_finite() || *w <= 0.0) {
        return Err(ConfigError::Validation(format!(
            "scoring weights must be positive, got {:?}",
            weights
        )));
    }

    let total: f64 = weights.iter().sum();
    if (total - 100.0).abs() > 1e-9 {
        return Err(ConfigError::Validation(format!(
            "scoring weights must sum to 100, got {}",
            total
        )));
    }

    Ok(())
}

/// Validates a seed URL for an audit run
///
/// Seeds must be absolute http(s) URLs with a host.
pub fn validate_seed_url(seed: &str) -> Result<(), ConfigError> {
    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Seed URL '{}' must use HTTP or HTTPS",
            seed
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' has no host",
            seed
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
