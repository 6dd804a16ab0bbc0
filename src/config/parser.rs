use crate::config::types::{Config, CrawlOptions, CrawlOverrides};
use crate::config::validation::{validate, validate_crawl_options};
use crate::ConfigError;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use seo_audit::config::load_config;
///
/// let config = load_config(Path::new("audit.toml")).unwrap();
/// println!("Max pages: {}", config.crawler.max_pages);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so runs can be matched to the configuration they used.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

impl CrawlOptions {
    /// Layers a run's config map over these options
    ///
    /// Keys that are absent keep the current value. The merged options are
    /// validated with the same rules as the `[crawler]` table.
    pub fn with_overrides(&self, run_config: &Map<String, Value>) -> Result<Self, ConfigError> {
        let overrides: CrawlOverrides = serde_json::from_value(Value::Object(run_config.clone()))?;

        let mut options = self.clone();
        if let Some(v) = overrides.max_pages {
            options.max_pages = v;
        }
        if let Some(v) = overrides.concurrency {
            options.concurrency = v;
        }
        if let Some(v) = overrides.crawl_delay_ms {
            options.crawl_delay_ms = v;
        }
        if let Some(v) = overrides.timeout {
            options.timeout_secs = v;
        }
        if let Some(v) = overrides.max_redirects {
            options.max_redirects = v;
        }
        if let Some(v) = overrides.store_html {
            options.store_html = v;
        }
        if let Some(v) = overrides.allowed_paths {
            options.allowed_paths = v;
        }
        if let Some(v) = overrides.blocked_paths {
            options.blocked_paths = v;
        }

        validate_crawl_options(&options)?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID_CONFIG: &str = r#"
[crawler]
max-pages = 50
concurrency = 2
crawl-delay-ms = 500
blocked-paths = ["/admin"]

[user-agent]
crawler-name = "TestAuditor"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"

[output]
database-path = "./test.db"
"#;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_load_valid_config() {
        let file = create_temp_config(VALID_CONFIG);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.max_pages, 50);
        assert_eq!(config.crawler.concurrency, 2);
        assert_eq!(config.crawler.blocked_paths, vec!["/admin".to_string()]);
        // Unspecified keys keep their defaults
        assert_eq!(config.crawler.max_redirects, 10);
        assert!(config.crawler.store_html);
        assert_eq!(config.user_agent.crawler_name, "TestAuditor");
        assert_eq!(config.output.content_path, None);
        assert_eq!(config.scoring.technical, 40.0);
    }

    #[test]
    fn test_missing_crawler_table_uses_defaults() {
        let config = parse_config(
            r#"
[user-agent]
crawler-name = "TestAuditor"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"

[output]
database-path = "./test.db"
content-path = "./content"
"#,
        )
        .unwrap();

        assert_eq!(config.crawler, CrawlOptions::default());
        assert_eq!(config.output.content_path.as_deref(), Some("./content"));
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/audit.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let content = VALID_CONFIG.replace("concurrency = 2", "concurrency = 0");
        let result = parse_config(&content);
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_scoring_weights_must_sum_to_100() {
        let content = format!("{}\n[scoring]\ntechnical = 50\n", VALID_CONFIG);
        let result = parse_config(&content);
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_overrides_snake_and_camel_case() {
        let defaults = CrawlOptions::default();

        let snake = defaults
            .with_overrides(&object(json!({"max_pages": 1, "store_html": false})))
            .unwrap();
        assert_eq!(snake.max_pages, 1);
        assert!(!snake.store_html);

        let camel = defaults
            .with_overrides(&object(json!({"maxPages": 7, "crawlDelayMs": 0, "allowedPaths": ["/blog"]})))
            .unwrap();
        assert_eq!(camel.max_pages, 7);
        assert_eq!(camel.crawl_delay_ms, 0);
        assert_eq!(camel.allowed_paths, vec!["/blog".to_string()]);
        assert_eq!(camel.concurrency, 4);
    }

    #[test]
    fn test_overrides_ignore_unknown_keys() {
        let options = CrawlOptions::default()
            .with_overrides(&object(json!({"report_format": "pdf", "timeout": 5})))
            .unwrap();
        assert_eq!(options.timeout_secs, 5);
    }

    #[test]
    fn test_overrides_reject_wrong_types() {
        let result = CrawlOptions::default().with_overrides(&object(json!({"max_pages": "lots"})));
        assert!(matches!(result, Err(ConfigError::InvalidOptions(_))));
    }

    #[test]
    fn test_overrides_are_validated() {
        let result = CrawlOptions::default().with_overrides(&object(json!({"concurrency": 0})));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}
