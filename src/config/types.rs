use crate::analyzer::Category;
use serde::{Deserialize, Serialize};

/// Main configuration structure for the audit tool
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Crawl defaults applied to every run
    #[serde(default)]
    pub crawler: CrawlOptions,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

/// Options controlling a single crawl
///
/// Loaded from the `[crawler]` table and overridden per run by the run's
/// config map (see [`CrawlOptions::with_overrides`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlOptions {
    /// Maximum number of pages persisted for one run
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Number of URLs fetched in parallel per batch
    pub concurrency: u32,

    /// Minimum time between two batches (milliseconds)
    #[serde(rename = "crawl-delay-ms")]
    pub crawl_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Maximum redirects followed for one request
    #[serde(rename = "max-redirects")]
    pub max_redirects: u32,

    /// Whether HTML bodies are written to content storage
    #[serde(rename = "store-html")]
    pub store_html: bool,

    /// Path prefixes the crawl is restricted to (empty = everything)
    #[serde(rename = "allowed-paths")]
    pub allowed_paths: Vec<String>,

    /// Path prefixes that are never fetched
    #[serde(rename = "blocked-paths")]
    pub blocked_paths: Vec<String>,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_pages: 200,
            concurrency: 4,
            crawl_delay_ms: 1000,
            timeout_secs: 30,
            max_redirects: 10,
            store_html: true,
            allowed_paths: Vec::new(),
            blocked_paths: Vec::new(),
        }
    }
}

/// Per-run overrides read from an audit run's config map
///
/// Keys follow the run API (`max_pages` or `maxPages`); unknown keys are
/// ignored so the map can carry unrelated settings.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct CrawlOverrides {
    #[serde(alias = "maxPages")]
    pub max_pages: Option<u32>,
    pub concurrency: Option<u32>,
    #[serde(alias = "crawlDelayMs")]
    pub crawl_delay_ms: Option<u64>,
    #[serde(alias = "timeout_secs")]
    pub timeout: Option<u64>,
    #[serde(alias = "maxRedirects")]
    pub max_redirects: Option<u32>,
    #[serde(alias = "storeHtml")]
    pub store_html: Option<bool>,
    #[serde(alias = "allowedPaths")]
    pub allowed_paths: Option<Vec<String>>,
    #[serde(alias = "blockedPaths")]
    pub blocked_paths: Option<Vec<String>>,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler, also the token matched in robots.txt groups
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Full `User-Agent` header value
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Directory for stored page bodies; content storage is off when absent
    #[serde(rename = "content-path", default)]
    pub content_path: Option<String>,
}

/// Category weights used by the scorer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub technical: f64,
    pub onpage: f64,
    pub local: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            technical: 40.0,
            onpage: 35.0,
            local: 25.0,
        }
    }
}

impl ScoringConfig {
    /// Weight of one category
    pub fn weight(&self, category: Category) -> f64 {
        match category {
            Category::Technical => self.technical,
            Category::OnPage => self.onpage,
            Category::Local => self.local,
        }
    }

    /// Sum of all category weights
    pub fn total(&self) -> f64 {
        self.technical + self.onpage + self.local
    }
}
