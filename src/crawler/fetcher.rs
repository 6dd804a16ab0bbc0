//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - robots.txt and path-rule gating (`should_crawl`)
//! - GET requests with redirect following and timeouts
//! - Header, canonical and robots-directive extraction
//! - Optional hand-off of HTML bodies to a content store
//!
//! A `Fetcher` owns its robots.txt cache, so one fetcher per crawl keeps the
//! cache scoped to that run.

use crate::config::{CrawlOptions, UserAgentConfig};
use crate::crawler::parser::{parse_html, split_directives};
use crate::crawler::resource::{FetchedResource, BLOCKED_MESSAGE};
use crate::robots::{fetch_robots, RobotsCache, RobotsRules};
use crate::storage::ContentStore;
use crate::url::{matches_any_prefix, normalize_url, origin_of};
use crate::AuditError;
use reqwest::{redirect::Policy, Client};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Content type assumed when a response carries none
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Builds an HTTP client with proper configuration
///
/// The user agent has the form `Name/Version (+ContactURL; ContactEmail)`.
/// Redirects are followed up to `options.max_redirects` hops.
///
/// # Example
///
/// ```no_run
/// use seo_audit::config::{CrawlOptions, UserAgentConfig};
/// use seo_audit::crawler::build_http_client;
///
/// let user_agent = UserAgentConfig {
///     crawler_name: "SeoAudit".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/audit-bot".to_string(),
///     contact_email: "audit@example.com".to_string(),
/// };
///
/// let client = build_http_client(&user_agent, &CrawlOptions::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    options: &CrawlOptions,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(options.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(options.max_redirects as usize))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches single URLs on behalf of one crawl
pub struct Fetcher {
    client: Client,
    agent_token: String,
    robots: RobotsCache,
    content_store: Option<Arc<dyn ContentStore>>,
}

impl Fetcher {
    /// Creates a fetcher with an empty robots.txt cache
    pub fn new(
        user_agent: &UserAgentConfig,
        options: &CrawlOptions,
        content_store: Option<Arc<dyn ContentStore>>,
    ) -> Result<Self, AuditError> {
        Ok(Self {
            client: build_http_client(user_agent, options)?,
            agent_token: user_agent.crawler_name.clone(),
            robots: RobotsCache::new(),
            content_store,
        })
    }

    /// The token matched against robots.txt `User-agent` lines
    pub fn agent_token(&self) -> &str {
        &self.agent_token
    }

    pub fn robots_cache(&self) -> &RobotsCache {
        &self.robots
    }

    /// Returns the robots.txt rules for the URL's origin, fetching on first use
    ///
    /// Returns `None` when the URL has no host.
    pub async fn robots_for(&self, url: &Url) -> Option<Arc<RobotsRules>> {
        let origin = origin_of(url)?;

        if let Some(rules) = self.robots.get(&origin) {
            return Some(rules);
        }

        let rules = fetch_robots(&self.client, &origin, &self.agent_token).await;
        Some(self.robots.insert(&origin, rules))
    }

    /// Decides whether a URL may be fetched
    ///
    /// Fails closed on unparseable URLs. Otherwise consults robots.txt, then
    /// the allow-list (when non-empty, some prefix must match) and the
    /// deny-list (any match blocks).
    pub async fn should_crawl(&self, url: &str, options: &CrawlOptions) -> bool {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Refusing unparseable URL {}: {}", url, e);
                return false;
            }
        };

        let Some(robots) = self.robots_for(&parsed).await else {
            tracing::warn!("Refusing URL without host: {}", url);
            return false;
        };

        if !robots.is_allowed(parsed.as_str(), &self.agent_token) {
            tracing::debug!("Disallowed by robots.txt: {}", url);
            return false;
        }

        let path = parsed.path();
        if !options.allowed_paths.is_empty() && !matches_any_prefix(path, &options.allowed_paths) {
            tracing::debug!("Not in allowed paths: {}", url);
            return false;
        }
        if matches_any_prefix(path, &options.blocked_paths) {
            tracing::debug!("In blocked paths: {}", url);
            return false;
        }

        true
    }

    /// Fetches a URL; never fails
    ///
    /// Refused URLs come back as 403 resources and transport failures as
    /// status 0, both with `error` set.
    pub async fn fetch(&self, url: &str, options: &CrawlOptions) -> FetchedResource {
        let normalized = match normalize_url(url) {
            Ok(normalized) => normalized,
            Err(e) => {
                tracing::warn!("Cannot fetch {}: {}", url, e);
                return FetchedResource::blocked(url, format!("Invalid URL: {}", e));
            }
        };
        let url = normalized.as_str();

        if !self.should_crawl(url, options).await {
            tracing::info!("Blocked {}", url);
            return FetchedResource::blocked(url, BLOCKED_MESSAGE);
        }

        let started = Instant::now();
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                let elapsed = started.elapsed().as_secs_f64();
                tracing::warn!("Failed to fetch {}: {}", url, describe_error(&e));
                return FetchedResource::failed(url, e.to_string(), elapsed);
            }
        };

        let status_code = response.status().as_u16();
        let headers = normalize_headers(response.headers());
        let content_type = headers
            .get("content-type")
            .cloned()
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        let body = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                let elapsed = started.elapsed().as_secs_f64();
                tracing::warn!("Failed to read body of {}: {}", url, e);
                return FetchedResource::failed(url, e.to_string(), elapsed);
            }
        };
        let response_time = started.elapsed().as_secs_f64();

        tracing::info!(
            "Fetched {} ({} {}, {} bytes, {:.3}s)",
            url,
            status_code,
            content_type,
            body.len(),
            response_time
        );

        let mut resource = FetchedResource {
            url: url.to_string(),
            status_code,
            content_type,
            content_length: body.len() as u64,
            body,
            response_time,
            robots_directives: headers
                .get("x-robots-tag")
                .map(|value| split_directives(value))
                .unwrap_or_default(),
            headers,
            ..Default::default()
        };

        if resource.is_html() {
            let parsed = parse_html(&resource.text(), &normalized);
            resource.canonical_url = parsed.canonical_url.clone();
            resource
                .robots_directives
                .extend(parsed.meta_robots.iter().cloned());
            resource.parsed = Some(parsed);
        }

        if let Some(robots) = origin_of(&normalized).and_then(|origin| self.robots.get(&origin)) {
            resource.sitemaps = robots.sitemaps().to_vec();
        }

        if options.store_html && resource.is_html() {
            resource.content_ref = self.store_body(&resource).await;
        }

        resource
    }

    /// Hands the body to the content store on the blocking pool
    async fn store_body(&self, resource: &FetchedResource) -> Option<String> {
        let store = Arc::clone(self.content_store.as_ref()?);
        let url = resource.url.clone();
        let body = resource.body.clone();

        match tokio::task::spawn_blocking(move || store.store(&url, &body)).await {
            Ok(Ok(reference)) => Some(reference),
            Ok(Err(e)) => {
                tracing::warn!("Failed to store content for {}: {}", resource.url, e);
                None
            }
            Err(e) => {
                tracing::warn!("Content store task for {} did not finish: {}", resource.url, e);
                None
            }
        }
    }
}

/// Lower-cases header names; the first value of a repeated header wins
fn normalize_headers(headers: &reqwest::header::HeaderMap) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            map.entry(name.as_str().to_lowercase())
                .or_insert_with(|| value.to_string());
        }
    }
    map
}

fn describe_error(error: &reqwest::Error) -> &'static str {
    if error.is_timeout() {
        "request timeout"
    } else if error.is_connect() {
        "connection failed"
    } else if error.is_redirect() {
        "too many redirects"
    } else {
        "request error"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue};

    fn create_test_config() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&create_test_config(), &CrawlOptions::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_fetcher_uses_crawler_name_as_token() {
        let fetcher = Fetcher::new(&create_test_config(), &CrawlOptions::default(), None).unwrap();
        assert_eq!(fetcher.agent_token(), "TestCrawler");
        assert!(fetcher.robots_cache().is_empty());
    }

    #[tokio::test]
    async fn test_should_crawl_fails_closed_on_bad_url() {
        let fetcher = Fetcher::new(&create_test_config(), &CrawlOptions::default(), None).unwrap();
        assert!(!fetcher.should_crawl("not a url", &CrawlOptions::default()).await);
    }

    #[tokio::test]
    async fn test_fetch_invalid_url_is_blocked() {
        let fetcher = Fetcher::new(&create_test_config(), &CrawlOptions::default(), None).unwrap();
        let resource = fetcher.fetch("ftp://example.com/file", &CrawlOptions::default()).await;
        assert_eq!(resource.status_code, 403);
        assert!(resource
            .error
            .as_deref()
            .is_some_and(|e| e.starts_with("Invalid URL")));
    }

    #[test]
    fn test_normalize_headers_first_value_wins() {
        let mut headers = HeaderMap::new();
        headers.append("Set-Cookie", HeaderValue::from_static("a=1"));
        headers.append("Set-Cookie", HeaderValue::from_static("b=2"));
        headers.insert("Content-Type", HeaderValue::from_static("text/html"));

        let map = normalize_headers(&headers);
        assert_eq!(map.get("set-cookie").map(String::as_str), Some("a=1"));
        assert_eq!(map.get("content-type").map(String::as_str), Some("text/html"));
    }
}
