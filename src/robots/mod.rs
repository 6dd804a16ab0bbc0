//! Robots.txt handling module
//!
//! Fetches, parses, and caches robots.txt files per host. Missing or
//! unreachable robots.txt files never block a crawl.

mod cache;
mod parser;

pub use cache::{CachedRobots, RobotsCache};
pub use parser::RobotsRules;

use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Timeout for a single robots.txt request
const ROBOTS_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches and parses robots.txt for an origin (`scheme://host[:port]`)
///
/// Any response other than 200, and any transport error, yields
/// [`RobotsRules::allow_all`].
pub async fn fetch_robots(client: &Client, origin: &str, agent_token: &str) -> RobotsRules {
    let robots_url = format!("{}/robots.txt", origin);

    let response = match client.get(&robots_url).timeout(ROBOTS_TIMEOUT).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Failed to fetch {}: {}; allowing all", robots_url, e);
            return RobotsRules::allow_all();
        }
    };

    if response.status() != StatusCode::OK {
        tracing::debug!(
            "robots.txt at {} returned {}; allowing all",
            robots_url,
            response.status()
        );
        return RobotsRules::allow_all();
    }

    match response.text().await {
        Ok(body) => {
            let rules = RobotsRules::from_content(&body, agent_token);
            tracing::debug!(
                "Loaded robots.txt for {} ({} disallow rules, {} sitemaps)",
                origin,
                rules.disallow().len(),
                rules.sitemaps().len()
            );
            rules
        }
        Err(e) => {
            tracing::warn!("Failed to read {}: {}; allowing all", robots_url, e);
            RobotsRules::allow_all()
        }
    }
}
