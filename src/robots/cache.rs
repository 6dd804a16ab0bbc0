//! Per-host robots.txt cache
//!
//! One cache lives inside each [`Fetcher`](crate::crawler::Fetcher), so its
//! lifetime is a single crawl run. Entries also expire after 24 hours for
//! fetchers that are kept around longer.

use crate::robots::RobotsRules;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Cached robots.txt rules for one origin
#[derive(Debug, Clone)]
pub struct CachedRobots {
    /// The parsed rules
    pub rules: Arc<RobotsRules>,

    /// When the robots.txt was fetched
    pub fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    pub fn new(rules: RobotsRules) -> Self {
        Self {
            rules: Arc::new(rules),
            fetched_at: Utc::now(),
        }
    }

    /// Checks if the cached robots.txt is older than 24 hours
    pub fn is_stale(&self) -> bool {
        Utc::now() - self.fetched_at > Duration::hours(24)
    }
}

/// Keyed cache of robots rules, shared by concurrent fetches
///
/// Lookups take a read lock; first population of a host may happen twice
/// when two fetches race, which is harmless because both store equal rules.
#[derive(Debug, Default)]
pub struct RobotsCache {
    entries: RwLock<HashMap<String, CachedRobots>>,
}

impl RobotsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns fresh rules for the origin, if cached
    pub fn get(&self, origin: &str) -> Option<Arc<RobotsRules>> {
        let entries = self.entries.read().ok()?;
        entries
            .get(origin)
            .filter(|cached| !cached.is_stale())
            .map(|cached| Arc::clone(&cached.rules))
    }

    /// Stores rules for the origin and returns the shared handle
    pub fn insert(&self, origin: &str, rules: RobotsRules) -> Arc<RobotsRules> {
        let cached = CachedRobots::new(rules);
        let handle = Arc::clone(&cached.rules);
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(origin.to_string(), cached);
        }
        handle
    }

    /// Largest crawl delay (seconds) any cached host asks of the agent
    pub fn max_crawl_delay(&self, agent_token: &str) -> Option<f64> {
        let entries = self.entries.read().ok()?;
        entries
            .values()
            .filter_map(|cached| cached.rules.crawl_delay(agent_token))
            .fold(None, |max: Option<f64>, delay| {
                Some(max.map_or(delay, |m| m.max(delay)))
            })
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
