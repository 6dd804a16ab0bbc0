//! Robots.txt parser implementation
//!
//! Allow/deny decisions combine the robotstxt crate's matcher with the
//! disallow prefixes of every group that applies to us. Disallow prefixes,
//! sitemap locations and crawl delays are read with a small line parser.

use robotstxt::DefaultMatcher;
use url::Url;

/// Rules read from one host's robots.txt
#[derive(Debug, Clone, Default)]
pub struct RobotsRules {
    /// Raw robots.txt content (empty string means allow all)
    content: String,
    /// Disallow prefixes from groups naming `*` or our agent token
    disallow: Vec<String>,
    /// Sitemap URLs, regardless of group
    sitemaps: Vec<String>,
}

impl RobotsRules {
    /// Parses raw robots.txt content for the given crawler token
    ///
    /// Groups apply when their `User-agent` is `*` or contains the token
    /// (case-insensitive). `Sitemap` lines are collected from anywhere.
    pub fn from_content(content: &str, agent_token: &str) -> Self {
        let agent = agent_token.to_lowercase();
        let mut disallow = Vec::new();
        let mut sitemaps = Vec::new();

        let mut group_agents: Vec<String> = Vec::new();
        let mut in_rules = false;

        for line in content.lines() {
            let Some((key, value)) = strip_comment(line).split_once(':') else {
                continue;
            };
            let value = value.trim();

            match key.trim().to_lowercase().as_str() {
                "user-agent" => {
                    // A user-agent line after rules starts a new group
                    if in_rules {
                        group_agents.clear();
                        in_rules = false;
                    }
                    group_agents.push(value.to_lowercase());
                }
                "disallow" => {
                    in_rules = true;
                    if !value.is_empty() && applies_to(&group_agents, &agent) {
                        disallow.push(value.to_string());
                    }
                }
                "sitemap" => {
                    if !value.is_empty() {
                        sitemaps.push(value.to_string());
                    }
                }
                _ => in_rules = true,
            }
        }

        Self {
            content: content.to_string(),
            disallow,
            sitemaps,
        }
    }

    /// Permissive rules used when robots.txt is missing or unreachable
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Disallow prefixes that apply to this crawler
    pub fn disallow(&self) -> &[String] {
        &self.disallow
    }

    /// Sitemap URLs declared by the host
    pub fn sitemaps(&self) -> &[String] {
        &self.sitemaps
    }

    /// Checks if a URL may be fetched by the given agent token
    ///
    /// A URL is refused when the agent's own group refuses it, or when its
    /// path starts with a disallow prefix from the `*` group or the agent's
    /// group. A group naming the agent does not lift the `*` rules.
    pub fn is_allowed(&self, url: &str, agent_token: &str) -> bool {
        if self.content.trim().is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        if !matcher.one_agent_allowed_by_robots(&self.content, agent_token, url) {
            return false;
        }

        match Url::parse(url) {
            Ok(parsed) => {
                let path = match parsed.query() {
                    Some(query) => format!("{}?{}", parsed.path(), query),
                    None => parsed.path().to_string(),
                };
                !self.disallow.iter().any(|prefix| path.starts_with(prefix.as_str()))
            }
            Err(_) => true,
        }
    }

    /// Gets the crawl delay (seconds) declared for the agent or for `*`
    ///
    /// A delay in a group naming the agent wins over a wildcard delay.
    pub fn crawl_delay(&self, agent_token: &str) -> Option<f64> {
        let agent = agent_token.to_lowercase();
        let mut group_agents: Vec<String> = Vec::new();
        let mut in_rules = false;
        let mut for_wildcard = None;
        let mut for_agent = None;

        for line in self.content.lines() {
            let Some((key, value)) = strip_comment(line).split_once(':') else {
                continue;
            };
            let value = value.trim();

            match key.trim().to_lowercase().as_str() {
                "user-agent" => {
                    if in_rules {
                        group_agents.clear();
                        in_rules = false;
                    }
                    group_agents.push(value.to_lowercase());
                }
                "crawl-delay" => {
                    in_rules = true;
                    let Some(delay) = value
                        .parse::<f64>()
                        .ok()
                        .filter(|d| d.is_finite() && *d >= 0.0)
                    else {
                        continue;
                    };
                    if group_agents.iter().any(|ua| ua != "*" && names_agent(ua, &agent)) {
                        for_agent = Some(delay);
                    } else if group_agents.iter().any(|ua| ua == "*") {
                        for_wildcard = Some(delay);
                    }
                }
                _ => in_rules = true,
            }
        }

        for_agent.or(for_wildcard)
    }
}

fn strip_comment(line: &str) -> &str {
    match line.split_once('#') {
        Some((before, _)) => before,
        None => line,
    }
    .trim()
}

/// Whether a group's `User-agent` value names our token, e.g. `SeoAuditBot/2.0`
fn names_agent(group_agent: &str, agent: &str) -> bool {
    !agent.is_empty() && group_agent.contains(agent)
}

fn applies_to(group_agents: &[String], agent: &str) -> bool {
    group_agents
        .iter()
        .any(|ua| ua == "*" || names_agent(ua, agent))
}
