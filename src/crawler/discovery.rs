//! URL discovery from fetched pages

use crate::crawler::parser::parse_html;
use crate::crawler::resource::FetchedResource;
use crate::url::{normalize_url, same_host};
use std::collections::HashSet;
use url::Url;

/// Collects the URLs worth crawling next from a fetched resource
///
/// Only HTML resources yield anything. Anchor links are resolved against the
/// resource URL and kept only when they point at the same host; the host's
/// robots.txt sitemap URLs are merged in. The result is normalized and free
/// of duplicates, in discovery order.
pub fn discover_urls(resource: &FetchedResource) -> Vec<String> {
    if !resource.is_html() {
        return Vec::new();
    }

    let base = match Url::parse(&resource.url) {
        Ok(base) => base,
        Err(e) => {
            tracing::warn!("Skipping discovery for {}: {}", resource.url, e);
            return Vec::new();
        }
    };

    let links = match &resource.parsed {
        Some(parsed) => parsed.links.clone(),
        None => parse_html(&resource.text(), &base).links,
    };

    let total = links.len();
    let same_host_links = links.into_iter().filter(|link| same_host(&base, link));

    let mut seen = HashSet::new();
    let mut discovered = Vec::new();
    for candidate in same_host_links
        .map(|link| link.to_string())
        .chain(resource.sitemaps.iter().cloned())
    {
        let Ok(normalized) = normalize_url(&candidate) else {
            continue;
        };
        let normalized = normalized.to_string();
        if seen.insert(normalized.clone()) {
            discovered.push(normalized);
        }
    }

    tracing::debug!(
        "Discovered {} URLs on {} ({} links on page)",
        discovered.len(),
        resource.url,
        total
    );
    discovered
}
