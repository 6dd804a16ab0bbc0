//! HTML parser for extracting links and SEO signals
//!
//! This module handles parsing HTML content to extract:
//! - Links to follow (from `<a href>` tags)
//! - Title, meta description, canonical link and robots meta
//! - Headings, images, viewport and JSON-LD types used by the checks
//! - A visible word count

use crate::storage::PageFacts;
use crate::url::resolve_url;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPage {
    /// The page title (from the first `<title>` tag)
    pub title: Option<String>,

    pub meta_description: Option<String>,

    /// Absolute canonical URL, resolved against the page URL
    pub canonical_url: Option<String>,

    /// Directives from `<meta name="robots">`, lower-cased
    pub meta_robots: Vec<String>,

    /// All followable links found on the page (absolute URLs)
    pub links: Vec<Url>,

    pub h1: Vec<String>,
    pub image_count: u32,
    pub images_missing_alt: u32,
    pub viewport: Option<String>,
    pub structured_data_types: Vec<String>,
    pub word_count: u32,
}

impl ParsedPage {
    /// The subset of signals stored alongside a page
    pub fn facts(&self) -> PageFacts {
        PageFacts {
            h1: self.h1.clone(),
            image_count: self.image_count,
            images_missing_alt: self.images_missing_alt,
            viewport: self.viewport.clone(),
            structured_data_types: self.structured_data_types.clone(),
        }
    }
}

/// Parses HTML content and extracts links and metadata
///
/// # Link Extraction Rules
///
/// **Include:** `<a href="...">` anywhere in the document, `rel="nofollow"`
/// included.
///
/// **Exclude:** `<a download>`, and any href [`resolve_url`] refuses
/// (`javascript:`, `mailto:`, `tel:`, data URIs, fragment-only).
///
/// Malformed markup never fails; html5ever recovers what it can.
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);
    let (image_count, images_missing_alt) = count_images(&document);

    ParsedPage {
        title: first_text(&document, "title"),
        meta_description: meta_content(&document, "description"),
        canonical_url: extract_canonical(&document, base_url),
        meta_robots: meta_content(&document, "robots")
            .map(|value| split_directives(&value))
            .unwrap_or_default(),
        links: extract_links(&document, base_url),
        h1: all_texts(&document, "h1"),
        image_count,
        images_missing_alt,
        viewport: meta_content(&document, "viewport"),
        structured_data_types: extract_structured_data_types(&document),
        word_count: count_words(&document),
    }
}

/// Splits a robots directive list (`"NOINDEX, follow"`) into lower-cased parts
pub fn split_directives(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|part| part.trim().to_lowercase())
        .filter(|part| !part.is_empty())
        .collect()
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(document: &Html, css: &str) -> Option<String> {
    let sel = selector(css)?;
    document
        .select(&sel)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
}

fn all_texts(document: &Html, css: &str) -> Vec<String> {
    match selector(css) {
        Some(sel) => document.select(&sel).map(element_text).collect(),
        None => Vec::new(),
    }
}

/// Content of the first `<meta name=...>` whose name matches case-insensitively
fn meta_content(document: &Html, name: &str) -> Option<String> {
    let sel = selector("meta[name]")?;
    document
        .select(&sel)
        .find(|e| {
            e.value()
                .attr("name")
                .is_some_and(|n| n.trim().eq_ignore_ascii_case(name))
        })
        .and_then(|e| e.value().attr("content"))
        .map(|content| content.trim().to_string())
}

fn extract_canonical(document: &Html, base_url: &Url) -> Option<String> {
    let sel = selector("link[rel][href]")?;
    document
        .select(&sel)
        .find(|e| {
            e.value().attr("rel").is_some_and(|rel| {
                rel.split_whitespace()
                    .any(|r| r.eq_ignore_ascii_case("canonical"))
            })
        })
        .and_then(|e| e.value().attr("href"))
        .and_then(|href| resolve_url(href, base_url))
        .map(|url| url.to_string())
}

fn extract_links(document: &Html, base_url: &Url) -> Vec<Url> {
    let Some(sel) = selector("a[href]") else {
        return Vec::new();
    };

    document
        .select(&sel)
        .filter(|e| e.value().attr("download").is_none())
        .filter_map(|e| e.value().attr("href"))
        .filter_map(|href| resolve_url(href, base_url))
        .collect()
}

/// Returns (images, images without an `alt` attribute)
fn count_images(document: &Html) -> (u32, u32) {
    let Some(sel) = selector("img") else {
        return (0, 0);
    };

    document.select(&sel).fold((0, 0), |(total, missing), img| {
        let lacks_alt = img.value().attr("alt").is_none();
        (total + 1, missing + u32::from(lacks_alt))
    })
}

fn extract_structured_data_types(document: &Html) -> Vec<String> {
    let Some(sel) = selector("script[type]") else {
        return Vec::new();
    };

    let mut types = Vec::new();
    for script in document.select(&sel) {
        let is_json_ld = script
            .value()
            .attr("type")
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("application/ld+json"));
        if !is_json_ld {
            continue;
        }

        let raw = script.text().collect::<String>();
        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => collect_types(&value, &mut types),
            Err(e) => tracing::debug!("Skipping malformed JSON-LD block: {}", e),
        }
    }

    let mut unique: Vec<String> = Vec::with_capacity(types.len());
    for t in types {
        if !unique.contains(&t) {
            unique.push(t);
        }
    }
    unique
}

fn collect_types(value: &Value, types: &mut Vec<String>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_types(item, types);
            }
        }
        Value::Object(map) => {
            match map.get("@type") {
                Some(Value::String(t)) => types.push(t.clone()),
                Some(Value::Array(ts)) => {
                    types.extend(ts.iter().filter_map(|t| t.as_str().map(str::to_string)))
                }
                _ => {}
            }
            if let Some(graph) = map.get("@graph") {
                collect_types(graph, types);
            }
        }
        _ => {}
    }
}

/// Counts words in visible text; script, style and noscript content is skipped
fn count_words(document: &Html) -> u32 {
    let root = selector("body")
        .and_then(|sel| document.select(&sel).next())
        .unwrap_or_else(|| document.root_element());

    let mut count = 0u32;
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|e| matches!(e.name(), "script" | "style" | "noscript"))
        });
        if hidden {
            continue;
        }

        count += text
            .split_whitespace()
            .filter(|word| word.chars().any(char::is_alphabetic))
            .count() as u32;
    }
    count
}
