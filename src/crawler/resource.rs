//! The result of fetching a single URL

use crate::crawler::parser::ParsedPage;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Message attached to resources refused by robots.txt or path rules
pub const BLOCKED_MESSAGE: &str = "URL blocked by robots.txt or crawl rules";

/// Coarse HTTP status family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    /// 2xx
    Success,
    /// 3xx
    Redirect,
    /// 4xx
    ClientError,
    /// 5xx and above
    ServerError,
    /// Anything else, including 0 for transport failures
    Other,
}

impl StatusClass {
    pub fn of(status_code: u16) -> Self {
        match status_code {
            200..=299 => Self::Success,
            300..=399 => Self::Redirect,
            400..=499 => Self::ClientError,
            500..=u16::MAX => Self::ServerError,
            _ => Self::Other,
        }
    }
}

/// A fetched (or refused) URL
///
/// Returned by [`Fetcher::fetch`](crate::crawler::Fetcher::fetch) and turned
/// into a stored page by the coordinator. Never persisted itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedResource {
    /// Normalized URL that was requested
    pub url: String,
    /// HTTP status; 0 when the request never completed
    pub status_code: u16,
    pub content_type: String,
    pub body: Vec<u8>,
    pub content_length: u64,
    /// Wall-clock duration in seconds
    pub response_time: f64,
    /// Lower-cased header names, first value wins
    pub headers: BTreeMap<String, String>,
    pub canonical_url: Option<String>,
    /// Lower-cased, from `X-Robots-Tag` then the robots meta tag
    pub robots_directives: Vec<String>,
    /// Sitemap URLs advertised by the host's robots.txt
    pub sitemaps: Vec<String>,
    pub content_ref: Option<String>,
    /// Parsed document, present for HTML responses
    pub parsed: Option<ParsedPage>,
    pub error: Option<String>,
}

impl FetchedResource {
    /// A URL refused by robots.txt or the crawl's path rules
    pub fn blocked(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status_code: 403,
            content_type: "text/plain".to_string(),
            error: Some(message.into()),
            ..Default::default()
        }
    }

    /// A request that failed before any response arrived
    pub fn failed(url: impl Into<String>, message: impl Into<String>, response_time: f64) -> Self {
        Self {
            url: url.into(),
            status_code: 0,
            response_time,
            error: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn status_class(&self) -> StatusClass {
        StatusClass::of(self.status_code)
    }

    pub fn is_successful(&self) -> bool {
        self.status_class() == StatusClass::Success
    }

    pub fn is_redirect(&self) -> bool {
        self.status_class() == StatusClass::Redirect
    }

    pub fn is_client_error(&self) -> bool {
        self.status_class() == StatusClass::ClientError
    }

    pub fn is_server_error(&self) -> bool {
        self.status_class() == StatusClass::ServerError
    }

    pub fn is_html(&self) -> bool {
        self.content_type.to_lowercase().contains("text/html")
    }

    pub fn has_robots_directive(&self, directive: &str) -> bool {
        self.robots_directives
            .iter()
            .any(|d| d.eq_ignore_ascii_case(directive))
    }

    /// True when a response was received and the URL was not refused
    pub fn is_fetched(&self) -> bool {
        self.error.is_none()
    }

    /// SHA-256 of the body, hex encoded
    pub fn body_hash(&self) -> String {
        hex::encode(Sha256::digest(&self.body))
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
