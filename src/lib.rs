//! SEO Audit: crawl, analyze and score a website
//!
//! This crate crawls a bounded set of pages from seed URLs while respecting
//! robots.txt, runs a registry of SEO checks over every fetched page, and
//! aggregates the resulting findings into a weighted scorecard.

pub mod analyzer;
pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod scoring;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for audit operations
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition {
        from: state::RunState,
        to: state::RunState,
    },

    #[error("Audit run not found: {0}")]
    RunNotFound(i64),

    #[error("Unknown check: {0}")]
    UnknownCheck(String),

    #[error("Check error: {0}")]
    Check(#[from] analyzer::CheckError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid run options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use analyzer::{Analyzer, Category, Check, Effort, Severity};
pub use config::{Config, CrawlOptions};
pub use crawler::{Coordinator, FetchedResource, Fetcher};
pub use scoring::{Scorecard, Scorer};
pub use state::RunState;
pub use storage::{AuditRun, Finding, Page, SharedStorage, SqliteStorage, Storage};
pub use url::{normalize_url, resolve_url};
