//! Configuration module
//!
//! Handles loading, parsing, and validating the TOML configuration file, and
//! layering per-run option overrides on top of the configured crawl defaults.
//!
//! # Example
//!
//! ```no_run
//! use seo_audit::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("audit.toml")).unwrap();
//! println!("Crawler will fetch at most {} pages", config.crawler.max_pages);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{Config, CrawlOptions, OutputConfig, ScoringConfig, UserAgentConfig};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate_crawl_options, validate_seed_url};
