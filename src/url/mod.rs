//! URL handling module
//!
//! This module provides URL normalization, reference resolution and host
//! comparison used by the fetcher and by link discovery.

mod domain;
mod normalize;
mod resolve;

pub use domain::{extract_host, origin_of, same_host};
pub use normalize::normalize_url;
pub use resolve::resolve_url;

/// Returns true if `path` starts with any of the given prefixes
pub fn matches_any_prefix(path: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
}
