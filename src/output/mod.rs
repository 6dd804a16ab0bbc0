//! Output module for console summaries
//!
//! This module handles:
//! - Listing runs, pages and crawl statistics
//! - Printing scorecards and run comparisons
//! - Listing the check registry

mod scorecard;
mod stats;

pub use scorecard::{
    format_checks, format_comparison, format_scorecard, print_comparison, print_scorecard,
};
pub use stats::{
    format_crawl_stats, format_page, format_run, load_run_statistics, print_crawl_stats,
};
