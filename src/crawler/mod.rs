//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching gated by robots.txt and path rules
//! - HTML parsing and link extraction
//! - Same-host URL discovery
//! - Overall crawl coordination for an audit run

mod coordinator;
mod discovery;
mod fetcher;
mod frontier;
mod parser;
mod resource;
mod stats;

pub use coordinator::Coordinator;
pub use discovery::discover_urls;
pub use fetcher::{build_http_client, Fetcher};
pub use frontier::Frontier;
pub use parser::{parse_html, split_directives, ParsedPage};
pub use resource::{FetchedResource, StatusClass, BLOCKED_MESSAGE};
pub use stats::{get_crawl_stats, CrawlStats};

use crate::config::Config;
use crate::state::{load_run, RunState};
use crate::storage::{lock, ContentStore, SharedStorage};
use crate::AuditError;
use std::sync::Arc;

/// Crawls a stored run by id and returns its final state
///
/// This is the entry point used by the command line. It will:
/// 1. Load the run (it must be QUEUED)
/// 2. Build a coordinator over the shared storage
/// 3. Crawl until the run reaches a terminal state
pub async fn crawl_run(
    config: Config,
    storage: SharedStorage,
    content_store: Option<Arc<dyn ContentStore>>,
    run_id: i64,
) -> Result<RunState, AuditError> {
    let mut run = {
        let guard = lock(&storage)?;
        load_run(&*guard, run_id)?
    };

    let coordinator = Coordinator::new(config, storage, content_store);
    coordinator.crawl_audit_run(&mut run).await?;
    Ok(run.state)
}
