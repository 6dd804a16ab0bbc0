//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop for one audit run:
//! - Moving the run through RUNNING to a terminal state
//! - Managing the frontier and the page budget
//! - Fetching in bounded parallel batches with a politeness interval
//! - Persisting pages and feeding discovered URLs back into the frontier
//! - Noticing cancellation between batches

use crate::config::{Config, CrawlOptions};
use crate::crawler::discovery::discover_urls;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::Frontier;
use crate::crawler::resource::FetchedResource;
use crate::state::{load_run, AuditRun, RunState};
use crate::storage::{lock, ContentStore, NewPage, Page, SharedStorage};
use crate::url::normalize_url;
use crate::AuditError;
use futures::future::join_all;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Upper bound for a robots.txt `Crawl-delay`
const MAX_CRAWL_DELAY: Duration = Duration::from_secs(60);

/// How a crawl loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CrawlEnd {
    Finished,
    Canceled,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    storage: SharedStorage,
    content_store: Option<Arc<dyn ContentStore>>,
}

impl Coordinator {
    /// Creates a coordinator
    ///
    /// `config.crawler` provides the crawl defaults each run's config map is
    /// layered over. Without a content store, bodies are simply not kept.
    pub fn new(
        config: Config,
        storage: SharedStorage,
        content_store: Option<Arc<dyn ContentStore>>,
    ) -> Self {
        Self {
            config,
            storage,
            content_store,
        }
    }

    /// Crawls a QUEUED run to a terminal state
    ///
    /// Only a rejected start (the run is not QUEUED) or a storage failure
    /// while recording the outcome is returned as an error. Failures during
    /// the crawl itself end the run in FAILED with the message on
    /// `run.error`.
    pub async fn crawl_audit_run(&self, run: &mut AuditRun) -> Result<(), AuditError> {
        run.transition(RunState::Running)?;
        self.save_run(run)?;
        tracing::info!(
            "Starting crawl for audit run {} ({} seeds)",
            run.id,
            run.seed_urls.len()
        );

        let mut outcome = self.execute(run).await;

        // A cancel that lands during the last batch is only visible in storage
        if !matches!(outcome, Ok(CrawlEnd::Canceled)) && self.is_canceled(run.id)? {
            tracing::info!("Audit run {} was canceled during its last batch", run.id);
            outcome = Ok(CrawlEnd::Canceled);
        }

        match outcome {
            Ok(CrawlEnd::Finished) => {
                run.transition(RunState::Completed)?;
                tracing::info!("Audit run {} completed: {:?}", run.id, run.totals);
            }
            Ok(CrawlEnd::Canceled) => {
                run.transition(RunState::Canceled)?;
                tracing::warn!("Audit run {} canceled: {:?}", run.id, run.totals);
            }
            Err(e) => {
                tracing::error!("Audit run {} failed: {}", run.id, e);
                run.fail(e.to_string())?;
            }
        }

        self.save_run(run)
    }

    async fn execute(&self, run: &mut AuditRun) -> Result<CrawlEnd, AuditError> {
        let options = self.config.crawler.with_overrides(&run.config)?;
        let fetcher = Fetcher::new(&self.config.user_agent, &options, self.content_store.clone())?;

        let mut frontier = Frontier::new();
        for seed in &run.seed_urls {
            match normalize_url(seed) {
                Ok(url) => {
                    frontier.push(url.to_string());
                }
                Err(e) => tracing::warn!("Skipping seed {}: {}", seed, e),
            }
        }

        let started = Instant::now();
        let max_pages = options.max_pages as usize;
        let mut pages_crawled = 0usize;
        let mut end = CrawlEnd::Finished;

        while !frontier.is_empty() && pages_crawled < max_pages {
            if self.is_canceled(run.id)? {
                tracing::info!("Audit run {} was canceled, stopping crawl", run.id);
                end = CrawlEnd::Canceled;
                break;
            }

            let batch_started = Instant::now();
            let batch_size = (options.concurrency as usize).min(max_pages - pages_crawled);
            let batch = frontier.next_batch(batch_size);

            let resources = join_all(batch.iter().map(|url| fetcher.fetch(url, &options))).await;

            for resource in resources {
                if !resource.is_fetched() {
                    tracing::debug!(
                        "Not recording {}: {}",
                        resource.url,
                        resource.error.as_deref().unwrap_or("unknown error")
                    );
                    continue;
                }

                self.materialize_page(run.id, &resource)?;
                pages_crawled += 1;

                if resource.is_html() {
                    let mut added = 0;
                    for url in discover_urls(&resource) {
                        if frontier.push(url) {
                            added += 1;
                        }
                    }
                    tracing::debug!("Queued {} new URLs from {}", added, resource.url);
                }
            }

            tracing::info!(
                "Progress: {} pages crawled, {} in frontier, {} seen",
                pages_crawled,
                frontier.len(),
                frontier.seen_count()
            );

            if !frontier.is_empty() && pages_crawled < max_pages {
                let interval = politeness_interval(&options, &fetcher);
                let elapsed = batch_started.elapsed();
                if elapsed < interval {
                    tokio::time::sleep(interval - elapsed).await;
                }
            }
        }

        let duration = started.elapsed().as_secs_f64();
        run.merge_totals(crawl_totals(pages_crawled, frontier.seen_count(), duration));
        Ok(end)
    }

    /// Turns a fetched resource into a stored page
    ///
    /// Indexability is decided here, once: 2xx, HTML, and no `noindex`.
    pub fn materialize_page(
        &self,
        run_id: i64,
        resource: &FetchedResource,
    ) -> Result<Page, AuditError> {
        let parsed = resource.parsed.clone().unwrap_or_default();

        let new_page = NewPage {
            run_id,
            url: resource.url.clone(),
            status_code: resource.status_code,
            content_type: resource.content_type.clone(),
            content_length: resource.content_length,
            response_time: resource.response_time,
            headers: resource.headers.clone(),
            title: parsed.title.clone(),
            meta_description: parsed.meta_description.clone(),
            canonical_url: resource.canonical_url.clone(),
            robots_directives: resource.robots_directives.clone(),
            is_indexable: resource.is_successful()
                && resource.is_html()
                && !resource.has_robots_directive("noindex"),
            word_count: parsed.word_count,
            body_hash: (!resource.body.is_empty()).then(|| resource.body_hash()),
            content_ref: resource.content_ref.clone(),
            facts: parsed.facts(),
        };

        let mut storage = lock(&self.storage)?;
        let page_id = storage.insert_page(&new_page)?;
        Ok(storage.get_page(page_id)?)
    }

    fn is_canceled(&self, run_id: i64) -> Result<bool, AuditError> {
        let storage = lock(&self.storage)?;
        Ok(load_run(&*storage, run_id)?.state == RunState::Canceled)
    }

    fn save_run(&self, run: &AuditRun) -> Result<(), AuditError> {
        lock(&self.storage)?.update_run(run)?;
        Ok(())
    }
}

/// Minimum time between batch starts: the configured delay, widened by the
/// largest robots.txt `Crawl-delay` seen so far
fn politeness_interval(options: &CrawlOptions, fetcher: &Fetcher) -> Duration {
    let configured = Duration::from_millis(options.crawl_delay_ms);
    let robots = fetcher
        .robots_cache()
        .max_crawl_delay(fetcher.agent_token())
        .filter(|secs| secs.is_finite())
        .map(|secs| Duration::from_secs_f64(secs.clamp(0.0, MAX_CRAWL_DELAY.as_secs_f64())))
        .unwrap_or_default();
    configured.max(robots)
}

fn crawl_totals(pages_crawled: usize, urls_discovered: usize, duration: f64) -> Map<String, Value> {
    let mut totals = Map::new();
    totals.insert("pages_crawled".to_string(), json!(pages_crawled));
    totals.insert("urls_discovered".to_string(), json!(urls_discovered));
    totals.insert(
        "crawl_duration_seconds".to_string(),
        json!((duration * 1000.0).round() / 1000.0),
    );
    totals
}
