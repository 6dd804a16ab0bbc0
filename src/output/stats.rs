//! Console rendering of runs and crawl statistics

use crate::crawler::{get_crawl_stats, CrawlStats};
use crate::state::{load_run, AuditRun};
use crate::storage::{Page, Storage};
use crate::AuditError;
use std::fmt::Write;

/// Loads a run and the statistics of its stored pages
pub fn load_run_statistics(
    storage: &dyn Storage,
    run_id: i64,
) -> Result<(AuditRun, CrawlStats), AuditError> {
    let run = load_run(storage, run_id)?;
    let pages = storage.get_pages_for_run(run_id)?;
    Ok((run, get_crawl_stats(&pages)))
}

fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// One line per run: id, state, seeds and headline totals
pub fn format_run(run: &AuditRun) -> String {
    let pages = run
        .totals
        .get("pages_crawled")
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string());
    let findings = run
        .totals
        .get("findings")
        .and_then(|f| f.get("total"))
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string());

    let mut line = format!(
        "#{:<5} {:<10} pages={:<6} findings={:<6} {}",
        run.id,
        run.state,
        pages,
        findings,
        run.seed_urls.join(", ")
    );
    if let Some(error) = &run.error {
        let _ = write!(line, " (error: {})", error);
    }
    line
}

pub fn format_crawl_stats(run: &AuditRun, stats: &CrawlStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Crawl Statistics: run {} ===\n", run.id);

    let _ = writeln!(out, "Run:");
    let _ = writeln!(out, "  State: {}", run.state);
    let _ = writeln!(out, "  Seeds: {}", run.seed_urls.join(", "));
    if let Some(started) = run.started_at {
        let _ = writeln!(out, "  Started: {}", started.to_rfc3339());
    }
    if let Some(finished) = run.finished_at {
        let _ = writeln!(out, "  Finished: {}", finished.to_rfc3339());
    }
    if let Some(error) = &run.error {
        let _ = writeln!(out, "  Error: {}", error);
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Pages by Status:");
    for (label, count) in [
        ("2xx", stats.status_2xx),
        ("3xx", stats.status_3xx),
        ("4xx", stats.status_4xx),
        ("5xx", stats.status_5xx),
        ("other", stats.status_other),
    ] {
        if count > 0 {
            let _ = writeln!(
                out,
                "  {}: {} ({:.1}%)",
                label,
                count,
                percentage(count, stats.total_pages)
            );
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Indexability:");
    let _ = writeln!(out, "  Indexable: {}", stats.indexable);
    let _ = writeln!(out, "  Not indexable: {}", stats.non_indexable);
    let _ = writeln!(out);

    let _ = writeln!(out, "Performance:");
    let _ = writeln!(out, "  Average response time: {:.3}s", stats.avg_response_time);
    let _ = writeln!(out, "  Average content length: {:.0} bytes", stats.avg_content_length);
    let _ = writeln!(out, "  Total content length: {} bytes", stats.total_content_length);
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "Indexable Rate: {:.1}% ({} / {} pages)",
        percentage(stats.indexable, stats.total_pages),
        stats.indexable,
        stats.total_pages
    );
    out
}

/// Stored facts of one page
pub fn format_page(page: &Page) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Page {} (run {}) ===\n", page.id, page.run_id);
    let _ = writeln!(out, "  URL: {}", page.url);
    let _ = writeln!(out, "  Status: {}", page.status_code);
    let _ = writeln!(out, "  Content type: {}", page.content_type);
    let _ = writeln!(out, "  Content length: {} bytes", page.content_length);
    let _ = writeln!(out, "  Response time: {:.3}s", page.response_time);
    let _ = writeln!(out, "  Title: {}", page.title.as_deref().unwrap_or("-"));
    let _ = writeln!(
        out,
        "  Description: {}",
        page.meta_description.as_deref().unwrap_or("-")
    );
    let _ = writeln!(out, "  Canonical: {}", page.canonical_url.as_deref().unwrap_or("-"));
    if !page.robots_directives.is_empty() {
        let _ = writeln!(out, "  Robots: {}", page.robots_directives.join(", "));
    }
    let _ = writeln!(out, "  Indexable: {}", if page.is_indexable { "yes" } else { "no" });
    let _ = writeln!(out, "  Words: {}", page.word_count);
    if let Some(reference) = &page.content_ref {
        let _ = writeln!(out, "  Stored body: {}", reference);
    }
    out
}

/// Prints statistics to stdout in a formatted manner
pub fn print_crawl_stats(run: &AuditRun, stats: &CrawlStats) {
    print!("{}", format_crawl_stats(run, stats));
}
