//! End-to-end tests: config file, crawl, analysis and scoring
//!
//! A wiremock server stands in for the audited site; the database and the
//! config file live in a temporary directory.

use seo_audit::analyzer::{Analyzer, Severity};
use seo_audit::config::{load_config, Config};
use seo_audit::crawler::crawl_run;
use seo_audit::scoring::Scorer;
use seo_audit::state::{create_run, queue_run, NewAuditRun, RunState};
use seo_audit::storage::{lock, open_storage, shared, SharedStorage};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const POOR_HOME: &str = r#"<html><head><title>Home</title></head>
<body><p>Welcome</p><a href="/missing">Old page</a></body></html>"#;

const GOOD_HOME: &str = r#"<html><head>
<title>Smith &amp; Partners | Family Law Attorneys</title>
<meta name="description" content="Smith &amp; Partners is a family law firm offering divorce, custody and mediation services with free first consultations for new clients.">
<meta name="viewport" content="width=device-width, initial-scale=1">
<script type="application/ld+json">{"@context": "https://schema.org", "@type": "LegalService", "name": "Smith & Partners"}</script>
</head><body><h1>Family Law Attorneys</h1><p>We help families.</p></body></html>"#;

/// Writes a config file pointing at a database inside `dir`
fn write_config(dir: &Path) -> Config {
    let config_path = dir.join("seo-audit.toml");
    let content = format!(
        r#"
[crawler]
max-pages = 20
concurrency = 2
crawl-delay-ms = 0
timeout-secs = 5

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0"
contact-url = "https://example.com/bot"
contact-email = "bot@example.com"

[output]
database-path = "{}"
"#,
        dir.join("audit.db").display()
    );
    std::fs::write(&config_path, content).expect("Failed to write config");
    load_config(&config_path).expect("Failed to load config")
}

fn open(config: &Config) -> SharedStorage {
    shared(open_storage(Path::new(&config.output.database_path)).expect("Failed to open database"))
}

async fn mount_site(server: &MockServer, home: &str) {
    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(home.to_string(), "text/html"),
        )
        .mount(server)
        .await;
}

/// Creates, queues and crawls a run of `base`
async fn crawl(config: &Config, storage: &SharedStorage, base: &str) -> i64 {
    let run_id = {
        let mut guard = lock(storage).unwrap();
        let run = create_run(
            &mut *guard,
            &NewAuditRun {
                seed_urls: vec![format!("{}/", base)],
                ..Default::default()
            },
        )
        .unwrap();
        queue_run(&mut *guard, run.id).unwrap();
        run.id
    };

    let state = crawl_run(config.clone(), storage.clone(), None, run_id)
        .await
        .expect("Crawl failed");
    assert_eq!(state, RunState::Completed);
    run_id
}

#[tokio::test]
async fn test_analyze_poor_site() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    let storage = open(&config);

    let server = MockServer::start().await;
    mount_site(&server, POOR_HOME).await;
    let run_id = crawl(&config, &storage, &server.uri()).await;

    let analyzer = Analyzer::new(storage.clone());
    let findings = analyzer.analyze_audit_run(run_id).unwrap();
    assert!(findings.iter().all(|f| f.run_id == run_id));

    let keys: Vec<&str> = findings.iter().map(|f| f.check_key.as_str()).collect();
    for expected in [
        "technical.http_status_code",
        "technical.https",
        "technical.mobile_friendly",
        "onpage.title_tag",
        "onpage.meta_description",
        "onpage.h1_tag",
        "local.business_schema",
    ] {
        assert!(keys.contains(&expected), "missing finding {}", expected);
    }

    let broken = findings
        .iter()
        .find(|f| f.check_key == "technical.http_status_code")
        .unwrap();
    assert_eq!(broken.severity, Severity::Critical);
    assert!(broken.description.contains("404"));
    assert!(broken.page_id.is_some());

    let run = {
        let guard = lock(&storage).unwrap();
        guard.get_run(run_id).unwrap()
    };
    assert_eq!(run.totals["findings"]["total"], findings.len());
    assert_eq!(run.totals["findings"]["critical"], 1);
    assert_eq!(run.totals["pages_crawled"], 2);

    // Re-analysis replaces the earlier findings
    let again = analyzer.analyze_audit_run(run_id).unwrap();
    assert_eq!(again.len(), findings.len());
    let stored = lock(&storage).unwrap().get_findings_for_run(run_id).unwrap();
    assert_eq!(stored.len(), findings.len());
}

#[tokio::test]
async fn test_score_and_compare_runs() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    let storage = open(&config);
    let analyzer = Analyzer::new(storage.clone());
    let scorer = Scorer::new(storage.clone(), config.scoring);

    let server = MockServer::start().await;
    mount_site(&server, POOR_HOME).await;
    let before = crawl(&config, &storage, &server.uri()).await;
    analyzer.analyze_audit_run(before).unwrap();

    mount_site(&server, GOOD_HOME).await;
    let after = crawl(&config, &storage, &server.uri()).await;
    let fixed = analyzer.analyze_audit_run(after).unwrap();

    // Plain http is all that is left on the fixed site
    assert_eq!(fixed.len(), 1);
    assert_eq!(fixed[0].check_key, "technical.https");

    let card = scorer.score(before).unwrap();
    assert!((0.0..=100.0).contains(&card.overall_score));
    assert_eq!(card.category_scores.len(), 3);
    assert_eq!(card.metrics.total_pages, 2);
    assert_eq!(card.metrics.successful_pages, 1);
    assert_eq!(card.top_issues[0].severity, Severity::Critical);
    let counts = card.severity_counts;
    assert_eq!(
        counts.critical + counts.high + counts.medium + counts.low,
        card.metrics.total_findings
    );

    let comparison = scorer.compare_runs(before, after).unwrap();
    assert!(comparison.overall_score_delta > 0.0);
    assert!(comparison.findings_count_delta < 0);
    assert_eq!(
        comparison.overall_score_delta,
        comparison.run_b.overall_score - comparison.run_a.overall_score
    );

    let json = serde_json::to_value(&comparison).unwrap();
    assert!(json["run_a"]["category_scores"]["technical"].is_number());
}

#[tokio::test]
async fn test_runs_persist_across_connections() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());

    let server = MockServer::start().await;
    mount_site(&server, GOOD_HOME).await;

    let run_id = {
        let storage = open(&config);
        crawl(&config, &storage, &server.uri()).await
    };

    let storage = open(&config);
    let guard = lock(&storage).unwrap();
    let runs = guard.list_runs().unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].id, run_id);
    assert_eq!(runs[0].state, RunState::Completed);
    assert_eq!(guard.get_pages_for_run(run_id).unwrap().len(), 1);
}
