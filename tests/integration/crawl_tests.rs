//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and drive whole
//! audit runs from QUEUED to a terminal state.

use serde_json::{json, Map, Value};
use seo_audit::config::{Config, CrawlOptions, OutputConfig, ScoringConfig, UserAgentConfig};
use seo_audit::crawler::crawl_run;
use seo_audit::state::{
    cancel_run, create_run, load_run, queue_run, AuditRun, NewAuditRun, RunState,
};
use seo_audit::storage::{
    lock, shared, ContentStore, FsContentStore, SharedStorage, SqliteStorage,
};
use seo_audit::AuditError;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with no politeness delay
fn create_test_config() -> Config {
    Config {
        crawler: CrawlOptions {
            max_pages: 50,
            concurrency: 2,
            crawl_delay_ms: 0,
            timeout_secs: 5,
            ..Default::default()
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            database_path: ":memory:".to_string(),
            content_path: None,
        },
        scoring: ScoringConfig::default(),
    }
}

fn create_storage() -> SharedStorage {
    shared(SqliteStorage::new_in_memory().expect("Failed to open storage"))
}

/// Creates and queues a run seeded with `seed`
fn queued_run(storage: &SharedStorage, seed: &str, config: Value) -> i64 {
    let mut guard = lock(storage).unwrap();
    let run = create_run(
        &mut *guard,
        &NewAuditRun {
            seed_urls: vec![seed.to_string()],
            config: config.as_object().cloned().unwrap_or_else(Map::new),
            ..Default::default()
        },
    )
    .expect("Failed to create run");
    queue_run(&mut *guard, run.id).expect("Failed to queue run");
    run.id
}

fn stored_run(storage: &SharedStorage, run_id: i64) -> AuditRun {
    let guard = lock(storage).unwrap();
    load_run(&*guard, run_id).unwrap()
}

fn stored_urls(storage: &SharedStorage, run_id: i64) -> Vec<String> {
    let guard = lock(storage).unwrap();
    let mut urls: Vec<String> = guard
        .get_pages_for_run(run_id)
        .unwrap()
        .into_iter()
        .map(|p| p.url)
        .collect();
    urls.sort();
    urls
}

fn total(run: &AuditRun, key: &str) -> u64 {
    run.totals
        .get(key)
        .and_then(|v| v.as_u64())
        .unwrap_or_else(|| panic!("missing total {}", key))
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_raw(body.to_string(), "text/html; charset=utf-8")
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, page: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(
        &server,
        "/",
        &format!(
            r#"<html><head><title>Home</title></head><body>
            <a href="{base}/page1">Page 1</a>
            <a href="/page2#section">Page 2</a>
            <a href="https://other.example/">Elsewhere</a>
            </body></html>"#
        ),
    )
    .await;
    mount_page(&server, "/page1", r#"<html><body><a href="/">Home</a></body></html>"#).await;
    mount_page(&server, "/page2", "<html><body>Leaf</body></html>").await;

    let storage = create_storage();
    let run_id = queued_run(&storage, &format!("{}/", base), json!({}));

    let state = crawl_run(create_test_config(), storage.clone(), None, run_id)
        .await
        .expect("Crawl failed");
    assert_eq!(state, RunState::Completed);

    let run = stored_run(&storage, run_id);
    assert_eq!(run.state, RunState::Completed);
    assert!(run.started_at.is_some());
    assert!(run.finished_at.is_some());
    assert_eq!(total(&run, "pages_crawled"), 3);
    assert_eq!(total(&run, "urls_discovered"), 3);
    assert!(run.totals.contains_key("crawl_duration_seconds"));

    assert_eq!(
        stored_urls(&storage, run_id),
        vec![
            format!("{}/", base),
            format!("{}/page1", base),
            format!("{}/page2", base),
        ]
    );

    let guard = lock(&storage).unwrap();
    let pages = guard.get_pages_for_run(run_id).unwrap();
    let home = pages.iter().find(|p| p.url == format!("{}/", base)).unwrap();
    assert_eq!(home.status_code, 200);
    assert_eq!(home.title.as_deref(), Some("Home"));
    assert!(home.is_indexable);
    assert!(home.body_hash.is_some());
    assert!(home.content_ref.is_none());
}

#[tokio::test]
async fn test_max_pages_stops_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/a">A</a><a href="/b">B</a></body></html>"#,
    )
    .await;

    let storage = create_storage();
    let run_id = queued_run(&storage, &format!("{}/", base), json!({"max_pages": 1}));

    let state = crawl_run(create_test_config(), storage.clone(), None, run_id)
        .await
        .unwrap();
    assert_eq!(state, RunState::Completed);

    let run = stored_run(&storage, run_id);
    assert_eq!(total(&run, "pages_crawled"), 1);
    assert_eq!(stored_urls(&storage, run_id).len(), 1);
}

#[tokio::test]
async fn test_robots_disallow_is_respected() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, "User-agent: *\nDisallow: /private").await;
    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/private/page">Secret</a><a href="/public">Public</a></body></html>"#,
    )
    .await;
    mount_page(&server, "/public", "<html><body>Public</body></html>").await;

    Mock::given(method("GET"))
        .and(path("/private/page"))
        .respond_with(html("<html><body>Secret</body></html>"))
        .expect(0)
        .mount(&server)
        .await;

    let storage = create_storage();
    let run_id = queued_run(&storage, &format!("{}/", base), json!({}));

    crawl_run(create_test_config(), storage.clone(), None, run_id)
        .await
        .unwrap();

    assert_eq!(
        stored_urls(&storage, run_id),
        vec![format!("{}/", base), format!("{}/public", base)]
    );
    assert_eq!(total(&stored_run(&storage, run_id), "pages_crawled"), 2);
}

#[tokio::test]
async fn test_robots_server_error_allows_crawling() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(&server, "/", "<html><body>Hello</body></html>").await;

    let storage = create_storage();
    let run_id = queued_run(&storage, &format!("{}/", base), json!({}));

    let state = crawl_run(create_test_config(), storage.clone(), None, run_id)
        .await
        .unwrap();
    assert_eq!(state, RunState::Completed);
    assert_eq!(stored_urls(&storage, run_id), vec![format!("{}/", base)]);
}

#[tokio::test]
async fn test_cross_domain_links_are_not_followed() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, "User-agent: *\nAllow: /").await;
    let mut links = String::new();
    for i in 1..=5 {
        links.push_str(&format!(r#"<a href="/p{i}">Page {i}</a>"#));
        mount_page(&server, &format!("/p{}", i), "<html><body>Page</body></html>").await;
    }
    links.push_str(r#"<a href="https://cdn.other.example/x">CDN</a>"#);
    links.push_str(r#"<a href="http://partner.example/">Partner</a>"#);
    mount_page(&server, "/", &format!("<html><body>{}</body></html>", links)).await;

    let storage = create_storage();
    let run_id = queued_run(&storage, &format!("{}/", base), json!({"concurrency": 3}));

    crawl_run(create_test_config(), storage.clone(), None, run_id)
        .await
        .unwrap();

    let urls = stored_urls(&storage, run_id);
    assert_eq!(urls.len(), 6);
    assert!(urls.iter().all(|u| u.starts_with(&base)));

    let run = stored_run(&storage, run_id);
    assert_eq!(total(&run, "urls_discovered"), 6);
}

#[tokio::test]
async fn test_error_pages_are_recorded() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/gone">Gone</a><a href="/broken">Broken</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let storage = create_storage();
    let run_id = queued_run(&storage, &format!("{}/", base), json!({}));

    crawl_run(create_test_config(), storage.clone(), None, run_id)
        .await
        .unwrap();

    let guard = lock(&storage).unwrap();
    let pages = guard.get_pages_for_run(run_id).unwrap();
    assert_eq!(pages.len(), 3);

    let gone = pages.iter().find(|p| p.url.ends_with("/gone")).unwrap();
    assert_eq!(gone.status_code, 404);
    assert!(!gone.is_indexable);

    let broken = pages.iter().find(|p| p.url.ends_with("/broken")).unwrap();
    assert_eq!(broken.status_code, 500);
    assert!(broken.body_hash.is_none());
}

#[tokio::test]
async fn test_blocked_paths_from_run_config() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/admin/login">Admin</a><a href="/about">About</a></body></html>"#,
    )
    .await;
    mount_page(&server, "/about", "<html><body>About</body></html>").await;
    Mock::given(method("GET"))
        .and(path("/admin/login"))
        .respond_with(html("<html><body>Login</body></html>"))
        .expect(0)
        .mount(&server)
        .await;

    let storage = create_storage();
    let run_id = queued_run(
        &storage,
        &format!("{}/", base),
        json!({"blocked_paths": ["/admin"]}),
    );

    crawl_run(create_test_config(), storage.clone(), None, run_id)
        .await
        .unwrap();

    assert_eq!(
        stored_urls(&storage, run_id),
        vec![format!("{}/", base), format!("{}/about", base)]
    );
}

#[tokio::test]
async fn test_noindex_header_makes_page_non_indexable() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, "User-agent: *\nAllow: /").await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            html("<html><body>Hidden</body></html>").insert_header("x-robots-tag", "NoIndex, nofollow"),
        )
        .mount(&server)
        .await;

    let storage = create_storage();
    let run_id = queued_run(&storage, &format!("{}/", base), json!({}));

    crawl_run(create_test_config(), storage.clone(), None, run_id)
        .await
        .unwrap();

    let guard = lock(&storage).unwrap();
    let pages = guard.get_pages_for_run(run_id).unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].robots_directives, vec!["noindex", "nofollow"]);
    assert!(!pages[0].is_indexable);
}

#[tokio::test]
async fn test_html_bodies_go_to_content_store() {
    let server = MockServer::start().await;
    let base = server.uri();
    let content_dir = tempfile::tempdir().unwrap();

    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(&server, "/", "<html><body>Stored</body></html>").await;

    let storage = create_storage();
    let run_id = queued_run(&storage, &format!("{}/", base), json!({}));
    let store: Arc<dyn ContentStore> = Arc::new(FsContentStore::new(content_dir.path()).unwrap());

    crawl_run(create_test_config(), storage.clone(), Some(store.clone()), run_id)
        .await
        .unwrap();

    let guard = lock(&storage).unwrap();
    let pages = guard.get_pages_for_run(run_id).unwrap();
    let reference = pages[0].content_ref.clone().expect("body should be stored");
    assert!(reference.starts_with("html/"));
    assert!(content_dir.path().join(&reference).exists());
    assert_eq!(
        store.load(&reference).unwrap(),
        b"<html><body>Stored</body></html>".to_vec()
    );
}

#[tokio::test]
async fn test_crawl_requires_queued_run() {
    let storage = create_storage();
    let run_id = {
        let mut guard = lock(&storage).unwrap();
        create_run(
            &mut *guard,
            &NewAuditRun {
                seed_urls: vec!["http://127.0.0.1:9/".to_string()],
                ..Default::default()
            },
        )
        .unwrap()
        .id
    };

    let result = crawl_run(create_test_config(), storage.clone(), None, run_id).await;
    assert!(matches!(
        result,
        Err(AuditError::InvalidTransition {
            from: RunState::Draft,
            to: RunState::Running
        })
    ));
    assert_eq!(stored_run(&storage, run_id).state, RunState::Draft);
}

#[tokio::test]
async fn test_unknown_run() {
    let storage = create_storage();
    let result = crawl_run(create_test_config(), storage, None, 42).await;
    assert!(matches!(result, Err(AuditError::RunNotFound(42))));
}

#[tokio::test]
async fn test_cancel_stops_crawl_between_batches() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, "User-agent: *\nAllow: /").await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            html(r#"<html><body><a href="/next">Next</a></body></html>"#)
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/next"))
        .respond_with(html("<html><body>Next</body></html>"))
        .expect(0)
        .mount(&server)
        .await;

    let storage = create_storage();
    let run_id = queued_run(&storage, &format!("{}/", base), json!({"concurrency": 1}));

    let crawl = crawl_run(create_test_config(), storage.clone(), None, run_id);
    let cancel = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let mut guard = lock(&storage).unwrap();
        cancel_run(&mut *guard, run_id).unwrap();
    };

    let (state, ()) = tokio::join!(crawl, cancel);
    assert_eq!(state.unwrap(), RunState::Canceled);

    let run = stored_run(&storage, run_id);
    assert_eq!(run.state, RunState::Canceled);
    assert_eq!(total(&run, "pages_crawled"), 1);
    assert!(run.finished_at.is_some());
}

#[tokio::test]
async fn test_cancel_during_last_batch_is_kept() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, "User-agent: *\nAllow: /").await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            html("<html><body>No links here</body></html>")
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let storage = create_storage();
    let run_id = queued_run(&storage, &format!("{}/", base), json!({}));

    let crawl = crawl_run(create_test_config(), storage.clone(), None, run_id);
    let cancel = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let mut guard = lock(&storage).unwrap();
        cancel_run(&mut *guard, run_id).unwrap();
    };

    let (state, ()) = tokio::join!(crawl, cancel);
    assert_eq!(state.unwrap(), RunState::Canceled);

    let run = stored_run(&storage, run_id);
    assert_eq!(run.state, RunState::Canceled);
    assert_eq!(total(&run, "pages_crawled"), 1);
}

#[tokio::test]
async fn test_wildcard_rules_apply_alongside_own_group() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(
        &server,
        "User-agent: TestBot\nDisallow: /private\n\nUser-agent: *\nDisallow: /tmp",
    )
    .await;
    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/private/a">A</a><a href="/tmp/b">B</a><a href="/open">C</a></body></html>"#,
    )
    .await;
    mount_page(&server, "/open", "<html><body>Open</body></html>").await;
    for blocked in ["/private/a", "/tmp/b"] {
        Mock::given(method("GET"))
            .and(path(blocked))
            .respond_with(html("<html><body>Blocked</body></html>"))
            .expect(0)
            .mount(&server)
            .await;
    }

    let storage = create_storage();
    let run_id = queued_run(&storage, &format!("{}/", base), json!({}));

    crawl_run(create_test_config(), storage.clone(), None, run_id)
        .await
        .unwrap();

    assert_eq!(
        stored_urls(&storage, run_id),
        vec![format!("{}/", base), format!("{}/open", base)]
    );
}

#[tokio::test]
async fn test_huge_robots_crawl_delay_does_not_stall_run() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, "User-agent: *\nCrawl-delay: 1e999").await;
    mount_page(&server, "/", r#"<html><body><a href="/next">Next</a></body></html>"#).await;
    mount_page(&server, "/next", "<html><body>Next</body></html>").await;

    let storage = create_storage();
    let run_id = queued_run(&storage, &format!("{}/", base), json!({}));

    let state = crawl_run(create_test_config(), storage.clone(), None, run_id)
        .await
        .unwrap();
    assert_eq!(state, RunState::Completed);
    assert_eq!(stored_urls(&storage, run_id).len(), 2);
}
