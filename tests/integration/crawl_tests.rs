//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end: fetch, save, discover, manifest and
//! the sanity gate.

use footbag_mirror::config::{CrawlSettings, Policy};
use footbag_mirror::crawler::{run_crawl, Coordinator};
use footbag_mirror::output::read_manifest;
use footbag_mirror::{ManifestRecord, MirrorError, Outcome};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates test settings writing into a temporary directory
fn create_test_settings(dir: &TempDir) -> CrawlSettings {
    CrawlSettings {
        mirror_root: dir.path().join("mirror_out"),
        out_dir: dir.path().join("out"),
        delay: Duration::from_millis(5), // Very short for testing
        timeout: Duration::from_secs(5),
        user_agent: "TestBot/1.0".to_string(),
    }
}

/// Host entry of a mock server as it appears in a canonical URL
/// (e.g. "127.0.0.1:12345" from "http://127.0.0.1:12345")
fn authority(server: &MockServer) -> String {
    server.uri().trim_start_matches("http://").to_string()
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html; charset=utf-8")
}

fn manifest(settings: &CrawlSettings) -> Vec<ManifestRecord> {
    read_manifest(&settings.manifest_path()).expect("Failed to read manifest")
}

#[tokio::test]
async fn test_full_crawl_single_host() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let host = authority(&mock_server);

    // Index page with relative, absolute, noisy and off-site references
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&format!(
            r#"<html><head><title>Home</title>
            <link rel="stylesheet" href="/style.css"></head><body>
            <a href="events/">Events</a>
            <a href="{}/events/?mode=edit">Edit events</a>
            <img src="/img/logo.gif">
            <a href="http://evil.example.com/x">Elsewhere</a>
            </body></html>"#,
            base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/events/"))
        .respond_with(html(
            r#"<html><body><a href="show/12">Worlds</a><a href="/">Home</a></body></html>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/events/show/12/"))
        .respond_with(html("<html><body>Worlds 2004</body></html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/img/logo.gif"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"GIF89a".to_vec(), "image/gif"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/style.css"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("body{}", "text/css"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let settings = create_test_settings(&temp_dir);
    let policy = Policy::new([host.clone()], ["/"]);

    let report = run_crawl(policy, settings.clone(), [format!("{}/", base_url)])
        .await
        .expect("Crawl failed");

    assert_eq!(report.attempts, 5);
    assert_eq!(report.counters.saved_files, 5);
    assert_eq!(report.counters.saved_html, 3);
    assert_eq!(report.http_failures, 0);
    assert_eq!(report.errors, 0);

    // Breadth-first order: links of a page are queued in sorted order
    let records = manifest(&settings);
    let visited: Vec<(String, u32)> = records
        .iter()
        .map(|r| (r.url.trim_start_matches(&base_url).to_string(), r.depth))
        .collect();
    assert_eq!(
        visited,
        vec![
            ("/".to_string(), 0),
            ("/events/".to_string(), 1),
            ("/img/logo.gif".to_string(), 1),
            ("/style.css".to_string(), 1),
            ("/events/show/12/".to_string(), 2),
        ]
    );
    assert!(records.iter().all(|r| r.outcome == Outcome::Saved));
    assert!(records.iter().all(|r| !r.url.contains("evil.example.com")));

    // Files land under <root>/<host>/
    let host_dir = settings.mirror_root.join(&host);
    assert!(host_dir.join("index.html").is_file());
    assert!(host_dir.join("events/index.html").is_file());
    assert!(host_dir.join("events/show/12/index.html").is_file());
    assert!(host_dir.join("style.css").is_file());
    assert_eq!(fs::read(host_dir.join("img/logo.gif")).unwrap(), b"GIF89a");

    // Saved paths in the manifest are relative to the mirror root
    assert_eq!(
        records[0].path.as_deref(),
        Some(format!("{}/index.html", host).as_str())
    );

    let summary = fs::read_to_string(settings.sanity_path()).unwrap();
    assert!(summary.starts_with("saved_files=5\nsaved_html=3\n"));
}

#[tokio::test]
async fn test_directory_resource_layout() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let host = authority(&mock_server);

    Mock::given(method("GET"))
        .and(path("/events/show/12/"))
        .respond_with(html(
            r#"<html><body><a href="/members/show/40">Member</a></body></html>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Outside the allowed prefixes
    Mock::given(method("GET"))
        .and(path("/members/show/40/"))
        .respond_with(html("<html></html>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let settings = create_test_settings(&temp_dir);
    let policy = Policy::new([host.clone()], ["/events"]);

    run_crawl(
        policy,
        settings.clone(),
        [format!("{}/events/show/12", base_url)],
    )
    .await
    .expect("Crawl failed");

    let records = manifest(&settings);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, format!("{}/events/show/12/", base_url));
    assert_eq!(records[0].depth, 0);
    assert_eq!(records[0].status, Some(200));
    assert_eq!(
        records[0].path.as_deref(),
        Some(format!("{}/events/show/12/index.html", host).as_str())
    );
    assert!(settings
        .mirror_root
        .join(&host)
        .join("events/show/12/index.html")
        .is_file());
}

#[tokio::test]
async fn test_http_failure_is_recorded_and_not_saved() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let host = authority(&mock_server);

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><body><a href="/missing.html">Gone</a><a href="/broken/">Broken</a></body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing.html"))
        .respond_with(ResponseTemplate::new(404).set_body_raw("<h1>Not Found</h1>", "text/html"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/broken/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let settings = create_test_settings(&temp_dir);
    let policy = Policy::new([host.clone()], ["/"]);

    let report = run_crawl(policy, settings.clone(), [base_url.clone()])
        .await
        .expect("Crawl failed");

    assert_eq!(report.attempts, 3);
    assert_eq!(report.http_failures, 2);
    assert_eq!(report.counters.saved_files, 1);

    let records = manifest(&settings);
    let missing = records
        .iter()
        .find(|r| r.url.ends_with("/missing.html"))
        .expect("missing.html not in manifest");
    assert_eq!(missing.outcome, Outcome::HttpFail);
    assert_eq!(missing.status, Some(404));
    assert_eq!(missing.path, None);
    assert_eq!(missing.error, None);

    let broken = records.iter().find(|r| r.url.ends_with("/broken/")).unwrap();
    assert_eq!(broken.outcome, Outcome::HttpFail);
    assert_eq!(broken.status, Some(500));

    let host_dir = settings.mirror_root.join(&host);
    assert!(!host_dir.join("missing.html").exists());
    assert!(!host_dir.join("broken").exists());
}

#[tokio::test]
async fn test_network_error_is_recorded() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let host = authority(&mock_server);

    // Bind then drop a listener so the port is very likely closed
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let closed = format!("127.0.0.1:{}", listener.local_addr().unwrap().port());
    drop(listener);

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<html><body>Home</body></html>"))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let settings = create_test_settings(&temp_dir);
    let policy = Policy::new([host, closed.clone()], ["/"]);

    let report = run_crawl(
        policy,
        settings.clone(),
        [format!("http://{}/", closed), format!("{}/", base_url)],
    )
    .await
    .expect("Crawl failed");

    assert_eq!(report.attempts, 2);
    assert_eq!(report.errors, 1);

    let records = manifest(&settings);
    assert_eq!(records[0].outcome, Outcome::Error);
    assert_eq!(records[0].status, None);
    assert!(records[0].error.as_deref().is_some_and(|e| !e.is_empty()));

    // The failure did not stop the crawl
    assert_eq!(records[1].outcome, Outcome::Saved);
}

#[tokio::test]
async fn test_out_of_scope_seeds_fail_sanity() {
    let temp_dir = TempDir::new().unwrap();
    let settings = create_test_settings(&temp_dir);
    let policy = Policy::new(["www.footbag.org"], ["/events"]);

    let result = run_crawl(
        policy,
        settings.clone(),
        [
            "http://www.footbag.org/members/",
            "http://evil.example.com/events/",
        ],
    )
    .await;

    match result {
        Err(MirrorError::SanityViolation {
            saved_files,
            saved_html,
        }) => {
            assert_eq!(saved_files, 0);
            assert_eq!(saved_html, 0);
        }
        other => panic!("expected sanity violation, got {:?}", other),
    }

    assert!(manifest(&settings).is_empty());
    assert_eq!(
        fs::read_to_string(settings.sanity_path()).unwrap(),
        "saved_files=0\nsaved_html=0\nbytes_saved=0\n"
    );
}

#[tokio::test]
async fn test_no_html_saved_fails_sanity() {
    let mock_server = MockServer::start().await;
    let host = authority(&mock_server);

    Mock::given(method("GET"))
        .and(path("/logo.gif"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"GIF89a".to_vec(), "image/gif"))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let settings = create_test_settings(&temp_dir);
    let policy = Policy::new([host], ["/"]);

    let result = run_crawl(
        policy,
        settings.clone(),
        [format!("{}/logo.gif", mock_server.uri())],
    )
    .await;

    assert!(matches!(
        result,
        Err(MirrorError::SanityViolation {
            saved_files: 1,
            saved_html: 0
        })
    ));
    // The file itself is still kept and recorded
    assert_eq!(manifest(&settings).len(), 1);
}

#[tokio::test]
async fn test_out_of_scope_redirect_not_followed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let host = authority(&mock_server);

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><body><a href="/old/">Old</a><a href="/moved/">Moved</a></body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/old/"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", "http://evil.example.com/"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    // In-scope redirect is followed; links resolve against the target
    Mock::given(method("GET"))
        .and(path("/moved/"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/archive/"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/archive/"))
        .respond_with(html(r#"<html><body><a href="page.html">Page</a></body></html>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/archive/page.html"))
        .respond_with(html("<html><body>Page</body></html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let settings = create_test_settings(&temp_dir);
    let policy = Policy::new([host.clone()], ["/"]);

    run_crawl(policy, settings.clone(), [base_url.clone()])
        .await
        .expect("Crawl failed");

    let records = manifest(&settings);

    let old = records.iter().find(|r| r.url.ends_with("/old/")).unwrap();
    assert_eq!(old.outcome, Outcome::HttpFail);
    assert_eq!(old.status, Some(301));
    assert!(records.iter().all(|r| !r.url.contains("evil.example.com")));

    // Saved under the requested URL, not the redirect target
    let moved = records.iter().find(|r| r.url.ends_with("/moved/")).unwrap();
    assert_eq!(moved.outcome, Outcome::Saved);
    assert_eq!(
        moved.path.as_deref(),
        Some(format!("{}/moved/index.html", host).as_str())
    );
    assert!(records
        .iter()
        .any(|r| r.url.ends_with("/archive/page.html") && r.outcome == Outcome::Saved));
}

#[tokio::test]
async fn test_shared_link_fetched_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let host = authority(&mock_server);

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><body><a href="/a.html">A</a><a href="/b.html">B</a></body></html>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    for page in ["/a.html", "/b.html"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(html(
                r#"<html><body>
                <a href="/shared.html">Shared</a>
                <a href="/shared.html?cachebust=123">Shared again</a>
                <a href="/">Home</a>
                </body></html>"#,
            ))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    // Wiremock verifies the expectation when the server drops
    Mock::given(method("GET"))
        .and(path("/shared.html"))
        .respond_with(html("<html><body>Shared</body></html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let settings = create_test_settings(&temp_dir);
    let policy = Policy::new([host], ["/"]);

    let mut coordinator = Coordinator::new(policy, settings.clone()).unwrap();
    assert_eq!(coordinator.seed([base_url.clone(), format!("{}/", base_url)]), 1);

    let report = coordinator.run().await.expect("Crawl failed");

    assert_eq!(report.attempts, 4);
    assert_eq!(report.discovered, 4);
    assert_eq!(coordinator.manifest_records(), 4);
    assert_eq!(coordinator.frontier().pops(), 4);

    let records = manifest(&settings);
    assert_eq!(records.len(), 4);
    let shared: Vec<_> = records
        .iter()
        .filter(|r| r.url.contains("/shared.html"))
        .collect();
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].depth, 2);
}

#[tokio::test]
async fn test_manifest_appends_across_runs() {
    let mock_server = MockServer::start().await;
    let host = authority(&mock_server);

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<html><body>Home</body></html>"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let settings = create_test_settings(&temp_dir);

    for _ in 0..2 {
        let policy = Policy::new([host.clone()], ["/"]);
        run_crawl(policy, settings.clone(), [mock_server.uri()])
            .await
            .expect("Crawl failed");
    }

    // Earlier records are never rewritten
    let records = manifest(&settings);
    assert_eq!(records.len(), 2);
    assert!(records[0].ts <= records[1].ts);
    assert_eq!(records[0].url, records[1].url);
}
