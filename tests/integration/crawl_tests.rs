//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle end-to-end against temporary export directories.

use scope_harvest::config::{resolve_config, CliOverrides, FileConfig, OutputConfig, RunMode};
use scope_harvest::crawler::{run_with, run_with_shutdown, HtmlLinkExtractor, HttpFetcher};
use scope_harvest::{CrawlConfig, TaskState};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMESTAMP: &str = "2024-01-01_12-00-00";

/// Creates a test configuration rooted at the mock server
fn create_test_config(base_url: &str, export_dir: &Path, cli: CliOverrides) -> CrawlConfig {
    let file = FileConfig {
        output: Some(OutputConfig {
            export_dir: export_dir.to_path_buf(),
        }),
        ..FileConfig::default()
    };
    let cli = CliOverrides {
        start_url: Some(format!("{}/", base_url)),
        ..cli
    };
    resolve_config(file, cli, None).expect("valid test config")
}

async fn mount_html(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_file(server: &MockServer, route: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body.to_vec())
                .insert_header("content-type", "application/pdf"),
        )
        .mount(server)
        .await;
}

fn file_names(dir: &Path) -> BTreeSet<String> {
    fs::read_dir(dir)
        .expect("readable dir")
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect()
}

fn host_prefix(base_url: &str) -> String {
    let url = url::Url::parse(base_url).unwrap();
    format!("{}_{}", url.host_str().unwrap(), url.port().unwrap())
}

/// File names listed in a report's download-target table
fn report_file_names(report: &str) -> BTreeSet<String> {
    report
        .split("## Download Targets")
        .nth(1)
        .expect("target section")
        .lines()
        .filter(|l| l.starts_with("| ") && !l.starts_with("| # "))
        .map(|l| l.split('|').nth(3).unwrap().trim().to_string())
        .collect()
}

async fn crawl(config: CrawlConfig) -> scope_harvest::RunSummary {
    let fetcher = HttpFetcher::from_config(&config.user_agent, &config.fetch).unwrap();
    run_with(config, fetcher, HtmlLinkExtractor, TIMESTAMP)
        .await
        .expect("crawl succeeds")
}

#[tokio::test]
async fn test_full_run_writes_flat_files_with_collision_suffixes() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        r#"<html><body>
            <a href="/docs/report.pdf">Report</a>
            <a href="/docs/report.pdf?v=2">Report v2</a>
            <a href="/about">About</a>
            <a href="/archive.zip">Archive</a>
        </body></html>"#,
    )
    .await;
    mount_file(&mock_server, "/docs/report.pdf", b"%PDF-1.4 report").await;
    mount_html(&mock_server, "/about", "<html><body>About</body></html>").await;
    mount_file(&mock_server, "/archive.zip", b"PK").await;

    let export = TempDir::new().unwrap();
    let cli = CliOverrides {
        max_depth: Some(1),
        file_types: Some("pdf".to_string()),
        run_mode: Some(RunMode::FullRun),
        ..CliOverrides::default()
    };
    let config = create_test_config(&base_url, export.path(), cli);

    let summary = crawl(config).await;

    let run_dir = export.path().join(TIMESTAMP);
    assert_eq!(summary.artifact, run_dir);
    assert_eq!(summary.files_written, 2);
    assert_eq!(summary.failures, 0);
    assert_eq!(summary.records.len(), 5);

    let prefix = host_prefix(&base_url);
    let expected: BTreeSet<String> = [
        format!("{}_docs_report.pdf", prefix),
        format!("{}_docs_report_1.pdf", prefix),
    ]
    .into_iter()
    .collect();
    assert_eq!(file_names(&run_dir), expected);

    let content = fs::read(run_dir.join(format!("{}_docs_report.pdf", prefix))).unwrap();
    assert_eq!(content, b"%PDF-1.4 report");

    // Only the run directory exists under the export root
    assert_eq!(file_names(export.path()), [TIMESTAMP.to_string()].into_iter().collect());
}

#[tokio::test]
async fn test_dry_run_writes_only_the_report() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        r#"<a href="/a.pdf">A</a><a href="/b.pdf">B</a><a href="/page.html">Page</a>"#,
    )
    .await;
    mount_file(&mock_server, "/a.pdf", b"%PDF a").await;
    mount_file(&mock_server, "/b.pdf", b"%PDF b").await;
    mount_html(&mock_server, "/page.html", "<p>no links</p>").await;

    let export = TempDir::new().unwrap();
    let cli = CliOverrides {
        max_depth: Some(1),
        file_types: Some("pdf".to_string()),
        run_mode: Some(RunMode::DryRun),
        ..CliOverrides::default()
    };
    let config = create_test_config(&base_url, export.path(), cli);

    let summary = crawl(config).await;

    let report_name = format!("dry_run_{}.md", TIMESTAMP);
    assert_eq!(summary.artifact, export.path().join(&report_name));
    assert_eq!(summary.files_written, 0);
    assert_eq!(file_names(export.path()), [report_name].into_iter().collect());

    let report = fs::read_to_string(&summary.artifact).unwrap();
    let prefix = host_prefix(&base_url);
    assert!(report.contains("## Download Targets"));
    assert!(report.contains(&format!("{}_a.pdf", prefix)));
    assert!(report.contains(&format!("{}_b.pdf", prefix)));
    assert!(!report.contains(&format!("{}_page.html", prefix)));
    assert!(report.contains("- **Run Mode**: dry_run"));
}

#[tokio::test]
async fn test_blocked_paths_are_never_requested() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        r#"<a href="/blog/post1">Post</a><a href="/docs/guide.html">Guide</a>"#,
    )
    .await;
    mount_html(&mock_server, "/docs/guide.html", r#"<a href="/blog/post2">Post 2</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/blog/post1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blog/post2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let export = TempDir::new().unwrap();
    let cli = CliOverrides {
        max_depth: Some(3),
        blocked_paths: Some(vec![format!("{}/blog", base_url)]),
        ..CliOverrides::default()
    };
    let config = create_test_config(&base_url, export.path(), cli);

    let summary = crawl(config).await;

    assert_eq!(summary.records.len(), 2);
    assert!(summary.records.iter().all(|r| !r.url.path().starts_with("/blog")));
    mock_server.verify().await;
}

#[tokio::test]
async fn test_depth_limit_stops_expansion() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(&mock_server, "/", r#"<a href="/level1">L1</a>"#).await;
    mount_html(&mock_server, "/level1", r#"<a href="/level2">L2</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/level2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let export = TempDir::new().unwrap();
    let cli = CliOverrides {
        max_depth: Some(1),
        ..CliOverrides::default()
    };
    let config = create_test_config(&base_url, export.path(), cli);

    let summary = crawl(config).await;

    assert_eq!(summary.records.len(), 2);
    assert!(summary.records.iter().all(|r| r.depth <= 1));
    let level1 = summary
        .records
        .iter()
        .find(|r| r.url.path() == "/level1")
        .unwrap();
    assert_eq!(level1.state, TaskState::Terminal);
    mock_server.verify().await;
}

#[tokio::test]
async fn test_dry_run_errors_inlines_failures() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        r#"<a href="/missing.html">Missing</a><a href="/ok.html">Ok</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing.html"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    mount_html(&mock_server, "/ok.html", "<p>ok</p>").await;

    let export = TempDir::new().unwrap();
    let cli = CliOverrides {
        max_depth: Some(1),
        run_mode: Some(RunMode::DryRunErrors),
        ..CliOverrides::default()
    };
    let config = create_test_config(&base_url, export.path(), cli);

    let summary = crawl(config).await;

    assert_eq!(summary.failures, 1);
    let report = fs::read_to_string(&summary.artifact).unwrap();
    assert!(report.contains(&format!("{}/missing.html [Error: HTTP 404]", base_url)));
    assert!(report.contains(&format!("{}/ok.html [Page]", base_url)));
}

#[tokio::test]
async fn test_plain_dry_run_hides_failures_in_tree() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(&mock_server, "/", r#"<a href="/missing.html">Missing</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/missing.html"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let export = TempDir::new().unwrap();
    let cli = CliOverrides {
        max_depth: Some(1),
        run_mode: Some(RunMode::DryRun),
        ..CliOverrides::default()
    };
    let config = create_test_config(&base_url, export.path(), cli);

    let summary = crawl(config).await;

    assert_eq!(summary.failures, 1);
    let report = fs::read_to_string(&summary.artifact).unwrap();
    assert!(!report.contains("[Error:"));
}

#[tokio::test]
async fn test_dry_run_targets_match_full_run_files() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        r#"<a href="/docs/report.pdf">Report</a>
           <a href="/docs/report.pdf?v=2">Report v2</a>
           <a href="/old.pdf">Moved</a>
           <a href="/new.pdf">New</a>
           <a href="/page.html">Page</a>"#,
    )
    .await;
    mount_file(&mock_server, "/docs/report.pdf", b"%PDF report").await;
    mount_file(&mock_server, "/new.pdf", b"%PDF new").await;
    mount_html(&mock_server, "/page.html", "<p>page</p>").await;
    Mock::given(method("GET"))
        .and(path("/old.pdf"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/new.pdf"))
        .mount(&mock_server)
        .await;

    let cli = |mode| CliOverrides {
        max_depth: Some(1),
        file_types: Some("pdf".to_string()),
        run_mode: Some(mode),
        ..CliOverrides::default()
    };

    let dry_export = TempDir::new().unwrap();
    let dry = crawl(create_test_config(&base_url, dry_export.path(), cli(RunMode::DryRun))).await;
    let listed = report_file_names(&fs::read_to_string(&dry.artifact).unwrap());

    let full_export = TempDir::new().unwrap();
    let full = crawl(create_test_config(&base_url, full_export.path(), cli(RunMode::FullRun))).await;
    let written = file_names(&full.artifact);

    let prefix = host_prefix(&base_url);
    let expected: BTreeSet<String> = [
        format!("{}_docs_report.pdf", prefix),
        format!("{}_docs_report_1.pdf", prefix),
        format!("{}_new.pdf", prefix),
    ]
    .into_iter()
    .collect();
    assert_eq!(written, expected);
    assert_eq!(listed, written);
    assert_eq!(full.files_written, 3);
}

#[tokio::test]
async fn test_interrupted_dry_run_still_writes_report() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        r#"<a href="/a.pdf">A</a><a href="/slow.html">Slow</a>"#,
    )
    .await;
    mount_file(&mock_server, "/a.pdf", b"%PDF a").await;
    Mock::given(method("GET"))
        .and(path("/slow.html"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&mock_server)
        .await;

    let export = TempDir::new().unwrap();
    let cli = CliOverrides {
        max_depth: Some(1),
        file_types: Some("pdf".to_string()),
        run_mode: Some(RunMode::DryRun),
        ..CliOverrides::default()
    };
    let config = create_test_config(&base_url, export.path(), cli);
    let fetcher = HttpFetcher::from_config(&config.user_agent, &config.fetch).unwrap();

    let summary = run_with_shutdown(
        config,
        fetcher,
        HtmlLinkExtractor,
        TIMESTAMP,
        tokio::time::sleep(Duration::from_millis(500)),
    )
    .await
    .expect("interrupted crawl still succeeds");

    assert!(summary.interrupted);
    assert_eq!(summary.records.len(), 2);

    let report = fs::read_to_string(&summary.artifact).unwrap();
    assert!(report.contains("- **Status**: interrupted, partial results"));
    assert!(report.contains(&format!("{}_a.pdf", host_prefix(&base_url))));
    assert!(!report.contains("slow.html"));
}
