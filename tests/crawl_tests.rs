//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock forum servers and run
//! enumeration and word-count retrieval end-to-end.

use si_census::config::{Config, CrawlerConfig, IndexPageConfig, SiteConfig, UserAgentConfig};
use si_census::crawler::{build_http_client, Coordinator, RetryPolicy, ThrottleWindow, WordCountFetcher};
use si_census::runs::{export_snapshot, run_site};
use si_census::site::{SiteKind, SiteProfile, WORD_COUNT_NOT_FOUND};
use si_census::{CensusError, Thread};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client() -> reqwest::Client {
    build_http_client(&UserAgentConfig::default(), &CrawlerConfig::default())
        .expect("Failed to build HTTP client")
}

/// Sufficient Velocity profile pointed at the mock server, no cooldown
fn test_profile(server: &MockServer) -> SiteProfile {
    let mut profile = SiteProfile::sufficient_velocity();
    profile.base_url = format!("{}/threads/archive.1", server.uri());
    profile.rate_limit_cooldown = Duration::from_millis(10);
    profile
}

fn stats_page(word_count: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(format!(
        "<html><body><h1>Threadmarks</h1><p>Statistics ({} words)</p></body></html>",
        word_count
    ))
}

fn index_page(server: &MockServer) -> String {
    let uri = server.uri();
    format!(
        r#"<html><body>
        <a href="{uri}/threads/rules-terms-of-service">Rules</a>
        <a href="{uri}/threads/before.0">Before Start (Naruto SI)</a>
        <a href="{uri}/threads/first.1">First Story (Worm SI)</a>
        <a href="/threads/relative.2">Relative Link</a>
        <a href="{uri}/threads/second.3">Second Story (Star Wars SI)</a>
        <a href="{uri}/threads/after.4">After End</a>
        </body></html>"#
    )
}

#[tokio::test]
async fn test_enumerate_index_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/threads/archive.1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(index_page(&mock_server)))
        .mount(&mock_server)
        .await;

    let profile = test_profile(&mock_server);
    let coordinator = Coordinator::new(
        test_client(),
        profile.clone(),
        Default::default(),
        ThrottleWindow::default(),
        RetryPolicy::default(),
    );

    let carried = vec![Thread::new("Earlier", "https://example.com/t.0")];
    let threads = coordinator
        .enumerate(
            &profile.base_url,
            "Before Start (Naruto SI)",
            "Second Story (Star Wars SI)",
            carried,
        )
        .await
        .expect("Enumeration failed");

    let names: Vec<&str> = threads.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Earlier", "First Story (Worm SI)", "Second Story (Star Wars SI)"]
    );
    assert!(threads.iter().all(|t| t.word_count == "-1"));
}

#[tokio::test]
async fn test_enumerate_index_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let profile = test_profile(&mock_server);
    let coordinator = Coordinator::new(
        test_client(),
        profile.clone(),
        Default::default(),
        ThrottleWindow::default(),
        RetryPolicy::default(),
    );

    let result = coordinator
        .enumerate(&profile.base_url, "a", "b", Vec::new())
        .await;
    assert!(matches!(
        result,
        Err(CensusError::IndexStatus { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_throttled_request_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/threads/story.1/threadmarks"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/threads/story.1/threadmarks"))
        .respond_with(stats_page("8 threadmarks, 24k"))
        .mount(&mock_server)
        .await;

    let mut fetcher = WordCountFetcher::new(
        test_client(),
        test_profile(&mock_server),
        ThrottleWindow::Accumulate,
        RetryPolicy::unbounded(),
    );

    let thread = Thread::new("Story", format!("{}/threads/story.1/", mock_server.uri()));
    let word_count = fetcher.fetch(&thread, 1, 1).await.expect("Fetch failed");

    assert_eq!(word_count, "8 threadmarks, 24k");
    assert!(fetcher.estimator().is_throttled());
    assert_eq!(fetcher.estimator().samples().len(), 2);
}

#[tokio::test]
async fn test_throttle_limit_gives_up() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&mock_server)
        .await;

    let mut fetcher = WordCountFetcher::new(
        test_client(),
        test_profile(&mock_server),
        ThrottleWindow::Accumulate,
        RetryPolicy::bounded(2),
    );

    let thread = Thread::new("Story", format!("{}/threads/story.1", mock_server.uri()));
    let result = fetcher.fetch(&thread, 1, 1).await;

    assert!(matches!(
        result,
        Err(CensusError::ThrottleLimit { retries: 2, .. })
    ));
}

#[tokio::test]
async fn test_error_page_is_reported_with_excerpt() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><body><h2>Oops! We ran into some problems.</h2>\
             <p>You do not have permission to view this page.</p></body></html>",
        ))
        .mount(&mock_server)
        .await;

    let mut fetcher = WordCountFetcher::new(
        test_client(),
        test_profile(&mock_server),
        ThrottleWindow::Accumulate,
        RetryPolicy::unbounded(),
    );

    let thread = Thread::new("Story", format!("{}/threads/story.1", mock_server.uri()));
    match fetcher.fetch(&thread, 1, 1).await {
        Err(CensusError::SiteError { status, excerpt, .. }) => {
            assert_eq!(status, 200);
            assert!(excerpt.contains("permission to view"));
        }
        other => panic!("Expected SiteError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_statistics_gives_sentinel() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><p>No threadmarks yet</p></body></html>"),
        )
        .mount(&mock_server)
        .await;

    let mut fetcher = WordCountFetcher::new(
        test_client(),
        test_profile(&mock_server),
        ThrottleWindow::Accumulate,
        RetryPolicy::unbounded(),
    );

    let thread = Thread::new("Story", format!("{}/threads/story.1", mock_server.uri()));
    let word_count = fetcher.fetch(&thread, 1, 1).await.expect("Fetch failed");
    assert_eq!(word_count, WORD_COUNT_NOT_FOUND);
}

#[tokio::test]
async fn test_failed_thread_does_not_stop_crawl() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/threads/gone.1/threadmarks"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/threads/here.2/threadmarks"))
        .respond_with(stats_page("3 threadmarks, 12,345"))
        .mount(&mock_server)
        .await;

    let mut coordinator = Coordinator::new(
        test_client(),
        test_profile(&mock_server),
        Default::default(),
        ThrottleWindow::default(),
        RetryPolicy::default(),
    );

    let uri = mock_server.uri();
    let mut threads = vec![
        Thread::new("Gone\n(Worm SI)", format!("{}/threads/gone.1", uri)),
        Thread::new("Here (Naruto SI)", format!("{}/threads/here.2", uri)),
    ];

    let report = coordinator.retrieve_word_counts(&mut threads).await;

    assert_eq!(report.total, 2);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].url.ends_with("/threads/gone.1"));

    assert_eq!(threads[0].name, "Gone(Worm SI)");
    assert_eq!(threads[0].word_count, "-1");
    assert_eq!(threads[1].word_count, "3 threadmarks, 12,345");
}

#[tokio::test]
async fn test_run_site_writes_output_and_snapshot() {
    let mock_server = MockServer::start().await;
    let uri = mock_server.uri();
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

    Mock::given(method("GET"))
        .and(path("/threads/archive.1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(index_page(&mock_server)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/threads/archive.1/page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<html><body>
            <a href="{uri}/threads/p2-start.5">Page Two Start</a>
            <a href="{uri}/threads/third.6">Third | Story (Bleach SI)</a>
            </body></html>"#
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/threads/first.1/threadmarks"))
        .respond_with(stats_page("8 threadmarks, 24k"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/threads/second.3/threadmarks"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/threads/third.6/threadmarks"))
        .respond_with(stats_page("1 threadmarks, 2.1k"))
        .mount(&mock_server)
        .await;

    let mut config = Config::default();
    config.crawler.output_dir = temp_dir.path().join("out");
    config.sufficient_velocity = SiteConfig {
        base_url: Some(format!("{}/threads/archive.1", uri)),
        cooldown_secs: Some(0),
        snapshot: Some(true),
        pages: Some(vec![
            IndexPageConfig {
                path: String::new(),
                start: "Before Start (Naruto SI)".to_string(),
                end: "Second Story (Star Wars SI)".to_string(),
            },
            IndexPageConfig {
                path: "/page-2".to_string(),
                start: "Page Two Start".to_string(),
                end: "Third  Story (Bleach SI)".to_string(),
            },
        ]),
        ..SiteConfig::default()
    };

    let summary = run_site(&config, SiteKind::SufficientVelocity)
        .await
        .expect("Run failed");

    assert_eq!(summary.report.total, 3);
    assert_eq!(summary.report.failures.len(), 1);

    let file_name = summary
        .output_path
        .file_name()
        .and_then(|n| n.to_str())
        .expect("Output path has no file name");
    assert!(file_name.starts_with("sv-output-"));
    assert!(file_name.ends_with(".csv"));

    let output = std::fs::read_to_string(&summary.output_path).expect("Failed to read output");
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(
        lines,
        vec![
            format!("First Story (Worm SI)|{}/threads/first.1|8 threadmarks, 24k", uri),
            format!("Second Story (Star Wars SI)|{}/threads/second.3|-1", uri),
            format!("Third  Story (Bleach SI)|{}/threads/third.6|1 threadmarks, 2.1k", uri),
        ]
    );

    let snapshot = summary.snapshot_path.expect("Snapshot not written");
    let exported = temp_dir.path().join("exported.csv");
    let count = export_snapshot(&snapshot, &exported).expect("Export failed");
    assert_eq!(count, 3);
    assert_eq!(
        std::fs::read_to_string(&exported).expect("Failed to read export"),
        output
    );
}

#[tokio::test]
async fn test_run_site_aborts_when_index_unreachable() {
    let mock_server = MockServer::start().await;
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let mut config = Config::default();
    config.crawler.output_dir = temp_dir.path().to_path_buf();
    config.questionable_questing.base_url = Some(format!("{}/threads/archive.1", mock_server.uri()));

    let result = run_site(&config, SiteKind::QuestionableQuesting).await;
    assert!(matches!(result, Err(CensusError::IndexStatus { .. })));

    let written = std::fs::read_dir(temp_dir.path())
        .expect("Failed to list temp dir")
        .count();
    assert_eq!(written, 0);
}

#[tokio::test]
async fn test_run_site_rejects_unusable_output_dir_before_crawling() {
    let mock_server = MockServer::start().await;
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let blocker = temp_dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").expect("Failed to write blocker file");

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(index_page(&mock_server)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = Config::default();
    config.crawler.output_dir = blocker.join("out");
    config.questionable_questing.base_url = Some(format!("{}/threads/archive.1", mock_server.uri()));

    let result = run_site(&config, SiteKind::QuestionableQuesting).await;
    assert!(matches!(result, Err(CensusError::Io(_))));
}

#[tokio::test]
async fn test_run_site_questionable_questing_threadmark_summary() {
    let mock_server = MockServer::start().await;
    let uri = mock_server.uri();
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

    Mock::given(method("GET"))
        .and(path("/threads/archive.1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(index_page(&mock_server)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/threads/first.1/threadmarks"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><body><h1>Threadmarks</h1><dl><dt>Statistics</dt>\
             <dd>\t\t7 threadmarks, Word Count: 4.9k</dd></dl></body></html>",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = Config::default();
    config.crawler.output_dir = temp_dir.path().to_path_buf();
    config.questionable_questing = SiteConfig {
        base_url: Some(format!("{}/threads/archive.1", uri)),
        cooldown_secs: Some(0),
        pages: Some(vec![IndexPageConfig {
            path: String::new(),
            start: "Before Start (Naruto SI)".to_string(),
            end: "First Story (Worm SI)".to_string(),
        }]),
        ..SiteConfig::default()
    };

    let summary = run_site(&config, SiteKind::QuestionableQuesting)
        .await
        .expect("Run failed");

    assert_eq!(summary.report.succeeded, 1);
    assert!(summary.snapshot_path.is_none());

    let file_name = summary
        .output_path
        .file_name()
        .and_then(|n| n.to_str())
        .expect("Output path has no file name");
    assert!(file_name.starts_with("qq-output-"));

    let output = std::fs::read_to_string(&summary.output_path).expect("Failed to read output");
    assert_eq!(
        output,
        format!(
            "First Story (Worm SI)|{}/threads/first.1|7 threadmarks, 4.9k\n",
            uri
        )
    );
}
