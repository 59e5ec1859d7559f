//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small archive (listing pages and
//! articles) and run full crawls against it end-to-end.

use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wirecrawl::config::{Config, PipelineMode};
use wirecrawl::crawler::{crawl_category, Coordinator, Termination};
use wirecrawl::state::{NoProgress, ProgressState};
use wirecrawl::storage::StorageError;
use wirecrawl::{ArticleLayout, Category, WirecrawlError};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_AGENT: &str = "WirecrawlTest/1.0";

/// Creates a test configuration pointed at the mock server
fn create_test_config(base_url: &str, dir: &Path) -> Config {
    let mut config = Config::default();
    config.site.base_url = base_url.to_string();
    config.crawler.concurrency_limit = 4;
    config.crawler.request_timeout_secs = 5;
    config.crawler.connect_timeout_secs = 5;
    config.user_agent.pool = vec![TEST_AGENT.to_string()];
    config.output.url_dir = dir.join("urls").to_string_lossy().into_owned();
    config.output.record_dir = dir.join("records").to_string_lossy().into_owned();
    config
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

fn listing(hrefs: &[&str]) -> String {
    let stories: String = hrefs
        .iter()
        .map(|href| {
            format!(
                r#"<article class="story"><div class="story-content"><a href="{}"><h3>Headline</h3></a></div></article>"#,
                href
            )
        })
        .collect();
    format!("<html><body><div class=\"news-headline-list\">{}</div></body></html>", stories)
}

fn article(title: Option<&str>, category: Option<&str>, paragraphs: &[&str]) -> String {
    let title = title.map(|t| format!("<h1>{}</h1>", t)).unwrap_or_default();
    let category = category
        .map(|c| format!(r#"<div class="ArticleHeader-info-container-3-6YG"><a href="/news">{}</a></div>"#, c))
        .unwrap_or_default();
    let paragraphs: String = paragraphs.iter().map(|p| format!("<p>{}</p>", p)).collect();
    format!(
        r#"<html><head><meta name="REVISION_DATE" content="Mon Mar 02 10:15:00 UTC 2020"></head>
        <body>{}{}<div class="StandardArticleBody_body">{}</div></body></html>"#,
        category, title, paragraphs
    )
}

async fn mount_listing(server: &MockServer, category: &str, page: u32, hrefs: &[&str]) {
    Mock::given(method("GET"))
        .and(path(format!("/news/archive/{}", category)))
        .and(query_param("view", "page"))
        .and(query_param("page", page.to_string()))
        .and(query_param("pageSize", "10"))
        .respond_with(html(listing(hrefs)))
        .mount(server)
        .await;
}

async fn mount_article(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

/// Archive with pages 1..=3 where page 3 repeats page 2, and four articles
/// of which `/article/c` has no headline
async fn mount_worldnews_archive(server: &MockServer) {
    mount_listing(server, "worldnews", 1, &["/article/a", "/article/b", "/article/c"]).await;
    mount_listing(server, "worldnews", 2, &["/article/c", "/article/d"]).await;
    mount_listing(server, "worldnews", 3, &["/article/c", "/article/d"]).await;

    Mock::given(method("GET"))
        .and(path("/news/archive/worldnews"))
        .and(query_param("page", "4"))
        .respond_with(html(listing(&["/article/z"])))
        .expect(0)
        .mount(server)
        .await;

    mount_article(server, "/article/a", article(Some("Alpha"), None, &["One. ", "Two."])).await;
    mount_article(server, "/article/b", article(Some("Bravo"), None, &["Three."])).await;
    mount_article(server, "/article/c", article(None, None, &["Untitled."])).await;
    mount_article(server, "/article/d", article(Some("Delta"), None, &[])).await;
}

fn sorted_titles(report: &wirecrawl::CrawlReport) -> Vec<String> {
    let mut titles: Vec<String> = report.records.iter().map(|r| r.title.clone()).collect();
    titles.sort();
    titles
}

#[tokio::test]
async fn test_rediscover_staged_crawl() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    mount_worldnews_archive(&server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, dir.path());
    let url_path = config.output.url_file("worldnews");
    let coordinator = Coordinator::new(config).unwrap();

    let reports = Mutex::new(Vec::new());
    let reporter = |state: ProgressState| reports.lock().unwrap().push(state);
    let report = coordinator
        .run(Category::WorldNews, true, &reporter)
        .await
        .unwrap();

    let discovery = report.discovery.as_ref().expect("discovery summary");
    assert_eq!(discovery.urls_found, 4);
    assert_eq!(discovery.pages_visited, 3);
    assert!(matches!(discovery.termination, Termination::Exhausted { page: 3 }));

    // The headline-less article is the only one missing
    assert_eq!(sorted_titles(&report), vec!["Alpha", "Bravo", "Delta"]);
    assert_eq!(report.parse_failures, 1);
    assert_eq!(report.fetch.submitted, 4);
    assert_eq!(report.fetch.succeeded, 4);
    assert!(!report.cancelled);

    let alpha = report.records.iter().find(|r| r.title == "Alpha").unwrap();
    assert_eq!(alpha.content, "One. Two.");
    assert_eq!(alpha.date, "Mon Mar 02 10:15:00 UTC 2020");
    assert_eq!(alpha.url, format!("{}/article/a", base_url));
    assert_eq!(alpha.category, None);

    let reports = reports.into_inner().unwrap();
    assert_eq!(reports.len(), 4);
    assert_eq!(reports.iter().filter(|s| s.is_done()).count(), 1);
    assert_eq!(reports.last(), Some(&ProgressState::new(4, 4)));

    let stored = fs::read_to_string(&url_path).unwrap();
    let expected: Vec<String> = ["a", "b", "c", "d"]
        .iter()
        .map(|id| format!("{}/article/{}", base_url, id))
        .collect();
    assert_eq!(stored.lines().collect::<Vec<_>>(), expected);
}

#[tokio::test]
async fn test_rediscovery_is_repeatable() {
    let server = MockServer::start().await;
    mount_worldnews_archive(&server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    let url_path = config.output.url_file("worldnews");
    let coordinator = Coordinator::new(config).unwrap();

    coordinator
        .run(Category::WorldNews, true, &NoProgress)
        .await
        .unwrap();
    let first = fs::read_to_string(&url_path).unwrap();

    coordinator
        .run(Category::WorldNews, true, &NoProgress)
        .await
        .unwrap();
    let second = fs::read_to_string(&url_path).unwrap();

    // The URL file is rewritten, not appended to
    assert_eq!(first, second);
    assert_eq!(second.lines().count(), 4);
}

#[tokio::test]
async fn test_streaming_pipeline() {
    let server = MockServer::start().await;
    mount_worldnews_archive(&server).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server.uri(), dir.path());
    config.crawler.pipeline = PipelineMode::Streaming;
    config.crawler.channel_capacity = 1;
    let url_path = config.output.url_file("worldnews");
    let coordinator = Coordinator::new(config).unwrap();

    let last = Mutex::new(None);
    let reporter = |state: ProgressState| *last.lock().unwrap() = Some(state);
    let report = coordinator
        .run(Category::WorldNews, true, &reporter)
        .await
        .unwrap();

    let discovery = report.discovery.as_ref().expect("discovery summary");
    assert_eq!(discovery.urls_found, 4);
    assert!(matches!(discovery.termination, Termination::Exhausted { page: 3 }));
    assert_eq!(sorted_titles(&report), vec!["Alpha", "Bravo", "Delta"]);
    assert_eq!(report.fetch.submitted, 4);
    assert_eq!(last.into_inner().unwrap(), Some(ProgressState::new(4, 4)));
    assert_eq!(fs::read_to_string(&url_path).unwrap().lines().count(), 4);
}

#[tokio::test]
async fn test_reuses_stored_urls() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    Mock::given(method("GET"))
        .and(path("/news/archive/businessnews"))
        .respond_with(html(listing(&[])))
        .expect(0)
        .mount(&server)
        .await;
    mount_article(&server, "/article/x", article(Some("Xray"), None, &["x"])).await;
    mount_article(&server, "/article/y", article(Some("Yankee"), None, &["y"])).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, dir.path());
    let url_path = config.output.url_file("businessnews");
    fs::create_dir_all(url_path.parent().unwrap()).unwrap();
    fs::write(
        &url_path,
        format!(
            "{base}/article/x\n\n  {base}/article/y  \n{base}/article/x\n",
            base = base_url
        ),
    )
    .unwrap();

    let coordinator = Coordinator::new(config).unwrap();
    let report = coordinator
        .run(Category::BusinessNews, false, &NoProgress)
        .await
        .unwrap();

    assert!(report.discovery.is_none());
    assert_eq!(report.fetch.submitted, 2);
    assert_eq!(sorted_titles(&report), vec!["Xray", "Yankee"]);
}

#[tokio::test]
async fn test_missing_url_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config("http://127.0.0.1:9", dir.path());
    let coordinator = Coordinator::new(config).unwrap();

    let result = coordinator
        .run(Category::Japan, false, &NoProgress)
        .await;

    assert!(matches!(
        result,
        Err(WirecrawlError::Storage(StorageError::UrlFileMissing(_)))
    ));
}

#[tokio::test]
async fn test_listing_failure_keeps_earlier_urls() {
    let server = MockServer::start().await;
    mount_listing(&server, "technologynews", 1, &["/article/a", "/article/b"]).await;
    Mock::given(method("GET"))
        .and(path("/news/archive/technologynews"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_article(&server, "/article/a", article(Some("Alpha"), None, &["a"])).await;
    mount_article(&server, "/article/b", article(Some("Bravo"), None, &["b"])).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    let coordinator = Coordinator::new(config).unwrap();
    let report = coordinator
        .run(Category::TechnologyNews, true, &NoProgress)
        .await
        .unwrap();

    let discovery = report.discovery.as_ref().unwrap();
    assert_eq!(discovery.urls_found, 2);
    match &discovery.termination {
        Termination::Failed(error) => assert_eq!(error.page(), 2),
        other => panic!("unexpected termination: {:?}", other),
    }
    assert_eq!(sorted_titles(&report), vec!["Alpha", "Bravo"]);
}

#[tokio::test]
async fn test_article_failures_are_isolated() {
    let server = MockServer::start().await;
    mount_listing(&server, "sciencenews", 1, &["/article/ok", "/article/gone", "/article/pdf"]).await;
    mount_listing(&server, "sciencenews", 2, &["/article/ok"]).await;
    mount_article(&server, "/article/ok", article(Some("Survivor"), None, &["s"])).await;
    Mock::given(method("GET"))
        .and(path("/article/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/article/pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    let report = Coordinator::new(config)
        .unwrap()
        .run(Category::ScienceNews, true, &NoProgress)
        .await
        .unwrap();

    assert_eq!(report.fetch.submitted, 3);
    assert_eq!(report.fetch.succeeded, 1);
    assert_eq!(report.fetch.failed, 2);
    assert_eq!(sorted_titles(&report), vec!["Survivor"]);
}

#[tokio::test]
async fn test_categorized_layout() {
    let server = MockServer::start().await;
    mount_listing(&server, "europe-stocks", 1, &["/article/p", "/article/q"]).await;
    mount_listing(&server, "europe-stocks", 2, &["/article/q"]).await;
    mount_article(&server, "/article/p", article(Some("Papa"), Some("European Markets"), &["p"])).await;
    mount_article(&server, "/article/q", article(Some("Quebec"), None, &["q"])).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server.uri(), dir.path());
    config.crawler.layout = ArticleLayout::Categorized;
    let report = Coordinator::new(config)
        .unwrap()
        .run(Category::EuropeStocks, true, &NoProgress)
        .await
        .unwrap();

    assert_eq!(report.layout, ArticleLayout::Categorized);
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].title, "Papa");
    assert_eq!(report.records[0].category.as_deref(), Some("European Markets"));
    assert_eq!(report.parse_failures, 1);
}

#[tokio::test]
async fn test_every_request_carries_pool_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", TEST_AGENT))
        .and(path("/news/archive/medianews"))
        .and(query_param("page", "1"))
        .respond_with(html(listing(&["/article/m"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(header("user-agent", TEST_AGENT))
        .and(path("/news/archive/medianews"))
        .and(query_param("page", "2"))
        .respond_with(html(listing(&["/article/m"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(header("user-agent", TEST_AGENT))
        .and(path("/article/m"))
        .respond_with(html(article(Some("Mike"), None, &["m"])))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    let report = Coordinator::new(config)
        .unwrap()
        .run(Category::MediaNews, true, &NoProgress)
        .await
        .unwrap();

    assert_eq!(sorted_titles(&report), vec!["Mike"]);
}

#[tokio::test]
async fn test_page_limit_stops_discovery() {
    let server = MockServer::start().await;
    mount_listing(&server, "esgnews", 1, &["/article/1"]).await;
    mount_listing(&server, "esgnews", 2, &["/article/2"]).await;
    Mock::given(method("GET"))
        .and(path("/news/archive/esgnews"))
        .and(query_param("page", "3"))
        .respond_with(html(listing(&["/article/3"])))
        .expect(0)
        .mount(&server)
        .await;
    mount_article(&server, "/article/1", article(Some("One"), None, &[])).await;
    mount_article(&server, "/article/2", article(Some("Two"), None, &[])).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server.uri(), dir.path());
    config.site.max_pages = Some(2);
    let report = Coordinator::new(config)
        .unwrap()
        .run(Category::EsgNews, true, &NoProgress)
        .await
        .unwrap();

    let discovery = report.discovery.as_ref().unwrap();
    assert!(matches!(discovery.termination, Termination::PageLimit { page: 2 }));
    assert_eq!(sorted_titles(&report), vec!["One", "Two"]);
}

#[tokio::test]
async fn test_deadline_cancels_slow_articles() {
    let server = MockServer::start().await;
    mount_listing(&server, "autos-upclose", 1, &["/article/slow1", "/article/slow2"]).await;
    mount_listing(&server, "autos-upclose", 2, &["/article/slow1"]).await;
    Mock::given(method("GET"))
        .and(path("/article/slow1"))
        .respond_with(html(article(Some("Slow"), None, &[])).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/article/slow2"))
        .respond_with(html(article(Some("Slower"), None, &[])).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server.uri(), dir.path());
    config.crawler.request_timeout_secs = 60;
    config.crawler.crawl_deadline_secs = Some(1);
    let report = Coordinator::new(config)
        .unwrap()
        .run(Category::AutosUpclose, true, &NoProgress)
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.fetch.cancelled, 2);
    assert!(report.records.is_empty());
    assert!(report.duration() < chrono::Duration::seconds(10));
}

#[tokio::test]
async fn test_crawl_category_writes_records() {
    let server = MockServer::start().await;
    mount_worldnews_archive(&server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    let record_path = config.output.record_file("worldnews");

    let report = crawl_category(
        config,
        Category::WorldNews,
        true,
        CancellationToken::new(),
        &NoProgress,
    )
        .await
        .unwrap();
    assert_eq!(report.records.len(), 3);

    assert!(record_path.ends_with("worldnews_data/articles.csv"));
    let mut reader = csv::Reader::from_path(&record_path).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, vec!["Date", "Title", "Article", "URL", "Category"]);
    let mut titles: Vec<String> = reader
        .records()
        .map(|row| row.unwrap()[1].to_string())
        .collect();
    titles.sort();
    assert_eq!(titles, vec!["Alpha", "Bravo", "Delta"]);
}

#[tokio::test]
async fn test_crawl_category_stops_on_cancelled_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html(listing(&["/article/a"])))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    let record_path = config.output.record_file("centralbanks");

    let cancel = CancellationToken::new();
    cancel.cancel();
    let report = crawl_category(config, Category::CentralBanks, true, cancel, &NoProgress)
        .await
        .unwrap();

    assert!(report.cancelled);
    assert!(report.records.is_empty());
    assert_eq!(
        fs::read_to_string(&record_path).unwrap(),
        "Date,Title,Article,URL,Category\n"
    );
}

#[tokio::test]
async fn test_external_cancellation_before_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html(listing(&["/article/a"])))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    let coordinator = Coordinator::new(config).unwrap();
    coordinator.cancellation_token().cancel();

    let report = coordinator
        .run(Category::PoliticsNews, true, &NoProgress)
        .await
        .unwrap();

    assert!(report.cancelled);
    let discovery = report.discovery.as_ref().unwrap();
    assert!(matches!(discovery.termination, Termination::Cancelled { page: 1 }));
    assert_eq!(discovery.urls_found, 0);
    assert!(report.records.is_empty());
}
