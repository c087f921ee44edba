use super::validate_url as validate_url_impl;
use super::*;
use crate::test_support::StaticFetcher;

#[test]
fn validate_url() {
    // Valid URLs
    assert!(validate_url_impl("https://example.com").is_ok());
    assert!(validate_url_impl("http://docs.rs/regex/1.0/").is_ok());
    assert!(validate_url_impl("https://docs.python.org/3/library/").is_ok());

    // Invalid URLs
    assert!(validate_url_impl("ftp://example.com").is_err());
    assert!(validate_url_impl("not-a-url").is_err());
    assert!(validate_url_impl("").is_err());
    assert!(validate_url_impl("https://").is_err());
}

#[test]
fn link_set_deduplicates() {
    let mut set = LinkSet::new();
    assert!(set.insert("https://x.com".to_string()));
    assert!(set.insert("https://y.com".to_string()));
    assert!(!set.insert("https://x.com".to_string()));

    assert_eq!(set.len(), 2);
    assert!(set.contains("https://x.com"));
    assert!(set.contains("https://y.com"));
    assert!(!set.contains("https://z.com"));
}

#[test]
fn link_set_uses_exact_string_equality() {
    let set: LinkSet = [
        "https://x.com",
        "https://x.com/",
        "HTTPS://x.com",
        "https://x.com#top",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    assert_eq!(set.len(), 4);
}

#[test]
fn link_set_keeps_first_insertion_order() {
    let set: LinkSet = ["c", "a", "c", "b", "a"]
        .into_iter()
        .map(String::from)
        .collect();

    assert_eq!(set.iter().collect::<Vec<_>>(), vec!["c", "a", "b"]);
    assert_eq!(set.into_iter().collect::<Vec<_>>(), vec!["c", "a", "b"]);
}

#[test]
fn default_crawler_config() {
    let config = CrawlerConfig::default();
    assert_eq!(config.timeout_seconds, 30);
    assert_eq!(config.max_redirects, 10);
    assert!(config.user_agent.starts_with("link-rank/"));

    let client = HttpClient::new(config.clone());
    assert_eq!(client.config(), &config);
}

#[tokio::test]
async fn aggregate_single_seed_with_duplicates() {
    let fetcher = StaticFetcher::new().with_page(
        "siteA",
        r#"<html><body>
            <a href="https://x.com">x</a>
            <a href="https://y.com">y</a>
            <a href="https://x.com">x again</a>
        </body></html>"#,
    );

    let aggregator = LinkAggregator::new(Arc::new(fetcher));
    let links = aggregator.aggregate(&["siteA"]).await;

    assert_eq!(links.len(), 2);
    assert!(links.contains("https://x.com"));
    assert!(links.contains("https://y.com"));
}

#[tokio::test]
async fn aggregate_overlapping_seeds() {
    let fetcher = StaticFetcher::new()
        .with_page(
            "https://a.example/",
            r#"<a href="https://shared.example/">shared</a><a href="https://only-a.example/">a</a>"#,
        )
        .with_page(
            "https://b.example/",
            r#"<a href="https://only-b.example/">b</a><a href="https://shared.example/">shared</a>"#,
        );

    let aggregator = LinkAggregator::new(Arc::new(fetcher));
    let links = aggregator
        .aggregate(&["https://a.example/", "https://b.example/"])
        .await;

    assert_eq!(links.len(), 3);
    assert_eq!(
        links.iter().filter(|link| *link == "https://shared.example/").count(),
        1
    );
    assert_eq!(
        links.iter().collect::<Vec<_>>(),
        vec![
            "https://shared.example/",
            "https://only-a.example/",
            "https://only-b.example/",
        ]
    );
}

#[tokio::test]
async fn aggregate_is_order_insensitive() {
    let pages = [
        ("s1", r#"<a href="p">p</a><a href="q">q</a>"#),
        ("s2", r#"<a href="q">q</a><a href="r">r</a>"#),
    ];
    let build = || {
        pages
            .iter()
            .fold(StaticFetcher::new(), |fetcher, (url, html)| {
                fetcher.with_page(url, html)
            })
    };

    let forward = LinkAggregator::new(Arc::new(build()))
        .aggregate(&["s1", "s2"])
        .await;
    let backward = LinkAggregator::new(Arc::new(build()))
        .aggregate(&["s2", "s1"])
        .await;

    let mut forward: Vec<_> = forward.into_iter().collect();
    let mut backward: Vec<_> = backward.into_iter().collect();
    forward.sort();
    backward.sort();
    assert_eq!(forward, backward);
}

#[tokio::test]
async fn aggregate_skips_failed_seeds() {
    let fetcher = Arc::new(
        StaticFetcher::new().with_page("https://ok.example/", r#"<a href="https://x.com">x</a>"#),
    );

    let aggregator = LinkAggregator::new(Arc::clone(&fetcher) as Arc<dyn Fetcher>);
    let links = aggregator
        .aggregate(&["https://missing.example/", "https://ok.example/"])
        .await;

    assert_eq!(links.iter().collect::<Vec<_>>(), vec!["https://x.com"]);
    assert_eq!(fetcher.requests().len(), 2);
}

#[tokio::test]
async fn aggregate_all_seeds_failed() {
    let aggregator = LinkAggregator::new(Arc::new(StaticFetcher::new()));
    let links = aggregator.aggregate(&["https://down.example/"]).await;
    assert!(links.is_empty());
}

mod integration_tests {
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    use super::*;

    #[tokio::test]
    async fn fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html><body>Hello</body></html>", "text/html"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::default();
        let url = format!("{}/page", server.uri());
        let document = client.fetch(&url).await.expect("fetch should succeed");

        assert_eq!(document.url, url);
        assert_eq!(document.html, "<html><body>Hello</body></html>");
    }

    #[tokio::test]
    async fn fetch_error_status_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::default();
        let result = client.fetch(&format!("{}/broken", server.uri())).await;

        match result {
            Err(FetchError::Status { status, .. }) => assert_eq!(status, 503),
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn fetch_not_found() {
        let server = MockServer::start().await;

        let client = HttpClient::default();
        let result = client.fetch(&format!("{}/missing", server.uri())).await;

        assert!(matches!(
            result,
            Err(FetchError::Status { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn fetch_relative_url_fails() {
        let client = HttpClient::default();
        let result = client.fetch("struct.Regex.html").await;
        assert!(matches!(result, Err(FetchError::Transport { .. })));
    }

    #[tokio::test]
    async fn fetch_follows_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(
                ResponseTemplate::new(301).insert_header("Location", format!("{}/new", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("moved", "text/plain"))
            .mount(&server)
            .await;

        let client = HttpClient::default();
        let url = format!("{}/old", server.uri());
        let document = client.fetch(&url).await.expect("redirect should be followed");

        assert_eq!(document.url, url);
        assert_eq!(document.html, "moved");
    }

    #[tokio::test]
    async fn aggregate_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/seed"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"<html><body>
                    <a href="/docs/getting-started/">Getting Started</a>
                    <a href="https://external.com/">External Link</a>
                    <a href="/docs/getting-started/">Getting Started again</a>
                </body></html>"#,
                "text/html",
            ))
            .mount(&server)
            .await;

        let aggregator = LinkAggregator::new(Arc::new(HttpClient::default()));
        let seeds = vec![
            format!("{}/seed", server.uri()),
            format!("{}/gone", server.uri()),
        ];
        let links = aggregator.aggregate(&seeds).await;

        assert_eq!(
            links.iter().collect::<Vec<_>>(),
            vec!["/docs/getting-started/", "https://external.com/"]
        );
    }
}
