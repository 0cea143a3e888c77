use mockito::{Matcher, Server};
use prospector::adapters::apify::{ApifyActors, ApifyLinkedInClient};
use prospector::adapters::google_search::GoogleSearchClient;
use prospector::adapters::web_browser::HttpPageFetcher;
use prospector::agents::error::BackendError;
use prospector::domain::{BrowsePort, LinkedInPort, SearchPort};
use serde_json::json;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

fn apify(base_url: String) -> ApifyLinkedInClient {
    ApifyLinkedInClient::new("apify-token", ApifyActors::default(), TIMEOUT)
        .unwrap()
        .with_base_url(base_url)
}

#[tokio::test]
async fn test_apify_profile_runs_detail_actor() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/acts/apimaestro~linkedin-profile-detail/run-sync-get-dataset-items")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("token".into(), "apify-token".into()),
            Matcher::UrlEncoded("limit".into(), "1".into()),
        ]))
        .match_body(Matcher::Json(json!({
            "profileUrl": "https://www.linkedin.com/in/jane-doe/",
            "username": "jane-doe"
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"fullName": "Jane Doe", "headline": "CISO at Northwind"}]"#)
        .create_async()
        .await;

    let profile = apify(server.url())
        .profile("https://www.linkedin.com/in/jane-doe/")
        .await
        .unwrap();

    assert_eq!(profile["fullName"], "Jane Doe");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_apify_company_posts_sends_limit_and_truncates() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/acts/apimaestro~linkedin-company-posts/run-sync-get-dataset-items")
        .match_query(Matcher::UrlEncoded("limit".into(), "2".into()))
        .match_body(Matcher::Json(json!({
            "companyUrl": "https://www.linkedin.com/company/northwind",
            "companyName": "northwind",
            "limit": 2
        })))
        .with_status(200)
        .with_body(r#"[{"text": "one"}, {"text": "two"}, {"text": "three"}]"#)
        .create_async()
        .await;

    let posts = apify(server.url())
        .company_posts("https://www.linkedin.com/company/northwind", 2)
        .await
        .unwrap();

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[1]["text"], "two");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_apify_empty_dataset_is_null_profile() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/acts/apimaestro~linkedin-company-detail/run-sync-get-dataset-items")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let company = apify(server.url())
        .company("https://www.linkedin.com/company/northwind")
        .await
        .unwrap();

    assert!(company.is_null());
}

#[tokio::test]
async fn test_apify_upstream_failure() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/acts/apimaestro~linkedin-profile-reactions/run-sync-get-dataset-items")
        .match_query(Matcher::Any)
        .with_status(402)
        .with_body("monthly usage exceeded")
        .create_async()
        .await;

    let err = apify(server.url())
        .profile_reactions("https://www.linkedin.com/in/jane-doe", 15)
        .await
        .unwrap_err();

    assert!(matches!(err, BackendError::Upstream { status: 402, .. }));
    assert_eq!(err.to_string(), "Upstream returned 402: monthly usage exceeded");
}

#[tokio::test]
async fn test_google_search_maps_items() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/customsearch/v1")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("key".into(), "google-key".into()),
            Matcher::UrlEncoded("cx".into(), "engine".into()),
            Matcher::UrlEncoded("q".into(), "\"Northwind\" security".into()),
            Matcher::UrlEncoded("num".into(), "10".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "searchInformation": { "totalResults": "1200" },
                "items": [{
                    "title": "Northwind raises Series B",
                    "link": "https://news.example.com/northwind",
                    "snippet": "Northwind plans to double its security team",
                    "displayLink": "news.example.com",
                    "kind": "customsearch#result"
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = GoogleSearchClient::new("google-key", "engine", TIMEOUT)
        .unwrap()
        .with_endpoint(format!("{}/customsearch/v1", server.url()));
    let results = client.search("\"Northwind\" security", 25).await.unwrap();

    assert_eq!(results.query, "\"Northwind\" security");
    assert_eq!(results.total_results.as_deref(), Some("1200"));
    assert_eq!(results.results.len(), 1);
    assert_eq!(results.results[0].display_link.as_deref(), Some("news.example.com"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_google_search_without_items() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/customsearch/v1")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"searchInformation": {"totalResults": "0"}}"#)
        .create_async()
        .await;

    let client = GoogleSearchClient::new("google-key", "engine", TIMEOUT)
        .unwrap()
        .with_endpoint(format!("{}/customsearch/v1", server.url()));
    let err = client.search("nothing here", 10).await.unwrap_err();

    assert_eq!(err.to_string(), "No search results found");
}

#[tokio::test]
async fn test_page_fetcher_extracts_text_and_title() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/about")
        .match_header("user-agent", Matcher::Regex("Chrome/91".to_string()))
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(
            "<html><head><title>About Northwind</title><script>var x = 1;</script></head>\
             <body><h1>About</h1><p>We protect retailers.</p></body></html>",
        )
        .create_async()
        .await;

    let url = format!("{}/about", server.url());
    let page = HttpPageFetcher::new(TIMEOUT).unwrap().fetch(&url).await.unwrap();

    assert_eq!(page.url, url);
    assert_eq!(page.status_code, 200);
    assert_eq!(page.title.as_deref(), Some("About Northwind"));
    assert_eq!(page.text, "About Northwind\nAbout\nWe protect retailers.");
    assert!(page.html.contains("<script>"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_page_fetcher_http_error() {
    let mut server = Server::new_async().await;
    let _mock = server.mock("GET", "/missing").with_status(404).create_async().await;

    let err = HttpPageFetcher::new(TIMEOUT)
        .unwrap()
        .fetch(&format!("{}/missing", server.url()))
        .await
        .unwrap_err();

    assert!(matches!(err, BackendError::Upstream { status: 404, .. }));
}
