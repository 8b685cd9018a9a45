//! End-to-end research run against a mock feed server.

use sitewarden_research::{ResearchAgent, ResearchSource};
use sitewarden_store::{InMemoryStore, ReportStore};
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_run_persists_findings_and_applies_safe_updates() {
    let server = MockServer::start().await;
    let feed = "<rss>\
        <item><title>New schema types for rich results in search</title>\
              <description>Sites should add FAQ structured data markup to key pages.</description></item>\
        </rss>";
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed))
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryStore::new());
    let sources = vec![ResearchSource {
        id: "mock-feed".to_string(),
        name: "Mock Feed".to_string(),
        url: format!("{}/feed", server.uri()),
        reliability: 0.9,
        topics: vec!["structured-data".to_string()],
    }];
    let agent = ResearchAgent::new(sources, store.clone()).unwrap();

    let run = agent.run_weekly(Instant::now() + Duration::from_secs(60)).await;

    assert_eq!(run.sources_failed, 0);
    assert_eq!(run.findings.len(), 1);
    assert_eq!(store.finding_count().await, 1);

    // Structured-data findings are config-kind; the non-destructive "add"
    // insight qualifies for auto-apply.
    assert!(run.applied >= 1);
    let pending = store.pending_directives_for("seo-optimizer").await.unwrap();
    assert!(!pending.is_empty());
    assert!(pending[0].directive.to_lowercase().contains("add faq"));
}

#[tokio::test]
async fn test_failed_source_degrades_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryStore::new());
    let sources = vec![ResearchSource {
        id: "down".to_string(),
        name: "Down".to_string(),
        url: format!("{}/feed", server.uri()),
        reliability: 0.8,
        topics: vec![],
    }];
    let agent = ResearchAgent::new(sources, store.clone()).unwrap();

    let run = agent.run_weekly(Instant::now() + Duration::from_secs(60)).await;

    assert_eq!(run.sources_failed, 1);
    assert!(run.findings.is_empty());
    assert_eq!(store.finding_count().await, 0);
}

#[tokio::test]
async fn test_exhausted_budget_skips_sources() {
    let store = Arc::new(InMemoryStore::new());
    let sources = vec![ResearchSource {
        id: "never-fetched".to_string(),
        name: "Never Fetched".to_string(),
        url: "https://unreachable.invalid/feed".to_string(),
        reliability: 0.8,
        topics: vec![],
    }];
    let agent = ResearchAgent::new(sources, store).unwrap();

    // Deadline already in the past: no source may be fetched.
    let run = agent.run_weekly(Instant::now() - Duration::from_secs(1)).await;
    assert_eq!(run.sources_failed, 0);
    assert!(run.findings.is_empty());
}
