//! End-to-end audit tests against a mock HTTP server.

use sitewarden_audit::{AuditConfig, SiteAuditor};
use sitewarden_core::SiteConfig;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn site_for(server: &MockServer) -> SiteConfig {
    SiteConfig::new("test", server.uri())
}

fn auditor() -> SiteAuditor {
    SiteAuditor::new(AuditConfig::default()).unwrap()
}

async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
    Mock::given(method("HEAD"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_sitemap_with_one_broken_url() {
    let server = MockServer::start().await;
    let base = server.uri();

    let sitemap = format!(
        "<urlset>{}</urlset>",
        ["/", "/a", "/b", "/c", "/gone"]
            .iter()
            .map(|p| format!("<url><loc>{base}{p}</loc></url>"))
            .collect::<Vec<_>>()
            .join("")
    );
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap))
        .mount(&server)
        .await;

    for p in ["/", "/a", "/b", "/c"] {
        Mock::given(method("HEAD"))
            .and(path(p))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
    }
    Mock::given(method("HEAD"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let site = site_for(&server);
    let deadline = Instant::now() + Duration::from_secs(120);
    let result = auditor().audit(&site, 50, deadline).await;

    assert_eq!(result.sitemap.total_urls, 5);
    assert_eq!(result.sitemap.healthy, 4);
    assert_eq!(result.sitemap.broken, 1);
    assert_eq!(result.sitemap.broken_urls.len(), 1);
    assert_eq!(result.sitemap.broken_urls[0].status, 404);
    assert!(result.sitemap.broken_urls[0].url.ends_with("/gone"));
    assert!(result
        .critical_issues
        .iter()
        .any(|issue| issue.contains("/gone") && issue.contains("404")));
}

#[tokio::test]
async fn test_sitemap_truncation_warns() {
    let server = MockServer::start().await;
    let base = server.uri();
    let entries: String = (0..8)
        .map(|i| format!("<url><loc>{base}/p{i}</loc></url>"))
        .collect();
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!("<urlset>{entries}</urlset>")))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let site = site_for(&server);
    let deadline = Instant::now() + Duration::from_secs(120);
    let result = auditor().audit(&site, 3, deadline).await;

    assert_eq!(result.sitemap.total_sitemap_urls, 8);
    assert_eq!(result.sitemap.total_urls, 3);
    assert!(result
        .warnings
        .iter()
        .any(|w| w.contains("truncated") && w.contains("3 of 8")));
}

#[tokio::test]
async fn test_robots_conflict_detected_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "User-agent: GPTBot\nDisallow: /\n\nUser-agent: GPTBot\nAllow: /\n",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let site = site_for(&server);
    let deadline = Instant::now() + Duration::from_secs(120);
    let result = auditor().audit(&site, 10, deadline).await;

    assert_eq!(result.robots.conflicts.len(), 1);
    assert!(result.robots.blocked_crawlers.contains(&"GPTBot".to_string()));
    assert!(result
        .critical_issues
        .iter()
        .any(|issue| issue.contains("GPTBot")));
}

#[tokio::test]
async fn test_cdn_hit_rate_from_headers() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).insert_header("x-vercel-cache", "HIT"))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/blog"))
        .respond_with(ResponseTemplate::new(200).insert_header("x-vercel-cache", "MISS"))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).insert_header("x-vercel-cache", "REVALIDATED"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let site = site_for(&server);
    let deadline = Instant::now() + Duration::from_secs(120);
    let result = auditor().audit(&site, 10, deadline).await;

    assert_eq!(result.cdn.sampled, 3);
    assert_eq!(result.cdn.hits, 2);
    assert!((result.cdn.hit_rate - 66.6).abs() < 1.0);
}

#[tokio::test]
async fn test_schema_broken_url_marks_invalid() {
    let server = MockServer::start().await;
    let base = server.uri();
    let html = format!(
        r#"<html><head><script type="application/ld+json">
           {{"@type":"Organization","logo":"{base}/logo.png","url":"{base}/"}}
           </script></head><body><main><h1>Home</h1>{}</main></body></html>"#,
        "content ".repeat(100)
    );
    mount_page(&server, "/", &html).await;
    mount_page(&server, "/blog", "<html><body><article><h1>Blog</h1></article></body></html>").await;
    mount_page(&server, "/about", "<html><body><article><h1>About</h1></article></body></html>").await;
    Mock::given(method("HEAD"))
        .and(path("/logo.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let site = site_for(&server);
    let deadline = Instant::now() + Duration::from_secs(120);
    let result = auditor().audit(&site, 10, deadline).await;

    assert!(!result.schema.valid);
    assert_eq!(result.schema.broken_schema_urls.len(), 1);
    assert!(result.schema.broken_schema_urls[0].url.ends_with("/logo.png"));
}

#[tokio::test]
async fn test_audit_never_fails_on_unreachable_site() {
    // Point at a server that is already shut down.
    let server = MockServer::start().await;
    let site = site_for(&server);
    drop(server);

    let deadline = Instant::now() + Duration::from_secs(60);
    let result = auditor().audit(&site, 10, deadline).await;

    // Every sub-check degraded; the audit still produced a result whose
    // warnings explain what happened.
    assert!(result.warnings.iter().any(|w| w.contains("Sitemap check degraded")));
    assert_eq!(result.sitemap.total_urls, 0);
    assert!(result.critical_issues.is_empty());
}
