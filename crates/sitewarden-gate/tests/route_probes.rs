//! Route-reachability checks against a mock server.

use sitewarden_gate::{GateInput, GateOptions, GateThresholds, PublicationGate};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn input_for(server: &MockServer) -> GateInput {
    GateInput {
        target_url: format!("{}/blog/new-post", server.uri()),
        site_base_url: server.uri(),
        site_domains: vec![],
        locale: "en".to_string(),
        content_type: "news".to_string(),
        title: "A Perfectly Reasonable Title".to_string(),
        meta_title: "A Perfectly Reasonable Meta Title Here".to_string(),
        meta_description: "A meta description that is comfortably long enough to sit \
                           inside the configured band for descriptions."
            .to_string(),
        body_html: format!(
            "<h1>Post</h1><p>The answer is simple.</p><h2>What happened?</h2>\
             <h2>Why does it matter?</h2><p>{}</p>",
            "Plain words fill the body of this short news item. ".repeat(80)
        ),
        author: Some("Staff".to_string()),
        seo_score: Some(80.0),
        has_structured_data: true,
    }
}

#[tokio::test]
async fn test_missing_parent_route_blocks() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/blog"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let gate = PublicationGate::new(GateThresholds::default()).unwrap();
    let result = gate.review(&input_for(&server), GateOptions::default()).await;

    assert!(!result.allowed);
    assert!(result.blockers.iter().any(|b| b.contains("/blog") && b.contains("404")));
}

#[tokio::test]
async fn test_reachable_parent_route_passes() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/blog"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let gate = PublicationGate::new(GateThresholds::default()).unwrap();
    let result = gate.review(&input_for(&server), GateOptions::default()).await;

    assert!(result.allowed, "blockers: {:?}", result.blockers);
}

#[tokio::test]
async fn test_arabic_content_requires_localized_root() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/blog"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/ar"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut input = input_for(&server);
    input.locale = "ar".to_string();
    let gate = PublicationGate::new(GateThresholds::default()).unwrap();
    let result = gate.review(&input, GateOptions::default()).await;

    assert!(!result.allowed);
    assert!(result.blockers.iter().any(|b| b.contains("/ar")));
}
