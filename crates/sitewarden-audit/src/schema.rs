//! Structured-data (JSON-LD) URL validation.
//!
//! For each key page, every `application/ld+json` block is parsed and the
//! values under known URL-bearing keys are collected, deduplicated, capped,
//! and existence-probed. Malformed blocks are skipped per-item; they never
//! abort the surrounding scan.

use crate::probe::ProbeClient;
use crate::types::{BrokenUrl, SchemaValidation};
use futures_util::future::join_all;
use sitewarden_core::{CheckOutcome, SiteConfig};
use tracing::{debug, warn};

/// JSON-LD keys whose values reference fetchable URLs.
const SCHEMA_URL_KEYS: &[&str] = &[
    "url",
    "logo",
    "image",
    "contentUrl",
    "thumbnailUrl",
    "sameAs",
];

/// Maximum schema URLs probed per audit.
const MAX_SCHEMA_URLS: usize = 20;

/// Extracts the contents of all JSON-LD script blocks from a page.
pub fn extract_jsonld_blocks(html: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    // ASCII lowering keeps byte offsets aligned with the original.
    let lower = html.to_ascii_lowercase();
    let mut offset = 0;
    while let Some(pos) = lower[offset..].find("application/ld+json") {
        let abs = offset + pos;
        let Some(tag_end) = lower[abs..].find('>') else {
            break;
        };
        let content_start = abs + tag_end + 1;
        let Some(close) = lower[content_start..].find("</script>") else {
            break;
        };
        blocks.push(html[content_start..content_start + close].trim().to_string());
        offset = content_start + close + 9;
    }
    blocks
}

/// Recursively collects string values under the known URL-bearing keys.
pub fn collect_schema_urls(value: &serde_json::Value, out: &mut Vec<String>) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, child) in map {
                if SCHEMA_URL_KEYS.contains(&key.as_str()) {
                    collect_url_values(child, out);
                }
                collect_schema_urls(child, out);
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                collect_schema_urls(item, out);
            }
        }
        _ => {}
    }
}

fn collect_url_values(value: &serde_json::Value, out: &mut Vec<String>) {
    match value {
        serde_json::Value::String(s) if s.starts_with("http") => out.push(s.clone()),
        serde_json::Value::Array(items) => {
            for item in items {
                collect_url_values(item, out);
            }
        }
        _ => {}
    }
}

/// Validates structured-data URLs across the site's key pages.
pub async fn check_schema(client: &ProbeClient, site: &SiteConfig) -> CheckOutcome<SchemaValidation> {
    let mut urls: Vec<String> = Vec::new();
    let mut pages_fetched = 0usize;

    for path in &site.key_pages {
        let page_url = site.url(path);
        match client.fetch(&page_url).await {
            Ok(page) if (200..300).contains(&page.status) => {
                pages_fetched += 1;
                for block in extract_jsonld_blocks(&page.body) {
                    match serde_json::from_str::<serde_json::Value>(&block) {
                        Ok(value) => collect_schema_urls(&value, &mut urls),
                        Err(e) => {
                            debug!(page = %page_url, error = %e, "skipping malformed JSON-LD block");
                        }
                    }
                }
            }
            Ok(page) => {
                warn!(page = %page_url, status = page.status, "key page fetch returned non-2xx");
            }
            Err(e) => {
                warn!(page = %page_url, error = %e, "key page fetch failed");
            }
        }
    }

    if pages_fetched == 0 {
        return CheckOutcome::degraded(
            SchemaValidation::default(),
            "no key page could be fetched for structured-data validation",
        );
    }

    // Dedupe preserving first-seen order, then cap.
    let mut seen = std::collections::HashSet::new();
    urls.retain(|u| seen.insert(u.clone()));
    urls.truncate(MAX_SCHEMA_URLS);

    let probes = join_all(urls.iter().map(|url| client.probe(url))).await;
    let mut validation = SchemaValidation {
        valid: true,
        checked_urls: urls.len(),
        broken_schema_urls: Vec::new(),
    };
    for (url, result) in urls.iter().zip(probes) {
        match result {
            Ok(probe) if probe.is_healthy() => {}
            Ok(probe) => {
                validation.valid = false;
                validation.broken_schema_urls.push(BrokenUrl {
                    url: url.clone(),
                    status: probe.status,
                    latency_ms: probe.latency_ms,
                });
            }
            Err(e) => {
                debug!(url = %url, error = %e, "schema URL probe failed");
                validation.valid = false;
                validation.broken_schema_urls.push(BrokenUrl {
                    url: url.clone(),
                    status: 0,
                    latency_ms: 0,
                });
            }
        }
    }

    CheckOutcome::ok(validation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_jsonld_blocks() {
        let html = r#"<html><head>
            <script type="application/ld+json">{"@type":"Article"}</script>
            <script type="text/javascript">var x = 1;</script>
            <script type="application/ld+json">{"@type":"Organization"}</script>
        </head></html>"#;
        let blocks = extract_jsonld_blocks(html);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].contains("Article"));
        assert!(blocks[1].contains("Organization"));
    }

    #[test]
    fn test_collect_schema_urls_nested() {
        let value = serde_json::json!({
            "@type": "Article",
            "url": "https://example.com/a",
            "image": ["https://example.com/img1.jpg", "https://example.com/img2.jpg"],
            "publisher": {
                "logo": "https://example.com/logo.png",
                "sameAs": ["https://twitter.com/example"]
            },
            "headline": "not a url key"
        });
        let mut urls = Vec::new();
        collect_schema_urls(&value, &mut urls);
        assert_eq!(urls.len(), 5);
        assert!(urls.contains(&"https://example.com/logo.png".to_string()));
        assert!(urls.contains(&"https://twitter.com/example".to_string()));
    }

    #[test]
    fn test_collect_schema_urls_ignores_relative() {
        let value = serde_json::json!({"url": "/relative/path"});
        let mut urls = Vec::new();
        collect_schema_urls(&value, &mut urls);
        assert!(urls.is_empty());
    }
}
