//! Rendering-mode detection.
//!
//! A page flags a client-side-rendering bailout when its body text is
//! unexpectedly thin even though the main-content marker is present, or when
//! the cache-state header explicitly reports a stale variant. A non-home page
//! with no article or heading marker at all counts as missing content.

use crate::probe::ProbeClient;
use crate::types::RenderingCheck;
use sitewarden_core::{CheckOutcome, SiteConfig};
use tracing::warn;

/// Body text below this length counts as thin when a main marker exists.
pub const THIN_CONTENT_CHARS: usize = 512;

const CACHE_STATE_HEADERS: &[&str] = &["x-nextjs-cache", "x-vercel-cache", "cf-cache-status"];

/// Strips tags, scripts and styles to approximate the visible text.
pub fn visible_text(html: &str) -> String {
    let without_scripts = strip_element(html, "script");
    let without_styles = strip_element(&without_scripts, "style");

    let mut text = String::with_capacity(without_styles.len());
    let mut in_tag = false;
    for c in without_styles.chars() {
        match c {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes `<tag ...>...</tag>` elements, bodies included.
fn strip_element(html: &str, tag: &str) -> String {
    let opener = format!("<{tag}");
    let closer = format!("</{tag}>");
    // ASCII lowering keeps byte offsets aligned with the original.
    let lower = html.to_ascii_lowercase();
    let mut out = String::with_capacity(html.len());
    let mut pos = 0;
    while let Some(open) = lower[pos..].find(&opener) {
        let abs = pos + open;
        out.push_str(&html[pos..abs]);
        match lower[abs..].find(&closer) {
            Some(close) => pos = abs + close + closer.len(),
            None => return out,
        }
    }
    out.push_str(&html[pos..]);
    out
}

/// Detects CSR bailouts and missing content across the site's key pages.
pub async fn check_rendering(
    client: &ProbeClient,
    site: &SiteConfig,
) -> CheckOutcome<RenderingCheck> {
    let mut check = RenderingCheck::default();
    let mut fetched = 0usize;

    for path in &site.key_pages {
        let url = site.url(path);
        let page = match client.fetch(&url).await {
            Ok(page) if (200..300).contains(&page.status) => page,
            Ok(page) => {
                warn!(page = %url, status = page.status, "rendering check skipped page");
                continue;
            }
            Err(e) => {
                warn!(page = %url, error = %e, "rendering check skipped page");
                continue;
            }
        };
        fetched += 1;

        let lower = page.body.to_ascii_lowercase();
        let has_main = lower.contains("<main");
        let text = visible_text(&page.body);

        let stale = CACHE_STATE_HEADERS
            .iter()
            .filter_map(|h| page.headers.get(*h))
            .any(|v| v.to_uppercase().contains("STALE"));

        if (has_main && text.len() < THIN_CONTENT_CHARS) || stale {
            check.csr_bailouts.push(path.clone());
        }

        let is_home = path == "/" || path.is_empty();
        if !is_home && !lower.contains("<article") && !lower.contains("<h1") {
            check.missing_content.push(path.clone());
        }
    }

    if fetched == 0 {
        return CheckOutcome::degraded(check, "no key page could be fetched for rendering check");
    }
    CheckOutcome::ok(check)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_text_strips_tags_and_scripts() {
        let html = r#"<html><head><script>var hidden = "secret";</script>
            <style>.a { color: red; }</style></head>
            <body><main><h1>Title</h1><p>Hello world</p></main></body></html>"#;
        let text = visible_text(html);
        assert!(text.contains("Title"));
        assert!(text.contains("Hello world"));
        assert!(!text.contains("secret"));
        assert!(!text.contains("color"));
    }

    #[test]
    fn test_visible_text_empty_body() {
        assert!(visible_text("<main></main>").trim().is_empty());
    }
}
