//! Sitemap URL health.
//!
//! Fetches the sitemap document, extracts `<loc>` entries with a tolerant
//! scanner, and probes them in bounded batches against a shared deadline.
//! Probing stops early when the remaining budget dips below the reserve kept
//! for the later orchestrator phases.

use crate::probe::ProbeClient;
use crate::types::{BrokenUrl, SitemapHealth};
use futures_util::future::join_all;
use sitewarden_core::CheckOutcome;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Concurrent probes per batch.
const BATCH_SIZE: usize = 10;

/// Latency above which a URL counts as slow, in milliseconds.
pub const SLOW_THRESHOLD_MS: u64 = 3000;

/// Extracts `<loc>` entry values from a sitemap document.
///
/// Tolerant by design: sitemaps in the wild are routinely malformed, so this
/// scans for tag pairs instead of parsing XML. CDATA wrappers are unwrapped.
pub fn extract_locs(xml: &str) -> Vec<String> {
    let mut locs = Vec::new();
    let mut rest = xml;
    while let Some(open) = rest.find("<loc>") {
        rest = &rest[open + 5..];
        let Some(close) = rest.find("</loc>") else {
            break;
        };
        let raw = rest[..close].trim();
        let value = raw
            .strip_prefix("<![CDATA[")
            .and_then(|v| v.strip_suffix("]]>"))
            .unwrap_or(raw)
            .trim();
        if !value.is_empty() {
            locs.push(value.to_string());
        }
        rest = &rest[close + 6..];
    }
    locs
}

/// Probes sitemap URL health for a site.
///
/// `reserve` is the budget kept back for the phases that follow the audit;
/// no new batch starts once `deadline - reserve` has passed.
pub async fn check_sitemap(
    client: &ProbeClient,
    sitemap_url: &str,
    max_urls: usize,
    deadline: Instant,
    reserve: Duration,
) -> CheckOutcome<SitemapHealth> {
    let page = match client.fetch(sitemap_url).await {
        Ok(page) if (200..300).contains(&page.status) => page,
        Ok(page) => {
            return CheckOutcome::degraded(
                SitemapHealth::default(),
                format!("sitemap fetch returned HTTP {}", page.status),
            );
        }
        Err(e) => {
            return CheckOutcome::degraded(SitemapHealth::default(), e.to_string());
        }
    };

    let locs = extract_locs(&page.body);
    let total_sitemap_urls = locs.len();
    let selected: Vec<String> = locs.into_iter().take(max_urls).collect();
    let total_urls = selected.len();

    let mut health = SitemapHealth {
        total_sitemap_urls,
        total_urls,
        ..SitemapHealth::default()
    };

    let mut latency_sum: u64 = 0;
    let mut deadline_hit = false;

    for batch in selected.chunks(BATCH_SIZE) {
        if Instant::now() + reserve >= deadline {
            deadline_hit = true;
            break;
        }
        let probes = join_all(batch.iter().map(|url| client.probe(url))).await;
        for (url, result) in batch.iter().zip(probes) {
            health.checked_urls += 1;
            match result {
                Ok(probe) => {
                    latency_sum += probe.latency_ms;
                    if probe.latency_ms > SLOW_THRESHOLD_MS {
                        health.slow += 1;
                    }
                    if probe.is_healthy() {
                        health.healthy += 1;
                    } else if probe.is_redirect() {
                        health.redirected += 1;
                    } else {
                        health.broken += 1;
                        health.broken_urls.push(BrokenUrl {
                            url: url.clone(),
                            status: probe.status,
                            latency_ms: probe.latency_ms,
                        });
                    }
                }
                Err(e) => {
                    debug!(url = %url, error = %e, "sitemap probe failed");
                    health.broken += 1;
                    health.broken_urls.push(BrokenUrl {
                        url: url.clone(),
                        status: 0,
                        latency_ms: 0,
                    });
                }
            }
        }
    }

    if health.checked_urls > 0 {
        health.avg_latency_ms = latency_sum / health.checked_urls as u64;
    }

    if deadline_hit {
        warn!(
            checked = health.checked_urls,
            total = health.total_urls,
            "sitemap probing stopped early: deadline reserve reached"
        );
        let reason = format!(
            "deadline reached after {} of {} sitemap URLs",
            health.checked_urls, total_urls
        );
        return CheckOutcome::degraded(health, reason);
    }

    CheckOutcome::ok(health)
}
