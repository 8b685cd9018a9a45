//! CDN cache-hit sampling.
//!
//! Probes a small fixed set of paths and reads the cache-status response
//! header. HIT and REVALIDATED both count as cache hits.

use crate::probe::ProbeClient;
use crate::types::CdnPerformance;
use futures_util::future::join_all;
use sitewarden_core::{CheckOutcome, SiteConfig};
use tracing::debug;

/// Cache-status headers checked in order; the first present one wins.
const CACHE_HEADERS: &[&str] = &["x-vercel-cache", "cf-cache-status", "x-cache", "x-nextjs-cache"];

fn is_cache_hit(value: &str) -> bool {
    let upper = value.to_uppercase();
    upper.contains("HIT") || upper.contains("REVALIDATED")
}

/// Samples the site's CDN cache behavior.
pub async fn check_cdn(client: &ProbeClient, site: &SiteConfig) -> CheckOutcome<CdnPerformance> {
    let urls: Vec<String> = site.cdn_sample_paths.iter().map(|p| site.url(p)).collect();
    let probes = join_all(urls.iter().map(|url| client.probe(url))).await;

    let mut perf = CdnPerformance::default();
    let mut ttfb_sum: u64 = 0;
    for (url, result) in urls.iter().zip(probes) {
        match result {
            Ok(probe) => {
                perf.sampled += 1;
                ttfb_sum += probe.latency_ms;
                if probe.header_among(CACHE_HEADERS).is_some_and(is_cache_hit) {
                    perf.hits += 1;
                }
            }
            Err(e) => {
                debug!(url = %url, error = %e, "cdn sample probe failed");
            }
        }
    }

    if perf.sampled == 0 {
        return CheckOutcome::degraded(perf, "no CDN sample path could be probed");
    }

    perf.hit_rate = perf.hits as f64 / perf.sampled as f64 * 100.0;
    perf.avg_ttfb_ms = ttfb_sum / perf.sampled as u64;
    CheckOutcome::ok(perf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_classification() {
        assert!(is_cache_hit("HIT"));
        assert!(is_cache_hit("Hit from cloudfront"));
        assert!(is_cache_hit("REVALIDATED"));
        assert!(!is_cache_hit("MISS"));
        assert!(!is_cache_hit("DYNAMIC"));
        assert!(!is_cache_hit("BYPASS"));
    }
}
