//! Result types produced by the live site auditor.
//!
//! Every type here is a snapshot: produced once per audit run, serialized
//! into the orchestrator report, never mutated afterwards.

use serde::{Deserialize, Serialize};

/// A URL that failed its existence probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokenUrl {
    /// The probed URL.
    pub url: String,
    /// HTTP status, or 0 when the request never completed.
    pub status: u16,
    /// Round-trip latency in milliseconds.
    pub latency_ms: u64,
}

/// Sitemap URL health counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SitemapHealth {
    /// `<loc>` entries found in the sitemap document.
    pub total_sitemap_urls: usize,
    /// Entries selected for checking after the `max_urls` cap.
    pub total_urls: usize,
    /// Entries actually probed before the deadline cut the scan short.
    pub checked_urls: usize,
    /// Probes answering 2xx.
    pub healthy: usize,
    /// Probes answering 3xx.
    pub redirected: usize,
    /// Probes answering anything else, or not at all.
    pub broken: usize,
    /// Probes slower than the slow-latency threshold.
    pub slow: usize,
    /// The broken entries, with status and latency.
    pub broken_urls: Vec<BrokenUrl>,
    /// Mean latency over the probed entries.
    pub avg_latency_ms: u64,
}

/// Structured-data (JSON-LD) URL validity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaValidation {
    /// False when any referenced URL resolved with a non-2xx status.
    pub valid: bool,
    /// Distinct schema URLs probed.
    pub checked_urls: usize,
    /// Schema URLs that failed their probe.
    pub broken_schema_urls: Vec<BrokenUrl>,
}

impl Default for SchemaValidation {
    fn default() -> Self {
        Self {
            valid: true,
            checked_urls: 0,
            broken_schema_urls: Vec::new(),
        }
    }
}

/// Robots-directive audit for the configured AI crawler identities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RobotsAudit {
    /// Human-readable conflict descriptions.
    pub conflicts: Vec<String>,
    /// Crawlers effectively blocked from the site root.
    pub blocked_crawlers: Vec<String>,
    /// Crawlers effectively allowed.
    pub allowed_crawlers: Vec<String>,
    /// Whether the file shows signs of third-party injection.
    pub injection_suspected: bool,
}

/// CDN cache-hit sampling result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CdnPerformance {
    /// Paths successfully sampled.
    pub sampled: usize,
    /// Samples served from an edge cache.
    pub hits: usize,
    /// Hit rate as a percentage of sampled paths.
    pub hit_rate: f64,
    /// Mean time-to-first-byte over the samples.
    pub avg_ttfb_ms: u64,
}

/// Rendering-mode detection result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderingCheck {
    /// Pages that appear to bail out to client-side rendering.
    pub csr_bailouts: Vec<String>,
    /// Non-home pages with no article or heading markers at all.
    pub missing_content: Vec<String>,
}

/// The full result of one live site audit. Immutable once produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditResult {
    /// Sitemap URL health.
    pub sitemap: SitemapHealth,
    /// Structured-data URL validity.
    pub schema: SchemaValidation,
    /// Robots-directive audit.
    pub robots: RobotsAudit,
    /// CDN cache sampling.
    pub cdn: CdnPerformance,
    /// Rendering-mode detection.
    pub rendering: RenderingCheck,
    /// Aggregate score, 0–100.
    pub overall_score: u8,
    /// Issues requiring immediate attention.
    pub critical_issues: Vec<String>,
    /// Advisory findings, including degraded sub-checks with their reasons.
    pub warnings: Vec<String>,
}
