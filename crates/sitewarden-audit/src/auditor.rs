//! The live site auditor.
//!
//! Runs the five sub-checks concurrently, each fault-isolated through
//! [`CheckOutcome`], then assembles the aggregate result and score. The
//! auditor never fails: a broken network yields an `AuditResult` whose
//! warnings explain which checks degraded and why.

use crate::cdn::check_cdn;
use crate::probe::ProbeClient;
use crate::rendering::check_rendering;
use crate::robots::check_robots;
use crate::schema::check_schema;
use crate::sitemap::check_sitemap;
use crate::types::{AuditResult, BrokenUrl};
use sitewarden_core::{CheckOutcome, SiteConfig, WardenResult};
use std::time::{Duration, Instant};
use tracing::info;

/// Static configuration for the auditor.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Per-request probe timeout.
    pub probe_timeout: Duration,
    /// Budget reserved for the phases that follow the audit.
    pub reserve: Duration,
    /// AI crawler identities evaluated against robots.txt.
    pub ai_crawlers: Vec<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(5),
            reserve: Duration::from_secs(15),
            ai_crawlers: vec![
                "GPTBot".to_string(),
                "ChatGPT-User".to_string(),
                "ClaudeBot".to_string(),
                "Claude-Web".to_string(),
                "PerplexityBot".to_string(),
                "Google-Extended".to_string(),
                "CCBot".to_string(),
            ],
        }
    }
}

/// Runs live audits against a deployed site.
pub struct SiteAuditor {
    client: ProbeClient,
    config: AuditConfig,
}

impl SiteAuditor {
    /// Creates an auditor with the given configuration.
    pub fn new(config: AuditConfig) -> WardenResult<Self> {
        let client = ProbeClient::new(config.probe_timeout)?;
        Ok(Self { client, config })
    }

    /// Runs the full audit. Never fails; degraded sub-checks surface as
    /// warnings on the result.
    pub async fn audit(
        &self,
        site: &SiteConfig,
        max_urls: usize,
        deadline: Instant,
    ) -> AuditResult {
        let start = Instant::now();
        info!(site = %site.id, max_urls, "live audit: starting");

        let sitemap_url = site.url("/sitemap.xml");
        let robots_url = site.url("/robots.txt");

        let (sitemap, schema, robots, cdn, rendering) = tokio::join!(
            check_sitemap(
                &self.client,
                &sitemap_url,
                max_urls,
                deadline,
                self.config.reserve
            ),
            check_schema(&self.client, site),
            check_robots(&self.client, &robots_url, &self.config.ai_crawlers),
            check_cdn(&self.client, site),
            check_rendering(&self.client, site),
        );

        let result = assemble(sitemap, schema, robots, cdn, rendering);

        info!(
            site = %site.id,
            score = result.overall_score,
            criticals = result.critical_issues.len(),
            warnings = result.warnings.len(),
            duration_ms = start.elapsed().as_millis(),
            "live audit: complete"
        );
        result
    }
}

fn broken_label(broken: &BrokenUrl) -> String {
    if broken.status == 0 {
        format!("{} (unreachable)", broken.url)
    } else {
        format!("{} (HTTP {})", broken.url, broken.status)
    }
}

fn assemble(
    sitemap: CheckOutcome<crate::types::SitemapHealth>,
    schema: CheckOutcome<crate::types::SchemaValidation>,
    robots: CheckOutcome<crate::types::RobotsAudit>,
    cdn: CheckOutcome<crate::types::CdnPerformance>,
    rendering: CheckOutcome<crate::types::RenderingCheck>,
) -> AuditResult {
    let mut critical_issues = Vec::new();
    let mut warnings = Vec::new();

    for (name, reason) in [
        ("Sitemap", sitemap.reason()),
        ("Structured-data", schema.reason()),
        ("Robots", robots.reason()),
        ("CDN", cdn.reason()),
        ("Rendering", rendering.reason()),
    ] {
        if let Some(reason) = reason {
            warnings.push(format!("{name} check degraded: {reason}"));
        }
    }

    let sitemap = sitemap.into_value();
    let schema = schema.into_value();
    let robots = robots.into_value();
    let cdn = cdn.into_value();
    let rendering = rendering.into_value();

    for broken in &sitemap.broken_urls {
        critical_issues.push(format!("Broken sitemap URL: {}", broken_label(broken)));
    }
    critical_issues.extend(robots.conflicts.iter().cloned());
    for broken in &schema.broken_schema_urls {
        critical_issues.push(format!("Broken structured-data URL: {}", broken_label(broken)));
    }

    if sitemap.total_sitemap_urls > sitemap.total_urls {
        warnings.push(format!(
            "Sitemap truncated: checking {} of {} URLs",
            sitemap.total_urls, sitemap.total_sitemap_urls
        ));
    }
    if sitemap.slow > 0 {
        warnings.push(format!("{} sitemap URLs responded slowly", sitemap.slow));
    }
    if robots.injection_suspected {
        warnings.push("robots.txt shows signs of third-party injection".to_string());
    }
    for path in &rendering.csr_bailouts {
        warnings.push(format!("Client-side rendering bailout on {path}"));
    }
    for path in &rendering.missing_content {
        warnings.push(format!("No article or heading content found on {path}"));
    }
    if cdn.sampled > 0 && cdn.hit_rate < 50.0 {
        warnings.push(format!("CDN cache hit rate low: {:.0}%", cdn.hit_rate));
    }

    let overall_score = compute_score(
        critical_issues.len(),
        warnings.len(),
        sitemap.broken,
        sitemap.checked_urls,
        if cdn.sampled > 0 { Some(cdn.hit_rate) } else { None },
    );

    AuditResult {
        sitemap,
        schema,
        robots,
        cdn,
        rendering,
        overall_score,
        critical_issues,
        warnings,
    }
}

/// Aggregate score: starts at 100, loses 15 per critical issue, 5 per
/// warning, up to 30 proportionally to the broken-URL ratio, and 10 when the
/// cache hit rate is under 50%. Clamped to 0–100.
pub fn compute_score(
    criticals: usize,
    warnings: usize,
    broken: usize,
    checked: usize,
    cache_hit_rate: Option<f64>,
) -> u8 {
    let mut score = 100.0;
    score -= 15.0 * criticals as f64;
    score -= 5.0 * warnings as f64;
    if checked > 0 {
        score -= (30.0 * broken as f64 / checked as f64).min(30.0);
    }
    if cache_hit_rate.is_some_and(|rate| rate < 50.0) {
        score -= 10.0;
    }
    score.clamp(0.0, 100.0).round() as u8
}
