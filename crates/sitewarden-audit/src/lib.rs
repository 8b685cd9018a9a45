//! Live site audits: sitemap health, structured-data validity, robots
//! directive conflicts, CDN cache sampling, and rendering-mode detection.
//!
//! All outbound I/O is time-boxed twice: every request carries its own short
//! timeout, and the sitemap batch loop checks the shared deadline before
//! starting new work. A failed sub-check degrades to its typed default and
//! surfaces its reason as a warning; the audit itself never fails.
//!
//! # Main types
//!
//! - [`SiteAuditor`] — Runs the five sub-checks concurrently and scores the result.
//! - [`AuditResult`] — Immutable aggregate snapshot of one audit run.
//! - [`ProbeClient`] — Shared HEAD-probe / GET-fetch HTTP client pair.

/// The audit coordinator and scoring.
pub mod auditor;
/// CDN cache-hit sampling.
pub mod cdn;
/// Outbound HTTP probe client.
pub mod probe;
/// Rendering-mode detection.
pub mod rendering;
/// Robots-directive conflict detection.
pub mod robots;
/// Structured-data (JSON-LD) URL validation.
pub mod schema;
/// Sitemap URL health.
pub mod sitemap;
/// Audit result types.
pub mod types;

pub use auditor::{AuditConfig, SiteAuditor};
pub use probe::{FetchedPage, Probe, ProbeClient};
pub use types::{
    AuditResult, BrokenUrl, CdnPerformance, RenderingCheck, RobotsAudit, SchemaValidation,
    SitemapHealth,
};
