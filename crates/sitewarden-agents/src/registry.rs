//! The default agent registry.
//!
//! Immutable configuration for the known background agents. Passed into
//! [`crate::PerformanceMonitor`] at construction so tests and alternative
//! deployments can substitute their own fleet.

use serde::{Deserialize, Serialize};

/// Expectations for one background agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Stable agent identifier, matching its job-log records.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Expected run cadence. Values below 1.0 describe less-than-daily
    /// agents (e.g. 1/7 for weekly).
    pub expected_runs_per_day: f64,
    /// Maximum acceptable run duration, milliseconds.
    pub max_duration_ms: u64,
}

fn spec(id: &str, name: &str, expected_runs_per_day: f64, max_duration_ms: u64) -> AgentSpec {
    AgentSpec {
        id: id.to_string(),
        name: name.to_string(),
        expected_runs_per_day,
        max_duration_ms,
    }
}

/// The seven known background agents.
pub fn default_registry() -> Vec<AgentSpec> {
    vec![
        spec("content-writer", "Content Writer", 1.0, 300_000),
        spec("seo-optimizer", "SEO Optimizer", 1.0, 180_000),
        spec("link-builder", "Link Builder", 1.0, 120_000),
        spec("social-poster", "Social Poster", 2.0, 60_000),
        spec("email-digest", "Email Digest", 1.0 / 7.0, 120_000),
        spec("site-monitor", "Site Monitor", 4.0, 90_000),
        spec("research", "Weekly Research", 1.0 / 7.0, 600_000),
    ]
}
