//! Background agent performance monitoring.
//!
//! Classifies each known agent's health from its historical job records:
//! run cadence over 24 hours, success rate and durations over 7 days, and
//! staleness of the last run. Classification is a worsen-only ladder: a
//! later check can downgrade health but never restore it.
//!
//! # Main types
//!
//! - [`AgentSpec`] / [`default_registry`] — Immutable agent configuration.
//! - [`PerformanceMonitor`] — Store-backed analysis over job records.
//! - [`SystemPerformance`] — Snapshot of every agent plus the system rollup.

/// The default agent registry.
pub mod registry;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sitewarden_core::WardenResult;
use sitewarden_store::{JobRecord, JobStatus, ReportStore};
use std::sync::Arc;
use tracing::{debug, warn};

pub use registry::{default_registry, AgentSpec};

/// Health classification for one agent. Ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentHealth {
    /// Running on cadence and succeeding.
    Healthy,
    /// Succeeding, but with elevated failures, slow runs, or a failed last run.
    Degraded,
    /// Not running on its expected cadence.
    Stalled,
    /// Failing more often than succeeding.
    Failing,
}

/// Rollup of the whole agent fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemHealth {
    /// All agents healthy, at most one degraded.
    Healthy,
    /// More than one agent degraded.
    Degraded,
    /// At least one agent failing or stalled.
    Critical,
}

/// Performance snapshot for one agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStatus {
    /// Agent identifier.
    pub agent: String,
    /// Runs in the last 24 hours.
    pub runs_24h: usize,
    /// Runs in the last 7 days.
    pub runs_7d: usize,
    /// Percentage of 7-day runs with status `completed`.
    pub success_rate: f64,
    /// Mean run duration over 7 days, milliseconds.
    pub avg_duration_ms: u64,
    /// Items attempted over 7 days.
    pub items_processed: u64,
    /// Items succeeded over 7 days.
    pub items_succeeded: u64,
    /// Items failed over 7 days.
    pub items_failed: u64,
    /// Derived health classification.
    pub health: AgentHealth,
    /// Free-text notes explaining the classification.
    pub issues: Vec<String>,
}

/// Snapshot of every agent plus the system rollup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemPerformance {
    /// Per-agent snapshots, in registry order.
    pub agents: Vec<AgentStatus>,
    /// Fleet rollup.
    pub overall: SystemHealth,
}

impl Default for SystemPerformance {
    fn default() -> Self {
        Self {
            agents: Vec::new(),
            overall: SystemHealth::Healthy,
        }
    }
}

/// Store-backed performance analysis over the agent registry.
pub struct PerformanceMonitor {
    registry: Vec<AgentSpec>,
    store: Arc<dyn ReportStore>,
}

impl PerformanceMonitor {
    /// Creates a monitor over the given registry and store.
    pub fn new(registry: Vec<AgentSpec>, store: Arc<dyn ReportStore>) -> Self {
        Self { registry, store }
    }

    /// Analyzes every registered agent as of `now`.
    pub async fn analyze(&self, now: DateTime<Utc>) -> WardenResult<SystemPerformance> {
        let mut agents = Vec::with_capacity(self.registry.len());
        for spec in &self.registry {
            match self.analyze_agent(spec, now).await {
                Ok(status) => agents.push(status),
                Err(e) => {
                    warn!(agent = %spec.id, error = %e, "agent analysis failed, recording stalled");
                    agents.push(AgentStatus {
                        agent: spec.id.clone(),
                        runs_24h: 0,
                        runs_7d: 0,
                        success_rate: 0.0,
                        avg_duration_ms: 0,
                        items_processed: 0,
                        items_succeeded: 0,
                        items_failed: 0,
                        health: AgentHealth::Stalled,
                        issues: vec![format!("analysis failed: {e}")],
                    });
                }
            }
        }
        let overall = system_health(&agents);
        Ok(SystemPerformance { agents, overall })
    }

    async fn analyze_agent(
        &self,
        spec: &AgentSpec,
        now: DateTime<Utc>,
    ) -> WardenResult<AgentStatus> {
        let week = self
            .store
            .job_logs_since(&spec.id, now - Duration::days(7))
            .await?;
        let last_run = self.store.last_job_for_agent(&spec.id).await?;
        let runs_24h = week
            .iter()
            .filter(|r| r.started_at >= now - Duration::hours(24))
            .count();

        Ok(classify(spec, &week, runs_24h, last_run.as_ref(), now))
    }
}

/// Classifies one agent from its job history. Worsen-only ladder.
pub fn classify(
    spec: &AgentSpec,
    week: &[JobRecord],
    runs_24h: usize,
    last_run: Option<&JobRecord>,
    now: DateTime<Utc>,
) -> AgentStatus {
    let runs_7d = week.len();
    let completed = week.iter().filter(|r| r.status == JobStatus::Completed).count();
    let success_rate = if runs_7d > 0 {
        completed as f64 / runs_7d as f64 * 100.0
    } else {
        0.0
    };
    let avg_duration_ms = if runs_7d > 0 {
        week.iter().map(|r| r.duration_ms).sum::<u64>() / runs_7d as u64
    } else {
        0
    };

    let mut health = AgentHealth::Healthy;
    let mut issues = Vec::new();
    let mut worsen = |h: AgentHealth, current: &mut AgentHealth| {
        if h > *current {
            *current = h;
        }
    };

    // Cadence over the last 24 hours, only meaningful for at-least-daily agents.
    if spec.expected_runs_per_day >= 1.0 && (runs_24h as f64) < spec.expected_runs_per_day * 0.5 {
        issues.push(format!(
            "only {} runs in 24h, expected {}",
            runs_24h, spec.expected_runs_per_day
        ));
        worsen(AgentHealth::Stalled, &mut health);
    }

    // Success rate needs more than two samples to mean anything.
    if runs_7d > 2 {
        if success_rate < 50.0 {
            issues.push(format!("success rate {success_rate:.0}% over 7d"));
            worsen(AgentHealth::Failing, &mut health);
        } else if success_rate < 80.0 {
            issues.push(format!("success rate {success_rate:.0}% over 7d"));
            worsen(AgentHealth::Degraded, &mut health);
        }
    }

    if avg_duration_ms as f64 > spec.max_duration_ms as f64 * 0.9 {
        issues.push(format!(
            "average duration {avg_duration_ms}ms near the {}ms limit",
            spec.max_duration_ms
        ));
        worsen(AgentHealth::Degraded, &mut health);
    }

    match last_run {
        Some(last) => {
            if last.status == JobStatus::Failed {
                issues.push("last run failed".to_string());
                worsen(AgentHealth::Degraded, &mut health);
            }
            if spec.expected_runs_per_day > 0.0 {
                let expected_interval_hours = 24.0 / spec.expected_runs_per_day;
                let hours_since = (now - last.started_at).num_minutes() as f64 / 60.0;
                if hours_since > 2.0 * expected_interval_hours {
                    issues.push(format!("no run for {hours_since:.0}h"));
                    worsen(AgentHealth::Stalled, &mut health);
                }
            }
        }
        None => {
            issues.push("no recorded runs".to_string());
        }
    }

    debug!(agent = %spec.id, health = ?health, "agent classified");

    AgentStatus {
        agent: spec.id.clone(),
        runs_24h,
        runs_7d,
        success_rate,
        avg_duration_ms,
        items_processed: week.iter().map(|r| r.items_processed).sum(),
        items_succeeded: week.iter().map(|r| r.items_succeeded).sum(),
        items_failed: week.iter().map(|r| r.items_failed).sum(),
        health,
        issues,
    }
}

/// Fleet rollup: critical beats degraded beats healthy.
pub fn system_health(agents: &[AgentStatus]) -> SystemHealth {
    let any_down = agents
        .iter()
        .any(|a| matches!(a.health, AgentHealth::Failing | AgentHealth::Stalled));
    if any_down {
        return SystemHealth::Critical;
    }
    let degraded = agents
        .iter()
        .filter(|a| a.health == AgentHealth::Degraded)
        .count();
    if degraded > 1 {
        SystemHealth::Degraded
    } else {
        SystemHealth::Healthy
    }
}
