//! Report types produced by the coordinator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sitewarden_agents::SystemPerformance;
use sitewarden_audit::AuditResult;
use sitewarden_core::HealthStatus;
use sitewarden_goals::GoalEvaluation;
use sitewarden_research::ResearchRun;
use uuid::Uuid;

/// One prioritized follow-up action. Lower priority numbers are more urgent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrioritizedAction {
    /// Priority tier, 0 = most urgent.
    pub priority: u8,
    /// What to do.
    pub action: String,
    /// Which subsystem raised it.
    pub source: String,
}

/// A directive addressed to one background agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDirective {
    /// Target agent.
    pub agent: String,
    /// Directive text.
    pub directive: String,
    /// `urgent` or `normal`.
    pub urgency: String,
}

/// The full output of one orchestrator run. Created once, persisted, never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// Site the report describes.
    pub site: String,
    /// Weighted overall health score, 0–100.
    pub health_score: u8,
    /// Health band for the score.
    pub status: HealthStatus,
    /// Live audit snapshot.
    pub audit: AuditResult,
    /// Goal evaluations, most urgent first.
    pub goals: Vec<GoalEvaluation>,
    /// Agent fleet performance snapshot.
    pub agents: SystemPerformance,
    /// Research run output, when the budget allowed one.
    pub research: Option<ResearchRun>,
    /// Merged critical issues from all phases.
    pub critical_issues: Vec<String>,
    /// Prioritized follow-up actions, most urgent first.
    pub prioritized_actions: Vec<PrioritizedAction>,
    /// Per-agent directives.
    pub agent_directives: Vec<AgentDirective>,
    /// Wall-clock duration of the run, milliseconds.
    pub duration_ms: u64,
    /// When the run started.
    pub created_at: DateTime<Utc>,
}
