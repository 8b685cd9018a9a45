//! The orchestrator coordinator.
//!
//! One run walks six phases against a single deadline computed at entry:
//! parallel fan-out (audit, agent analysis, metric collection), audit-metric
//! merge, goal evaluation, optional research, synthesis, persistence. Every
//! phase is fault-isolated; the coordinator itself never fails, it returns
//! a best-effort report whose issue lists communicate degraded confidence.

use crate::metrics::MetricsSource;
use crate::types::{AgentDirective, OrchestratorReport, PrioritizedAction};
use chrono::Utc;
use sitewarden_agents::{AgentHealth, PerformanceMonitor, SystemPerformance};
use sitewarden_audit::{AuditResult, SiteAuditor};
use sitewarden_core::{HealthStatus, MetricsMap, SiteConfig};
use sitewarden_goals::{evaluate, BusinessGoal, GoalEvaluation, KpiStatus};
use sitewarden_research::{ResearchAgent, ResearchRun, UpdatePriority};
use sitewarden_store::{HealthSnapshot, ReportStore, StoredReport};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use uuid::Uuid;

/// Coordinator timing configuration.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Overall budget for one run.
    pub max_duration: Duration,
    /// Sitemap URL cap handed to the auditor.
    pub max_sitemap_urls: usize,
    /// Minimum budget that must remain for the research phase to start.
    pub research_reserve: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_duration: Duration::from_secs(300),
            max_sitemap_urls: 50,
            research_reserve: Duration::from_secs(15),
        }
    }
}

/// Drives the audit, evaluation, research and synthesis phases for one site.
pub struct Coordinator {
    auditor: SiteAuditor,
    monitor: PerformanceMonitor,
    metrics: Arc<dyn MetricsSource>,
    store: Arc<dyn ReportStore>,
    catalogue: Vec<BusinessGoal>,
    research: Option<ResearchAgent>,
    config: CoordinatorConfig,
}

impl Coordinator {
    /// Creates a coordinator with the default catalogue, no research agent,
    /// and default timing.
    pub fn new(
        auditor: SiteAuditor,
        monitor: PerformanceMonitor,
        metrics: Arc<dyn MetricsSource>,
        store: Arc<dyn ReportStore>,
    ) -> Self {
        Self {
            auditor,
            monitor,
            metrics,
            store,
            catalogue: sitewarden_goals::default_catalogue(),
            research: None,
            config: CoordinatorConfig::default(),
        }
    }

    /// Replaces the goal catalogue.
    pub fn with_catalogue(mut self, catalogue: Vec<BusinessGoal>) -> Self {
        self.catalogue = catalogue;
        self
    }

    /// Attaches a research agent for phase 4.
    pub fn with_research(mut self, research: ResearchAgent) -> Self {
        self.research = Some(research);
        self
    }

    /// Replaces the timing configuration.
    pub fn with_config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs the full pipeline for one site. Never fails.
    pub async fn run(&self, site: &SiteConfig) -> OrchestratorReport {
        let start = Instant::now();
        let started_at = Utc::now();
        let deadline = start + self.config.max_duration;

        info!(site = %site.id, budget_secs = self.config.max_duration.as_secs(), "orchestrator: starting run");

        // Phase 1: parallel fan-out, each branch fault-isolated.
        let (audit, agents, collected) = tokio::join!(
            self.auditor.audit(site, self.config.max_sitemap_urls, deadline),
            self.analyze_agents(),
            self.collect_metrics(site),
        );

        // Phase 2: merge live-audit-derived metrics.
        let mut metrics = collected;
        merge_audit_metrics(&mut metrics, &audit);

        // Phase 3: goal evaluation.
        let goals = evaluate(&self.catalogue, &metrics);
        info!(site = %site.id, goals = goals.len(), "orchestrator: goals evaluated");

        // Phase 4: research, only with enough budget left.
        let research = match &self.research {
            Some(agent) if Instant::now() + self.config.research_reserve < deadline => {
                Some(agent.run_weekly(deadline).await)
            }
            Some(_) => {
                warn!(site = %site.id, "orchestrator: skipping research phase, budget exhausted");
                None
            }
            None => None,
        };

        // Phase 5: synthesis.
        let critical_issues = merge_critical_issues(&audit, &goals, &agents);
        let prioritized_actions = build_actions(&audit, &goals, &agents, research.as_ref());
        let agent_directives = build_directives(&agents, research.as_ref());
        let health_score = health_score(&audit, &goals, &agents);
        let status = HealthStatus::from_score(health_score);

        let report = OrchestratorReport {
            id: Uuid::new_v4(),
            site: site.id.clone(),
            health_score,
            status,
            audit,
            goals,
            agents,
            research,
            critical_issues,
            prioritized_actions,
            agent_directives,
            duration_ms: start.elapsed().as_millis() as u64,
            created_at: started_at,
        };

        // Phase 6: persistence. Failures are logged, never surfaced.
        self.persist(&report).await;

        info!(
            site = %site.id,
            score = report.health_score,
            status = %report.status,
            criticals = report.critical_issues.len(),
            duration_ms = report.duration_ms,
            "orchestrator: run complete"
        );
        report
    }

    async fn analyze_agents(&self) -> SystemPerformance {
        match self.monitor.analyze(Utc::now()).await {
            Ok(perf) => perf,
            Err(e) => {
                warn!(error = %e, "agent analysis failed, continuing with empty snapshot");
                SystemPerformance::default()
            }
        }
    }

    async fn collect_metrics(&self, site: &SiteConfig) -> MetricsMap {
        match self.metrics.collect(site).await {
            Ok(metrics) => metrics,
            Err(e) => {
                warn!(error = %e, "metric collection failed, continuing with empty map");
                MetricsMap::new()
            }
        }
    }

    async fn persist(&self, report: &OrchestratorReport) {
        let payload = match serde_json::to_value(report) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "failed to serialize report, skipping persistence");
                return;
            }
        };
        let stored = StoredReport {
            id: report.id,
            site: report.site.clone(),
            health_score: report.health_score,
            status: report.status,
            payload,
            created_at: report.created_at,
        };
        if let Err(e) = self.store.append_report(&stored).await {
            warn!(error = %e, "failed to persist report");
        }

        let snapshot = HealthSnapshot {
            site: report.site.clone(),
            day: report.created_at.date_naive(),
            health_score: report.health_score,
            status: report.status,
            updated_at: Utc::now(),
        };
        if let Err(e) = self.store.upsert_health_snapshot(&snapshot).await {
            warn!(error = %e, "failed to upsert health snapshot");
        }
    }
}

/// Folds live-audit results into the metrics map under stable keys.
pub fn merge_audit_metrics(metrics: &mut MetricsMap, audit: &AuditResult) {
    if audit.sitemap.checked_urls > 0 {
        metrics.insert(
            "sitemap_health_pct".to_string(),
            audit.sitemap.healthy as f64 / audit.sitemap.checked_urls as f64 * 100.0,
        );
    }
    metrics.insert(
        "broken_sitemap_urls".to_string(),
        audit.sitemap.broken as f64,
    );
    metrics.insert(
        "schema_valid".to_string(),
        if audit.schema.valid { 1.0 } else { 0.0 },
    );
    metrics.insert(
        "robots_conflicts".to_string(),
        audit.robots.conflicts.len() as f64,
    );
    if audit.cdn.sampled > 0 {
        metrics.insert("cache_hit_rate".to_string(), audit.cdn.hit_rate);
    }
    metrics.insert(
        "ai_crawlers_allowed".to_string(),
        audit.robots.allowed_crawlers.len() as f64,
    );
}

/// Merges critical issues from every phase.
pub fn merge_critical_issues(
    audit: &AuditResult,
    goals: &[GoalEvaluation],
    agents: &SystemPerformance,
) -> Vec<String> {
    let mut issues = audit.critical_issues.clone();
    for agent in &agents.agents {
        match agent.health {
            AgentHealth::Stalled => issues.push(format!("Agent {} is stalled", agent.agent)),
            AgentHealth::Failing => issues.push(format!("Agent {} is failing", agent.agent)),
            _ => {}
        }
    }
    for goal in goals {
        if goal.overall_status == KpiStatus::Critical {
            issues.push(format!("Goal '{}' is in a critical state", goal.name));
        }
    }
    issues
}

/// Builds the prioritized action list. Fixed tiers: broken sitemap URLs and
/// robots conflicts at 0, broken schema and stalled agents at 1, CSR
/// bailouts at 2, low cache hit at 3; KPI- and research-driven actions
/// interleave at 1–4.
pub fn build_actions(
    audit: &AuditResult,
    goals: &[GoalEvaluation],
    agents: &SystemPerformance,
    research: Option<&ResearchRun>,
) -> Vec<PrioritizedAction> {
    let mut actions = Vec::new();
    let mut push = |priority: u8, action: String, source: &str| {
        actions.push(PrioritizedAction {
            priority,
            action,
            source: source.to_string(),
        });
    };

    for broken in &audit.sitemap.broken_urls {
        push(0, format!("Fix broken sitemap URL {}", broken.url), "audit");
    }
    for conflict in &audit.robots.conflicts {
        push(0, format!("Resolve robots conflict: {conflict}"), "audit");
    }
    for broken in &audit.schema.broken_schema_urls {
        push(1, format!("Fix broken structured-data URL {}", broken.url), "audit");
    }
    for agent in &agents.agents {
        if matches!(agent.health, AgentHealth::Stalled | AgentHealth::Failing) {
            push(
                1,
                format!("Investigate agent {}: {}", agent.agent, agent.issues.join("; ")),
                "agents",
            );
        }
    }
    for path in &audit.rendering.csr_bailouts {
        push(2, format!("Restore server rendering on {path}"), "audit");
    }
    if audit.cdn.sampled > 0 && audit.cdn.hit_rate < 50.0 {
        push(
            3,
            format!("Improve CDN cache hit rate ({:.0}%)", audit.cdn.hit_rate),
            "audit",
        );
    }

    for goal in goals {
        match goal.overall_status {
            KpiStatus::Critical => push(
                1,
                format!("Recover goal '{}' (critical KPI)", goal.name),
                "goals",
            ),
            KpiStatus::Behind => push(3, format!("Close the gap on goal '{}'", goal.name), "goals"),
            _ => {}
        }
    }

    if let Some(run) = research {
        for finding in &run.findings {
            let priority = match finding.priority {
                UpdatePriority::Critical => 1,
                UpdatePriority::High => 2,
                UpdatePriority::Medium => 3,
                UpdatePriority::Low => 4,
            };
            if let Some(insight) = finding.insights.first() {
                push(priority, format!("Apply research insight: {insight}"), "research");
            }
        }
    }

    actions.sort_by_key(|a| a.priority);
    actions
}

/// Builds per-agent directives: urgent for stalled/failing agents, one per
/// research update otherwise.
pub fn build_directives(
    agents: &SystemPerformance,
    research: Option<&ResearchRun>,
) -> Vec<AgentDirective> {
    let mut directives = Vec::new();
    for agent in &agents.agents {
        if matches!(agent.health, AgentHealth::Stalled | AgentHealth::Failing) {
            directives.push(AgentDirective {
                agent: agent.agent.clone(),
                directive: format!("Recover from: {}", agent.issues.join("; ")),
                urgency: "urgent".to_string(),
            });
        }
    }
    if let Some(run) = research {
        for update in &run.updates {
            let urgency = match update.priority {
                UpdatePriority::Critical | UpdatePriority::High => "urgent",
                _ => "normal",
            };
            directives.push(AgentDirective {
                agent: update.agent.clone(),
                directive: update.insight.clone(),
                urgency: urgency.to_string(),
            });
        }
    }
    directives
}

/// Weighted overall health: 40% live audit, 35% goal statuses, 25% agent
/// fleet health.
pub fn health_score(
    audit: &AuditResult,
    goals: &[GoalEvaluation],
    agents: &SystemPerformance,
) -> u8 {
    let audit_component = audit.overall_score as f64;

    let goals_component = if goals.is_empty() {
        100.0
    } else {
        goals
            .iter()
            .map(|g| match g.overall_status {
                KpiStatus::Achieved => 100.0,
                KpiStatus::OnTrack => 75.0,
                KpiStatus::Behind => 40.0,
                KpiStatus::Critical => 0.0,
            })
            .sum::<f64>()
            / goals.len() as f64
    };

    let agents_component = if agents.agents.is_empty() {
        100.0
    } else {
        agents
            .agents
            .iter()
            .map(|a| match a.health {
                AgentHealth::Healthy => 100.0,
                AgentHealth::Degraded => 60.0,
                AgentHealth::Stalled => 25.0,
                AgentHealth::Failing => 0.0,
            })
            .sum::<f64>()
            / agents.agents.len() as f64
    };

    let score = 0.40 * audit_component + 0.35 * goals_component + 0.25 * agents_component;
    score.clamp(0.0, 100.0).round() as u8
}
