//! The weekly research agent.
//!
//! Fetches each registered source (tolerating per-source failure), scores
//! and classifies the extracted articles, persists surviving findings, and
//! derives per-agent update directives. Only updates classified safe are
//! auto-applied, by writing a directive record for the target agent to pick
//! up on its next run.

use crate::classify::{
    affected_agents, categorize, priority_for, relevance_score, safe_to_auto_apply, update_kind,
    FindingCategory, InsightExtractor, UpdateKind, UpdatePriority, MIN_RELEVANCE,
};
use crate::extract::extract_entries;
use crate::sources::ResearchSource;
use chrono::{DateTime, Utc};
use cron::Schedule;
use serde::{Deserialize, Serialize};
use sitewarden_core::{WardenError, WardenResult};
use sitewarden_store::{ReportStore, StoredDirective, StoredFinding};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use uuid::Uuid;

/// Default weekly cadence: Mondays 06:00 UTC (7-field cron).
pub const DEFAULT_CADENCE: &str = "0 0 6 * * Mon *";

/// One scored research finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchFinding {
    /// Unique finding identifier.
    pub id: Uuid,
    /// Source the finding came from.
    pub source: String,
    /// Classified category.
    pub category: FindingCategory,
    /// Article title.
    pub title: String,
    /// Article summary, possibly empty.
    pub summary: String,
    /// Confidence, 0.0–1.0: relevance weighted by source reliability.
    pub confidence: f64,
    /// Actionable-insight substrings.
    pub insights: Vec<String>,
    /// Priority derived from category and source reliability.
    pub priority: UpdatePriority,
}

/// A proposed update for one agent, derived from one insight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentUpdate {
    /// Target agent.
    pub agent: String,
    /// The insight driving this update.
    pub insight: String,
    /// Priority inherited from the finding.
    pub priority: UpdatePriority,
    /// What kind of change is asked for.
    pub kind: UpdateKind,
    /// Whether the update qualifies for auto-apply.
    pub safe_to_auto_apply: bool,
}

/// The outcome of one research run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchRun {
    /// Findings that survived the relevance filter.
    pub findings: Vec<ResearchFinding>,
    /// Updates derived from the findings, one per (agent, insight).
    pub updates: Vec<AgentUpdate>,
    /// Updates auto-applied as directives.
    pub applied: usize,
    /// Sources that could not be fetched this run.
    pub sources_failed: usize,
}

/// Fetches, scores and persists weekly research findings.
pub struct ResearchAgent {
    sources: Vec<ResearchSource>,
    extractor: InsightExtractor,
    client: reqwest::Client,
    store: Arc<dyn ReportStore>,
    cadence: Schedule,
}

impl std::fmt::Debug for ResearchAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchAgent")
            .field("sources", &self.sources.len())
            .field("cadence", &self.cadence)
            .finish_non_exhaustive()
    }
}

impl ResearchAgent {
    /// Creates an agent over the given sources and store, with the default
    /// weekly cadence.
    pub fn new(sources: Vec<ResearchSource>, store: Arc<dyn ReportStore>) -> WardenResult<Self> {
        Self::with_cadence(sources, store, DEFAULT_CADENCE)
    }

    /// Creates an agent with a custom cron cadence.
    pub fn with_cadence(
        sources: Vec<ResearchSource>,
        store: Arc<dyn ReportStore>,
        cadence: &str,
    ) -> WardenResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| WardenError::Research(format!("failed to build client: {e}")))?;
        let cadence = Schedule::from_str(cadence)
            .map_err(|e| WardenError::Config(format!("invalid cadence '{cadence}': {e}")))?;
        Ok(Self {
            sources,
            extractor: InsightExtractor::new()?,
            client,
            store,
            cadence,
        })
    }

    /// The next scheduled fire time after now.
    pub fn next_run(&self) -> WardenResult<DateTime<Utc>> {
        self.cadence
            .upcoming(Utc)
            .next()
            .ok_or_else(|| WardenError::Config("cadence has no upcoming fire times".to_string()))
    }

    /// Runs one research pass. Source and persistence failures degrade the
    /// run instead of failing it.
    pub async fn run_weekly(&self, deadline: Instant) -> ResearchRun {
        let mut run = ResearchRun::default();

        for source in &self.sources {
            if Instant::now() >= deadline {
                warn!(source = %source.id, "research run out of budget, skipping remaining sources");
                break;
            }
            match self.client.get(&source.url).send().await {
                Ok(response) if response.status().is_success() => {
                    match response.text().await {
                        Ok(body) => self.process_source(source, &body, &mut run),
                        Err(e) => {
                            warn!(source = %source.id, error = %e, "failed to read source body");
                            run.sources_failed += 1;
                        }
                    }
                }
                Ok(response) => {
                    warn!(source = %source.id, status = %response.status(), "source fetch non-2xx");
                    run.sources_failed += 1;
                }
                Err(e) => {
                    warn!(source = %source.id, error = %e, "source fetch failed");
                    run.sources_failed += 1;
                }
            }
        }

        self.persist(&mut run).await;

        info!(
            findings = run.findings.len(),
            updates = run.updates.len(),
            applied = run.applied,
            failed_sources = run.sources_failed,
            "research run complete"
        );
        run
    }

    fn process_source(&self, source: &ResearchSource, body: &str, run: &mut ResearchRun) {
        for entry in extract_entries(body) {
            let text = format!("{} {}", entry.title, entry.summary);
            let relevance = relevance_score(&text);
            if relevance < MIN_RELEVANCE {
                continue;
            }
            let category = categorize(&text);
            let insights = self.extractor.extract(&text, &entry.title);
            let priority = priority_for(category, source.reliability);
            let finding = ResearchFinding {
                id: Uuid::new_v4(),
                source: source.id.clone(),
                category,
                title: entry.title,
                summary: entry.summary,
                confidence: (relevance * source.reliability).min(1.0),
                insights: insights.clone(),
                priority,
            };

            let kind = update_kind(category);
            for agent in affected_agents(category) {
                for insight in &insights {
                    run.updates.push(AgentUpdate {
                        agent: (*agent).to_string(),
                        insight: insight.clone(),
                        priority,
                        kind,
                        safe_to_auto_apply: safe_to_auto_apply(kind, insight),
                    });
                }
            }
            run.findings.push(finding);
        }
    }

    /// Persists findings and auto-applies safe updates. Store failures are
    /// logged and swallowed; the in-memory run is still returned.
    async fn persist(&self, run: &mut ResearchRun) {
        for finding in &run.findings {
            let stored = StoredFinding {
                id: finding.id,
                source: finding.source.clone(),
                category: finding.category.as_str().to_string(),
                title: finding.title.clone(),
                confidence: finding.confidence,
                payload: match serde_json::to_value(finding) {
                    Ok(v) => v,
                    Err(e) => {
                        warn!(error = %e, "failed to serialize finding");
                        continue;
                    }
                },
                created_at: Utc::now(),
            };
            if let Err(e) = self.store.append_finding(&stored).await {
                warn!(error = %e, "failed to persist finding");
            }
        }

        for update in &run.updates {
            if !update.safe_to_auto_apply {
                continue;
            }
            let urgency = match update.priority {
                UpdatePriority::Critical | UpdatePriority::High => "urgent",
                UpdatePriority::Medium | UpdatePriority::Low => "normal",
            };
            let directive = StoredDirective::new(&update.agent, &update.insight, urgency);
            match self.store.append_directive(&directive).await {
                Ok(()) => run.applied += 1,
                Err(e) => warn!(agent = %update.agent, error = %e, "failed to write directive"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitewarden_store::InMemoryStore;

    #[test]
    fn test_default_cadence_parses() {
        let store = Arc::new(InMemoryStore::new());
        let agent = ResearchAgent::new(Vec::new(), store).unwrap();
        assert!(agent.next_run().is_ok());
    }

    #[test]
    fn test_bad_cadence_rejected() {
        let store = Arc::new(InMemoryStore::new());
        let err = ResearchAgent::with_cadence(Vec::new(), store, "not a cron").unwrap_err();
        assert!(err.to_string().contains("Config"));
    }

    #[test]
    fn test_process_source_filters_and_derives() {
        let store = Arc::new(InMemoryStore::new());
        let agent = ResearchAgent::new(Vec::new(), store).unwrap();
        let source = ResearchSource {
            id: "test".into(),
            name: "Test".into(),
            url: "https://example.com/feed".into(),
            reliability: 0.9,
            topics: vec![],
        };
        let feed = "<rss>\
            <item><title>Google core update changes search ranking</title>\
                  <description>Sites should review thin content and update titles.</description></item>\
            <item><title>Banana bread recipe</title>\
                  <description>Delicious weekend baking.</description></item>\
            </rss>";
        let mut run = ResearchRun::default();
        agent.process_source(&source, feed, &mut run);

        // The recipe is irrelevant and discarded.
        assert_eq!(run.findings.len(), 1);
        let finding = &run.findings[0];
        assert_eq!(finding.category, FindingCategory::AlgorithmUpdate);
        assert_eq!(finding.priority, UpdatePriority::Critical);
        // Algorithm updates fan out to two agents.
        assert!(!run.updates.is_empty());
        assert!(run.updates.iter().any(|u| u.agent == "seo-optimizer"));
        assert!(run.updates.iter().any(|u| u.agent == "content-writer"));
        // Strategy-kind updates are never auto-applied.
        assert!(run.updates.iter().all(|u| !u.safe_to_auto_apply));
    }
}
