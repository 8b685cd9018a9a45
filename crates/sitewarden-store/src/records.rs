//! Record types persisted by the store.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sitewarden_core::HealthStatus;
use uuid::Uuid;

/// Terminal status of a background agent job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// The job finished successfully.
    Completed,
    /// The job finished with an error.
    Failed,
    /// The job is still in flight.
    Running,
}

/// One background agent job execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    /// Unique record identifier.
    pub id: Uuid,
    /// Agent that ran the job.
    pub agent: String,
    /// Terminal (or in-flight) status.
    pub status: JobStatus,
    /// When the job started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// Items the job attempted.
    pub items_processed: u64,
    /// Items that succeeded.
    pub items_succeeded: u64,
    /// Items that failed.
    pub items_failed: u64,
}

impl JobRecord {
    /// Creates a completed job record.
    pub fn completed(agent: impl Into<String>, started_at: DateTime<Utc>, duration_ms: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            agent: agent.into(),
            status: JobStatus::Completed,
            started_at,
            duration_ms,
            items_processed: 0,
            items_succeeded: 0,
            items_failed: 0,
        }
    }

    /// Creates a failed job record.
    pub fn failed(agent: impl Into<String>, started_at: DateTime<Utc>, duration_ms: u64) -> Self {
        Self {
            status: JobStatus::Failed,
            ..Self::completed(agent, started_at, duration_ms)
        }
    }

    /// Sets the item counters.
    pub fn with_items(mut self, processed: u64, succeeded: u64, failed: u64) -> Self {
        self.items_processed = processed;
        self.items_succeeded = succeeded;
        self.items_failed = failed;
        self
    }
}

/// An immutable orchestrator report record. The payload is opaque JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// Site the report describes.
    pub site: String,
    /// Overall health score, 0–100.
    pub health_score: u8,
    /// Health band for the score.
    pub status: HealthStatus,
    /// Full report body, stored without interpretation.
    pub payload: serde_json::Value,
    /// When the run started.
    pub created_at: DateTime<Utc>,
}

/// The single mutable row: latest health per (site, day).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSnapshot {
    /// Site identifier.
    pub site: String,
    /// UTC date of the run that produced this snapshot.
    pub day: NaiveDate,
    /// Overall health score, 0–100.
    pub health_score: u8,
    /// Health band for the score.
    pub status: HealthStatus,
    /// When this snapshot was last written.
    pub updated_at: DateTime<Utc>,
}

/// A persisted research finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFinding {
    /// Unique finding identifier.
    pub id: Uuid,
    /// Source identifier the finding came from.
    pub source: String,
    /// Category slug, e.g. `algorithm_update`.
    pub category: String,
    /// Article title.
    pub title: String,
    /// Confidence score, 0.0–1.0.
    pub confidence: f64,
    /// Full finding body, stored without interpretation.
    pub payload: serde_json::Value,
    /// When the finding was recorded.
    pub created_at: DateTime<Utc>,
}

/// A directive written for a background agent to consume on its next run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDirective {
    /// Unique directive identifier.
    pub id: Uuid,
    /// Target agent.
    pub agent: String,
    /// Directive text.
    pub directive: String,
    /// Urgency slug: `urgent` or `normal`.
    pub urgency: String,
    /// Whether the target agent has consumed this directive.
    pub consumed: bool,
    /// When the directive was written.
    pub created_at: DateTime<Utc>,
}

impl StoredDirective {
    /// Creates an unconsumed directive.
    pub fn new(agent: impl Into<String>, directive: impl Into<String>, urgency: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            agent: agent.into(),
            directive: directive.into(),
            urgency: urgency.into(),
            consumed: false,
            created_at: Utc::now(),
        }
    }
}
