//! Persistence layer for sitewarden.
//!
//! The store is an append-only writer: every orchestrator run creates fresh
//! records and nothing is updated in place, except the single per-(site, day)
//! health snapshot which is upserted with last-write-wins semantics.
//!
//! Report payloads are stored as opaque JSON; the store never interprets
//! them. Consumers treat record schemas as a black box.
//!
//! # Main types
//!
//! - [`ReportStore`] — Async storage seam used by every component.
//! - [`SqliteStore`] — Durable implementation backed by SQLite.
//! - [`InMemoryStore`] — In-process implementation for tests and dry runs.

/// In-memory store implementation.
pub mod memory;
/// Record types shared by all store implementations.
pub mod records;
/// SQLite-backed store implementation.
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sitewarden_core::WardenResult;

pub use memory::InMemoryStore;
pub use records::{
    HealthSnapshot, JobRecord, JobStatus, StoredDirective, StoredFinding, StoredReport,
};
pub use sqlite::SqliteStore;

/// Async storage seam over report, job-log, finding and directive records.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Appends one immutable orchestrator report.
    async fn append_report(&self, report: &StoredReport) -> WardenResult<()>;

    /// Returns the most recent report for a site, if any.
    async fn latest_report(&self, site: &str) -> WardenResult<Option<StoredReport>>;

    /// Upserts the per-(site, day) health snapshot. Last write wins.
    async fn upsert_health_snapshot(&self, snapshot: &HealthSnapshot) -> WardenResult<()>;

    /// Returns the health snapshot for a site and day, if any.
    async fn health_snapshot(&self, site: &str, day: NaiveDate)
        -> WardenResult<Option<HealthSnapshot>>;

    /// Appends one job execution record.
    async fn append_job_log(&self, record: &JobRecord) -> WardenResult<()>;

    /// Returns job records for an agent started at or after `since`, newest first.
    async fn job_logs_since(
        &self,
        agent: &str,
        since: DateTime<Utc>,
    ) -> WardenResult<Vec<JobRecord>>;

    /// Returns the most recent job record for an agent, if any.
    async fn last_job_for_agent(&self, agent: &str) -> WardenResult<Option<JobRecord>>;

    /// Appends one research finding.
    async fn append_finding(&self, finding: &StoredFinding) -> WardenResult<()>;

    /// Appends one agent directive.
    async fn append_directive(&self, directive: &StoredDirective) -> WardenResult<()>;

    /// Returns unconsumed directives for an agent, oldest first.
    async fn pending_directives_for(&self, agent: &str) -> WardenResult<Vec<StoredDirective>>;
}
