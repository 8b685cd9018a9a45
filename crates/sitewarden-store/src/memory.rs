//! In-memory store. Suitable for tests and dry runs; nothing survives the
//! process.

use crate::records::{
    HealthSnapshot, JobRecord, JobStatus, StoredDirective, StoredFinding, StoredReport,
};
use crate::ReportStore;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sitewarden_core::WardenResult;
use tokio::sync::RwLock;

/// In-process [`ReportStore`] backed by vectors behind an async lock.
#[derive(Default)]
pub struct InMemoryStore {
    reports: RwLock<Vec<StoredReport>>,
    snapshots: RwLock<Vec<HealthSnapshot>>,
    job_logs: RwLock<Vec<JobRecord>>,
    findings: RwLock<Vec<StoredFinding>>,
    directives: RwLock<Vec<StoredDirective>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted reports. Test helper.
    pub async fn report_count(&self) -> usize {
        self.reports.read().await.len()
    }

    /// Number of persisted findings. Test helper.
    pub async fn finding_count(&self) -> usize {
        self.findings.read().await.len()
    }

    /// Seeds job logs directly. Test helper.
    pub async fn seed_job_logs(&self, records: Vec<JobRecord>) {
        self.job_logs.write().await.extend(records);
    }
}

#[async_trait]
impl ReportStore for InMemoryStore {
    async fn append_report(&self, report: &StoredReport) -> WardenResult<()> {
        self.reports.write().await.push(report.clone());
        Ok(())
    }

    async fn latest_report(&self, site: &str) -> WardenResult<Option<StoredReport>> {
        let reports = self.reports.read().await;
        Ok(reports
            .iter()
            .filter(|r| r.site == site)
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn upsert_health_snapshot(&self, snapshot: &HealthSnapshot) -> WardenResult<()> {
        let mut snapshots = self.snapshots.write().await;
        if let Some(existing) = snapshots
            .iter_mut()
            .find(|s| s.site == snapshot.site && s.day == snapshot.day)
        {
            *existing = snapshot.clone();
        } else {
            snapshots.push(snapshot.clone());
        }
        Ok(())
    }

    async fn health_snapshot(
        &self,
        site: &str,
        day: NaiveDate,
    ) -> WardenResult<Option<HealthSnapshot>> {
        let snapshots = self.snapshots.read().await;
        Ok(snapshots
            .iter()
            .find(|s| s.site == site && s.day == day)
            .cloned())
    }

    async fn append_job_log(&self, record: &JobRecord) -> WardenResult<()> {
        self.job_logs.write().await.push(record.clone());
        Ok(())
    }

    async fn job_logs_since(
        &self,
        agent: &str,
        since: DateTime<Utc>,
    ) -> WardenResult<Vec<JobRecord>> {
        let logs = self.job_logs.read().await;
        let mut matched: Vec<JobRecord> = logs
            .iter()
            .filter(|r| r.agent == agent && r.started_at >= since)
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(matched)
    }

    async fn last_job_for_agent(&self, agent: &str) -> WardenResult<Option<JobRecord>> {
        let logs = self.job_logs.read().await;
        Ok(logs
            .iter()
            .filter(|r| r.agent == agent)
            .max_by_key(|r| r.started_at)
            .cloned())
    }

    async fn append_finding(&self, finding: &StoredFinding) -> WardenResult<()> {
        self.findings.write().await.push(finding.clone());
        Ok(())
    }

    async fn append_directive(&self, directive: &StoredDirective) -> WardenResult<()> {
        self.directives.write().await.push(directive.clone());
        Ok(())
    }

    async fn pending_directives_for(&self, agent: &str) -> WardenResult<Vec<StoredDirective>> {
        let directives = self.directives.read().await;
        let mut matched: Vec<StoredDirective> = directives
            .iter()
            .filter(|d| d.agent == agent && !d.consumed)
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matched)
    }
}
