//! SQLite-backed store.
//!
//! A single connection behind a mutex; every call site holds the lock only
//! for the duration of one statement. Concurrent same-day runs racing on the
//! snapshot row are resolved by the upsert's last-write-wins semantics.

use crate::records::{
    HealthSnapshot, JobRecord, JobStatus, StoredDirective, StoredFinding, StoredReport,
};
use crate::ReportStore;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;
use sitewarden_core::{HealthStatus, WardenError, WardenResult};
use std::path::Path;
use std::sync::Mutex;
use uuid::Uuid;

/// Durable [`ReportStore`] backed by SQLite.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

fn db_err(e: rusqlite::Error) -> WardenError {
    WardenError::Store(e.to_string())
}

fn status_to_str(status: HealthStatus) -> &'static str {
    match status {
        HealthStatus::Excellent => "excellent",
        HealthStatus::Good => "good",
        HealthStatus::NeedsAttention => "needs_attention",
        HealthStatus::Critical => "critical",
    }
}

fn status_from_str(s: &str) -> HealthStatus {
    match s {
        "excellent" => HealthStatus::Excellent,
        "good" => HealthStatus::Good,
        "needs_attention" => HealthStatus::NeedsAttention,
        _ => HealthStatus::Critical,
    }
}

fn job_status_to_str(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Completed => "completed",
        JobStatus::Failed => "failed",
        JobStatus::Running => "running",
    }
}

fn job_status_from_str(s: &str) -> JobStatus {
    match s {
        "completed" => JobStatus::Completed,
        "running" => JobStatus::Running,
        _ => JobStatus::Failed,
    }
}

fn parse_timestamp(s: &str) -> WardenResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| WardenError::Store(format!("bad timestamp '{s}': {e}")))
}

fn parse_uuid(s: &str) -> WardenResult<Uuid> {
    Uuid::parse_str(s).map_err(|e| WardenError::Store(format!("bad uuid '{s}': {e}")))
}

impl SqliteStore {
    /// Opens (or creates) the database at `path` and ensures the schema.
    pub fn open(path: impl AsRef<Path>) -> WardenResult<Self> {
        let conn = Connection::open(path).map_err(db_err)?;
        Self::with_connection(conn)
    }

    /// Opens an in-memory database. Test helper.
    pub fn open_in_memory() -> WardenResult<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> WardenResult<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS reports (
                 id TEXT PRIMARY KEY,
                 site TEXT NOT NULL,
                 health_score INTEGER NOT NULL,
                 status TEXT NOT NULL,
                 payload TEXT NOT NULL,
                 created_at TEXT NOT NULL
             );
             CREATE INDEX IF NOT EXISTS idx_reports_site ON reports (site, created_at);
             CREATE TABLE IF NOT EXISTS health_snapshots (
                 site TEXT NOT NULL,
                 day TEXT NOT NULL,
                 health_score INTEGER NOT NULL,
                 status TEXT NOT NULL,
                 updated_at TEXT NOT NULL,
                 PRIMARY KEY (site, day)
             );
             CREATE TABLE IF NOT EXISTS job_logs (
                 id TEXT PRIMARY KEY,
                 agent TEXT NOT NULL,
                 status TEXT NOT NULL,
                 started_at TEXT NOT NULL,
                 duration_ms INTEGER NOT NULL,
                 items_processed INTEGER NOT NULL,
                 items_succeeded INTEGER NOT NULL,
                 items_failed INTEGER NOT NULL
             );
             CREATE INDEX IF NOT EXISTS idx_job_logs_agent ON job_logs (agent, started_at);
             CREATE TABLE IF NOT EXISTS research_findings (
                 id TEXT PRIMARY KEY,
                 source TEXT NOT NULL,
                 category TEXT NOT NULL,
                 title TEXT NOT NULL,
                 confidence REAL NOT NULL,
                 payload TEXT NOT NULL,
                 created_at TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS agent_directives (
                 id TEXT PRIMARY KEY,
                 agent TEXT NOT NULL,
                 directive TEXT NOT NULL,
                 urgency TEXT NOT NULL,
                 consumed INTEGER NOT NULL DEFAULT 0,
                 created_at TEXT NOT NULL
             );
             CREATE INDEX IF NOT EXISTS idx_directives_agent ON agent_directives (agent, consumed);",
        )
        .map_err(db_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> WardenResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| WardenError::Store("store lock poisoned".to_string()))
    }
}

#[async_trait]
impl ReportStore for SqliteStore {
    async fn append_report(&self, report: &StoredReport) -> WardenResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO reports (id, site, health_score, status, payload, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                report.id.to_string(),
                report.site,
                report.health_score,
                status_to_str(report.status),
                report.payload.to_string(),
                report.created_at.to_rfc3339(),
            ],
        )
        .map_err(db_err)?;
        Ok(())
    }

    async fn latest_report(&self, site: &str) -> WardenResult<Option<StoredReport>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, site, health_score, status, payload, created_at
                 FROM reports WHERE site = ?1 ORDER BY created_at DESC LIMIT 1",
            )
            .map_err(db_err)?;
        let mut rows = stmt.query([site]).map_err(db_err)?;
        let Some(row) = rows.next().map_err(db_err)? else {
            return Ok(None);
        };
        let id: String = row.get(0).map_err(db_err)?;
        let site: String = row.get(1).map_err(db_err)?;
        let health_score: u8 = row.get(2).map_err(db_err)?;
        let status: String = row.get(3).map_err(db_err)?;
        let payload: String = row.get(4).map_err(db_err)?;
        let created_at: String = row.get(5).map_err(db_err)?;
        Ok(Some(StoredReport {
            id: parse_uuid(&id)?,
            site,
            health_score,
            status: status_from_str(&status),
            payload: serde_json::from_str(&payload)?,
            created_at: parse_timestamp(&created_at)?,
        }))
    }

    async fn upsert_health_snapshot(&self, snapshot: &HealthSnapshot) -> WardenResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO health_snapshots (site, day, health_score, status, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (site, day) DO UPDATE SET
                 health_score = excluded.health_score,
                 status = excluded.status,
                 updated_at = excluded.updated_at",
            rusqlite::params![
                snapshot.site,
                snapshot.day.format("%Y-%m-%d").to_string(),
                snapshot.health_score,
                status_to_str(snapshot.status),
                snapshot.updated_at.to_rfc3339(),
            ],
        )
        .map_err(db_err)?;
        Ok(())
    }

    async fn health_snapshot(
        &self,
        site: &str,
        day: NaiveDate,
    ) -> WardenResult<Option<HealthSnapshot>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT site, day, health_score, status, updated_at
                 FROM health_snapshots WHERE site = ?1 AND day = ?2",
            )
            .map_err(db_err)?;
        let mut rows = stmt
            .query(rusqlite::params![site, day.format("%Y-%m-%d").to_string()])
            .map_err(db_err)?;
        let Some(row) = rows.next().map_err(db_err)? else {
            return Ok(None);
        };
        let site: String = row.get(0).map_err(db_err)?;
        let day_str: String = row.get(1).map_err(db_err)?;
        let health_score: u8 = row.get(2).map_err(db_err)?;
        let status: String = row.get(3).map_err(db_err)?;
        let updated_at: String = row.get(4).map_err(db_err)?;
        Ok(Some(HealthSnapshot {
            site,
            day: NaiveDate::parse_from_str(&day_str, "%Y-%m-%d")
                .map_err(|e| WardenError::Store(format!("bad day '{day_str}': {e}")))?,
            health_score,
            status: status_from_str(&status),
            updated_at: parse_timestamp(&updated_at)?,
        }))
    }

    async fn append_job_log(&self, record: &JobRecord) -> WardenResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO job_logs (id, agent, status, started_at, duration_ms,
                                   items_processed, items_succeeded, items_failed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                record.id.to_string(),
                record.agent,
                job_status_to_str(record.status),
                record.started_at.to_rfc3339(),
                record.duration_ms,
                record.items_processed,
                record.items_succeeded,
                record.items_failed,
            ],
        )
        .map_err(db_err)?;
        Ok(())
    }

    async fn job_logs_since(
        &self,
        agent: &str,
        since: DateTime<Utc>,
    ) -> WardenResult<Vec<JobRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, agent, status, started_at, duration_ms,
                        items_processed, items_succeeded, items_failed
                 FROM job_logs WHERE agent = ?1 AND started_at >= ?2
                 ORDER BY started_at DESC",
            )
            .map_err(db_err)?;
        let mut rows = stmt
            .query(rusqlite::params![agent, since.to_rfc3339()])
            .map_err(db_err)?;
        let mut records = Vec::new();
        while let Some(row) = rows.next().map_err(db_err)? {
            records.push(row_to_job(row)?);
        }
        Ok(records)
    }

    async fn last_job_for_agent(&self, agent: &str) -> WardenResult<Option<JobRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, agent, status, started_at, duration_ms,
                        items_processed, items_succeeded, items_failed
                 FROM job_logs WHERE agent = ?1 ORDER BY started_at DESC LIMIT 1",
            )
            .map_err(db_err)?;
        let mut rows = stmt.query([agent]).map_err(db_err)?;
        match rows.next().map_err(db_err)? {
            Some(row) => Ok(Some(row_to_job(row)?)),
            None => Ok(None),
        }
    }

    async fn append_finding(&self, finding: &StoredFinding) -> WardenResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO research_findings (id, source, category, title, confidence, payload, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                finding.id.to_string(),
                finding.source,
                finding.category,
                finding.title,
                finding.confidence,
                finding.payload.to_string(),
                finding.created_at.to_rfc3339(),
            ],
        )
        .map_err(db_err)?;
        Ok(())
    }

    async fn append_directive(&self, directive: &StoredDirective) -> WardenResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO agent_directives (id, agent, directive, urgency, consumed, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                directive.id.to_string(),
                directive.agent,
                directive.directive,
                directive.urgency,
                directive.consumed as i64,
                directive.created_at.to_rfc3339(),
            ],
        )
        .map_err(db_err)?;
        Ok(())
    }

    async fn pending_directives_for(&self, agent: &str) -> WardenResult<Vec<StoredDirective>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, agent, directive, urgency, consumed, created_at
                 FROM agent_directives WHERE agent = ?1 AND consumed = 0
                 ORDER BY created_at ASC",
            )
            .map_err(db_err)?;
        let mut rows = stmt.query([agent]).map_err(db_err)?;
        let mut directives = Vec::new();
        while let Some(row) = rows.next().map_err(db_err)? {
            let id: String = row.get(0).map_err(db_err)?;
            let agent: String = row.get(1).map_err(db_err)?;
            let directive: String = row.get(2).map_err(db_err)?;
            let urgency: String = row.get(3).map_err(db_err)?;
            let consumed: i64 = row.get(4).map_err(db_err)?;
            let created_at: String = row.get(5).map_err(db_err)?;
            directives.push(StoredDirective {
                id: parse_uuid(&id)?,
                agent,
                directive,
                urgency,
                consumed: consumed != 0,
                created_at: parse_timestamp(&created_at)?,
            });
        }
        Ok(directives)
    }
}

fn row_to_job(row: &rusqlite::Row<'_>) -> WardenResult<JobRecord> {
    let id: String = row.get(0).map_err(db_err)?;
    let agent: String = row.get(1).map_err(db_err)?;
    let status: String = row.get(2).map_err(db_err)?;
    let started_at: String = row.get(3).map_err(db_err)?;
    Ok(JobRecord {
        id: parse_uuid(&id)?,
        agent,
        status: job_status_from_str(&status),
        started_at: parse_timestamp(&started_at)?,
        duration_ms: row.get(4).map_err(db_err)?,
        items_processed: row.get(5).map_err(db_err)?,
        items_succeeded: row.get(6).map_err(db_err)?,
        items_failed: row.get(7).map_err(db_err)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_report_append_and_latest() {
        let store = SqliteStore::open_in_memory().unwrap();
        let older = StoredReport {
            id: Uuid::new_v4(),
            site: "main".into(),
            health_score: 55,
            status: HealthStatus::NeedsAttention,
            payload: serde_json::json!({"n": 1}),
            created_at: Utc::now() - Duration::hours(2),
        };
        let newer = StoredReport {
            id: Uuid::new_v4(),
            site: "main".into(),
            health_score: 91,
            status: HealthStatus::Excellent,
            payload: serde_json::json!({"n": 2}),
            created_at: Utc::now(),
        };
        store.append_report(&older).await.unwrap();
        store.append_report(&newer).await.unwrap();

        let latest = store.latest_report("main").await.unwrap().unwrap();
        assert_eq!(latest.id, newer.id);
        assert_eq!(latest.health_score, 91);
        assert_eq!(latest.payload["n"], 2);
        assert!(store.latest_report("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_snapshot_upsert() {
        let store = SqliteStore::open_in_memory().unwrap();
        let day = Utc::now().date_naive();
        let mut snap = HealthSnapshot {
            site: "main".into(),
            day,
            health_score: 40,
            status: HealthStatus::Critical,
            updated_at: Utc::now(),
        };
        store.upsert_health_snapshot(&snap).await.unwrap();
        snap.health_score = 77;
        snap.status = HealthStatus::Good;
        store.upsert_health_snapshot(&snap).await.unwrap();

        let loaded = store.health_snapshot("main", day).await.unwrap().unwrap();
        assert_eq!(loaded.health_score, 77);
        assert_eq!(loaded.status, HealthStatus::Good);
    }

    #[tokio::test]
    async fn test_job_log_roundtrip() {
        let store = SqliteStore::open_in_memory().unwrap();
        let now = Utc::now();
        store
            .append_job_log(
                &JobRecord::completed("site-monitor", now - Duration::hours(3), 420)
                    .with_items(12, 11, 1),
            )
            .await
            .unwrap();
        store
            .append_job_log(&JobRecord::failed("site-monitor", now - Duration::hours(1), 80))
            .await
            .unwrap();

        let since = store
            .job_logs_since("site-monitor", now - Duration::days(1))
            .await
            .unwrap();
        assert_eq!(since.len(), 2);
        assert_eq!(since[0].status, JobStatus::Failed);
        assert_eq!(since[1].items_succeeded, 11);

        let last = store.last_job_for_agent("site-monitor").await.unwrap().unwrap();
        assert_eq!(last.status, JobStatus::Failed);
    }

    #[tokio::test]
    async fn test_directive_pending_filter() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut consumed = StoredDirective::new("link-builder", "audit anchors", "normal");
        consumed.consumed = true;
        store.append_directive(&consumed).await.unwrap();
        store
            .append_directive(&StoredDirective::new("link-builder", "disavow spam", "urgent"))
            .await
            .unwrap();

        let pending = store.pending_directives_for("link-builder").await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].urgency, "urgent");
    }

    #[tokio::test]
    async fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warden.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .append_finding(&StoredFinding {
                    id: Uuid::new_v4(),
                    source: "search-engine-land".into(),
                    category: "algorithm_update".into(),
                    title: "Core update rolling out".into(),
                    confidence: 0.9,
                    payload: serde_json::json!({"insights": ["review titles"]}),
                    created_at: Utc::now(),
                })
                .await
                .unwrap();
        }
        // Reopen and confirm the schema persisted.
        let store = SqliteStore::open(&path).unwrap();
        assert!(store.latest_report("main").await.unwrap().is_none());
    }
}
