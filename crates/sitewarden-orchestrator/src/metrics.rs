//! Current-metric collection.
//!
//! The coordinator merges three metric families: whatever the collector
//! returns here (historical/operational values), the live-audit-derived
//! values, and nothing else. The collector is a trait so deployments can
//! plug in search-console exports or fixed fixtures for tests.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sitewarden_core::{MetricsMap, SiteConfig, WardenResult};
use sitewarden_store::{JobStatus, ReportStore};
use std::sync::Arc;

/// Source of current operational metrics for a site.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Collects the current metrics map.
    async fn collect(&self, site: &SiteConfig) -> WardenResult<MetricsMap>;
}

/// A fixed metrics map. Useful for tests and offline runs.
pub struct StaticMetrics(pub MetricsMap);

#[async_trait]
impl MetricsSource for StaticMetrics {
    async fn collect(&self, _site: &SiteConfig) -> WardenResult<MetricsMap> {
        Ok(self.0.clone())
    }
}

/// Derives operational metrics from the job-log history: publishing cadence
/// and content throughput. Search-surface metrics (clicks, impressions)
/// come from an external export and are absent unless a richer source is
/// configured.
pub struct StoreMetrics {
    store: Arc<dyn ReportStore>,
}

impl StoreMetrics {
    /// Creates a collector over the given store.
    pub fn new(store: Arc<dyn ReportStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl MetricsSource for StoreMetrics {
    async fn collect(&self, _site: &SiteConfig) -> WardenResult<MetricsMap> {
        let mut metrics = MetricsMap::new();
        let since = Utc::now() - Duration::days(7);

        let writer_jobs = self.store.job_logs_since("content-writer", since).await?;
        let published: u64 = writer_jobs
            .iter()
            .filter(|j| j.status == JobStatus::Completed)
            .map(|j| j.items_succeeded)
            .sum();
        metrics.insert("articles_published_7d".to_string(), published as f64);

        let optimizer_jobs = self.store.job_logs_since("seo-optimizer", since).await?;
        let optimized: u64 = optimizer_jobs.iter().map(|j| j.items_succeeded).sum();
        metrics.insert("pages_optimized_7d".to_string(), optimized as f64);

        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitewarden_store::{InMemoryStore, JobRecord};

    #[tokio::test]
    async fn test_store_metrics_counts_published_items() {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now();
        store
            .seed_job_logs(vec![
                JobRecord::completed("content-writer", now - Duration::hours(12), 1000)
                    .with_items(3, 3, 0),
                JobRecord::completed("content-writer", now - Duration::hours(36), 1000)
                    .with_items(2, 1, 1),
                // Failed runs contribute nothing.
                JobRecord::failed("content-writer", now - Duration::hours(2), 100).with_items(1, 0, 1),
                // Out of the window.
                JobRecord::completed("content-writer", now - Duration::days(10), 1000)
                    .with_items(5, 5, 0),
            ])
            .await;

        let site = SiteConfig::new("main", "https://example.com");
        let metrics = StoreMetrics::new(store).collect(&site).await.unwrap();
        assert_eq!(metrics.get("articles_published_7d"), Some(&4.0));
    }
}
