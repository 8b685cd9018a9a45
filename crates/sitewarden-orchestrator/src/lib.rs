//! Site health orchestration.
//!
//! The coordinator runs live audits, agent performance analysis and metric
//! collection in parallel under one deadline, evaluates business goals over
//! the merged metrics, optionally folds in weekly research, and synthesizes
//! a prioritized, persisted health report.
//!
//! # Main types
//!
//! - [`Coordinator`] — The six-phase run driver. Never fails.
//! - [`OrchestratorReport`] — The immutable run output.
//! - [`MetricsSource`] — Pluggable current-metric collection.

/// The six-phase coordinator.
pub mod coordinator;
/// Current-metric collection.
pub mod metrics;
/// Report types.
pub mod types;

pub use coordinator::{Coordinator, CoordinatorConfig};
pub use metrics::{MetricsSource, StaticMetrics, StoreMetrics};
pub use types::{AgentDirective, OrchestratorReport, PrioritizedAction};
