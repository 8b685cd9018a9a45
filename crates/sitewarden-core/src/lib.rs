//! Core types and error definitions shared across the sitewarden workspace.
//!
//! This crate provides the foundational types every other sitewarden crate
//! builds on: the unified error enum, the degradable check-outcome type used
//! by all live audits, the flat metrics map exchanged between components,
//! and the static site registry.
//!
//! # Main types
//!
//! - [`WardenError`] — Unified error enum for all sitewarden subsystems.
//! - [`WardenResult`] — Convenience alias for `Result<T, WardenError>`.
//! - [`CheckOutcome`] — A sub-check result that carries its fallback and the
//!   reason it degraded, instead of a swallowed exception.
//! - [`MetricsMap`] — Flat `metric key → value` map shared by the metric
//!   collector, the audit merge step, and the goal evaluator.
//! - [`SiteConfig`] — Static configuration for one monitored site.

/// Site registry and per-site configuration.
pub mod site;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use site::{SiteConfig, SiteRegistry};

// --- Error types ---

/// Top-level error type for the sitewarden workspace.
///
/// Each variant corresponds to a subsystem that can produce errors.
#[derive(Debug, thiserror::Error)]
pub enum WardenError {
    /// An error from the live site auditor.
    #[error("Audit error: {0}")]
    Audit(String),

    /// An error from the pre-publication gate.
    #[error("Gate error: {0}")]
    Gate(String),

    /// An error from the weekly research agent.
    #[error("Research error: {0}")]
    Research(String),

    /// An error from the persistence layer.
    #[error("Store error: {0}")]
    Store(String),

    /// An error in configuration parsing or validation.
    #[error("Config error: {0}")]
    Config(String),

    /// An error from an outbound HTTP request.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`WardenError`].
pub type WardenResult<T> = Result<T, WardenError>;

// --- Check outcomes ---

/// The result of a single fault-isolated sub-check.
///
/// Live audits never abort the surrounding run: a failed sub-check resolves
/// to its typed empty default. `CheckOutcome` makes that substitution a
/// first-class value, so callers can see both the fallback and why it was
/// used, rather than silently receiving zeros.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum CheckOutcome<T> {
    /// The check completed and produced a full result.
    Ok {
        /// The check's result value.
        value: T,
    },
    /// The check failed or ran out of budget; `fallback` is the conservative
    /// default the pipeline continues with.
    Degraded {
        /// The default value substituted for the failed check.
        fallback: T,
        /// Why the check degraded (transport error, deadline, parse failure).
        reason: String,
    },
}

impl<T> CheckOutcome<T> {
    /// Wraps a successful check value.
    pub fn ok(value: T) -> Self {
        CheckOutcome::Ok { value }
    }

    /// Wraps a degraded check with its fallback and reason.
    pub fn degraded(fallback: T, reason: impl Into<String>) -> Self {
        CheckOutcome::Degraded {
            fallback,
            reason: reason.into(),
        }
    }

    /// Builds an outcome from a `Result`, substituting `fallback` on error.
    pub fn from_result(result: WardenResult<T>, fallback: T) -> Self {
        match result {
            Ok(value) => CheckOutcome::Ok { value },
            Err(e) => CheckOutcome::Degraded {
                fallback,
                reason: e.to_string(),
            },
        }
    }

    /// Returns the check value, full or fallback.
    pub fn value(&self) -> &T {
        match self {
            CheckOutcome::Ok { value } => value,
            CheckOutcome::Degraded { fallback, .. } => fallback,
        }
    }

    /// Consumes the outcome, returning the check value, full or fallback.
    pub fn into_value(self) -> T {
        match self {
            CheckOutcome::Ok { value } => value,
            CheckOutcome::Degraded { fallback, .. } => fallback,
        }
    }

    /// Whether this check degraded to its fallback.
    pub fn is_degraded(&self) -> bool {
        matches!(self, CheckOutcome::Degraded { .. })
    }

    /// The degradation reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            CheckOutcome::Ok { .. } => None,
            CheckOutcome::Degraded { reason, .. } => Some(reason),
        }
    }
}

// --- Shared enums ---

/// Severity of a gate check or reported issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Prevents publication.
    Blocker,
    /// Advisory only.
    Warning,
    /// Informational.
    Info,
}

/// Overall health band derived from the weighted health score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Score ≥ 90.
    Excellent,
    /// Score ≥ 75.
    Good,
    /// Score ≥ 50.
    NeedsAttention,
    /// Score < 50.
    Critical,
}

impl HealthStatus {
    /// Maps a 0–100 health score to its status band.
    pub fn from_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => HealthStatus::Excellent,
            75..=89 => HealthStatus::Good,
            50..=74 => HealthStatus::NeedsAttention,
            _ => HealthStatus::Critical,
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Excellent => write!(f, "excellent"),
            HealthStatus::Good => write!(f, "good"),
            HealthStatus::NeedsAttention => write!(f, "needs_attention"),
            HealthStatus::Critical => write!(f, "critical"),
        }
    }
}

/// Flat metric map exchanged between the collector, the audit merge step and
/// the goal evaluator. Keys are stable metric identifiers such as
/// `sitemap_health_pct` or `organic_clicks_28d`.
pub type MetricsMap = HashMap<String, f64>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_outcome_ok() {
        let outcome = CheckOutcome::ok(42u32);
        assert!(!outcome.is_degraded());
        assert_eq!(*outcome.value(), 42);
        assert_eq!(outcome.reason(), None);
    }

    #[test]
    fn test_check_outcome_degraded_keeps_reason() {
        let outcome = CheckOutcome::degraded(0u32, "connect timeout");
        assert!(outcome.is_degraded());
        assert_eq!(*outcome.value(), 0);
        assert_eq!(outcome.reason(), Some("connect timeout"));
    }

    #[test]
    fn test_check_outcome_from_result() {
        let ok: CheckOutcome<u32> = CheckOutcome::from_result(Ok(7), 0);
        assert_eq!(ok.into_value(), 7);

        let err: CheckOutcome<u32> =
            CheckOutcome::from_result(Err(WardenError::Http("503".into())), 0);
        assert!(err.is_degraded());
        assert_eq!(err.into_value(), 0);
    }

    #[test]
    fn test_health_status_bands() {
        assert_eq!(HealthStatus::from_score(100), HealthStatus::Excellent);
        assert_eq!(HealthStatus::from_score(90), HealthStatus::Excellent);
        assert_eq!(HealthStatus::from_score(89), HealthStatus::Good);
        assert_eq!(HealthStatus::from_score(75), HealthStatus::Good);
        assert_eq!(HealthStatus::from_score(74), HealthStatus::NeedsAttention);
        assert_eq!(HealthStatus::from_score(50), HealthStatus::NeedsAttention);
        assert_eq!(HealthStatus::from_score(49), HealthStatus::Critical);
        assert_eq!(HealthStatus::from_score(0), HealthStatus::Critical);
    }

    #[test]
    fn test_health_status_serialization() {
        let json = serde_json::to_string(&HealthStatus::NeedsAttention).unwrap();
        assert_eq!(json, "\"needs_attention\"");
    }

    #[test]
    fn test_severity_serialization() {
        let json = serde_json::to_string(&Severity::Blocker).unwrap();
        assert_eq!(json, "\"blocker\"");
    }
}
