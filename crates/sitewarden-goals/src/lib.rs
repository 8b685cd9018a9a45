//! Business goal evaluation.
//!
//! A pure function over a static goal/KPI catalogue and a flat metrics map.
//! Running it twice on the same inputs yields identical output, including
//! ordering; nothing here performs I/O.
//!
//! # Main types
//!
//! - [`BusinessGoal`] / [`Kpi`] — Static catalogue data.
//! - [`KpiStatus`] — Classification per KPI; goals take their worst KPI status.
//! - [`evaluate`] — Evaluates the catalogue against a metrics map.

/// The default goal/KPI catalogue.
pub mod catalogue;

use serde::{Deserialize, Serialize};
use sitewarden_core::MetricsMap;

pub use catalogue::default_catalogue;

/// Whether higher or lower metric values are favorable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Larger values are better (e.g. organic clicks).
    Higher,
    /// Smaller values are better (e.g. error rate).
    Lower,
}

/// A single measurable metric with direction and targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kpi {
    /// Stable KPI identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Key looked up in the metrics map.
    pub metric_key: String,
    /// Favorable direction.
    pub direction: Direction,
    /// 30-day target.
    pub target_30d: f64,
    /// 90-day target.
    pub target_90d: f64,
    /// Crossing this in the unfavorable direction is critical regardless of
    /// targets.
    pub critical_threshold: Option<f64>,
}

/// A business goal owning one or more KPIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessGoal {
    /// Stable goal identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// The KPIs this goal is measured by.
    pub kpis: Vec<Kpi>,
}

/// Classification of one KPI against its targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiStatus {
    /// A critical threshold was crossed unfavorably.
    Critical,
    /// No value, or short of the 30-day pace.
    Behind,
    /// On pace for the 30-day target.
    OnTrack,
    /// The 90-day target is met.
    Achieved,
}

impl KpiStatus {
    /// Processing priority: critical first.
    pub fn priority(self) -> u8 {
        match self {
            KpiStatus::Critical => 0,
            KpiStatus::Behind => 1,
            KpiStatus::OnTrack => 2,
            KpiStatus::Achieved => 3,
        }
    }
}

/// Evaluation of one KPI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiEvaluation {
    /// The evaluated KPI's identifier.
    pub kpi_id: String,
    /// Metric key that was looked up.
    pub metric_key: String,
    /// Current metric value, if present.
    pub current: Option<f64>,
    /// Resulting classification.
    pub status: KpiStatus,
}

/// Per-goal aggregate of KPI evaluations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalEvaluation {
    /// The evaluated goal's identifier.
    pub goal_id: String,
    /// Goal name, for reporting.
    pub name: String,
    /// Worst status among the goal's KPIs.
    pub overall_status: KpiStatus,
    /// Priority derived from the overall status; 0 is most urgent.
    pub priority: u8,
    /// The individual KPI evaluations, in catalogue order.
    pub kpi_results: Vec<KpiEvaluation>,
}

/// Classifies one KPI against the current metric value.
///
/// A defined critical threshold crossed unfavorably always yields
/// [`KpiStatus::Critical`], regardless of targets.
pub fn evaluate_kpi(kpi: &Kpi, current: Option<f64>) -> KpiStatus {
    let Some(value) = current else {
        return KpiStatus::Behind;
    };

    if let Some(critical) = kpi.critical_threshold {
        let crossed = match kpi.direction {
            Direction::Higher => value <= critical,
            Direction::Lower => value >= critical,
        };
        if crossed {
            return KpiStatus::Critical;
        }
    }

    let meets = |target: f64| match kpi.direction {
        Direction::Higher => value >= target,
        Direction::Lower => value <= target,
    };

    if meets(kpi.target_90d) {
        KpiStatus::Achieved
    } else if meets(kpi.target_30d * 0.7) {
        KpiStatus::OnTrack
    } else {
        KpiStatus::Behind
    }
}

/// Evaluates every goal in the catalogue against the metrics map.
///
/// The output is sorted ascending by priority so callers can process the
/// most urgent goals first; the sort is stable, so catalogue order breaks
/// ties deterministically.
pub fn evaluate(catalogue: &[BusinessGoal], metrics: &MetricsMap) -> Vec<GoalEvaluation> {
    let mut evaluations: Vec<GoalEvaluation> = catalogue
        .iter()
        .map(|goal| {
            let kpi_results: Vec<KpiEvaluation> = goal
                .kpis
                .iter()
                .map(|kpi| {
                    let current = metrics.get(&kpi.metric_key).copied();
                    KpiEvaluation {
                        kpi_id: kpi.id.clone(),
                        metric_key: kpi.metric_key.clone(),
                        current,
                        status: evaluate_kpi(kpi, current),
                    }
                })
                .collect();

            let overall_status = kpi_results
                .iter()
                .map(|r| r.status)
                .min()
                .unwrap_or(KpiStatus::Achieved);

            GoalEvaluation {
                goal_id: goal.id.clone(),
                name: goal.name.clone(),
                overall_status,
                priority: overall_status.priority(),
                kpi_results,
            }
        })
        .collect();

    evaluations.sort_by_key(|e| e.priority);
    evaluations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kpi(direction: Direction, target_30d: f64, target_90d: f64, critical: Option<f64>) -> Kpi {
        Kpi {
            id: "k".into(),
            name: "KPI".into(),
            metric_key: "m".into(),
            direction,
            target_30d,
            target_90d,
            critical_threshold: critical,
        }
    }

    #[test]
    fn test_missing_metric_is_behind() {
        let k = kpi(Direction::Higher, 100.0, 200.0, None);
        assert_eq!(evaluate_kpi(&k, None), KpiStatus::Behind);
    }

    #[test]
    fn test_critical_threshold_overrides_targets_higher() {
        // Value meets the 90d target but sits at the critical floor.
        let k = kpi(Direction::Higher, 100.0, 200.0, Some(250.0));
        assert_eq!(evaluate_kpi(&k, Some(250.0)), KpiStatus::Critical);
        assert_eq!(evaluate_kpi(&k, Some(251.0)), KpiStatus::Achieved);
    }

    #[test]
    fn test_critical_threshold_overrides_targets_lower() {
        let k = kpi(Direction::Lower, 5.0, 2.0, Some(10.0));
        assert_eq!(evaluate_kpi(&k, Some(10.0)), KpiStatus::Critical);
        assert_eq!(evaluate_kpi(&k, Some(12.0)), KpiStatus::Critical);
        assert_eq!(evaluate_kpi(&k, Some(1.5)), KpiStatus::Achieved);
    }

    #[test]
    fn test_target_bands_higher() {
        let k = kpi(Direction::Higher, 100.0, 200.0, None);
        assert_eq!(evaluate_kpi(&k, Some(200.0)), KpiStatus::Achieved);
        // 30d pace band starts at 70.
        assert_eq!(evaluate_kpi(&k, Some(70.0)), KpiStatus::OnTrack);
        assert_eq!(evaluate_kpi(&k, Some(69.9)), KpiStatus::Behind);
    }

    #[test]
    fn test_goal_takes_worst_kpi_status() {
        let goal = BusinessGoal {
            id: "g".into(),
            name: "Goal".into(),
            kpis: vec![
                Kpi {
                    metric_key: "good".into(),
                    ..kpi(Direction::Higher, 10.0, 20.0, None)
                },
                Kpi {
                    metric_key: "bad".into(),
                    ..kpi(Direction::Higher, 10.0, 20.0, Some(1.0))
                },
            ],
        };
        let mut metrics = MetricsMap::new();
        metrics.insert("good".into(), 25.0);
        metrics.insert("bad".into(), 0.5);

        let evals = evaluate(&[goal], &metrics);
        assert_eq!(evals[0].overall_status, KpiStatus::Critical);
        assert_eq!(evals[0].priority, 0);
    }

    #[test]
    fn test_evaluation_sorted_by_priority() {
        let achieved = BusinessGoal {
            id: "a".into(),
            name: "A".into(),
            kpis: vec![Kpi {
                metric_key: "x".into(),
                ..kpi(Direction::Higher, 1.0, 2.0, None)
            }],
        };
        let behind = BusinessGoal {
            id: "b".into(),
            name: "B".into(),
            kpis: vec![Kpi {
                metric_key: "missing".into(),
                ..kpi(Direction::Higher, 1.0, 2.0, None)
            }],
        };
        let mut metrics = MetricsMap::new();
        metrics.insert("x".into(), 5.0);

        let evals = evaluate(&[achieved, behind], &metrics);
        assert_eq!(evals[0].goal_id, "b");
        assert_eq!(evals[1].goal_id, "a");
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let catalogue = default_catalogue();
        let mut metrics = MetricsMap::new();
        metrics.insert("sitemap_health_pct".into(), 97.0);
        metrics.insert("organic_clicks_28d".into(), 1200.0);

        let first = evaluate(&catalogue, &metrics);
        let second = evaluate(&catalogue, &metrics);
        let first_json = serde_json::to_string(&first).unwrap();
        let second_json = serde_json::to_string(&second).unwrap();
        assert_eq!(first_json, second_json);
    }
}
