//! The default goal/KPI catalogue.
//!
//! Static configuration constructed in code; deployments needing different
//! targets pass their own `Vec<BusinessGoal>` to [`crate::evaluate`] instead.

use crate::{BusinessGoal, Direction, Kpi};

fn kpi(
    id: &str,
    name: &str,
    metric_key: &str,
    direction: Direction,
    target_30d: f64,
    target_90d: f64,
    critical_threshold: Option<f64>,
) -> Kpi {
    Kpi {
        id: id.to_string(),
        name: name.to_string(),
        metric_key: metric_key.to_string(),
        direction,
        target_30d,
        target_90d,
        critical_threshold,
    }
}

/// The five default business goals.
pub fn default_catalogue() -> Vec<BusinessGoal> {
    vec![
        BusinessGoal {
            id: "indexation".to_string(),
            name: "Full indexation of published content".to_string(),
            kpis: vec![
                kpi(
                    "indexed-pages",
                    "Pages indexed",
                    "indexed_pages",
                    Direction::Higher,
                    80.0,
                    150.0,
                    Some(10.0),
                ),
                kpi(
                    "sitemap-health",
                    "Sitemap health %",
                    "sitemap_health_pct",
                    Direction::Higher,
                    95.0,
                    99.0,
                    Some(70.0),
                ),
                kpi(
                    "robots-conflicts",
                    "Robots directive conflicts",
                    "robots_conflicts",
                    Direction::Lower,
                    0.0,
                    0.0,
                    Some(1.0),
                ),
            ],
        },
        BusinessGoal {
            id: "organic-traffic".to_string(),
            name: "Grow organic search traffic".to_string(),
            kpis: vec![
                kpi(
                    "organic-clicks",
                    "Organic clicks (28d)",
                    "organic_clicks_28d",
                    Direction::Higher,
                    500.0,
                    2000.0,
                    None,
                ),
                kpi(
                    "organic-impressions",
                    "Organic impressions (28d)",
                    "organic_impressions_28d",
                    Direction::Higher,
                    20000.0,
                    80000.0,
                    None,
                ),
                kpi(
                    "avg-position",
                    "Average position",
                    "avg_position",
                    Direction::Lower,
                    25.0,
                    15.0,
                    None,
                ),
            ],
        },
        BusinessGoal {
            id: "content-quality".to_string(),
            name: "Publish consistently high-quality content".to_string(),
            kpis: vec![
                kpi(
                    "articles-per-week",
                    "Articles published (7d)",
                    "articles_published_7d",
                    Direction::Higher,
                    5.0,
                    7.0,
                    None,
                ),
                kpi(
                    "avg-seo-score",
                    "Average SEO score",
                    "avg_seo_score",
                    Direction::Higher,
                    70.0,
                    80.0,
                    Some(40.0),
                ),
            ],
        },
        BusinessGoal {
            id: "technical-health".to_string(),
            name: "Keep the site technically sound".to_string(),
            kpis: vec![
                kpi(
                    "cache-hit-rate",
                    "CDN cache hit rate %",
                    "cache_hit_rate",
                    Direction::Higher,
                    70.0,
                    90.0,
                    Some(30.0),
                ),
                kpi(
                    "schema-valid",
                    "Structured data valid",
                    "schema_valid",
                    Direction::Higher,
                    1.0,
                    1.0,
                    None,
                ),
                kpi(
                    "broken-sitemap-urls",
                    "Broken sitemap URLs",
                    "broken_sitemap_urls",
                    Direction::Lower,
                    0.0,
                    0.0,
                    Some(5.0),
                ),
            ],
        },
        BusinessGoal {
            id: "ai-visibility".to_string(),
            name: "Stay visible to AI search surfaces".to_string(),
            kpis: vec![
                kpi(
                    "ai-crawlers-allowed",
                    "AI crawlers allowed",
                    "ai_crawlers_allowed",
                    Direction::Higher,
                    5.0,
                    7.0,
                    Some(1.0),
                ),
                kpi(
                    "ai-referrals",
                    "AI-surface referrals (28d)",
                    "ai_referrals_28d",
                    Direction::Higher,
                    20.0,
                    100.0,
                    None,
                ),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_shape() {
        let catalogue = default_catalogue();
        assert_eq!(catalogue.len(), 5);
        for goal in &catalogue {
            assert!(
                (2..=4).contains(&goal.kpis.len()),
                "goal {} has {} KPIs",
                goal.id,
                goal.kpis.len()
            );
        }
    }

    #[test]
    fn test_metric_keys_are_unique() {
        let catalogue = default_catalogue();
        let mut keys: Vec<&str> = catalogue
            .iter()
            .flat_map(|g| g.kpis.iter().map(|k| k.metric_key.as_str()))
            .collect();
        let before = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), before);
    }
}
