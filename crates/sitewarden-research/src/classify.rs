//! Finding classification: relevance, category, insights, priorities.
//!
//! All heuristics are data-driven keyword/pattern tables so they can be
//! tuned and tested in isolation.

use regex::Regex;
use serde::{Deserialize, Serialize};
use sitewarden_core::{WardenError, WardenResult};

/// The fixed finding taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCategory {
    /// Search ranking algorithm changes.
    AlgorithmUpdate,
    /// Crawl budget, submission, deindexing.
    Indexing,
    /// Schema.org and rich-result changes.
    StructuredData,
    /// AI overviews, answer engines, LLM crawlers.
    AiSearch,
    /// Editorial and topical strategy.
    ContentStrategy,
    /// Performance, rendering, infrastructure.
    TechnicalSeo,
    /// Backlinks and internal linking.
    LinkBuilding,
    /// Local search and maps.
    LocalSeo,
    /// Measurement and reporting.
    Analytics,
    /// Spam policies, hacks, negative SEO.
    Security,
    /// General industry news.
    Industry,
}

impl FindingCategory {
    /// Stable slug used in persisted records.
    pub fn as_str(self) -> &'static str {
        match self {
            FindingCategory::AlgorithmUpdate => "algorithm_update",
            FindingCategory::Indexing => "indexing",
            FindingCategory::StructuredData => "structured_data",
            FindingCategory::AiSearch => "ai_search",
            FindingCategory::ContentStrategy => "content_strategy",
            FindingCategory::TechnicalSeo => "technical_seo",
            FindingCategory::LinkBuilding => "link_building",
            FindingCategory::LocalSeo => "local_seo",
            FindingCategory::Analytics => "analytics",
            FindingCategory::Security => "security",
            FindingCategory::Industry => "industry",
        }
    }
}

/// Priority assigned to an agent update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePriority {
    /// Act immediately.
    Critical,
    /// Act this week.
    High,
    /// Queue normally.
    Medium,
    /// Nice to have.
    Low,
}

/// What kind of change an update asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    /// A configuration-level change.
    Config,
    /// An editorial/content change.
    Content,
    /// A strategy-level change needing human judgment.
    Strategy,
}

/// Domain keywords counted for relevance.
const DOMAIN_KEYWORDS: &[&str] = &[
    "seo",
    "search",
    "google",
    "ranking",
    "index",
    "crawl",
    "schema",
    "structured data",
    "sitemap",
    "robots",
    "serp",
    "core update",
    "ai overview",
    "llm",
    "backlink",
    "rich result",
    "canonical",
    "algorithm",
];

/// Matches below this relevance are discarded.
pub const MIN_RELEVANCE: f64 = 0.3;

/// Relevance: matched domain keywords, normalized and capped at 1.0.
pub fn relevance_score(text: &str) -> f64 {
    let lower = text.to_lowercase();
    let matches = DOMAIN_KEYWORDS
        .iter()
        .filter(|k| lower.contains(*k))
        .count();
    (matches as f64 / 5.0).min(1.0)
}

/// Category keyword table, in precedence order: the first category with a
/// matching keyword wins.
const CATEGORY_KEYWORDS: &[(FindingCategory, &[&str])] = &[
    (
        FindingCategory::AlgorithmUpdate,
        &["core update", "algorithm", "ranking update", "ranking change"],
    ),
    (
        FindingCategory::Security,
        &["spam", "hack", "malware", "penalty", "manual action"],
    ),
    (
        FindingCategory::Indexing,
        &["index", "crawl budget", "deindex", "submission", "discover"],
    ),
    (
        FindingCategory::StructuredData,
        &["schema", "structured data", "rich result", "json-ld"],
    ),
    (
        FindingCategory::AiSearch,
        &["ai overview", "ai search", "llm", "chatgpt", "answer engine", "gptbot"],
    ),
    (
        FindingCategory::TechnicalSeo,
        &["core web vitals", "rendering", "javascript", "page speed", "cdn"],
    ),
    (
        FindingCategory::LinkBuilding,
        &["backlink", "link building", "internal link", "anchor"],
    ),
    (
        FindingCategory::LocalSeo,
        &["local", "maps", "business profile"],
    ),
    (
        FindingCategory::Analytics,
        &["analytics", "measurement", "reporting", "attribution"],
    ),
    (
        FindingCategory::ContentStrategy,
        &["content", "e-e-a-t", "helpful content", "author"],
    ),
];

/// Categorizes an article by keyword precedence. Unmatched text is
/// [`FindingCategory::Industry`].
pub fn categorize(text: &str) -> FindingCategory {
    let lower = text.to_lowercase();
    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|k| lower.contains(k)) {
            return *category;
        }
    }
    FindingCategory::Industry
}

/// Action-verb patterns used to extract actionable-insight substrings.
const ACTION_PATTERNS: &[&str] = &[
    r"(?i)\b(add|adds?|added)\b[^.!?]{10,140}",
    r"(?i)\b(update|updates?|updated)\b[^.!?]{10,140}",
    r"(?i)\b(remove|removed|deprecate[sd]?)\b[^.!?]{10,140}",
    r"(?i)\b(migrate|switch|adopt|enable|disable)\b[^.!?]{10,140}",
    r"(?i)\b(review|audit|optimi[sz]e|fix|submit)\b[^.!?]{10,140}",
];

/// Maximum insights extracted per article.
const MAX_INSIGHTS: usize = 3;

/// Compiled action-verb extractor.
pub struct InsightExtractor {
    patterns: Vec<Regex>,
}

impl InsightExtractor {
    /// Compiles the default action-verb table.
    pub fn new() -> WardenResult<Self> {
        let mut patterns = Vec::with_capacity(ACTION_PATTERNS.len());
        for p in ACTION_PATTERNS {
            patterns.push(
                Regex::new(p)
                    .map_err(|e| WardenError::Config(format!("bad action pattern '{p}': {e}")))?,
            );
        }
        Ok(Self { patterns })
    }

    /// Extracts actionable-insight substrings; falls back to the title.
    pub fn extract(&self, text: &str, title: &str) -> Vec<String> {
        let mut insights = Vec::new();
        for re in &self.patterns {
            if let Some(m) = re.find(text) {
                let insight = m.as_str().trim().to_string();
                if !insights.contains(&insight) {
                    insights.push(insight);
                }
            }
            if insights.len() >= MAX_INSIGHTS {
                break;
            }
        }
        if insights.is_empty() {
            insights.push(title.trim().to_string());
        }
        insights
    }
}

/// Which agents a category's findings affect.
pub fn affected_agents(category: FindingCategory) -> &'static [&'static str] {
    match category {
        FindingCategory::AlgorithmUpdate => &["seo-optimizer", "content-writer"],
        FindingCategory::Indexing => &["site-monitor", "seo-optimizer"],
        FindingCategory::StructuredData => &["seo-optimizer"],
        FindingCategory::AiSearch => &["content-writer", "seo-optimizer"],
        FindingCategory::ContentStrategy => &["content-writer"],
        FindingCategory::TechnicalSeo => &["site-monitor"],
        FindingCategory::LinkBuilding => &["link-builder"],
        FindingCategory::LocalSeo => &["seo-optimizer"],
        FindingCategory::Analytics => &["site-monitor"],
        FindingCategory::Security => &["site-monitor", "link-builder"],
        FindingCategory::Industry => &[],
    }
}

/// Priority by category and source reliability. Algorithm, indexing and
/// security findings skew urgent.
pub fn priority_for(category: FindingCategory, reliability: f64) -> UpdatePriority {
    match category {
        FindingCategory::AlgorithmUpdate | FindingCategory::Indexing | FindingCategory::Security => {
            if reliability >= 0.8 {
                UpdatePriority::Critical
            } else {
                UpdatePriority::High
            }
        }
        FindingCategory::StructuredData | FindingCategory::AiSearch | FindingCategory::TechnicalSeo => {
            if reliability >= 0.8 {
                UpdatePriority::High
            } else {
                UpdatePriority::Medium
            }
        }
        FindingCategory::ContentStrategy | FindingCategory::LinkBuilding => UpdatePriority::Medium,
        FindingCategory::LocalSeo | FindingCategory::Analytics | FindingCategory::Industry => {
            UpdatePriority::Low
        }
    }
}

/// What kind of update a category's insights map to.
pub fn update_kind(category: FindingCategory) -> UpdateKind {
    match category {
        FindingCategory::StructuredData
        | FindingCategory::TechnicalSeo
        | FindingCategory::Indexing => UpdateKind::Config,
        FindingCategory::ContentStrategy | FindingCategory::AiSearch => UpdateKind::Content,
        _ => UpdateKind::Strategy,
    }
}

/// Destructive phrasing that is never auto-applied.
const DESTRUCTIVE_RE: &str = r"(?i)\b(remove|delete|disable)\b";

/// Whether an update is safe to auto-apply: configuration-kind, and the
/// insight does not ask for anything destructive.
pub fn safe_to_auto_apply(kind: UpdateKind, insight: &str) -> bool {
    if kind != UpdateKind::Config {
        return false;
    }
    match Regex::new(DESTRUCTIVE_RE) {
        Ok(re) => !re.is_match(insight),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relevance_scoring() {
        let relevant = "Google core update changes ranking for structured data in search";
        assert!(relevance_score(relevant) >= 0.6);
        assert!((relevance_score("A recipe for banana bread")) < MIN_RELEVANCE);
        // Cap at 1.0.
        let dense = "seo search google ranking index crawl schema sitemap robots serp";
        assert!((relevance_score(dense) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_category_precedence() {
        // "core update" wins over the later content keywords.
        let text = "Core update guidance for helpful content authors";
        assert_eq!(categorize(text), FindingCategory::AlgorithmUpdate);
        assert_eq!(
            categorize("New schema types for rich results"),
            FindingCategory::StructuredData
        );
        assert_eq!(
            categorize("AI overviews now cite more sources"),
            FindingCategory::AiSearch
        );
        assert_eq!(categorize("Conference season recap"), FindingCategory::Industry);
    }

    #[test]
    fn test_insight_extraction() {
        let extractor = InsightExtractor::new().unwrap();
        let insights = extractor.extract(
            "Sites should add FAQ markup to key pages and update their sitemaps weekly.",
            "fallback title",
        );
        assert!(insights.iter().any(|i| i.to_lowercase().contains("add faq markup")));
        assert!(insights.iter().any(|i| i.to_lowercase().contains("update their sitemaps")));
    }

    #[test]
    fn test_insight_falls_back_to_title() {
        let extractor = InsightExtractor::new().unwrap();
        let insights = extractor.extract("Nothing actionable here.", "Core update rolling out");
        assert_eq!(insights, vec!["Core update rolling out".to_string()]);
    }

    #[test]
    fn test_priority_skew() {
        assert_eq!(
            priority_for(FindingCategory::AlgorithmUpdate, 0.9),
            UpdatePriority::Critical
        );
        assert_eq!(
            priority_for(FindingCategory::AlgorithmUpdate, 0.5),
            UpdatePriority::High
        );
        assert_eq!(priority_for(FindingCategory::Industry, 0.9), UpdatePriority::Low);
    }

    #[test]
    fn test_safe_auto_apply() {
        assert!(safe_to_auto_apply(
            UpdateKind::Config,
            "add FAQ markup to key pages"
        ));
        assert!(!safe_to_auto_apply(
            UpdateKind::Config,
            "remove deprecated schema types"
        ));
        assert!(!safe_to_auto_apply(
            UpdateKind::Config,
            "disable the legacy sitemap"
        ));
        assert!(!safe_to_auto_apply(
            UpdateKind::Strategy,
            "add a quarterly content review"
        ));
    }

    #[test]
    fn test_affected_agents_table() {
        assert!(affected_agents(FindingCategory::LinkBuilding).contains(&"link-builder"));
        assert!(affected_agents(FindingCategory::Industry).is_empty());
    }
}
