//! The trusted research source registry.

use serde::{Deserialize, Serialize};

/// One trusted external source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchSource {
    /// Stable source identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Feed or page URL.
    pub url: String,
    /// Reliability weight, 0.0–1.0.
    pub reliability: f64,
    /// Topic tags, for reporting.
    pub topics: Vec<String>,
}

fn source(id: &str, name: &str, url: &str, reliability: f64, topics: &[&str]) -> ResearchSource {
    ResearchSource {
        id: id.to_string(),
        name: name.to_string(),
        url: url.to_string(),
        reliability,
        topics: topics.iter().map(|t| (*t).to_string()).collect(),
    }
}

/// The default source registry.
pub fn default_sources() -> Vec<ResearchSource> {
    vec![
        source(
            "google-search-central",
            "Google Search Central Blog",
            "https://developers.google.com/search/blog",
            0.95,
            &["algorithm", "indexing", "structured-data"],
        ),
        source(
            "search-engine-land",
            "Search Engine Land",
            "https://searchengineland.com/feed",
            0.85,
            &["algorithm", "industry", "ai-search"],
        ),
        source(
            "search-engine-journal",
            "Search Engine Journal",
            "https://www.searchenginejournal.com/feed/",
            0.8,
            &["content", "technical-seo", "industry"],
        ),
        source(
            "schema-org",
            "Schema.org Releases",
            "https://schema.org/docs/releases.html",
            0.9,
            &["structured-data"],
        ),
        source(
            "ahrefs-blog",
            "Ahrefs Blog",
            "https://ahrefs.com/blog/",
            0.75,
            &["link-building", "content", "analytics"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_are_weighted() {
        let sources = default_sources();
        assert!(sources.len() >= 5);
        for s in &sources {
            assert!((0.0..=1.0).contains(&s.reliability), "{}", s.id);
            assert!(!s.topics.is_empty());
        }
    }
}
