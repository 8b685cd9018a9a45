//! Data-driven heuristic rule tables.
//!
//! Each heuristic is a list of `{pattern, weight}` entries compiled once at
//! gate construction, so the tables can be tuned and unit-tested without
//! touching check logic.

use regex::Regex;
use sitewarden_core::{WardenError, WardenResult};

/// One rule: a regex pattern with a weight.
#[derive(Debug, Clone)]
pub struct RulePattern {
    /// The regex source, usually `(?i)`-prefixed.
    pub pattern: String,
    /// Contribution of one match to [`RuleTable::score`].
    pub weight: f64,
}

impl RulePattern {
    /// Creates a rule with weight 1.0.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            weight: 1.0,
        }
    }
}

/// A compiled table of heuristic rules.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<(Regex, f64)>,
}

impl RuleTable {
    /// Compiles a table from rule patterns.
    pub fn compile(patterns: &[RulePattern]) -> WardenResult<Self> {
        let mut rules = Vec::with_capacity(patterns.len());
        for p in patterns {
            let regex = Regex::new(&p.pattern)
                .map_err(|e| WardenError::Config(format!("bad rule pattern '{}': {e}", p.pattern)))?;
            rules.push((regex, p.weight));
        }
        Ok(Self { rules })
    }

    /// Number of rules with at least one match in `text`.
    pub fn match_count(&self, text: &str) -> usize {
        self.rules.iter().filter(|(re, _)| re.is_match(text)).count()
    }

    /// Weighted sum over matching rules.
    pub fn score(&self, text: &str) -> f64 {
        self.rules
            .iter()
            .filter(|(re, _)| re.is_match(text))
            .map(|(_, w)| w)
            .sum()
    }

    /// Whether any rule matches.
    pub fn any_match(&self, text: &str) -> bool {
        self.rules.iter().any(|(re, _)| re.is_match(text))
    }
}

fn table(patterns: &[&str]) -> Vec<RulePattern> {
    patterns.iter().map(|p| RulePattern::new(*p)).collect()
}

/// First-hand-experience phrasing.
pub fn experience_signals() -> Vec<RulePattern> {
    table(&[
        r"(?i)\bwe (visited|stayed|tried|tested|walked|ate|spent)\b",
        r"(?i)\bi (visited|stayed|tried|tested|recommend|found)\b",
        r"(?i)\bwhen (we|i) (were|was|went|arrived)\b",
        r"(?i)\binsider tip\b",
        r"(?i)\bdon'?t miss\b",
        r"(?i)\bour (favorite|experience|visit)\b",
        r"(?i)\bfirst[- ]hand\b",
        r"(?i)\bin my experience\b",
    ])
}

/// Generic filler phrasing that erodes authenticity.
pub fn generic_fillers() -> Vec<RulePattern> {
    table(&[
        r"(?i)\bin today's fast-paced world\b",
        r"(?i)\bnestled in the heart of\b",
        r"(?i)\bhidden gem\b",
        r"(?i)\bsomething for everyone\b",
        r"(?i)\blook no further\b",
        r"(?i)\bbucket list\b",
        r"(?i)\bwhether you're .* or\b",
    ])
}

/// Direct-answer openers for AI-overview readiness.
pub fn direct_answer_openers() -> Vec<RulePattern> {
    table(&[
        r"(?i)\bthe (short )?answer is\b",
        r"(?i)^(yes|no)\b",
        r"(?i)^in short\b",
        r"(?i)\bhere's what you need to know\b",
        r"(?i)^[A-Z][^.!?]{10,80} is (a|an|the)\b",
    ])
}

/// Preamble filler that delays the answer.
pub fn preamble_fillers() -> Vec<RulePattern> {
    table(&[
        r"(?i)\bbefore we (dive|get started|begin)\b",
        r"(?i)\bwithout further ado\b",
        r"(?i)\bin this (article|post|guide), (we|you)\b",
        r"(?i)\bread on to (find out|discover|learn)\b",
    ])
}

/// Question-formatted heading detector.
pub fn question_headings() -> Vec<RulePattern> {
    table(&[r"(?i)^(what|how|why|when|where|which|who|can|do|does|is|are|should)\b", r"\?\s*$"])
}

/// Recognized monetization and booking link hosts.
pub fn monetization_links() -> Vec<RulePattern> {
    table(&[
        r"(?i)booking\.com",
        r"(?i)getyourguide",
        r"(?i)viator\.com",
        r"(?i)expedia\.",
        r"(?i)hotels\.com",
        r"(?i)airbnb\.",
        r"(?i)skyscanner\.",
        r"(?i)/go/",
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_experience_signals_match_spec_examples() {
        let rules = RuleTable::compile(&experience_signals()).unwrap();
        let text = "We visited the old town at dawn. Insider tip: go early. \
                    Don't miss the harbor market.";
        assert!(rules.match_count(text) >= 3);
    }

    #[test]
    fn test_generic_fillers_do_not_match_experience() {
        let rules = RuleTable::compile(&generic_fillers()).unwrap();
        let text = "In today's fast-paced world, travel matters.";
        assert_eq!(rules.match_count(text), 1);
        assert_eq!(rules.match_count("We visited the old town."), 0);
    }

    #[test]
    fn test_direct_answer_openers() {
        let rules = RuleTable::compile(&direct_answer_openers()).unwrap();
        assert!(rules.any_match("The answer is three days."));
        assert!(rules.any_match("Yes, the pass covers both museums."));
        assert!(!rules.any_match("Many people wonder about this topic."));
    }

    #[test]
    fn test_question_heading_detection() {
        let rules = RuleTable::compile(&question_headings()).unwrap();
        assert!(rules.any_match("How long should you stay?"));
        assert!(rules.any_match("What to pack"));
        assert!(!rules.any_match("Packing essentials"));
    }

    #[test]
    fn test_monetization_links() {
        let rules = RuleTable::compile(&monetization_links()).unwrap();
        assert!(rules.any_match(r#"<a href="https://www.getyourguide.com/x">tour</a>"#));
        assert!(!rules.any_match(r#"<a href="https://example.com/blog">post</a>"#));
    }

    #[test]
    fn test_weighted_score() {
        let rules = RuleTable::compile(&[
            RulePattern {
                pattern: r"(?i)alpha".into(),
                weight: 2.0,
            },
            RulePattern {
                pattern: r"(?i)beta".into(),
                weight: 0.5,
            },
        ])
        .unwrap();
        assert!((rules.score("alpha and beta") - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bad_pattern_is_config_error() {
        let err = RuleTable::compile(&[RulePattern::new("(unclosed")]).unwrap_err();
        assert!(err.to_string().contains("Config"));
    }
}
