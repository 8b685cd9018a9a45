//! Gate thresholds.
//!
//! All tunable values live in this one typed struct, injected into the gate
//! at construction. Changing the publishing bar never touches check logic.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A min/optimal/max character band for meta fields.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LengthBand {
    /// Below this is too short.
    pub min: usize,
    /// The sweet spot, for reporting.
    pub optimal: usize,
    /// Above this is too long.
    pub max: usize,
}

impl LengthBand {
    /// Whether `len` falls inside the band.
    pub fn contains(&self, len: usize) -> bool {
        (self.min..=self.max).contains(&len)
    }
}

/// Thresholds that vary by content type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentTypeThresholds {
    /// Body character count below which content is thin (blocker).
    pub thin_content_chars: usize,
    /// SEO score below this is a warning.
    pub quality_gate_score: f64,
    /// SEO score below this escalates to a blocker.
    pub blocker_score: f64,
    /// Word count below this is a blocker.
    pub min_words: usize,
    /// Word count below this (but above `min_words`) is a warning.
    pub target_words: usize,
    /// Whether the authenticity heuristic applies to this content type.
    pub authenticity_check: bool,
    /// Whether a monetization link is expected for this content type.
    pub monetization_check: bool,
}

/// The full gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateThresholds {
    /// Minimum title length in characters.
    pub min_title_chars: usize,
    /// Meta title band.
    pub meta_title: LengthBand,
    /// Meta description band.
    pub meta_description: LengthBand,
    /// Maximum number of H1 headings.
    pub max_h1: usize,
    /// Minimum number of H2 headings.
    pub min_h2: usize,
    /// Whether heading violations block instead of warn.
    pub heading_blocker: bool,
    /// Minimum internal link count.
    pub min_internal_links: usize,
    /// Maximum Flesch–Kincaid grade level (English content only).
    pub max_reading_grade: f64,
    /// Per-content-type overrides.
    pub by_content_type: HashMap<String, ContentTypeThresholds>,
    /// Fallback for unknown content types.
    pub default_type: ContentTypeThresholds,
}

impl GateThresholds {
    /// Resolves the thresholds for a content type.
    pub fn for_content_type(&self, content_type: &str) -> &ContentTypeThresholds {
        self.by_content_type
            .get(content_type)
            .unwrap_or(&self.default_type)
    }
}

impl Default for GateThresholds {
    fn default() -> Self {
        let default_type = ContentTypeThresholds {
            thin_content_chars: 1500,
            quality_gate_score: 70.0,
            blocker_score: 50.0,
            min_words: 600,
            target_words: 1200,
            authenticity_check: false,
            monetization_check: false,
        };
        let mut by_content_type = HashMap::new();
        by_content_type.insert(
            "guide".to_string(),
            ContentTypeThresholds {
                thin_content_chars: 3000,
                quality_gate_score: 75.0,
                blocker_score: 55.0,
                min_words: 1200,
                target_words: 2000,
                authenticity_check: true,
                monetization_check: true,
            },
        );
        by_content_type.insert(
            "listicle".to_string(),
            ContentTypeThresholds {
                thin_content_chars: 2000,
                quality_gate_score: 70.0,
                blocker_score: 50.0,
                min_words: 800,
                target_words: 1500,
                authenticity_check: false,
                monetization_check: true,
            },
        );
        by_content_type.insert(
            "review".to_string(),
            ContentTypeThresholds {
                thin_content_chars: 2000,
                quality_gate_score: 75.0,
                blocker_score: 55.0,
                min_words: 900,
                target_words: 1600,
                authenticity_check: true,
                monetization_check: false,
            },
        );
        by_content_type.insert(
            "news".to_string(),
            ContentTypeThresholds {
                thin_content_chars: 800,
                quality_gate_score: 65.0,
                blocker_score: 45.0,
                min_words: 300,
                target_words: 600,
                authenticity_check: false,
                monetization_check: false,
            },
        );

        Self {
            min_title_chars: 10,
            meta_title: LengthBand {
                min: 30,
                optimal: 55,
                max: 60,
            },
            meta_description: LengthBand {
                min: 70,
                optimal: 150,
                max: 160,
            },
            max_h1: 1,
            min_h2: 2,
            heading_blocker: false,
            min_internal_links: 2,
            max_reading_grade: 9.0,
            by_content_type,
            default_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_contains() {
        let band = LengthBand {
            min: 30,
            optimal: 55,
            max: 60,
        };
        assert!(band.contains(30));
        assert!(band.contains(60));
        assert!(!band.contains(29));
        assert!(!band.contains(61));
    }

    #[test]
    fn test_unknown_content_type_falls_back() {
        let thresholds = GateThresholds::default();
        let t = thresholds.for_content_type("interview");
        assert_eq!(t.min_words, thresholds.default_type.min_words);
    }

    #[test]
    fn test_guide_is_stricter_than_news() {
        let thresholds = GateThresholds::default();
        let guide = thresholds.for_content_type("guide");
        let news = thresholds.for_content_type("news");
        assert!(guide.min_words > news.min_words);
        assert!(guide.authenticity_check);
        assert!(!news.authenticity_check);
    }
}
