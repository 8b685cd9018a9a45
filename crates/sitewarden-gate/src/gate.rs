//! The pre-publication gate.
//!
//! Runs the ordered check list over one content item. Deterministic given
//! the same inputs and thresholds: the only I/O is the two optional route
//! probes, and those are skipped entirely for bulk/offline audits.

use crate::analysis::{
    count_internal_links, extract_headings, first_paragraph, flesch_kincaid_grade,
    heading_violations, images_missing_alt, strip_tags, word_count,
};
use crate::rules::{
    direct_answer_openers, experience_signals, generic_fillers, monetization_links,
    preamble_fillers, question_headings, RuleTable,
};
use crate::thresholds::GateThresholds;
use serde::{Deserialize, Serialize};
use sitewarden_core::{Severity, WardenError, WardenResult};
use std::time::Duration;
use tracing::{debug, info};

/// Minimum experience-signal matches for the authenticity check to pass.
const MIN_EXPERIENCE_SIGNALS: usize = 3;
/// Maximum generic-filler matches tolerated by the authenticity check.
const MAX_GENERIC_PHRASES: usize = 1;

/// One content item under review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateInput {
    /// The URL the content will publish at.
    pub target_url: String,
    /// Base URL of the site, for localized-root probes.
    pub site_base_url: String,
    /// Domains counted as internal for link checks.
    #[serde(default)]
    pub site_domains: Vec<String>,
    /// BCP-47-ish locale tag, e.g. `en` or `ar`.
    pub locale: String,
    /// Content type slug, e.g. `guide`.
    pub content_type: String,
    /// Display title.
    pub title: String,
    /// Meta title.
    pub meta_title: String,
    /// Meta description.
    pub meta_description: String,
    /// Body markup.
    pub body_html: String,
    /// Author attribution, if any.
    pub author: Option<String>,
    /// Aggregate SEO score, if computed upstream.
    pub seo_score: Option<f64>,
    /// Whether the publishing template injects structured data for this item.
    #[serde(default)]
    pub has_structured_data: bool,
}

/// Review options.
#[derive(Debug, Clone, Copy, Default)]
pub struct GateOptions {
    /// Skip the route-reachability probes (bulk/offline audits).
    pub skip_reachability: bool,
}

/// One named check result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateCheck {
    /// Check name, stable across runs.
    pub name: String,
    /// Whether the check passed.
    pub passed: bool,
    /// Severity when failing.
    pub severity: Severity,
    /// Human-readable outcome.
    pub message: String,
}

/// The ordered outcome of one gate review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateResult {
    /// True iff no blocker-severity check failed.
    pub allowed: bool,
    /// Every check that ran, in order.
    pub checks: Vec<GateCheck>,
    /// Messages of failed blocker checks.
    pub blockers: Vec<String>,
    /// Messages of failed warning checks.
    pub warnings: Vec<String>,
}

impl GateResult {
    fn record(&mut self, name: &str, passed: bool, severity: Severity, message: String) {
        if !passed {
            match severity {
                Severity::Blocker => self.blockers.push(message.clone()),
                Severity::Warning => self.warnings.push(message.clone()),
                Severity::Info => {}
            }
        }
        self.checks.push(GateCheck {
            name: name.to_string(),
            passed,
            severity,
            message,
        });
    }
}

struct GateRules {
    experience: RuleTable,
    fillers: RuleTable,
    direct_answers: RuleTable,
    preambles: RuleTable,
    questions: RuleTable,
    monetization: RuleTable,
}

impl GateRules {
    fn compile() -> WardenResult<Self> {
        Ok(Self {
            experience: RuleTable::compile(&experience_signals())?,
            fillers: RuleTable::compile(&generic_fillers())?,
            direct_answers: RuleTable::compile(&direct_answer_openers())?,
            preambles: RuleTable::compile(&preamble_fillers())?,
            questions: RuleTable::compile(&question_headings())?,
            monetization: RuleTable::compile(&monetization_links())?,
        })
    }
}

/// Validates content items before the publishing pipeline commits them.
pub struct PublicationGate {
    thresholds: GateThresholds,
    rules: GateRules,
    client: reqwest::Client,
}

impl PublicationGate {
    /// Creates a gate with the given thresholds and the default rule tables.
    pub fn new(thresholds: GateThresholds) -> WardenResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| WardenError::Gate(format!("failed to build gate client: {e}")))?;
        Ok(Self {
            thresholds,
            rules: GateRules::compile()?,
            client,
        })
    }

    /// Reviews one content item. `allowed` is false iff any blocker fired.
    pub async fn review(&self, input: &GateInput, opts: GateOptions) -> GateResult {
        let mut result = GateResult {
            allowed: true,
            checks: Vec::new(),
            blockers: Vec::new(),
            warnings: Vec::new(),
        };
        let ct = self.thresholds.for_content_type(&input.content_type);
        let body_text = strip_tags(&input.body_html);
        let headings = extract_headings(&input.body_html);

        // 1. Parent route reachability.
        if opts.skip_reachability {
            result.record(
                "Parent Route",
                true,
                Severity::Info,
                "reachability probe skipped".to_string(),
            );
        } else {
            let parent = parent_url(&input.target_url);
            match self.probe_status(&parent).await {
                Some(404) => result.record(
                    "Parent Route",
                    false,
                    Severity::Blocker,
                    format!("parent route {parent} returned 404"),
                ),
                Some(_) => result.record(
                    "Parent Route",
                    true,
                    Severity::Blocker,
                    format!("parent route {parent} reachable"),
                ),
                None => result.record(
                    "Parent Route",
                    false,
                    Severity::Warning,
                    format!("parent route {parent} could not be verified"),
                ),
            }
        }

        // 2. Localized root for Arabic content.
        if input.locale == "ar" {
            if opts.skip_reachability {
                result.record(
                    "Localized Root",
                    true,
                    Severity::Info,
                    "reachability probe skipped".to_string(),
                );
            } else {
                let root = format!("{}/ar", input.site_base_url.trim_end_matches('/'));
                let reachable = matches!(self.probe_status(&root).await, Some(s) if (200..400).contains(&s));
                result.record(
                    "Localized Root",
                    reachable,
                    Severity::Blocker,
                    if reachable {
                        format!("localized root {root} reachable")
                    } else {
                        format!("localized root {root} unreachable")
                    },
                );
            }
        }

        // 3. Title length.
        let title_ok = input.title.trim().chars().count() >= self.thresholds.min_title_chars;
        result.record(
            "Title",
            title_ok,
            Severity::Blocker,
            format!(
                "title length {} (minimum {})",
                input.title.trim().chars().count(),
                self.thresholds.min_title_chars
            ),
        );

        // 4–5. Meta bands.
        let meta_title_len = input.meta_title.chars().count();
        result.record(
            "Meta Title",
            self.thresholds.meta_title.contains(meta_title_len),
            Severity::Warning,
            format!(
                "meta title length {meta_title_len} (band {}-{})",
                self.thresholds.meta_title.min, self.thresholds.meta_title.max
            ),
        );
        let meta_desc_len = input.meta_description.chars().count();
        result.record(
            "Meta Description",
            self.thresholds.meta_description.contains(meta_desc_len),
            Severity::Warning,
            format!(
                "meta description length {meta_desc_len} (band {}-{})",
                self.thresholds.meta_description.min, self.thresholds.meta_description.max
            ),
        );

        // 6. Thin content.
        let body_chars = body_text.chars().count();
        result.record(
            "Content Length",
            body_chars >= ct.thin_content_chars,
            Severity::Blocker,
            format!(
                "body length {body_chars} chars (thin-content threshold {})",
                ct.thin_content_chars
            ),
        );

        // 7. SEO score with escalation below the sub-threshold.
        let seo = input.seo_score.unwrap_or(0.0);
        if seo < ct.blocker_score {
            result.record(
                "SEO Score",
                false,
                Severity::Blocker,
                format!("SEO score {seo:.0} below the hard floor {:.0}", ct.blocker_score),
            );
        } else {
            result.record(
                "SEO Score",
                seo >= ct.quality_gate_score,
                Severity::Warning,
                format!(
                    "SEO score {seo:.0} (quality gate {:.0})",
                    ct.quality_gate_score
                ),
            );
        }

        // 8. Heading hierarchy.
        let violations = heading_violations(&headings, self.thresholds.max_h1, self.thresholds.min_h2);
        let heading_severity = if self.thresholds.heading_blocker {
            Severity::Blocker
        } else {
            Severity::Warning
        };
        result.record(
            "Heading Hierarchy",
            violations.is_empty(),
            heading_severity,
            if violations.is_empty() {
                "heading hierarchy valid".to_string()
            } else {
                violations.join("; ")
            },
        );

        // 9. Word count: hard minimum, soft target.
        let words = word_count(&body_text);
        if words < ct.min_words {
            result.record(
                "Word Count",
                false,
                Severity::Blocker,
                format!("{words} words, minimum {}", ct.min_words),
            );
        } else {
            result.record(
                "Word Count",
                words >= ct.target_words,
                Severity::Warning,
                format!("{words} words, target {}", ct.target_words),
            );
        }

        // 10. Internal links.
        let internal = count_internal_links(&input.body_html, &input.site_domains);
        result.record(
            "Internal Links",
            internal >= self.thresholds.min_internal_links,
            Severity::Warning,
            format!(
                "{internal} internal links (minimum {})",
                self.thresholds.min_internal_links
            ),
        );

        // 11. Reading grade, English only.
        if input.locale.starts_with("en") {
            let grade = flesch_kincaid_grade(&body_text);
            result.record(
                "Readability",
                grade <= self.thresholds.max_reading_grade,
                Severity::Warning,
                format!(
                    "reading grade {grade:.1} (maximum {:.1})",
                    self.thresholds.max_reading_grade
                ),
            );
        }

        // 12. Image alt text.
        let missing_alt = images_missing_alt(&input.body_html);
        result.record(
            "Image Alt Text",
            missing_alt.is_empty(),
            Severity::Warning,
            if missing_alt.is_empty() {
                "all images carry alt text".to_string()
            } else {
                format!("{} images missing alt text: {}", missing_alt.len(), missing_alt.join(", "))
            },
        );

        // 13. Author attribution.
        let has_author = input.author.as_deref().is_some_and(|a| !a.trim().is_empty());
        result.record(
            "Author Attribution",
            has_author,
            Severity::Warning,
            if has_author {
                "author present".to_string()
            } else {
                "no author attribution".to_string()
            },
        );

        // 14. Structured-data proxy signal.
        let has_schema =
            input.has_structured_data || input.body_html.contains("application/ld+json");
        result.record(
            "Structured Data",
            has_schema,
            Severity::Warning,
            if has_schema {
                "structured data present".to_string()
            } else {
                "no structured-data signal".to_string()
            },
        );

        // 15. Authenticity heuristic, content-type gated.
        if ct.authenticity_check {
            let signals = self.rules.experience.match_count(&body_text);
            let generic = self.rules.fillers.match_count(&body_text);
            let passed = signals >= MIN_EXPERIENCE_SIGNALS && generic <= MAX_GENERIC_PHRASES;
            result.record(
                "Authenticity",
                passed,
                Severity::Warning,
                format!("{signals} experience signals, {generic} generic phrases"),
            );
        }

        // 16. Monetization link, content-type gated.
        if ct.monetization_check {
            let has_link = self.rules.monetization.any_match(&input.body_html);
            result.record(
                "Monetization",
                has_link,
                Severity::Warning,
                if has_link {
                    "monetization link present".to_string()
                } else {
                    "no recognized monetization or booking link".to_string()
                },
            );
        }

        // 17. AI-overview readiness. Advisory only, never a blocker.
        let intro = first_paragraph(&input.body_html);
        let direct = self.rules.direct_answers.any_match(&intro);
        let question_h2 = headings
            .iter()
            .any(|h| h.level == 2 && self.rules.questions.any_match(&h.text));
        let preamble_free = !self.rules.preambles.any_match(&intro);
        let mut missing = Vec::new();
        if !direct {
            missing.push("no direct-answer opener in the intro");
        }
        if !question_h2 {
            missing.push("no question-formatted H2");
        }
        if !preamble_free {
            missing.push("intro contains preamble filler");
        }
        result.record(
            "AI Overview Readiness",
            missing.is_empty(),
            Severity::Warning,
            if missing.is_empty() {
                "intro answers directly with question-formatted sections".to_string()
            } else {
                missing.join("; ")
            },
        );

        result.allowed = result.blockers.is_empty();
        info!(
            target = %input.target_url,
            allowed = result.allowed,
            blockers = result.blockers.len(),
            warnings = result.warnings.len(),
            "gate review complete"
        );
        result
    }

    async fn probe_status(&self, url: &str) -> Option<u16> {
        match self.client.head(url).send().await {
            Ok(response) => Some(response.status().as_u16()),
            Err(e) => {
                debug!(url = %url, error = %e, "route probe failed");
                None
            }
        }
    }
}

/// The parent path of a URL: everything up to the last path segment.
fn parent_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    match trimmed.rfind('/') {
        // Keep the scheme's double slash intact.
        Some(idx) if idx > trimmed.find("//").map_or(0, |i| i + 1) => trimmed[..idx].to_string(),
        _ => trimmed.to_string(),
    }
}
