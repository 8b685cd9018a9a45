//! Robots-directive conflict detection.
//!
//! Parses `robots.txt` into ordered rule groups and evaluates each configured
//! AI crawler identity against them. When the same agent carries both a root
//! `Disallow: /` and a root `Allow: /`, the conflict is flagged and resolved
//! by *first rule group wins*: the group appearing earliest in file order
//! determines the effective answer.
//!
//! First-group-wins is a heuristic approximation. Real crawlers resolve
//! conflicting directives differently from one another; this audit reports
//! the conflict itself as the actionable finding, and the resolution only as
//! a best guess.

use crate::probe::ProbeClient;
use crate::types::RobotsAudit;
use sitewarden_core::CheckOutcome;
use tracing::debug;

/// Comment banner markers suggesting the file is vendor-managed or was
/// rewritten by a third party.
const INJECTION_MARKERS: &[&str] = &[
    "managed by",
    "auto-generated by",
    "begin managed",
    "do not edit",
];

/// One ordered rule group: a literal user-agent and its root rules.
#[derive(Debug, Clone)]
pub struct RuleGroup {
    /// Lowercased literal user-agent token.
    pub user_agent: String,
    /// Group order of first appearance in the file.
    pub order: usize,
    /// Line number of a `Disallow: /` rule, if present.
    pub root_disallow_line: Option<usize>,
    /// Line number of an `Allow: /` rule, if present.
    pub root_allow_line: Option<usize>,
}

/// Parses robots.txt into ordered rule groups.
///
/// Consecutive `User-agent` lines share the rule block that follows them,
/// but each agent keeps its own group entry so repeated appearances of the
/// same agent remain distinguishable.
pub fn parse_robots(text: &str) -> Vec<RuleGroup> {
    let mut groups: Vec<RuleGroup> = Vec::new();
    // Indices into `groups` of the user-agent lines currently collecting rules.
    let mut open: Vec<usize> = Vec::new();
    let mut collecting_agents = false;

    for (line_no, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let Some((field, value)) = line.split_once(':') else {
            continue;
        };
        let field = field.trim().to_lowercase();
        let value = value.trim();

        match field.as_str() {
            "user-agent" => {
                if !collecting_agents {
                    open.clear();
                    collecting_agents = true;
                }
                let order = groups.len();
                groups.push(RuleGroup {
                    user_agent: value.to_lowercase(),
                    order,
                    root_disallow_line: None,
                    root_allow_line: None,
                });
                open.push(order);
            }
            "disallow" => {
                collecting_agents = false;
                if value == "/" {
                    for &idx in &open {
                        groups[idx].root_disallow_line.get_or_insert(line_no);
                    }
                }
            }
            "allow" => {
                collecting_agents = false;
                if value == "/" {
                    for &idx in &open {
                        groups[idx].root_allow_line.get_or_insert(line_no);
                    }
                }
            }
            _ => {
                collecting_agents = false;
            }
        }
    }
    groups
}

/// Evaluates the configured crawler identities against a robots.txt body.
pub fn audit_robots(text: &str, crawlers: &[String]) -> RobotsAudit {
    let groups = parse_robots(text);
    let mut audit = RobotsAudit::default();

    let text_lower = text.to_lowercase();
    if INJECTION_MARKERS.iter().any(|m| text_lower.contains(m)) {
        audit.injection_suspected = true;
    }

    for crawler in crawlers {
        let wanted = crawler.to_lowercase();
        let explicit: Vec<&RuleGroup> =
            groups.iter().filter(|g| g.user_agent == wanted).collect();

        let blocked = if explicit.is_empty() {
            // Fall back to the wildcard group's root Disallow.
            groups
                .iter()
                .any(|g| g.user_agent == "*" && g.root_disallow_line.is_some())
        } else {
            // Earliest root directive across this agent's groups, ordered by
            // (group order, line number).
            let first_disallow = explicit
                .iter()
                .filter_map(|g| g.root_disallow_line.map(|l| (g.order, l)))
                .min();
            let first_allow = explicit
                .iter()
                .filter_map(|g| g.root_allow_line.map(|l| (g.order, l)))
                .min();

            if let (Some(disallow), Some(allow)) = (first_disallow, first_allow) {
                audit.conflicts.push(format!(
                    "Conflicting robots directives for {crawler}: both 'Disallow: /' and \
                     'Allow: /' are present; resolving by first rule group"
                ));
                // The same agent listed twice with Disallow before Allow is a
                // known injection fingerprint.
                if explicit.len() >= 2 && disallow < allow {
                    audit.injection_suspected = true;
                }
                disallow < allow
            } else {
                first_disallow.is_some()
            }
        };

        if blocked {
            audit.blocked_crawlers.push(crawler.clone());
        } else {
            audit.allowed_crawlers.push(crawler.clone());
        }
    }

    audit
}

/// Fetches robots.txt and runs the directive audit.
pub async fn check_robots(
    client: &ProbeClient,
    robots_url: &str,
    crawlers: &[String],
) -> CheckOutcome<RobotsAudit> {
    match client.fetch(robots_url).await {
        Ok(page) if (200..300).contains(&page.status) => {
            CheckOutcome::ok(audit_robots(&page.body, crawlers))
        }
        Ok(page) => {
            debug!(status = page.status, "robots.txt fetch returned non-2xx");
            // No robots file means nothing is blocked; still a degraded
            // answer because the audit could not inspect directives.
            let fallback = RobotsAudit {
                allowed_crawlers: crawlers.to_vec(),
                ..RobotsAudit::default()
            };
            CheckOutcome::degraded(fallback, format!("robots.txt returned HTTP {}", page.status))
        }
        Err(e) => CheckOutcome::degraded(RobotsAudit::default(), e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crawlers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_parse_preserves_group_order() {
        let text = "User-agent: *\nDisallow: /admin\n\nUser-agent: GPTBot\nDisallow: /\n";
        let groups = parse_robots(text);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].user_agent, "*");
        assert!(groups[0].root_disallow_line.is_none()); // /admin is not root
        assert_eq!(groups[1].user_agent, "gptbot");
        assert!(groups[1].root_disallow_line.is_some());
    }

    #[test]
    fn test_shared_rule_block_applies_to_all_agents() {
        let text = "User-agent: GPTBot\nUser-agent: ClaudeBot\nDisallow: /\n";
        let audit = audit_robots(text, &crawlers(&["GPTBot", "ClaudeBot"]));
        assert_eq!(audit.blocked_crawlers, vec!["GPTBot", "ClaudeBot"]);
        assert!(audit.conflicts.is_empty());
    }

    #[test]
    fn test_conflict_first_group_wins_blocked() {
        // Disallow in the first group, Allow in a later one: conflict is
        // flagged and the agent classified blocked.
        let text = "User-agent: GPTBot\nDisallow: /\n\nUser-agent: GPTBot\nAllow: /\n";
        let audit = audit_robots(text, &crawlers(&["GPTBot"]));
        assert_eq!(audit.conflicts.len(), 1);
        assert!(audit.conflicts[0].contains("GPTBot"));
        assert_eq!(audit.blocked_crawlers, vec!["GPTBot"]);
        assert!(audit.allowed_crawlers.is_empty());
    }

    #[test]
    fn test_conflict_first_group_wins_allowed() {
        let text = "User-agent: GPTBot\nAllow: /\n\nUser-agent: GPTBot\nDisallow: /\n";
        let audit = audit_robots(text, &crawlers(&["GPTBot"]));
        assert_eq!(audit.conflicts.len(), 1);
        assert_eq!(audit.allowed_crawlers, vec!["GPTBot"]);
    }

    #[test]
    fn test_wildcard_fallback_blocks() {
        let text = "User-agent: *\nDisallow: /\n";
        let audit = audit_robots(text, &crawlers(&["PerplexityBot"]));
        assert_eq!(audit.blocked_crawlers, vec!["PerplexityBot"]);
    }

    #[test]
    fn test_wildcard_partial_disallow_does_not_block() {
        let text = "User-agent: *\nDisallow: /private\n";
        let audit = audit_robots(text, &crawlers(&["PerplexityBot"]));
        assert_eq!(audit.allowed_crawlers, vec!["PerplexityBot"]);
    }

    #[test]
    fn test_injection_banner_marker() {
        let text = "# Managed by HostingProvider\nUser-agent: *\nDisallow: /\n";
        let audit = audit_robots(text, &crawlers(&["GPTBot"]));
        assert!(audit.injection_suspected);
    }

    #[test]
    fn test_injection_duplicate_agent_fingerprint() {
        let text = "User-agent: ClaudeBot\nDisallow: /\n\nUser-agent: ClaudeBot\nAllow: /\n";
        let audit = audit_robots(text, &crawlers(&["ClaudeBot"]));
        assert!(audit.injection_suspected);
    }

    #[test]
    fn test_agent_match_is_case_insensitive_literal() {
        let text = "User-agent: gptbot\nDisallow: /\n";
        let audit = audit_robots(text, &crawlers(&["GPTBot"]));
        assert_eq!(audit.blocked_crawlers, vec!["GPTBot"]);
    }
}
