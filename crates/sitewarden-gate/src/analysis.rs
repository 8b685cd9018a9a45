//! Text and markup analysis used by the gate checks.

use regex::Regex;

/// One extracted heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Heading level, 1–6.
    pub level: u8,
    /// Visible heading text.
    pub text: String,
}

/// Extracts `<h1>`–`<h6>` headings in document order.
pub fn extract_headings(html: &str) -> Vec<Heading> {
    let mut headings = Vec::new();
    let lower = html.to_ascii_lowercase();
    let mut pos = 0;
    while let Some(open) = lower[pos..].find("<h") {
        let abs = pos + open;
        let Some(level_char) = lower[abs + 2..].chars().next() else {
            break;
        };
        let Some(level) = level_char.to_digit(10) else {
            pos = abs + 2;
            continue;
        };
        if !(1..=6).contains(&level) {
            pos = abs + 2;
            continue;
        }
        let Some(tag_end) = lower[abs..].find('>') else {
            break;
        };
        let content_start = abs + tag_end + 1;
        let closer = format!("</h{level}>");
        let Some(close) = lower[content_start..].find(&closer) else {
            pos = content_start;
            continue;
        };
        let raw = &html[content_start..content_start + close];
        headings.push(Heading {
            level: level as u8,
            text: strip_tags(raw).trim().to_string(),
        });
        pos = content_start + close + closer.len();
    }
    headings
}

/// Validates the heading hierarchy: at most `max_h1` H1s, no skipped levels,
/// at least `min_h2` H2s. Returns one message per violation.
pub fn heading_violations(headings: &[Heading], max_h1: usize, min_h2: usize) -> Vec<String> {
    let mut violations = Vec::new();

    let h1_count = headings.iter().filter(|h| h.level == 1).count();
    if h1_count > max_h1 {
        violations.push(format!("{h1_count} H1 headings found, at most {max_h1} allowed"));
    }

    let mut previous: Option<u8> = None;
    for heading in headings {
        if let Some(prev) = previous {
            if heading.level > prev + 1 {
                violations.push(format!(
                    "skipped level: H{prev} followed by H{}",
                    heading.level
                ));
            }
        }
        previous = Some(heading.level);
    }

    let h2_count = headings.iter().filter(|h| h.level == 2).count();
    if h2_count < min_h2 {
        violations.push(format!("{h2_count} H2 headings found, at least {min_h2} expected"));
    }

    violations
}

/// Strips markup, scripts and styles down to visible text.
pub fn strip_tags(html: &str) -> String {
    let without_scripts = strip_element(html, "script");
    let without_styles = strip_element(&without_scripts, "style");
    let mut text = String::with_capacity(without_styles.len());
    let mut in_tag = false;
    for c in without_styles.chars() {
        match c {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_element(html: &str, tag: &str) -> String {
    let opener = format!("<{tag}");
    let closer = format!("</{tag}>");
    let lower = html.to_ascii_lowercase();
    let mut out = String::with_capacity(html.len());
    let mut pos = 0;
    while let Some(open) = lower[pos..].find(&opener) {
        let abs = pos + open;
        out.push_str(&html[pos..abs]);
        match lower[abs..].find(&closer) {
            Some(close) => pos = abs + close + closer.len(),
            None => return out,
        }
    }
    out.push_str(&html[pos..]);
    out
}

/// Counts whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// The first paragraph's visible text, or the leading text when no `<p>` is
/// present.
pub fn first_paragraph(html: &str) -> String {
    let lower = html.to_ascii_lowercase();
    if let Some(open) = lower.find("<p") {
        if let Some(tag_end) = lower[open..].find('>') {
            let start = open + tag_end + 1;
            if let Some(close) = lower[start..].find("</p>") {
                return strip_tags(&html[start..start + close]);
            }
        }
    }
    let text = strip_tags(html);
    text.chars().take(300).collect()
}

/// Counts links pointing at the site's own domains or relative paths.
pub fn count_internal_links(html: &str, domains: &[String]) -> usize {
    let href_re = match Regex::new(r#"(?i)href\s*=\s*["']([^"']+)["']"#) {
        Ok(re) => re,
        Err(_) => return 0,
    };
    href_re
        .captures_iter(html)
        .filter_map(|c| c.get(1))
        .filter(|m| {
            let href = m.as_str();
            if href.starts_with('#') || href.starts_with("mailto:") {
                return false;
            }
            if href.starts_with('/') {
                return true;
            }
            domains.iter().any(|d| href.contains(d.as_str()))
        })
        .count()
}

/// Sources of `<img>` tags missing non-empty alt text.
pub fn images_missing_alt(html: &str) -> Vec<String> {
    let img_re = match Regex::new(r#"(?i)<img\b[^>]*>"#) {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };
    let alt_re = match Regex::new(r#"(?i)\balt\s*=\s*["']([^"']*)["']"#) {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };
    let src_re = match Regex::new(r#"(?i)\bsrc\s*=\s*["']([^"']*)["']"#) {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };

    img_re
        .find_iter(html)
        .filter_map(|m| {
            let tag = m.as_str();
            let has_alt = alt_re
                .captures(tag)
                .and_then(|c| c.get(1))
                .is_some_and(|alt| !alt.as_str().trim().is_empty());
            if has_alt {
                None
            } else {
                Some(
                    src_re
                        .captures(tag)
                        .and_then(|c| c.get(1))
                        .map(|s| s.as_str().to_string())
                        .unwrap_or_else(|| "(no src)".to_string()),
                )
            }
        })
        .collect()
}

/// Approximate Flesch–Kincaid grade level. English text only; the syllable
/// counter is a vowel-group heuristic, not a dictionary.
pub fn flesch_kincaid_grade(text: &str) -> f64 {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }
    let sentences = text
        .split(['.', '!', '?'])
        .filter(|s| s.split_whitespace().count() > 1)
        .count()
        .max(1);
    let syllables: usize = words.iter().map(|w| count_syllables(w)).sum();

    let words_f = words.len() as f64;
    let grade = 0.39 * (words_f / sentences as f64) + 11.8 * (syllables as f64 / words_f) - 15.59;
    grade.max(0.0)
}

fn count_syllables(word: &str) -> usize {
    let word: String = word
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_lowercase();
    if word.is_empty() {
        return 0;
    }
    let is_vowel = |c: char| "aeiouy".contains(c);
    let mut count = 0;
    let mut prev_vowel = false;
    for c in word.chars() {
        let vowel = is_vowel(c);
        if vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = vowel;
    }
    // Silent trailing e.
    if word.ends_with('e') && !word.ends_with("le") && count > 1 {
        count -= 1;
    }
    count.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_headings_in_order() {
        let html = "<h1>Title</h1><p>x</p><h2>First</h2><h2>Second</h2><h3>Sub</h3>";
        let headings = extract_headings(html);
        let levels: Vec<u8> = headings.iter().map(|h| h.level).collect();
        assert_eq!(levels, vec![1, 2, 2, 3]);
        assert_eq!(headings[0].text, "Title");
    }

    #[test]
    fn test_heading_skip_detected() {
        let headings = vec![
            Heading { level: 1, text: "A".into() },
            Heading { level: 2, text: "B".into() },
            Heading { level: 4, text: "C".into() },
        ];
        let violations = heading_violations(&headings, 1, 1);
        assert!(violations.iter().any(|v| v.contains("skipped level")));
    }

    #[test]
    fn test_heading_valid_sequence_passes() {
        let headings = vec![
            Heading { level: 1, text: "A".into() },
            Heading { level: 2, text: "B".into() },
            Heading { level: 2, text: "C".into() },
            Heading { level: 3, text: "D".into() },
        ];
        assert!(heading_violations(&headings, 1, 2).is_empty());
    }

    #[test]
    fn test_heading_too_many_h1() {
        let headings = vec![
            Heading { level: 1, text: "A".into() },
            Heading { level: 1, text: "B".into() },
        ];
        let violations = heading_violations(&headings, 1, 0);
        assert!(violations.iter().any(|v| v.contains("H1")));
    }

    #[test]
    fn test_internal_link_counting() {
        let html = r##"
            <a href="/blog/other-post">internal relative</a>
            <a href="https://example.com/page">internal absolute</a>
            <a href="https://elsewhere.net/x">external</a>
            <a href="#section">anchor</a>
            <a href="mailto:hi@example.com">mail</a>
        "##;
        let domains = vec!["example.com".to_string()];
        assert_eq!(count_internal_links(html, &domains), 2);
    }

    #[test]
    fn test_images_missing_alt() {
        let html = r#"
            <img src="/a.jpg" alt="A nice photo">
            <img src="/b.jpg" alt="">
            <img src="/c.jpg">
        "#;
        let missing = images_missing_alt(html);
        assert_eq!(missing, vec!["/b.jpg".to_string(), "/c.jpg".to_string()]);
    }

    #[test]
    fn test_first_paragraph() {
        let html = "<h1>T</h1><p>The answer is three days.</p><p>More text.</p>";
        assert_eq!(first_paragraph(html), "The answer is three days.");
    }

    #[test]
    fn test_syllable_counting() {
        assert_eq!(count_syllables("cat"), 1);
        assert_eq!(count_syllables("hotel"), 2);
        assert_eq!(count_syllables("beautiful"), 3);
        // Silent e.
        assert_eq!(count_syllables("take"), 1);
    }

    #[test]
    fn test_grade_simple_vs_complex() {
        let simple = "We went out. It was fun. The sun was warm. We ate well.";
        let complex = "Notwithstanding considerable meteorological unpredictability, \
                       the expedition participants demonstrated extraordinary perseverance \
                       throughout increasingly inhospitable circumstances.";
        assert!(flesch_kincaid_grade(simple) < flesch_kincaid_grade(complex));
    }

    #[test]
    fn test_grade_empty_text() {
        assert_eq!(flesch_kincaid_grade(""), 0.0);
    }
}
