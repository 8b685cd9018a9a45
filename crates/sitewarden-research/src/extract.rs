//! Article entry extraction.
//!
//! Feed-aware but format-tolerant: RSS `<item>` and Atom `<entry>` blocks
//! are scanned by tag pairs, and plain HTML pages fall back to heading
//! extraction. Sources in the wild serve all three, often malformed.

/// One extracted article candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleEntry {
    /// Article title.
    pub title: String,
    /// Summary or description, possibly empty.
    pub summary: String,
}

/// Maximum entries extracted per source.
pub const MAX_ENTRIES: usize = 10;

/// Extracts up to [`MAX_ENTRIES`] article entries from a feed or page body.
pub fn extract_entries(body: &str) -> Vec<ArticleEntry> {
    let lower = body.to_ascii_lowercase();
    if lower.contains("<item") {
        extract_blocks(body, "item", "title", "description")
    } else if lower.contains("<entry") {
        extract_blocks(body, "entry", "title", "summary")
    } else {
        extract_headings(body)
    }
}

fn extract_blocks(body: &str, block: &str, title_tag: &str, summary_tag: &str) -> Vec<ArticleEntry> {
    let mut entries = Vec::new();
    for chunk in tag_bodies(body, block).into_iter().take(MAX_ENTRIES) {
        let title = tag_bodies(&chunk, title_tag)
            .into_iter()
            .next()
            .map(|t| clean_text(&t))
            .unwrap_or_default();
        if title.is_empty() {
            continue;
        }
        let summary = tag_bodies(&chunk, summary_tag)
            .into_iter()
            .next()
            .map(|s| clean_text(&s))
            .unwrap_or_default();
        entries.push(ArticleEntry { title, summary });
    }
    entries
}

fn extract_headings(body: &str) -> Vec<ArticleEntry> {
    let mut entries = Vec::new();
    for tag in ["h2", "h3"] {
        for text in tag_bodies(body, tag) {
            let title = clean_text(&text);
            if !title.is_empty() {
                entries.push(ArticleEntry {
                    title,
                    summary: String::new(),
                });
            }
            if entries.len() >= MAX_ENTRIES {
                return entries;
            }
        }
        if !entries.is_empty() {
            break;
        }
    }
    entries
}

/// All `<tag ...>...</tag>` bodies in document order.
fn tag_bodies(body: &str, tag: &str) -> Vec<String> {
    let opener = format!("<{tag}");
    let closer = format!("</{tag}>");
    let lower = body.to_ascii_lowercase();
    let mut out = Vec::new();
    let mut pos = 0;
    while let Some(open) = lower[pos..].find(&opener) {
        let abs = pos + open;
        // Reject partial tag-name matches like <titlebar>.
        match lower.as_bytes().get(abs + opener.len()) {
            Some(b'>') | Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'/') => {}
            _ => {
                pos = abs + opener.len();
                continue;
            }
        }
        let Some(tag_end) = lower[abs..].find('>') else {
            break;
        };
        let start = abs + tag_end + 1;
        let Some(close) = lower[start..].find(&closer) else {
            break;
        };
        out.push(body[start..start + close].to_string());
        pos = start + close + closer.len();
    }
    out
}

/// Unwraps CDATA, strips residual tags and entities, collapses whitespace.
fn clean_text(raw: &str) -> String {
    let raw = raw.trim();
    let raw = raw
        .strip_prefix("<![CDATA[")
        .and_then(|v| v.strip_suffix("]]>"))
        .unwrap_or(raw);
    let mut text = String::with_capacity(raw.len());
    let mut in_tag = false;
    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    let text = text
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
