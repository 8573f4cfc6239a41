use crate::hyperlink::Hyperlink;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

/// Signature of a pluggable link extraction step: raw page body in, links out.
pub type LinkExtractor = fn(&str) -> BTreeSet<Hyperlink>;

// Absolute links only; relative hrefs never match. A quoted href closes only on its
// own quote character.
static ANCHOR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<a\s+(?:[^>]*?\s)?href\s*=\s*(?:"\s*(https?://[^"\s]*)\s*"|'\s*(https?://[^'\s]*)\s*')[^>]*>(.*?)</a\s*>"#,
    )
    .expect("hardcoded regex pattern is valid")
});

static WHITESPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("hardcoded regex pattern is valid"));

/// Extract every absolute `http`/`https` anchor from raw markup.
///
/// This is a pattern matcher over the text, not an HTML parser. Line breaks are folded
/// into spaces first so anchors spanning several lines still match. An anchor whose
/// href does not parse as a URL is skipped on its own; it never spoils the rest of the
/// page. Duplicate (url, label) pairs on the same page collapse into one entry.
pub fn extract_links(body: &str) -> BTreeSet<Hyperlink> {
    let flattened = body.replace(['\r', '\n'], " ");

    let mut links = BTreeSet::new();
    for captures in ANCHOR_REGEX.captures_iter(&flattened) {
        let Some(href) = captures.get(1).or_else(|| captures.get(2)) else {
            continue;
        };
        let href = href.as_str().trim();
        let label = normalize_label(&captures[3]);

        match Url::parse(href) {
            Ok(url) => {
                links.insert(Hyperlink::new(url, label));
            }
            Err(e) => debug!("Skipping malformed href '{}': {}", href, e),
        }
    }

    links
}

fn normalize_label(raw: &str) -> String {
    WHITESPACE_REGEX.replace_all(raw, " ").trim().to_string()
}
