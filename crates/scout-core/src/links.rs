//! Outbound article link detection.
//!
//! Unlike the tiered fields, links are found by tallying: every anchor whose
//! href looks like an article path gets one representative selector, and the
//! most frequent selectors win.

use std::collections::{HashMap, HashSet};

use scraper::ElementRef;
use url::Url;

use crate::document::Document;
use crate::models::{Field, SelectorCandidate};

/// Path fragments that mark an href as an article link.
pub const ARTICLE_PATH_PATTERNS: [&str; 6] = [
    "/news/",
    "/article/",
    "/story/",
    "/post/",
    "/blog/",
    "/local-news/",
];

/// Link selectors are advisory and always land below the review threshold.
pub const LINK_CONFIDENCE: f64 = 0.70;

pub const MAX_LINK_SELECTORS: usize = 5;

const CLASS_HINTS: [&str; 3] = ["article", "link", "card"];
const DATA_ATTRIBUTES: [&str; 3] = ["data-testid", "data-article-id", "data-link"];

/// The first article pattern contained in `href`, if any.
pub fn matched_pattern(href: &str) -> Option<&'static str> {
    ARTICLE_PATH_PATTERNS
        .into_iter()
        .find(|pattern| href.contains(pattern))
}

/// Whether `token` can be dropped into a selector without escaping.
fn is_plain_ident(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// One selector that identifies this anchor, most specific hint first.
pub fn derive_selector(anchor: ElementRef<'_>, pattern: &str) -> String {
    let el = anchor.value();

    if let Some(id) = el.attr("id").filter(|id| is_plain_ident(id)) {
        return format!("a#{id}");
    }

    let classes: Vec<&str> = el
        .attr("class")
        .map(|c| c.split_whitespace().filter(|t| is_plain_ident(t)).collect())
        .unwrap_or_default();
    let hinted = classes.iter().find(|token| {
        let lower = token.to_lowercase();
        CLASS_HINTS.iter().any(|hint| lower.contains(hint))
    });
    if let Some(token) = hinted.or(classes.first()) {
        return format!("a.{token}");
    }

    if let Some(attr) = DATA_ATTRIBUTES.iter().find(|a| el.attr(a).is_some()) {
        return format!("a[{attr}]");
    }

    format!(r#"a[href*="{pattern}"]"#)
}

struct Tally {
    selector: String,
    count: usize,
    first_href: String,
}

/// Find the selectors that best capture the page's article links.
pub fn detect_links(doc: &Document) -> SelectorCandidate {
    let mut tallies: Vec<Tally> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for anchor in doc.find_all("a[href]") {
        let href = anchor.value().attr("href").unwrap_or_default();
        let Some(pattern) = matched_pattern(href) else {
            continue;
        };
        let selector = derive_selector(anchor, pattern);
        match index.get(&selector) {
            Some(&i) => tallies[i].count += 1,
            None => {
                index.insert(selector.clone(), tallies.len());
                tallies.push(Tally {
                    selector,
                    count: 1,
                    first_href: href.to_string(),
                });
            }
        }
    }

    // Stable sort: equal counts keep encounter order.
    tallies.sort_by(|a, b| b.count.cmp(&a.count));

    let mut candidate = SelectorCandidate::empty(Field::Link);
    if tallies.is_empty() {
        tracing::debug!("No article links found, using generic href patterns");
        for pattern in ARTICLE_PATH_PATTERNS {
            candidate.record(&format!(r#"a[href*="{pattern}"]"#), LINK_CONFIDENCE, "");
        }
        return candidate;
    }

    for tally in tallies.iter().take(MAX_LINK_SELECTORS) {
        tracing::debug!(selector = %tally.selector, count = tally.count, "Link selector");
        candidate.record(&tally.selector, LINK_CONFIDENCE, &tally.first_href);
    }
    candidate
}

/// Absolute URLs of article-looking links on the page, in document order.
///
/// Hrefs are resolved against `base`; fragments are dropped, duplicates and
/// the page itself are skipped, and only http(s) targets are kept.
pub fn article_urls(doc: &Document, base: &Url, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for anchor in doc.find_all("a[href]") {
        if urls.len() >= limit {
            break;
        }
        let href = anchor.value().attr("href").unwrap_or_default();
        if matched_pattern(href).is_none() {
            continue;
        }
        let Ok(mut resolved) = base.join(href) else {
            continue;
        };
        if !matches!(resolved.scheme(), "http" | "https") {
            continue;
        }
        resolved.set_fragment(None);
        if resolved == *base {
            continue;
        }
        let resolved = resolved.to_string();
        if seen.insert(resolved.clone()) {
            urls.push(resolved);
        }
    }

    urls
}
