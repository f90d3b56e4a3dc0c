//! The single value-extraction primitive shared by discovery and validation.
//!
//! A selector yields either an attribute (for `meta` tags and selectors that
//! reference `datetime`, `src` or `href`) or the element's text. A fallback
//! chain is a comma-separated list of selectors tried left to right.

use crate::document::Document;

/// Attributes that, when referenced in a selector, are extracted instead of text.
const VALUE_ATTRIBUTES: [&str; 3] = ["datetime", "src", "href"];

/// What a selector extracts from its first match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractKind {
    Text,
    Attr(&'static str),
}

impl ExtractKind {
    /// Decided by the subject of the selector, the compound after the last
    /// combinator: `head > meta[name="author"]` reads `content`.
    pub fn for_selector(selector: &str) -> Self {
        let subject = subject_compound(selector.trim());
        if is_meta(subject) {
            return ExtractKind::Attr("content");
        }
        VALUE_ATTRIBUTES
            .into_iter()
            .find(|name| references_attribute(subject, name))
            .map_or(ExtractKind::Text, ExtractKind::Attr)
    }
}

/// Characters outside brackets, parentheses and quotes, with their byte offsets.
fn top_level(selector: &str) -> impl Iterator<Item = (usize, char)> + '_ {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    selector.char_indices().filter(move |&(_, c)| match (quote, c) {
        (Some(q), c) if c == q => {
            quote = None;
            false
        }
        (Some(_), _) => false,
        (None, '"' | '\'') => {
            quote = Some(c);
            false
        }
        (None, '[' | '(') => {
            depth += 1;
            false
        }
        (None, ']' | ')') => {
            depth = depth.saturating_sub(1);
            false
        }
        (None, _) => depth == 0,
    })
}

/// The rightmost compound selector, i.e. the element actually matched.
fn subject_compound(selector: &str) -> &str {
    let start = top_level(selector)
        .filter(|&(_, c)| c.is_whitespace() || matches!(c, '>' | '+' | '~'))
        .last()
        .map_or(0, |(idx, c)| idx + c.len_utf8());
    &selector[start..]
}

fn is_meta(compound: &str) -> bool {
    compound
        .strip_prefix("meta")
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(['[', '.', '#', ':']))
}

/// True if `selector` contains an attribute test like `[name]` or `[name*=...]`.
fn references_attribute(selector: &str, name: &str) -> bool {
    selector.match_indices('[').any(|(idx, _)| {
        let rest = selector[idx + 1..].trim_start();
        rest.strip_prefix(name).is_some_and(|after| {
            after
                .chars()
                .next()
                .is_some_and(|c| matches!(c, ']' | '=' | '*' | '^' | '$' | '~' | '|' | ' '))
        })
    })
}

/// Extract a value with one selector. Empty values count as not found.
pub fn extract_value(doc: &Document, selector: &str) -> Option<String> {
    let selector = selector.trim();
    if selector.is_empty() {
        return None;
    }
    let value = match ExtractKind::for_selector(selector) {
        ExtractKind::Attr(name) => doc.attr(selector, name)?,
        ExtractKind::Text => doc.text(selector)?,
    };
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Extract with a fallback chain; the first selector yielding a value wins.
pub fn extract_chain(doc: &Document, chain: &str) -> Option<String> {
    split_chain(chain)
        .into_iter()
        .find_map(|selector| extract_value(doc, selector))
}

/// Split a fallback chain at top-level commas.
///
/// Commas inside brackets, parentheses or quotes belong to the selector.
pub fn split_chain(chain: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;

    for (idx, c) in top_level(chain) {
        if c == ',' {
            parts.push(chain[start..idx].trim());
            start = idx + 1;
        }
    }
    parts.push(chain[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}
