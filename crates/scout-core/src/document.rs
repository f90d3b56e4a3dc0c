//! Read-only handle over a parsed HTML page.
//!
//! Every query takes a CSS selector string. Selectors that fail to parse are
//! treated as matching nothing; the heuristics probe many patterns and a
//! malformed user-supplied selector is a miss, not a crash.

use scraper::{ElementRef, Html, Selector};

/// A parsed HTML document.
///
/// Built once per page and only ever read afterwards.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    fn selector(css: &str) -> Option<Selector> {
        match Selector::parse(css) {
            Ok(selector) => Some(selector),
            Err(e) => {
                tracing::debug!(selector = %css, error = ?e, "Ignoring unparsable selector");
                None
            }
        }
    }

    /// First element matching `css`, in document order.
    pub fn find_first(&self, css: &str) -> Option<ElementRef<'_>> {
        let selector = Self::selector(css)?;
        self.html.select(&selector).next()
    }

    /// All elements matching `css`, in document order.
    pub fn find_all(&self, css: &str) -> Vec<ElementRef<'_>> {
        match Self::selector(css) {
            Some(selector) => self.html.select(&selector).collect(),
            None => Vec::new(),
        }
    }

    pub fn count(&self, css: &str) -> usize {
        match Self::selector(css) {
            Some(selector) => self.html.select(&selector).count(),
            None => 0,
        }
    }

    pub fn exists(&self, css: &str) -> bool {
        self.find_first(css).is_some()
    }

    /// Attribute `name` of the first element matching `css`.
    pub fn attr(&self, css: &str, name: &str) -> Option<String> {
        self.find_first(css)
            .and_then(|el| el.value().attr(name))
            .map(str::to_string)
    }

    /// Whitespace-normalised text of the first element matching `css`.
    pub fn text(&self, css: &str) -> Option<String> {
        self.find_first(css).map(element_text)
    }
}

/// Concatenated descendant text with runs of whitespace collapsed.
pub fn element_text(el: ElementRef<'_>) -> String {
    let raw: String = el.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
