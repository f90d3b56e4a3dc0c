use url::Url;

use crate::detect::{
    AUTHOR_RULES, BODY_RULES, CATEGORY_RULES, IMAGE_RULES, PUBLISHED_TIME_RULES, TITLE_RULES,
    detect,
};
use crate::document::Document;
use crate::error::AppError;
use crate::links::detect_links;
use crate::models::DiscoveryResult;

/// Boilerplate, ad, navigation and consent patterns worth excluding.
///
/// A pattern is reported only when the page actually contains it.
pub const EXCLUSION_CATALOGUE: &[&str] = &[
    "script",
    "style",
    "noscript",
    "iframe",
    "nav",
    "header",
    "footer",
    "aside",
    ".sidebar",
    ".advertisement",
    ".ad",
    ".ads",
    r#"[class*="ad-slot"]"#,
    r#"[id^="google_ads"]"#,
    ".sponsored",
    ".social-share",
    ".share-buttons",
    ".newsletter",
    ".subscribe",
    ".related-articles",
    ".recommended",
    ".comments",
    "#comments",
    ".cookie-banner",
    ".cookie-consent",
    "#cookie-consent",
    r#"[aria-label="cookie consent"]"#,
    ".popup",
    ".modal",
    ".breadcrumb",
];

/// Catalogue entries present in the document, in catalogue order.
pub fn detect_exclusions(doc: &Document) -> Vec<String> {
    EXCLUSION_CATALOGUE
        .iter()
        .filter(|pattern| doc.exists(pattern))
        .map(|pattern| pattern.to_string())
        .collect()
}

/// Runs every field detector over one page.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscoveryEngine;

impl DiscoveryEngine {
    pub fn new() -> Self {
        Self
    }

    /// Discover selectors for `doc`, fetched from `url`.
    ///
    /// `url` must be an absolute URL. Fields that match nothing come back as
    /// empty candidates; only a bad URL is an error.
    pub fn discover(&self, doc: &Document, url: &str) -> Result<DiscoveryResult, AppError> {
        let page = parse_page_url(url)?;
        tracing::info!(url = %page, "Discovering selectors");

        let result = DiscoveryResult {
            title: detect(doc, &TITLE_RULES),
            body: detect(doc, &BODY_RULES),
            author: detect(doc, &AUTHOR_RULES),
            published_time: detect(doc, &PUBLISHED_TIME_RULES),
            image: detect(doc, &IMAGE_RULES),
            link: detect_links(doc),
            category: detect(doc, &CATEGORY_RULES),
            exclusions: detect_exclusions(doc),
        };

        let review = result.fields_needing_review();
        tracing::info!(
            url = %page,
            exclusions = result.exclusions.len(),
            needs_review = ?review,
            "Discovery complete"
        );
        Ok(result)
    }

    /// Parse `html` and discover in one step.
    pub fn discover_html(&self, html: &str, url: &str) -> Result<DiscoveryResult, AppError> {
        let doc = Document::parse(html);
        self.discover(&doc, url)
    }
}

/// Parse the page URL, requiring an absolute URL with a host.
pub fn parse_page_url(url: &str) -> Result<Url, AppError> {
    let parsed = Url::parse(url).map_err(|e| AppError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if parsed.host_str().is_none() {
        return Err(AppError::InvalidUrl {
            url: url.to_string(),
            reason: "URL has no host".to_string(),
        });
    }
    Ok(parsed)
}
