//! Tiered field detectors.
//!
//! Each field has a rule table: an ordered list of tiers, each a group of
//! selectors sharing one nominal confidence. The runner walks every tier and
//! every selector, keeps those that extract a value, and raises the
//! candidate's confidence to the best tier that hit.

use crate::document::Document;
use crate::extract::extract_value;
use crate::models::{Field, SelectorCandidate};

/// Text longer than this many chars earns the `long` body boost.
pub const LONG_TEXT_CHARS: usize = 500;
/// Text longer than this many chars earns the `medium` body boost.
pub const MEDIUM_TEXT_CHARS: usize = 200;

/// How a tier adjusts its nominal confidence for one hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scoring {
    Fixed,
    /// Drop to `penalized` when the selector matches more than one element.
    Ambiguity { penalized: f64 },
    /// Raise by extracted text length.
    TextLength { medium: f64, long: f64 },
}

/// A group of selectors bound to one confidence level.
#[derive(Debug, Clone, Copy)]
pub struct Tier {
    pub selectors: &'static [&'static str],
    pub confidence: f64,
    pub scoring: Scoring,
    /// Only consulted when no earlier tier matched anything.
    pub fallback_only: bool,
}

impl Tier {
    pub const fn new(selectors: &'static [&'static str], confidence: f64) -> Self {
        Self {
            selectors,
            confidence,
            scoring: Scoring::Fixed,
            fallback_only: false,
        }
    }

    pub const fn ambiguous(mut self, penalized: f64) -> Self {
        self.scoring = Scoring::Ambiguity { penalized };
        self
    }

    pub const fn length_boosted(mut self, medium: f64, long: f64) -> Self {
        self.scoring = Scoring::TextLength { medium, long };
        self
    }

    pub const fn fallback(mut self) -> Self {
        self.fallback_only = true;
        self
    }

    /// Confidence for a hit of `selector` that extracted `value`.
    pub fn score(&self, doc: &Document, selector: &str, value: &str) -> f64 {
        match self.scoring {
            Scoring::Fixed => self.confidence,
            Scoring::Ambiguity { penalized } => {
                if doc.count(selector) > 1 {
                    penalized
                } else {
                    self.confidence
                }
            }
            Scoring::TextLength { medium, long } => {
                let len = value.chars().count();
                if len > LONG_TEXT_CHARS {
                    long
                } else if len > MEDIUM_TEXT_CHARS {
                    medium
                } else {
                    self.confidence
                }
            }
        }
    }
}

/// The full ladder for one field.
#[derive(Debug, Clone, Copy)]
pub struct RuleSet {
    pub field: Field,
    pub tiers: &'static [Tier],
    /// Values for which this returns true are discarded outright.
    pub reject: Option<fn(&str) -> bool>,
}

impl RuleSet {
    fn rejects(&self, value: &str) -> bool {
        self.reject.is_some_and(|reject| reject(value))
    }
}

pub static TITLE_RULES: RuleSet = RuleSet {
    field: Field::Title,
    tiers: &[
        Tier::new(
            &["article h1", "main h1", "article header h1", r#"[role="main"] h1"#],
            0.95,
        ),
        Tier::new(
            &[
                r#"meta[property="og:title"]"#,
                r#"meta[name="twitter:title"]"#,
                r#"[itemprop="headline"]"#,
            ],
            0.90,
        ),
        Tier::new(
            &[
                "h1.title",
                "h1.headline",
                "h1.article-title",
                "h1.entry-title",
                "h1.post-title",
                ".article-title",
                ".entry-title",
                ".post-title",
                ".story-title",
            ],
            0.75,
        )
        .ambiguous(0.65),
        Tier::new(&["h1"], 0.70).ambiguous(0.60).fallback(),
    ],
    reject: None,
};

pub static BODY_RULES: RuleSet = RuleSet {
    field: Field::Body,
    tiers: &[
        Tier::new(
            &[
                r#"[itemprop="articleBody"]"#,
                "article .article-body",
                "article .entry-content",
                "main article",
                "article",
            ],
            0.90,
        )
        .length_boosted(0.92, 0.95),
        Tier::new(
            &[
                ".article-body",
                ".article-content",
                ".entry-content",
                ".post-content",
                ".story-body",
                ".content-body",
                "#article-body",
            ],
            0.85,
        )
        .length_boosted(0.87, 0.90),
    ],
    reject: None,
};

pub static AUTHOR_RULES: RuleSet = RuleSet {
    field: Field::Author,
    tiers: &[
        Tier::new(
            &[
                r#"meta[name="author"]"#,
                r#"meta[property="article:author"]"#,
                r#"[itemprop="author"] [itemprop="name"]"#,
                r#"[itemprop="author"]"#,
                r#"a[rel="author"]"#,
            ],
            0.95,
        ),
        Tier::new(
            &[
                ".author-name",
                ".byline-author",
                ".article-author",
                ".author",
                ".byline",
            ],
            0.80,
        ),
    ],
    reject: None,
};

pub static PUBLISHED_TIME_RULES: RuleSet = RuleSet {
    field: Field::PublishedTime,
    tiers: &[
        Tier::new(
            &[
                r#"meta[property="article:published_time"]"#,
                r#"meta[itemprop="datePublished"]"#,
                r#"meta[name="pubdate"]"#,
                r#"meta[name="publish-date"]"#,
                r#"meta[name="date"]"#,
            ],
            0.95,
        ),
        Tier::new(
            &[
                r#"time[itemprop="datePublished"][datetime]"#,
                r#"[itemprop="datePublished"][datetime]"#,
            ],
            0.92,
        ),
        Tier::new(&["article time[datetime]", "time[datetime]"], 0.90),
        Tier::new(
            &[
                ".publish-date",
                ".published",
                ".post-date",
                ".article-date",
                ".timestamp",
                ".date",
            ],
            0.75,
        ),
    ],
    reject: None,
};

pub static IMAGE_RULES: RuleSet = RuleSet {
    field: Field::Image,
    tiers: &[
        Tier::new(
            &[
                r#"meta[property="og:image"]"#,
                r#"meta[name="twitter:image"]"#,
                r#"meta[property="twitter:image"]"#,
            ],
            0.95,
        ),
        Tier::new(
            &[
                r#"meta[itemprop="image"]"#,
                r#"img[itemprop="image"][src]"#,
                r#"[itemprop="image"] img[src]"#,
            ],
            0.90,
        ),
        Tier::new(
            &[
                "article figure img[src]",
                "article img[src]",
                ".featured-image img[src]",
                ".article-image img[src]",
                "figure img[src]",
            ],
            0.85,
        ),
    ],
    reject: Some(is_placeholder_image),
};

pub static CATEGORY_RULES: RuleSet = RuleSet {
    field: Field::Category,
    tiers: &[
        Tier::new(&[r#"meta[property="article:section"]"#], 0.90),
        Tier::new(
            &[
                ".article-category",
                ".post-category",
                ".category",
                r#"a[rel="category tag"]"#,
                ".section-name",
            ],
            0.75,
        ),
    ],
    reject: None,
};

/// Image URLs that point at stand-in artwork rather than the article image.
pub fn is_placeholder_image(src: &str) -> bool {
    let src = src.to_lowercase();
    src.contains("placeholder") || src.contains("fallback")
}

/// Run one rule table over the document.
pub fn detect(doc: &Document, rules: &RuleSet) -> SelectorCandidate {
    let mut candidate = SelectorCandidate::empty(rules.field);

    for tier in rules.tiers {
        if tier.fallback_only && !candidate.is_empty() {
            continue;
        }
        for selector in tier.selectors {
            let Some(value) = extract_value(doc, selector) else {
                continue;
            };
            if rules.rejects(&value) {
                tracing::debug!(field = %rules.field, %selector, %value, "Rejected value");
                continue;
            }
            let confidence = tier.score(doc, selector, &value);
            tracing::debug!(field = %rules.field, %selector, confidence, "Selector matched");
            candidate.record(selector, confidence, &value);
        }
    }

    candidate
}
