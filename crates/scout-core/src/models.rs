use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Candidates below this confidence should be checked by a human before use.
pub const REVIEW_THRESHOLD: f64 = 0.80;

/// Maximum length (in chars) of any stored sample value.
pub const SAMPLE_MAX_CHARS: usize = 100;

/// Fields that must extract for an article to count as successful.
pub const CRITICAL_FIELDS: [Field; 2] = [Field::Title, Field::Body];

/// An extractable article field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Title,
    Body,
    Author,
    PublishedTime,
    Image,
    Link,
    Category,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Title,
        Field::Body,
        Field::Author,
        Field::PublishedTime,
        Field::Image,
        Field::Link,
        Field::Category,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Body => "body",
            Field::Author => "author",
            Field::PublishedTime => "published_time",
            Field::Image => "image",
            Field::Link => "link",
            Field::Category => "category",
        }
    }

    pub fn is_critical(&self) -> bool {
        CRITICAL_FIELDS.contains(self)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    /// Accepts `published_time`, `published-time` and `publishedTime` alike.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "title" => Ok(Field::Title),
            "body" => Ok(Field::Body),
            "author" => Ok(Field::Author),
            "publishedtime" => Ok(Field::PublishedTime),
            "image" => Ok(Field::Image),
            "link" => Ok(Field::Link),
            "category" => Ok(Field::Category),
            _ => Err(format!("Unknown field: {}", s)),
        }
    }
}

/// Truncate a sample value to [`SAMPLE_MAX_CHARS`], ending with `...` when cut.
pub fn truncate_sample(value: &str) -> String {
    if value.chars().count() <= SAMPLE_MAX_CHARS {
        return value.to_string();
    }
    let mut out: String = value.chars().take(SAMPLE_MAX_CHARS - 3).collect();
    out.push_str("...");
    out
}

/// Round a percentage to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Selectors discovered for one field, best-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorCandidate {
    pub field: Field,
    pub selectors: Vec<String>,
    /// Heuristic score in [0, 1]; zero exactly when `selectors` is empty.
    pub confidence: f64,
    /// Value extracted by the first matching selector, truncated.
    pub sample_text: String,
}

impl SelectorCandidate {
    pub fn empty(field: Field) -> Self {
        Self {
            field,
            selectors: Vec::new(),
            confidence: 0.0,
            sample_text: String::new(),
        }
    }

    /// Record a selector that produced `value`.
    ///
    /// Confidence only ever rises; the sample comes from the first hit.
    pub fn record(&mut self, selector: &str, confidence: f64, value: &str) {
        debug_assert!(
            confidence > 0.0 && confidence <= 1.0,
            "selector confidence must be in (0, 1], got {confidence}"
        );
        self.selectors.push(selector.to_string());
        if confidence > self.confidence {
            self.confidence = confidence;
        }
        if self.sample_text.is_empty() {
            self.sample_text = truncate_sample(value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    pub fn needs_review(&self) -> bool {
        self.confidence < REVIEW_THRESHOLD
    }

    /// The selectors as a comma-joined fallback chain.
    pub fn fallback_chain(&self) -> String {
        self.selectors.join(", ")
    }
}

/// Everything discovery learned about one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryResult {
    pub title: SelectorCandidate,
    pub body: SelectorCandidate,
    pub author: SelectorCandidate,
    pub published_time: SelectorCandidate,
    pub image: SelectorCandidate,
    pub link: SelectorCandidate,
    pub category: SelectorCandidate,
    /// Boilerplate patterns present on the page, in catalogue order.
    pub exclusions: Vec<String>,
}

impl DiscoveryResult {
    /// A result where nothing was found.
    pub fn empty() -> Self {
        Self {
            title: SelectorCandidate::empty(Field::Title),
            body: SelectorCandidate::empty(Field::Body),
            author: SelectorCandidate::empty(Field::Author),
            published_time: SelectorCandidate::empty(Field::PublishedTime),
            image: SelectorCandidate::empty(Field::Image),
            link: SelectorCandidate::empty(Field::Link),
            category: SelectorCandidate::empty(Field::Category),
            exclusions: Vec::new(),
        }
    }

    pub fn candidate(&self, field: Field) -> &SelectorCandidate {
        match field {
            Field::Title => &self.title,
            Field::Body => &self.body,
            Field::Author => &self.author,
            Field::PublishedTime => &self.published_time,
            Field::Image => &self.image,
            Field::Link => &self.link,
            Field::Category => &self.category,
        }
    }

    /// Fields whose candidate is empty or below [`REVIEW_THRESHOLD`].
    pub fn fields_needing_review(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| self.candidate(*f).needs_review())
            .collect()
    }
}

/// Configured selectors for a source: one fallback chain per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleSelectors {
    pub title: String,
    pub body: String,
    pub author: String,
    pub published_time: String,
    pub image: String,
    pub link: String,
    pub category: String,
}

impl ArticleSelectors {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Body => &self.body,
            Field::Author => &self.author,
            Field::PublishedTime => &self.published_time,
            Field::Image => &self.image,
            Field::Link => &self.link,
            Field::Category => &self.category,
        }
    }

    /// Builder-style setter, mostly for tests and programmatic configs.
    pub fn with(mut self, field: Field, chain: impl Into<String>) -> Self {
        let chain = chain.into();
        match field {
            Field::Title => self.title = chain,
            Field::Body => self.body = chain,
            Field::Author => self.author = chain,
            Field::PublishedTime => self.published_time = chain,
            Field::Image => self.image = chain,
            Field::Link => self.link = chain,
            Field::Category => self.category = chain,
        }
        self
    }

    /// Fields with a non-blank chain, in [`Field::ALL`] order.
    pub fn configured_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| !self.get(*f).trim().is_empty())
            .collect()
    }

    pub fn from_json(json: &str) -> Result<Self, crate::error::AppError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl From<&DiscoveryResult> for ArticleSelectors {
    fn from(result: &DiscoveryResult) -> Self {
        Field::ALL.into_iter().fold(Self::default(), |acc, field| {
            acc.with(field, result.candidate(field).fallback_chain())
        })
    }
}

/// Per-field tallies from a validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValidationResult {
    pub field_name: Field,
    pub success_count: usize,
    pub total_count: usize,
    /// Percentage in [0, 100], two decimals; 0 when nothing was attempted.
    pub success_rate: f64,
    pub failed_urls: Vec<String>,
    pub sample_values: Vec<String>,
}

impl FieldValidationResult {
    pub fn new(field_name: Field) -> Self {
        Self {
            field_name,
            success_count: 0,
            total_count: 0,
            success_rate: 0.0,
            failed_urls: Vec::new(),
            sample_values: Vec::new(),
        }
    }

    pub fn failure_count(&self) -> usize {
        self.total_count - self.success_count
    }
}

/// Report produced by one validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub field_results: BTreeMap<Field, FieldValidationResult>,
    pub total_articles: usize,
    /// Articles where every critical field extracted.
    pub successful_articles: usize,
    /// True when the run was stopped early; tallies cover processed URLs only.
    pub cancelled: bool,
}

impl ValidationResult {
    pub fn field(&self, field: Field) -> Option<&FieldValidationResult> {
        self.field_results.get(&field)
    }

    /// Share of articles with all critical fields, as a percentage.
    pub fn overall_success_rate(&self) -> f64 {
        if self.total_articles == 0 {
            return 0.0;
        }
        round2(self.successful_articles as f64 / self.total_articles as f64 * 100.0)
    }

    /// Fields whose success rate is strictly below `rate`.
    pub fn fields_below(&self, rate: f64) -> Vec<Field> {
        self.field_results
            .values()
            .filter(|r| r.success_rate < rate)
            .map(|r| r.field_name)
            .collect()
    }
}
