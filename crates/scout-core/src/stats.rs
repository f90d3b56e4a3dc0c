//! Tallying per-field and per-article validation outcomes.

use std::collections::BTreeMap;

use crate::models::{
    CRITICAL_FIELDS, Field, FieldValidationResult, ValidationResult, round2, truncate_sample,
};

/// Sample values kept per field.
pub const MAX_SAMPLE_VALUES: usize = 3;

/// Extracted value per configured field for one page; `None` is a miss.
pub type FieldValues = BTreeMap<Field, Option<String>>;

/// Accumulates validation outcomes page by page.
///
/// Owned by a single task; concurrent fetchers hand their outcomes to it in
/// order rather than sharing it.
#[derive(Debug)]
pub struct ValidationAggregator {
    fields: Vec<Field>,
    results: BTreeMap<Field, FieldValidationResult>,
    total_articles: usize,
    successful_articles: usize,
}

impl ValidationAggregator {
    /// Track the given configured fields.
    pub fn new(fields: &[Field]) -> Self {
        let results = fields
            .iter()
            .map(|f| (*f, FieldValidationResult::new(*f)))
            .collect();
        Self {
            fields: fields.to_vec(),
            results,
            total_articles: 0,
            successful_articles: 0,
        }
    }

    /// A page that could not be fetched fails every configured field.
    pub fn record_fetch_failure(&mut self, url: &str) {
        self.total_articles += 1;
        for result in self.results.values_mut() {
            result.total_count += 1;
            result.failed_urls.push(url.to_string());
        }
    }

    /// Record the extraction outcome of one fetched page.
    ///
    /// Configured fields missing from `values` count as misses.
    pub fn record_page(&mut self, url: &str, values: &FieldValues) {
        self.total_articles += 1;

        for field in &self.fields {
            let Some(result) = self.results.get_mut(field) else {
                continue;
            };
            result.total_count += 1;
            match values.get(field).and_then(Option::as_deref) {
                Some(value) => {
                    result.success_count += 1;
                    if result.sample_values.len() < MAX_SAMPLE_VALUES {
                        result.sample_values.push(truncate_sample(value));
                    }
                }
                None => result.failed_urls.push(url.to_string()),
            }
        }

        let critical_ok = CRITICAL_FIELDS
            .iter()
            .all(|f| matches!(values.get(f), Some(Some(_))));
        if critical_ok {
            self.successful_articles += 1;
        }
    }

    pub fn total_articles(&self) -> usize {
        self.total_articles
    }

    /// Compute success rates and produce the final report.
    pub fn finish(mut self, cancelled: bool) -> ValidationResult {
        for result in self.results.values_mut() {
            result.success_rate = if result.total_count == 0 {
                0.0
            } else {
                round2(result.success_count as f64 / result.total_count as f64 * 100.0)
            };
        }
        ValidationResult {
            field_results: self.results,
            total_articles: self.total_articles,
            successful_articles: self.successful_articles,
            cancelled,
        }
    }
}
