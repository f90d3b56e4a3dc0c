use std::time::Duration;

use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::document::Document;
use crate::error::AppError;
use crate::extract::extract_chain;
use crate::models::{ArticleSelectors, Field, ValidationResult};
use crate::stats::{FieldValues, ValidationAggregator};
use crate::traits::Fetcher;

/// Tuning for validation runs.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Pages fetched at the same time, independent of batch size.
    pub concurrency: usize,

    /// Upper bound for a single page fetch; a timeout counts as a fetch failure.
    pub fetch_timeout: Duration,

    /// Batch cap used when the caller passes `max_samples == 0`.
    pub default_max_samples: usize,
}

impl ValidationConfig {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_default_max_samples(mut self, max_samples: usize) -> Self {
        self.default_max_samples = max_samples.max(1);
        self
    }

    fn batch_limit(&self, max_samples: usize) -> usize {
        if max_samples == 0 {
            self.default_max_samples
        } else {
            max_samples
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            fetch_timeout: Duration::from_secs(30),
            default_max_samples: 10,
        }
    }
}

/// Progress events emitted during a validation run.
#[derive(Debug)]
pub enum ValidationEvent<'a> {
    Started {
        urls: usize,
        fields: &'a [Field],
    },
    PageFetched {
        url: &'a str,
    },
    PageFailed {
        url: &'a str,
        error: &'a AppError,
    },
    FieldMissed {
        url: &'a str,
        field: Field,
    },
    Cancelled {
        processed: usize,
        remaining: usize,
    },
    Finished {
        result: &'a ValidationResult,
    },
}

/// Receives validation events (decoupled logging).
pub trait ValidationReporter: Send + Sync {
    fn report(&self, event: ValidationEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl ValidationReporter for NullReporter {}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingValidationReporter;

impl ValidationReporter for TracingValidationReporter {
    fn report(&self, event: ValidationEvent<'_>) {
        match event {
            ValidationEvent::Started { urls, fields } => {
                tracing::info!(%urls, ?fields, "Validation started");
            }
            ValidationEvent::PageFetched { url } => {
                tracing::debug!(%url, "Page fetched");
            }
            ValidationEvent::PageFailed { url, error } => {
                tracing::warn!(%url, %error, retryable = error.is_retryable(), "Page fetch failed");
            }
            ValidationEvent::FieldMissed { url, field } => {
                tracing::debug!(%url, %field, "Selector found nothing");
            }
            ValidationEvent::Cancelled {
                processed,
                remaining,
            } => {
                tracing::warn!(%processed, %remaining, "Validation cancelled");
            }
            ValidationEvent::Finished { result } => {
                tracing::info!(
                    total = result.total_articles,
                    successful = result.successful_articles,
                    rate = result.overall_success_rate(),
                    "Validation finished"
                );
            }
        }
    }
}

/// Checks a selector set against real article pages.
///
/// Generic over the fetcher so tests can run without network access.
pub struct SelectorValidator<F: Fetcher> {
    fetcher: F,
    config: ValidationConfig,
}

impl<F: Fetcher> SelectorValidator<F> {
    pub fn new(fetcher: F) -> Self {
        Self::with_config(fetcher, ValidationConfig::default())
    }

    pub fn with_config(fetcher: F, config: ValidationConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate `selectors` against up to `max_samples` of `urls`.
    ///
    /// At most `concurrency` pages are in flight at once. Outcomes are tallied
    /// in input order once the run ends, so the report is identical for any
    /// concurrency setting. Fetch failures are recorded per page and never
    /// abort the run. Cancelling `cancel` stops new fetches; pages that already
    /// finished are still counted and the partial report is returned.
    pub async fn validate<R: ValidationReporter>(
        &self,
        selectors: &ArticleSelectors,
        urls: &[String],
        max_samples: usize,
        cancel: &CancellationToken,
        reporter: &R,
    ) -> Result<ValidationResult, AppError> {
        let limit = self.config.batch_limit(max_samples);
        let batch: Vec<&str> = urls.iter().take(limit).map(String::as_str).collect();
        if batch.is_empty() {
            return Err(AppError::EmptyUrlBatch);
        }
        let fields = selectors.configured_fields();
        if fields.is_empty() {
            return Err(AppError::NoSelectorsConfigured);
        }

        let total = batch.len();
        reporter.report(ValidationEvent::Started {
            urls: total,
            fields: &fields,
        });

        let concurrency = self.config.concurrency.max(1);
        let mut queued = batch.iter().copied().enumerate();
        let mut in_flight = FuturesUnordered::new();
        let mut outcomes: Vec<Option<PageOutcome>> = (0..total).map(|_| None).collect();

        let mut cancelled = false;
        loop {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            while in_flight.len() < concurrency {
                let Some((index, url)) = queued.next() else {
                    break;
                };
                in_flight.push(self.check_page(index, url, selectors));
            }

            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                next = in_flight.next() => {
                    let Some((index, outcome)) = next else {
                        break;
                    };
                    report_outcome(reporter, batch[index], &outcome);
                    outcomes[index] = Some(outcome);
                }
            }
        }

        if cancelled {
            // Keep pages that completed before the cancellation was observed.
            while let Some(Some((index, outcome))) = in_flight.next().now_or_never() {
                report_outcome(reporter, batch[index], &outcome);
                outcomes[index] = Some(outcome);
            }
        }
        drop(in_flight);

        let mut aggregator = ValidationAggregator::new(&fields);
        for (url, outcome) in batch.iter().zip(&outcomes) {
            match outcome {
                Some(Ok(values)) => aggregator.record_page(url, values),
                Some(Err(_)) => aggregator.record_fetch_failure(url),
                None => {}
            }
        }

        if cancelled {
            let processed = aggregator.total_articles();
            reporter.report(ValidationEvent::Cancelled {
                processed,
                remaining: total - processed,
            });
        }

        let result = aggregator.finish(cancelled);
        reporter.report(ValidationEvent::Finished { result: &result });
        Ok(result)
    }

    async fn check_page(
        &self,
        index: usize,
        url: &str,
        selectors: &ArticleSelectors,
    ) -> (usize, PageOutcome) {
        let limit = self.config.fetch_timeout;
        let fetched = tokio::time::timeout(limit, self.fetcher.fetch(url))
            .await
            .unwrap_or_else(|_| Err(AppError::timeout(limit)));
        (index, fetched.map(|html| extract_fields(&html, selectors)))
    }
}

/// Extracted values for a fetched page, or why it could not be fetched.
type PageOutcome = Result<FieldValues, AppError>;

fn report_outcome<R: ValidationReporter>(reporter: &R, url: &str, outcome: &PageOutcome) {
    match outcome {
        Ok(values) => {
            reporter.report(ValidationEvent::PageFetched { url });
            for (field, value) in values {
                if value.is_none() {
                    reporter.report(ValidationEvent::FieldMissed { url, field: *field });
                }
            }
        }
        Err(error) => reporter.report(ValidationEvent::PageFailed { url, error }),
    }
}

/// Run every configured fallback chain against one page.
pub fn extract_fields(html: &str, selectors: &ArticleSelectors) -> FieldValues {
    let doc = Document::parse(html);
    selectors
        .configured_fields()
        .into_iter()
        .map(|field| (field, extract_chain(&doc, selectors.get(field))))
        .collect()
}
