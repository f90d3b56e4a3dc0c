//! Test utilities: mock implementations of core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! Mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::traits::Fetcher;

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// What the mock returns for one URL.
#[derive(Debug, Clone)]
pub enum MockPage {
    Html(String),
    /// Non-success HTTP status.
    Status(u16),
    /// Never completes; exercises timeouts and cancellation.
    Hang,
}

/// Mock fetcher serving canned pages keyed by URL.
///
/// Unknown URLs fail with a network error.
#[derive(Clone, Default)]
pub struct MockFetcher {
    pages: Arc<Mutex<HashMap<String, MockPage>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, html: &str) -> Self {
        self.insert(url, MockPage::Html(html.to_string()))
    }

    pub fn with_status(self, url: &str, status: u16) -> Self {
        self.insert(url, MockPage::Status(status))
    }

    pub fn with_hang(self, url: &str) -> Self {
        self.insert(url, MockPage::Hang)
    }

    fn insert(self, url: &str, page: MockPage) -> Self {
        self.pages.lock().unwrap().insert(url.to_string(), page);
        self
    }

    /// URLs fetched so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.calls.lock().unwrap().push(url.to_string());
        let page = self.pages.lock().unwrap().get(url).cloned();
        match page {
            Some(MockPage::Html(html)) => Ok(html),
            Some(MockPage::Status(status)) => {
                Err(AppError::HttpError(format!("HTTP {status} for {url}")))
            }
            Some(MockPage::Hang) => std::future::pending::<Result<String, AppError>>().await,
            None => Err(AppError::NetworkError(format!("No route to {url}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A minimal article page with the given title and body text.
pub fn article_html(title: &str, body: &str) -> String {
    format!(
        r#"<html><head><title>{title}</title></head><body>
            <article><h1>{title}</h1><div class="article-body"><p>{body}</p></div></article>
        </body></html>"#
    )
}
