use std::future::Future;

use crate::error::AppError;

/// Fetches raw HTML content from a URL.
///
/// Discovery never fetches on its own; validation resolves each sample URL
/// through an implementation of this trait.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}
