pub mod detect;
pub mod discovery;
pub mod document;
pub mod error;
pub mod extract;
pub mod links;
pub mod merge;
pub mod models;
pub mod stats;
pub mod traits;
pub mod validation;

#[cfg(test)]
pub(crate) mod testutil;

pub use discovery::DiscoveryEngine;
pub use document::Document;
pub use error::AppError;
pub use merge::merge;
pub use models::{
    ArticleSelectors, DiscoveryResult, Field, FieldValidationResult, SelectorCandidate,
    ValidationResult,
};
pub use traits::Fetcher;
pub use validation::{
    SelectorValidator, TracingValidationReporter, ValidationConfig, ValidationReporter,
};
