//! Article extraction.
//!
//! The batch scheduler only knows the [`Extract`] trait: give it a URL and an
//! options bag, get back an [`ArticleResult`] or an [`ExtractError`].
//!
//! # Implementations
//!
//! | Type | Module | Notes |
//! |------|--------|-------|
//! | [`HttpExtractor`] | [`http`] | Fetches with `reqwest`, parses with `scraper` |
//! | [`Retry`] | [`retry`] | Decorator adding exponential backoff on transient errors |
//!
//! Site-specific selectors can be registered at runtime with a YAML file, see
//! [`custom`]. The HTML heuristics live in [`document`].

pub mod custom;
pub mod document;
pub mod http;
pub mod retry;

use crate::errors::ExtractError;
use crate::models::{ArticleResult, ExtractOptions};

pub use http::{HttpExtractor, HttpSettings};
pub use retry::Retry;

/// Turns a URL into an article.
///
/// Implementors must not panic on bad input; every failure is an
/// [`ExtractError`] so the batch can record it and move on.
pub trait Extract {
    async fn extract(
        &self,
        url: &str,
        options: &ExtractOptions,
    ) -> Result<ArticleResult, ExtractError>;
}
