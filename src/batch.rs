//! Bounded-concurrency batch scheduler.
//!
//! Turns a list of URLs into [`WorkItem`]s and runs the extractor over them
//! with at most `concurrency` extractions in flight. Completion order is
//! unconstrained, but the returned outcomes line up with the input: outcome
//! `i` always belongs to URL `i`.
//!
//! A failed extraction becomes an [`Outcome::Failure`] for that item only.
//! Siblings, whether in flight or still queued, are unaffected, and the batch
//! always runs to completion.

use crate::errors::AppError;
use crate::extractors::Extract;
use crate::models::{ExtractOptions, Outcome, WorkItem};
use crate::progress::Progress;
use futures::stream::{self, StreamExt};
use regex::Regex;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Separator used to split a URL list when none is configured.
pub const DEFAULT_SEPARATOR: &str = r"\n+";

const SCHEMES: &[&str] = &["http://", "https://"];

/// Settings for one batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum number of extractions in flight. Always at least 1.
    pub concurrency: usize,
    /// Splits URL-list text into individual records.
    pub separator: Regex,
    /// Options applied to every work item.
    pub options: Arc<ExtractOptions>,
}

impl BatchConfig {
    /// # Errors
    ///
    /// - [`AppError::InvalidConcurrency`] if `concurrency` is zero
    /// - [`AppError::Separator`] if `separator` is not a valid regex
    pub fn new(
        concurrency: usize,
        separator: &str,
        options: ExtractOptions,
    ) -> Result<Self, AppError> {
        if concurrency == 0 {
            return Err(AppError::InvalidConcurrency);
        }
        Ok(Self {
            concurrency,
            separator: Regex::new(separator)?,
            options: Arc::new(options),
        })
    }

    /// Wrap each URL in a [`WorkItem`] sharing this batch's options.
    pub fn work_items<I>(&self, urls: I) -> Vec<WorkItem>
    where
        I: IntoIterator<Item = String>,
    {
        urls.into_iter()
            .map(|url| WorkItem {
                url,
                options: Arc::clone(&self.options),
            })
            .collect()
    }
}

/// Split URL-list text into URLs.
///
/// Records are trimmed; blank records and records that do not start with a
/// recognised scheme (`http://`, `https://`) are discarded.
pub fn split_urls(input: &str, separator: &Regex) -> Vec<String> {
    separator
        .split(input)
        .map(str::trim)
        .filter(|record| {
            let lower = record.to_ascii_lowercase();
            SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
        })
        .map(str::to_string)
        .collect()
}

/// Run `extractor` over every item with at most `concurrency` in flight.
///
/// Items are started in input order and may finish in any order. A failed
/// extraction is logged and recorded; it never cancels its siblings.
///
/// # Arguments
///
/// * `extractor` - Any [`Extract`] implementation, usually [`Retry`](crate::extractors::Retry) around the HTTP extractor
/// * `items` - Work items, one per URL
/// * `concurrency` - Maximum extractions in flight; `0` is treated as `1`
/// * `progress` - Ticked once per completed item regardless of outcome
///
/// # Returns
///
/// Exactly one [`Outcome`] per item, in input order.
#[instrument(level = "info", skip_all, fields(items = items.len(), concurrency = concurrency))]
pub async fn run<E: Extract>(
    extractor: &E,
    items: Vec<WorkItem>,
    concurrency: usize,
    progress: &Progress,
) -> Vec<Outcome> {
    let concurrency = concurrency.max(1);
    let total = items.len();
    let mut slots: Vec<Option<Outcome>> = vec![None; total];

    let mut completions = stream::iter(items.into_iter().enumerate())
        .map(|(index, item)| async move {
            let outcome = match extractor.extract(&item.url, &item.options).await {
                Ok(result) => Outcome::Success(result),
                Err(e) => {
                    warn!(index, url = %item.url, error = %e, "Extraction failed");
                    Outcome::Failure {
                        url: item.url,
                        message: e.to_string(),
                    }
                }
            };
            (index, outcome)
        })
        .buffer_unordered(concurrency);

    while let Some((index, outcome)) = completions.next().await {
        slots[index] = Some(outcome);
        progress.tick();
    }
    progress.finish();

    let outcomes: Vec<Outcome> = slots.into_iter().flatten().collect();
    let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
    info!(
        total,
        completed = progress.completed(),
        succeeded,
        failed = total - succeeded,
        "Batch complete"
    );
    outcomes
}
