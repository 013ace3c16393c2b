//! Error types for extraction and for the run as a whole.
//!
//! [`ExtractError`] describes why a single URL could not be turned into an
//! article. It never escapes the batch: the scheduler folds it into an
//! [`Outcome::Failure`](crate::models::Outcome::Failure).
//!
//! [`AppError`] covers everything that ends the run with a non-zero exit code:
//! bad invocation, unreadable configuration, and output I/O failures.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why extracting a single URL failed.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server responded with HTTP {status}")]
    Status { status: u16 },

    #[error("invalid selector `{selector}`: {message}")]
    Selector { selector: String, message: String },

    #[error("no readable content found")]
    NoContent,

    #[error("failed to load custom extractor {}: {message}", path.display())]
    CustomExtractor { path: PathBuf, message: String },
}

impl ExtractError {
    /// Whether another attempt at the same URL could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ExtractError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ExtractError::Status { status } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Errors that abort the run.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("no input: provide a URL or --url-file")]
    MissingInput,

    #[error("`{0}` is not an absolute URL")]
    InvalidUrl(String),

    #[error("expected NAME=VALUE, got `{0}`")]
    InvalidPair(String),

    #[error("concurrency must be at least 1")]
    InvalidConcurrency,

    #[error("invalid URL separator: {0}")]
    Separator(#[from] regex::Error),

    #[error("failed to load config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("failed to read URL file {}: {source}", path.display())]
    UrlFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("output directory {} is not writable: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write to stdout: {0}")]
    Stdout(#[source] io::Error),

    #[error(transparent)]
    Extractor(#[from] ExtractError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transience() {
        assert!(ExtractError::Status { status: 503 }.is_transient());
        assert!(ExtractError::Status { status: 429 }.is_transient());
        assert!(!ExtractError::Status { status: 404 }.is_transient());
        assert!(!ExtractError::NoContent.is_transient());
    }

    #[test]
    fn test_messages_are_readable() {
        let e = AppError::InvalidPair("nokey".to_string());
        assert_eq!(e.to_string(), "expected NAME=VALUE, got `nokey`");
        assert_eq!(
            ExtractError::Status { status: 404 }.to_string(),
            "server responded with HTTP 404"
        );
    }
}
