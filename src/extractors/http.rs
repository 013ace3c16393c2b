//! Default extractor: fetch the page over HTTP and run the document heuristics.

use super::Extract;
use super::custom::CustomExtractor;
use super::document::parse_document;
use crate::errors::ExtractError;
use crate::models::{ArticleResult, ExtractOptions};
use crate::utils::truncate_for_log;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Client settings for [`HttpExtractor`].
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Per-request timeout; a timed-out URL becomes a failed outcome.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Fetches pages with `reqwest` and extracts them with `scraper`.
#[derive(Debug)]
pub struct HttpExtractor {
    client: reqwest::Client,
    custom: Option<CustomExtractor>,
}

impl HttpExtractor {
    /// Build the client and load the custom extractor named in `options`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built or the custom extractor
    /// file cannot be loaded.
    pub fn new(settings: &HttpSettings, options: &ExtractOptions) -> Result<Self, ExtractError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.clone())
            .build()?;
        let custom = options
            .add_extractor
            .as_deref()
            .map(CustomExtractor::load)
            .transpose()?;
        Ok(Self { client, custom })
    }

    fn custom_for(&self, url: &Url) -> Option<&CustomExtractor> {
        let host = url.host_str()?;
        self.custom.as_ref().filter(|c| c.matches(host))
    }
}

fn header_map(headers: &BTreeMap<String, String>) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                map.insert(name, value);
            }
            _ => warn!(header = %name, "Skipping invalid header"),
        }
    }
    map
}

impl Extract for HttpExtractor {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn extract(
        &self,
        url: &str,
        options: &ExtractOptions,
    ) -> Result<ArticleResult, ExtractError> {
        let t0 = Instant::now();
        let parsed = Url::parse(url).map_err(|source| ExtractError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let response = self
            .client
            .get(parsed)
            .headers(header_map(&options.headers))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::Status {
                status: status.as_u16(),
            });
        }
        let final_url = response.url().clone();
        let body = response.text().await?;
        debug!(bytes = body.len(), preview = %truncate_for_log(&body, 120), "Fetched page");

        let result = parse_document(&body, &final_url, options, self.custom_for(&final_url))?;
        info!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            bytes = result.content.len(),
            title = ?result.title,
            author = ?result.field_str("author"),
            "Extracted article"
        );
        Ok(result)
    }
}
