//! Optional YAML configuration file.
//!
//! Every key is optional; command-line flags override whatever the file sets.
//!
//! ```yaml
//! concurrency: 4
//! format: markdown
//! separator: "\\n+"
//! timeout_secs: 20
//! retries: 2
//! retry_base_delay_ms: 500
//! user_agent: "article_batch/0.1"
//! output_dir: ./articles
//! headers:
//!   Accept-Language: en-US
//! ```

use crate::batch::DEFAULT_SEPARATOR;
use crate::errors::AppError;
use crate::extractors::HttpSettings;
use crate::models::ContentType;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

/// Defaults for a run, read from `--config`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub concurrency: usize,
    pub format: ContentType,
    pub separator: String,
    pub headers: BTreeMap<String, String>,
    pub timeout_secs: u64,
    pub retries: usize,
    pub retry_base_delay_ms: u64,
    pub user_agent: Option<String>,
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            format: ContentType::Markdown,
            separator: DEFAULT_SEPARATOR.to_string(),
            headers: BTreeMap::new(),
            timeout_secs: 30,
            retries: 2,
            retry_base_delay_ms: 500,
            user_agent: None,
            output_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    /// Load the file at `path`, or return defaults when there is none.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if the file cannot be read or parsed.
    #[instrument(level = "info", skip_all)]
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let to_err = |message: String| AppError::Config {
            path: path.to_path_buf(),
            message,
        };
        let raw = std::fs::read_to_string(path).map_err(|e| to_err(e.to_string()))?;
        let config: AppConfig = serde_yaml::from_str(&raw).map_err(|e| to_err(e.to_string()))?;
        info!(path = %path.display(), concurrency = config.concurrency, "Loaded configuration");
        Ok(config)
    }

    pub fn http_settings(&self) -> HttpSettings {
        let defaults = HttpSettings::default();
        HttpSettings {
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
        }
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}
