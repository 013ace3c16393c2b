//! Site-specific extractors registered at runtime.
//!
//! A custom extractor is a YAML file naming a domain and the CSS selectors
//! that locate each field on that site's pages:
//!
//! ```yaml
//! domain: example.com
//! title: ["h1.headline"]
//! author: [".byline a"]
//! content: ["div.story-body"]
//! clean: [".related-links", ".ad"]
//! ```
//!
//! Each field lists selectors in priority order; the first one that matches
//! wins. Fields left out fall back to the generic heuristics.

use crate::errors::ExtractError;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, instrument};

/// Selectors for one site, loaded with `--add-extractor`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CustomExtractor {
    pub domain: String,
    pub title: Vec<String>,
    pub author: Vec<String>,
    pub content: Vec<String>,
    pub excerpt: Vec<String>,
    pub date_published: Vec<String>,
    pub lead_image_url: Vec<String>,
    /// Elements removed from the content before conversion.
    pub clean: Vec<String>,
}

impl CustomExtractor {
    /// Read and validate an extractor definition.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::CustomExtractor`] if the file cannot be read,
    /// is not valid YAML, or has no `domain`.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ExtractError> {
        let to_err = |message: String| ExtractError::CustomExtractor {
            path: path.to_path_buf(),
            message,
        };
        let raw = std::fs::read_to_string(path).map_err(|e| to_err(e.to_string()))?;
        let extractor = Self::from_yaml(&raw).map_err(to_err)?;
        info!(domain = %extractor.domain, "Loaded custom extractor");
        Ok(extractor)
    }

    /// Parse an extractor definition from YAML text.
    pub fn from_yaml(raw: &str) -> Result<Self, String> {
        let mut extractor: CustomExtractor =
            serde_yaml::from_str(raw).map_err(|e| e.to_string())?;
        extractor.domain = extractor
            .domain
            .trim()
            .to_ascii_lowercase()
            .trim_start_matches("www.")
            .to_string();
        if extractor.domain.is_empty() {
            return Err("missing `domain`".to_string());
        }
        Ok(extractor)
    }

    /// Whether this extractor applies to pages served from `host`.
    ///
    /// Matches the domain itself and any of its subdomains.
    pub fn matches(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        host == self.domain
            || host
                .strip_suffix(&self.domain)
                .is_some_and(|prefix| prefix.ends_with('.'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_yaml_normalises_domain() {
        let extractor =
            CustomExtractor::from_yaml("domain: WWW.Example.com\ntitle: [h1.big]\n").unwrap();
        assert_eq!(extractor.domain, "example.com");
        assert_eq!(extractor.title, vec!["h1.big".to_string()]);
        assert!(extractor.content.is_empty());
    }

    #[test]
    fn test_missing_domain_is_rejected() {
        assert!(CustomExtractor::from_yaml("title: [h1]\n").is_err());
    }

    #[test]
    fn test_matches_domain_and_subdomains() {
        let extractor = CustomExtractor::from_yaml("domain: example.com").unwrap();
        assert!(extractor.matches("example.com"));
        assert!(extractor.matches("news.example.com"));
        assert!(!extractor.matches("badexample.com"));
        assert!(!extractor.matches("example.org"));
    }

    #[test]
    fn test_load_reports_path_on_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "domain: [not, a, string]").unwrap();
        let err = CustomExtractor::load(file.path()).unwrap_err();
        assert!(matches!(err, ExtractError::CustomExtractor { .. }));
        assert!(err.to_string().contains("failed to load custom extractor"));
    }
}
