//! Command-line interface definitions.
//!
//! Flags are parsed with `clap` and then resolved against the optional
//! [`AppConfig`] file into the pieces the batch needs: the URL list, a
//! [`BatchConfig`] and an [`OutputTarget`].

use crate::batch::{BatchConfig, split_urls};
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::{ContentType, ExtractOptions, OutputTarget};
use crate::utils::parse_pairs;
use clap::Parser;
use regex::Regex;
use std::path::PathBuf;
use tracing::{info, instrument, warn};
use url::Url;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Print one article as Markdown
/// article_batch https://example.com/story
///
/// # Extract a list of URLs, four at a time, one file per article
/// article_batch -u urls.txt -c 4 -o
///
/// # Add a custom field and write everything to one file
/// article_batch https://example.com/story -e byline=.byline -o story.md
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// URL of the article to extract
    pub url: Option<String>,

    /// File containing URLs to extract, one per line
    #[arg(short = 'u', long = "url-file", value_name = "PATH")]
    pub url_file: Option<PathBuf>,

    /// Content format
    #[arg(short, long, value_enum)]
    pub format: Option<ContentType>,

    /// Custom request header (repeatable)
    #[arg(short = 'H', long = "header", value_name = "NAME=VALUE")]
    pub headers: Vec<String>,

    /// Add a field filled from the first match of a CSS selector (repeatable)
    #[arg(short, long, value_name = "NAME=SELECTOR")]
    pub extend: Vec<String>,

    /// Add a field filled from every match of a CSS selector (repeatable)
    #[arg(short = 'E', long = "extend-list", value_name = "NAME=SELECTOR")]
    pub extend_list: Vec<String>,

    /// YAML file defining a site-specific extractor
    #[arg(short, long, value_name = "PATH")]
    pub add_extractor: Option<PathBuf>,

    /// Write to PATH, or pass without a value to name files after each article.
    /// Place it after the URL when used without a value.
    #[arg(short, long, num_args = 0..=1, value_name = "PATH")]
    pub output: Option<Option<String>>,

    /// Directory for files named after their article
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Maximum number of URLs extracted at the same time
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub concurrency: Option<u32>,

    /// Regex separating URLs in the URL file
    #[arg(long, value_name = "REGEX")]
    pub separator: Option<String>,

    /// Optional path to a YAML config file
    #[arg(long, env = "ARTICLE_BATCH_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Interpret `--output`: absent or `false` prints, a bare flag or `true`
    /// names files automatically, anything else is a path.
    pub fn output_target(&self) -> OutputTarget {
        match self.output.as_ref() {
            None => OutputTarget::Absent,
            Some(None) => OutputTarget::Auto,
            Some(Some(value)) => match value.as_str() {
                "false" => OutputTarget::Absent,
                "true" => OutputTarget::Auto,
                path => OutputTarget::Path(PathBuf::from(path)),
            },
        }
    }

    /// Build the options bag shared by every URL in the batch.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidPair`] for a malformed `NAME=VALUE` flag.
    pub fn extract_options(&self, config: &AppConfig) -> Result<ExtractOptions, AppError> {
        let mut headers = config.headers.clone();
        headers.extend(parse_pairs(&self.headers)?);
        Ok(ExtractOptions {
            content_type: self.format.unwrap_or(config.format),
            headers,
            extend: parse_pairs(&self.extend)?,
            extend_list: parse_pairs(&self.extend_list)?,
            add_extractor: self.add_extractor.clone(),
        })
    }

    /// Resolve concurrency, separator and options against the config file.
    pub fn batch_config(&self, config: &AppConfig) -> Result<BatchConfig, AppError> {
        let concurrency = self
            .concurrency
            .map(|c| c as usize)
            .unwrap_or(config.concurrency);
        let separator = self.separator.as_deref().unwrap_or(&config.separator);
        BatchConfig::new(concurrency, separator, self.extract_options(config)?)
    }

    pub fn output_dir(&self, config: &AppConfig) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| config.output_dir.clone())
    }

    /// Gather the URLs to extract: the positional URL first, then the URL file.
    ///
    /// # Errors
    ///
    /// - [`AppError::MissingInput`] if neither a URL nor a URL file is given
    /// - [`AppError::InvalidUrl`] if the positional URL is not absolute
    /// - [`AppError::UrlFile`] if the URL file cannot be read
    #[instrument(level = "info", skip_all)]
    pub async fn collect_urls(&self, separator: &Regex) -> Result<Vec<String>, AppError> {
        if self.url.is_none() && self.url_file.is_none() {
            return Err(AppError::MissingInput);
        }

        let mut urls = Vec::new();
        if let Some(url) = &self.url {
            if Url::parse(url).is_err() {
                return Err(AppError::InvalidUrl(url.clone()));
            }
            urls.push(url.clone());
        }
        if let Some(path) = &self.url_file {
            let raw = tokio::fs::read_to_string(path)
                .await
                .map_err(|source| AppError::UrlFile {
                    path: path.clone(),
                    source,
                })?;
            let from_file = split_urls(&raw, separator);
            if from_file.is_empty() {
                warn!(path = %path.display(), "URL file contains no usable URLs");
            }
            info!(path = %path.display(), count = from_file.len(), "Read URL file");
            urls.extend(from_file);
        }
        Ok(urls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::DEFAULT_SEPARATOR;
    use std::io::Write;

    fn parse(args: &[&str]) -> Cli {
        let mut full = vec!["article_batch"];
        full.extend_from_slice(args);
        Cli::parse_from(full)
    }

    #[test]
    fn test_cli_parsing() {
        let cli = parse(&[
            "https://example.com/a",
            "-f",
            "text",
            "-H",
            "Cookie=a=b",
            "-e",
            "byline=.byline",
            "-E",
            "tags=.tag",
            "-a",
            "site.yaml",
            "-c",
            "4",
        ]);

        assert_eq!(cli.url.as_deref(), Some("https://example.com/a"));
        assert_eq!(cli.format, Some(ContentType::Text));
        assert_eq!(cli.headers, vec!["Cookie=a=b"]);
        assert_eq!(cli.extend, vec!["byline=.byline"]);
        assert_eq!(cli.extend_list, vec!["tags=.tag"]);
        assert_eq!(cli.add_extractor, Some(PathBuf::from("site.yaml")));
        assert_eq!(cli.concurrency, Some(4));
        assert_eq!(cli.output_target(), OutputTarget::Absent);
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        assert!(Cli::try_parse_from(["article_batch", "https://x.example", "-c", "0"]).is_err());
        assert!(Cli::try_parse_from(["article_batch", "https://x.example", "-c", "many"]).is_err());
    }

    #[test]
    fn test_output_tri_state() {
        assert_eq!(parse(&["https://x.example", "-o"]).output_target(), OutputTarget::Auto);
        assert_eq!(
            parse(&["https://x.example", "-o", "true"]).output_target(),
            OutputTarget::Auto
        );
        assert_eq!(
            parse(&["https://x.example", "--output", "false"]).output_target(),
            OutputTarget::Absent
        );
        assert_eq!(
            parse(&["https://x.example", "-o", "out.md"]).output_target(),
            OutputTarget::Path(PathBuf::from("out.md"))
        );
    }

    #[test]
    fn test_options_merge_config_headers() {
        let mut config = AppConfig::default();
        config
            .headers
            .insert("Accept-Language".to_string(), "en".to_string());
        config
            .headers
            .insert("X-Token".to_string(), "from-config".to_string());
        let cli = parse(&["https://x.example", "-H", "X-Token=from-cli"]);

        let options = cli.extract_options(&config).unwrap();
        assert_eq!(options.content_type, ContentType::Markdown);
        assert_eq!(options.headers["Accept-Language"], "en");
        assert_eq!(options.headers["X-Token"], "from-cli");
    }

    #[test]
    fn test_malformed_pair_is_an_error() {
        let cli = parse(&["https://x.example", "-e", "no-equals"]);
        assert!(matches!(
            cli.extract_options(&AppConfig::default()),
            Err(AppError::InvalidPair(_))
        ));
    }

    #[test]
    fn test_batch_config_prefers_cli_values() {
        let config = AppConfig {
            concurrency: 3,
            ..Default::default()
        };
        assert_eq!(parse(&["https://x.example"]).batch_config(&config).unwrap().concurrency, 3);
        assert_eq!(
            parse(&["https://x.example", "-c", "7"])
                .batch_config(&config)
                .unwrap()
                .concurrency,
            7
        );
    }

    #[tokio::test]
    async fn test_missing_input_is_an_error() {
        let separator = Regex::new(DEFAULT_SEPARATOR).unwrap();
        let err = parse(&[]).collect_urls(&separator).await.unwrap_err();
        assert!(matches!(err, AppError::MissingInput));
    }

    #[tokio::test]
    async fn test_relative_url_is_an_error() {
        let separator = Regex::new(DEFAULT_SEPARATOR).unwrap();
        let err = parse(&["example.com/story"])
            .collect_urls(&separator)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_url_file_yields_one_url_per_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "https://a.example/1\nhttps://a.example/2\n\nhttp://a.example/3\n\nhttps://a.example/4\nhttps://a.example/5\n"
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let cli = parse(&["-u", &path]);
        let separator = Regex::new(DEFAULT_SEPARATOR).unwrap();

        let urls = cli.collect_urls(&separator).await.unwrap();
        assert_eq!(urls.len(), 5);

        let batch = cli.batch_config(&AppConfig::default()).unwrap();
        assert_eq!(batch.work_items(urls).len(), 5);
    }

    #[tokio::test]
    async fn test_positional_url_comes_first() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "https://b.example").unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let cli = parse(&["https://a.example", "-u", &path]);
        let separator = Regex::new(DEFAULT_SEPARATOR).unwrap();

        let urls = cli.collect_urls(&separator).await.unwrap();
        assert_eq!(urls, vec!["https://a.example", "https://b.example"]);
    }

    #[tokio::test]
    async fn test_unreadable_url_file_is_an_error() {
        let separator = Regex::new(DEFAULT_SEPARATOR).unwrap();
        let err = parse(&["-u", "/definitely/not/here.txt"])
            .collect_urls(&separator)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UrlFile { .. }));
    }
}
