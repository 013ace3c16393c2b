//! Data models shared by the batch scheduler, aggregator and output planner.
//!
//! - [`ExtractOptions`]: the options bag handed to the extractor for every URL
//! - [`WorkItem`]: one URL plus its resolved options
//! - [`ArticleResult`]: an extracted document with well-known and free-form fields
//! - [`Outcome`]: success or failure for exactly one work item
//! - [`OutputTarget`] / [`OutputPlan`]: where aggregated content ends up

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Representation of the extracted content payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Html,
    #[default]
    Markdown,
    Text,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContentType::Html => "html",
            ContentType::Markdown => "markdown",
            ContentType::Text => "text",
        };
        f.write_str(name)
    }
}

/// Options passed to the extractor along with each URL.
///
/// `extend` and `extend_list` map a new field name to a CSS selector; the
/// extractor adds one field per entry to [`ArticleResult::fields`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractOptions {
    pub content_type: ContentType,
    pub headers: BTreeMap<String, String>,
    pub extend: BTreeMap<String, String>,
    pub extend_list: BTreeMap<String, String>,
    pub add_extractor: Option<PathBuf>,
}

/// A single unit of work: one URL and the options it is extracted with.
///
/// Options are shared across the batch, so they sit behind an [`Arc`].
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub url: String,
    pub options: Arc<ExtractOptions>,
}

/// An extracted article.
///
/// `title`, `url`, `content` and `excerpt` are always known to the tool.
/// Everything else the extractor contributes (author, domain, extension
/// fields...) lands in `fields`, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleResult {
    pub title: Option<String>,
    pub url: String,
    pub content: String,
    pub excerpt: Option<String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl ArticleResult {
    /// Look up an extractor-contributed field as a string, if it is one.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

/// What happened to one work item. Produced exactly once per item.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(ArticleResult),
    Failure { url: String, message: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

/// The `--output` flag, which may be absent, bare (auto-named files) or a path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputTarget {
    #[default]
    Absent,
    Auto,
    Path(PathBuf),
}

/// The decision of where aggregated content is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputPlan {
    Stdout,
    SingleFile(PathBuf),
    /// One path per successful result, in result order.
    SplitFiles(Vec<PathBuf>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_article_result_flattens_fields() {
        let mut fields = BTreeMap::new();
        fields.insert("author".to_string(), json!("Jane Doe"));
        fields.insert("word_count".to_string(), json!(120));
        let result = ArticleResult {
            title: Some("Title".to_string()),
            url: "https://example.com/a".to_string(),
            content: "Body".to_string(),
            excerpt: None,
            fields,
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["author"], "Jane Doe");
        assert_eq!(value["word_count"], 120);
        assert_eq!(value["title"], "Title");
        assert_eq!(result.field_str("author"), Some("Jane Doe"));
        assert_eq!(result.field_str("word_count"), None);
    }

    #[test]
    fn test_options_use_camel_case_keys() {
        let yaml = "contentType: text\nextendList:\n  links: a\n";
        let options: ExtractOptions = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(options.content_type, ContentType::Text);
        assert_eq!(options.extend_list.get("links").map(String::as_str), Some("a"));
        assert!(options.headers.is_empty());
    }

    #[test]
    fn test_content_type_display() {
        assert_eq!(ContentType::Markdown.to_string(), "markdown");
        assert_eq!(ContentType::default(), ContentType::Markdown);
    }
}
