//! Folding batch outcomes into printable content.
//!
//! A batch with a single successful outcome yields that article's content
//! untouched. Anything else yields a combined Markdown document: one entry
//! per outcome in input order, joined by [`DIVIDER`]. Successes render as a
//! block (heading, URL, compact metadata, content); failures render as a
//! one-line diagnostic so nothing requested goes missing silently.

use crate::models::{ArticleResult, Outcome};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Write;
use tracing::debug;

/// Separates entries in a combined document. Stable so that downstream
/// tooling can split on it.
pub const DIVIDER: &str = "\n\n<!-- ---------------------------------------------------------------- -->\n\n---\n\n";

/// Metadata keys that are either the payload itself or repeated elsewhere.
const OMITTED_KEYS: &[&str] = &["content", "excerpt", "url", "domain", "direction"];

/// Aggregated output of one batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    /// Text for stdout or a single output file.
    pub content: String,
    /// Successful results in input order.
    pub results: Vec<ArticleResult>,
    /// `(url, message)` for every failed item, in input order.
    pub failures: Vec<(String, String)>,
}

/// Partition outcomes and build the printable content.
///
/// # Arguments
///
/// * `outcomes` - One outcome per work item, in input order
///
/// # Returns
///
/// An [`Aggregate`] whose `content` is the lone article's content when the
/// batch is a single success, and the [`DIVIDER`]-joined document otherwise.
/// Successes and failures are also kept separately, both in input order.
pub fn aggregate(outcomes: Vec<Outcome>) -> Aggregate {
    let single = outcomes.len() == 1;
    let mut entries = Vec::with_capacity(outcomes.len());
    let mut results = Vec::new();
    let mut failures = Vec::new();

    for outcome in outcomes {
        match outcome {
            Outcome::Success(result) => {
                entries.push(render_block(&result));
                results.push(result);
            }
            Outcome::Failure { url, message } => {
                entries.push(diagnostic(&url, &message));
                failures.push((url, message));
            }
        }
    }

    let content = match (single, results.as_slice()) {
        (true, [only]) => only.content.clone(),
        _ => entries.join(DIVIDER),
    };
    debug!(
        results = results.len(),
        failures = failures.len(),
        bytes = content.len(),
        "Aggregated outcomes"
    );

    Aggregate {
        content,
        results,
        failures,
    }
}

/// The inline line shown in place of a failed URL.
pub fn diagnostic(url: &str, message: &str) -> String {
    format!("Error processing {url}: {message}")
}

/// Render one result as a Markdown block: title, URL, metadata, content.
pub fn render_block(result: &ArticleResult) -> String {
    let mut block = String::new();
    let title = result.title.as_deref().unwrap_or("Untitled");
    let _ = writeln!(block, "# {title}\n");
    let _ = writeln!(block, "**URL:** {}\n", result.url);

    let metadata = render_metadata(result);
    if !metadata.is_empty() {
        let _ = writeln!(block, "```yaml\n{}```\n", metadata);
    }

    block.push_str(result.content.trim_end());
    block
}

/// YAML for a result's non-payload fields.
///
/// Omits the keys in [`OMITTED_KEYS`] and any falsy value (null, false, 0,
/// empty string, empty list or map). Returns an empty string when nothing is
/// left.
pub fn render_metadata(result: &ArticleResult) -> String {
    let value = match serde_json::to_value(result) {
        Ok(Value::Object(map)) => map,
        _ => return String::new(),
    };
    let compact: BTreeMap<String, Value> = value
        .into_iter()
        .filter(|(key, value)| !OMITTED_KEYS.contains(&key.as_str()) && is_truthy(value))
        .collect();
    if compact.is_empty() {
        return String::new();
    }
    serde_yaml::to_string(&compact).unwrap_or_default()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
