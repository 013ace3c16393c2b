//! Filesystem-safe names for per-article output files.
//!
//! The name is a pure function of the result: the title when there is one,
//! otherwise a slug of the URL (host without its last label and without a
//! leading `www.`, followed by the path).

use crate::models::ArticleResult;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

const FALLBACK_STEM: &str = "untitled";

/// Derive the `.md` filename for a result.
///
/// # Examples
///
/// ```ignore
/// // title "Hello, World! 2024"
/// assert_eq!(derive_filename(&result), "hello-world-2024.md");
/// ```
pub fn derive_filename(result: &ArticleResult) -> String {
    let stem = result
        .title
        .as_deref()
        .map(slugify)
        .filter(|s| !s.is_empty())
        .or_else(|| Some(slugify(&url_stem(&result.url))).filter(|s| !s.is_empty()))
        .unwrap_or_else(|| FALLBACK_STEM.to_string());
    format!("{stem}.md")
}

/// Lower-case, collapse every run outside `[a-z0-9]` to one hyphen, trim hyphens.
pub fn slugify(input: &str) -> String {
    let lower = input.to_lowercase();
    NON_ALNUM
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

/// Host minus its final label and any leading `www.`, then the decoded path.
fn url_stem(raw: &str) -> String {
    let Ok(url) = Url::parse(raw) else {
        return raw.to_string();
    };
    let host = url.host_str().unwrap_or_default();
    // A dotless host is nothing but its final label
    let host = host.rsplit_once('.').map_or("", |(rest, _tld)| rest);
    let host = host.strip_prefix("www.").unwrap_or(host);
    let path = urlencoding::decode(url.path())
        .map(|p| p.into_owned())
        .unwrap_or_else(|_| url.path().to_string());
    format!("{host}{path}")
}
