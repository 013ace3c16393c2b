//! Generic article heuristics over a parsed HTML page.
//!
//! Metadata is read from the full document first (Open Graph and standard
//! meta tags, `<title>`, `<h1>`). Then page chrome such as scripts,
//! navigation and footers is stripped and the content root is picked from
//! `<article>`, `<main>`, `[role=main]` or `<body>`, in that order. A
//! [`CustomExtractor`] for the page's domain takes priority at each step.

use super::custom::CustomExtractor;
use crate::errors::ExtractError;
use crate::models::{ArticleResult, ContentType, ExtractOptions};
use chrono::{DateTime, NaiveDate, Utc};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use url::Url;

const EXCERPT_CHARS: usize = 200;

const NOISE: &str = "script, style, noscript, template, nav, header, footer, aside, form, iframe, svg";

const CONTENT_ROOTS: &[&str] = &["article", "main", "[role=main]", "body"];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "blockquote", "dd", "div", "dl", "dt", "figcaption", "figure", "h1",
    "h2", "h3", "h4", "h5", "h6", "hr", "li", "main", "ol", "p", "pre", "section", "table", "td",
    "th", "tr", "ul",
];

static INLINE_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\u{a0}]+").unwrap());
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\n\s*(\n\s*)+").unwrap());
static SINGLE_NEWLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r" ?\n ?").unwrap());

static HTML_ROOT: Lazy<Selector> = Lazy::new(|| static_selector("html"));

/// Build an [`ArticleResult`] from raw HTML served at `url`.
///
/// # Errors
///
/// - [`ExtractError::Selector`] if an `extend`, `extend_list` or custom
///   extractor selector does not parse
/// - [`ExtractError::NoContent`] if no readable content is left
pub fn parse_document(
    html: &str,
    url: &Url,
    options: &ExtractOptions,
    custom: Option<&CustomExtractor>,
) -> Result<ArticleResult, ExtractError> {
    let mut doc = Html::parse_document(html);
    let custom = custom.cloned().unwrap_or_default();

    let title = first_value(&doc, &custom.title)?.or_else(|| {
        first_of(
            &doc,
            &[r#"meta[property="og:title"]"#, "title", "h1"],
        )
    });
    let custom_excerpt = first_value(&doc, &custom.excerpt)?.or_else(|| {
        first_of(
            &doc,
            &[r#"meta[name="description"]"#, r#"meta[property="og:description"]"#],
        )
    });
    let author = first_value(&doc, &custom.author)?
        .or_else(|| first_of(&doc, &[r#"meta[name="author"]"#, r#"[rel="author"]"#]));
    let date_published = first_value(&doc, &custom.date_published)?
        .or_else(|| {
            first_of(
                &doc,
                &[r#"meta[property="article:published_time"]"#, "time[datetime]"],
            )
        })
        .map(|raw| normalize_date(&raw));
    let lead_image_url = first_value(&doc, &custom.lead_image_url)?
        .or_else(|| first_of(&doc, &[r#"meta[property="og:image"]"#]))
        .map(|src| url.join(&src).map(String::from).unwrap_or(src));
    let direction = doc
        .select(&HTML_ROOT)
        .next()
        .and_then(|el| el.value().attr("dir"))
        .map(str::to_string)
        .unwrap_or_else(|| "ltr".to_string());

    let mut fields = BTreeMap::new();
    for (name, selector) in &options.extend {
        let sel = compile(selector)?;
        let value = doc
            .select(&sel)
            .next()
            .map(element_value)
            .filter(|v| !v.is_empty())
            .map_or(Value::Null, Value::String);
        fields.insert(name.clone(), value);
    }
    for (name, selector) in &options.extend_list {
        let sel = compile(selector)?;
        let values = doc
            .select(&sel)
            .map(element_value)
            .filter(|v| !v.is_empty())
            .map(Value::String)
            .collect::<Vec<_>>();
        fields.insert(name.clone(), Value::Array(values));
    }

    strip(&mut doc, NOISE)?;
    for selector in &custom.clean {
        strip(&mut doc, selector)?;
    }

    let root = content_root(&doc, &custom.content)?.ok_or(ExtractError::NoContent)?;
    let mut raw_text = String::new();
    block_text(root, &mut raw_text);
    let text = normalize_text(&raw_text);
    let content = match options.content_type {
        ContentType::Html => root.inner_html().trim().to_string(),
        ContentType::Markdown => html2md::parse_html(&root.inner_html()).trim().to_string(),
        ContentType::Text => text.clone(),
    };
    if content.is_empty() || text.is_empty() {
        return Err(ExtractError::NoContent);
    }

    let excerpt = custom_excerpt.or_else(|| {
        let first_chars: String = text.chars().take(EXCERPT_CHARS).collect();
        Some(collapse_whitespace(&first_chars))
    });

    fields.insert("domain".to_string(), json!(url.host_str().unwrap_or_default()));
    fields.insert("direction".to_string(), json!(direction));
    fields.insert("word_count".to_string(), json!(text.split_whitespace().count()));
    if let Some(author) = author {
        fields.insert("author".to_string(), json!(author));
    }
    if let Some(date) = date_published {
        fields.insert("date_published".to_string(), json!(date));
    }
    if let Some(image) = lead_image_url {
        fields.insert("lead_image_url".to_string(), json!(image));
    }

    Ok(ArticleResult {
        title,
        url: url.to_string(),
        content,
        excerpt,
        fields,
    })
}

fn static_selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

fn compile(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

/// The value an element contributes to a field: `content` for `<meta>`,
/// `src` for `<img>`, `datetime` for `<time>`, otherwise its text.
fn element_value(el: ElementRef<'_>) -> String {
    let attr = match el.value().name() {
        "meta" => el.value().attr("content"),
        "img" => el.value().attr("src"),
        "time" => el.value().attr("datetime"),
        _ => None,
    };
    match attr {
        Some(value) => value.trim().to_string(),
        None => collapse_whitespace(&el.text().collect::<String>()),
    }
}

/// First non-empty value among user-supplied selectors.
fn first_value(doc: &Html, selectors: &[String]) -> Result<Option<String>, ExtractError> {
    for css in selectors {
        let sel = compile(css)?;
        if let Some(value) = doc
            .select(&sel)
            .map(element_value)
            .find(|v| !v.is_empty())
        {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

/// First non-empty value among built-in selectors.
fn first_of(doc: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|css| {
        let sel = static_selector(css);
        doc.select(&sel)
            .map(element_value)
            .find(|v| !v.is_empty())
    })
}

fn strip(doc: &mut Html, css: &str) -> Result<(), ExtractError> {
    let sel = compile(css)?;
    let ids = doc.select(&sel).map(|el| el.id()).collect::<Vec<_>>();
    for id in ids {
        if let Some(mut node) = doc.tree.get_mut(id) {
            node.detach();
        }
    }
    Ok(())
}

fn content_root<'a>(
    doc: &'a Html,
    custom: &[String],
) -> Result<Option<ElementRef<'a>>, ExtractError> {
    let has_text = |el: &ElementRef<'_>| el.text().any(|t| !t.trim().is_empty());
    for css in custom {
        let sel = compile(css)?;
        if let Some(el) = doc.select(&sel).find(has_text) {
            return Ok(Some(el));
        }
    }
    Ok(CONTENT_ROOTS.iter().find_map(|css| {
        let sel = static_selector(css);
        doc.select(&sel).find(has_text)
    }))
}

/// Concatenate text nodes, putting paragraph breaks around block elements.
fn block_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(e) => {
                let block = BLOCK_TAGS.contains(&e.name());
                if block {
                    out.push_str("\n\n");
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    block_text(child_el, out);
                }
                if block {
                    out.push_str("\n\n");
                }
            }
            _ => {}
        }
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().join(" ")
}

/// Collapse runs of spaces, keep paragraph breaks as a single blank line.
fn normalize_text(raw: &str) -> String {
    let spaced = INLINE_SPACE.replace_all(raw, " ");
    let paragraphs = BLANK_LINES.replace_all(&spaced, "\n\n");
    paragraphs
        .split("\n\n")
        .map(|p| SINGLE_NEWLINE.replace_all(p.trim(), " ").trim().to_string())
        .filter(|p| !p.is_empty())
        .join("\n\n")
}

/// Normalise a publication date to RFC 3339 when it can be parsed.
fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc).to_rfc3339();
    }
    if let Some(dt) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return dt.and_utc().to_rfc3339();
    }
    raw.to_string()
}
