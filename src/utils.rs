//! Small helpers used across the application.
//!
//! - `NAME=VALUE` parsing for repeatable CLI flags
//! - String truncation and size formatting for log lines
//! - File system validation for the output directory

use crate::errors::AppError;
use std::collections::BTreeMap;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Parse `NAME=VALUE` pairs into a map.
///
/// The pair is split at the first `=`, so values may themselves contain `=`.
/// Later duplicates win.
///
/// # Errors
///
/// Returns [`AppError::InvalidPair`] for a pair without `=` or with an empty name.
pub fn parse_pairs<S: AsRef<str>>(pairs: &[S]) -> Result<BTreeMap<String, String>, AppError> {
    let mut map = BTreeMap::new();
    for pair in pairs {
        let pair = pair.as_ref();
        match pair.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                map.insert(name.trim().to_string(), value.to_string());
            }
            _ => return Err(AppError::InvalidPair(pair.to_string())),
        }
    }
    Ok(map)
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at a character boundary no later than `max` bytes
/// and get `"…(+N bytes)"` appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Format a byte count as an approximate human-readable size.
///
/// ```ignore
/// assert_eq!(approx_size(512), "512 B");
/// assert_eq!(approx_size(2048), "2.0 KB");
/// ```
pub fn approx_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < MB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / MB)
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then creates and immediately
/// deletes a probe file.
///
/// # Errors
///
/// Returns [`AppError::OutputDir`] if the directory cannot be created or
/// written to.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), AppError> {
    let to_err = |source| AppError::OutputDir {
        path: path.to_path_buf(),
        source,
    };
    fs::create_dir_all(path).await.map_err(to_err)?;
    let probe_path = path.join(".article_batch_probe");
    stdfs::File::create(&probe_path).map_err(to_err)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(())
}
