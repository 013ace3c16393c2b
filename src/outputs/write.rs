//! Carrying out an [`OutputPlan`].
//!
//! Runs once, after the whole batch has settled. A write failure aborts the
//! run; files written before it stay on disk.

use crate::aggregate::{Aggregate, render_block};
use crate::errors::AppError;
use crate::models::OutputPlan;
use crate::utils::approx_size;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Execute `plan` against the aggregated batch.
///
/// - `Stdout`: prints the aggregated content
/// - `SingleFile`: writes the aggregated content to that path
/// - `SplitFiles`: writes each result's rendered block to its own path
///
/// # Arguments
///
/// * `plan` - Where the content goes
/// * `aggregate` - The settled batch
///
/// # Returns
///
/// The paths of the files written, empty for stdout.
///
/// # Errors
///
/// Returns [`AppError::Write`], [`AppError::OutputDir`] or
/// [`AppError::Stdout`] on the first I/O failure.
#[instrument(level = "info", skip_all)]
pub async fn execute(plan: &OutputPlan, aggregate: &Aggregate) -> Result<Vec<PathBuf>, AppError> {
    match plan {
        OutputPlan::Stdout => {
            let mut out = std::io::stdout().lock();
            writeln!(out, "{}", aggregate.content).map_err(AppError::Stdout)?;
            out.flush().map_err(AppError::Stdout)?;
            Ok(Vec::new())
        }
        OutputPlan::SingleFile(path) => {
            write_file(path, &aggregate.content).await?;
            Ok(vec![path.clone()])
        }
        OutputPlan::SplitFiles(paths) => {
            let mut written = Vec::with_capacity(paths.len());
            for (path, result) in paths.iter().zip(&aggregate.results) {
                write_file(path, &render_block(result)).await?;
                written.push(path.clone());
            }
            Ok(written)
        }
    }
}

async fn write_file(path: &Path, content: &str) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| AppError::OutputDir {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    if let Err(source) = fs::write(path, content).await {
        error!(path = %path.display(), error = %source, "Failed writing output");
        return Err(AppError::Write {
            path: path.to_path_buf(),
            source,
        });
    }
    info!(
        path = %path.display(),
        size = %approx_size(content.len()),
        "Wrote output file"
    );
    Ok(())
}
