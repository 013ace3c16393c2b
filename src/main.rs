//! # Article Batch
//!
//! Extracts readable article content from one URL or a list of URLs and
//! prints it or writes it out as Markdown.
//!
//! ## Usage
//!
//! ```sh
//! article_batch https://example.com/story
//! article_batch -u urls.txt -c 4 -o
//! ```
//!
//! ## Architecture
//!
//! 1. **Input**: resolve flags and config, gather URLs from the command line
//!    and/or a URL file
//! 2. **Batch**: extract every URL with bounded concurrency; failures are
//!    recorded per URL and never stop the batch
//! 3. **Aggregate**: combine outcomes into one document (or the bare content
//!    of a single article)
//! 4. **Output**: plan stdout vs. one file vs. one file per article, then write

use aggregate::Aggregate;
use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregate;
mod batch;
mod cli;
mod config;
mod errors;
mod extractors;
mod models;
mod outputs;
mod progress;
mod utils;

use cli::Cli;
use config::AppConfig;
use errors::AppError;
use extractors::{HttpExtractor, Retry};
use models::{OutputPlan, OutputTarget};
use progress::Progress;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    if let Err(e) = run(args).await {
        error!(error = %e, "Run failed");
        return Err(e.into());
    }
    Ok(())
}

async fn run(args: Cli) -> Result<(), AppError> {
    let start_time = Instant::now();
    let config = AppConfig::load(args.config.as_deref())?;
    let report = process(&args, &config).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        succeeded = report.aggregate.results.len(),
        failed = report.aggregate.failures.len(),
        files = report.written.len(),
        "Execution complete"
    );
    Ok(())
}

/// What a finished run produced.
#[derive(Debug)]
struct RunReport {
    aggregate: Aggregate,
    written: Vec<PathBuf>,
}

/// Extract every requested URL and write the aggregated output.
///
/// Per-URL failures end up in the report, not in the error: only invalid
/// input and output I/O abort the run.
async fn process(args: &Cli, config: &AppConfig) -> Result<RunReport, AppError> {
    let batch = args.batch_config(config)?;
    let urls = args.collect_urls(&batch.separator).await?;
    if urls.is_empty() {
        warn!("No URLs to extract");
    }

    let extractor = Retry::new(
        HttpExtractor::new(&config.http_settings(), &batch.options)?,
        config.retries,
        config.retry_base_delay(),
    );

    let items = batch.work_items(urls);
    let total = items.len();
    info!(
        total,
        concurrency = batch.concurrency,
        format = %batch.options.content_type,
        "Starting batch"
    );
    let progress = Progress::new(total);
    let outcomes = batch::run(&extractor, items, batch.concurrency, &progress).await;

    let aggregate = aggregate::aggregate(outcomes);
    let target = args.output_target();
    let output_dir = args.output_dir(config);
    let plan = outputs::plan(&aggregate.results, &target, &output_dir);
    // Named files land in the output dir; make sure it can take them
    if target == OutputTarget::Auto && plan != OutputPlan::Stdout {
        utils::ensure_writable_dir(&output_dir).await?;
    }
    let written = outputs::execute(&plan, &aggregate).await?;

    Ok(RunReport { aggregate, written })
}
