//! Live progress for a batch run.
//!
//! The reporter is purely observational: it counts completed items and draws
//! a `Processed n/total` bar on stderr. Nothing in the batch reads it to make
//! decisions. The bar hides itself when stderr is not a terminal.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

const TEMPLATE: &str = "Processed {pos}/{len} [{bar:40.cyan/dim}] {elapsed}";

/// Completed-vs-total counter shared by all in-flight extractions.
pub struct Progress {
    total: usize,
    completed: AtomicUsize,
    bar: ProgressBar,
}

impl Progress {
    /// A reporter that draws to stderr.
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stderr());
        let style = ProgressStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        bar.set_style(style);
        Self::with_bar(total, bar)
    }

    /// A reporter that only counts and logs.
    #[cfg(test)]
    pub fn hidden(total: usize) -> Self {
        Self::with_bar(total, ProgressBar::hidden())
    }

    fn with_bar(total: usize, bar: ProgressBar) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
            bar,
        }
    }

    /// Record one completed item and return the new completed count.
    pub fn tick(&self) -> usize {
        let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(done, total = self.total, "Item completed");
        self.bar.inc(1);
        done
    }

    /// Leave the bar at its final position.
    pub fn finish(&self) {
        if !self.bar.is_finished() {
            self.bar.finish();
        }
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Progress")
            .field("total", &self.total)
            .field("completed", &self.completed())
            .finish()
    }
}
