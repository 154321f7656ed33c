//! Progress tracking for the retry loop

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::LazyLock;
use std::time::Duration;

static ATTEMPT_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("{msg} [{bar:30.cyan/blue}] attempt {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

static BATCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] Tessellations: [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

/// Coordinates progress display for one or more generation jobs
///
/// Each job gets an attempt bar bounded by the retry budget; batches of
/// jobs additionally get an overall bar.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    batch_bar: Option<ProgressBar>,
    attempt_bar: Option<ProgressBar>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            batch_bar: None,
            attempt_bar: None,
        }
    }

    /// Initialize the overall bar for a batch of jobs
    pub fn initialize(&mut self, job_count: usize) {
        if job_count > 1 {
            let bar = ProgressBar::new(job_count as u64);
            bar.set_style(BATCH_STYLE.clone());
            self.batch_bar = Some(self.multi_progress.add(bar));
        }
    }

    /// Start the attempt bar for one job
    pub fn start_job(&mut self, name: &str, max_retries: usize) {
        let bar = ProgressBar::new(max_retries as u64);
        bar.set_style(ATTEMPT_STYLE.clone());
        bar.set_message(name.to_string());
        bar.enable_steady_tick(Duration::from_millis(200));
        self.attempt_bar = Some(self.multi_progress.add(bar));
    }

    /// Report the current attempt together with arena growth
    pub fn update_attempt(&self, try_count: usize, tiles: usize, states: usize) {
        if let Some(ref bar) = self.attempt_bar {
            bar.set_position(try_count as u64);
            bar.set_message(format!("{tiles} tiles, {states} states"));
        }
    }

    /// Finish the job's attempt bar with its outcome line
    pub fn complete_job(&mut self, status: &str) {
        if let Some(bar) = self.attempt_bar.take() {
            bar.finish_with_message(status.to_string());
        }
        if let Some(ref bar) = self.batch_bar {
            bar.inc(1);
        }
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        if let Some(ref bar) = self.batch_bar {
            bar.finish_with_message("all tessellations processed");
        }
        let _ = self.multi_progress.clear();
    }
}
