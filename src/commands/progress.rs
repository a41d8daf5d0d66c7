// src/commands/progress.rs
//! Progress display for concurrent builds
//!
//! An overall bar counts finished libraries; a status line below it shows
//! the most recent start or finish.

use getlibs::{BuildOutcome, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

pub struct BuildProgress {
    _multi: MultiProgress,
    overall: ProgressBar,
    status: ProgressBar,
}

impl BuildProgress {
    /// Create a tracker for `total` libraries
    pub fn new(total: u64) -> Self {
        let multi = MultiProgress::new();

        let overall = ProgressBar::new(total);
        overall.set_style(
            ProgressStyle::default_bar()
                .template("{msg} ({pos}/{len}) [{bar:40.green/dim}] {percent}%")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-"),
        );
        overall.set_message("Building");

        let status = ProgressBar::new_spinner();
        status.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        status.enable_steady_tick(Duration::from_millis(100));

        let overall = multi.add(overall);
        let status = multi.add(status);

        Self {
            _multi: multi,
            overall,
            status,
        }
    }

    pub fn start(&self, name: &str) {
        self.status.set_message(format!("Building {}...", name));
    }

    /// Record a finished library
    pub fn finish_job(&self, name: &str, result: &Result<BuildOutcome>) {
        let message = match result {
            Ok(BuildOutcome::Installed) => format!("[OK] {}", name),
            Ok(BuildOutcome::AlreadyInstalled) => format!("[OK] {} (already installed)", name),
            Ok(BuildOutcome::Incomplete) => format!("[WARN] {} (check path missing)", name),
            Err(e) => format!("[FAIL] {}: {}", name, e),
        };
        self.status.set_message(message);
        self.overall.inc(1);
    }

    /// Clear the display
    pub fn finish(&self) {
        self.status.finish_and_clear();
        self.overall.finish_and_clear();
    }
}
