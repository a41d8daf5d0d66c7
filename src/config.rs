// src/config.rs

//! Configuration for the build engine

use std::path::PathBuf;
use std::time::Duration;

/// Script used to unpack archive formats without a built-in decoder
pub const DEFAULT_UNARCHIVE_HELPER: &str =
    "https://raw.githubusercontent.com/starcraftman/.my_scripts/master/unarchive";

/// Default install directory, relative to the current directory
pub const DEFAULT_LIBRARY_DIR: &str = "libs";

/// Number of CPUs available to this process
pub fn cpu_count() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(4)
}

/// Configuration shared by every build in a run
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Value substituted for `JOBS` in recipe commands
    pub jobs: usize,
    /// Number of recipes built concurrently
    pub workers: usize,
    /// Where archives are downloaded before extraction
    pub scratch_dir: PathBuf,
    /// Abort a recipe on its first failing command instead of continuing
    pub strict: bool,
    /// URL of the fallback unarchive script
    pub unarchive_helper: String,
    /// How often a running command is checked for cancellation
    pub poll_interval: Duration,
}

impl Default for BuildConfig {
    fn default() -> Self {
        let cpus = cpu_count();

        Self {
            jobs: cpus,
            workers: cpus,
            scratch_dir: std::env::temp_dir().join("getlibs"),
            strict: false,
            unarchive_helper: DEFAULT_UNARCHIVE_HELPER.to_string(),
            poll_interval: Duration::from_millis(200),
        }
    }
}

impl BuildConfig {
    /// Use a different scratch download directory
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    /// Set the worker count; zero keeps the default
    pub fn with_workers(mut self, workers: usize) -> Self {
        if workers > 0 {
            self.workers = workers;
        }
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}
