// src/pool.rs

//! Bounded worker pool for concurrent builds
//!
//! Each worker owns one recipe's whole lifecycle. The pool hands out one
//! job per dispatch, so a slow build never holds other queued jobs hostage.
//! A fatal error (interrupt or I/O-class failure) trips the shared
//! [`CancelToken`]: jobs not yet started are skipped, running commands are
//! killed at their next poll, and the first fatal error is returned once
//! every worker has finished.

use crate::build::{BuildJob, BuildOutcome, Builder};
use crate::cancel::CancelToken;
use crate::config::BuildConfig;
use crate::error::{Error, Result};
use crate::recipe::Recipe;
use rayon::prelude::*;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, error, info};

/// Result of one recipe that ran to completion or failed on its own
#[derive(Debug)]
pub struct JobReport {
    pub name: String,
    pub result: Result<BuildOutcome>,
}

impl JobReport {
    pub fn outcome(&self) -> Option<BuildOutcome> {
        self.result.as_ref().ok().copied()
    }
}

/// Per-recipe results of a pool run, in job order
#[derive(Debug, Default)]
pub struct PoolReport {
    pub jobs: Vec<JobReport>,
}

impl PoolReport {
    fn count(&self, outcome: BuildOutcome) -> usize {
        self.jobs
            .iter()
            .filter(|job| job.outcome() == Some(outcome))
            .count()
    }

    pub fn installed(&self) -> usize {
        self.count(BuildOutcome::Installed)
    }

    pub fn already_installed(&self) -> usize {
        self.count(BuildOutcome::AlreadyInstalled)
    }

    pub fn incomplete(&self) -> usize {
        self.count(BuildOutcome::Incomplete)
    }

    /// Jobs that ended in a per-recipe error
    pub fn failures(&self) -> impl Iterator<Item = (&str, &Error)> {
        self.jobs
            .iter()
            .filter_map(|job| job.result.as_ref().err().map(|e| (job.name.as_str(), e)))
    }

    pub fn failed(&self) -> usize {
        self.failures().count()
    }
}

/// Fixed-size pool of build workers sharing one cancellation token
pub struct WorkerPool {
    workers: usize,
    cancel: CancelToken,
}

impl WorkerPool {
    /// Create a pool of `workers` threads (at least one)
    pub fn new(workers: usize, cancel: CancelToken) -> Self {
        Self {
            workers: workers.max(1),
            cancel,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Run `work` for every job on the pool
    ///
    /// Per-job errors are logged and recorded in the report. The first
    /// fatal error cancels the remaining jobs and is returned instead.
    pub fn run<F>(&self, jobs: &[BuildJob], work: F) -> Result<PoolReport>
    where
        F: Fn(&BuildJob) -> Result<BuildOutcome> + Sync,
    {
        if jobs.is_empty() {
            return Ok(PoolReport::default());
        }

        let threads = self.workers().min(jobs.len());
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("getlibs-worker-{}", i))
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to start worker pool: {}", e)))?;

        info!("Building {} libraries with {} workers", jobs.len(), threads);
        let fatal: Mutex<Option<Error>> = Mutex::new(None);

        let reports: Vec<JobReport> = pool.install(|| {
            jobs.par_iter()
                .with_max_len(1)
                .filter_map(|job| {
                    if self.cancel.is_cancelled() {
                        debug!("Skipping {}: cancelled", job.name());
                        return None;
                    }

                    match work(job) {
                        Err(e) if e.is_fatal() => {
                            error!("{}: {}", job.name(), e);
                            self.cancel.cancel();
                            let mut slot = fatal.lock().unwrap_or_else(PoisonError::into_inner);
                            if slot.is_none() {
                                *slot = Some(e);
                            }
                            None
                        }
                        result => {
                            if let Err(e) = &result {
                                error!("{} failed: {}", job.name(), e);
                            }
                            Some(JobReport {
                                name: job.name().to_string(),
                                result,
                            })
                        }
                    }
                })
                .collect()
        });

        if let Some(e) = fatal.into_inner().unwrap_or_else(PoisonError::into_inner) {
            return Err(e);
        }
        if self.cancel.is_cancelled() {
            return Err(Error::WorkerInterrupted);
        }
        Ok(PoolReport { jobs: reports })
    }
}

/// Bind every recipe to its install directory under `target`
pub fn plan_jobs(recipes: &[Recipe], target: &Path) -> Result<Vec<BuildJob>> {
    recipes
        .iter()
        .map(|recipe| BuildJob::new(recipe.clone(), target))
        .collect()
}

/// Build `recipes` concurrently with `config.workers` threads
pub fn build_all(
    recipes: &[Recipe],
    target: &Path,
    config: &BuildConfig,
    cancel: CancelToken,
) -> Result<PoolReport> {
    let jobs = plan_jobs(recipes, target)?;
    let pool = WorkerPool::new(config.workers, cancel);
    let builder = Builder::new(config, pool.cancel_token());
    pool.run(&jobs, |job| builder.run(job))
}
