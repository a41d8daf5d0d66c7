// src/commands/install.rs

//! Install command - build the selected libraries into a prefix

use super::load_catalog;
use super::progress::BuildProgress;
use anyhow::{Context, Result};
use getlibs::hooks::install_hooks;
use getlibs::pool::plan_jobs;
use getlibs::{BuildConfig, Builder, CancelToken, PoolReport, WorkerPool, install_interrupt_handler};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Options for [`cmd_install`] beyond the library names and prefix
#[derive(Debug, Default)]
pub struct InstallOptions {
    /// Concurrent builds (None = CPU count)
    pub jobs: Option<usize>,
    pub strict: bool,
    pub catalog: Option<PathBuf>,
    pub scratch: Option<PathBuf>,
}

/// Build `libs` into `ldir`
///
/// Names are validated against the catalog before anything touches the
/// filesystem. Failed builds are reported but do not fail the command;
/// only an interrupt or an I/O-class error does.
pub fn cmd_install(libs: &[String], ldir: &Path, options: InstallOptions) -> Result<()> {
    let catalog = load_catalog(options.catalog.as_deref())?;
    let recipes = catalog.select(libs)?;

    let target = std::path::absolute(ldir)
        .with_context(|| format!("Invalid library directory: {}", ldir.display()))?;

    let mut config = BuildConfig::default()
        .with_workers(options.jobs.unwrap_or(0))
        .with_strict(options.strict);
    if let Some(scratch) = options.scratch {
        config = config.with_scratch_dir(scratch);
    }

    install_interrupt_handler()?;
    let names: Vec<&str> = recipes.iter().map(|r| r.name.as_str()).collect();
    info!("Installing {} into {}", names.join(", "), target.display());

    let hook_guards = install_hooks(catalog.hooks(), &names)?;
    for guard in &hook_guards {
        info!("Wrote host file {}", guard.path().display());
    }
    let jobs = plan_jobs(&recipes, &target)?;

    let progress = BuildProgress::new(jobs.len() as u64);
    let pool = WorkerPool::new(config.workers, CancelToken::with_interrupts());
    let builder = Builder::new(&config, pool.cancel_token());

    let result = pool.run(&jobs, |job| {
        progress.start(job.name());
        let result = builder.run(job);
        progress.finish_job(job.name(), &result);
        result
    });

    progress.finish();
    drop(hook_guards);
    remove_empty_dirs(&target);

    let report = result.context("Build aborted")?;
    print_summary(&report);
    Ok(())
}

fn print_summary(report: &PoolReport) {
    println!();
    println!("[COMPLETE] {} libraries processed", report.jobs.len());
    println!("  Installed:         {}", report.installed());
    println!("  Already installed: {}", report.already_installed());
    if report.incomplete() > 0 {
        println!("  Incomplete:        {}", report.incomplete());
    }
    if report.failed() > 0 {
        println!("  Failed:            {}", report.failed());
        for (name, error) in report.failures() {
            println!("    - {}: {}", name, error);
        }
    }
}

/// Remove `<target>/src` and then `<target>` if nothing was left in them
fn remove_empty_dirs(target: &Path) {
    for dir in [target.join("src"), target.to_path_buf()] {
        let empty = fs::read_dir(&dir)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false);
        if empty {
            debug!("Removing empty {}", dir.display());
            if let Err(e) = fs::remove_dir(&dir) {
                warn!("Failed to remove {}: {}", dir.display(), e);
            }
        }
    }
}
