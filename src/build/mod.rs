// src/build/mod.rs

//! Build runner
//!
//! Turns one [`Recipe`] into installed files under its install directory:
//!
//! 1. Skip if the recipe's check path already exists
//! 2. Fetch the source into `<tdir>/src/<name>`
//! 3. Run each command template, split into arguments, inside the source
//!    directory
//! 4. Copy glob matches from the source tree into the install tree
//! 5. Remove the source directory, whatever happened above

mod dirstack;
mod globcopy;

pub use dirstack::{DirScope, DirStack};
pub use globcopy::copy_globs;

use crate::cancel::CancelToken;
use crate::config::BuildConfig;
use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::process::ProcessRunner;
use crate::recipe::Recipe;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A recipe bound to its absolute install directory
#[derive(Debug, Clone)]
pub struct BuildJob {
    pub recipe: Recipe,
    pub tdir: PathBuf,
}

impl BuildJob {
    /// Bind `recipe` to its install directory, falling back to `target`
    pub fn new(recipe: Recipe, target: &Path) -> Result<Self> {
        let tdir = recipe.install_dir(target)?;
        Ok(Self { recipe, tdir })
    }

    pub fn name(&self) -> &str {
        &self.recipe.name
    }

    /// Scratch checkout location, removed after every build
    pub fn source_dir(&self) -> PathBuf {
        self.recipe.source_dir(&self.tdir)
    }

    pub fn is_installed(&self) -> bool {
        self.recipe.is_installed(&self.tdir)
    }
}

/// What a finished build left behind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The check path appeared during this build
    Installed,
    /// The check path existed before the build started; nothing ran
    AlreadyInstalled,
    /// Every step ran but the check path is still missing
    Incomplete,
}

/// Removes the source directory when dropped
struct SourceDirGuard {
    path: PathBuf,
}

impl Drop for SourceDirGuard {
    fn drop(&mut self) {
        if self.path.exists() {
            debug!("Removing {}", self.path.display());
            if let Err(e) = fs::remove_dir_all(&self.path) {
                warn!("Failed to remove {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Builds recipes one at a time on the calling thread
pub struct Builder<'a> {
    config: &'a BuildConfig,
    cancel: &'a CancelToken,
}

impl<'a> Builder<'a> {
    pub fn new(config: &'a BuildConfig, cancel: &'a CancelToken) -> Self {
        Self { config, cancel }
    }

    /// Build `recipe`, installing into its override directory or `target`
    pub fn build(&self, recipe: &Recipe, target: &Path) -> Result<BuildOutcome> {
        let job = BuildJob::new(recipe.clone(), target)?;
        self.run(&job)
    }

    /// Run every build step for `job`
    ///
    /// The source directory is removed on every exit path, including
    /// failed fetches, failed commands and interrupts.
    pub fn run(&self, job: &BuildJob) -> Result<BuildOutcome> {
        let recipe = &job.recipe;
        if job.is_installed() {
            info!("{} is already installed, skipping", recipe.name);
            return Ok(BuildOutcome::AlreadyInstalled);
        }
        self.cancel.check()?;

        let srcdir = job.source_dir();
        let _cleanup = SourceDirGuard {
            path: srcdir.clone(),
        };

        info!("Fetching {} from {}", recipe.name, recipe.url);
        Fetcher::new(self.config, self.cancel).fetch(&recipe.url, &srcdir)?;

        self.run_commands(job, &srcdir)?;

        let copied = copy_globs(&recipe.globs, &srcdir, &job.tdir)?;
        if copied > 0 {
            debug!("Copied {} files for {}", copied, recipe.name);
        }

        if job.is_installed() {
            info!("Installed {}", recipe.name);
            Ok(BuildOutcome::Installed)
        } else {
            warn!(
                "{} finished but {} does not exist",
                recipe.name,
                recipe.check_path(&job.tdir).display()
            );
            Ok(BuildOutcome::Incomplete)
        }
    }

    /// Run the recipe's commands inside `srcdir`
    ///
    /// Each template is split into arguments and run directly, never
    /// through a shell. A command that exits non-zero, cannot be split or
    /// cannot be started is a `CommandFailure`: logged and skipped, or
    /// returned in strict mode.
    fn run_commands(&self, job: &BuildJob, srcdir: &Path) -> Result<()> {
        let recipe = &job.recipe;
        let runner = ProcessRunner::new(self.cancel, self.config.poll_interval);
        let mut stack = DirStack::new()?;
        let scope = stack.scope(srcdir)?;

        for template in &recipe.cmds {
            self.cancel.check()?;
            let command = recipe.substitute(template, &job.tdir, self.config.jobs);
            info!("[{}] {}", recipe.name, command);

            let Some(argv) = recipe.command_argv(template, &job.tdir, self.config.jobs) else {
                warn!("[{}] unbalanced quotes in `{}`", recipe.name, template);
                self.command_failed(recipe, command, None)?;
                continue;
            };
            let Some((program, args)) = argv.split_first() else {
                debug!("[{}] skipping empty command", recipe.name);
                continue;
            };

            // Relative program paths (`./configure`) name files in the source dir
            let program = if program.contains('/') {
                scope.current().join(program)
            } else {
                PathBuf::from(program)
            };
            let mut cmd = scope.command(&program);
            cmd.args(args);

            match runner.run(&recipe.name, cmd) {
                Ok(status) if status.success() => {}
                Ok(status) => self.command_failed(recipe, command, status.code())?,
                Err(Error::IoError(e))
                    if matches!(
                        e.kind(),
                        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
                    ) =>
                {
                    warn!("[{}] cannot run {}: {}", recipe.name, program.display(), e);
                    self.command_failed(recipe, command, None)?
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn command_failed(&self, recipe: &Recipe, command: String, code: Option<i32>) -> Result<()> {
        let failure = Error::CommandFailure { command, code };
        if self.config.strict {
            return Err(failure);
        }
        warn!("[{}] {}", recipe.name, failure);
        Ok(())
    }
}
