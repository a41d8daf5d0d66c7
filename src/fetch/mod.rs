// src/fetch/mod.rs

//! Fetching recipe sources
//!
//! A URL naming a known archive format is downloaded to the scratch
//! directory and extracted; anything else is treated as a repository and
//! checked out with git, svn or mercurial. Either way the source ends up
//! at the requested destination directory.

mod archive;
mod download;
mod vcs;

pub use archive::{ARCHIVE_EXTENSIONS, ArchiveFormat, extract_builtin, resolve_archive};
pub use download::{DownloadMethod, download_file};
pub use vcs::{VcsKind, checkout};

use crate::cancel::CancelToken;
use crate::config::BuildConfig;
use crate::error::{Error, Result};
use crate::process::ProcessRunner;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// Retrieves source code into a directory
pub struct Fetcher<'a> {
    config: &'a BuildConfig,
    runner: ProcessRunner<'a>,
}

impl<'a> Fetcher<'a> {
    pub fn new(config: &'a BuildConfig, cancel: &'a CancelToken) -> Self {
        Self {
            config,
            runner: ProcessRunner::new(cancel, config.poll_interval),
        }
    }

    /// Fetch `url` so that its source tree lives at `dest`
    ///
    /// Archive URLs are downloaded and extracted; other URLs are checked
    /// out. Every failure except an interrupt is reported as `FetchError`.
    pub fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        let result = match resolve_archive(url) {
            Ok(archive_name) => self.fetch_archive(url, &archive_name, dest),
            Err(Error::UnsupportedArchive(_)) => {
                debug!("{} is not an archive, using version control", url);
                checkout(url, dest, &self.runner)
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(()) if dest.exists() => Ok(()),
            Ok(()) => Err(Error::FetchError(format!(
                "No source retrieved from {} into {}",
                url,
                dest.display()
            ))),
            Err(e @ (Error::WorkerInterrupted | Error::FetchError(_))) => Err(e),
            Err(e) => Err(Error::FetchError(format!("{}: {}", url, e))),
        }
    }

    /// Download an archive, extract it and move its top-level entry to `dest`
    fn fetch_archive(&self, url: &str, archive_name: &str, dest: &Path) -> Result<()> {
        fs::create_dir_all(&self.config.scratch_dir)?;
        let archive_path = self.scratch_path(archive_name, dest);

        let parent = dest.parent().ok_or_else(|| {
            Error::FetchError(format!("{} has no parent directory", dest.display()))
        })?;
        fs::create_dir_all(parent)?;

        let result = (|| -> Result<()> {
            download_file(url, &archive_path, &self.runner)?;

            // Extract next to dest so the final rename stays on one filesystem
            let staging = tempfile::Builder::new()
                .prefix(".getlibs-extract-")
                .tempdir_in(parent)?;

            let before = list_entries(staging.path())?;
            self.extract(&archive_path, staging.path(), &before)?;
            let new_entries: Vec<PathBuf> = list_entries(staging.path())?
                .difference(&before)
                .cloned()
                .collect();

            match new_entries.as_slice() {
                [single] => {
                    debug!("Moving {} -> {}", single.display(), dest.display());
                    fs::rename(single, dest)?;
                }
                entries => warn!(
                    "Expected exactly one top-level entry in {}, found {}; check {}",
                    archive_name,
                    entries.len(),
                    staging.path().display()
                ),
            }
            // Dropping `staging` removes anything the rename left behind
            Ok(())
        })();

        if archive_path.exists()
            && let Err(e) = fs::remove_file(&archive_path)
        {
            warn!("Failed to remove {}: {}", archive_path.display(), e);
        }

        result
    }

    /// Download location for an archive; prefixed with the destination's
    /// name so concurrent workers never share a file
    fn scratch_path(&self, archive_name: &str, dest: &Path) -> PathBuf {
        let prefix = dest
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "source".to_string());
        self.config
            .scratch_dir
            .join(format!("{}-{}", prefix, archive_name))
    }

    /// Extract with the built-in decoders, falling back to the helper script
    fn extract(&self, archive: &Path, dir: &Path, before: &HashSet<PathBuf>) -> Result<()> {
        let format = ArchiveFormat::detect(archive)?;
        if !format.is_builtin() {
            debug!("No built-in decoder for {}", archive.display());
            return self.extract_with_helper(archive, dir);
        }
        match extract_builtin(archive, dir) {
            Ok(format) => {
                info!("Extracted {} ({:?})", archive.display(), format);
                Ok(())
            }
            Err(e) => {
                debug!("Built-in extraction failed: {}", e);
                remove_new_entries(dir, before)?;
                self.extract_with_helper(archive, dir)
            }
        }
    }

    /// Download the unarchive script into `dir` and run it there
    fn extract_with_helper(&self, archive: &Path, dir: &Path) -> Result<()> {
        info!("Extracting {} with helper script", archive.display());
        let helper = dir.join("una");
        download_file(&self.config.unarchive_helper, &helper, &self.runner)?;

        let mut cmd = Command::new("bash");
        cmd.arg(&helper).arg(archive).current_dir(dir);
        let status = self.runner.run("unarchive", cmd);

        if let Err(e) = fs::remove_file(&helper) {
            warn!("Failed to remove {}: {}", helper.display(), e);
        }

        let status = status?;
        if !status.success() {
            return Err(Error::ExtractError(format!(
                "Unarchive helper exited with {:?} for {}",
                status.code(),
                archive.display()
            )));
        }
        Ok(())
    }
}

/// Top-level entries of a directory
fn list_entries(dir: &Path) -> Result<HashSet<PathBuf>> {
    let mut entries = HashSet::new();
    for entry in fs::read_dir(dir)? {
        entries.insert(entry?.path());
    }
    Ok(entries)
}

/// Remove entries that appeared in `dir` since `before` was taken
fn remove_new_entries(dir: &Path, before: &HashSet<PathBuf>) -> Result<()> {
    for path in list_entries(dir)?.difference(before) {
        if path.is_dir() {
            fs::remove_dir_all(path)?;
        } else {
            fs::remove_file(path)?;
        }
    }
    Ok(())
}
