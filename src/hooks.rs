// src/hooks.rs

//! Host-file hooks
//!
//! Some build systems read configuration from the user's home directory
//! (boost.build looks for `~/user-config.jam` to enable MPI). A hook writes
//! such a file before the builds start and, once they finish, restores
//! whatever was there before.
//! Hooks run around the worker pool, never inside a build.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A file written to the host before building and removed afterwards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostFileHook {
    /// Destination path; a leading `~/` expands to the home directory
    pub path: String,

    /// File contents
    pub contents: String,

    /// Recipes that need this file; empty means every run
    #[serde(default)]
    pub recipes: Vec<String>,
}

impl HostFileHook {
    /// Whether any of the selected recipe names needs this hook
    pub fn applies_to<I, S>(&self, selected: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.recipes.is_empty() {
            return true;
        }
        selected
            .into_iter()
            .any(|name| self.recipes.iter().any(|r| r == name.as_ref()))
    }

    /// Resolve the destination path
    pub fn resolved_path(&self) -> Result<PathBuf> {
        match self.path.strip_prefix("~/") {
            Some(rest) => {
                let home = dirs::home_dir().ok_or_else(|| {
                    Error::ConfigError(format!(
                        "Cannot expand {}: no home directory",
                        self.path
                    ))
                })?;
                Ok(home.join(rest))
            }
            None => Ok(PathBuf::from(&self.path)),
        }
    }

    /// Write the file; the returned guard puts back the previous contents,
    /// or removes the file if there were none
    pub fn install(&self) -> Result<HostFileGuard> {
        let path = self.resolved_path()?;
        let original = match fs::read(&path) {
            Ok(bytes) => {
                debug!("Saving existing {}", path.display());
                Some(bytes)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        debug!("Writing host file {}", path.display());
        fs::write(&path, &self.contents)?;
        Ok(HostFileGuard { path, original })
    }
}

/// Undoes a hook's write on drop
#[derive(Debug)]
pub struct HostFileGuard {
    path: PathBuf,
    original: Option<Vec<u8>>,
}

impl HostFileGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for HostFileGuard {
    fn drop(&mut self) {
        match self.original.take() {
            Some(bytes) => {
                debug!("Restoring host file {}", self.path.display());
                if let Err(e) = fs::write(&self.path, bytes) {
                    warn!("Failed to restore {}: {}", self.path.display(), e);
                }
            }
            None => {
                debug!("Removing host file {}", self.path.display());
                if let Err(e) = fs::remove_file(&self.path)
                    && e.kind() != io::ErrorKind::NotFound
                {
                    warn!("Failed to remove {}: {}", self.path.display(), e);
                }
            }
        }
    }
}

/// Install every hook that applies to the selection
///
/// Guards are returned in installation order; dropping the vector removes
/// all the files.
pub fn install_hooks<S: AsRef<str>>(
    hooks: &[HostFileHook],
    selected: &[S],
) -> Result<Vec<HostFileGuard>> {
    let mut guards = Vec::new();
    for hook in hooks {
        if hook.applies_to(selected.iter().map(|s| s.as_ref())) {
            guards.push(hook.install()?);
        }
    }
    Ok(guards)
}
