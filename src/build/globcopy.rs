// src/build/globcopy.rs

//! Post-build artifact copies

use crate::error::{Error, Result};
use crate::recipe::GlobCopy;
use glob::Pattern;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Copy every regular file matched by `globs` from `srcdir` into `tdir`
///
/// Patterns are relative to `srcdir`, destinations to `tdir`. A
/// destination ending in `/` is created on demand and receives files under
/// their own names; any other destination is the target file path, with
/// missing parent directories created.
/// Returns the number of files copied.
pub fn copy_globs(globs: &[GlobCopy], srcdir: &Path, tdir: &Path) -> Result<usize> {
    let mut copied = 0;
    let base = Pattern::escape(&srcdir.to_string_lossy());

    for glob_copy in globs {
        let dest = tdir.join(&glob_copy.dest);
        if glob_copy.dest_is_dir() && !dest.exists() {
            fs::create_dir_all(&dest)?;
        }

        let pattern = format!("{}/{}", base, glob_copy.pattern);
        let matches = glob::glob(&pattern).map_err(|e| {
            Error::CatalogError(format!("Invalid glob {}: {}", glob_copy.pattern, e))
        })?;

        for entry in matches {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!("Skipping unreadable glob match: {}", e);
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }

            let target = match path.file_name() {
                Some(name) if dest.is_dir() => dest.join(name),
                _ => dest.clone(),
            };
            if let Some(parent) = target.parent()
                && !parent.exists()
            {
                fs::create_dir_all(parent)?;
            }
            debug!("Copying {} -> {}", path.display(), target.display());
            fs::copy(&path, &target)?;
            copied += 1;
        }
    }

    Ok(copied)
}
