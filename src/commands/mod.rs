// src/commands/mod.rs
//! Command handlers for the getlibs CLI

mod install;
mod list;
mod progress;

pub use install::{InstallOptions, cmd_install};
pub use list::cmd_list;

use anyhow::{Context, Result};
use getlibs::Catalog;
use std::path::Path;

/// Load the catalog at `path`, or the built-in one
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("Failed to load catalog {}", path.display())),
        None => Catalog::builtin().context("Built-in catalog is invalid"),
    }
}
