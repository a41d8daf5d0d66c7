// src/recipe/mod.rs

//! Build recipes and the catalog that holds them
//!
//! A recipe names one library, where its source lives, the shell commands
//! that build it, and the files to copy into the install tree afterwards.
//! Recipes are data: the built-in catalog is a TOML file compiled into the
//! binary, and `--catalog` swaps in another one.

mod catalog;
mod format;

pub use catalog::Catalog;
pub use format::{GlobCopy, JOBS_PLACEHOLDER, Recipe, TARGET_PLACEHOLDER};
