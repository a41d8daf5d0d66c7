// src/lib.rs

//! getlibs: fetch and build native libraries into a local prefix
//!
//! Each library is a [`Recipe`]: a source URL, shell command templates and
//! post-build copies. Recipes are fetched (archive download or VCS
//! checkout), built inside a scratch source directory and installed under
//! a target prefix, several at once on a bounded worker pool.
//!
//! # Architecture
//!
//! - `recipe`: recipe format and the TOML catalog
//! - `fetch`: archive resolution, downloads, extraction, VCS checkouts
//! - `build`: the per-recipe build runner and its directory stack
//! - `pool`: concurrent builds with shared cancellation
//! - `hooks`: temporary host files some builds expect

pub mod build;
pub mod cancel;
pub mod config;
mod error;
pub mod fetch;
pub mod hooks;
pub mod pool;
pub mod process;
pub mod recipe;

pub use build::{BuildJob, BuildOutcome, Builder};
pub use cancel::{CancelToken, install_interrupt_handler};
pub use config::BuildConfig;
pub use error::{Error, Result};
pub use pool::{PoolReport, WorkerPool, build_all};
pub use recipe::{Catalog, Recipe};
