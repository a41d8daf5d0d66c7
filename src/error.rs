// src/error.rs

//! Error types for getlibs

use thiserror::Error;

/// Errors produced while resolving, fetching and building recipes
#[derive(Error, Debug)]
pub enum Error {
    /// The URL does not name an archive format we know how to fetch.
    /// Not fatal: the fetcher falls back to a version-control checkout.
    #[error("Unsupported archive: {0}")]
    UnsupportedArchive(String),

    #[error("Fetch failed: {0}")]
    FetchError(String),

    #[error("Download of {url} failed: {reason}")]
    DownloadError { url: String, reason: String },

    #[error("Extraction failed: {0}")]
    ExtractError(String),

    #[error("Command `{command}` failed with exit code {code:?}")]
    CommandFailure { command: String, code: Option<i32> },

    #[error("Worker interrupted")]
    WorkerInterrupted,

    #[error("Unknown library: {name} (available: {available})")]
    UnknownRecipe { name: String, available: String },

    #[error("Invalid catalog: {0}")]
    CatalogError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// Whether this error must stop the whole worker pool.
    ///
    /// Interrupts and I/O-class failures abort every job; everything else
    /// only fails the recipe that raised it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::WorkerInterrupted | Self::IoError(_))
    }
}

/// Result type for getlibs operations
pub type Result<T> = std::result::Result<T, Error>;
