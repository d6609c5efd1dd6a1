//! Error types for the upload pipeline.
//!
//! Failures are split by what the orchestrator does with them:
//! [`CollectError`] and [`ResolveError`] abort the run (wrapped in
//! [`SynchroniseError`]), while a [`StorageError`] from a file upload is
//! recorded against that file and the run continues.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single call to the storage service.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The local file could not be opened or read.
    #[error("failed to read {}: {source}", path.display())]
    LocalRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The service answered with a non-success status.
    #[error("{status} - {body}")]
    Rejected { status: u16, body: String },

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// A success response without the expected payload.
    #[error("unexpected response: {0}")]
    MalformedResponse(String),
}

/// Failure while walking the local tree.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("path is not a directory or does not exist: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to list {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A remote directory could not be created.
#[derive(Debug, Error)]
#[error("failed to create remote directory {}: {source}", directory.display())]
pub struct ResolveError {
    /// Relative directory that was being created.
    pub directory: PathBuf,
    #[source]
    pub source: StorageError,
}

/// Errors that abort a whole run.
#[derive(Debug, Error)]
pub enum SynchroniseError {
    #[error(transparent)]
    Collect(#[from] CollectError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}
