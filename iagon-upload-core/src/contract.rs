//! # contract: data model and the remote storage seam
//!
//! This module defines the plain data types that flow through the upload
//! pipeline and the single trait ([`StorageClient`]) through which the
//! pipeline talks to the remote storage service.
//!
//! ## Interface & Extensibility
//! - Implement [`StorageClient`] to target a new backend (the CLI crate ships
//!   the HTTP implementation for the IAGON gateway).
//! - Both methods are async and return [`StorageError`] so that callers can
//!   decide per operation whether a failure is fatal.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`; `MockStorageClient` is exported
//!   under the `test-export-mocks` feature so integration tests in other
//!   crates can use it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;

pub use crate::error::StorageError;

/// Relative directory key used for the upload root.
pub const ROOT_DIR: &str = ".";

/// Access-control mode of uploaded files and created directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Access gated behind a password.
    #[default]
    Private,
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Public => "public",
        }
    }

    /// Whether uploads with this visibility carry a password field.
    pub fn requires_password(&self) -> bool {
        matches!(self, Visibility::Private)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(Visibility::Private),
            "public" => Ok(Visibility::Public),
            other => Err(format!(
                "invalid visibility '{other}', expected 'private' or 'public'"
            )),
        }
    }
}

/// A regular file found beneath the upload root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path usable to open the file.
    pub absolute_path: PathBuf,
    /// Path relative to the upload root, e.g. `sub/b.txt`.
    pub relative_path: PathBuf,
}

impl FileEntry {
    /// The containing directory relative to the root; [`ROOT_DIR`] for files
    /// directly in the root.
    pub fn relative_dir(&self) -> PathBuf {
        match self.relative_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from(ROOT_DIR),
        }
    }

    /// Base name sent to the remote service as the file's display name.
    pub fn file_name(&self) -> String {
        self.relative_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// True when `dir` is the relative key of the upload root.
pub fn is_root(dir: &Path) -> bool {
    dir.as_os_str().is_empty() || dir == Path::new(ROOT_DIR)
}

/// One file upload, numbered for progress reporting.
#[derive(Debug, Clone)]
pub struct UploadTask {
    /// Position in collection order, starting at 1.
    pub sequence_index: usize,
    pub file: FileEntry,
    /// Remote directory the file goes into; `None` uploads to the root.
    pub directory_id: Option<String>,
}

/// Request body for creating a remote directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewDirectory {
    pub directory_name: String,
    pub visibility: Visibility,
    pub index_listing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_directory_id: Option<String>,
}

/// A directory created on the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDirectory {
    pub id: String,
}

/// Everything needed to upload a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// Local file to stream.
    pub path: PathBuf,
    /// Display name on the remote service (the base name).
    pub file_name: String,
    pub directory_id: Option<String>,
    pub visibility: Visibility,
    /// Present only for private uploads.
    pub password: Option<String>,
    pub index_listing: bool,
}

/// Access to the remote storage service.
///
/// Implemented by the HTTP client in the CLI crate and by mocks in tests.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Create a directory and return its remote identifier.
    async fn create_directory(&self, req: NewDirectory) -> Result<RemoteDirectory, StorageError>;

    /// Upload one file.
    ///
    /// Implementors report local read failures as [`StorageError::LocalRead`]
    /// and non-success responses as [`StorageError::Rejected`].
    async fn upload_file(&self, req: FileUpload) -> Result<(), StorageError>;
}
