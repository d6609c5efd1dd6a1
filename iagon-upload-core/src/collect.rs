//! File collection: walks the upload root and lists every regular file with
//! its path relative to the root.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::contract::FileEntry;
use crate::error::CollectError;

/// Recursively collect all regular files beneath `root`.
///
/// Within each directory, files come first (sorted by name), then
/// subdirectories (sorted by name) are descended. Symlinks to regular files
/// are collected; symlinked directories are not followed.
pub fn collect_files(root: &Path) -> Result<Vec<FileEntry>, CollectError> {
    if !root.is_dir() {
        error!(root = %root.display(), "Upload root is not a directory");
        return Err(CollectError::NotADirectory(root.to_path_buf()));
    }

    let mut entries = Vec::new();
    visit_dir(root, root, &mut entries)?;

    info!(
        root = %root.display(),
        count = entries.len(),
        "Collected files beneath upload root"
    );
    Ok(entries)
}

fn visit_dir(dir: &Path, root: &Path, results: &mut Vec<FileEntry>) -> Result<(), CollectError> {
    let io_err = |source| CollectError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files: Vec<PathBuf> = Vec::new();
    let mut subdirs: Vec<PathBuf> = Vec::new();

    for entry_res in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry_res.map_err(io_err)?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(io_err)?;

        if file_type.is_dir() {
            subdirs.push(path);
        } else if file_type.is_file() {
            files.push(path);
        } else if file_type.is_symlink() {
            match fs::metadata(&path) {
                Ok(meta) if meta.is_file() => files.push(path),
                Ok(_) => debug!(path = %path.display(), "Skipping symlink that is not a regular file"),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping dangling symlink"),
            }
        } else {
            debug!(path = %path.display(), "Skipping special file");
        }
    }

    files.sort();
    subdirs.sort();

    for path in files {
        // Every path here was produced by joining onto `root`.
        let relative_path = match path.strip_prefix(root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => continue,
        };
        results.push(FileEntry {
            absolute_path: path,
            relative_path,
        });
    }

    for subdir in subdirs {
        visit_dir(&subdir, root, results)?;
    }
    Ok(())
}
