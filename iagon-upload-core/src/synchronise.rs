//! High-level pipeline: mirrors a local directory tree onto remote storage.
//!
//! This module provides the top-level orchestration for one upload run. It
//! implements a coordinated pipeline that:
//!   - Collects every regular file beneath the configured root
//!   - Resolves the remote directory tree serially, parent before child
//!   - Numbers one [`UploadTask`] per file in collection order
//!   - Uploads the files, one at a time with a pause, or with a bounded number
//!     in flight
//!   - Returns an [`UploadReport`] with per-file failures and elapsed time
//!
//! # Error Handling
//! Collection and directory-creation failures abort the run before any file
//! is uploaded ([`SynchroniseError`]). Upload failures are recorded in the
//! report and the remaining files are still attempted.
//!
//! # Concurrency
//! The directory map is complete before the first upload starts and is only
//! read afterwards, so upload futures share it by reference without locking.

use std::path::PathBuf;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::{sleep, Instant};
use tracing::{error, info};

use crate::collect::collect_files;
use crate::config::UploadConfig;
use crate::contract::{FileEntry, StorageClient, UploadTask};
use crate::error::{StorageError, SynchroniseError};
use crate::resolve::{resolve_all, RemoteDirectoryMap};
use crate::upload::upload_one;

/// Outcome of a completed run.
#[derive(Debug)]
pub struct UploadReport {
    pub total_files: usize,
    pub directories_created: usize,
    pub uploaded: usize,
    /// Failed files, ordered by sequence index.
    pub failures: Vec<FileFailure>,
    pub elapsed: Duration,
}

impl UploadReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A file that could not be uploaded.
#[derive(Debug)]
pub struct FileFailure {
    pub sequence_index: usize,
    pub path: PathBuf,
    pub error: StorageError,
}

/// Number the files `1..=N` and attach their resolved directory ids.
pub fn build_tasks(entries: Vec<FileEntry>, directories: &RemoteDirectoryMap) -> Vec<UploadTask> {
    entries
        .into_iter()
        .enumerate()
        .map(|(i, file)| {
            let directory_id = directories
                .get(&file.relative_dir())
                .flatten()
                .map(str::to_owned);
            UploadTask {
                sequence_index: i + 1,
                file,
                directory_id,
            }
        })
        .collect()
}

/// Entrypoint: upload everything beneath `config.root`.
pub async fn synchronise<C>(
    config: &UploadConfig,
    client: &C,
) -> Result<UploadReport, SynchroniseError>
where
    C: StorageClient + ?Sized,
{
    let started = Instant::now();
    info!(root = %config.root.display(), "[SYNC] Starting upload run");

    let entries = collect_files(&config.root)?;
    let total = entries.len();
    println!("Found {total} files, starting upload...");

    let directories = match resolve_all(client, &entries, config.visibility).await {
        Ok(map) => map,
        Err(e) => {
            error!(error = %e, "[SYNC][ERROR] Directory resolution failed, aborting");
            return Err(e.into());
        }
    };

    let tasks = build_tasks(entries, &directories);
    let outcomes = if config.workers.get() == 1 {
        upload_sequential(client, &tasks, config).await
    } else {
        upload_concurrent(client, &tasks, config).await
    };

    let mut failures: Vec<FileFailure> = outcomes
        .into_iter()
        .filter_map(|(task, result)| {
            result.err().map(|error| FileFailure {
                sequence_index: task.sequence_index,
                path: task.file.absolute_path.clone(),
                error,
            })
        })
        .collect();
    failures.sort_by_key(|f| f.sequence_index);

    let report = UploadReport {
        total_files: total,
        directories_created: directories.created(),
        uploaded: total - failures.len(),
        failures,
        elapsed: started.elapsed(),
    };

    println!(
        "Upload finished in {:.1}s: {} of {} files uploaded, {} failed.",
        report.elapsed.as_secs_f64(),
        report.uploaded,
        report.total_files,
        report.failures.len()
    );
    info!(
        total = report.total_files,
        uploaded = report.uploaded,
        failed = report.failures.len(),
        directories_created = report.directories_created,
        elapsed_s = report.elapsed.as_secs_f64(),
        "[SYNC] Upload run complete"
    );
    Ok(report)
}

async fn upload_sequential<'t, C>(
    client: &C,
    tasks: &'t [UploadTask],
    config: &UploadConfig,
) -> Vec<(&'t UploadTask, Result<(), StorageError>)>
where
    C: StorageClient + ?Sized,
{
    let total = tasks.len();
    let mut outcomes = Vec::with_capacity(total);
    for (i, task) in tasks.iter().enumerate() {
        if i > 0 && !config.pause.is_zero() {
            sleep(config.pause).await;
        }
        let result = upload_one(client, task, config, total).await;
        outcomes.push((task, result));
    }
    outcomes
}

async fn upload_concurrent<'t, C>(
    client: &C,
    tasks: &'t [UploadTask],
    config: &UploadConfig,
) -> Vec<(&'t UploadTask, Result<(), StorageError>)>
where
    C: StorageClient + ?Sized,
{
    let total = tasks.len();
    info!(workers = config.workers.get(), total, "[SYNC] Uploading concurrently");
    stream::iter(tasks)
        .map(|task| async move {
            let result = upload_one(client, task, config, total).await;
            (task, result)
        })
        .buffer_unordered(config.workers.get())
        .collect()
        .await
}
