//! Single-file upload step.

use tracing::{debug, error, warn};

use crate::config::UploadConfig;
use crate::contract::{FileUpload, StorageClient, UploadTask};
use crate::error::StorageError;

/// Build the request for `task` under the run's settings.
///
/// Private uploads always carry a password field, empty when none was
/// configured; public uploads never do.
pub fn file_upload_request(task: &UploadTask, config: &UploadConfig) -> FileUpload {
    let password = config
        .visibility
        .requires_password()
        .then(|| config.password.clone().unwrap_or_default());

    FileUpload {
        path: task.file.absolute_path.clone(),
        file_name: task.file.file_name(),
        directory_id: task.directory_id.clone(),
        visibility: config.visibility,
        password,
        index_listing: true,
    }
}

/// Upload one file and print its progress line.
///
/// The error is returned to the caller to record; it is never fatal for the
/// run.
pub async fn upload_one<C>(
    client: &C,
    task: &UploadTask,
    config: &UploadConfig,
    total: usize,
) -> Result<(), StorageError>
where
    C: StorageClient + ?Sized,
{
    let index = task.sequence_index;
    let path = task.file.absolute_path.display();
    debug!(
        index,
        total,
        path = %path,
        directory_id = task.directory_id.as_deref().unwrap_or("<root>"),
        "Uploading file"
    );

    match client.upload_file(file_upload_request(task, config)).await {
        Ok(()) => {
            println!("[{index}/{total}] uploaded: {path}");
            Ok(())
        }
        Err(e @ StorageError::LocalRead { .. }) => {
            println!("[{index}/{total}] failed to read file: {path} - {e}");
            warn!(index, path = %path, error = %e, "Skipping unreadable file");
            Err(e)
        }
        Err(e) => {
            println!("[{index}/{total}] upload failed: {path} - {e}");
            error!(index, path = %path, error = %e, "File upload failed");
            Err(e)
        }
    }
}
