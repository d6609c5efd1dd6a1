//!
//! This module implements the CLI interface for iagon-upload: argument
//! parsing, validation via [`load_config`], and the async [`run`] entrypoint.
//!
//! All pipeline logic (collection, directory resolution, uploads) lives in
//! the `iagon-upload-core` crate. This module is strictly CLI glue.
//!
//! ## How To Use
//! - For command-line users: `iagon-upload --dir ./photos --password s3cret`.
//! - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
//!
//! [`load_config`]: crate::load_config::load_config
use crate::load_config::{load_config, DEFAULT_BASE_URL};
use crate::upload::IagonClient;
use anyhow::Result;
use clap::Parser;
use iagon_upload_core::contract::Visibility;
use iagon_upload_core::synchronise::synchronise;
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Recursively upload a local directory to IAGON storage.
#[derive(Parser)]
#[clap(
    name = "iagon-upload",
    version,
    about = "Recursively upload a local directory tree to IAGON storage"
)]
pub struct Cli {
    /// Local directory to upload recursively
    #[clap(long)]
    pub dir: PathBuf,

    /// Visibility of uploaded files and directories (private or public)
    #[clap(long, default_value = "private")]
    pub visibility: Visibility,

    /// Access password; required when visibility is private
    #[clap(long)]
    pub password: Option<String>,

    /// Number of files uploaded concurrently
    #[clap(long, default_value = "1")]
    pub workers: NonZeroUsize,

    /// Milliseconds to wait between uploads when running with one worker
    #[clap(long, default_value_t = 300)]
    pub pause_ms: u64,

    /// Base URL of the storage API
    #[clap(long, env = "IAGON_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    let config = load_config(&cli)?;
    let client = IagonClient::new(config.client)?;

    tracing::info!(command = "upload", "Starting upload run");
    let report = match synchronise(&config.upload, &client).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(command = "upload", error = %e, "Upload run aborted");
            return Err(anyhow::Error::new(e).context("upload aborted"));
        }
    };

    if !report.is_success() {
        tracing::warn!(
            failed = report.failures.len(),
            total = report.total_files,
            "Upload run finished with failures"
        );
        anyhow::bail!(
            "{} of {} files failed to upload",
            report.failures.len(),
            report.total_files
        );
    }

    tracing::info!(command = "upload", ?report, "Upload run complete");
    Ok(())
}
