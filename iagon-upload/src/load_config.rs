/// `load_config` module: validates CLI arguments and injects the API token
/// from the environment, producing the settings for one upload run.
///
/// # Responsibilities
/// - Read the `IAGON_API_TOKEN` secret from the environment
/// - Refuse private uploads without a password
/// - Check that `--dir` is an existing directory
///
/// Every check runs before the HTTP client is built, so an invalid
/// invocation never reaches the network.
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::Result;
use iagon_upload_core::config::UploadConfig;
use std::fmt;
use std::time::Duration;
use tracing::{error, info};

use crate::cli::Cli;

/// Environment variable holding the API key.
pub const API_TOKEN_ENV: &str = "IAGON_API_TOKEN";

/// Production gateway.
pub const DEFAULT_BASE_URL: &str = "https://gw.iagon.com/api/v2";

/// Connection settings for [`IagonClient`](crate::upload::IagonClient).
#[derive(Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub api_token: String,
}

impl fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSettings")
            .field("base_url", &self.base_url)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

/// Validated settings for one invocation.
#[derive(Debug)]
pub struct LoadedConfig {
    pub upload: UploadConfig,
    pub client: ClientSettings,
}

/// Reads the API token from the environment.
pub fn api_token_from_env() -> Result<String> {
    match std::env::var(API_TOKEN_ENV) {
        Ok(token) if !token.trim().is_empty() => {
            info!("{API_TOKEN_ENV} found in env");
            Ok(token)
        }
        Ok(_) => {
            error!("{API_TOKEN_ENV} is set but empty");
            anyhow::bail!("{API_TOKEN_ENV} environment variable is empty")
        }
        Err(e) => {
            error!(error = ?e, "{API_TOKEN_ENV} environment variable not set");
            Err(anyhow::anyhow!(
                "{API_TOKEN_ENV} environment variable not set: {e}"
            ))
        }
    }
}

/// Validates `cli` and merges it with environment secrets.
pub fn load_config(cli: &Cli) -> Result<LoadedConfig> {
    let api_token = api_token_from_env()?;

    let password = cli.password.clone().filter(|p| !p.is_empty());
    if cli.visibility.requires_password() && password.is_none() {
        error!(visibility = %cli.visibility, "Missing password for private upload");
        anyhow::bail!("visibility=private requires an access password; pass it with --password");
    }

    if !cli.dir.is_dir() {
        error!(dir = %cli.dir.display(), "Upload path is not a directory");
        anyhow::bail!(
            "path does not exist or is not a directory: {}",
            cli.dir.display()
        );
    }

    let upload = UploadConfig {
        root: cli.dir.clone(),
        visibility: cli.visibility,
        password,
        workers: cli.workers,
        pause: Duration::from_millis(cli.pause_ms),
    };
    upload.trace_loaded();

    let client = ClientSettings {
        base_url: cli.base_url.clone(),
        api_token,
    };
    info!(base_url = %client.base_url, "Config loaded and merged successfully");

    Ok(LoadedConfig { upload, client })
}
