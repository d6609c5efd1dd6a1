use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};

use crate::contract::Visibility;

/// Pause between consecutive uploads when running with a single worker.
pub const DEFAULT_PAUSE: Duration = Duration::from_millis(300);

/// Settings for one upload run.
#[derive(Clone)]
pub struct UploadConfig {
    /// Local directory whose contents are uploaded.
    pub root: PathBuf,
    pub visibility: Visibility,
    /// Access password for private uploads.
    pub password: Option<String>,
    /// Maximum number of uploads in flight.
    pub workers: NonZeroUsize,
    /// Delay between uploads in single-worker mode.
    pub pause: Duration,
}

impl UploadConfig {
    /// Private, single worker, default pause.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            visibility: Visibility::Private,
            password: None,
            workers: NonZeroUsize::MIN,
            pause: DEFAULT_PAUSE,
        }
    }

    pub fn trace_loaded(&self) {
        info!(
            root = %self.root.display(),
            visibility = %self.visibility,
            workers = self.workers.get(),
            pause_ms = self.pause.as_millis() as u64,
            "Loaded UploadConfig"
        );
        debug!(?self, "UploadConfig loaded (full debug)");
    }
}

impl fmt::Debug for UploadConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadConfig")
            .field("root", &self.root)
            .field("visibility", &self.visibility)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("workers", &self.workers)
            .field("pause", &self.pause)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_password() {
        let mut config = UploadConfig::new("/tmp/upload");
        config.password = Some("hunter2".into());

        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn defaults_match_single_worker_private_mode() {
        let config = UploadConfig::new("/tmp/upload");
        assert_eq!(config.visibility, Visibility::Private);
        assert_eq!(config.workers.get(), 1);
        assert_eq!(config.pause, Duration::from_millis(300));
    }
}
