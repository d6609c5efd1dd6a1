//! Remote directory resolution.
//!
//! Maps each relative directory of the upload to the identifier of a
//! directory created on the remote service. Directories are created on
//! demand, always after their parent, and each at most once per run.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::contract::{is_root, FileEntry, NewDirectory, StorageClient, Visibility, ROOT_DIR};
use crate::error::ResolveError;

/// Relative directory -> remote directory id for the current run.
///
/// The root ([`ROOT_DIR`]) maps to `None`, meaning "no containing
/// directory". Entries are only ever added.
#[derive(Debug, Clone)]
pub struct RemoteDirectoryMap {
    ids: BTreeMap<PathBuf, Option<String>>,
    created: usize,
}

impl Default for RemoteDirectoryMap {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteDirectoryMap {
    pub fn new() -> Self {
        let mut ids = BTreeMap::new();
        ids.insert(PathBuf::from(ROOT_DIR), None);
        Self { ids, created: 0 }
    }

    /// Look up a resolved directory. The outer `None` means "not resolved";
    /// `Some(None)` is the root.
    pub fn get(&self, dir: &Path) -> Option<Option<&str>> {
        if is_root(dir) {
            return Some(None);
        }
        self.ids.get(dir).map(|id| id.as_deref())
    }

    /// Number of directories created through the client in this run.
    pub fn created(&self) -> usize {
        self.created
    }

    /// Return the remote id for `dir`, creating it (and any unresolved
    /// ancestors, outermost first) if needed.
    pub async fn resolve<C>(
        &mut self,
        client: &C,
        dir: &Path,
        visibility: Visibility,
    ) -> Result<Option<String>, ResolveError>
    where
        C: StorageClient + ?Sized,
    {
        if is_root(dir) {
            return Ok(None);
        }

        let mut chain: Vec<&Path> = dir.ancestors().filter(|a| !is_root(a)).collect();
        chain.reverse();

        for step in chain {
            if self.ids.contains_key(step) {
                continue;
            }
            let parent_id = step
                .parent()
                .and_then(|parent| self.get(parent))
                .flatten()
                .map(str::to_owned);
            let id = self.create(client, step, parent_id, visibility).await?;
            self.ids.insert(step.to_path_buf(), Some(id));
        }

        Ok(self.get(dir).flatten().map(str::to_owned))
    }

    async fn create<C>(
        &mut self,
        client: &C,
        dir: &Path,
        parent_directory_id: Option<String>,
        visibility: Visibility,
    ) -> Result<String, ResolveError>
    where
        C: StorageClient + ?Sized,
    {
        let directory_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        info!(
            directory = %dir.display(),
            name = %directory_name,
            parent = parent_directory_id.as_deref().unwrap_or("<root>"),
            "Creating remote directory"
        );

        let req = NewDirectory {
            directory_name: directory_name.clone(),
            visibility,
            index_listing: true,
            parent_directory_id,
        };

        match client.create_directory(req).await {
            Ok(remote) => {
                self.created += 1;
                println!(
                    "[dir] created remote directory: {} -> id {}",
                    directory_name, remote.id
                );
                info!(directory = %dir.display(), id = %remote.id, "Remote directory created");
                Ok(remote.id)
            }
            Err(e) => {
                error!(directory = %dir.display(), error = %e, "Failed to create remote directory");
                Err(ResolveError {
                    directory: dir.to_path_buf(),
                    source: e,
                })
            }
        }
    }
}

/// Every non-root directory the upload needs, ancestors included, ordered
/// so that a parent always precedes its children.
pub fn distinct_directories(entries: &[FileEntry]) -> Vec<PathBuf> {
    let mut dirs = BTreeSet::new();
    for entry in entries {
        let dir = entry.relative_dir();
        for ancestor in dir.ancestors().filter(|a| !is_root(a)) {
            dirs.insert(ancestor.to_path_buf());
        }
    }
    // Component-wise ordering puts `a` before `a/b`.
    dirs.into_iter().collect()
}

/// Resolve every directory referenced by `entries`, serially.
pub async fn resolve_all<C>(
    client: &C,
    entries: &[FileEntry],
    visibility: Visibility,
) -> Result<RemoteDirectoryMap, ResolveError>
where
    C: StorageClient + ?Sized,
{
    let mut map = RemoteDirectoryMap::new();
    for dir in distinct_directories(entries) {
        map.resolve(client, &dir, visibility).await?;
    }
    info!(created = map.created(), "Remote directory tree resolved");
    Ok(map)
}
