use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::{key_segments, DocumentStore};

/// Store backed by a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalFsStore {
    root: PathBuf,
}

impl LocalFsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> StoreResult<PathBuf> {
        let segments = key_segments(key)?;
        let mut path = self.root.clone();
        path.extend(segments);
        Ok(path)
    }

    /// Refuse reads whose parent directory resolves outside the root, e.g.
    /// through a symlink planted inside the store.
    fn check_contained(&self, key: &str, path: &Path) -> StoreResult<()> {
        let Ok(root) = self.root.canonicalize() else {
            // A missing root means nothing can be read; let the read report it.
            return Ok(());
        };
        let Some(parent) = path.parent() else {
            return Ok(());
        };
        match parent.canonicalize() {
            Ok(parent) if !parent.starts_with(&root) => Err(StoreError::InvalidKey {
                key: key.to_owned(),
                reason: "resolves outside the store root".to_owned(),
            }),
            _ => Ok(()),
        }
    }
}

impl DocumentStore for LocalFsStore {
    fn read(&self, key: &str) -> StoreResult<Vec<u8>> {
        let path = self.resolve(key)?;
        self.check_contained(key, &path)?;
        debug!(key, path = %path.display(), "store read");

        fs::read(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound { key: key.to_owned() },
            _ => StoreError::Io {
                key: key.to_owned(),
                source,
            },
        })
    }
}
