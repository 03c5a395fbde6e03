//! Read-only storage for markdown bodies, index files and other site content.
//!
//! Content is addressed by store keys: relative, `/`-separated paths such as
//! `PIP/PIP-1.md`. Backends decide how a key maps onto bytes.

pub mod error;
pub mod fs;
pub mod memory;

pub use error::{StoreError, StoreResult};
pub use fs::LocalFsStore;
pub use memory::MemoryStore;

use std::fmt;

/// Read access to stored content.
pub trait DocumentStore: fmt::Debug + Send + Sync {
    /// Read the object stored under `key`.
    fn read(&self, key: &str) -> StoreResult<Vec<u8>>;

    /// Read the object under `key` and decode it as UTF-8.
    fn read_to_string(&self, key: &str) -> StoreResult<String> {
        let bytes = self.read(key)?;
        String::from_utf8(bytes).map_err(|_| StoreError::InvalidUtf8 { key: key.to_owned() })
    }

    /// Whether an object exists under `key`.
    fn exists(&self, key: &str) -> StoreResult<bool> {
        match self.read(key) {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

/// Join a directory key and a file name. An empty directory means the store root.
pub fn join_key(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        name.to_owned()
    } else {
        format!("{dir}/{name}")
    }
}

/// Check that `key` is a key every backend accepts.
pub fn validate_key(key: &str) -> StoreResult<()> {
    key_segments(key).map(|_| ())
}

/// Split `key` into its segments, rejecting anything that could escape the store.
pub(crate) fn key_segments(key: &str) -> StoreResult<Vec<&str>> {
    let invalid = |reason: &str| StoreError::InvalidKey {
        key: key.to_owned(),
        reason: reason.to_owned(),
    };

    if key.is_empty() {
        return Err(invalid("key is empty"));
    }
    if key.starts_with('/') || key.contains('\\') {
        return Err(invalid("key must be a relative, '/'-separated path"));
    }

    let segments: Vec<&str> = key.split('/').collect();
    for segment in &segments {
        match *segment {
            "" => return Err(invalid("key contains an empty segment")),
            "." | ".." => return Err(invalid("key contains a relative segment")),
            _ => {}
        }
    }
    Ok(segments)
}
