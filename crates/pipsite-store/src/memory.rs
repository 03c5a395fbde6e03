use std::collections::BTreeMap;

use crate::error::{StoreError, StoreResult};
use crate::{key_segments, DocumentStore};

/// In-memory store, filled up front and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    objects: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(key, contents);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.objects.insert(key.into(), contents.into());
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self, key: &str) -> StoreResult<Vec<u8>> {
        key_segments(key)?;
        self.objects
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { key: key.to_owned() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serves_inserted_objects() {
        let store = MemoryStore::new().with("RPC.md", "# RPC\n");
        assert_eq!(store.read_to_string("RPC.md").unwrap(), "# RPC\n");
        assert!(store.read("other.md").unwrap_err().is_not_found());
    }

    #[test]
    fn validates_keys_like_other_backends() {
        let store = MemoryStore::new().with("../x", "nope");
        assert!(matches!(
            store.read("../x"),
            Err(StoreError::InvalidKey { .. })
        ));
    }
}
