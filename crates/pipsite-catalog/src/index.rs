//! The PIP index: an ordered list of document records kept in a TOML file.

use std::collections::BTreeSet;

use pipsite_store::DocumentStore;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};

/// Metadata for one proposal document, as declared in the index.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentRecord {
    pub number: u32,
    /// File stem of the markdown body (`<slug>.md`).
    pub slug: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

/// Records in declaration order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DocumentIndex {
    records: Vec<DocumentRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawIndex {
    #[serde(default)]
    pip: Vec<DocumentRecord>,
}

impl DocumentIndex {
    pub fn new(records: Vec<DocumentRecord>) -> Self {
        Self { records }
    }

    /// Parse index text. `key` names the source in error messages.
    pub fn parse(key: &str, contents: &str) -> CatalogResult<Self> {
        let raw: RawIndex = toml::from_str(contents).map_err(|source| CatalogError::Parse {
            key: key.to_owned(),
            source,
        })?;

        for record in &raw.pip {
            if let Some(message) = slug_problem(&record.slug) {
                return Err(CatalogError::Invalid {
                    key: key.to_owned(),
                    message: format!("PIP {}: {message}", record.number),
                });
            }
        }

        Ok(Self::new(raw.pip))
    }

    /// Read and parse the index stored under `key`.
    pub fn load(store: &dyn DocumentStore, key: &str) -> CatalogResult<Self> {
        let contents = store.read_to_string(key)?;
        Self::parse(key, &contents)
    }

    pub fn records(&self) -> &[DocumentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record declared with `number`.
    pub fn find(&self, number: u32) -> Option<&DocumentRecord> {
        self.records.iter().find(|record| record.number == number)
    }

    /// Records for display: most recently declared first.
    pub fn listing(&self) -> Vec<DocumentRecord> {
        self.records.iter().rev().cloned().collect()
    }

    /// Numbers declared more than once, ascending.
    pub fn duplicate_numbers(&self) -> Vec<u32> {
        let mut seen = BTreeSet::new();
        let mut duplicates = BTreeSet::new();
        for record in &self.records {
            if !seen.insert(record.number) {
                duplicates.insert(record.number);
            }
        }
        duplicates.into_iter().collect()
    }
}

fn slug_problem(slug: &str) -> Option<&'static str> {
    if slug.trim().is_empty() {
        Some("slug cannot be empty")
    } else if slug.contains('/') || slug.contains('\\') {
        Some("slug cannot contain path separators")
    } else if slug == "." || slug == ".." {
        Some("slug cannot be a relative path")
    } else {
        None
    }
}
