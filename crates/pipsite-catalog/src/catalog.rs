//! Resolution of PIP documents from the index and the document store.

use std::sync::Arc;

use pipsite_config::PipSettings;
use pipsite_markdown::render_html;
use pipsite_store::{join_key, DocumentStore};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{CatalogError, CatalogResult};
use crate::index::{DocumentIndex, DocumentRecord};
use crate::links::rewrite_resource_links;

/// A document ready for display.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RenderedDocument {
    pub metadata: DocumentRecord,
    /// Rendered body with resource links pointing at the asset base.
    pub html: String,
}

/// Index entry whose markdown body is missing from the store.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MissingDocument {
    pub number: u32,
    pub key: String,
}

/// Result of a consistency pass over the index and the store.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CheckReport {
    pub documents: usize,
    pub duplicates: Vec<u32>,
    pub missing: Vec<MissingDocument>,
    pub rpc_present: bool,
}

impl CheckReport {
    /// Missing bodies are failures; duplicate numbers only shadow later entries.
    pub fn is_healthy(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Lists and renders PIP documents.
///
/// Nothing is cached: the index and bodies are read from the store on every
/// call, so edits to the content show up on the next request.
#[derive(Clone, Debug)]
pub struct DocumentCatalog {
    store: Arc<dyn DocumentStore>,
    settings: PipSettings,
}

impl DocumentCatalog {
    pub fn new(store: Arc<dyn DocumentStore>, settings: PipSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &PipSettings {
        &self.settings
    }

    /// Load the full index in declaration order.
    pub fn load_index(&self) -> CatalogResult<DocumentIndex> {
        let index = DocumentIndex::load(self.store.as_ref(), &self.settings.index)?;
        debug!(key = %self.settings.index, documents = index.len(), "loaded PIP index");
        Ok(index)
    }

    /// Every indexed document, most recently declared first.
    pub fn list_documents(&self) -> CatalogResult<Vec<DocumentRecord>> {
        Ok(self.load_index()?.listing())
    }

    /// Resolve `number`, read its body and render it.
    pub fn get_document(&self, number: u32) -> CatalogResult<RenderedDocument> {
        let index = self.load_index()?;
        let Some(record) = index.find(number) else {
            info!(number, "PIP not found in index");
            return Err(CatalogError::NotFound { number });
        };

        let key = self.document_key(record);
        debug!(number, key = %key, "rendering PIP");
        let body = self.store.read_to_string(&key)?;
        let html = rewrite_resource_links(&render_html(&body), &self.settings.asset_base);

        Ok(RenderedDocument {
            metadata: record.clone(),
            html,
        })
    }

    /// Render the JSON-RPC documentation page. Links are left untouched.
    pub fn rpc_document(&self) -> CatalogResult<String> {
        let body = self.store.read_to_string(&self.settings.rpc_document)?;
        Ok(render_html(&body))
    }

    /// Store key of the markdown body for `record`.
    pub fn document_key(&self, record: &DocumentRecord) -> String {
        join_key(&self.settings.documents_dir, &format!("{}.md", record.slug))
    }

    /// Verify that every indexed document has a body in the store.
    pub fn check(&self) -> CatalogResult<CheckReport> {
        let index = self.load_index()?;
        let mut missing = Vec::new();
        for record in index.records() {
            let key = self.document_key(record);
            if !self.store.exists(&key)? {
                missing.push(MissingDocument {
                    number: record.number,
                    key,
                });
            }
        }

        Ok(CheckReport {
            documents: index.len(),
            duplicates: index.duplicate_numbers(),
            missing,
            rpc_present: self.store.exists(&self.settings.rpc_document)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipsite_store::MemoryStore;
    use pretty_assertions::assert_eq;

    fn settings() -> PipSettings {
        PipSettings {
            index: "PIP/index.toml".into(),
            documents_dir: "PIP".into(),
            asset_base: "/assets/pip/".into(),
            rpc_document: "RPC.md".into(),
        }
    }

    fn catalog(store: MemoryStore) -> DocumentCatalog {
        DocumentCatalog::new(Arc::new(store), settings())
    }

    const INDEX: &str = r#"
        [[pip]]
        number = 1
        slug = "pip-1"
        title = "First"

        [[pip]]
        number = 2
        slug = "pip-2"
        title = "Second"
    "#;

    #[test]
    fn get_document_renders_and_rewrites() {
        let store = MemoryStore::new()
            .with("PIP/index.toml", INDEX)
            .with("PIP/pip-1.md", "See resources/PIP-1-fig.png");

        let doc = catalog(store).get_document(1).unwrap();
        assert_eq!(doc.metadata.title, "First");
        assert_eq!(doc.html, "<p>See /assets/pip/PIP-1-fig.png</p>\n");
    }

    #[test]
    fn list_documents_reverses_declaration_order() {
        let store = MemoryStore::new().with("PIP/index.toml", INDEX);
        let numbers: Vec<_> = catalog(store)
            .list_documents()
            .unwrap()
            .into_iter()
            .map(|r| r.number)
            .collect();
        assert_eq!(numbers, vec![2, 1]);
    }

    #[test]
    fn unknown_number_is_not_found() {
        let store = MemoryStore::new().with("PIP/index.toml", INDEX);
        let err = catalog(store).get_document(999).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { number: 999 }));
        assert!(err.is_not_found());
    }

    #[test]
    fn missing_body_is_a_store_failure() {
        let store = MemoryStore::new().with("PIP/index.toml", INDEX);
        let err = catalog(store).get_document(2).unwrap_err();
        assert!(matches!(err, CatalogError::Store(_)));
        assert!(!err.is_not_found());
    }

    #[test]
    fn missing_index_is_a_store_failure() {
        let err = catalog(MemoryStore::new()).list_documents().unwrap_err();
        assert!(matches!(err, CatalogError::Store(_)));
    }

    #[test]
    fn rpc_document_is_not_rewritten() {
        let store = MemoryStore::new().with("RPC.md", "Images live in resources/PIP-1.png\n");
        let html = catalog(store).rpc_document().unwrap();
        assert_eq!(html, "<p>Images live in resources/PIP-1.png</p>\n");
    }

    #[test]
    fn check_reports_missing_bodies_and_duplicates() {
        let index = format!("{INDEX}\n[[pip]]\nnumber = 2\nslug = \"pip-2b\"\ntitle = \"Dup\"\n");
        let store = MemoryStore::new()
            .with("PIP/index.toml", index)
            .with("PIP/pip-1.md", "one")
            .with("PIP/pip-2.md", "two");

        let report = catalog(store).check().unwrap();
        assert_eq!(report.documents, 3);
        assert_eq!(report.duplicates, vec![2]);
        assert_eq!(
            report.missing,
            vec![MissingDocument {
                number: 2,
                key: "PIP/pip-2b.md".into()
            }]
        );
        assert!(!report.rpc_present);
        assert!(!report.is_healthy());
    }
}
