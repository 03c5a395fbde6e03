//! Markdown-backed document catalog for PIPs, plus the other read-only
//! content the site shows.
//!
//! The index file and every markdown body live in a [`DocumentStore`]. Each
//! operation re-reads what it needs, renders markdown to HTML and, for PIPs,
//! points relative resource links at the public asset base.
//!
//! [`DocumentStore`]: pipsite_store::DocumentStore

pub mod catalog;
pub mod content;
pub mod error;
pub mod index;
pub mod links;

pub use catalog::{CheckReport, DocumentCatalog, MissingDocument, RenderedDocument};
pub use content::{ContentCatalog, Project, RenderedProject, WhitepaperSection};
pub use error::{CatalogError, CatalogResult};
pub use index::{DocumentIndex, DocumentRecord};
pub use links::{rewrite_resource_links, RESOURCE_PREFIX};
