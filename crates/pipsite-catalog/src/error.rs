use pipsite_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no PIP with number {number}")]
    NotFound { number: u32 },

    #[error("no project with id {id}")]
    ProjectNotFound { id: u32 },

    #[error("failed to parse '{key}': {source}")]
    Parse {
        key: String,
        source: toml::de::Error,
    },

    #[error("invalid content in '{key}': {message}")]
    Invalid { key: String, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CatalogError {
    /// Whether the error means the requested item does not exist, as opposed
    /// to the content being unreadable.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::ProjectNotFound { .. })
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
