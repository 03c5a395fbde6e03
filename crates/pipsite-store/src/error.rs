use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no stored object at '{key}'")]
    NotFound { key: String },

    #[error("invalid store key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("object at '{key}' is not valid UTF-8")]
    InvalidUtf8 { key: String },

    #[error("i/o error reading '{key}': {source}")]
    Io { key: String, source: io::Error },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
