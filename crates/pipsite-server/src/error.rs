use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use pipsite_catalog::CatalogError;
use tokio::task::JoinError;
use tracing::error;

use crate::views;

/// Failure of an HTML page handler.
///
/// Missing documents and projects become a 404 page. Anything else is logged
/// and shown as a generic 500 page; details never reach the browser.
#[derive(Debug)]
pub enum PageError {
    NotFound,
    Catalog(CatalogError),
    Task(JoinError),
}

impl From<CatalogError> for PageError {
    fn from(err: CatalogError) -> Self {
        if err.is_not_found() {
            Self::NotFound
        } else {
            Self::Catalog(err)
        }
    }
}

impl From<JoinError> for PageError {
    fn from(err: JoinError) -> Self {
        Self::Task(err)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Catalog(err) => {
                error!(error = %err, "catalog request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Task(err) => {
                error!(error = %err, "page task failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Html(views::error_page(status).into_string())).into_response()
    }
}

pub type PageResult<T> = Result<T, PageError>;
