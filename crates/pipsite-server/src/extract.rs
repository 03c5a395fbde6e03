use axum::async_trait;
use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::response::Response;
use axum::{Form, Json};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::routes::form_failure;

/// Form submission body, urlencoded or JSON.
///
/// A body that cannot be read is answered in the same `{success, errors}`
/// shape as a validation failure, keeping the status the extractor chose.
pub(crate) struct FormInput<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for FormInput<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = Response;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.trim_start().starts_with("application/json"));

        let parsed = if is_json {
            Json::<T>::from_request(request, state)
                .await
                .map(|Json(value)| value)
                .map_err(|rejection| (rejection.status(), rejection.body_text()))
        } else {
            Form::<T>::from_request(request, state)
                .await
                .map(|Form(value)| value)
                .map_err(|rejection| (rejection.status(), rejection.body_text()))
        };

        parsed.map(Self).map_err(|(status, detail)| {
            debug!(status = status.as_u16(), detail = %detail, "unreadable form body");
            form_failure(status, "form", "The submitted form could not be read.")
        })
    }
}
