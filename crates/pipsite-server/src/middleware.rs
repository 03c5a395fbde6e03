use std::sync::atomic::Ordering;
use std::time::Instant;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info, Instrument};

use crate::AppState;

pub(crate) const REQUEST_ID_HEADER: &str = "x-request-id";

/// Use the caller's request id when it sent one, otherwise allocate the next.
pub(crate) fn request_id(headers: &HeaderMap, state: &AppState) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
        .unwrap_or_else(|| {
            let id = state.request_id_seed.fetch_add(1, Ordering::Relaxed);
            format!("req-{id:016x}")
        })
}

pub(crate) async fn request_tracing(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let request_id = request_id(request.headers(), &state);
    let span = tracing::info_span!(
        "http.request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    let started = Instant::now();
    let mut response = async move {
        let response = next.run(request).await;
        info!(
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );
        response
    }
    .instrument(span)
    .await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipsite_test_support::SiteFixture;

    #[test]
    fn request_ids_prefer_header_then_counter() {
        let fixture = SiteFixture::new();
        let state = AppState::new(
            pipsite_core::PipSite::bootstrap(fixture.config()).expect("bootstrap"),
        );

        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static(" req-abc "));
        assert_eq!(request_id(&headers, &state), "req-abc");

        let empty = HeaderMap::new();
        assert_eq!(request_id(&empty, &state), "req-0000000000000000");
        assert_eq!(request_id(&empty, &state), "req-0000000000000001");
    }
}
