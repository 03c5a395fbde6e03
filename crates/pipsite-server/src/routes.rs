use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use maud::Markup;
use pipsite_catalog::CatalogResult;
use pipsite_core::PipSite;
use pipsite_forms::{ContactForm, FormError, FormOutcome, NewsletterForm, ValidationErrors};
use tracing::error;

use crate::error::{PageError, PageResult};
use crate::extract::FormInput;
use crate::middleware::request_tracing;
use crate::{views, AppState};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/whitepapers", get(whitepapers))
        .route("/get-started", get(get_started))
        .route("/voting", get(voting))
        .route("/funding-transparency", get(funding_transparency))
        .route("/contact", get(contact_page).post(contact_submit))
        .route("/newsletter", post(newsletter_submit))
        .route("/projects", get(projects))
        .route("/projects/:id", get(project))
        .route("/pips", get(pips))
        .route("/pips/:number", get(pip))
        .route("/rpc", get(rpc))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), request_tracing))
        .with_state(state)
}

fn page(markup: Markup) -> Html<String> {
    Html(markup.into_string())
}

/// Numeric path segments only; anything else is treated as an unknown page.
fn parse_id(segment: &str) -> PageResult<u32> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PageError::NotFound);
    }
    segment.parse().map_err(|_| PageError::NotFound)
}

/// Run a store-backed lookup off the async workers.
async fn blocking<T, F>(state: &AppState, lookup: F) -> PageResult<T>
where
    F: FnOnce(&PipSite) -> CatalogResult<T> + Send + 'static,
    T: Send + 'static,
{
    let site = state.site().clone();
    Ok(tokio::task::spawn_blocking(move || lookup(&site)).await??)
}

async fn home(State(state): State<AppState>) -> Html<String> {
    page(views::home(state.site_name()))
}

async fn get_started(State(state): State<AppState>) -> Html<String> {
    page(views::get_started(state.site_name()))
}

async fn voting(State(state): State<AppState>) -> Html<String> {
    page(views::voting(state.site_name()))
}

async fn funding_transparency(State(state): State<AppState>) -> Html<String> {
    page(views::funding_transparency(state.site_name()))
}

async fn contact_page(State(state): State<AppState>) -> Html<String> {
    page(views::contact(state.site_name()))
}

async fn whitepapers(State(state): State<AppState>) -> PageResult<Html<String>> {
    let sections = blocking(&state, |site| site.content().whitepaper()).await?;
    Ok(page(views::whitepapers(state.site_name(), &sections)))
}

async fn projects(State(state): State<AppState>) -> PageResult<Html<String>> {
    let projects = blocking(&state, |site| site.content().projects()).await?;
    Ok(page(views::projects(state.site_name(), &projects)))
}

async fn project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> PageResult<Html<String>> {
    let id = parse_id(&id)?;
    let rendered = blocking(&state, move |site| site.content().project(id)).await?;
    Ok(page(views::project(state.site_name(), &rendered)))
}

async fn pips(State(state): State<AppState>) -> PageResult<Html<String>> {
    let records = blocking(&state, |site| site.documents().list_documents()).await?;
    Ok(page(views::pips(state.site_name(), &records)))
}

async fn pip(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> PageResult<Html<String>> {
    let number = parse_id(&number)?;
    let document = blocking(&state, move |site| site.documents().get_document(number)).await?;
    Ok(page(views::pip(state.site_name(), &document)))
}

async fn rpc(State(state): State<AppState>) -> PageResult<Html<String>> {
    let html = blocking(&state, |site| site.documents().rpc_document()).await?;
    Ok(page(views::rpc(state.site_name(), &html)))
}

async fn not_found() -> PageError {
    PageError::NotFound
}

/// Form failure in the same `{success, errors}` shape as a validation failure.
pub(crate) fn form_failure(status: StatusCode, field: &str, message: &str) -> Response {
    let mut errors = ValidationErrors::new();
    errors.add(field, message);
    (status, Json(FormOutcome::rejected(errors))).into_response()
}

async fn contact_submit(
    State(state): State<AppState>,
    FormInput(form): FormInput<ContactForm>,
) -> Response {
    let site = state.site().clone();
    let failure = match tokio::task::spawn_blocking(move || site.contact().submit(form)).await {
        Ok(Ok(outcome)) => return Json(outcome).into_response(),
        Ok(Err(err)) => err.to_string(),
        Err(err) => err.to_string(),
    };
    error!(error = %failure, "contact submission failed");
    form_failure(
        StatusCode::INTERNAL_SERVER_ERROR,
        "message",
        "Your message could not be delivered. Please try again later.",
    )
}

async fn newsletter_submit(
    State(state): State<AppState>,
    FormInput(form): FormInput<NewsletterForm>,
) -> Response {
    match state.site().newsletter().subscribe(form).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(FormError::Upstream(_)) => form_failure(
            StatusCode::BAD_GATEWAY,
            "email",
            "The mailing list is unavailable. Please try again later.",
        ),
        Err(err) => {
            error!(error = %err, "newsletter signup failed");
            form_failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "email",
                "The subscription could not be saved. Please try again later.",
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_plain_digits() {
        assert_eq!(parse_id("12").ok(), Some(12));
        assert_eq!(parse_id("007").ok(), Some(7));
        for segment in ["", "abc", "+1", "-1", "1.5", "99999999999"] {
            assert!(
                matches!(parse_id(segment), Err(PageError::NotFound)),
                "{segment} should not parse"
            );
        }
    }
}
