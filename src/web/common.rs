//! Shared request types and helpers for the page handlers
//!
//! `Path` and `Form` wrap the axum extractors of the same name so that a
//! rejected request ends on a styled error page instead of plain text.

use axum::extract::rejection::{FormRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;
use tera::Context as TeraContext;

use crate::models::PagedResult;
use crate::web::middleware::WebError;

/// Path parameters. A segment that does not parse (`/posts/abc/`) is a 404,
/// the same as an ID that does not exist.
#[derive(Debug, Clone, Copy)]
pub struct Path<T>(pub T);

impl<S, T> FromRequestParts<S> for Path<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) = axum::extract::Path::<T>::from_request_parts(parts, state).await?;
        Ok(Path(value))
    }
}

impl From<PathRejection> for WebError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("Unmatched path parameters: {}", rejection.body_text());
        WebError::NotFound
    }
}

/// An urlencoded form body. Other content types and undecodable bodies get
/// the rejection's status with the error page.
#[derive(Debug, Clone)]
pub struct Form<T>(pub T);

impl<S, T> FromRequest<S> for Form<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = WebError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Form(value) = axum::Form::<T>::from_request(request, state).await?;
        Ok(Form(value))
    }
}

impl From<FormRejection> for WebError {
    fn from(rejection: FormRejection) -> Self {
        tracing::debug!("Rejected form body: {}", rejection.body_text());
        WebError::BadRequest(rejection.status())
    }
}

/// `?page=N` on list pages.
///
/// Kept as a raw string: a page that is not a number is a 404, not a 400.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// `?next=/path/` on the login page
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Put a page of items and its paginator state into `context`
pub fn insert_page<T: Serialize>(context: &mut TeraContext, key: &str, page: &PagedResult<T>) {
    context.insert(key, &page.items);
    context.insert("page_obj", &page.page_info());
}

/// Query string prefix that keeps list filters across paginator links.
///
/// Blank values are left out; the result is empty or ends with `&`.
pub fn page_query(filters: &[(&str, Option<&str>)]) -> String {
    filters
        .iter()
        .filter_map(|(key, value)| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| format!("{}={}&", key, urlencoding::encode(v)))
        })
        .collect()
}

/// Where to go after signing in.
///
/// Only paths on this site are accepted; anything else (absolute URLs,
/// protocol-relative `//host` links) falls back to the index.
pub fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.starts_with("/\\")
                && !path.chars().any(char::is_control) =>
        {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}
