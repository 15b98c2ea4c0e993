//! Mapping of domain failures onto HTML error pages

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::{request::Parts, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::{de::DeserializeOwned, Serialize};

use crate::domain::DomainError;
use crate::templates;

/// Error returned by page handlers; renders `error.html` with a status code
#[derive(Debug)]
pub struct PageError(pub DomainError);

pub type PageResult = Result<Response, PageError>;

impl From<DomainError> for PageError {
    fn from(e: DomainError) -> Self {
        PageError(e)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self.0 {
            DomainError::NotFound => {
                templates::error_page(StatusCode::NOT_FOUND, "The page you requested does not exist.")
            }
            DomainError::Forbidden => templates::error_page(
                StatusCode::FORBIDDEN,
                "You do not have permission to open this page.",
            ),
            DomainError::Validation(msg) => templates::error_page(StatusCode::BAD_REQUEST, &msg),
            DomainError::Conflict(msg) => templates::error_page(StatusCode::CONFLICT, &msg),
            other => {
                tracing::error!("Request failed: {}", other);
                templates::error_page(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong on our side.",
                )
            }
        }
    }
}

/// Render a template into a 200 response
pub fn page<S: Serialize>(name: &str, ctx: S) -> PageResult {
    let html = templates::render(name, ctx)?;
    Ok(Html(html).into_response())
}

pub async fn not_found() -> Response {
    PageError(DomainError::NotFound).into_response()
}

/// `Path` whose parse failures render the 404 page, so `/movies/abc/` is
/// treated like any other unknown movie
#[derive(Debug)]
pub struct PagePath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for PagePath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = PageError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(PagePath(value)),
            Err(rejection) => {
                tracing::debug!("Unmatched path {}: {}", parts.uri.path(), rejection);
                Err(PageError(DomainError::NotFound))
            }
        }
    }
}
