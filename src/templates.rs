//! HTML rendering with minijinja
//!
//! Templates are embedded at compile time and loaded once into a shared
//! environment.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use minijinja::{context, Environment};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::domain::DomainError;

const TEMPLATE_SOURCES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("error.html", include_str!("../templates/error.html")),
    ("_errors.html", include_str!("../templates/_errors.html")),
    ("_review.html", include_str!("../templates/_review.html")),
    ("movie_list.html", include_str!("../templates/movie_list.html")),
    ("movie_detail.html", include_str!("../templates/movie_detail.html")),
    ("review_list.html", include_str!("../templates/review_list.html")),
    ("my_reviews.html", include_str!("../templates/my_reviews.html")),
    ("review_form.html", include_str!("../templates/review_form.html")),
    ("comment_form.html", include_str!("../templates/comment_form.html")),
    ("search_results.html", include_str!("../templates/search_results.html")),
    ("register.html", include_str!("../templates/register.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("profile.html", include_str!("../templates/profile.html")),
    ("admin.html", include_str!("../templates/admin.html")),
];

static TEMPLATES: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.add_filter("datetime", format_datetime);
    for &(name, source) in TEMPLATE_SOURCES {
        if let Err(e) = env.add_template(name, source) {
            tracing::error!("Failed to load template {}: {}", name, e);
        }
    }
    env
});

/// `2024-03-01T18:22:05.123+00:00` -> `2024-03-01 18:22`
fn format_datetime(value: String) -> String {
    chrono::DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or(value)
}

pub fn render<S: Serialize>(name: &str, ctx: S) -> Result<String, DomainError> {
    let template = TEMPLATES
        .get_template(name)
        .map_err(|e| DomainError::Internal(format!("Template {} missing: {}", name, e)))?;
    template
        .render(ctx)
        .map_err(|e| DomainError::Internal(format!("Template {} failed: {}", name, e)))
}

/// Render `error.html`, falling back to plain text if rendering itself fails
pub fn error_page(status: StatusCode, message: &str) -> Response {
    let body = render(
        "error.html",
        context! {
            status => status.as_u16(),
            message => message,
        },
    );

    match body {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Error page could not be rendered: {}", e);
            (status, message.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_embedded_template_loads() {
        for (name, _) in TEMPLATE_SOURCES {
            assert!(TEMPLATES.get_template(name).is_ok(), "{} did not load", name);
        }
    }

    #[test]
    fn output_is_escaped() {
        let html = render(
            "error.html",
            context! { status => 404, message => "<script>alert(1)</script>" },
        )
        .unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>alert"));
    }

    #[test]
    fn datetime_filter_shortens_timestamps() {
        assert_eq!(
            format_datetime("2024-03-01T18:22:05.123+00:00".to_string()),
            "2024-03-01 18:22"
        );
        assert_eq!(format_datetime("yesterday".to_string()), "yesterday");
    }
}
