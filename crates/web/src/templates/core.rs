//! Error pages.

use axum::{http::StatusCode, response::Response};
use serde::Serialize;
use yatube_db::entities::user;

use super::{html_escape, render};

/// Context of the error pages.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorContext {
    pub status: u16,
    pub message: String,
    /// Requested path, when known.
    pub path: Option<String>,
}

/// `core/404.html`
#[must_use]
pub fn not_found(ctx: &ErrorContext, viewer: Option<&user::Model>) -> Response {
    let path = ctx
        .path
        .as_deref()
        .map(|p| format!("<p>Page <code>{}</code> does not exist.</p>\n", html_escape(p)))
        .unwrap_or_default();
    let content = format!(
        "<h1>Page not found</h1>\n{path}<p><a href=\"/\">Go to the home page</a></p>"
    );
    render(
        StatusCode::NOT_FOUND,
        "core/404.html",
        ctx,
        "Page not found",
        viewer,
        &content,
    )
}

/// `core/500.html`
///
/// Shows nothing of the underlying error.
#[must_use]
pub fn server_error(ctx: &ErrorContext) -> Response {
    render(
        StatusCode::INTERNAL_SERVER_ERROR,
        "core/500.html",
        ctx,
        "Server error",
        None,
        "<h1>Server error</h1>\n<p>Something went wrong. Please try again later.</p>",
    )
}

/// `core/error.html`, for the remaining client errors.
#[must_use]
pub fn error(ctx: &ErrorContext, viewer: Option<&user::Model>) -> Response {
    let status = StatusCode::from_u16(ctx.status).unwrap_or(StatusCode::BAD_REQUEST);
    let title = status.canonical_reason().unwrap_or("Error");
    let content = format!(
        "<h1>{} {}</h1>\n<p>{}</p>\n<p><a href=\"/\">Go to the home page</a></p>",
        status.as_u16(),
        html_escape(title),
        html_escape(&ctx.message)
    );
    render(status, "core/error.html", ctx, title, viewer, &content)
}
