//! Page endpoints.

mod auth;
mod follow;
mod posts;

use axum::{Router, http::Uri, response::Response};

use crate::extractors::MaybeAuthUser;
use crate::middleware::AppState;
use crate::templates::core::{self, ErrorContext};

/// Create the page router.
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(posts::router(state))
        .merge(follow::router())
        .nest("/auth", auth::router())
}

/// Fallback for unmatched paths.
pub async fn not_found(MaybeAuthUser(viewer): MaybeAuthUser, uri: Uri) -> Response {
    tracing::debug!(path = %uri.path(), "No route");
    core::not_found(
        &ErrorContext {
            status: 404,
            message: "The requested page does not exist.".to_string(),
            path: Some(uri.path().to_string()),
        },
        viewer.as_ref(),
    )
}
