//! HTTP layer for yatube.
//!
//! This crate provides the server-rendered site:
//!
//! - **Endpoints**: listings, post detail, post form, follows, auth pages
//! - **Extractors**: session user, login redirect, paging
//! - **Middleware**: session resolution, home-page cache
//! - **Templates**: HTML pages with introspectable context
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod cache;
pub mod endpoints;
pub mod error;
pub mod extractors;
pub mod forms;
pub mod middleware;
pub mod response;
pub mod templates;
pub mod urls;

use axum::Router;
use tower_http::services::ServeDir;
use yatube_common::config::MediaConfig;

pub use cache::PageCache;
pub use error::{PageError, PageResult};
pub use middleware::AppState;
pub use templates::RenderedTemplate;

/// Build the complete site router.
///
/// Uploaded media is served from `media.root` under `media.url`; every
/// other unmatched path gets the 404 page.
pub fn app(state: AppState, media: &MediaConfig) -> Router {
    Router::new()
        .merge(endpoints::router(&state))
        .nest_service(&media.url, ServeDir::new(&media.root))
        .fallback(endpoints::not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ))
        .with_state(state)
}
