//! Full-page cache for the home page.
//!
//! Cached pages are served until they expire; new posts do not evict them.
//! [`PageCache::clear`] drops every entry at once.

use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Method, Request, StatusCode, Uri, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use moka::future::Cache;
use yatube_db::entities::user;

use crate::templates::RenderedTemplate;

const MAX_ENTRIES: u64 = 10_000;

/// A stored response.
#[derive(Debug, Clone)]
pub struct CachedPage {
    status: StatusCode,
    content_type: Option<HeaderValue>,
    body: Bytes,
    template: Option<RenderedTemplate>,
}

impl IntoResponse for CachedPage {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        match self.content_type {
            Some(content_type) => {
                response
                    .headers_mut()
                    .insert(header::CONTENT_TYPE, content_type);
            }
            None => {
                response.headers_mut().remove(header::CONTENT_TYPE);
            }
        }
        if let Some(template) = self.template {
            response.extensions_mut().insert(template);
        }
        response
    }
}

/// Process-wide page cache with a fixed time to live.
#[derive(Clone)]
pub struct PageCache {
    inner: Cache<String, CachedPage>,
    time_to_live: Duration,
}

impl PageCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new(time_to_live: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(MAX_ENTRIES)
                .time_to_live(time_to_live)
                .build(),
            time_to_live,
        }
    }

    /// Lifetime of an entry.
    #[must_use]
    pub const fn time_to_live(&self) -> Duration {
        self.time_to_live
    }

    /// Cache key for a request: path and query, per viewer.
    ///
    /// Pages show who is logged in, so each session gets its own entry.
    #[must_use]
    pub fn key(viewer: Option<&str>, uri: &Uri) -> String {
        let viewer = viewer.unwrap_or("anonymous");
        match uri.query().filter(|q| !q.is_empty()) {
            Some(query) => format!("{viewer}:{}?{query}", uri.path()),
            None => format!("{viewer}:{}", uri.path()),
        }
    }

    /// Look up a page.
    pub async fn get(&self, key: &str) -> Option<CachedPage> {
        self.inner.get(key).await
    }

    /// Store a page.
    pub async fn insert(&self, key: String, page: CachedPage) {
        self.inner.insert(key, page).await;
    }

    /// Drop every cached page.
    pub fn clear(&self) {
        self.inner.invalidate_all();
        tracing::debug!("Page cache cleared");
    }
}

/// Middleware serving GET requests from the cache and storing `200 OK`
/// responses in it.
pub async fn cache_page(
    State(cache): State<PageCache>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if req.method() != Method::GET {
        return next.run(req).await;
    }

    let viewer = req.extensions().get::<user::Model>().map(|u| u.id.clone());
    let key = PageCache::key(viewer.as_deref(), req.uri());

    if let Some(page) = cache.get(&key).await {
        tracing::debug!(key = %key, "Page cache hit");
        return page.into_response();
    }

    let response = next.run(req).await;
    if response.status() != StatusCode::OK {
        return response;
    }

    let (parts, body) = response.into_parts();
    let body = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(error = %e, key = %key, "Failed to buffer response for caching");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let page = CachedPage {
        status: parts.status,
        content_type: parts.headers.get(header::CONTENT_TYPE).cloned(),
        body: body.clone(),
        template: parts.extensions.get::<RenderedTemplate>().cloned(),
    };
    cache.insert(key, page).await;

    Response::from_parts(parts, Body::from(body))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::{Router, middleware, routing::get};
    use tower::ServiceExt;

    #[test]
    fn test_key_includes_query_and_viewer() {
        let uri: Uri = "/?page=2".parse().unwrap();
        assert_eq!(PageCache::key(None, &uri), "anonymous:/?page=2");
        assert_eq!(PageCache::key(Some("u1"), &uri), "u1:/?page=2");

        let bare: Uri = "/?".parse().unwrap();
        assert_eq!(PageCache::key(None, &bare), "anonymous:/");
    }

    fn counting_app(cache: PageCache, hits: Arc<AtomicUsize>) -> Router {
        Router::new().route(
            "/",
            get(move || {
                let hits = hits.clone();
                async move { format!("render {}", hits.fetch_add(1, Ordering::SeqCst)) }
            })
            .layer(middleware::from_fn_with_state(cache, cache_page)),
        )
    }

    async fn body_of(app: Router, uri: &str) -> Bytes {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_serves_cached_until_cleared() {
        let cache = PageCache::new(Duration::from_secs(60));
        let hits = Arc::new(AtomicUsize::new(0));
        let app = counting_app(cache.clone(), hits.clone());

        let first = body_of(app.clone(), "/").await;
        let second = body_of(app.clone(), "/").await;
        assert_eq!(first, second);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        // Different query, different entry
        let other = body_of(app.clone(), "/?page=2").await;
        assert_ne!(other, first);

        cache.clear();
        let third = body_of(app, "/").await;
        assert_ne!(third, first);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let cache = PageCache::new(Duration::from_millis(50));
        let hits = Arc::new(AtomicUsize::new(0));
        let app = counting_app(cache, hits.clone());

        let first = body_of(app.clone(), "/").await;
        tokio::time::sleep(Duration::from_millis(120)).await;
        let second = body_of(app, "/").await;

        assert_ne!(first, second);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
