//! Application state and session middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use sea_orm::DatabaseConnection;
use yatube_common::{AppError, Config, StorageBackend};
use yatube_core::{
    CommentService, FollowService, GroupService, MediaService, PostService, UserService,
};
use yatube_db::repositories::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};

use crate::cache::PageCache;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub group_service: GroupService,
    pub post_service: PostService,
    pub comment_service: CommentService,
    pub follow_service: FollowService,
    pub page_cache: PageCache,
    /// Largest accepted request body on upload routes.
    pub max_upload_bytes: usize,
    /// Mark the session cookie `Secure`.
    pub secure_cookies: bool,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    #[must_use]
    pub fn new(
        db: Arc<DatabaseConnection>,
        storage: Arc<dyn StorageBackend>,
        config: &Config,
    ) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let group_repo = GroupRepository::new(Arc::clone(&db));
        let post_repo = PostRepository::new(Arc::clone(&db));
        let comment_repo = CommentRepository::new(Arc::clone(&db));
        let follow_repo = FollowRepository::new(Arc::clone(&db));

        let post_service = PostService::new(
            post_repo.clone(),
            user_repo.clone(),
            group_repo.clone(),
            MediaService::new(config.media.max_upload_bytes),
            storage,
            config.site.posts_per_page,
        );

        Self {
            user_service: UserService::new(user_repo.clone()),
            group_service: GroupService::new(group_repo),
            post_service,
            comment_service: CommentService::new(comment_repo, post_repo, user_repo),
            follow_service: FollowService::new(follow_repo),
            page_cache: PageCache::new(Duration::from_secs(config.site.index_cache_ttl_secs)),
            max_upload_bytes: config.media.max_upload_bytes,
            secure_cookies: config.site.session_cookie_secure,
        }
    }
}

/// Authentication middleware.
///
/// Resolves the session cookie to a user and stores it in the request
/// extensions for [`AuthUser`](crate::extractors::AuthUser).
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        match state.user_service.authenticate_by_token(cookie.value()).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(AppError::Unauthorized) => tracing::debug!("Ignoring stale session cookie"),
            Err(e) => tracing::warn!(error = %e, "Session lookup failed"),
        }
    }

    next.run(req).await
}
