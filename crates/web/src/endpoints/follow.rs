//! Follow endpoints: subscribe, unsubscribe and the follow feed.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use yatube_core::FollowOutcome;
use yatube_db::repositories::PostFilter;

use crate::error::PageResult;
use crate::extractors::{AuthUser, PageQuery};
use crate::middleware::AppState;
use crate::response::Found;
use crate::templates::posts::{self, FollowContext};
use crate::urls;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/follow/", get(follow_index))
        .route("/profile/{username}/follow", get(profile_follow))
        .route("/profile/{username}/follow/", get(profile_follow))
        .route("/profile/{username}/unfollow", get(profile_unfollow))
        .route("/profile/{username}/unfollow/", get(profile_unfollow))
}

async fn follow_index(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<PageQuery>,
) -> PageResult {
    let page_obj = state
        .post_service
        .list(&PostFilter::FollowedBy(user.id.clone()), query.page.as_deref())
        .await?;

    Ok(posts::follow(&FollowContext { page_obj }, Some(&user)))
}

async fn profile_follow(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(username): Path<String>,
) -> PageResult {
    let author = state.user_service.get_by_username(&username).await?;

    match state.follow_service.follow(&user.id, &author.id).await {
        Ok(FollowOutcome::Followed) => {}
        Ok(FollowOutcome::AlreadyFollowing) => {
            tracing::debug!(follower = %user.username, author = %author.username, "Already following");
        }
        Err(e) => {
            tracing::warn!(follower = %user.username, author = %author.username, error = %e, "Follow rejected");
            return Err(e.into());
        }
    }

    Ok(Found::to(urls::profile(&author.username)).into_response())
}

async fn profile_unfollow(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(username): Path<String>,
) -> PageResult {
    let author = state.user_service.get_by_username(&username).await?;
    state.follow_service.unfollow(&user.id, &author.id).await?;

    Ok(Found::to(urls::profile(&author.username)).into_response())
}
