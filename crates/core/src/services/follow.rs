//! Follow service.

use sea_orm::Set;
use yatube_common::{AppError, AppResult, IdGenerator};
use yatube_db::{entities::follow, repositories::FollowRepository};

/// Result of a follow request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    /// A new subscription was recorded.
    Followed,
    /// The subscription already existed; nothing changed.
    AlreadyFollowing,
}

/// Follow service for business logic.
#[derive(Clone)]
pub struct FollowService {
    follow_repo: FollowRepository,
    id_gen: IdGenerator,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub const fn new(follow_repo: FollowRepository) -> Self {
        Self {
            follow_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Subscribe `follower_id` to `author_id`.
    pub async fn follow(&self, follower_id: &str, author_id: &str) -> AppResult<FollowOutcome> {
        if follower_id == author_id {
            return Err(AppError::Conflict("Cannot follow yourself".to_string()));
        }

        if self.follow_repo.is_following(follower_id, author_id).await? {
            return Ok(FollowOutcome::AlreadyFollowing);
        }

        let model = follow::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(follower_id.to_string()),
            author_id: Set(author_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        match self.follow_repo.create(model).await {
            Ok(_) => {
                tracing::info!(follower = %follower_id, author = %author_id, "Followed");
                Ok(FollowOutcome::Followed)
            }
            // A concurrent request won the race
            Err(AppError::Conflict(msg)) if msg.starts_with(follow::UNIQUE_FOLLOW) => {
                Ok(FollowOutcome::AlreadyFollowing)
            }
            Err(e) => Err(e),
        }
    }

    /// Drop the subscription, if any. Returns whether a row was removed.
    pub async fn unfollow(&self, follower_id: &str, author_id: &str) -> AppResult<bool> {
        let removed = self.follow_repo.delete_by_pair(follower_id, author_id).await?;
        if removed {
            tracing::info!(follower = %follower_id, author = %author_id, "Unfollowed");
        }
        Ok(removed)
    }

    /// Whether `follower_id` follows `author_id`.
    pub async fn is_following(&self, follower_id: &str, author_id: &str) -> AppResult<bool> {
        self.follow_repo.is_following(follower_id, author_id).await
    }

    /// `(followers, following)` counts for a user.
    pub async fn counts(&self, user_id: &str) -> AppResult<(u64, u64)> {
        let followers = self.follow_repo.count_followers(user_id).await?;
        let following = self.follow_repo.count_following(user_id).await?;
        Ok((followers, following))
    }
}
