//! Post repository.

use std::sync::Arc;

use crate::entities::{Post, follow, post};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, sea_query::Query,
};
use yatube_common::{AppError, AppResult};

/// Which posts a listing shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostFilter {
    /// Every post.
    All,
    /// Posts in the group with this ID.
    Group(String),
    /// Posts written by the user with this ID.
    Author(String),
    /// Posts written by authors the user with this ID follows.
    FollowedBy(String),
}

impl PostFilter {
    fn select(&self) -> Select<Post> {
        let query = Post::find();
        match self {
            Self::All => query,
            Self::Group(group_id) => query.filter(post::Column::GroupId.eq(group_id.as_str())),
            Self::Author(author_id) => query.filter(post::Column::AuthorId.eq(author_id.as_str())),
            Self::FollowedBy(user_id) => query.filter(
                post::Column::AuthorId.in_subquery(
                    Query::select()
                        .column(follow::Column::AuthorId)
                        .from(follow::Entity)
                        .and_where(follow::Column::UserId.eq(user_id.as_str()))
                        .to_owned(),
                ),
            ),
        }
    }
}

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post. Its comments go with it.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Post::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Count posts matching a filter.
    pub async fn count(&self, filter: &PostFilter) -> AppResult<u64> {
        filter
            .select()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// A window of posts matching a filter, newest first.
    ///
    /// Posts created in the same instant are ordered by ID, which is
    /// time-sortable, so the order is total.
    pub async fn find_page(
        &self,
        filter: &PostFilter,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<post::Model>> {
        filter
            .select()
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
