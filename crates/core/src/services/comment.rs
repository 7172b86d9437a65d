//! Comment service.

use std::collections::HashMap;

use sea_orm::Set;
use serde::Serialize;
use validator::Validate;
use yatube_common::{AppResult, IdGenerator};
use yatube_db::{
    entities::{comment, user},
    repositories::{CommentRepository, PostRepository, UserRepository},
};

use super::validate_not_blank;

/// Input for commenting on a post.
#[derive(Debug, Clone, Default, Validate)]
pub struct CreateCommentInput {
    #[validate(custom(function = "validate_not_blank"))]
    pub text: String,
}

/// A comment with its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentView {
    pub comment: comment::Model,
    pub author: user::Model,
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(
        comment_repo: CommentRepository,
        post_repo: PostRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            comment_repo,
            post_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Add a comment to a post.
    pub async fn add(
        &self,
        post_id: &str,
        author: &user::Model,
        input: CreateCommentInput,
    ) -> AppResult<comment::Model> {
        let post = self.post_repo.get_by_id(post_id).await?;

        input.validate()?;
        let text = input.text.trim();

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post.id),
            author_id: Set(author.id.clone()),
            text: Set(text.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        let comment = self.comment_repo.create(model).await?;
        tracing::info!(
            comment_id = %comment.id,
            post_id = %comment.post_id,
            author = %author.username,
            "Comment added"
        );
        Ok(comment)
    }

    /// All comments on a post, oldest first.
    pub async fn list_for_post(&self, post_id: &str) -> AppResult<Vec<CommentView>> {
        let comments = self.comment_repo.find_by_post(post_id).await?;

        let mut author_ids: Vec<String> = comments.iter().map(|c| c.author_id.clone()).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let authors: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        Ok(comments
            .into_iter()
            .filter_map(|comment| {
                let author = authors.get(&comment.author_id).cloned()?;
                Some(CommentView { comment, author })
            })
            .collect())
    }

    /// Number of comments on a post.
    pub async fn count_for_post(&self, post_id: &str) -> AppResult<u64> {
        self.comment_repo.count_by_post(post_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;
    use yatube_common::AppError;
    use yatube_db::entities::post;

    fn create_test_user(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: format!("user_{id}"),
            username_lower: format!("user_{id}"),
            name: None,
            password_hash: String::new(),
            token: None,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_post(id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            text: "Post".to_string(),
            author_id: "u1".to_string(),
            group_id: None,
            image: None,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_comment(id: &str, author_id: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            post_id: "p1".to_string(),
            author_id: author_id.to_string(),
            text: "Nice post".to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn service(db: DatabaseConnection) -> CommentService {
        let db = Arc::new(db);
        CommentService::new(
            CommentRepository::new(db.clone()),
            PostRepository::new(db.clone()),
            UserRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_add_comment() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_post("p1")]])
            .append_query_results([[create_test_comment("c1", "u2")]])
            .into_connection();

        let comment = service(db)
            .add(
                "p1",
                &create_test_user("u2"),
                CreateCommentInput {
                    text: "Nice post".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(comment.post_id, "p1");
        assert_eq!(comment.author_id, "u2");
    }

    #[tokio::test]
    async fn test_add_comment_to_missing_post() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<post::Model>::new()])
            .into_connection();

        let result = service(db)
            .add(
                "missing",
                &create_test_user("u2"),
                CreateCommentInput {
                    text: "Hello".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_add_blank_comment() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_post("p1")]])
            .into_connection();

        let result = service(db)
            .add("p1", &create_test_user("u2"), CreateCommentInput::default())
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_for_post_attaches_authors() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[
                create_test_comment("c1", "u1"),
                create_test_comment("c2", "u2"),
            ]])
            .append_query_results([[create_test_user("u1"), create_test_user("u2")]])
            .into_connection();

        let comments = service(db).list_for_post("p1").await.unwrap();

        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].author.id, "u1");
        assert_eq!(comments[1].author.username, "user_u2");
    }
}
