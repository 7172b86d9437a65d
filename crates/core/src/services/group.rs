//! Group service.

use regex::Regex;
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;
use yatube_common::{AppResult, IdGenerator};
use yatube_db::{entities::group, repositories::GroupRepository};

// Static pattern, cannot fail
#[allow(clippy::unwrap_used)]
static SLUG_RE: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").unwrap());

/// Input for creating a group.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroupInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(
        length(min = 1, max = 50),
        regex(path = *SLUG_RE, message = "Letters, numbers, underscores or hyphens only.")
    )]
    pub slug: String,

    #[validate(length(max = 200))]
    pub description: String,
}

/// Group service for business logic.
///
/// Groups have no pages of their own for editing; they are created by
/// operators and referenced by posts.
#[derive(Clone)]
pub struct GroupService {
    group_repo: GroupRepository,
    id_gen: IdGenerator,
}

impl GroupService {
    /// Create a new group service.
    #[must_use]
    pub const fn new(group_repo: GroupRepository) -> Self {
        Self {
            group_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a group.
    pub async fn create(&self, input: CreateGroupInput) -> AppResult<group::Model> {
        input.validate()?;

        let model = group::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            slug: Set(input.slug),
            description: Set(input.description),
            created_at: Set(chrono::Utc::now().into()),
        };

        let group = self.group_repo.create(model).await?;
        tracing::info!(group_id = %group.id, slug = %group.slug, "Group created");
        Ok(group)
    }

    /// Get a group by slug.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<group::Model> {
        self.group_repo.get_by_slug(slug).await
    }

    /// Find a group by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<group::Model>> {
        self.group_repo.find_by_id(id).await
    }

    /// All groups, for choice lists.
    pub async fn list(&self) -> AppResult<Vec<group::Model>> {
        self.group_repo.find_all().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;
    use yatube_common::AppError;

    fn service(db: MockDatabase) -> GroupService {
        GroupService::new(GroupRepository::new(Arc::new(db.into_connection())))
    }

    #[tokio::test]
    async fn test_create_rejects_bad_slug() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service
            .create(CreateGroupInput {
                title: "Test".to_string(),
                slug: "not a slug".to_string(),
                description: String::new(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_long_title() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service
            .create(CreateGroupInput {
                title: "x".repeat(201),
                slug: "test-slug".to_string(),
                description: String::new(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_success() {
        let group = group::Model {
            id: "g1".to_string(),
            title: "Test".to_string(),
            slug: "test-slug".to_string(),
            description: "Description".to_string(),
            created_at: Utc::now().into(),
        };
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[group.clone()]]),
        );

        let created = service
            .create(CreateGroupInput {
                title: "Test".to_string(),
                slug: "test-slug".to_string(),
                description: "Description".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(created, group);
    }
}
