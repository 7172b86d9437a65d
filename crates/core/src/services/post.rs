//! Post service.

use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::Set;
use serde::Serialize;
use validator::Validate;
use yatube_common::{AppError, AppResult, IdGenerator, StorageBackend, generate_storage_key};
use yatube_db::{
    entities::{group, post, user},
    repositories::{GroupRepository, PostFilter, PostRepository, UserRepository},
};

use super::media::MediaService;
use super::validate_not_blank;
use crate::pagination::{Page, Paginator};

/// Directory (storage key prefix) post images are kept under.
pub const IMAGE_PREFIX: &str = "posts";

/// An uploaded image file.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Client-side file name.
    pub filename: String,
    /// Raw file content.
    pub data: Vec<u8>,
}

/// What to do with a post's image.
#[derive(Debug, Clone, Default)]
pub enum ImageChange {
    /// Leave the current image (or lack of one) alone.
    #[default]
    Keep,
    /// Remove the current image.
    Clear,
    /// Store a new image in place of the current one.
    Replace(ImageUpload),
}

/// Input for creating or editing a post.
#[derive(Debug, Clone, Default, Validate)]
pub struct PostInput {
    #[validate(custom(function = "validate_not_blank"))]
    pub text: String,
    pub group_id: Option<String>,
    pub image: ImageChange,
}

/// A post with everything a listing shows next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostView {
    pub post: post::Model,
    pub author: user::Model,
    pub group: Option<group::Model>,
    pub image_url: Option<String>,
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    user_repo: UserRepository,
    group_repo: GroupRepository,
    media: MediaService,
    storage: Arc<dyn StorageBackend>,
    paginator: Paginator,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(
        post_repo: PostRepository,
        user_repo: UserRepository,
        group_repo: GroupRepository,
        media: MediaService,
        storage: Arc<dyn StorageBackend>,
        posts_per_page: u64,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
            group_repo,
            media,
            storage,
            paginator: Paginator::new(posts_per_page),
            id_gen: IdGenerator::new(),
        }
    }

    /// Get a post by ID.
    pub async fn get(&self, id: &str) -> AppResult<post::Model> {
        self.post_repo.get_by_id(id).await
    }

    /// Get a post by ID together with its author and group.
    pub async fn get_view(&self, id: &str) -> AppResult<PostView> {
        let post = self.post_repo.get_by_id(id).await?;
        let author = self.user_repo.get_by_id(&post.author_id).await?;
        let group = match &post.group_id {
            Some(group_id) => self.group_repo.find_by_id(group_id).await?,
            None => None,
        };
        let image_url = self.image_url(&post);

        Ok(PostView {
            post,
            author,
            group,
            image_url,
        })
    }

    /// One page of posts matching `filter`, newest first.
    ///
    /// `page` is the raw `page` query value; see [`Paginator::resolve`].
    pub async fn list(&self, filter: &PostFilter, page: Option<&str>) -> AppResult<Page<PostView>> {
        let count = self.post_repo.count(filter).await?;
        let number = self.paginator.resolve(page, count);

        let posts = self
            .post_repo
            .find_page(filter, self.paginator.offset(number), self.paginator.per_page())
            .await?;
        let views = self.attach_relations(posts).await?;

        Ok(Page::new(views, number, self.paginator, count))
    }

    /// Create a post authored by `author`.
    pub async fn create(&self, author: &user::Model, input: PostInput) -> AppResult<post::Model> {
        let (text, group_id) = self.check_input(&input).await?;
        let post_id = self.id_gen.generate();

        let image = match input.image {
            ImageChange::Replace(upload) => Some(self.store_image(&upload).await?),
            ImageChange::Keep | ImageChange::Clear => None,
        };

        let model = post::ActiveModel {
            id: Set(post_id),
            text: Set(text),
            author_id: Set(author.id.clone()),
            group_id: Set(group_id),
            image: Set(image.clone()),
            created_at: Set(chrono::Utc::now().into()),
        };

        match self.post_repo.create(model).await {
            Ok(post) => {
                tracing::info!(post_id = %post.id, author = %author.username, "Post created");
                Ok(post)
            }
            Err(e) => {
                if let Some(key) = image {
                    self.discard_image(&key).await;
                }
                Err(e)
            }
        }
    }

    /// Edit a post. Only its author may do so; the ID never changes.
    pub async fn update(
        &self,
        editor: &user::Model,
        post_id: &str,
        input: PostInput,
    ) -> AppResult<post::Model> {
        let post = self.post_repo.get_by_id(post_id).await?;
        if post.author_id != editor.id {
            return Err(AppError::Forbidden(
                "Only the author can edit this post".to_string(),
            ));
        }

        let (text, group_id) = self.check_input(&input).await?;
        let old_image = post.image.clone();

        let stored_image = match &input.image {
            ImageChange::Replace(upload) => Some(self.store_image(upload).await?),
            ImageChange::Keep | ImageChange::Clear => None,
        };
        let new_image = match input.image {
            ImageChange::Keep => old_image.clone(),
            ImageChange::Clear => None,
            ImageChange::Replace(_) => stored_image.clone(),
        };

        let mut active: post::ActiveModel = post.into();
        active.text = Set(text);
        active.group_id = Set(group_id);
        active.image = Set(new_image.clone());

        let updated = match self.post_repo.update(active).await {
            Ok(updated) => updated,
            Err(e) => {
                if let Some(key) = stored_image {
                    self.discard_image(&key).await;
                }
                return Err(e);
            }
        };

        if let Some(old) = old_image.filter(|old| new_image.as_ref() != Some(old)) {
            self.discard_image(&old).await;
        }

        tracing::info!(post_id = %updated.id, editor = %editor.username, "Post edited");
        Ok(updated)
    }

    /// Public URL of a post's image, if it has one.
    #[must_use]
    pub fn image_url(&self, post: &post::Model) -> Option<String> {
        post.image.as_deref().map(|key| self.storage.public_url(key))
    }

    async fn check_input(&self, input: &PostInput) -> AppResult<(String, Option<String>)> {
        input.validate()?;
        let text = input.text.trim();

        let group_id = match input.group_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(id) => {
                if self.group_repo.find_by_id(id).await?.is_none() {
                    return Err(AppError::Validation(
                        "group: Select a valid choice. That choice is not one of the available choices."
                            .to_string(),
                    ));
                }
                Some(id.to_string())
            }
        };

        Ok((text.to_string(), group_id))
    }

    async fn store_image(&self, upload: &ImageUpload) -> AppResult<String> {
        let info = self.media.inspect_image(&upload.data).map_err(|e| match e {
            AppError::Validation(msg) => AppError::Validation(format!("image: {msg}")),
            other => other,
        })?;
        let key = generate_storage_key(
            IMAGE_PREFIX,
            &self.id_gen.generate(),
            info.format.extension(),
        );
        self.storage.upload(&key, &upload.data).await?;
        tracing::debug!(
            key = %key,
            filename = %upload.filename,
            width = info.width,
            height = info.height,
            "Stored post image"
        );
        Ok(key)
    }

    async fn discard_image(&self, key: &str) {
        if let Err(e) = self.storage.delete(key).await {
            tracing::warn!(error = %e, key = %key, "Failed to delete post image");
        }
    }

    async fn attach_relations(&self, posts: Vec<post::Model>) -> AppResult<Vec<PostView>> {
        let mut author_ids: Vec<String> = posts.iter().map(|p| p.author_id.clone()).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let mut group_ids: Vec<String> = posts.iter().filter_map(|p| p.group_id.clone()).collect();
        group_ids.sort_unstable();
        group_ids.dedup();

        let authors: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();
        let groups: HashMap<String, group::Model> = self
            .group_repo
            .find_by_ids(&group_ids)
            .await?
            .into_iter()
            .map(|g| (g.id.clone(), g))
            .collect();

        Ok(posts
            .into_iter()
            .filter_map(|post| {
                let Some(author) = authors.get(&post.author_id).cloned() else {
                    tracing::warn!(post_id = %post.id, "Post author missing, skipping");
                    return None;
                };
                let group = post.group_id.as_ref().and_then(|id| groups.get(id)).cloned();
                let image_url = self.image_url(&post);
                Some(PostView {
                    post,
                    author,
                    group,
                    image_url,
                })
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::path::Path;
    use yatube_common::LocalStorage;

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            name: None,
            password_hash: String::new(),
            token: None,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_group(id: &str) -> group::Model {
        group::Model {
            id: id.to_string(),
            title: "Test group".to_string(),
            slug: "test-slug".to_string(),
            description: "Description".to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn create_test_post(id: &str, author_id: &str, group_id: Option<&str>) -> post::Model {
        post::Model {
            id: id.to_string(),
            text: "Test text".to_string(),
            author_id: author_id.to_string(),
            group_id: group_id.map(ToString::to_string),
            image: Some("posts/img.gif".to_string()),
            created_at: Utc::now().into(),
        }
    }

    const SMALL_GIF: &[u8] = b"\x47\x49\x46\x38\x39\x61\x02\x00\
        \x01\x00\x80\x00\x00\x00\x00\x00\
        \xFF\xFF\xFF\x21\xF9\x04\x00\x00\
        \x00\x00\x00\x2C\x00\x00\x00\x00\
        \x02\x00\x01\x00\x00\x02\x02\x0C\
        \x0A\x00\x3B";

    fn service(db: DatabaseConnection) -> PostService {
        service_with_media_root(db, &std::env::temp_dir().join("yatube-post-service-tests"))
    }

    fn service_with_media_root(db: DatabaseConnection, root: &Path) -> PostService {
        let db = Arc::new(db);
        PostService::new(
            PostRepository::new(db.clone()),
            UserRepository::new(db.clone()),
            GroupRepository::new(db),
            MediaService::new(1024 * 1024),
            Arc::new(LocalStorage::new(root.to_path_buf(), "/media".to_string())),
            10,
        )
    }

    fn stored_images(root: &Path) -> Vec<String> {
        std::fs::read_dir(root.join(IMAGE_PREFIX))
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn gif_upload() -> ImageChange {
        ImageChange::Replace(ImageUpload {
            filename: "small.gif".to_string(),
            data: SMALL_GIF.to_vec(),
        })
    }

    #[tokio::test]
    async fn test_get_view() {
        let post = create_test_post("p1", "u1", Some("g1"));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[post.clone()]])
            .append_query_results([[create_test_user("u1", "alice")]])
            .append_query_results([[create_test_group("g1")]])
            .into_connection();

        let view = service(db).get_view("p1").await.unwrap();

        assert_eq!(view.post, post);
        assert_eq!(view.author.username, "alice");
        assert_eq!(view.group.map(|g| g.slug), Some("test-slug".to_string()));
        assert_eq!(view.image_url.as_deref(), Some("/media/posts/img.gif"));
    }

    #[tokio::test]
    async fn test_get_view_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<post::Model>::new()])
            .into_connection();

        let result = service(db).get_view("missing").await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_list_attaches_authors_and_groups() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[maplit::btreemap! {
                "num_items" => sea_orm::Value::BigInt(Some(12))
            }]])
            .append_query_results([[
                create_test_post("p2", "u1", Some("g1")),
                create_test_post("p1", "u1", None),
            ]])
            .append_query_results([[create_test_user("u1", "alice")]])
            .append_query_results([[create_test_group("g1")]])
            .into_connection();

        let page = service(db).list(&PostFilter::All, Some("2")).await.unwrap();

        assert_eq!(page.number, 2);
        assert_eq!(page.num_pages, 2);
        assert_eq!(page.count, 12);
        assert_eq!(page.len(), 2);
        assert!(page.items[0].group.is_some());
        assert!(page.items[1].group.is_none());
        assert_eq!(page.items[1].author.username, "alice");
    }

    #[tokio::test]
    async fn test_create_rejects_blank_text_without_writing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let author = create_test_user("u1", "alice");

        let result = service(db)
            .create(
                &author,
                PostInput {
                    text: "   ".to_string(),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(msg)) if msg.starts_with("text")));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_group() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<group::Model>::new()])
            .into_connection();
        let author = create_test_user("u1", "alice");

        let result = service(db)
            .create(
                &author,
                PostInput {
                    text: "Hello".to_string(),
                    group_id: Some("nope".to_string()),
                    image: ImageChange::Keep,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(msg)) if msg.starts_with("group")));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_image() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let author = create_test_user("u1", "alice");

        let result = service(db)
            .create(
                &author,
                PostInput {
                    text: "Hello".to_string(),
                    group_id: None,
                    image: ImageChange::Replace(ImageUpload {
                        filename: "fake.gif".to_string(),
                        data: b"not an image at all".to_vec(),
                    }),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_trims_text() {
        let mut stored = create_test_post("p1", "u1", None);
        stored.text = "Hello".to_string();
        stored.image = None;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored]])
            .into_connection();
        let author = create_test_user("u1", "alice");

        let post = service(db)
            .create(
                &author,
                PostInput {
                    text: "  Hello \n".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(post.text, "Hello");
        assert_eq!(post.author_id, "u1");
    }

    #[tokio::test]
    async fn test_update_by_non_author_is_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_post("p1", "u1", None)]])
            .into_connection();
        let intruder = create_test_user("u2", "mallory");

        let result = service(db)
            .update(
                &intruder,
                "p1",
                PostInput {
                    text: "Hacked".to_string(),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_failed_update_discards_new_image() {
        let dir = tempfile::tempdir().unwrap();
        let mut post = create_test_post("p1", "u1", None);
        post.image = None;
        // Nothing queued for the UPDATE, so it fails
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[post]])
            .into_connection();
        let author = create_test_user("u1", "alice");

        let result = service_with_media_root(db, dir.path())
            .update(
                &author,
                "p1",
                PostInput {
                    text: "Edited".to_string(),
                    group_id: None,
                    image: gif_upload(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Database(_))));
        assert!(stored_images(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_image_and_removes_old_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(IMAGE_PREFIX)).unwrap();
        std::fs::write(dir.path().join("posts/img.gif"), SMALL_GIF).unwrap();

        let post = create_test_post("p1", "u1", None);
        let mut edited = post.clone();
        edited.text = "Edited".to_string();
        edited.image = Some("posts/new.gif".to_string());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[post]])
            .append_query_results([[edited]])
            .into_connection();
        let author = create_test_user("u1", "alice");

        let updated = service_with_media_root(db, dir.path())
            .update(
                &author,
                "p1",
                PostInput {
                    text: "Edited".to_string(),
                    group_id: None,
                    image: gif_upload(),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, "p1");
        let files = stored_images(dir.path());
        assert_eq!(files.len(), 1);
        assert_ne!(files[0], "img.gif");
        assert!(files[0].ends_with(".gif"));
    }
}
