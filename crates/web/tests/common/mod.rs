//! Fixture builder for HTTP tests.
//!
//! Every test builds its own [`TestApp`]: a fresh in-memory database, a
//! temporary media directory and a router over them.

#![allow(dead_code, clippy::unwrap_used)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, header},
    response::Response,
};
use chrono::Utc;
use sea_orm::{DatabaseConnection, Set};
use tower::ServiceExt;
use yatube_common::{
    Config, LocalStorage,
    config::{DatabaseConfig, MediaConfig, ServerConfig, SiteConfig},
};
use yatube_core::{CreateGroupInput, PostInput};
use yatube_db::entities::{group, post, user};
use yatube_db::repositories::UserRepository;
use yatube_db::test_utils::TestDatabase;
use yatube_web::{AppState, RenderedTemplate, app};

/// A 2x1 GIF.
pub const SMALL_GIF: &[u8] = b"\x47\x49\x46\x38\x39\x61\x02\x00\
    \x01\x00\x80\x00\x00\x00\x00\x00\
    \xFF\xFF\xFF\x21\xF9\x04\x00\x00\
    \x00\x00\x00\x2C\x00\x00\x00\x00\
    \x02\x00\x01\x00\x00\x02\x02\x0C\
    \x0A\x00\x3B";

const BOUNDARY: &str = "yatube-test-boundary";

/// A file part of a multipart submission.
pub struct FilePart<'a> {
    pub field: &'a str,
    pub filename: &'a str,
    pub content_type: &'a str,
    pub data: &'a [u8],
}

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub db: Arc<DatabaseConnection>,
    pub media_root: PathBuf,
    _media_dir: tempfile::TempDir,
}

fn test_config(media_root: PathBuf) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            url: "http://testserver".to_string(),
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            connect_timeout_secs: 5,
            idle_timeout_secs: 60,
            max_lifetime_secs: 60,
        },
        media: MediaConfig {
            root: media_root,
            url: "/media".to_string(),
            max_upload_bytes: 1024 * 1024,
        },
        site: SiteConfig::default(),
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let db = TestDatabase::new().await.unwrap().connection();
        let media_dir = tempfile::tempdir().unwrap();
        let media_root = media_dir.path().to_path_buf();
        let config = test_config(media_root.clone());

        let storage = Arc::new(LocalStorage::new(
            config.media.root.clone(),
            config.media.url.clone(),
        ));
        let state = AppState::new(db.clone(), storage, &config);
        let router = app(state.clone(), &config.media);

        Self {
            state,
            router,
            db,
            media_root,
            _media_dir: media_dir,
        }
    }

    /// Insert a user with a live session and no usable password.
    pub async fn create_user(&self, username: &str) -> user::Model {
        UserRepository::new(self.db.clone())
            .create(user::ActiveModel {
                id: Set(format!("user-{}", username.to_lowercase())),
                username: Set(username.to_string()),
                username_lower: Set(username.to_lowercase()),
                name: Set(None),
                password_hash: Set("!".to_string()),
                token: Set(Some(format!("token-{}", username.to_lowercase()))),
                created_at: Set(Utc::now().into()),
            })
            .await
            .unwrap()
    }

    pub async fn create_group(&self, title: &str, slug: &str) -> group::Model {
        self.state
            .group_service
            .create(CreateGroupInput {
                title: title.to_string(),
                slug: slug.to_string(),
                description: "Test description".to_string(),
            })
            .await
            .unwrap()
    }

    pub async fn create_post(
        &self,
        author: &user::Model,
        text: &str,
        group: Option<&group::Model>,
    ) -> post::Model {
        self.state
            .post_service
            .create(
                author,
                PostInput {
                    text: text.to_string(),
                    group_id: group.map(|g| g.id.clone()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    fn builder(method: &str, uri: &str, as_user: Option<&user::Model>) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match as_user.and_then(|u| u.token.as_deref()) {
            Some(token) => builder.header(header::COOKIE, format!("session={token}")),
            None => builder,
        }
    }

    pub async fn get(&self, uri: &str, as_user: Option<&user::Model>) -> Response {
        self.send(Self::builder("GET", uri, as_user).body(Body::empty()).unwrap())
            .await
    }

    /// GET with a raw cookie header.
    pub async fn get_with_cookie(&self, uri: &str, cookie: &str) -> Response {
        self.send(
            Request::builder()
                .uri(uri)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// POST an `application/x-www-form-urlencoded` body.
    pub async fn post_form(
        &self,
        uri: &str,
        as_user: Option<&user::Model>,
        fields: &[(&str, &str)],
    ) -> Response {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        self.send(
            Self::builder("POST", uri, as_user)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    /// POST a `multipart/form-data` body.
    pub async fn post_multipart(
        &self,
        uri: &str,
        as_user: Option<&user::Model>,
        fields: &[(&str, &str)],
        file: Option<FilePart<'_>>,
    ) -> Response {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some(file) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: {}\r\n\r\n",
                    file.field, file.filename, file.content_type
                )
                .as_bytes(),
            );
            body.extend_from_slice(file.data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        self.send(
            Self::builder("POST", uri, as_user)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }
}

/// Template a response was rendered from.
pub fn template(response: &Response) -> &RenderedTemplate {
    response
        .extensions()
        .get::<RenderedTemplate>()
        .expect("response was not rendered from a template")
}

/// Target of a redirect.
pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("response has no Location header")
        .to_str()
        .unwrap()
}

pub async fn body_bytes(response: Response) -> bytes::Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
}

pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await.to_vec()).unwrap()
}
