//! Repositories: typed data access over the entities.

mod comment;
mod follow;
mod group;
mod post;
mod user;

pub use comment::CommentRepository;
pub use follow::FollowRepository;
pub use group::GroupRepository;
pub use post::{PostFilter, PostRepository};
pub use user::UserRepository;

use sea_orm::{DbErr, SqlErr};
use yatube_common::AppError;

/// Map a write error, turning unique-constraint violations into [`AppError::Conflict`].
pub(crate) fn map_write_err(err: DbErr, conflict: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            tracing::debug!(detail = %detail, "Unique constraint violated");
            AppError::Conflict(conflict.to_string())
        }
        _ => AppError::Database(err.to_string()),
    }
}
