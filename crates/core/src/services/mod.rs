//! Business logic services.

#![allow(missing_docs)]

pub mod comment;
pub mod follow;
pub mod group;
pub mod media;
pub mod post;
pub mod user;

pub use comment::{CommentService, CommentView, CreateCommentInput};
pub use follow::{FollowOutcome, FollowService};
pub use group::{CreateGroupInput, GroupService};
pub use media::{ImageFormat, ImageInfo, MediaService};
pub use post::{ImageChange, ImageUpload, PostInput, PostService, PostView};
pub use user::{CreateUserInput, UserService};

use std::borrow::Cow;

use validator::ValidationError;

/// Rejects text that is empty once surrounding whitespace is removed.
pub(crate) fn validate_not_blank(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some(Cow::Borrowed("This field is required."));
        return Err(err);
    }
    Ok(())
}
