//! Database entities.

pub mod comment;
pub mod follow;
pub mod group;
pub mod post;
pub mod user;

pub use comment::Entity as Comment;
pub use follow::Entity as Follow;
pub use group::Entity as Group;
pub use post::Entity as Post;
pub use user::Entity as User;

/// Shorten free text to its first `max` characters, as used by `Display` impls.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_truncate_chars_counts_characters() {
        assert_eq!(truncate_chars("short", 15), "short");
        assert_eq!(truncate_chars("Текстовый текст поста", 15), "Текстовый текст");
    }

    #[test]
    fn test_post_display_is_text_prefix() {
        let post = post::Model {
            id: "p1".to_string(),
            text: "A long post text that goes on".to_string(),
            author_id: "u1".to_string(),
            group_id: None,
            image: None,
            created_at: Utc::now().into(),
        };
        assert_eq!(post.to_string(), "A long post tex");
    }

    #[test]
    fn test_group_display_is_title() {
        let group = group::Model {
            id: "g1".to_string(),
            title: "Test group".to_string(),
            slug: "test-slug".to_string(),
            description: "Description".to_string(),
            created_at: Utc::now().into(),
        };
        assert_eq!(group.to_string(), "Test group");
    }

    #[test]
    fn test_comment_display_is_text_prefix() {
        let comment = comment::Model {
            id: "c1".to_string(),
            post_id: "p1".to_string(),
            author_id: "u1".to_string(),
            text: "Exactly fifteen".to_string(),
            created_at: Utc::now().into(),
        };
        assert_eq!(comment.to_string(), "Exactly fifteen");
    }

    #[test]
    fn test_user_display_name_falls_back_to_username() {
        let mut user = user::Model {
            id: "u1".to_string(),
            username: "alice".to_string(),
            username_lower: "alice".to_string(),
            name: Some("  ".to_string()),
            password_hash: String::new(),
            token: None,
            created_at: Utc::now().into(),
        };
        assert_eq!(user.display_name(), "alice");
        user.name = Some("Alice Liddell".to_string());
        assert_eq!(user.display_name(), "Alice Liddell");
        assert_eq!(user.to_string(), "alice");
    }
}
