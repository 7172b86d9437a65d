//! URL construction for every page the site links to.

/// Home page.
pub const INDEX: &str = "/";
/// New post form.
pub const POST_CREATE: &str = "/create/";
/// Feed of followed authors.
pub const FOLLOW_INDEX: &str = "/follow/";
/// Login form.
pub const LOGIN: &str = "/auth/login/";
/// Sign-up form.
pub const SIGNUP: &str = "/auth/signup/";
/// Logout.
pub const LOGOUT: &str = "/auth/logout/";

/// Group listing.
#[must_use]
pub fn group(slug: &str) -> String {
    format!("/group/{}/", urlencoding::encode(slug))
}

/// Author profile.
#[must_use]
pub fn profile(username: &str) -> String {
    format!("/profile/{}/", urlencoding::encode(username))
}

/// Follow an author.
#[must_use]
pub fn profile_follow(username: &str) -> String {
    format!("/profile/{}/follow/", urlencoding::encode(username))
}

/// Unfollow an author.
#[must_use]
pub fn profile_unfollow(username: &str) -> String {
    format!("/profile/{}/unfollow/", urlencoding::encode(username))
}

/// Post detail.
#[must_use]
pub fn post_detail(post_id: &str) -> String {
    format!("/posts/{post_id}/")
}

/// Post edit form.
#[must_use]
pub fn post_edit(post_id: &str) -> String {
    format!("/posts/{post_id}/edit/")
}

/// Comment submission.
#[must_use]
pub fn add_comment(post_id: &str) -> String {
    format!("/posts/{post_id}/comment/")
}

/// Login page that returns to `next` afterwards.
///
/// Slashes in `next` stay literal: `/auth/login/?next=/create/`.
#[must_use]
pub fn login_with_next(next: &str) -> String {
    format!("{LOGIN}?next={}", urlencoding::encode(next).replace("%2F", "/"))
}

/// `next` if it is a local path, otherwise the home page.
#[must_use]
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') =>
        {
            path
        }
        _ => INDEX,
    }
}
