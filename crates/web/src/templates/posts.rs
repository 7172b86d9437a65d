//! Post pages: listings, detail and the post form.

use std::fmt::Write as _;

use axum::{http::StatusCode, response::Response};
use serde::Serialize;
use yatube_core::{CommentView, Page, PostView};
use yatube_db::entities::{group, user};

use super::{error_list, html_escape, linebreaks, non_field_errors, paginator, render};
use crate::forms::{CommentForm, PostForm};
use crate::urls;

/// Context of `posts/index.html`.
#[derive(Debug, Serialize)]
pub struct IndexContext {
    pub page_obj: Page<PostView>,
}

/// Context of `posts/group_list.html`.
#[derive(Debug, Serialize)]
pub struct GroupListContext {
    pub group: group::Model,
    pub page_obj: Page<PostView>,
}

/// Context of `posts/profile.html`.
#[derive(Debug, Serialize)]
pub struct ProfileContext {
    pub author: user::Model,
    pub page_obj: Page<PostView>,
    /// Whether the viewer follows this author.
    pub following: bool,
    /// Whether the viewer is this author.
    pub is_self: bool,
    pub followers_count: u64,
    pub following_count: u64,
}

/// Context of `posts/post_detail.html`.
#[derive(Debug, Serialize)]
pub struct PostDetailContext {
    pub post: PostView,
    pub comments: Vec<CommentView>,
    pub form: CommentForm,
}

/// Context of `posts/create_post.html`, shared by create and edit.
#[derive(Debug, Serialize)]
pub struct PostFormContext {
    pub form: PostForm,
    pub is_edit: bool,
    pub post_id: Option<String>,
    /// Choices for the group field.
    pub groups: Vec<group::Model>,
}

/// Context of `posts/follow.html`.
#[derive(Debug, Serialize)]
pub struct FollowContext {
    pub page_obj: Page<PostView>,
}

fn post_card(view: &PostView, show_group_link: bool) -> String {
    let mut html = String::from("<article class=\"post\">\n<ul>\n");
    let _ = writeln!(
        html,
        "<li>Author: <a href=\"{}\">{}</a></li>",
        urls::profile(&view.author.username),
        html_escape(view.author.display_name())
    );
    let _ = writeln!(
        html,
        "<li>Date: {}</li>",
        view.post.created_at.format("%d %b %Y")
    );
    html.push_str("</ul>\n");
    if let Some(url) = &view.image_url {
        let _ = writeln!(html, "<img src=\"{}\" alt=\"\">", html_escape(url));
    }
    let _ = writeln!(html, "<p>{}</p>", linebreaks(&view.post.text));
    let _ = writeln!(
        html,
        "<a href=\"{}\">Details</a>",
        urls::post_detail(&view.post.id)
    );
    if show_group_link && let Some(group) = &view.group {
        let _ = writeln!(
            html,
            "<br><a href=\"{}\">All posts of the group {}</a>",
            urls::group(&group.slug),
            html_escape(&group.title)
        );
    }
    html.push_str("</article>\n<hr>\n");
    html
}

fn post_list(page: &Page<PostView>, show_group_link: bool) -> String {
    let mut html: String = page
        .items
        .iter()
        .map(|view| post_card(view, show_group_link))
        .collect();
    html.push_str(&paginator(page));
    html
}

/// `posts/index.html`
#[must_use]
pub fn index(ctx: &IndexContext, viewer: Option<&user::Model>) -> Response {
    let content = format!(
        "<h1>Latest updates on the site</h1>\n{}",
        post_list(&ctx.page_obj, true)
    );
    render(
        StatusCode::OK,
        "posts/index.html",
        ctx,
        "Yatube home page",
        viewer,
        &content,
    )
}

/// `posts/group_list.html`
#[must_use]
pub fn group_list(ctx: &GroupListContext, viewer: Option<&user::Model>) -> Response {
    let content = format!(
        "<h1>{}</h1>\n<p>{}</p>\n{}",
        html_escape(&ctx.group.title),
        linebreaks(&ctx.group.description),
        post_list(&ctx.page_obj, false)
    );
    render(
        StatusCode::OK,
        "posts/group_list.html",
        ctx,
        &format!("Posts of the group {}", ctx.group.title),
        viewer,
        &content,
    )
}

/// `posts/profile.html`
#[must_use]
pub fn profile(ctx: &ProfileContext, viewer: Option<&user::Model>) -> Response {
    let author = &ctx.author;
    let mut content = format!(
        "<h1>All posts of {}</h1>\n<h3>Total posts: {}</h3>\n<p>Followers: {} · Following: {}</p>\n",
        html_escape(author.display_name()),
        ctx.page_obj.count,
        ctx.followers_count,
        ctx.following_count
    );
    if viewer.is_some() && !ctx.is_self {
        if ctx.following {
            let _ = writeln!(
                content,
                "<a class=\"button\" href=\"{}\">Unsubscribe</a>",
                urls::profile_unfollow(&author.username)
            );
        } else {
            let _ = writeln!(
                content,
                "<a class=\"button\" href=\"{}\">Subscribe</a>",
                urls::profile_follow(&author.username)
            );
        }
    }
    content.push_str(&post_list(&ctx.page_obj, true));

    render(
        StatusCode::OK,
        "posts/profile.html",
        ctx,
        &format!("Profile of {}", author.display_name()),
        viewer,
        &content,
    )
}

/// `posts/post_detail.html`
#[must_use]
pub fn post_detail(ctx: &PostDetailContext, viewer: Option<&user::Model>) -> Response {
    let view = &ctx.post;
    let mut content = String::from("<article class=\"post-detail\">\n<ul>\n");
    let _ = writeln!(
        content,
        "<li>Date: {}</li>",
        view.post.created_at.format("%d %b %Y %H:%M")
    );
    if let Some(group) = &view.group {
        let _ = writeln!(
            content,
            "<li>Group: <a href=\"{}\">{}</a></li>",
            urls::group(&group.slug),
            html_escape(&group.title)
        );
    }
    let _ = writeln!(
        content,
        "<li>Author: <a href=\"{}\">{}</a></li>",
        urls::profile(&view.author.username),
        html_escape(view.author.display_name())
    );
    content.push_str("</ul>\n");
    if let Some(url) = &view.image_url {
        let _ = writeln!(content, "<img src=\"{}\" alt=\"\">", html_escape(url));
    }
    let _ = writeln!(content, "<p>{}</p>", linebreaks(&view.post.text));
    if viewer.is_some_and(|v| v.id == view.post.author_id) {
        let _ = writeln!(
            content,
            "<a class=\"button\" href=\"{}\">Edit post</a>",
            urls::post_edit(&view.post.id)
        );
    }
    content.push_str("</article>\n");

    if viewer.is_some() {
        let _ = write!(
            content,
            "<section class=\"comment-form\">\n<h5>Add a comment:</h5>\n\
             <form method=\"post\" action=\"{}\">\n\
             <label for=\"id_text\">{}</label>\n{}\
             <textarea name=\"text\" id=\"id_text\" required>{}</textarea>\n\
             <button type=\"submit\">Send</button>\n</form>\n</section>\n",
            urls::add_comment(&view.post.id),
            CommentForm::TEXT_LABEL,
            error_list(ctx.form.errors.field("text")),
            html_escape(&ctx.form.text)
        );
    }

    content.push_str("<section class=\"comments\">\n");
    for item in &ctx.comments {
        let _ = writeln!(
            content,
            "<div class=\"comment\">\n<h5><a href=\"{}\">{}</a></h5>\n<p>{}</p>\n</div>",
            urls::profile(&item.author.username),
            html_escape(&item.author.username),
            linebreaks(&item.comment.text)
        );
    }
    content.push_str("</section>");

    render(
        StatusCode::OK,
        "posts/post_detail.html",
        ctx,
        &format!("Post {}", view.post),
        viewer,
        &content,
    )
}

/// `posts/create_post.html`
///
/// Re-rendered with status 200 when the submission has errors.
#[must_use]
pub fn create_post(ctx: &PostFormContext, viewer: Option<&user::Model>) -> Response {
    let form = &ctx.form;
    let (heading, button) = if ctx.is_edit {
        ("Edit post", "Save")
    } else {
        ("New post", "Add")
    };

    let mut group_options = String::from("<option value=\"\">---------</option>\n");
    for group in &ctx.groups {
        let selected = if form.group.as_deref() == Some(group.id.as_str()) {
            " selected"
        } else {
            ""
        };
        let _ = writeln!(
            group_options,
            "<option value=\"{}\"{selected}>{}</option>",
            html_escape(&group.id),
            html_escape(&group.title)
        );
    }

    let current_image = form
        .current_image
        .as_deref()
        .map(|url| {
            format!(
                "<p>Currently: <a href=\"{0}\">{0}</a>\n\
                 <input type=\"checkbox\" name=\"image-clear\" id=\"image-clear_id\">\n\
                 <label for=\"image-clear_id\">Clear</label></p>\n",
                html_escape(url)
            )
        })
        .unwrap_or_default();

    let content = format!(
        "<h1>{heading}</h1>\n{non_field}\
         <form method=\"post\" enctype=\"multipart/form-data\">\n\
         <div class=\"field\">\n<label for=\"id_text\">{text_label}</label>\n{text_errors}\
         <textarea name=\"text\" id=\"id_text\" required>{text}</textarea>\n\
         <small>{text_help}</small>\n</div>\n\
         <div class=\"field\">\n<label for=\"id_group\">{group_label}</label>\n{group_errors}\
         <select name=\"group\" id=\"id_group\">\n{group_options}</select>\n\
         <small>{group_help}</small>\n</div>\n\
         <div class=\"field\">\n<label for=\"id_image\">{image_label}</label>\n{image_errors}\
         {current_image}<input type=\"file\" name=\"image\" id=\"id_image\" accept=\"image/*\">\n</div>\n\
         <button type=\"submit\">{button}</button>\n</form>",
        non_field = non_field_errors(&form.errors),
        text_label = PostForm::TEXT_LABEL,
        text_errors = error_list(form.errors.field("text")),
        text = html_escape(&form.text),
        text_help = PostForm::TEXT_HELP,
        group_label = PostForm::GROUP_LABEL,
        group_errors = error_list(form.errors.field("group")),
        group_help = PostForm::GROUP_HELP,
        image_label = PostForm::IMAGE_LABEL,
        image_errors = error_list(form.errors.field("image")),
    );

    render(
        StatusCode::OK,
        "posts/create_post.html",
        ctx,
        heading,
        viewer,
        &content,
    )
}

/// `posts/follow.html`
#[must_use]
pub fn follow(ctx: &FollowContext, viewer: Option<&user::Model>) -> Response {
    let content = format!(
        "<h1>Posts of the authors you follow</h1>\n{}",
        post_list(&ctx.page_obj, true)
    );
    render(
        StatusCode::OK,
        "posts/follow.html",
        ctx,
        "Subscriptions",
        viewer,
        &content,
    )
}
