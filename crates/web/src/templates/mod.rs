//! HTML templates.
//!
//! Each template is a function from a typed context to a full HTML page.
//! Rendered responses carry a [`RenderedTemplate`] extension with the
//! template name and its serialized context.

pub mod core;
pub mod posts;
pub mod users;

use std::fmt::Write as _;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;
use yatube_core::Page;
use yatube_db::entities::user;

use crate::forms::FormErrors;
use crate::urls;

/// Name and context of the template a response was rendered from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedTemplate {
    /// Template name, e.g. `posts/index.html`.
    pub name: &'static str,
    /// Template context as JSON.
    pub context: serde_json::Value,
}

impl RenderedTemplate {
    /// Look up a context variable.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.context.get(key)
    }
}

/// Escape text for use in HTML content and attribute values.
#[must_use]
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Escape text and keep its line breaks.
fn linebreaks(s: &str) -> String {
    html_escape(s).replace("\r\n", "\n").replace('\n', "<br>\n")
}

fn render<C: Serialize>(
    status: StatusCode,
    name: &'static str,
    context: &C,
    title: &str,
    viewer: Option<&user::Model>,
    content: &str,
) -> Response {
    let context = serde_json::to_value(context).unwrap_or_else(|e| {
        tracing::warn!(error = %e, template = name, "Failed to serialize template context");
        serde_json::Value::Null
    });

    let mut response = (status, Html(layout(title, viewer, content))).into_response();
    response
        .extensions_mut()
        .insert(RenderedTemplate { name, context });
    response
}

fn layout(title: &str, viewer: Option<&user::Model>, content: &str) -> String {
    let nav = viewer.map_or_else(
        || {
            format!(
                r#"<li><a href="{}">Log in</a></li>
<li><a href="{}">Sign up</a></li>"#,
                urls::LOGIN,
                urls::SIGNUP
            )
        },
        |user| {
            format!(
                r#"<li><a href="{}">New post</a></li>
<li><a href="{}">Subscriptions</a></li>
<li><a href="{}">{}</a></li>
<li><a href="{}">Log out</a></li>"#,
                urls::POST_CREATE,
                urls::FOLLOW_INDEX,
                urls::profile(&user.username),
                html_escape(&user.username),
                urls::LOGOUT
            )
        },
    );

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
</head>
<body>
<header>
<nav>
<a href="/">Yatube</a>
<ul>
{nav}
</ul>
</nav>
</header>
<main>
{content}
</main>
<footer>
<p>Yatube</p>
</footer>
</body>
</html>
"#,
        title = html_escape(title),
    )
}

fn paginator<T>(page: &Page<T>) -> String {
    if !page.has_other_pages() {
        return String::new();
    }

    let mut html = String::from("<nav class=\"pagination\">\n<ul>\n");
    if let Some(previous) = page.previous_page_number() {
        html.push_str("<li><a href=\"?page=1\">First</a></li>\n");
        let _ = writeln!(html, "<li><a href=\"?page={previous}\">Previous</a></li>");
    }
    for number in 1..=page.num_pages {
        if number == page.number {
            let _ = writeln!(html, "<li class=\"active\"><span>{number}</span></li>");
        } else {
            let _ = writeln!(html, "<li><a href=\"?page={number}\">{number}</a></li>");
        }
    }
    if let Some(next) = page.next_page_number() {
        let _ = writeln!(html, "<li><a href=\"?page={next}\">Next</a></li>");
        let _ = writeln!(
            html,
            "<li><a href=\"?page={}\">Last</a></li>",
            page.num_pages
        );
    }
    html.push_str("</ul>\n</nav>\n");
    html
}

fn error_list(errors: &[String]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let items: String = errors
        .iter()
        .map(|e| format!("<li>{}</li>", html_escape(e)))
        .collect();
    format!("<ul class=\"errorlist\">{items}</ul>\n")
}

fn non_field_errors(errors: &FormErrors) -> String {
    error_list(errors.non_field())
}

#[cfg(test)]
mod tests {
    use super::*;
    use yatube_core::Paginator;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_linebreaks() {
        assert_eq!(linebreaks("a<b\nc"), "a&lt;b<br>\nc");
    }

    #[test]
    fn test_paginator_hidden_for_single_page() {
        let page = Page::new(vec![1, 2, 3], 1, Paginator::new(10), 3);
        assert!(paginator(&page).is_empty());
    }

    #[test]
    fn test_paginator_links() {
        let page = Page::new(vec![0; 10], 2, Paginator::new(10), 25);
        let html = paginator(&page);
        assert!(html.contains("href=\"?page=1\""));
        assert!(html.contains("<span>2</span>"));
        assert!(html.contains("href=\"?page=3\">Next"));
    }
}
