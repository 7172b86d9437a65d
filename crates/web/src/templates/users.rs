//! Authentication pages.

use axum::{http::StatusCode, response::Response};
use serde::Serialize;
use yatube_db::entities::user;

use super::{error_list, html_escape, non_field_errors, render};
use crate::forms::{LoginForm, SignupForm};
use crate::urls;

/// Context of `users/login.html`.
#[derive(Debug, Serialize)]
pub struct LoginContext {
    pub form: LoginForm,
}

/// Context of `users/signup.html`.
#[derive(Debug, Serialize)]
pub struct SignupContext {
    pub form: SignupForm,
}

/// Context of `users/logged_out.html`.
#[derive(Debug, Default, Serialize)]
pub struct LoggedOutContext {}

fn text_input(name: &str, label: &str, input_type: &str, value: &str, errors: &[String]) -> String {
    format!(
        "<div class=\"field\">\n<label for=\"id_{name}\">{label}</label>\n{errors}\
         <input type=\"{input_type}\" name=\"{name}\" id=\"id_{name}\" value=\"{value}\">\n</div>\n",
        errors = error_list(errors),
        value = html_escape(value),
    )
}

/// `users/login.html`
#[must_use]
pub fn login(ctx: &LoginContext, viewer: Option<&user::Model>) -> Response {
    let form = &ctx.form;
    let next = form
        .next
        .as_deref()
        .map(|next| {
            format!(
                "<input type=\"hidden\" name=\"next\" value=\"{}\">\n",
                html_escape(next)
            )
        })
        .unwrap_or_default();

    let content = format!(
        "<h1>Log in</h1>\n{non_field}<form method=\"post\" action=\"{action}\">\n{next}{username}{password}\
         <button type=\"submit\">Log in</button>\n</form>\n\
         <p><a href=\"{signup}\">Sign up</a></p>",
        non_field = non_field_errors(&form.errors),
        action = urls::LOGIN,
        username = text_input(
            "username",
            "Username",
            "text",
            &form.username,
            form.errors.field("username")
        ),
        password = text_input(
            "password",
            "Password",
            "password",
            "",
            form.errors.field("password")
        ),
        signup = urls::SIGNUP,
    );

    render(StatusCode::OK, "users/login.html", ctx, "Log in", viewer, &content)
}

/// `users/signup.html`
#[must_use]
pub fn signup(ctx: &SignupContext, viewer: Option<&user::Model>) -> Response {
    let form = &ctx.form;
    let content = format!(
        "<h1>Sign up</h1>\n{non_field}<form method=\"post\" action=\"{action}\">\n\
         {username}{name}{password}{password_confirm}\
         <button type=\"submit\">Sign up</button>\n</form>",
        non_field = non_field_errors(&form.errors),
        action = urls::SIGNUP,
        username = text_input(
            "username",
            "Username",
            "text",
            &form.username,
            form.errors.field("username")
        ),
        name = text_input("name", "Name", "text", &form.name, form.errors.field("name")),
        password = text_input(
            "password",
            "Password",
            "password",
            "",
            form.errors.field("password")
        ),
        password_confirm = text_input(
            "password_confirm",
            "Password confirmation",
            "password",
            "",
            form.errors.field("password_confirm")
        ),
    );

    render(StatusCode::OK, "users/signup.html", ctx, "Sign up", viewer, &content)
}

/// `users/logged_out.html`
#[must_use]
pub fn logged_out(ctx: &LoggedOutContext) -> Response {
    let content = format!(
        "<h1>You have logged out</h1>\n<p><a href=\"{}\">Log in again</a></p>",
        urls::LOGIN
    );
    render(
        StatusCode::OK,
        "users/logged_out.html",
        ctx,
        "Logged out",
        None,
        &content,
    )
}
