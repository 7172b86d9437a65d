//! Sign-up, login and logout.

use axum::{
    Form, Router,
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use yatube_common::AppError;
use yatube_core::CreateUserInput;
use yatube_db::entities::user;

use crate::error::PageResult;
use crate::extractors::{MaybeAuthUser, NextQuery};
use crate::forms::{FormErrors, LoginForm, NON_FIELD_ERRORS, SignupForm};
use crate::middleware::{AppState, SESSION_COOKIE};
use crate::response::Found;
use crate::templates::users::{self, LoggedOutContext, LoginContext, SignupContext};
use crate::urls;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup/", get(signup_form).post(signup))
        .route("/login/", get(login_form).post(login))
        .route("/logout/", get(logout))
}

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.secure_cookies)
        .build()
}

fn start_session(state: &AppState, jar: CookieJar, user: &user::Model) -> PageResult<CookieJar> {
    let token = user
        .token
        .clone()
        .ok_or_else(|| AppError::Internal(format!("User {} has no session token", user.id)))?;
    Ok(jar.add(session_cookie(state, token)))
}

async fn signup_form(MaybeAuthUser(viewer): MaybeAuthUser) -> PageResult {
    Ok(users::signup(
        &SignupContext {
            form: SignupForm::default(),
        },
        viewer.as_ref(),
    ))
}

async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(mut form): Form<SignupForm>,
) -> PageResult {
    if !form.validate() {
        return Ok(users::signup(&SignupContext { form }, None));
    }

    let name = Some(form.name.trim().to_string()).filter(|n| !n.is_empty());
    let input = CreateUserInput {
        username: form.username.trim().to_string(),
        password: form.password.clone(),
        name,
    };

    match state.user_service.create(input).await {
        Ok(user) => {
            let jar = start_session(&state, jar, &user)?;
            Ok((jar, Found::to(urls::INDEX)).into_response())
        }
        Err(AppError::Validation(msg)) => {
            form.errors = FormErrors::from_validation(&msg, &SignupForm::FIELDS);
            Ok(users::signup(&SignupContext { form }, None))
        }
        Err(AppError::Conflict(_)) => {
            form.errors
                .add("username", "A user with that username already exists.");
            Ok(users::signup(&SignupContext { form }, None))
        }
        Err(e) => Err(e.into()),
    }
}

async fn login_form(
    MaybeAuthUser(viewer): MaybeAuthUser,
    Query(query): Query<NextQuery>,
) -> PageResult {
    let form = LoginForm {
        next: query.next,
        ..LoginForm::default()
    };
    Ok(users::login(&LoginContext { form }, viewer.as_ref()))
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(mut form): Form<LoginForm>,
) -> PageResult {
    if !form.validate() {
        return Ok(users::login(&LoginContext { form }, None));
    }

    match state
        .user_service
        .authenticate(form.username.trim(), &form.password)
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = %user.id, username = %user.username, "Logged in");
            let jar = start_session(&state, jar, &user)?;
            let next = urls::safe_next(form.next.as_deref()).to_string();
            Ok((jar, Found::to(next)).into_response())
        }
        Err(AppError::Unauthorized) => {
            tracing::debug!(username = %form.username, "Login failed");
            form.errors.add(NON_FIELD_ERRORS, LoginForm::INVALID_LOGIN);
            Ok(users::login(&LoginContext { form }, None))
        }
        Err(e) => Err(e.into()),
    }
}

async fn logout(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    jar: CookieJar,
) -> PageResult {
    if let Some(user) = viewer {
        // A new token invalidates every copy of the old cookie
        state.user_service.regenerate_token(&user.id).await?;
        tracing::info!(user_id = %user.id, username = %user.username, "Logged out");
    }

    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/"));
    Ok((jar, users::logged_out(&LoggedOutContext::default())).into_response())
}
