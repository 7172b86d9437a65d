//! Post endpoints: listings, detail, create, edit and comments.

use axum::{
    Form, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use yatube_common::AppError;
use yatube_core::CreateCommentInput;
use yatube_db::{entities::user, repositories::PostFilter};

use crate::cache::cache_page;
use crate::error::PageResult;
use crate::extractors::{AuthUser, MaybeAuthUser, PageQuery};
use crate::forms::{CommentForm, PostForm};
use crate::middleware::AppState;
use crate::response::Found;
use crate::templates::posts::{
    self, GroupListContext, IndexContext, PostDetailContext, PostFormContext, ProfileContext,
};
use crate::urls;

/// Multipart framing around the uploaded file.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn router(state: &AppState) -> Router<AppState> {
    let upload_limit = DefaultBodyLimit::max(state.max_upload_bytes + FORM_OVERHEAD_BYTES);

    Router::new()
        .route(
            "/",
            get(index).layer(middleware::from_fn_with_state(
                state.page_cache.clone(),
                cache_page,
            )),
        )
        .route("/group/{slug}/", get(group_posts))
        .route("/profile/{username}/", get(profile))
        .route("/posts/{post_id}/", get(post_detail))
        .route(
            "/create/",
            get(post_create_form)
                .post(post_create)
                .layer(upload_limit.clone()),
        )
        .route(
            "/posts/{post_id}/edit/",
            get(post_edit_form).post(post_edit).layer(upload_limit),
        )
        .route("/posts/{post_id}/comment/", post(add_comment))
}

async fn index(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Query(query): Query<PageQuery>,
) -> PageResult {
    let page_obj = state
        .post_service
        .list(&PostFilter::All, query.page.as_deref())
        .await?;

    Ok(posts::index(&IndexContext { page_obj }, viewer.as_ref()))
}

async fn group_posts(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> PageResult {
    let group = state.group_service.get_by_slug(&slug).await?;
    let page_obj = state
        .post_service
        .list(&PostFilter::Group(group.id.clone()), query.page.as_deref())
        .await?;

    Ok(posts::group_list(
        &GroupListContext { group, page_obj },
        viewer.as_ref(),
    ))
}

async fn profile(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> PageResult {
    let author = state.user_service.get_by_username(&username).await?;
    let page_obj = state
        .post_service
        .list(&PostFilter::Author(author.id.clone()), query.page.as_deref())
        .await?;

    let is_self = viewer.as_ref().is_some_and(|v| v.id == author.id);
    let following = match &viewer {
        Some(v) if !is_self => state.follow_service.is_following(&v.id, &author.id).await?,
        _ => false,
    };
    let (followers_count, following_count) = state.follow_service.counts(&author.id).await?;

    Ok(posts::profile(
        &ProfileContext {
            author,
            page_obj,
            following,
            is_self,
            followers_count,
            following_count,
        },
        viewer.as_ref(),
    ))
}

async fn post_detail(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(post_id): Path<String>,
) -> PageResult {
    let post = state.post_service.get_view(&post_id).await?;
    let comments = state.comment_service.list_for_post(&post_id).await?;

    Ok(posts::post_detail(
        &PostDetailContext {
            post,
            comments,
            form: CommentForm::default(),
        },
        viewer.as_ref(),
    ))
}

async fn render_post_form(
    state: &AppState,
    viewer: &user::Model,
    form: PostForm,
    post_id: Option<String>,
) -> PageResult {
    let groups = state.group_service.list().await?;
    Ok(posts::create_post(
        &PostFormContext {
            form,
            is_edit: post_id.is_some(),
            post_id,
            groups,
        },
        Some(viewer),
    ))
}

async fn post_create_form(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> PageResult {
    render_post_form(&state, &user, PostForm::default(), None).await
}

async fn post_create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    multipart: Multipart,
) -> PageResult {
    let mut form = PostForm::from_multipart(multipart).await?;
    if !form.validate() {
        return render_post_form(&state, &user, form, None).await;
    }

    match state.post_service.create(&user, form.to_input()).await {
        Ok(_) => Ok(Found::to(urls::profile(&user.username)).into_response()),
        Err(AppError::Validation(msg)) => {
            form.add_service_errors(&msg);
            render_post_form(&state, &user, form, None).await
        }
        Err(e) => Err(e.into()),
    }
}

async fn post_edit_form(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
) -> PageResult {
    let view = state.post_service.get_view(&post_id).await?;
    if view.post.author_id != user.id {
        tracing::debug!(post_id = %post_id, user = %user.username, "Edit by non-author");
        return Ok(Found::to(urls::post_detail(&post_id)).into_response());
    }

    let form = PostForm::for_post(&view);
    render_post_form(&state, &user, form, Some(post_id)).await
}

async fn post_edit(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
    multipart: Multipart,
) -> PageResult {
    let view = state.post_service.get_view(&post_id).await?;
    if view.post.author_id != user.id {
        tracing::warn!(post_id = %post_id, user = %user.username, "Rejected edit by non-author");
        return Ok(Found::to(urls::post_detail(&post_id)).into_response());
    }

    let mut form = PostForm::from_multipart(multipart).await?;
    form.current_image.clone_from(&view.image_url);
    if !form.validate() {
        return render_post_form(&state, &user, form, Some(post_id)).await;
    }

    match state.post_service.update(&user, &post_id, form.to_input()).await {
        Ok(_) => Ok(Found::to(urls::post_detail(&post_id)).into_response()),
        Err(AppError::Validation(msg)) => {
            form.add_service_errors(&msg);
            render_post_form(&state, &user, form, Some(post_id)).await
        }
        Err(AppError::Forbidden(_)) => Ok(Found::to(urls::post_detail(&post_id)).into_response()),
        Err(e) => Err(e.into()),
    }
}

async fn add_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
    Form(form): Form<CommentForm>,
) -> PageResult {
    let input = CreateCommentInput { text: form.text };
    match state.comment_service.add(&post_id, &user, input).await {
        Ok(_) => {}
        Err(AppError::Validation(msg)) => {
            tracing::debug!(post_id = %post_id, reason = %msg, "Comment rejected");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(Found::to(urls::post_detail(&post_id)).into_response())
}
