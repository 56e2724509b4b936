use crate::{
    AppState,
    auth::{Actor, CurrentUser},
    cache::ListingCache,
    dto::{CommentForm, FormData, PostForm},
    errors::ApiError,
    media::save_post_image,
    pagination::{Page, PageQuery},
    views::{CommentView, IndexPage, PostDetailPage, PostFormPage, PostFormView, PostView},
};
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::Uri,
    response::{Html, IntoResponse, Response},
};
use tracing::{debug, info, warn};
use validator::Validate;

use super::{parse_id, post_url, profile_url, redirect, render};

/// GET /?page=N
///
/// Served from the listing cache when a fresh copy exists; new posts do not
/// evict it.
pub async fn index(
    State(state): State<AppState>,
    actor: Actor,
    uri: Uri,
    Query(query): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let key = ListingCache::key(&uri.to_string(), actor.username());
    if let Some(body) = state.cache.get(&key).await {
        return Ok(Html(body).into_response());
    }

    let page = Page::new(state.store.posts(), query.number(), state.config.posts_on_page);
    let body = IndexPage {
        viewer: actor.username().map(str::to_owned),
        page: PostView::page(&state.store, page),
    }
    .render()?;

    state.cache.set(key, body.clone()).await;
    Ok(Html(body).into_response())
}

/// GET /posts/{id}/
pub async fn post_detail(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let post = state.store.post(parse_id(&id)?).ok_or(ApiError::NotFound)?;

    let author_post_count = state.store.posts_by_author(&post.author_id).len();
    let comments = Page::new(
        state.store.comments_for(post.id),
        query.number(),
        state.config.posts_on_page,
    )
    .map(|c| CommentView::build(&state.store, c));

    render(PostDetailPage {
        viewer: actor.username().map(str::to_owned),
        can_edit: actor.is(&post.author_id),
        author_post_count,
        post: PostView::build(&state.store, post),
        page: comments,
    })
}

/// GET /create/
pub async fn post_create_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Response, ApiError> {
    render(PostFormPage {
        viewer: Some(user.username),
        post_id: None,
        form: PostFormView::blank(&state.store),
    })
}

/// POST /create/
/// Body: text, group, image (multipart or urlencoded)
pub async fn post_create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    data: FormData,
) -> Result<Response, ApiError> {
    let clean = match PostForm::from_data(data).clean(&state.store) {
        Ok(clean) => clean,
        Err((form, errors)) => {
            debug!("Rejected post form from {}: {:?}", user.username, errors);
            return render(PostFormPage {
                viewer: Some(user.username),
                post_id: None,
                form: PostFormView::rejected(&state.store, form, None, errors),
            });
        }
    };

    let image = match &clean.image {
        Some(file) => Some(save_post_image(&state.config.media_root, file).await?),
        None => None,
    };
    let post = state.store.create_post(user.id, clean.text, clean.group_id, image);

    info!("Post created: {} \"{}\" by user {}", post.id, post.preview(), user.username);

    Ok(redirect(&profile_url(&user.username)))
}

/// GET /posts/{id}/edit/
pub async fn post_edit_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let post = state.store.post(parse_id(&id)?).ok_or(ApiError::NotFound)?;

    if post.author_id != user.id {
        return Ok(redirect(&post_url(post.id)));
    }

    render(PostFormPage {
        viewer: Some(user.username),
        post_id: Some(post.id),
        form: PostFormView::for_post(&state.store, &post),
    })
}

/// POST /posts/{id}/edit/
///
/// Only the author may edit; anyone else is sent back to the post untouched.
pub async fn post_edit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    data: FormData,
) -> Result<Response, ApiError> {
    let post = state.store.post(parse_id(&id)?).ok_or(ApiError::NotFound)?;

    if post.author_id != user.id {
        warn!("User {} tried to edit post {} they do not own", user.username, post.id);
        return Ok(redirect(&post_url(post.id)));
    }

    let clean = match PostForm::from_data(data).clean(&state.store) {
        Ok(clean) => clean,
        Err((form, errors)) => {
            return render(PostFormPage {
                viewer: Some(user.username),
                post_id: Some(post.id),
                form: PostFormView::rejected(&state.store, form, post.image, errors),
            });
        }
    };

    let image = match (&clean.image, clean.clear_image) {
        (Some(file), _) => Some(save_post_image(&state.config.media_root, file).await?),
        (None, true) => None,
        (None, false) => post.image,
    };
    state.store.update_post(post.id, clean.text, clean.group_id, image)?;

    info!("Post edited: {} by user {}", post.id, user.username);

    Ok(redirect(&post_url(post.id)))
}

/// POST /posts/{id}/delete/
pub async fn post_delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let post = state.store.post(parse_id(&id)?).ok_or(ApiError::NotFound)?;

    // Check ownership
    if post.author_id != user.id {
        return Ok(redirect(&post_url(post.id)));
    }

    state.store.delete_post(post.id)?;

    info!("Post deleted: {} by user {}", post.id, user.username);

    Ok(redirect(&profile_url(&user.username)))
}

/// POST /posts/{id}/comment/
///
/// An invalid comment is dropped silently; either way the user lands back
/// on the post.
pub async fn add_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    data: FormData,
) -> Result<Response, ApiError> {
    let post_id = parse_id(&id)?;
    let form = CommentForm {
        text: data.text("text"),
    };

    if form.validate().is_ok() {
        let comment = state.store.create_comment(post_id, user.id, form.text)?;
        info!("Comment {} added to post {} by {}", comment.id, post_id, user.username);
    }

    Ok(redirect(&post_url(post_id)))
}
