use crate::{
    AppState,
    auth::{Actor, CurrentUser},
    errors::ApiError,
    pagination::{Page, PageQuery},
    views::{FollowPage, PostView, ProfilePage},
};
use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use tracing::info;

use super::{profile_url, redirect, render};

/// GET /profile/{username}/
pub async fn profile(
    State(state): State<AppState>,
    actor: Actor,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let author = state.store.user_by_username(&username).ok_or(ApiError::NotFound)?;

    let following = actor
        .user()
        .is_some_and(|viewer| viewer.id != author.id && state.store.is_following(&viewer.id, &author.id));
    let page = Page::new(
        state.store.posts_by_author(&author.id),
        query.number(),
        state.config.posts_on_page,
    );

    render(ProfilePage::new(
        actor.user(),
        &author,
        following,
        PostView::page(&state.store, page),
    ))
}

/// GET /follow/
/// Posts by every author the current user follows.
pub async fn follow_index(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let page = Page::new(state.store.feed(&user.id), query.number(), state.config.posts_on_page);

    render(FollowPage {
        viewer: Some(user.username),
        page: PostView::page(&state.store, page),
    })
}

/// GET|POST /profile/{username}/follow/
///
/// Creates the relation unless it exists or the target is the requester.
pub async fn profile_follow(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(username): Path<String>,
) -> Result<Response, ApiError> {
    let author = state.store.user_by_username(&username).ok_or(ApiError::NotFound)?;

    if author.id != user.id {
        let (_, created) = state.store.get_or_create_follow(user.id, author.id);
        if created {
            info!("{} now follows {}", user.username, author.username);
        }
    }

    Ok(redirect(&profile_url(&author.username)))
}

/// GET|POST /profile/{username}/unfollow/
/// 404 when the user was not following `username`.
pub async fn profile_unfollow(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(username): Path<String>,
) -> Result<Response, ApiError> {
    let author = state.store.user_by_username(&username).ok_or(ApiError::NotFound)?;
    state.store.delete_follow(&user.id, &author.id)?;

    info!("{} unfollowed {}", user.username, author.username);

    Ok(redirect(&profile_url(&username)))
}
