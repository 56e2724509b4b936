use axum::{
    extract::{Path, Query, State},
    response::Response,
};

use super::render;
use crate::{
    AppState,
    auth::Actor,
    errors::ApiError,
    pagination::{Page, PageQuery},
    views::{GroupPage, PostView},
};

/// GET /group/{slug}/
pub async fn group_posts(
    State(state): State<AppState>,
    actor: Actor,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let group = state.store.group_by_slug(&slug).ok_or(ApiError::NotFound)?;
    let posts = state.store.posts_in_group(group.id);
    let page = Page::new(posts, query.number(), state.config.posts_on_page);

    render(GroupPage {
        viewer: actor.username().map(str::to_owned),
        page: PostView::page(&state.store, page),
        group,
    })
}
