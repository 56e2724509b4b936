use axum::response::Response;

use super::render;
use crate::{
    auth::Actor,
    errors::ApiError,
    views::{AboutAuthorPage, AboutTechPage},
};

/// GET /about/author/
pub async fn author(actor: Actor) -> Result<Response, ApiError> {
    render(AboutAuthorPage {
        viewer: actor.username().map(str::to_owned),
    })
}

/// GET /about/tech/
pub async fn tech(actor: Actor) -> Result<Response, ApiError> {
    render(AboutTechPage {
        viewer: actor.username().map(str::to_owned),
    })
}
