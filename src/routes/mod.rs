pub mod about;
pub mod group;
pub mod health;
pub mod post;
pub mod profile;
pub mod user;

use askama::Template;
use axum::{
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};

use crate::errors::{ApiError, not_found_page};

/// 302 to `location`.
pub fn redirect(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

pub fn render(page: impl Template) -> Result<Response, ApiError> {
    Ok(Html(page.render()?).into_response())
}

/// Numeric path segment; anything else is an unknown object.
pub fn parse_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

pub fn post_url(id: u64) -> String {
    format!("/posts/{id}/")
}

pub fn profile_url(username: &str) -> String {
    format!("/profile/{username}/")
}

/// Fallback for every path no route matches.
pub async fn not_found() -> Response {
    not_found_page()
}
