use askama::Template;
use axum::{
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use tracing::{error, warn};

use crate::views::NotFoundPage;

#[derive(Debug)]
pub enum ApiError {
    /// Unknown group, user, post, comment or follow relation.
    NotFound,
    /// Guest hit a page that needs a login; carries the path to come back to.
    LoginRequired { next: String },
    BadRequest(String),
    /// A uniqueness rule of the store was violated.
    Conflict(String),
    InternalError(String),
}

pub const LOGIN_URL: &str = "/auth/login/";

/// Login page URL carrying `next`, with slashes left readable.
pub fn login_redirect_url(next: &str) -> String {
    let next = urlencoding::encode(next).replace("%2F", "/");
    format!("{LOGIN_URL}?next={next}")
}

impl From<askama::Error> for ApiError {
    fn from(err: askama::Error) -> Self {
        ApiError::InternalError(format!("Template rendering failed: {}", err))
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::InternalError(format!("I/O failed: {}", err))
    }
}

/// Convert our custom errors to HTTP responses
///
/// Not-found renders the site's 404 page, auth failures become redirects,
/// everything else is a short plain-text body.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => not_found_page(),
            ApiError::LoginRequired { next } => (
                StatusCode::FOUND,
                [(header::LOCATION, login_redirect_url(&next))],
            )
                .into_response(),
            ApiError::BadRequest(msg) => {
                warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, msg).into_response()
            }
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg).into_response(),
            ApiError::InternalError(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

pub fn not_found_page() -> Response {
    match NotFoundPage::default().render() {
        Ok(body) => (StatusCode::NOT_FOUND, Html(body)).into_response(),
        Err(e) => {
            error!("Failed to render 404 page: {}", e);
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
    }
}
