pub mod auth;
pub mod cache;
pub mod config;
pub mod dto;
pub mod errors;
pub mod media;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod states;
pub mod store;
pub mod views;

pub use states::AppState;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{services::ServeDir, trace::TraceLayer};

use routes::{about, group, health, post as posts, profile, user};

/// Builds the full application router.
pub fn app(state: AppState) -> Router {
    let media = ServeDir::new(&state.config.media_root);
    let body_limit = state.config.max_upload_bytes;
    let concurrency = state.config.max_concurrent_requests;

    Router::new()
        // Listings
        .route("/", get(posts::index))
        .route("/group/{slug}/", get(group::group_posts))
        .route("/profile/{username}/", get(profile::profile))
        .route("/follow/", get(profile::follow_index))
        // Posts and comments
        .route("/create/", get(posts::post_create_form).post(posts::post_create))
        .route("/posts/{id}/", get(posts::post_detail))
        .route("/posts/{id}/edit/", get(posts::post_edit_form).post(posts::post_edit))
        .route("/posts/{id}/delete/", post(posts::post_delete))
        .route("/posts/{id}/comment/", post(posts::add_comment))
        // Following
        .route(
            "/profile/{username}/follow/",
            get(profile::profile_follow).post(profile::profile_follow),
        )
        .route(
            "/profile/{username}/unfollow/",
            get(profile::profile_unfollow).post(profile::profile_unfollow),
        )
        // Accounts
        .route("/auth/signup/", get(user::signup_form).post(user::signup))
        .route("/auth/login/", get(user::login_form).post(user::login))
        .route("/auth/logout/", get(user::logout).post(user::logout))
        // Static pages
        .route("/about/author/", get(about::author))
        .route("/about/tech/", get(about::tech))
        .route("/health", get(health::health_check))
        .nest_service("/media", media)
        .fallback(routes::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(ConcurrencyLimitLayer::new(concurrency))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
