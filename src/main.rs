// ============================================================================
// YATUBE - BLOG-STYLE PUBLISHING SERVICE
// ============================================================================

// - Posts with optional group and image
// - Comments on posts
// - Following authors and a personal feed
// - Paginated listings, cached home page
// - Cookie/JWT sessions with bcrypt passwords

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use yatube::{AppState, app, config::Config};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("yatube=info,tower_http=info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env().expect("Configuration is invalid");
    let addr = config.bind_addr.clone();
    let state = AppState::new(config);

    if let Some(path) = state.config.groups_file.clone() {
        match state.store.seed_groups_from_file(&path) {
            Ok(added) => info!("Seeded {} groups from {}", added, path.display()),
            Err(e) => warn!("Could not seed groups from {}: {:?}", path.display(), e),
        }
    }

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listen address");

    info!("Server running on http://{}", addr);
    info!("Pages:");
    info!("  GET      /                            - Latest posts (cached)");
    info!("  GET      /group/{{slug}}/               - Posts in a group");
    info!("  GET      /profile/{{username}}/         - Author profile");
    info!("  GET      /posts/{{id}}/                 - Post with comments");
    info!("  GET/POST /create/                     - New post (auth)");
    info!("  GET/POST /posts/{{id}}/edit/            - Edit post (auth, owner only)");
    info!("  POST     /posts/{{id}}/comment/         - Comment (auth)");
    info!("  GET      /follow/                     - Followed authors feed (auth)");
    info!("  GET      /profile/{{username}}/follow/  - Follow (auth)");
    info!("  GET      /profile/{{username}}/unfollow/ - Unfollow (auth)");

    axum::serve(listener, app(state))
        .await
        .expect("Server error");
}
