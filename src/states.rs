use crate::{cache::ListingCache, config::Config, store::Store};
use std::sync::Arc;

// ============================================================================
// APPLICATION STATE - Shared data across all requests
// ============================================================================
/// Cloned into every handler. The store and the listing cache are the only
/// state shared between requests.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub cache: Arc<ListingCache>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            store: Store::new(),
            cache: Arc::new(ListingCache::new(config.index_cache_ttl)),
            config: Arc::new(config),
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt_secret
    }
}
