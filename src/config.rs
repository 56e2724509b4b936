use std::{env, fmt, path::PathBuf, str::FromStr, time::Duration};

use tracing::{info, warn};

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub bind_addr: String,
    /// Page size shared by every listing.
    pub posts_on_page: usize,
    /// Lifetime of a cached home listing.
    pub index_cache_ttl: Duration,
    pub media_root: PathBuf,
    pub max_upload_bytes: usize,
    pub max_concurrent_requests: usize,
    pub bcrypt_cost: u32,
    /// Optional JSON file of groups to seed the store with.
    pub groups_file: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{key} must be set"),
            ConfigError::Invalid { key, value } => write!(f, "invalid {key} value: {value:?}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Settings with defaults for everything but the signing secret.
    pub fn new(jwt_secret: impl Into<String>, media_root: impl Into<PathBuf>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            bind_addr: "0.0.0.0:3000".into(),
            posts_on_page: 10,
            index_cache_ttl: Duration::from_secs(20),
            media_root: media_root.into(),
            max_upload_bytes: 5 * 1024 * 1024,
            max_concurrent_requests: 1024,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            groups_file: None,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        let mut config = Config::new(jwt_secret, try_load::<String>("MEDIA_ROOT", "media")?);

        config.bind_addr = try_load("BIND_ADDR", "0.0.0.0:3000")?;
        config.posts_on_page = try_load("POSTS_ON_PAGE", "10")?;
        if config.posts_on_page == 0 {
            return Err(ConfigError::Invalid {
                key: "POSTS_ON_PAGE",
                value: "0".into(),
            });
        }
        config.index_cache_ttl = Duration::from_secs(try_load("INDEX_CACHE_SECONDS", "20")?);
        config.max_upload_bytes = try_load("MAX_UPLOAD_BYTES", "5242880")?;
        config.max_concurrent_requests = try_load("MAX_CONCURRENT_REQUESTS", "1024")?;
        config.bcrypt_cost = try_load("BCRYPT_COST", "12")?;
        config.groups_file = env::var("GROUPS_FILE").ok().map(PathBuf::from);

        Ok(config)
    }
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError> {
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse().map_err(|_| {
        warn!("Invalid {key} value: {raw}");
        ConfigError::Invalid { key, value: raw }
    })
}
