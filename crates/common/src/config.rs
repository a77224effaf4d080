//! Application configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Uploaded media configuration.
    #[serde(default)]
    pub media: MediaConfig,
    /// Field limits used by validators.
    #[serde(default)]
    pub limits: Limits,
    /// List pagination.
    #[serde(default)]
    pub pagination: PaginationConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Where uploaded images live and how they are served.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// Directory on disk.
    #[serde(default = "default_media_root")]
    pub root: PathBuf,
    /// URL prefix the directory is served under.
    #[serde(default = "default_media_url")]
    pub url: String,
}

/// Numeric limits enforced on user input.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Limits {
    /// Smallest accepted cooking time, in minutes.
    pub min_cooking_time: i32,
    /// Smallest accepted ingredient amount.
    pub min_ingredient_amount: i32,
    pub max_recipe_name_length: usize,
    pub max_ingredient_name_length: usize,
    pub max_measurement_unit_length: usize,
    pub max_email_length: usize,
    pub max_username_length: usize,
    pub max_first_name_length: usize,
    pub max_last_name_length: usize,
}

/// Page-number pagination settings.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PaginationConfig {
    /// Page size used when the request has no `limit`.
    pub page_size: u64,
    /// Upper bound for `limit`.
    pub max_page_size: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root: default_media_root(),
            url: default_media_url(),
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            min_cooking_time: 1,
            min_ingredient_amount: 1,
            max_recipe_name_length: 256,
            max_ingredient_name_length: 128,
            max_measurement_unit_length: 64,
            max_email_length: 254,
            max_username_length: 150,
            max_first_name_length: 150,
            max_last_name_length: 150,
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: 6,
            max_page_size: 100,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

fn default_media_root() -> PathBuf {
    PathBuf::from("./media")
}

fn default_media_url() -> String {
    "/media".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present, only to populate the process environment)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `FOODGRAM_ENV`)
    /// 4. Environment variables with `FOODGRAM__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("FOODGRAM_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("FOODGRAM")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("FOODGRAM")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Public base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.server.url.trim_end_matches('/')
    }
}
