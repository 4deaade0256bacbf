use std::time::Duration;

use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

/// Default User-Agent sent to the web search endpoint. The HTML endpoint
/// serves a stripped page to unknown agents.
pub const DEFAULT_SEARCH_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub geocoder: GeocoderConfig,
    pub club_search: ClubSearchConfig,
    pub photos: PhotoConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u8,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// ## Summary
    /// Returns the bind address in the format "host:port".
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub contact_email: Option<String>,
    pub result_limit: u8,
    pub timeout_secs: u64,
    /// Zero disables the geocode cache.
    pub cache_ttl_secs: u64,
    pub cache_capacity: usize,
}

impl GeocoderConfig {
    /// ## Summary
    /// Builds the identifying User-Agent required by the geocoding provider's
    /// usage policy.
    #[must_use]
    pub fn user_agent(&self) -> String {
        let contact = match self.contact_email.as_deref() {
            Some(email) if !email.trim().is_empty() => email.trim(),
            _ => {
                tracing::warn!("geocoder.contact_email not set, using fallback User-Agent");
                "unspecified"
            }
        };
        format!("DiveLog/{} (contact: {contact})", env!("CARGO_PKG_VERSION"))
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub const fn cache_ttl(&self) -> Option<Duration> {
        if self.cache_ttl_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.cache_ttl_secs))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClubSearchConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl ClubSearchConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoBackend {
    Convex,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoConfig {
    pub backend: PhotoBackend,
    pub deployment_url: Option<String>,
    pub auth_token: Option<String>,
    pub upload_function: String,
    pub max_bytes: usize,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from environment variables and an optional
    /// `config.toml` into a `Settings`. Nested keys use a double underscore in
    /// the environment (`GEOCODER__CONTACT_EMAIL`); the conventional
    /// `DATABASE_URL` is honoured as well.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("server.max_upload_bytes", 10 * 1024 * 1024)?
            .set_default("database.max_connections", 4)?
            .set_default("database.run_migrations", true)?
            .set_default("logging.level", "info")?
            .set_default("geocoder.base_url", "https://nominatim.openstreetmap.org")?
            .set_default("geocoder.result_limit", 5)?
            .set_default("geocoder.timeout_secs", 10)?
            .set_default("geocoder.cache_ttl_secs", 0)?
            .set_default("geocoder.cache_capacity", 256)?
            .set_default("club_search.base_url", "https://html.duckduckgo.com")?
            .set_default("club_search.user_agent", DEFAULT_SEARCH_USER_AGENT)?
            .set_default("club_search.timeout_secs", 10)?
            .set_default("photos.backend", "convex")?
            .set_default("photos.upload_function", "files.js/generateUploadUrl")?
            .set_default("photos.max_bytes", 10 * 1024 * 1024)?
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            // Env
            .add_source(
                config::Environment::default()
                    .convert_case(config::Case::Snake)
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .build()?
            .try_deserialize::<Self>()?;

        settings.validate()?;
        Ok(settings)
    }

    /// ## Summary
    /// Checks cross-field constraints that deserialization cannot express.
    ///
    /// ## Errors
    /// Returns `CoreError::ConfigError` naming the offending key.
    pub fn validate(&self) -> CoreResult<()> {
        if self.photos.backend == PhotoBackend::Convex
            && self
                .photos
                .deployment_url
                .as_deref()
                .is_none_or(|url| url.trim().is_empty())
        {
            return Err(CoreError::ConfigError(
                "photos.deployment_url is required for the convex photo backend".to_string(),
            ));
        }

        if self.geocoder.result_limit == 0 {
            return Err(CoreError::ConfigError(
                "geocoder.result_limit must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
