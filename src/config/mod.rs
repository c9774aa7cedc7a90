//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables use the `FITFUEL` prefix and a
//! double underscore between nesting levels.
//!
//! # Example
//!
//! ```no_run
//! use fitfuel_settings::config::AppConfig;
//!
//! let config = AppConfig::load()?;
//! config.validate()?;
//! println!("Server running on {}", config.server.socket_addr()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod auth;
mod database;
mod error;
mod redis;
mod server;

pub use self::auth::AuthConfig;
pub use self::database::DatabaseConfig;
pub use self::error::{ConfigError, ValidationError};
pub use self::redis::{InvalidationMode, RedisConfig};
pub use self::server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root configuration for the settings service.
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    pub database: DatabaseConfig,

    /// Optional; absent means stale signals are logged only
    #[serde(default)]
    pub redis: RedisConfig,

    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` if present (development)
    /// 2. Reads variables with the `FITFUEL` prefix, `__` separating levels
    /// 3. Deserializes into the typed sections
    ///
    /// - `FITFUEL__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `FITFUEL__AUTH__JWT_SECRET=...` -> `auth.jwt_secret = ...`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("FITFUEL")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Semantic checks that deserialization cannot express.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.redis.validate()?;
        self.auth.validate(&self.server.environment)?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
