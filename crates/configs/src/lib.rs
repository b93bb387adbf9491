//! # configs
//!
//! Layered runtime settings: built-in defaults, then `config/default.toml`,
//! then `config/local.toml`, then `DEVCONNECTOR__SECTION__KEY` environment
//! variables. A `.env` file is loaded into the environment first.

use config::{Config, ConfigBuilder, Environment, File};
use config::builder::DefaultState;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

const ENV_PREFIX: &str = "DEVCONNECTOR";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("auth.jwt_secret must not be empty")]
    EmptyJwtSecret,

    #[error("database.max_connections must be at least 1")]
    NoConnections,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: SecretString,
    pub token_ttl_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// Absent means the in-memory store.
    pub url: Option<SecretString>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    pub json: bool,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub auth: AuthSettings,
    pub database: DatabaseSettings,
    pub log: LogSettings,
}

impl Settings {
    /// Loads `.env`, the optional config files and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        let config = defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Self::from_config(config)
    }

    /// Deserializes and validates an already-built configuration.
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.expose_secret().trim().is_empty() {
            return Err(ConfigError::EmptyJwtSecret);
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::NoConnections);
        }
        Ok(())
    }
}

/// Every setting except `auth.jwt_secret` and `database.url` has a default.
pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5000)?
        .set_default("auth.token_ttl_secs", 360_000)?
        .set_default("database.max_connections", 5)?
        .set_default("log.filter", "info")?
        .set_default("log.json", false)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_secret(secret: &str) -> ConfigBuilder<DefaultState> {
        defaults()
            .unwrap()
            .set_override("auth.jwt_secret", secret)
            .unwrap()
    }

    #[test]
    fn defaults_fill_everything_but_the_secret() {
        let settings = Settings::from_config(with_secret("s3cret").build().unwrap()).unwrap();
        assert_eq!(settings.bind_addr(), "0.0.0.0:5000");
        assert_eq!(settings.auth.token_ttl_secs, 360_000);
        assert_eq!(settings.auth.jwt_secret.expose_secret(), "s3cret");
        assert!(settings.database.url.is_none());
        assert_eq!(settings.database.max_connections, 5);
        assert!(!settings.log.json);
    }

    #[test]
    fn missing_secret_fails_to_load() {
        let err = Settings::from_config(defaults().unwrap().build().unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn blank_secret_is_rejected() {
        let err = Settings::from_config(with_secret("   ").build().unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyJwtSecret));
    }

    #[test]
    fn overrides_win_over_defaults() {
        let config = with_secret("s3cret")
            .set_override("server.port", 8080)
            .unwrap()
            .set_override("database.url", "postgres://localhost/devconnector")
            .unwrap()
            .build()
            .unwrap();
        let settings = Settings::from_config(config).unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(
            settings.database.url.as_ref().map(|u| u.expose_secret().to_owned()),
            Some("postgres://localhost/devconnector".to_owned())
        );
    }

    #[test]
    fn zero_connections_is_rejected() {
        let config = with_secret("s3cret")
            .set_override("database.max_connections", 0)
            .unwrap()
            .build()
            .unwrap();
        assert!(matches!(
            Settings::from_config(config),
            Err(ConfigError::NoConnections)
        ));
    }
}
