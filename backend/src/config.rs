//! Server settings
//!
//! Layered: defaults below, then `config/{environment}.toml`, then
//! `BIOMARKET__SECTION__KEY` environment variables.

use std::net::SocketAddr;

use config::{ConfigError, Environment, File};
use serde::Deserialize;

const DEVELOPMENT: &str = "development";

/// Shortest signing secret accepted outside development
const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// `development` or `production`
    pub environment: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::Message(format!("server address: {}", e)))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Token signing. Both the issuing service and the request middleware read
/// `secret` from here.
#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Seconds
    pub access_token_expiry: i64,
    /// Seconds
    pub refresh_token_expiry: i64,
}

/// Object storage that holds permit documents and listing photos
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub upload_endpoint: String,
    pub api_key: String,
    pub bucket: String,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("BIOMARKET__ENVIRONMENT").unwrap_or_else(|_| DEVELOPMENT.into());

        let config: Config = config::Config::builder()
            .set_default("environment", environment.clone())?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("jwt.access_token_expiry", 3600)?
            .set_default("jwt.refresh_token_expiry", 7 * 24 * 3600)?
            .set_default("storage.bucket", "biomarket-uploads")?
            .set_default("storage.max_upload_bytes", 10 * 1024 * 1024)?
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            .add_source(
                Environment::with_prefix("BIOMARKET")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == DEVELOPMENT
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.is_empty() {
            return Err(ConfigError::Message("jwt.secret must be set".into()));
        }
        if !self.is_development() && self.jwt.secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Message(format!(
                "jwt.secret must be at least {} bytes in {}",
                MIN_SECRET_LEN, self.environment
            )));
        }
        if self.jwt.access_token_expiry <= 0 || self.jwt.refresh_token_expiry <= 0 {
            return Err(ConfigError::Message("token expiry must be positive".into()));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Message(
                "database.min_connections exceeds max_connections".into(),
            ));
        }
        if !(self.storage.upload_endpoint.starts_with("http://")
            || self.storage.upload_endpoint.starts_with("https://"))
        {
            return Err(ConfigError::Message(
                "storage.upload_endpoint must be an http(s) URL".into(),
            ));
        }
        if self.storage.max_upload_bytes == 0 {
            return Err(ConfigError::Message("storage.max_upload_bytes must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(environment: &str, secret: &str) -> Config {
        Config {
            environment: environment.to_string(),
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/biomarket".to_string(),
                max_connections: 10,
                min_connections: 2,
            },
            jwt: JwtConfig {
                secret: secret.to_string(),
                access_token_expiry: 3600,
                refresh_token_expiry: 604800,
            },
            storage: StorageConfig {
                upload_endpoint: "https://files.biomarket.test/upload".to_string(),
                api_key: "key".to_string(),
                bucket: "biomarket-uploads".to_string(),
                max_upload_bytes: 1024,
            },
        }
    }

    #[test]
    fn test_short_secret_only_allowed_in_development() {
        assert!(config("development", "dev").validate().is_ok());
        assert!(config("production", "dev").validate().is_err());
        assert!(config("production", &"s".repeat(32)).validate().is_ok());
        assert!(config("development", "").validate().is_err());
    }

    #[test]
    fn test_storage_endpoint_must_be_http() {
        let mut c = config("development", "dev");
        c.storage.upload_endpoint = "files.biomarket.test".to_string();
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_socket_addr() {
        let c = config("development", "dev");
        assert_eq!(c.server.socket_addr().unwrap().port(), 3000);

        let mut bad = c.server.clone();
        bad.host = "not a host".to_string();
        assert!(bad.socket_addr().is_err());
    }
}
