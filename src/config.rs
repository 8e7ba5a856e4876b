use std::env;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub retention: RetentionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origin of the extension popup, used for CORS. Browser extensions send
    /// an origin like `chrome-extension://<id>`.
    pub extension_origin: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetentionConfig {
    /// Whether the day-log retention sweep runs at all.
    pub enabled: bool,
    /// Booked/discarded day entries older than this are purged.
    pub days: u32,
    /// How often (seconds) the sweep runs.
    pub sweep_interval_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8484".to_string())
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,
                extension_origin: env::var("EXTENSION_ORIGIN")
                    .unwrap_or_else(|_| "chrome-extension://invalid".to_string()),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite://data/timebookings.db".to_string()),
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .unwrap_or(5),
            },
            retention: RetentionConfig {
                enabled: match env::var("RETENTION_ENABLED") {
                    Ok(v) => match v.to_lowercase().as_str() {
                        "1" | "true" | "yes" => true,
                        "0" | "false" | "no" => false,
                        _ => true,
                    },
                    Err(_) => true,
                },
                days: env::var("RETENTION_DAYS")
                    .unwrap_or_else(|_| "90".to_string())
                    .parse()
                    .unwrap_or(90),
                sweep_interval_seconds: env::var("RETENTION_SWEEP_INTERVAL_SECONDS")
                    .unwrap_or_else(|_| "3600".to_string())
                    .parse()
                    .unwrap_or(3600),
            },
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8484,
                extension_origin: "chrome-extension://invalid".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://data/timebookings.db".to_string(),
                max_connections: 5,
            },
            retention: RetentionConfig {
                enabled: true,
                days: 90,
                sweep_interval_seconds: 3600,
            },
        }
    }
}
