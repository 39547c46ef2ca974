use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use validator::Validate;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 3000;
const CONFIG_DIR: &str = "config";
const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24;
const DEV_DEFAULT_JWT_SECRET: &str =
    "development_only_jwt_secret_do_not_use_outside_local_testing";

/// Application configuration loaded from `config/*.toml` files layered with
/// `APP__*` environment variables.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Database connection URL (sqlite or postgres).
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// JWT signing secret.
    #[validate(length(min = 32))]
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    /// Access-token lifetime in hours.
    #[serde(default = "default_jwt_expiry_hours")]
    pub jwt_expiry_hours: i64,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Runtime environment name: "development", "test", or "production".
    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory served for static frontend assets.
    #[serde(default = "default_frontend_dir")]
    pub frontend_dir: String,

    /// Run schema migrations on startup.
    #[serde(default = "default_true")]
    pub auto_migrate: bool,

    /// Insert bootstrap catalog/user data into empty tables on startup.
    #[serde(default = "default_true")]
    pub seed_on_startup: bool,

    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,
}

fn default_database_url() -> String {
    "sqlite://yougou.db?mode=rwc".to_string()
}
fn default_jwt_secret() -> String {
    DEV_DEFAULT_JWT_SECRET.to_string()
}
fn default_jwt_expiry_hours() -> i64 {
    DEFAULT_JWT_EXPIRY_HOURS
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_frontend_dir() -> String {
    "frontend".to_string()
}
fn default_true() -> bool {
    true
}
fn default_db_max_connections() -> u32 {
    10
}
fn default_db_min_connections() -> u32 {
    1
}

impl AppConfig {
    /// Minimal configuration for tests and embedded use.
    pub fn new(database_url: impl Into<String>, jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            jwt_secret: jwt_secret.into(),
            jwt_expiry_hours: DEFAULT_JWT_EXPIRY_HOURS,
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            environment: "test".to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            frontend_dir: default_frontend_dir(),
            auto_migrate: true,
            seed_on_startup: false,
            db_max_connections: 1,
            db_min_connections: 1,
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

/// Load configuration, layering (lowest to highest precedence):
/// `config/default.toml`, `config/<environment>.toml`, `APP__*` env vars.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let run_env = env::var("APP_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());

    let cfg: AppConfig = Config::builder()
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?
        .try_deserialize()?;

    cfg.validate()
        .map_err(|e| ConfigError::Message(format!("invalid configuration: {}", e)))?;

    if !cfg.is_development() && cfg.jwt_secret == DEV_DEFAULT_JWT_SECRET {
        return Err(ConfigError::Message(
            "the default JWT secret is only allowed in development".to_string(),
        ));
    }

    Ok(cfg)
}

/// Initialize the global tracing subscriber. `RUST_LOG` overrides the
/// configured level.
pub fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_uses_single_connection() {
        let cfg = AppConfig::new("sqlite::memory:", "x".repeat(32));
        assert_eq!(cfg.db_max_connections, 1);
        assert!(!cfg.seed_on_startup);
    }

    #[test]
    fn short_jwt_secret_fails_validation() {
        let cfg = AppConfig::new("sqlite::memory:", "short");
        assert!(cfg.validate().is_err());
    }
}
