use anyhow::{Context, Result};
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming the TOML config file.
pub const CONFIG_PATH_ENV: &str = "REVIEW_API_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// How long in-flight requests may run after a shutdown signal.
    pub shutdown_grace_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_grace_secs: 30,
            request_timeout_secs: 15,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// PostgreSQL connection and pool settings.
///
/// Defaults target a local development database.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub operation_timeout_secs: u64,
    pub statement_cache_capacity: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: "test".to_string(),
            name: "postgres".to_string(),
            max_connections: 25,
            min_connections: 0,
            idle_timeout_secs: 300,
            max_lifetime_secs: 300,
            operation_timeout_secs: 10,
            statement_cache_capacity: 100,
        }
    }
}

impl DatabaseConfig {
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
            .statement_cache_capacity(self.statement_cache_capacity)
    }
}

// Hand-written so the password never ends up in logs.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("idle_timeout_secs", &self.idle_timeout_secs)
            .field("max_lifetime_secs", &self.max_lifetime_secs)
            .field("operation_timeout_secs", &self.operation_timeout_secs)
            .field("statement_cache_capacity", &self.statement_cache_capacity)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Postgres => f.write_str("postgres"),
            StorageBackend::Memory => f.write_str("memory"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

impl AppConfig {
    /// Load the config file named by `REVIEW_API_CONFIG` (default
    /// `config.toml`), then apply environment overrides. A missing file
    /// means defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file(Path::new(&path))?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "No config file found, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Override individual settings from environment variables.
    ///
    /// Values that fail to parse are ignored and the previous value is kept.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        override_parsed(&lookup, "PORT", &mut self.server.port);

        if let Some(host) = lookup("DB_HOST") {
            self.database.host = host;
        }
        override_parsed(&lookup, "DB_PORT", &mut self.database.port);
        if let Some(user) = lookup("DB_USER") {
            self.database.user = user;
        }
        if let Some(password) = lookup("DB_PASSWORD") {
            self.database.password = password;
        }
        if let Some(name) = lookup("DB_NAME") {
            self.database.name = name;
        }

        override_parsed(&lookup, "REVIEW_STORAGE", &mut self.storage.backend);
    }
}

fn override_parsed<F, T>(lookup: &F, key: &str, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = lookup(key) else {
        return;
    };

    match raw.parse() {
        Ok(value) => *target = value,
        Err(_) => warn!(key, value = %raw, "Ignoring unparseable environment override"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_suit_local_development() {
        let config = AppConfig::default();

        assert_eq!(config.server.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.server.shutdown_grace(), Duration::from_secs(30));
        assert_eq!(config.server.request_timeout(), Duration::from_secs(15));
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.user, "postgres");
        assert_eq!(config.database.name, "postgres");
        assert_eq!(config.database.max_connections, 25);
        assert_eq!(config.database.operation_timeout(), Duration::from_secs(10));
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [server]
            port = 9000
            request_timeout_secs = 5

            [database]
            host = "db.internal"
            operation_timeout_secs = 3

            [storage]
            backend = "memory"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.operation_timeout(), Duration::from_secs(3));
        assert_eq!(config.storage.backend, StorageBackend::Memory);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = AppConfig::from_toml_str("[storage]\nbackend = \"mysql\"\n");
        assert!(err.is_err());
    }

    #[test]
    fn missing_file_means_defaults() {
        let config = AppConfig::from_file(Path::new("does/not/exist.toml")).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[
            ("PORT", "8081"),
            ("DB_HOST", "pg"),
            ("DB_PORT", "6543"),
            ("DB_USER", "reviewer"),
            ("DB_PASSWORD", "hunter2"),
            ("DB_NAME", "reviews"),
            ("REVIEW_STORAGE", "Memory"),
        ]));

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.database.host, "pg");
        assert_eq!(config.database.port, 6543);
        assert_eq!(config.database.user, "reviewer");
        assert_eq!(config.database.password, "hunter2");
        assert_eq!(config.database.name, "reviews");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
    }

    #[test]
    fn bad_numeric_override_falls_back() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[("DB_PORT", "not-a-port"), ("PORT", "99999")]));

        assert_eq!(config.database.port, 5432);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn debug_output_redacts_password() {
        let mut config = DatabaseConfig::default();
        config.password = "s3cret".to_string();

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("<redacted>"));
    }
}
