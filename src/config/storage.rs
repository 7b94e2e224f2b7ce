//! Storage configuration types.

use serde::Deserialize;

/// Storage type discriminator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    #[default]
    Postgres,
    Sqlite,
    Memory,
}

/// Storage configuration (discriminated union).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage type discriminator.
    #[serde(rename = "type")]
    pub storage_type: StorageType,
    /// PostgreSQL-specific configuration.
    pub postgres: PostgresConfig,
    /// SQLite-specific configuration.
    pub sqlite: SqliteConfig,
}

/// PostgreSQL connection parameters.
///
/// `host`, `user`, `dbname` and `port` have no defaults; leaving any of them
/// empty is rejected by [`super::Config::validate`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PostgresConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub dbname: String,
    /// Kept as text so an unset port is distinguishable from a default one.
    pub port: String,
    /// libpq-style sslmode (disable, prefer, require, ...).
    pub sslmode: String,
    /// Session time zone, e.g. `UTC` or `Europe/Berlin`.
    pub timezone: String,
    /// Connection pool size.
    pub max_connections: u32,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            user: String::new(),
            password: String::new(),
            dbname: String::new(),
            port: String::new(),
            sslmode: "prefer".to_string(),
            timezone: String::new(),
            max_connections: 10,
        }
    }
}

impl PostgresConfig {
    /// Names of required parameters that are empty.
    pub fn missing_params(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.host.trim().is_empty() {
            missing.push("host");
        }
        if self.user.trim().is_empty() {
            missing.push("user");
        }
        if self.dbname.trim().is_empty() {
            missing.push("dbname");
        }
        if self.port.trim().is_empty() {
            missing.push("port");
        }
        missing
    }

    /// Build sqlx connect options from the individual parameters.
    #[cfg(feature = "postgres")]
    pub fn connect_options(
        &self,
    ) -> Result<sqlx::postgres::PgConnectOptions, super::ConfigError> {
        use std::str::FromStr;

        use sqlx::postgres::{PgConnectOptions, PgSslMode};

        let port: u16 = self
            .port
            .trim()
            .parse()
            .map_err(|_| super::ConfigError::Invalid(format!("invalid port {:?}", self.port)))?;

        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(port)
            .username(&self.user)
            .database(&self.dbname);

        if !self.password.is_empty() {
            options = options.password(&self.password);
        }

        if !self.sslmode.is_empty() {
            let mode = PgSslMode::from_str(&self.sslmode).map_err(|_| {
                super::ConfigError::Invalid(format!("invalid sslmode {:?}", self.sslmode))
            })?;
            options = options.ssl_mode(mode);
        }

        if !self.timezone.is_empty() {
            options = options.options([("timezone", self.timezone.as_str())]);
        }

        Ok(options)
    }
}

/// SQLite-specific configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    /// Path to database file.
    pub path: String,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: "./data/inventory.db".to_string(),
        }
    }
}
