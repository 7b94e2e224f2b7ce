//! Application configuration.
//!
//! Aggregates configuration from all modules into a single Config struct
//! that can be loaded from YAML files or environment variables.

mod auth;
mod server;
mod storage;

pub use auth::{
    default_protected_operations, AuthConfig, ProtectedOperation, StaticToken, ValidatorType,
    ADMIN_ROLE, DEFAULT_IDENTITY_URL,
};
pub use server::ServerConfig;
pub use storage::{PostgresConfig, SqliteConfig, StorageConfig, StorageType};

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Optional `KEY=value` file loaded into the environment before anything else.
pub const DOTENV_FILE: &str = ".env";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "INVENTORY_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "INVENTORY";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "INVENTORY_LOG";

/// Environment variable for the database host.
pub const DB_HOST_ENV_VAR: &str = "DB_HOST";
/// Environment variable for the database user.
pub const DB_USER_ENV_VAR: &str = "DB_USER";
/// Environment variable for the database password.
pub const DB_PASSWORD_ENV_VAR: &str = "DB_PASSWORD";
/// Environment variable for the database name.
pub const DB_NAME_ENV_VAR: &str = "DB_NAME";
/// Environment variable for the database port.
pub const DB_PORT_ENV_VAR: &str = "DB_PORT";
/// Environment variable for the database sslmode.
pub const DB_SSLMODE_ENV_VAR: &str = "DB_SSLMODE";
/// Environment variable for the database session time zone.
pub const TIMEZONE_ENV_VAR: &str = "TIMEZONE";
/// Environment variable for the gRPC listen port.
pub const GRPC_PORT_ENV_VAR: &str = "GRPC_PORT";
/// Environment variable for the identity-service validation URL.
pub const AUTH_SERVICE_URL_ENV_VAR: &str = "AUTH_SERVICE_URL";

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Authorization gate configuration.
    pub auth: AuthConfig,
}

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Missing required database parameters: {0}")]
    MissingDatabaseParams(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// A `.env` file in the current directory is loaded into the process
    /// environment first; variables that are already set win over it.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `config.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    /// 5. Flat deployment variables (`DB_HOST`, `GRPC_PORT`, ...)
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        load_env_file(Path::new(DOTENV_FILE));

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Config = config.try_deserialize()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Create config for testing.
    pub fn for_test() -> Self {
        Self {
            storage: StorageConfig {
                storage_type: StorageType::Memory,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Reject configurations the server cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.storage_type == StorageType::Postgres {
            let missing = self.storage.postgres.missing_params();
            if !missing.is_empty() {
                return Err(ConfigError::MissingDatabaseParams(missing.join(", ")));
            }
        }

        if self.auth.validator == ValidatorType::Http && self.auth.identity_url.trim().is_empty() {
            return Err(ConfigError::Invalid("auth.identity_url is empty".to_string()));
        }

        if self.auth.timeout_ms == 0 {
            return Err(ConfigError::Invalid("auth.timeout_ms must be positive".to_string()));
        }

        Ok(())
    }

    /// Apply flat deployment environment variables.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let postgres = &mut self.storage.postgres;
        if let Some(host) = lookup(DB_HOST_ENV_VAR) {
            postgres.host = host;
        }
        if let Some(user) = lookup(DB_USER_ENV_VAR) {
            postgres.user = user;
        }
        if let Some(password) = lookup(DB_PASSWORD_ENV_VAR) {
            postgres.password = password;
        }
        if let Some(dbname) = lookup(DB_NAME_ENV_VAR) {
            postgres.dbname = dbname;
        }
        if let Some(port) = lookup(DB_PORT_ENV_VAR) {
            postgres.port = port;
        }
        if let Some(sslmode) = lookup(DB_SSLMODE_ENV_VAR) {
            postgres.sslmode = sslmode;
        }
        if let Some(timezone) = lookup(TIMEZONE_ENV_VAR) {
            postgres.timezone = timezone;
        }

        if let Some(port) = lookup(GRPC_PORT_ENV_VAR) {
            match port.parse() {
                Ok(p) => self.server.port = p,
                Err(_) => warn!(value = %port, "Ignoring unparseable {}", GRPC_PORT_ENV_VAR),
            }
        }

        if let Some(url) = lookup(AUTH_SERVICE_URL_ENV_VAR) {
            self.auth.identity_url = url;
        }
    }
}

/// Load `KEY=value` pairs from `path` into the process environment.
///
/// Existing variables are not overwritten. A missing file is skipped.
fn load_env_file(path: &Path) {
    match dotenvy::from_path(path) {
        Ok(()) => debug!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to load environment file"),
    }
}
