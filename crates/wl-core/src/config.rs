//! Store configuration.
//!
//! Configuration comes from a YAML file or from environment variables:
//!
//! | Variable                        | Field               |
//! |---------------------------------|---------------------|
//! | `WL_DATABASE_URL`               | `database_url`      |
//! | `WL_DATABASE_DIALECT`           | `dialect`           |
//! | `WL_RUN_MIGRATIONS`             | `run_migrations`    |
//! | `DATABASE_MAX_CONNECTIONS`      | `pool.max_connections` |
//! | `DATABASE_MIN_CONNECTIONS`      | `pool.min_connections` |
//! | `DATABASE_ACQUIRE_TIMEOUT_SECS` | `pool.acquire_timeout_secs` |

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::db::{DbError, PoolOptions, SqlDialect};

#[cfg(feature = "database")]
use crate::db::{
    create_pool_with_options, create_waifu_repository_with_dialect, run_migrations, DbPool,
    WaifuRepository,
};

const DEFAULT_DATABASE_URL: &str = "sqlite://waifu_ledger.db?mode=rwc";

/// Connection and dialect settings for the relationship store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// `sqlite:` or `postgres://` connection URL.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Dialect override. When unset the dialect follows the URL scheme.
    #[serde(default)]
    pub dialect: Option<String>,

    /// Whether to apply embedded migrations on connect.
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,

    #[serde(default)]
    pub pool: PoolSettings,
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}

fn default_run_migrations() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            dialect: None,
            run_migrations: default_run_migrations(),
            pool: PoolSettings::default(),
        }
    }
}

/// Pool sizing. Defaults follow [`PoolOptions::default`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        let options = PoolOptions::default();
        Self {
            max_connections: options.max_connections,
            min_connections: options.min_connections,
            acquire_timeout_secs: options.acquire_timeout.as_secs(),
        }
    }
}

impl From<&PoolSettings> for PoolOptions {
    fn from(settings: &PoolSettings) -> Self {
        PoolOptions {
            max_connections: settings.max_connections,
            min_connections: settings.min_connections.min(settings.max_connections),
            acquire_timeout: Duration::from_secs(settings.acquire_timeout_secs),
            ..PoolOptions::default()
        }
    }
}

impl StoreConfig {
    /// Loads configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, DbError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DbError::Configuration(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from YAML text.
    pub fn from_yaml_str(contents: &str) -> Result<Self, DbError> {
        let config: Self = serde_yaml::from_str(contents)
            .map_err(|e| DbError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Builds configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, DbError> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("WL_DATABASE_URL") {
            config.database_url = url;
        }
        if let Ok(dialect) = std::env::var("WL_DATABASE_DIALECT") {
            config.dialect = Some(dialect);
        }
        if let Ok(flag) = std::env::var("WL_RUN_MIGRATIONS") {
            config.run_migrations = parse_bool(&flag).ok_or_else(|| {
                DbError::Configuration(format!("WL_RUN_MIGRATIONS must be a boolean, got {flag}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks the settings that cannot be validated by deserialization alone.
    pub fn validate(&self) -> Result<(), DbError> {
        if self.database_url.trim().is_empty() {
            return Err(DbError::Configuration(
                "database_url must not be empty".to_string(),
            ));
        }
        if self.pool.max_connections == 0 {
            return Err(DbError::Configuration(
                "pool.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The configured dialect override, if any.
    pub fn dialect_override(&self) -> Option<SqlDialect> {
        self.dialect.as_deref().map(SqlDialect::from_name)
    }

    /// Connects to the store and applies migrations when enabled.
    #[cfg(feature = "database")]
    pub async fn connect(&self) -> Result<DbPool, DbError> {
        let pool = create_pool_with_options(&self.database_url, (&self.pool).into()).await?;
        if self.run_migrations {
            run_migrations(&pool).await?;
        }
        Ok(pool)
    }

    /// Builds the relationship repository for a pool, honoring the dialect override.
    #[cfg(feature = "database")]
    pub fn repository(&self, pool: &DbPool) -> Box<dyn WaifuRepository> {
        let dialect = self
            .dialect_override()
            .unwrap_or_else(|| SqlDialect::for_pool(pool));
        create_waifu_repository_with_dialect(pool, dialect)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
