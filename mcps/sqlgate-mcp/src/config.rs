//! Configuration for SQL gate MCP Server

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Environment variable overriding `database.url`
pub const DATABASE_URL_ENV: &str = "SQLGATE_DATABASE_URL";

/// Environment variable pointing at a config file
pub const CONFIG_PATH_ENV: &str = "SQLGATE_CONFIG_PATH";

/// SQL gate MCP configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SqlGateConfig {
    /// Database connection settings
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Database connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL: `sqlite://path`, `:memory:`, a bare SQLite path,
    /// or `postgres://...`
    #[serde(default = "default_url")]
    pub url: String,

    /// How long SQLite waits on a locked database, in seconds
    /// Default: 30
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_secs: u64,

    /// PostgreSQL pool size
    /// Default: 5
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_url() -> String {
    "sqlite://database.db".to_string()
}

fn default_busy_timeout() -> u64 {
    30
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            busy_timeout_secs: default_busy_timeout(),
            max_connections: default_max_connections(),
        }
    }
}

impl SqlGateConfig {
    /// Load configuration from file and environment
    ///
    /// Looks for config in:
    /// 1. `SQLGATE_CONFIG_PATH` environment variable
    /// 2. `./sqlgate-mcp.toml`
    /// 3. `$XDG_CONFIG_HOME/sqlgate-mcp/config.toml`
    /// 4. `~/.sqlgate-mcp.toml`
    /// 5. Defaults
    ///
    /// `SQLGATE_DATABASE_URL` then overrides the database URL.
    pub fn load() -> Result<Self> {
        let mut config = match Self::locate()? {
            Some(path) => {
                let config = Self::from_file(&path)?;
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            None => {
                tracing::info!("Using default configuration");
                Self::default()
            }
        };

        if let Ok(url) = std::env::var(DATABASE_URL_ENV) {
            tracing::info!("Database URL taken from {}", DATABASE_URL_ENV);
            config.database.url = url;
        }

        Ok(config)
    }

    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        Self::from_toml(&content).with_context(|| format!("Failed to parse config from {:?}", path))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Create config pointing at a specific database
    pub fn with_database_url(url: impl Into<String>) -> Self {
        Self {
            database: DatabaseConfig {
                url: url.into(),
                ..DatabaseConfig::default()
            },
        }
    }

    fn locate() -> Result<Option<PathBuf>> {
        // An explicit path must exist
        if let Ok(env_path) = std::env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(&env_path);
            if !path.exists() {
                anyhow::bail!("{}={} does not exist", CONFIG_PATH_ENV, env_path);
            }
            return Ok(Some(path));
        }

        let mut config_paths = vec![PathBuf::from("sqlgate-mcp.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            config_paths.push(config_dir.join("sqlgate-mcp").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            config_paths.push(home.join(".sqlgate-mcp.toml"));
        }

        Ok(config_paths.into_iter().find(|path| path.exists()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SqlGateConfig::default();
        assert_eq!(config.database.url, "sqlite://database.db");
        assert_eq!(config.database.busy_timeout_secs, 30);
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = SqlGateConfig::from_toml(
            r#"
            [database]
            url = "postgres://app@localhost/app"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.url, "postgres://app@localhost/app");
        assert_eq!(config.database.busy_timeout_secs, 30);
    }

    #[test]
    fn test_empty_toml() {
        let config = SqlGateConfig::from_toml("").unwrap();
        assert_eq!(config.database.url, default_url());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(SqlGateConfig::from_toml("[database]\nbusy_timeout_secs = \"soon\"").is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sqlgate.toml");
        std::fs::write(&path, "[database]\nurl = \":memory:\"\nbusy_timeout_secs = 5\n").unwrap();

        let config = SqlGateConfig::from_file(&path).unwrap();
        assert_eq!(config.database.url, ":memory:");
        assert_eq!(config.database.busy_timeout_secs, 5);
    }

    #[test]
    fn test_from_missing_file() {
        let result = SqlGateConfig::from_file(Path::new("/nonexistent/sqlgate.toml"));
        assert!(result.is_err());
    }
}
