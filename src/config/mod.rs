use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

/// Configuration for the application
#[derive(Debug, Deserialize)]
pub struct Config {
    /// SQLite connection URL
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Maximum age of the cached record snapshot, in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// File receiving log output while the terminal UI owns the screen
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_database_url() -> String {
    "sqlite://projects.db".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    600
}

fn default_log_file() -> PathBuf {
    PathBuf::from("project-tracker.log")
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// This function will:
    /// 1. Load variables from .env file if it exists
    /// 2. Deserialize environment variables into Config struct
    pub fn load() -> Result<Self> {
        dotenv().ok();

        Self::from_vars(std::env::vars())
    }

    /// Build a config from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Config>(vars)?;

        Ok(config)
    }

    /// Get a direct reference to the database URL
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    Config::load()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::from_vars(vars(&[])).unwrap();

        assert_eq!(config.database_url(), "sqlite://projects.db");
        assert_eq!(config.cache_ttl(), Duration::from_secs(600));
        assert_eq!(config.log_file, PathBuf::from("project-tracker.log"));
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = Config::from_vars(vars(&[
            ("DATABASE_URL", "sqlite://other.db"),
            ("CACHE_TTL_SECS", "30"),
            ("LOG_FILE", "/tmp/tracker.log"),
        ]))
        .unwrap();

        assert_eq!(config.database_url(), "sqlite://other.db");
        assert_eq!(config.cache_ttl(), Duration::from_secs(30));
        assert_eq!(config.log_file, PathBuf::from("/tmp/tracker.log"));
    }

    #[test]
    fn rejects_non_numeric_ttl() {
        assert!(Config::from_vars(vars(&[("CACHE_TTL_SECS", "soon")])).is_err());
    }
}
