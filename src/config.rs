use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PathsConfig {
    /// SMS backup XML export
    #[serde(default = "default_export_path")]
    pub export: PathBuf,
    #[serde(default = "default_database_path")]
    pub database: PathBuf,
    #[serde(default = "default_invalid_log_path")]
    pub invalid_log: PathBuf,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Prefix every route is mounted under
    #[serde(default = "default_base_path")]
    pub base_path: String,
    /// Dashboard assets served next to the API
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

fn default_export_path() -> PathBuf {
    PathBuf::from("modified_sms_v2.xml")
}

fn default_database_path() -> PathBuf {
    PathBuf::from("momo_transactions.db")
}

fn default_invalid_log_path() -> PathBuf {
    PathBuf::from("invalid_transactions.log")
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_base_path() -> String {
    "/momo-app".to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            export: default_export_path(),
            database: default_database_path(),
            invalid_log: default_invalid_log_path(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: default_bind(),
            base_path: default_base_path(),
            static_dir: default_static_dir(),
        }
    }
}

impl Config {
    /// Load from a TOML file; a missing file means all defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.paths.database, PathBuf::from("momo_transactions.db"));
        assert_eq!(config.server.base_path, "/momo-app");
    }

    #[test]
    fn test_partial_config() {
        let config = Config::from_toml(
            r#"
            [paths]
            export = "/data/sms.xml"

            [server]
            bind = "127.0.0.1:8080"
            "#,
        )
        .unwrap();

        assert_eq!(config.paths.export, PathBuf::from("/data/sms.xml"));
        assert_eq!(config.paths.invalid_log, PathBuf::from("invalid_transactions.log"));
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.server.static_dir, PathBuf::from("public"));
    }

    #[test]
    fn test_malformed_config_is_error() {
        assert!(Config::from_toml("[paths\nexport = ").is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load(Path::new("/nonexistent/momo-ledger.toml")).unwrap();
        assert_eq!(config, Config::default());
    }
}
