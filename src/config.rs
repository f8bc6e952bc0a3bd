//! Service configuration
//!
//! Resolution order: built-in defaults, then a JSON file, then environment
//! variables. CLI flags are applied last by the caller.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Dataset keys offered to clients when nothing else is configured
pub const DEFAULT_ACADEMIC_YEARS: &[&str] = &["2020-2023", "2021-2024", "2022-2025"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub web_search: WebSearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub data_dir: PathBuf,
    /// File stem of the default dataset
    pub default_file: String,
    /// File stem prefix for keyed datasets
    pub file_prefix: String,
    pub academic_years: Vec<String>,
    /// Load every configured dataset at startup instead of on first request
    pub preload: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSearchConfig {
    pub endpoint: String,
    pub engine: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            default_file: "seniors_data_cleaned".to_string(),
            file_prefix: "seniors_data_".to_string(),
            academic_years: DEFAULT_ACADEMIC_YEARS.iter().map(|s| s.to_string()).collect(),
            preload: false,
        }
    }
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://serpapi.com/search.json".to_string(),
            engine: "google".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration: explicit path if given, else the per-user file
    /// when it exists, else defaults. Environment overrides are applied on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => match default_config_path() {
                Some(p) if p.exists() => Self::from_file(&p)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Apply `SENIORS_*` and `SERPAPI_KEY` overrides from a variable lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get("SENIORS_DATA_DIR") {
            self.data.data_dir = PathBuf::from(dir);
        }
        if let Some(host) = get("SENIORS_HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("SENIORS_PORT").and_then(|p| p.trim().parse().ok()) {
            self.server.port = port;
        }
        if let Some(key) = get("SERPAPI_KEY") {
            self.web_search.api_key = Some(key);
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// `{config_dir}/seniors-api/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("seniors-api").join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server_addr(), "127.0.0.1:8000");
        assert_eq!(config.data.academic_years, DEFAULT_ACADEMIC_YEARS);
        assert!(!config.data.preload);
        assert!(config.web_search.api_key.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"server": {"port": 9000}, "data": {"preload": true}}"#).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.data.preload);
        assert_eq!(config.data.default_file, "seniors_data_cleaned");
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{").unwrap();
        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SENIORS_DATA_DIR", "/srv/rosters"),
            ("SENIORS_PORT", "8123"),
            ("SENIORS_HOST", ""),
            ("SERPAPI_KEY", "secret"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.data.data_dir, PathBuf::from("/srv/rosters"));
        assert_eq!(config.server.port, 8123);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.web_search.api_key.as_deref(), Some("secret"));
    }
}
