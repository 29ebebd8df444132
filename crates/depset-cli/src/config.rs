//! Configuration file discovery and loading.

use depset_core::EngineConfig;
use depset_core::fetcher::github::DEFAULT_API_URL;
use depset_core::fetcher::settings::DEFAULT_SETTINGS_PATH;
use dirs::home_dir;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Project-local configuration file name.
pub const PROJECT_CONFIG: &str = "depset.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Contents of a configuration file. Every table and key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub github: GitHubConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_url: String,
    pub settings_path: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            settings_path: DEFAULT_SETTINGS_PATH.to_string(),
        }
    }
}

impl Config {
    /// Load `explicit` if given, otherwise the first file found by
    /// [`candidates`]. No file at all means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let cwd = std::env::current_dir().unwrap_or_default();
        match candidates(&cwd, try_depset_home()).into_iter().find(|p| p.is_file()) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Returns the depset home directory, or None if the user's home cannot be resolved.
pub fn try_depset_home() -> Option<PathBuf> {
    if let Ok(val) = std::env::var("DEPSET_HOME") {
        return Some(PathBuf::from(val));
    }
    home_dir().map(|h| h.join(".depset"))
}

/// Configuration files in lookup order.
pub fn candidates(cwd: &Path, home: Option<PathBuf>) -> Vec<PathBuf> {
    let mut paths = vec![cwd.join(PROJECT_CONFIG)];
    if let Some(home) = home {
        paths.push(home.join("config.toml"));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROJECT_CONFIG);
        std::fs::write(
            &path,
            "[engine]\nfetch_timeout_secs = 5\n\n[github]\napi_url = \"https://ghe.example.com/api/v3\"\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.engine.fetch_timeout_secs, 5);
        assert_eq!(config.engine.max_concurrent_fetches, 8);
        assert_eq!(config.github.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.github.settings_path, DEFAULT_SETTINGS_PATH);
    }

    #[test]
    fn test_empty_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.toml");
        std::fs::write(&path, "").unwrap();
        assert_eq!(Config::from_file(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            Config::from_file(&missing),
            Err(ConfigError::Read { .. })
        ));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[engine]\nfetch_timeout_secs = \"soon\"\n").unwrap();
        let err = Config::from_file(&bad).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_candidate_order() {
        let paths = candidates(Path::new("/work"), Some(PathBuf::from("/home/u/.depset")));
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/work/depset.toml"),
                PathBuf::from("/home/u/.depset/config.toml"),
            ]
        );
        assert_eq!(candidates(Path::new("/work"), None).len(), 1);
    }
}
