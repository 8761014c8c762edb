//! Configuration management for coil
//!
//! Everything the client needs to know about its environment is carried in a
//! [`Config`] value that the caller passes down explicitly.

use crate::error::{ChainError, Result};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub network: NetworkConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// Cached chain document
    #[serde(default = "default_chain_path")]
    pub path: PathBuf,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            path: default_chain_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// One peer URL per line
    #[serde(default = "default_peers_path")]
    pub peers_path: PathBuf,
    /// Extra peers, tried after the ones from `peers_path`
    #[serde(default)]
    pub peers: Vec<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            peers_path: default_peers_path(),
            peers: Vec::new(),
            timeout_secs: default_timeout(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("coil")
}

fn default_chain_path() -> PathBuf {
    config_dir().join("blockchain").join("chain.json")
}

fn default_peers_path() -> PathBuf {
    config_dir().join("peers.txt")
}

fn default_timeout() -> u64 {
    10
}

pub fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Load `path`, falling back to defaults when the file does not exist.
pub fn load_config(path: &Path) -> Result<Config> {
    let config_str = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => {
            return Err(ChainError::Io(format!(
                "Failed to read config {}: {}",
                path.display(),
                e
            )))
        }
    };

    let config: Config = toml::from_str(&config_str)
        .map_err(|e| ChainError::Parse(format!("Invalid config {}: {}", path.display(), e)))?;

    if config.chain.path.as_os_str().is_empty() {
        return Err(ChainError::Parse("chain.path must not be empty".to_string()));
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_config(&temp_dir.path().join("config.toml")).unwrap();

        assert!(config.chain.path.ends_with("coil/blockchain/chain.json"));
        assert!(config.network.peers_path.ends_with("coil/peers.txt"));
        assert!(config.network.peers.is_empty());
        assert_eq!(config.network.timeout_secs, 10);
    }

    #[test]
    fn test_partial_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[chain]
path = "/tmp/coil/chain.json"

[network]
peers = ["http://127.0.0.1:5000"]
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.chain.path, PathBuf::from("/tmp/coil/chain.json"));
        assert_eq!(config.network.peers, vec!["http://127.0.0.1:5000"]);
        assert_eq!(config.network.timeout_secs, 10);
    }

    #[test]
    fn test_invalid_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[network]\ntimeout_secs = \"soon\"\n").unwrap();

        assert!(matches!(load_config(&path), Err(ChainError::Parse(_))));
    }

    #[test]
    fn test_empty_chain_path_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[chain]\npath = \"\"\n").unwrap();

        assert!(load_config(&path).is_err());
    }
}
