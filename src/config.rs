//! longtts configuration: defaults that would otherwise be repeated on
//! every invocation, loaded from `~/.config/longtts/config.toml`.
//!
//! Every field is optional; CLI flags win over the config file, which wins
//! over the built-in backend defaults.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Piper executable; resolved against PATH when not absolute.
    #[serde(default)]
    pub piper_exe: Option<PathBuf>,

    /// Piper voice model (.onnx).
    #[serde(default)]
    pub piper_model: Option<PathBuf>,

    /// Language hint for the networked backend.
    #[serde(default)]
    pub lang: Option<String>,

    /// Maximum characters per chunk.
    #[serde(default)]
    pub chunk_chars: Option<usize>,

    /// Parallel synthesis jobs.
    #[serde(default)]
    pub jobs: Option<usize>,
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        let base = dirs::config_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| anyhow::anyhow!("could not determine config directory"))?;
        Ok(base.join("longtts").join("config.toml"))
    }

    /// Load the config file, returning defaults when it does not exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
