// ⚙️ Runtime Config - optional TOML file, every field defaulted
//
// A missing file is not an error. Binaries let CLI flags / env vars override it:
//
//   database_path = "companies.db"
//   catalog_path = "data/q1_catalog.csv"
//   bind_address = "0.0.0.0:5000"
//   name_match = "exact"

use crate::company::NameMatch;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Catalog used to seed an empty store
    pub catalog_path: PathBuf,

    /// Server listen address
    pub bind_address: String,

    /// Name comparison for duplicate detection and search
    pub name_match: NameMatch,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: PathBuf::from("companies.db"),
            catalog_path: PathBuf::from("data/q1_catalog.csv"),
            bind_address: "0.0.0.0:5000".to_string(),
            name_match: NameMatch::Exact,
        }
    }
}

impl Config {
    /// Load `path`, falling back to defaults if the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("Config file {} not found, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
