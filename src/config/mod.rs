//! Configuration management for formsmith
//!
//! Handles the ~/.formsmith/ directory and config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::assembler::DEFAULT_REQUIRED_COUNT;
use crate::catalog::{ArchetypeEntry, Catalog};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// How many leading canvas fields are required on submit
    #[serde(default = "default_required_count")]
    pub required_count: usize,
    /// Log filter used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Replaces the built-in palette when non-empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub catalog: Vec<ArchetypeEntry>,
}

fn default_required_count() -> usize {
    DEFAULT_REQUIRED_COUNT
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            required_count: default_required_count(),
            log_level: default_log_level(),
            catalog: Vec::new(),
        }
    }
}

impl Config {
    /// Palette to show: configured entries, or the built-in one
    pub fn build_catalog(&self) -> Result<Catalog> {
        if self.catalog.is_empty() {
            return Ok(Catalog::standard());
        }
        Catalog::from_entries(&self.catalog).context("Invalid [[catalog]] entry in config.toml")
    }
}

/// Returns the path to the formsmith home directory (~/.formsmith)
pub fn formsmith_home() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".formsmith"))
}

/// Returns paths to all formsmith files
pub struct FormsmithPaths {
    pub root: PathBuf,
    pub config: PathBuf,
    pub log_file: PathBuf,
}

impl FormsmithPaths {
    pub fn new() -> Result<Self> {
        Ok(Self::at(formsmith_home()?))
    }

    /// Paths rooted at an arbitrary directory
    pub fn at(root: PathBuf) -> Self {
        Self {
            config: root.join("config.toml"),
            log_file: root.join("formsmith.log"),
            root,
        }
    }

    /// Create the root directory if it doesn't exist
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.root).context("Failed to create formsmith root")?;
        Ok(())
    }
}

/// Use `explicit` when given; only otherwise look up the home directory and
/// take the default file from it
pub fn resolve_path<F>(explicit: Option<PathBuf>, default: F) -> Result<PathBuf>
where
    F: FnOnce(FormsmithPaths) -> PathBuf,
{
    match explicit {
        Some(path) => Ok(path),
        None => {
            let paths = FormsmithPaths::new()?;
            paths.ensure_dirs()?;
            Ok(default(paths))
        }
    }
}

/// Load configuration from `path`; a missing file yields the defaults
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Save configuration to `path`
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
