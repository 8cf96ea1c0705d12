//! Configuration file lookup.
//!
//! The first match wins:
//!
//! 1. `--config <path>`
//! 2. `portlint.toml` or `.portlint.toml` in the working directory
//! 3. `config.toml` in the global directory (`$PORTLINT_CONFIG_DIR`, else `~/.portlint/`)
//! 4. built-in defaults

use anyhow::{Context, Result};
use portlint_core::Config;
use std::path::{Path, PathBuf};

/// Where the configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found in the working directory.
    Local(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Returns the config file path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Local(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Loads the configuration this source points at.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(&self) -> Result<Config> {
        let Some(path) = self.path() else {
            tracing::debug!("No config file found, using defaults");
            return Ok(Config::default());
        };
        if matches!(self, Self::Global(_)) {
            tracing::info!("Using global config: {}", path.display());
        }
        Config::from_file(path).with_context(|| format!("Failed to load config {}", path.display()))
    }
}

const LOCAL_CONFIG_NAMES: &[&str] = &["portlint.toml", ".portlint.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Resolves the configuration source for a run started in `work_dir`.
#[must_use]
pub fn resolve(work_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_in(work_dir, explicit, global_config_dir())
}

fn resolve_in(work_dir: &Path, explicit: Option<&Path>, global_dir: Option<PathBuf>) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    if let Some(local) = LOCAL_CONFIG_NAMES
        .iter()
        .map(|name| work_dir.join(name))
        .find(|candidate| candidate.is_file())
    {
        tracing::debug!("Found config {}", local.display());
        return ConfigSource::Local(local);
    }

    match global_dir.map(|dir| dir.join(GLOBAL_CONFIG_NAME)) {
        Some(global) if global.is_file() => ConfigSource::Global(global),
        _ => ConfigSource::Default,
    }
}

/// Returns the global config directory.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("PORTLINT_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".portlint"))
}
