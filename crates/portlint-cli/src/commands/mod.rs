//! Subcommand implementations.

pub mod check;
pub mod init;
pub mod list_rules;
pub mod output;
pub mod show;

use anyhow::{Context, Result};
use portlint_core::{discover_index, Config, PortIndex};

/// Loads the index named by the configuration, or the newest one under the ports root.
pub fn load_index(config: &Config) -> Result<PortIndex> {
    let path = match &config.index {
        Some(path) => path.clone(),
        None => discover_index(&config.ports_root)
            .with_context(|| format!("No index under {}", config.ports_root.display()))?,
    };
    PortIndex::load(&path, &config.ports_root).context("Failed to load the ports index")
}
