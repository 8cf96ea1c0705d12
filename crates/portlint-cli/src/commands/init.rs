//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# portlint configuration

# Root of the ports tree
ports_root = "/usr/ports"

# INDEX file to load (default: newest INDEX-<n> under ports_root)
# index = "/usr/ports/INDEX-14"

# Lowest severity that makes `portlint check` exit with 1
fail_on = "info"

[selection]
# categories = ["www", "net"]
# maintainers = ["you@FreeBSD.org"]
# ports = ["curl"]

[limits]
plist_files = 6
broken_days = 180
deprecated_days = 180
forbidden_days = 90
unchanged_days = 1095

[checks]
hostnames = false
urls = false
vcs_dates = false
concurrency = 16
timeout_secs = 10

# Each rule can be disabled or have its severity overridden
# [rules.unusual-prefix]
# enabled = false
#
# [rules.comment-too-long]
# severity = "error"
"#;

const CONFIG_NAME: &str = "portlint.toml";

/// Runs the init command.
pub fn run(work_dir: &Path, force: bool) -> Result<()> {
    let config_path = work_dir.join(CONFIG_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Created {CONFIG_NAME}");
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_NAME} to point at your ports tree");
    println!("  2. Run: portlint check");

    Ok(())
}
