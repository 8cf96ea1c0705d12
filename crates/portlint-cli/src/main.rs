//! portlint CLI tool.
//!
//! Usage:
//! ```bash
//! portlint check [OPTIONS]
//! portlint show-categories
//! portlint show-maintainers
//! portlint list-rules
//! portlint init
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use portlint_core::{Config, ConfigError, EngineError, IndexError, NetworkError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Exit status when diagnostics at or above `fail_on` were produced.
pub const EXIT_DIAGNOSTICS: u8 = 1;

/// Exit status when the run could not be carried out.
pub const EXIT_FATAL: u8 = 2;

/// Audits a ports INDEX against the port Makefiles
#[derive(Parser)]
#[command(name = "portlint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// INDEX file to load (default: newest INDEX-<n> under the ports root)
    #[arg(long, global = true)]
    index: Option<PathBuf>,

    /// Root of the ports tree
    #[arg(long, global = true, env = "PORTSDIR")]
    ports_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the selected ports
    Check(commands::check::CheckArgs),

    /// Show the categories in use, with their port counts
    ShowCategories,

    /// Show the maintainers, with their port counts
    ShowMaintainers,

    /// List available checks
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output with a summary.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One line per diagnostic.
    Compact,
    /// Findings grouped by maintainer, then by check.
    Maintainers,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:?}", fatal_report(err));
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // Reports go to stdout; keep logs out of the way.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let work_dir = std::env::current_dir().context("Failed to read the working directory")?;

    match cli.command {
        Commands::Check(ref args) => {
            let mut config = load_config(&cli, &work_dir)?;
            args.apply(&mut config);
            commands::check::run(config, args)
        }
        Commands::ShowCategories => {
            commands::show::categories(&load_config(&cli, &work_dir)?)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::ShowMaintainers => {
            commands::show::maintainers(&load_config(&cli, &work_dir)?)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::ListRules => {
            commands::list_rules::run();
            Ok(ExitCode::SUCCESS)
        }
        Commands::Init { force } => {
            commands::init::run(&work_dir, force)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Loads the configuration file, then applies the global flags on top.
fn load_config(cli: &Cli, work_dir: &Path) -> Result<Config> {
    let mut config = config_resolver::resolve(work_dir, cli.config.as_deref()).load()?;
    if let Some(root) = &cli.ports_root {
        config.ports_root.clone_from(root);
    }
    if let Some(index) = &cli.index {
        config.index = Some(index.clone());
    }
    Ok(config)
}

/// Renders a fatal error, keeping miette's code and help when the library provided them.
fn fatal_report(err: anyhow::Error) -> miette::Report {
    as_diagnostic::<IndexError>(err)
        .or_else(as_diagnostic::<ConfigError>)
        .or_else(as_diagnostic::<EngineError>)
        .or_else(as_diagnostic::<NetworkError>)
        .unwrap_or_else(|err| miette::miette!("{:#}", err))
}

fn as_diagnostic<E>(err: anyhow::Error) -> Result<miette::Report, anyhow::Error>
where
    E: miette::Diagnostic + std::error::Error + Send + Sync + 'static,
{
    let context = err.to_string();
    let inner = err.downcast::<E>()?;
    let wrapped = context != inner.to_string();
    let report = miette::Report::new(inner);
    Ok(if wrapped {
        report.wrap_err(context)
    } else {
        report
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_override_config() {
        let cli = Cli::parse_from([
            "portlint",
            "--ports-root",
            "/srv/ports",
            "--index",
            "/tmp/INDEX-14",
            "--config",
            "/nonexistent/portlint.toml",
            "list-rules",
        ]);
        assert!(load_config(&cli, Path::new("/")).is_err());

        let cli = Cli::parse_from(["portlint", "--ports-root", "/srv/ports", "list-rules"]);
        let work = tempfile::TempDir::new().unwrap();
        let config = load_config(&cli, work.path()).unwrap();
        assert_eq!(config.ports_root, PathBuf::from("/srv/ports"));
    }

    #[test]
    fn library_errors_keep_their_code() {
        let err = anyhow::Error::new(IndexError::Missing {
            path: PathBuf::from("/usr/ports/INDEX-14"),
        })
        .context("Failed to load the ports index");
        let report = fatal_report(err);
        assert_eq!(report.to_string(), "Failed to load the ports index");
        let source = report.chain().nth(1).map(ToString::to_string);
        assert_eq!(
            source.as_deref(),
            Some("Ports index not found at /usr/ports/INDEX-14")
        );
    }
}
