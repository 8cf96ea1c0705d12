//! Check command implementation.

use anyhow::{Context, Result};
use clap::Args;
use portlint_core::{
    select, CancellationToken, Config, Engine, NetworkVerifier, ProbeResults, RuleBox, Selection,
    VerifyOptions,
};
use portlint_rules::Preset;
use std::process::ExitCode;

use crate::{OutputFormat, EXIT_DIAGNOSTICS};

/// Options of `portlint check`. Each one overrides the configuration file.
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Only check ports in these categories (comma-separated)
    #[arg(short = 'c', long = "cat", value_name = "CATEGORIES")]
    pub categories: Option<String>,

    /// Only check ports of these maintainers (comma-separated)
    #[arg(short = 'm', long = "mnt", value_name = "MAINTAINERS")]
    pub maintainers: Option<String>,

    /// Only check these ports, by package name or directory (comma-separated)
    #[arg(short = 'p', long = "port", value_name = "PORTS")]
    pub ports: Option<String>,

    /// Largest tolerated number of PLIST_FILES entries
    #[arg(long, value_name = "N")]
    pub plist: Option<usize>,

    /// Days a port may stay BROKEN
    #[arg(long, value_name = "DAYS")]
    pub broken: Option<u32>,

    /// Days a port may stay DEPRECATED
    #[arg(long, value_name = "DAYS")]
    pub deprecated: Option<u32>,

    /// Days a port may stay FORBIDDEN
    #[arg(long, value_name = "DAYS")]
    pub forbidden: Option<u32>,

    /// Days a Makefile may stay unmodified
    #[arg(long, value_name = "DAYS")]
    pub unchanged: Option<u32>,

    /// Resolve the host of every www-site
    #[arg(short = 'H', long = "check-host")]
    pub check_host: bool,

    /// Fetch every www-site (implies --check-host)
    #[arg(short = 'u', long = "check-url")]
    pub check_url: bool,

    /// Date markers with git blame instead of the Makefile mtime
    #[arg(long)]
    pub vcs_dates: bool,

    /// Rule preset
    #[arg(long, default_value = "all")]
    pub preset: Preset,

    /// Only run these checks, by name or code (comma-separated)
    #[arg(long)]
    pub rules: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

impl CheckArgs {
    /// Applies the command-line overrides to `config`.
    pub fn apply(&self, config: &mut Config) {
        let selection = &mut config.selection;
        if let Some(list) = &self.categories {
            selection.categories = Selection::parse_list(list);
        }
        if let Some(list) = &self.maintainers {
            selection.maintainers = Selection::parse_list(list);
        }
        if let Some(list) = &self.ports {
            selection.ports = Selection::parse_list(list);
        }

        let limits = &mut config.limits;
        if let Some(n) = self.plist {
            limits.plist_files = n;
        }
        let days = [
            (self.broken, &mut limits.broken_days),
            (self.deprecated, &mut limits.deprecated_days),
            (self.forbidden, &mut limits.forbidden_days),
            (self.unchanged, &mut limits.unchanged_days),
        ];
        for (flag, limit) in days {
            if let Some(value) = flag {
                *limit = value;
            }
        }

        let checks = &mut config.checks;
        checks.hostnames |= self.check_host;
        checks.urls |= self.check_url;
        checks.vcs_dates |= self.vcs_dates;
    }
}

/// Runs the check command.
pub fn run(config: Config, args: &CheckArgs) -> Result<ExitCode> {
    let index = super::load_index(&config)?;

    let rules = filter_rules(args.preset.rules(), args.rules.as_deref());
    let engine = Engine::builder()
        .config(config)
        .rules(rules)
        .build()
        .context("Failed to build engine")?;
    let config = engine.config();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    runtime.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, the report will be partial");
            token.cancel();
        }
    });

    let probes: Option<ProbeResults> = if config.checks.network_enabled() {
        let verifier = NetworkVerifier::new(VerifyOptions::from_checks(&config.checks))?;
        let sites: Vec<(String, String)> = select(&index, &config.selection)
            .into_iter()
            .map(|r| (r.name.clone(), r.www.clone()))
            .collect();
        Some(runtime.block_on(verifier.verify_all(sites, &cancel)))
    } else {
        None
    };

    tracing::info!(
        "Checking {} ports with {} rules",
        index.len(),
        engine.rule_count()
    );
    let report = engine.run(&index, &config.selection, probes.as_ref(), &cancel);
    runtime.shutdown_background();

    super::output::print(&report, args.format)?;

    let fail_on = config.fail_on()?;
    if report.has_violations_at(fail_on) {
        Ok(ExitCode::from(EXIT_DIAGNOSTICS))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Keeps the rules named in `filter`, by name or code. No filter keeps all.
fn filter_rules(rules: Vec<RuleBox>, filter: Option<&str>) -> Vec<RuleBox> {
    let Some(filter) = filter else {
        return rules;
    };
    let wanted = Selection::parse_list(filter);
    for name in &wanted {
        if !rules.iter().any(|r| r.name() == name || r.code() == name) {
            tracing::warn!("Unknown rule: {}", name);
        }
    }
    rules
        .into_iter()
        .filter(|r| wanted.contains(r.name()) || wanted.contains(r.code()))
        .collect()
}
