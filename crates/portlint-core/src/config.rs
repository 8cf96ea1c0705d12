//! Configuration types for portlint.

use crate::Severity;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// Top-level configuration for portlint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Root of the ports tree (default: `/usr/ports`).
    #[serde(default = "default_ports_root")]
    pub ports_root: PathBuf,

    /// Index file to load. Discovered under `ports_root` when unset.
    #[serde(default)]
    pub index: Option<PathBuf>,

    /// Lowest severity that makes the run fail (default: "info").
    #[serde(default)]
    pub fail_on: Option<String>,

    /// Which ports to check.
    #[serde(default)]
    pub selection: Selection,

    /// Staleness and abuse thresholds.
    #[serde(default)]
    pub limits: Limits,

    /// Optional and expensive checks.
    #[serde(default)]
    pub checks: Checks,

    /// Per-rule configurations.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ports_root: default_ports_root(),
            index: None,
            fail_on: None,
            selection: Selection::default(),
            limits: Limits::default(),
            checks: Checks::default(),
            rules: HashMap::new(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks thresholds and flag combinations before any port is looked at.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.limits.validate()?;
        if self.checks.concurrency == 0 {
            return Err(ConfigError::Invalid {
                setting: "checks.concurrency",
                message: "must be at least 1".to_string(),
            });
        }
        if self.checks.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                setting: "checks.timeout_secs",
                message: "must be at least 1".to_string(),
            });
        }
        self.fail_on()?;
        for (name, rule) in &self.rules {
            if let Some(severity) = &rule.severity {
                if severity.parse::<Severity>().is_err() {
                    return Err(ConfigError::Invalid {
                        setting: "rules.*.severity",
                        message: format!("unknown severity `{severity}` for rule `{name}`"),
                    });
                }
            }
        }
        Ok(())
    }

    /// Returns the effective failure threshold.
    ///
    /// # Errors
    ///
    /// Returns an error if `fail_on` names no severity.
    pub fn fail_on(&self) -> Result<Severity, ConfigError> {
        self.fail_on
            .as_deref()
            .unwrap_or("info")
            .parse()
            .map_err(|message| ConfigError::Invalid {
                setting: "fail_on",
                message,
            })
    }

    /// Checks if a rule is enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rules
            .get(rule_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, rule_name: &str) -> Option<Severity> {
        self.rules
            .get(rule_name)
            .and_then(|c| c.severity.as_deref())
            .and_then(|s| s.parse().ok())
    }
}

fn default_ports_root() -> PathBuf {
    PathBuf::from(crate::index::DEFAULT_PORTS_ROOT)
}

/// Selection criteria, combined with AND. An empty set does not restrict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Selection {
    /// Categories to keep, compared case-insensitively.
    #[serde(default)]
    pub categories: BTreeSet<String>,
    /// Maintainers to keep, compared case-insensitively.
    #[serde(default)]
    pub maintainers: BTreeSet<String>,
    /// Ports to keep, by package name or origin directory name.
    #[serde(default)]
    pub ports: BTreeSet<String>,
}

impl Selection {
    /// Returns true if no criterion is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.maintainers.is_empty() && self.ports.is_empty()
    }

    /// Returns a copy with categories and maintainers lower-cased.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let lower = |set: &BTreeSet<String>| set.iter().map(|s| s.to_lowercase()).collect();
        Self {
            categories: lower(&self.categories),
            maintainers: lower(&self.maintainers),
            ports: self.ports.clone(),
        }
    }

    /// Builds a set from a comma-separated list, dropping empty items.
    #[must_use]
    pub fn parse_list(list: &str) -> BTreeSet<String> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

/// Thresholds for the abuse and staleness checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Limits {
    /// Largest number of `PLIST_FILES` entries tolerated inline.
    #[serde(default = "default_plist_files")]
    pub plist_files: usize,
    /// Days a port may stay BROKEN.
    #[serde(default = "default_broken_days")]
    pub broken_days: u32,
    /// Days a port may stay DEPRECATED.
    #[serde(default = "default_deprecated_days")]
    pub deprecated_days: u32,
    /// Days a port may stay FORBIDDEN.
    #[serde(default = "default_forbidden_days")]
    pub forbidden_days: u32,
    /// Days a Makefile may stay unmodified.
    #[serde(default = "default_unchanged_days")]
    pub unchanged_days: u32,
}

/// Smallest accepted value for `plist_files`.
pub const MIN_PLIST_FILES: usize = 2;

/// Smallest accepted value for day-based limits.
pub const MIN_DAYS: u32 = 30;

impl Default for Limits {
    fn default() -> Self {
        Self {
            plist_files: default_plist_files(),
            broken_days: default_broken_days(),
            deprecated_days: default_deprecated_days(),
            forbidden_days: default_forbidden_days(),
            unchanged_days: default_unchanged_days(),
        }
    }
}

impl Limits {
    /// Checks every threshold against its minimum.
    ///
    /// # Errors
    ///
    /// Returns the first threshold below its minimum.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.plist_files < MIN_PLIST_FILES {
            return Err(ConfigError::Invalid {
                setting: "limits.plist_files",
                message: format!("must be >= {MIN_PLIST_FILES}"),
            });
        }
        let days = [
            ("limits.broken_days", self.broken_days),
            ("limits.deprecated_days", self.deprecated_days),
            ("limits.forbidden_days", self.forbidden_days),
            ("limits.unchanged_days", self.unchanged_days),
        ];
        for (setting, value) in days {
            if value < MIN_DAYS {
                return Err(ConfigError::Invalid {
                    setting,
                    message: format!("must be >= {MIN_DAYS} days"),
                });
            }
        }
        Ok(())
    }
}

fn default_plist_files() -> usize {
    6
}

fn default_broken_days() -> u32 {
    6 * 30
}

fn default_deprecated_days() -> u32 {
    6 * 30
}

fn default_forbidden_days() -> u32 {
    3 * 30
}

fn default_unchanged_days() -> u32 {
    3 * 365
}

/// Switches for the optional checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Checks {
    /// Resolve the host of every www-site.
    #[serde(default)]
    pub hostnames: bool,
    /// Fetch every www-site. Implies `hostnames`.
    #[serde(default)]
    pub urls: bool,
    /// Date markers with `git blame` instead of the Makefile mtime.
    #[serde(default)]
    pub vcs_dates: bool,
    /// Maximum number of network probes in flight.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Timeout of a single network probe, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for Checks {
    fn default() -> Self {
        Self {
            hostnames: false,
            urls: false,
            vcs_dates: false,
            concurrency: default_concurrency(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Checks {
    /// Returns true if hostnames must be resolved.
    #[must_use]
    pub fn resolve_hosts(&self) -> bool {
        self.hostnames || self.urls
    }

    /// Returns true if any network check is enabled.
    #[must_use]
    pub fn network_enabled(&self) -> bool {
        self.resolve_hosts()
    }
}

fn default_concurrency() -> usize {
    16
}

fn default_timeout_secs() -> u64 {
    10
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<String>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    #[diagnostic(code(portlint::config::io))]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    #[diagnostic(code(portlint::config::parse))]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// A setting holds an unacceptable value.
    #[error("Invalid setting `{setting}`: {message}")]
    #[diagnostic(
        code(portlint::config::invalid),
        help("fix the value in portlint.toml or on the command line")
    )]
    Invalid {
        /// Dotted name of the setting.
        setting: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ports_root, PathBuf::from("/usr/ports"));
        assert!(config.selection.is_empty());
        assert_eq!(config.limits.plist_files, 6);
        assert_eq!(config.limits.broken_days, 180);
        assert_eq!(config.limits.forbidden_days, 90);
        assert_eq!(config.limits.unchanged_days, 1095);
        assert!(!config.checks.network_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
ports_root = "/home/ports"
fail_on = "warning"

[selection]
categories = ["www", "net"]
maintainers = ["alice@example.com"]

[limits]
broken_days = 60

[checks]
urls = true

[rules.comment-too-long]
enabled = false

[rules.unusual-prefix]
severity = "error"
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.ports_root, PathBuf::from("/home/ports"));
        assert_eq!(config.selection.categories.len(), 2);
        assert_eq!(config.limits.broken_days, 60);
        assert_eq!(config.limits.deprecated_days, 180);
        assert!(config.checks.resolve_hosts());
        assert!(!config.is_rule_enabled("comment-too-long"));
        assert!(config.is_rule_enabled("comment-mismatch"));
        assert_eq!(config.rule_severity("unusual-prefix"), Some(Severity::Error));
        assert_eq!(config.fail_on().ok(), Some(Severity::Warning));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(Config::parse("[limits]\nbroken = 3\n").is_err());
    }

    #[test]
    fn test_validate_rejects_small_limits() {
        let mut config = Config::default();
        config.limits.broken_days = 10;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("limits.broken_days"));

        let mut config = Config::default();
        config.limits.plist_files = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_severity() {
        let mut config = Config::default();
        config.fail_on = Some("fatal".to_string());
        assert!(config.validate().is_err());

        let config = Config::parse("[rules.empty-www]\nseverity = \"loud\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn normalized_lowercases_categories_and_maintainers() {
        let selection = Selection {
            categories: Selection::parse_list("WWW,net"),
            maintainers: Selection::parse_list("Alice@Example.com"),
            ports: Selection::parse_list("p5-XML-Parser"),
        };
        let normalized = selection.normalized();
        assert_eq!(normalized.categories, Selection::parse_list("net,www"));
        assert_eq!(normalized.maintainers, Selection::parse_list("alice@example.com"));
        assert_eq!(normalized.ports, selection.ports);
    }

    #[test]
    fn test_parse_list() {
        let set = Selection::parse_list("www, net,,mail");
        assert_eq!(set.len(), 3);
        assert!(set.contains("net"));
    }
}
