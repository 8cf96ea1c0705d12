//! Rule engine orchestrating the checks of selected ports.

use crate::config::{Config, Selection};
use crate::context::PortContext;
use crate::index::{IndexRecord, PortIndex};
use crate::makefile::{ExtractOptions, FactsCache, FactsError, MakefileFacts};
use crate::network::{ProbeResults, WwwProbe};
use crate::rule::{Rule, RuleBox};
use crate::selector;
use crate::types::{Diagnostic, LintReport, Severity};

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that can occur while setting up the engine.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum EngineError {
    /// Two rules share a name or a code.
    #[error("Duplicate rule `{key}`")]
    #[diagnostic(code(portlint::engine::duplicate_rule))]
    DuplicateRule {
        /// The name or code registered twice.
        key: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    #[diagnostic(transparent)]
    Config(#[from] crate::config::ConfigError),
}

/// A check run by the engine itself before any rule.
///
/// When it fires, the port has no facts and no rule runs for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateCheck {
    /// Check code.
    pub code: &'static str,
    /// Check name.
    pub name: &'static str,
    /// What the check reports.
    pub description: &'static str,
}

/// Origin directory absent.
pub const MISSING_PORT_PATH: GateCheck = GateCheck {
    code: "PL001",
    name: "missing-port-path",
    description: "The port's origin directory does not exist",
};

/// Origin directory without a Makefile.
pub const MISSING_MAKEFILE: GateCheck = GateCheck {
    code: "PL002",
    name: "missing-makefile",
    description: "The port's origin directory has no readable Makefile",
};

/// Gate checks, in evaluation order.
pub const GATE_CHECKS: [GateCheck; 2] = [MISSING_PORT_PATH, MISSING_MAKEFILE];

/// Builder for configuring an [`Engine`].
#[derive(Default)]
pub struct EngineBuilder {
    rules: Vec<RuleBox>,
    config: Option<Config>,
    now: Option<DateTime<Utc>>,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule to the engine.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule to the engine.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds several boxed rules, keeping their order.
    #[must_use]
    pub fn rules(mut self, rules: impl IntoIterator<Item = RuleBox>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Pins the reference time. Defaults to the time of [`build`](Self::build).
    #[must_use]
    pub fn now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Builds the engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or two rules share a
    /// name or a code.
    pub fn build(self) -> Result<Engine, EngineError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let mut seen = HashSet::new();
        let gates = GATE_CHECKS.iter().flat_map(|g| [g.name, g.code]);
        let rules = self.rules.iter().flat_map(|r| [r.name(), r.code()]);
        for key in gates.chain(rules) {
            if !seen.insert(key) {
                return Err(EngineError::DuplicateRule {
                    key: key.to_string(),
                });
            }
        }

        Ok(Engine {
            rules: self.rules,
            config,
            now: self.now.unwrap_or_else(Utc::now),
        })
    }
}

/// The engine that runs every check against the selected ports.
///
/// Use [`Engine::builder()`] to construct an instance.
pub struct Engine {
    rules: Vec<RuleBox>,
    config: Config,
    now: DateTime<Utc>,
}

impl Engine {
    /// Creates a new builder for configuring an engine.
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Returns the reference time of this engine.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Creates a facts cache using the configured extraction options.
    #[must_use]
    pub fn facts_cache(&self) -> FactsCache {
        FactsCache::new(ExtractOptions {
            vcs_dates: self.config.checks.vcs_dates,
        })
    }

    /// Runs every enabled rule against one port with extracted facts.
    #[must_use]
    pub fn evaluate(
        &self,
        record: &IndexRecord,
        facts: &MakefileFacts,
        probe: Option<&WwwProbe>,
    ) -> Vec<Diagnostic> {
        let ctx = PortContext::new(record, facts, &self.config.limits, self.now).with_probe(probe);
        let mut diagnostics = Vec::new();

        for rule in &self.rules {
            if !self.config.is_rule_enabled(rule.name()) {
                debug!("Skipping disabled rule: {}", rule.name());
                continue;
            }

            let found = rule.check(&ctx);
            diagnostics.extend(self.apply_severity_override(rule.as_ref(), found));
        }

        diagnostics
    }

    /// Checks one port, extracting its facts through `cache`.
    ///
    /// A missing origin directory, or a missing or unreadable Makefile, yields
    /// that single diagnostic and no rule runs.
    pub fn check_port(
        &self,
        record: &IndexRecord,
        cache: &mut FactsCache,
        probe: Option<&WwwProbe>,
    ) -> Vec<Diagnostic> {
        let extracted = cache.get_or_extract(record);
        self.diagnose(record, extracted, probe)
    }

    fn diagnose(
        &self,
        record: &IndexRecord,
        extracted: &Result<MakefileFacts, FactsError>,
        probe: Option<&WwwProbe>,
    ) -> Vec<Diagnostic> {
        match extracted {
            Ok(facts) => self.evaluate(record, facts, probe),
            Err(FactsError::MissingPortPath { path }) => self.gate(
                record,
                MISSING_PORT_PATH,
                format!("Nonexistent port-path '{}'", path.display()),
            ),
            Err(FactsError::MissingMakefile { path }) => self.gate(
                record,
                MISSING_MAKEFILE,
                format!("Nonexistent Makefile '{}'", path.display()),
            ),
            Err(FactsError::Io { path, source }) => {
                warn!("Failed to read the Makefile of port {}: {}", record.name, source);
                self.gate(
                    record,
                    MISSING_MAKEFILE,
                    format!("Unreadable Makefile '{}': {source}", path.display()),
                )
            }
        }
    }

    fn gate(&self, record: &IndexRecord, check: GateCheck, message: String) -> Vec<Diagnostic> {
        if !self.config.is_rule_enabled(check.name) {
            debug!("Skipping disabled check: {}", check.name);
            return Vec::new();
        }
        let severity = self
            .config
            .rule_severity(check.name)
            .unwrap_or(Severity::Error);
        vec![
            Diagnostic::new(record.name.clone(), check.code, check.name, severity, message)
                .notify(record.maintainer.clone()),
        ]
    }

    /// Applies severity overrides from configuration.
    fn apply_severity_override(
        &self,
        rule: &dyn Rule,
        mut diagnostics: Vec<Diagnostic>,
    ) -> Vec<Diagnostic> {
        let Some(severity) = self.config.rule_severity(rule.name()) else {
            return diagnostics;
        };
        if !rule.allows_severity_override() {
            debug!("Rule {} ignores severity overrides", rule.name());
            return diagnostics;
        }
        for d in &mut diagnostics {
            d.severity = severity;
        }
        diagnostics
    }

    /// Selects ports from the index and checks them in package-name order.
    ///
    /// The run stops early, and the report is flagged as interrupted, when
    /// `cancel` fires or when a port's www-site was left unprobed by an
    /// interrupted verification.
    #[must_use]
    pub fn run(
        &self,
        index: &PortIndex,
        selection: &Selection,
        probes: Option<&ProbeResults>,
        cancel: &CancellationToken,
    ) -> LintReport {
        let selected = selector::select(index, selection);
        let mut report = LintReport {
            ports_total: index.len(),
            ports_selected: selected.len(),
            ..LintReport::default()
        };
        let mut cache = self.facts_cache();

        for record in selected {
            if cancel.is_cancelled() {
                warn!("Run cancelled after {} ports", report.ports_checked);
                report.interrupted = true;
                break;
            }

            let probe = probes.and_then(|p| p.get(&record.name));
            if probe.is_none()
                && probes.is_some_and(|p| p.interrupted)
                && !record.www.trim().is_empty()
            {
                warn!(
                    "Verification was interrupted before port {}, stopping",
                    record.name
                );
                report.interrupted = true;
                break;
            }

            report
                .diagnostics
                .extend(self.check_port(record, &mut cache, probe));
            report.ports_checked += 1;
        }

        info!(
            "Checked {} of {} selected ports: {} diagnostics",
            report.ports_checked,
            report.ports_selected,
            report.diagnostics.len()
        );
        report
    }
}
