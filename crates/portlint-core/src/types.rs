//! Core types for lint diagnostics and reports.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational finding, a current-state report.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!(
                "unknown severity `{other}`. Valid values: error, warning, info"
            )),
        }
    }
}

/// A finding about one port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Package name of the port (e.g., "curl-8.6.0").
    pub port: String,
    /// Check code (e.g., "PL007").
    pub code: String,
    /// Check name (e.g., "comment-mismatch").
    pub check: String,
    /// Severity of this diagnostic.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Additional detail lines, such as the two diverging values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    /// Maintainers who should hear about this finding.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub maintainers: Vec<String>,
}

impl Diagnostic {
    /// Creates a new diagnostic.
    #[must_use]
    pub fn new(
        port: impl Into<String>,
        code: impl Into<String>,
        check: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            port: port.into(),
            code: code.into(),
            check: check.into(),
            severity,
            message: message.into(),
            notes: Vec::new(),
            maintainers: Vec::new(),
        }
    }

    /// Adds a detail line.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Replaces the severity.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Adds a maintainer to notify. Duplicates are ignored.
    #[must_use]
    pub fn notify(mut self, maintainer: impl Into<String>) -> Self {
        let maintainer = maintainer.into();
        if !maintainer.is_empty() && !self.maintainers.contains(&maintainer) {
            self.maintainers.push(maintainer);
        }
        self
    }

    /// Drops every maintainer notification from this diagnostic.
    #[must_use]
    pub fn quiet(mut self) -> Self {
        self.maintainers.clear();
        self
    }

    /// Formats the diagnostic for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!("{} {} for port {}\n", self.code, self.check, self.port);
        let _ = writeln!(output, "  {}: {}", self.severity, self.message);
        for note in &self.notes {
            let _ = writeln!(output, "  = {note}");
        }
        output
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}",
            self.port, self.severity, self.code, self.message
        )
    }
}

/// Per-maintainer notifications: maintainer, then check name, then ports.
pub type Notifications = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Result of a lint run.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LintReport {
    /// All diagnostics, in evaluation order.
    pub diagnostics: Vec<Diagnostic>,
    /// Number of ports in the loaded index.
    pub ports_total: usize,
    /// Number of ports kept by the selection.
    pub ports_selected: usize,
    /// Number of ports actually evaluated.
    pub ports_checked: usize,
    /// Whether the run was interrupted before every selected port was checked.
    #[serde(default)]
    pub interrupted: bool,
}

impl LintReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.has_violations_at(Severity::Error)
    }

    /// Returns true if there are any warnings or errors.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.has_violations_at(Severity::Warning)
    }

    /// Checks if any diagnostic meets or exceeds the given severity.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.diagnostics.iter().any(|d| d.severity >= severity)
    }

    /// Returns diagnostics filtered by severity.
    #[must_use]
    pub fn by_severity(&self, severity: Severity) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .collect()
    }

    /// Returns the diagnostics reported for one port.
    #[must_use]
    pub fn for_port(&self, port: &str) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.port == port).collect()
    }

    /// Counts diagnostics by severity as `(errors, warnings, infos)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        self.diagnostics
            .iter()
            .fold((0, 0, 0), |(e, w, i), d| match d.severity {
                Severity::Error => (e + 1, w, i),
                Severity::Warning => (e, w + 1, i),
                Severity::Info => (e, w, i + 1),
            })
    }

    /// Counts the distinct ports affected by each check, keyed by `(code, check)`.
    #[must_use]
    pub fn count_by_check(&self) -> BTreeMap<(String, String), usize> {
        let mut ports: BTreeMap<(String, String), Vec<&str>> = BTreeMap::new();
        for d in &self.diagnostics {
            let entry = ports.entry((d.code.clone(), d.check.clone())).or_default();
            if !entry.contains(&d.port.as_str()) {
                entry.push(&d.port);
            }
        }
        ports.into_iter().map(|(k, v)| (k, v.len())).collect()
    }

    /// Groups notified diagnostics by maintainer, then by check.
    ///
    /// Diagnostics without maintainers are left out.
    #[must_use]
    pub fn notifications(&self) -> Notifications {
        let mut grouped = Notifications::new();
        for d in &self.diagnostics {
            for maintainer in &d.maintainers {
                let ports = grouped
                    .entry(maintainer.clone())
                    .or_default()
                    .entry(d.check.clone())
                    .or_default();
                if !ports.contains(&d.port) {
                    ports.push(d.port.clone());
                }
            }
        }
        grouped
    }

    /// Formats the closing summary.
    #[must_use]
    pub fn format_summary(&self) -> String {
        use std::fmt::Write;
        let mut summary = String::new();
        let _ = writeln!(
            summary,
            "Selected {} port(s) out of {} in the index, checked {}, and found:",
            self.ports_selected, self.ports_total, self.ports_checked
        );
        for ((code, check), count) in self.count_by_check() {
            let plural = if count == 1 { "" } else { "s" };
            let _ = writeln!(summary, "  {count} port{plural} with {check} [{code}]");
        }
        let (errors, warnings, infos) = self.count_by_severity();
        let _ = writeln!(
            summary,
            "Total: {errors} error(s), {warnings} warning(s), {infos} info(s)"
        );
        if self.interrupted {
            let _ = writeln!(summary, "Run interrupted: report is partial");
        }
        summary
    }

    /// Adds diagnostics from another report.
    pub fn extend(&mut self, other: Self) {
        self.diagnostics.extend(other.diagnostics);
        self.ports_checked += other.ports_checked;
        self.interrupted |= other.interrupted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_diagnostic(port: &str, severity: Severity) -> Diagnostic {
        Diagnostic::new(
            port,
            "PL007",
            "comment-mismatch",
            severity,
            "Diverging comments between Index and Makefile",
        )
        .notify("alice@example.com")
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!("Warning".parse::<Severity>(), Ok(Severity::Warning));
        assert!("critical".parse::<Severity>().is_err());
    }

    #[test]
    fn severity_orders_info_below_error() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn notify_ignores_duplicates_and_empty() {
        let d = make_diagnostic("curl-8.6.0", Severity::Error)
            .notify("alice@example.com")
            .notify("");
        assert_eq!(d.maintainers, vec!["alice@example.com".to_string()]);
        assert!(d.quiet().maintainers.is_empty());
    }

    #[test]
    fn format_includes_notes() {
        let d = make_diagnostic("curl-8.6.0", Severity::Error)
            .with_note("Index:    'Command line tool'")
            .with_note("Makefile: 'Command line tool for URLs'");
        insta::assert_snapshot!(d.format(), @r"
        PL007 comment-mismatch for port curl-8.6.0
          error: Diverging comments between Index and Makefile
          = Index:    'Command line tool'
          = Makefile: 'Command line tool for URLs'
        ");
    }

    #[test]
    fn display_is_one_line() {
        let d = make_diagnostic("curl-8.6.0", Severity::Warning);
        assert_eq!(
            d.to_string(),
            "curl-8.6.0: warning [PL007] Diverging comments between Index and Makefile"
        );
    }

    #[test]
    fn counts_by_severity() {
        let mut report = LintReport::new();
        report
            .diagnostics
            .push(make_diagnostic("a-1", Severity::Error));
        report
            .diagnostics
            .push(make_diagnostic("b-1", Severity::Warning));
        report
            .diagnostics
            .push(make_diagnostic("c-1", Severity::Info));
        assert_eq!(report.count_by_severity(), (1, 1, 1));
        assert!(report.has_errors());
        assert!(report.has_violations_at(Severity::Info));
    }

    #[test]
    fn count_by_check_counts_ports_once() {
        let mut report = LintReport::new();
        report
            .diagnostics
            .push(make_diagnostic("a-1", Severity::Error));
        report
            .diagnostics
            .push(make_diagnostic("a-1", Severity::Error));
        report
            .diagnostics
            .push(make_diagnostic("b-1", Severity::Error));
        let counts = report.count_by_check();
        assert_eq!(
            counts.get(&("PL007".to_string(), "comment-mismatch".to_string())),
            Some(&2)
        );
    }

    #[test]
    fn notifications_group_by_maintainer_and_check() {
        let mut report = LintReport::new();
        report
            .diagnostics
            .push(make_diagnostic("a-1", Severity::Error).notify("bob@example.com"));
        report
            .diagnostics
            .push(make_diagnostic("b-1", Severity::Error));
        report
            .diagnostics
            .push(make_diagnostic("c-1", Severity::Error).quiet());

        let notes = report.notifications();
        assert_eq!(notes.len(), 2);
        assert_eq!(
            notes["alice@example.com"]["comment-mismatch"],
            vec!["a-1".to_string(), "b-1".to_string()]
        );
        assert_eq!(
            notes["bob@example.com"]["comment-mismatch"],
            vec!["a-1".to_string()]
        );
    }

    #[test]
    fn summary_flags_interrupted_runs() {
        let mut report = LintReport::new();
        report.ports_total = 10;
        report.ports_selected = 4;
        report.ports_checked = 2;
        report.interrupted = true;
        report
            .diagnostics
            .push(make_diagnostic("a-1", Severity::Error));

        let summary = report.format_summary();
        assert!(summary.starts_with("Selected 4 port(s) out of 10 in the index, checked 2"));
        assert!(summary.contains("  1 port with comment-mismatch [PL007]"));
        assert!(summary.contains("Run interrupted"));
    }
}
