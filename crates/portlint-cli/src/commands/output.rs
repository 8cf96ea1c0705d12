//! Output formatting for lint reports.

use anyhow::Result;
use portlint_core::{LintReport, Severity};
use std::fmt::Write;

use crate::OutputFormat;

/// Print a lint report in the specified format.
pub fn print(report: &LintReport, format: OutputFormat) -> Result<()> {
    let rendered = match format {
        OutputFormat::Text => render_text(report),
        OutputFormat::Json => serde_json::to_string_pretty(report)? + "\n",
        OutputFormat::Compact => render_compact(report),
        OutputFormat::Maintainers => render_maintainers(report),
    };
    print!("{rendered}");
    Ok(())
}

fn render_text(report: &LintReport) -> String {
    let mut out = String::new();
    for d in &report.diagnostics {
        let severity = match d.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
            Severity::Info => "\x1b[34minfo\x1b[0m",
        };
        let _ = writeln!(out, "{} {} for port {}", d.code, d.check, d.port);
        let _ = writeln!(out, "  {severity}: {}", d.message);
        for note in &d.notes {
            let _ = writeln!(out, "  = {note}");
        }
        out.push('\n');
    }

    let (errors, warnings, _) = report.count_by_severity();
    let color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };
    let _ = write!(out, "{color}{}\x1b[0m", report.format_summary());
    out
}

fn render_compact(report: &LintReport) -> String {
    report
        .diagnostics
        .iter()
        .map(|d| format!("{d}\n"))
        .collect()
}

/// One block per maintainer, listing the affected ports under each check.
fn render_maintainers(report: &LintReport) -> String {
    let mut out = String::new();
    for (maintainer, checks) in report.notifications() {
        let _ = writeln!(out, "{maintainer}:");
        for (check, ports) in checks {
            let _ = writeln!(out, "  {check}: {}", ports.join(", "));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use portlint_core::Diagnostic;

    fn report() -> LintReport {
        let mut report = LintReport::new();
        report.ports_total = 3;
        report.ports_selected = 2;
        report.ports_checked = 2;
        report.diagnostics = vec![
            Diagnostic::new(
                "curl-8.6.0",
                "PL007",
                "comment-mismatch",
                Severity::Error,
                "Diverging comments between Index and Makefile",
            )
            .notify("sunpoet@FreeBSD.org"),
            Diagnostic::new(
                "wget-1.21",
                "PL017",
                "empty-www",
                Severity::Error,
                "Empty www-site",
            )
            .notify("sunpoet@FreeBSD.org")
            .notify("ports@FreeBSD.org"),
            Diagnostic::new(
                "wget-1.21",
                "PL023",
                "marked-ignore",
                Severity::Warning,
                "Marked as IGNORE: 'needs a license'",
            ),
        ];
        report
    }

    #[test]
    fn compact_is_one_line_per_diagnostic() {
        insta::assert_snapshot!(render_compact(&report()), @r"
        curl-8.6.0: error [PL007] Diverging comments between Index and Makefile
        wget-1.21: error [PL017] Empty www-site
        wget-1.21: warning [PL023] Marked as IGNORE: 'needs a license'
        ");
    }

    #[test]
    fn maintainers_skip_quiet_diagnostics() {
        insta::assert_snapshot!(render_maintainers(&report()), @r"
        ports@FreeBSD.org:
          empty-www: wget-1.21
        sunpoet@FreeBSD.org:
          comment-mismatch: curl-8.6.0
          empty-www: wget-1.21
        ");
    }

    #[test]
    fn text_ends_with_summary() {
        let text = render_text(&report());
        assert!(text.contains("PL017 empty-www for port wget-1.21"));
        assert!(text.contains("Total: 2 error(s), 1 warning(s), 0 info(s)"));
    }

    #[test]
    fn json_round_trips() {
        let json = serde_json::to_string(&report()).unwrap();
        let back: LintReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.diagnostics, report().diagnostics);
    }
}
