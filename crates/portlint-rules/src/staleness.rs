//! Rule reporting ports left untouched for a long time.

use portlint_core::{Diagnostic, PortContext, Rule, Severity};

/// Reports ports whose Makefile is older than `limits.unchanged_days`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnchangedTooLong;

impl Rule for UnchangedTooLong {
    fn name(&self) -> &'static str {
        "unchanged-too-long"
    }

    fn code(&self) -> &'static str {
        "PL024"
    }

    fn description(&self) -> &'static str {
        "Reports ports whose Makefile has not changed for limits.unchanged_days"
    }

    fn default_severity(&self) -> Severity {
        Severity::Info
    }

    fn check(&self, ctx: &PortContext<'_>) -> Vec<Diagnostic> {
        let age = ctx.age_days(ctx.facts.last_modified);
        let limit = i64::from(ctx.limits.unchanged_days);
        if age <= limit {
            return vec![];
        }
        vec![ctx.diagnostic(self, format!("No modification for {age} days (limit {limit})"))]
    }
}
