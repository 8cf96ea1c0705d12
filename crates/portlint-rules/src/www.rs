//! Rules on the www-site.
//!
//! [`WwwUnresolvable`] and [`WwwUnreachable`] only report what the network
//! verifier found; they stay silent for ports that were not probed.

use crate::common::{diverging, skip_unresolved};
use portlint_core::{Diagnostic, PortContext, Reachability, Resolution, Rule, Severity};

/// HTTP statuses that mean the site is gone rather than temporarily failing.
pub const DEFINITIVE_STATUSES: [u16; 4] = [401, 404, 410, 451];

/// Flags ports without a www-site.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyWww;

impl Rule for EmptyWww {
    fn name(&self) -> &'static str {
        "empty-www"
    }

    fn code(&self) -> &'static str {
        "PL017"
    }

    fn description(&self) -> &'static str {
        "Flags ports with an empty www-site"
    }

    fn check(&self, ctx: &PortContext<'_>) -> Vec<Diagnostic> {
        if ctx.record.www.trim().is_empty() {
            vec![ctx.diagnostic(self, "Empty www-site")]
        } else {
            vec![]
        }
    }
}

/// Flags index www-sites that are not the Makefile `WWW`.
///
/// `WWW` may list several sites; the index holds the first one.
#[derive(Debug, Clone, Copy, Default)]
pub struct WwwMismatch;

impl Rule for WwwMismatch {
    fn name(&self) -> &'static str {
        "www-mismatch"
    }

    fn code(&self) -> &'static str {
        "PL018"
    }

    fn description(&self) -> &'static str {
        "Cross-checks the index www-site with the Makefile WWW"
    }

    fn check(&self, ctx: &PortContext<'_>) -> Vec<Diagnostic> {
        let Some(makefile) = ctx.facts.www.as_deref() else {
            return vec![];
        };
        if skip_unresolved(ctx, self, "WWW") {
            return vec![];
        }
        let index = ctx.record.www.trim();
        if index == makefile.trim() || makefile.split_whitespace().any(|site| site == index) {
            return vec![];
        }
        vec![diverging(ctx, self, "www-site", "WWW", index, makefile)]
    }
}

/// Flags www-sites whose host does not resolve.
#[derive(Debug, Clone, Copy, Default)]
pub struct WwwUnresolvable;

impl Rule for WwwUnresolvable {
    fn name(&self) -> &'static str {
        "www-unresolvable"
    }

    fn code(&self) -> &'static str {
        "PL019"
    }

    fn description(&self) -> &'static str {
        "Flags www-sites whose host does not resolve (needs --check-host)"
    }

    fn check(&self, ctx: &PortContext<'_>) -> Vec<Diagnostic> {
        let Some(probe) = ctx.probe else {
            return vec![];
        };
        let Resolution::Unresolvable { reason } = &probe.resolution else {
            return vec![];
        };
        let host = probe.host.as_deref().unwrap_or(probe.url.as_str());
        vec![ctx
            .diagnostic(self, format!("Unresolvable www-site '{host}'"))
            .with_note(reason.clone())]
    }
}

/// Flags www-sites that could not be fetched.
///
/// Errors for statuses in [`DEFINITIVE_STATUSES`], warnings for everything
/// else, since other failures are often transient.
#[derive(Debug, Clone, Copy, Default)]
pub struct WwwUnreachable;

impl Rule for WwwUnreachable {
    fn name(&self) -> &'static str {
        "www-unreachable"
    }

    fn code(&self) -> &'static str {
        "PL020"
    }

    fn description(&self) -> &'static str {
        "Flags www-sites that cannot be fetched (needs --check-url)"
    }

    fn check(&self, ctx: &PortContext<'_>) -> Vec<Diagnostic> {
        let Some(probe) = ctx.probe else {
            return vec![];
        };
        let Reachability::Unreachable { reason, status } = &probe.reachability else {
            return vec![];
        };
        let severity = match status {
            Some(code) if DEFINITIVE_STATUSES.contains(code) => Severity::Error,
            _ => Severity::Warning,
        };
        vec![ctx
            .diagnostic(self, format!("Unaccessible www-site '{}'", probe.url))
            .with_severity(severity)
            .with_note(reason.clone())]
    }
}
