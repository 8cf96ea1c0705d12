//! Rules on status markers (BROKEN, DEPRECATED, FORBIDDEN, IGNORE).
//!
//! A marker is expected to be temporary. [`Marked`] reports it while it is
//! recent and [`MarkedTooLong`] once it outlives its limit; exactly one of
//! them fires per marker. IGNORE is reported on its own by [`MarkedIgnore`]:
//! it is often assigned under conditions that are not evaluated here.

use portlint_core::{Diagnostic, Limits, Marker, MarkerKind, PortContext, Rule, Severity};

/// Marker kinds with an age limit, paired with that limit.
fn aged_markers<'a>(ctx: &PortContext<'a>) -> impl Iterator<Item = (MarkerKind, &'a Marker, i64)> {
    let limits = ctx.limits;
    ctx.facts
        .markers
        .iter()
        .filter_map(move |(kind, marker)| Some((kind, marker, limit_days(kind, limits)?)))
}

/// Days a marker may stay set. `None` for IGNORE.
#[must_use]
pub fn limit_days(kind: MarkerKind, limits: &Limits) -> Option<i64> {
    let days = match kind {
        MarkerKind::Broken => limits.broken_days,
        MarkerKind::Deprecated => limits.deprecated_days,
        MarkerKind::Forbidden => limits.forbidden_days,
        MarkerKind::Ignore => return None,
    };
    Some(i64::from(days))
}

/// Reports recent BROKEN, DEPRECATED, and FORBIDDEN markers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Marked;

impl Rule for Marked {
    fn name(&self) -> &'static str {
        "marked"
    }

    fn code(&self) -> &'static str {
        "PL021"
    }

    fn description(&self) -> &'static str {
        "Reports BROKEN, DEPRECATED and FORBIDDEN markers within their limit"
    }

    fn default_severity(&self) -> Severity {
        Severity::Info
    }

    fn check(&self, ctx: &PortContext<'_>) -> Vec<Diagnostic> {
        aged_markers(ctx)
            .filter(|(_, marker, limit)| ctx.age_days(marker.since) <= *limit)
            .map(|(kind, marker, _)| {
                ctx.diagnostic(self, format!("Marked as {kind}: '{}'", marker.reason))
                    .with_note(format!("set {} days ago", ctx.age_days(marker.since)))
            })
            .collect()
    }
}

/// Flags BROKEN, DEPRECATED, and FORBIDDEN markers older than their limit.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkedTooLong;

impl Rule for MarkedTooLong {
    fn name(&self) -> &'static str {
        "marked-too-long"
    }

    fn code(&self) -> &'static str {
        "PL022"
    }

    fn description(&self) -> &'static str {
        "Flags BROKEN, DEPRECATED and FORBIDDEN markers older than their limit"
    }

    fn check(&self, ctx: &PortContext<'_>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for (kind, marker, limit) in aged_markers(ctx) {
            let age = ctx.age_days(marker.since);
            if age <= limit {
                continue;
            }
            let mut d = ctx
                .diagnostic(self, format!("Marked as {kind} for too long ({age} days)"))
                .with_note(format!("reason: '{}'", marker.reason))
                .with_note(format!("limit is {limit} days"));
            if kind == MarkerKind::Deprecated {
                if let Some(date) = ctx.facts.markers.expiration_date {
                    d = d.with_note(format!("expires on {date}"));
                }
            }
            diagnostics.push(d);
        }
        diagnostics
    }
}

/// Reports IGNORE markers.
///
/// Presence-based and therefore unreliable: the finding is always a warning,
/// severity overrides are refused, and maintainers are not notified.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkedIgnore;

impl Rule for MarkedIgnore {
    fn name(&self) -> &'static str {
        "marked-ignore"
    }

    fn code(&self) -> &'static str {
        "PL023"
    }

    fn description(&self) -> &'static str {
        "Reports IGNORE markers (unreliable: conditions are not evaluated)"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn allows_severity_override(&self) -> bool {
        false
    }

    fn check(&self, ctx: &PortContext<'_>) -> Vec<Diagnostic> {
        let Some(marker) = ctx.facts.markers.get(MarkerKind::Ignore) else {
            return vec![];
        };
        vec![ctx
            .diagnostic(self, format!("Marked as IGNORE: '{}'", marker.reason))
            .with_note("unreliable: the assignment may be conditional")
            .quiet()]
    }
}
