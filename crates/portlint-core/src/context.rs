//! Context types for rule execution.

use crate::config::Limits;
use crate::index::IndexRecord;
use crate::makefile::MakefileFacts;
use crate::network::WwwProbe;
use crate::rule::Rule;
use crate::types::Diagnostic;
use chrono::{DateTime, Utc};

/// Context provided to rules for one port.
///
/// Everything a rule may look at is here, so rules never touch the
/// filesystem or the network themselves.
#[derive(Debug, Clone, Copy)]
pub struct PortContext<'a> {
    /// The index record of the port.
    pub record: &'a IndexRecord,
    /// Facts extracted from the port's Makefile.
    pub facts: &'a MakefileFacts,
    /// Thresholds of the run.
    pub limits: &'a Limits,
    /// Time the run started. Every age is measured from here.
    pub now: DateTime<Utc>,
    /// Network probe of the www-site, if verification ran for this port.
    pub probe: Option<&'a WwwProbe>,
}

impl<'a> PortContext<'a> {
    /// Creates a new port context.
    #[must_use]
    pub fn new(
        record: &'a IndexRecord,
        facts: &'a MakefileFacts,
        limits: &'a Limits,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            record,
            facts,
            limits,
            now,
            probe: None,
        }
    }

    /// Attaches the probe of the port's www-site.
    #[must_use]
    pub fn with_probe(mut self, probe: Option<&'a WwwProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Package name of the port.
    #[must_use]
    pub fn port(&self) -> &'a str {
        &self.record.name
    }

    /// Starts a diagnostic for `rule` at its default severity.
    ///
    /// The index maintainer is notified unless the rule calls
    /// [`Diagnostic::quiet`].
    #[must_use]
    pub fn diagnostic(&self, rule: &dyn Rule, message: impl Into<String>) -> Diagnostic {
        Diagnostic::new(
            self.record.name.clone(),
            rule.code(),
            rule.name(),
            rule.default_severity(),
            message,
        )
        .notify(self.record.maintainer.clone())
    }

    /// Whole days elapsed between `since` and the start of the run.
    ///
    /// Partial days are truncated, so an age equal to a threshold never
    /// exceeds it.
    #[must_use]
    pub fn age_days(&self, since: DateTime<Utc>) -> i64 {
        (self.now - since).num_days()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexRecord;
    use chrono::Duration;

    const LINE: &str = "xterm-390|/usr/ports/x11/xterm|/usr/local|Terminal emulator for the X Window System|/usr/ports/x11/xterm/pkg-descr|x11@FreeBSD.org|x11|||https://invisible-island.net/xterm/|||";

    fn facts(now: DateTime<Utc>) -> MakefileFacts {
        let tmp = tempfile::TempDir::new().unwrap();
        MakefileFacts::from_content(
            tmp.path().join("Makefile"),
            "PORTNAME=\txterm\n",
            tmp.path(),
            now,
            None,
            |_| None,
        )
    }

    #[test]
    fn age_truncates_partial_days() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let record = IndexRecord::parse(LINE).unwrap();
        let facts = facts(now);
        let limits = Limits::default();
        let ctx = PortContext::new(&record, &facts, &limits, now);

        assert_eq!(ctx.age_days(now - Duration::hours(47)), 1);
        assert_eq!(ctx.age_days(now - Duration::days(180)), 180);
        assert_eq!(ctx.age_days(now), 0);
        assert_eq!(ctx.port(), "xterm-390");
    }
}
