//! Rule flagging installation prefixes other than the customary ones.
//!
//! Ports install under `/usr/local`. A handful of port families have their
//! own prefix (Linux compatibility, qmail, cross toolchains, ...), see
//! [`is_conventional_prefix`].

use crate::policy::is_conventional_prefix;
use portlint_core::{Diagnostic, PortContext, Rule, Severity};

/// Rule code for unusual-prefix.
pub const CODE: &str = "PL003";

/// Rule name for unusual-prefix.
pub const NAME: &str = "unusual-prefix";

/// Warns about an unusual installation prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnusualPrefix;

impl UnusualPrefix {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for UnusualPrefix {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Flags installation prefixes that are not customary for the port"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &PortContext<'_>) -> Vec<Diagnostic> {
        let prefix = &ctx.record.prefix;
        if is_conventional_prefix(&ctx.record.name, prefix) {
            return vec![];
        }
        vec![ctx.diagnostic(self, format!("Unusual installation-prefix '{prefix}'"))]
    }
}
