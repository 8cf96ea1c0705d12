//! Rule cross-checking the maintainer.

use crate::common::{diverging, skip_unresolved};
use crate::policy::maintainers_match;
use portlint_core::{Diagnostic, PortContext, Rule};

/// Flags index maintainers that differ from the Makefile `MAINTAINER`.
///
/// Both addresses are notified, since either one may be stale.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaintainerMismatch;

impl Rule for MaintainerMismatch {
    fn name(&self) -> &'static str {
        "maintainer-mismatch"
    }

    fn code(&self) -> &'static str {
        "PL014"
    }

    fn description(&self) -> &'static str {
        "Cross-checks the index maintainer with the Makefile MAINTAINER"
    }

    fn check(&self, ctx: &PortContext<'_>) -> Vec<Diagnostic> {
        let Some(makefile) = ctx.facts.maintainer.as_deref() else {
            return vec![];
        };
        if skip_unresolved(ctx, self, "MAINTAINER") {
            return vec![];
        }
        let index = ctx.record.maintainer.as_str();
        if maintainers_match(index, makefile) {
            return vec![];
        }
        vec![diverging(ctx, self, "maintainers", "MAINTAINER", index, makefile).notify(makefile)]
    }
}
