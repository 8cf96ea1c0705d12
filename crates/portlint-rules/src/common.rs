//! Helpers shared by the comparison rules.

use portlint_core::makefile::AssignOp;
use portlint_core::{Diagnostic, PortContext, Rule};
use tracing::debug;

/// Returns true, and logs why, if a Makefile variable needs make to evaluate it.
///
/// That is a value referencing other variables, or a `!=` shell assignment.
pub(crate) fn skip_unresolved(ctx: &PortContext<'_>, rule: &dyn Rule, variable: &str) -> bool {
    let Some(var) = ctx.facts.variable(variable) else {
        return false;
    };
    if !var.is_unresolved() {
        return false;
    }
    let op = if var.op == AssignOp::Shell { "!=" } else { "=" };
    debug!(
        "Skipping {} for port {}: {}{} '{}'",
        rule.name(),
        ctx.port(),
        variable,
        op,
        var.value
    );
    true
}

/// Builds a mismatch diagnostic carrying both values.
pub(crate) fn diverging(
    ctx: &PortContext<'_>,
    rule: &dyn Rule,
    field: &str,
    variable: &str,
    index: &str,
    makefile: &str,
) -> Diagnostic {
    ctx.diagnostic(
        rule,
        format!("Diverging {field} between Index and Makefile"),
    )
    .with_note(format!("Index:    '{index}'"))
    .with_note(format!("Makefile: '{makefile}' ({variable})"))
}
