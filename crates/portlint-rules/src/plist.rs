//! Rules on the packing list.

use portlint_core::{Diagnostic, PlistSource, PortContext, Rule, Severity};

/// Flags ports with no way of listing the files they install.
///
/// Maintainers are not notified: some ports generate their list in ways the
/// Makefile reader cannot see.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingPackingList;

impl Rule for MissingPackingList {
    fn name(&self) -> &'static str {
        "missing-packing-list"
    }

    fn code(&self) -> &'static str {
        "PL012"
    }

    fn description(&self) -> &'static str {
        "Flags ports without pkg-plist, PLIST_FILES, PLIST or PLIST_SUB"
    }

    fn check(&self, ctx: &PortContext<'_>) -> Vec<Diagnostic> {
        if ctx.facts.plist != PlistSource::Missing {
            return vec![];
        }
        vec![ctx
            .diagnostic(self, "Nonexistent pkg-plist/PLIST_FILES/PLIST/PLIST_SUB")
            .quiet()]
    }
}

/// Flags `PLIST_FILES` lists that should be a `pkg-plist` file.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlistFilesAbuse;

impl Rule for PlistFilesAbuse {
    fn name(&self) -> &'static str {
        "plist-files-abuse"
    }

    fn code(&self) -> &'static str {
        "PL013"
    }

    fn description(&self) -> &'static str {
        "Flags PLIST_FILES with more entries than limits.plist_files"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &PortContext<'_>) -> Vec<Diagnostic> {
        let PlistSource::Files { count } = ctx.facts.plist else {
            return vec![];
        };
        if count <= ctx.limits.plist_files {
            return vec![];
        }
        vec![ctx.diagnostic(self, format!("PLIST_FILES abuse at {count} entries"))
            .with_note(format!("limit is {} entries", ctx.limits.plist_files))]
    }
}
