//! Rules on port categories.

use crate::common::{diverging, skip_unresolved};
use crate::policy::is_official_category;
use portlint_core::{Diagnostic, PortContext, Rule, Severity};
use std::collections::BTreeSet;

/// Makefile categories, unless they reference make variables.
fn resolved_categories<'a>(ctx: &PortContext<'a>, rule: &dyn Rule) -> Option<&'a [String]> {
    let categories = ctx.facts.categories.as_deref()?;
    if skip_unresolved(ctx, rule, "CATEGORIES") {
        return None;
    }
    Some(categories)
}

/// Flags categories missing from the official list, in the index or the Makefile.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnofficialCategory;

impl Rule for UnofficialCategory {
    fn name(&self) -> &'static str {
        "unofficial-category"
    }

    fn code(&self) -> &'static str {
        "PL015"
    }

    fn description(&self) -> &'static str {
        "Flags categories that are not official port categories"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &PortContext<'_>) -> Vec<Diagnostic> {
        let index = ctx.record.categories.iter().map(|c| ("Index", c));
        let makefile = resolved_categories(ctx, self)
            .unwrap_or_default()
            .iter()
            .map(|c| ("Makefile", c));

        index
            .chain(makefile)
            .filter(|(_, c)| !is_official_category(c))
            .map(|(source, c)| ctx.diagnostic(self, format!("Unofficial category '{c}' in {source}")))
            .collect()
    }
}

/// Flags index categories that differ from the Makefile `CATEGORIES`.
///
/// Compared as sets: order and duplicates do not matter.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryMismatch;

impl Rule for CategoryMismatch {
    fn name(&self) -> &'static str {
        "category-mismatch"
    }

    fn code(&self) -> &'static str {
        "PL016"
    }

    fn description(&self) -> &'static str {
        "Cross-checks the index categories with the Makefile CATEGORIES"
    }

    fn check(&self, ctx: &PortContext<'_>) -> Vec<Diagnostic> {
        let Some(makefile) = resolved_categories(ctx, self) else {
            return vec![];
        };
        let index_set: BTreeSet<&String> = ctx.record.categories.iter().collect();
        let makefile_set: BTreeSet<&String> = makefile.iter().collect();
        if index_set == makefile_set {
            return vec![];
        }
        vec![diverging(
            ctx,
            self,
            "categories",
            "CATEGORIES",
            &ctx.record.categories.join(" "),
            &makefile.join(" "),
        )]
    }
}
