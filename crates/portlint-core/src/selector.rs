//! Port selection and per-category / per-maintainer counts.

use crate::config::Selection;
use crate::index::{IndexRecord, PortIndex};
use std::collections::BTreeMap;
use tracing::info;

/// Returns true if a record passes every non-empty criterion.
///
/// Categories and maintainers of `selection` must be lower-cased, see
/// [`Selection::normalized`].
fn matches(record: &IndexRecord, selection: &Selection) -> bool {
    if !selection.maintainers.is_empty()
        && !selection
            .maintainers
            .contains(&record.maintainer.to_lowercase())
    {
        return false;
    }
    if !selection.categories.is_empty()
        && !record
            .categories
            .iter()
            .any(|c| selection.categories.contains(&c.to_lowercase()))
    {
        return false;
    }
    if !selection.ports.is_empty()
        && !selection.ports.contains(&record.name)
        && !selection.ports.contains(record.port_id())
    {
        return false;
    }
    true
}

/// Filters the index down to the selected records, in package-name order.
///
/// Categories and maintainers are compared case-insensitively.
#[must_use]
pub fn select<'a>(index: &'a PortIndex, selection: &Selection) -> Vec<&'a IndexRecord> {
    let selection = selection.normalized();
    let selected: Vec<&IndexRecord> = index
        .records()
        .filter(|r| matches(r, &selection))
        .collect();
    info!("Selected {} of {} ports", selected.len(), index.len());
    selected
}

/// Counts ports per category.
#[must_use]
pub fn category_counts(index: &PortIndex) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in index.records() {
        for category in &record.categories {
            *counts.entry(category.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Counts ports per maintainer, lower-cased.
#[must_use]
pub fn maintainer_counts(index: &PortIndex) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in index.records() {
        *counts.entry(record.maintainer.to_lowercase()).or_insert(0) += 1;
    }
    counts
}

/// Renders counts as `name(count), ...` wrapped at `width` columns.
///
/// Lines only break between entries, never inside a name.
#[must_use]
pub fn format_counts(counts: &BTreeMap<String, usize>, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let last = counts.len().saturating_sub(1);

    for (i, (name, count)) in counts.iter().enumerate() {
        let mut item = format!("{name}({count})");
        if i < last {
            item.push(',');
        }
        if !current.is_empty() && current.len() + 1 + item.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&item);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
