//! `show-categories` and `show-maintainers` implementations.
//!
//! Both count over the whole index, ignoring any selection.

use anyhow::Result;
use portlint_core::{category_counts, format_counts, maintainer_counts, Config};
use std::collections::BTreeMap;

const LINE_WIDTH: usize = 80;

/// Prints every category with its number of ports.
pub fn categories(config: &Config) -> Result<()> {
    let index = super::load_index(config)?;
    print_counts("categories", &category_counts(&index));
    Ok(())
}

/// Prints every maintainer with their number of ports.
pub fn maintainers(config: &Config) -> Result<()> {
    let index = super::load_index(config)?;
    print_counts("maintainers", &maintainer_counts(&index));
    Ok(())
}

fn print_counts(what: &str, counts: &BTreeMap<String, usize>) {
    println!("{} {what}:", counts.len());
    for line in format_counts(counts, LINE_WIDTH) {
        println!("{line}");
    }
}
