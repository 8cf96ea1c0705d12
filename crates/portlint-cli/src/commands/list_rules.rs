//! List rules command implementation.

use portlint_core::GATE_CHECKS;
use portlint_rules::{all_rules, Preset};

/// Runs the list-rules command.
pub fn run() {
    println!("Available checks:\n");
    println!("{:<8} {:<28} {:<9} Description", "Code", "Name", "Severity");
    println!("{}", "-".repeat(100));

    for gate in GATE_CHECKS {
        println!(
            "{:<8} {:<28} {:<9} {}",
            gate.code, gate.name, "error", gate.description
        );
    }
    for rule in all_rules() {
        println!(
            "{:<8} {:<28} {:<9} {}",
            rule.code(),
            rule.name(),
            rule.default_severity().to_string(),
            rule.description()
        );
    }

    println!("\nPresets (--preset):");
    for name in Preset::NAMES {
        println!("  {name}");
    }

    println!("\nUse --rules to run only some checks, e.g.:");
    println!("  portlint check --rules comment-mismatch,maintainer-mismatch");
    println!("  portlint check --rules PL007,PL014");
}
