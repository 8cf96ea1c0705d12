//! Rule trait for defining port checks.

use crate::context::PortContext;
use crate::types::{Diagnostic, Severity};

/// A check run against one port whose Makefile facts were extracted.
///
/// Rules receive the index record, the Makefile facts, the thresholds and,
/// when network verification ran, the probe of the port's www-site.
///
/// # Example
///
/// ```ignore
/// use portlint_core::{Diagnostic, PortContext, Rule, Severity};
///
/// pub struct EmptyComment;
///
/// impl Rule for EmptyComment {
///     fn name(&self) -> &'static str { "empty-comment" }
///     fn code(&self) -> &'static str { "PL100" }
///
///     fn check(&self, ctx: &PortContext<'_>) -> Vec<Diagnostic> {
///         if ctx.record.comment.is_empty() {
///             vec![ctx.diagnostic(self, "Empty comment")]
///         } else {
///             vec![]
///         }
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "comment-mismatch").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "PL007").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for diagnostics from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Whether `[rules.<name>] severity` may change this rule's severity.
    fn allows_severity_override(&self) -> bool {
        true
    }

    /// Checks one port and returns any diagnostics found.
    fn check(&self, ctx: &PortContext<'_>) -> Vec<Diagnostic>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

#[cfg(test)]
mod tests {
    use super::*;

    struct TestRule;

    impl Rule for TestRule {
        fn name(&self) -> &'static str {
            "test-rule"
        }
        fn code(&self) -> &'static str {
            "TEST001"
        }
        fn description(&self) -> &'static str {
            "A test rule"
        }

        fn check(&self, ctx: &PortContext<'_>) -> Vec<Diagnostic> {
            vec![ctx.diagnostic(self, "Test diagnostic")]
        }
    }

    #[test]
    fn test_rule_defaults() {
        let rule = TestRule;
        assert_eq!(rule.name(), "test-rule");
        assert_eq!(rule.code(), "TEST001");
        assert_eq!(rule.default_severity(), Severity::Error);
        assert!(rule.allows_severity_override());
    }
}
