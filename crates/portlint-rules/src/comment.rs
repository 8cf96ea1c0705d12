//! Rules on the one-line comment.
//!
//! The comment appears in package listings, so it is kept short, starts with
//! a capital letter, and carries no trailing period. The index copy must
//! match the Makefile `COMMENT`.

use crate::common::{diverging, skip_unresolved};
use portlint_core::{Diagnostic, PortContext, Rule, Severity};

/// Longest comment accepted by the porting guidelines.
pub const MAX_COMMENT_LENGTH: usize = 70;

/// Flags comments longer than [`MAX_COMMENT_LENGTH`] characters.
#[derive(Debug, Clone, Copy)]
pub struct CommentTooLong {
    /// Longest accepted comment, in characters.
    pub max_length: usize,
}

impl Default for CommentTooLong {
    fn default() -> Self {
        Self::new()
    }
}

impl CommentTooLong {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_length: MAX_COMMENT_LENGTH,
        }
    }

    /// Sets the longest accepted comment.
    #[must_use]
    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }
}

impl Rule for CommentTooLong {
    fn name(&self) -> &'static str {
        "comment-too-long"
    }

    fn code(&self) -> &'static str {
        "PL004"
    }

    fn description(&self) -> &'static str {
        "Flags comments over 70 characters"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &PortContext<'_>) -> Vec<Diagnostic> {
        let length = ctx.record.comment.chars().count();
        if length <= self.max_length {
            return vec![];
        }
        vec![ctx.diagnostic(
            self,
            format!(
                "Over {} characters comment ({length})",
                self.max_length
            ),
        )]
    }
}

/// Flags comments starting with a lowercase letter.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommentUncapitalized;

impl Rule for CommentUncapitalized {
    fn name(&self) -> &'static str {
        "comment-uncapitalized"
    }

    fn code(&self) -> &'static str {
        "PL005"
    }

    fn description(&self) -> &'static str {
        "Flags comments starting with a lowercase letter"
    }

    fn check(&self, ctx: &PortContext<'_>) -> Vec<Diagnostic> {
        match ctx.record.comment.chars().next() {
            Some(first) if first.is_lowercase() => {
                vec![ctx.diagnostic(self, "Uncapitalized comment")]
            }
            _ => vec![],
        }
    }
}

/// Flags comments ending with a period.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommentTrailingDot;

impl Rule for CommentTrailingDot {
    fn name(&self) -> &'static str {
        "comment-trailing-dot"
    }

    fn code(&self) -> &'static str {
        "PL006"
    }

    fn description(&self) -> &'static str {
        "Flags comments ending with a period"
    }

    fn check(&self, ctx: &PortContext<'_>) -> Vec<Diagnostic> {
        if ctx.record.comment.ends_with('.') {
            vec![ctx.diagnostic(self, "Dot-ended comment")]
        } else {
            vec![]
        }
    }
}

/// Flags index comments that differ from the Makefile `COMMENT`.
///
/// Backslashes are ignored on both sides: escaping is used inconsistently
/// between the two files.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommentMismatch;

impl Rule for CommentMismatch {
    fn name(&self) -> &'static str {
        "comment-mismatch"
    }

    fn code(&self) -> &'static str {
        "PL007"
    }

    fn description(&self) -> &'static str {
        "Cross-checks the index comment with the Makefile COMMENT"
    }

    fn check(&self, ctx: &PortContext<'_>) -> Vec<Diagnostic> {
        let Some(makefile) = ctx.facts.comment.as_deref() else {
            return vec![];
        };
        if skip_unresolved(ctx, self, "COMMENT") {
            return vec![];
        }
        let index = ctx.record.comment.as_str();
        if index.replace('\\', "") == makefile.replace('\\', "") {
            return vec![];
        }
        vec![diverging(ctx, self, "comments", "COMMENT", index, makefile)]
    }
}
