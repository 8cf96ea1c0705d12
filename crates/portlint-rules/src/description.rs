//! Rules on the long description file (`pkg-descr`).

use portlint_core::{Diagnostic, PortContext, Rule, Severity};

/// Description text split into its body and an optional trailing URL line.
#[derive(Debug, PartialEq, Eq)]
struct Description<'a> {
    body: Vec<&'a str>,
    url: Option<&'a str>,
}

impl<'a> Description<'a> {
    fn parse(text: &'a str) -> Self {
        let mut body: Vec<&str> = text.lines().collect();
        while body.last().is_some_and(|l| l.trim().is_empty()) {
            body.pop();
        }
        let url = body
            .last()
            .copied()
            .map(str::trim)
            .filter(|l| l.starts_with("https://") || l.starts_with("http://"));
        if url.is_some() {
            body.pop();
        }
        Self { body, url }
    }

    /// Body with every whitespace run collapsed to a single space.
    fn normalized(&self) -> String {
        normalize(&self.body.join(" "))
    }
}

fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn description<'a>(ctx: &PortContext<'a>) -> Option<Description<'a>> {
    ctx.facts.description.as_deref().map(Description::parse)
}

/// Flags ports without a description file.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingDescription;

impl Rule for MissingDescription {
    fn name(&self) -> &'static str {
        "missing-description"
    }

    fn code(&self) -> &'static str {
        "PL008"
    }

    fn description(&self) -> &'static str {
        "Flags ports whose description file does not exist"
    }

    fn check(&self, ctx: &PortContext<'_>) -> Vec<Diagnostic> {
        if ctx.facts.description.is_some() {
            return vec![];
        }
        vec![ctx.diagnostic(
            self,
            format!(
                "Nonexistent description-file '{}'",
                ctx.record.descr_file.display()
            ),
        )]
    }
}

/// Flags descriptions ending with a bare URL line.
///
/// The www-site belongs in the `WWW` variable.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptionUrlEnding;

impl Rule for DescriptionUrlEnding {
    fn name(&self) -> &'static str {
        "description-url-ending"
    }

    fn code(&self) -> &'static str {
        "PL009"
    }

    fn description(&self) -> &'static str {
        "Flags description files ending with a URL line"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &PortContext<'_>) -> Vec<Diagnostic> {
        let Some(url) = description(ctx).and_then(|d| d.url) else {
            return vec![];
        };
        vec![ctx.diagnostic(self, format!("URL '{url}' ending description-file"))]
    }
}

/// Flags descriptions that only repeat the comment.
///
/// A trailing URL line is not part of the compared text.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptionSameAsComment;

impl Rule for DescriptionSameAsComment {
    fn name(&self) -> &'static str {
        "description-same-as-comment"
    }

    fn code(&self) -> &'static str {
        "PL010"
    }

    fn description(&self) -> &'static str {
        "Flags description files identical to the comment"
    }

    fn check(&self, ctx: &PortContext<'_>) -> Vec<Diagnostic> {
        let Some(descr) = description(ctx) else {
            return vec![];
        };
        if descr.normalized() != normalize(&ctx.record.comment) {
            return vec![];
        }
        vec![ctx.diagnostic(self, "description-file content is identical to comment")]
    }
}

/// Flags descriptions no longer than the comment.
///
/// Never fires together with [`DescriptionSameAsComment`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptionTooShort;

impl Rule for DescriptionTooShort {
    fn name(&self) -> &'static str {
        "description-too-short"
    }

    fn code(&self) -> &'static str {
        "PL011"
    }

    fn description(&self) -> &'static str {
        "Flags description files no longer than the comment"
    }

    fn check(&self, ctx: &PortContext<'_>) -> Vec<Diagnostic> {
        let Some(descr) = description(ctx) else {
            return vec![];
        };
        let text = descr.normalized();
        let comment = normalize(&ctx.record.comment);
        if text == comment || text.chars().count() > comment.chars().count() {
            return vec![];
        }
        vec![ctx
            .diagnostic(self, "description-file content is no longer than comment")
            .with_note(format!("{} characters", text.chars().count()))]
    }
}
