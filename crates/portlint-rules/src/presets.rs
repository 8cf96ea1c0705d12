//! Rule presets for common configurations.

use crate::{
    CategoryMismatch, CommentMismatch, CommentTooLong, CommentTrailingDot, CommentUncapitalized,
    DescriptionSameAsComment, DescriptionTooShort, DescriptionUrlEnding, EmptyWww,
    MaintainerMismatch, Marked, MarkedIgnore, MarkedTooLong, MissingDescription,
    MissingPackingList, PlistFilesAbuse, UnchangedTooLong, UnofficialCategory, UnusualPrefix,
    WwwMismatch, WwwUnreachable, WwwUnresolvable,
};
use portlint_core::RuleBox;

/// Preset configurations for portlint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Preset {
    /// Every check.
    #[default]
    All,
    /// Every check that asks for a fix, without the informational reports.
    Recommended,
    /// Only the index versus Makefile comparisons.
    Consistency,
}

impl Preset {
    /// Names accepted by [`FromStr`](std::str::FromStr).
    pub const NAMES: [&'static str; 3] = ["all", "recommended", "consistency"];

    /// Returns the rules for this preset.
    #[must_use]
    pub fn rules(self) -> Vec<RuleBox> {
        match self {
            Self::All => all_rules(),
            Self::Recommended => recommended_rules(),
            Self::Consistency => consistency_rules(),
        }
    }
}

impl std::str::FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "recommended" => Ok(Self::Recommended),
            "consistency" => Ok(Self::Consistency),
            other => Err(format!(
                "unknown preset `{other}`. Valid values: {}",
                Self::NAMES.join(", ")
            )),
        }
    }
}

/// Returns every rule, in code order.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    vec![
        Box::new(UnusualPrefix::new()),
        Box::new(CommentTooLong::new()),
        Box::new(CommentUncapitalized),
        Box::new(CommentTrailingDot),
        Box::new(CommentMismatch),
        Box::new(MissingDescription),
        Box::new(DescriptionUrlEnding),
        Box::new(DescriptionSameAsComment),
        Box::new(DescriptionTooShort),
        Box::new(MissingPackingList),
        Box::new(PlistFilesAbuse),
        Box::new(MaintainerMismatch),
        Box::new(UnofficialCategory),
        Box::new(CategoryMismatch),
        Box::new(EmptyWww),
        Box::new(WwwMismatch),
        Box::new(WwwUnresolvable),
        Box::new(WwwUnreachable),
        Box::new(Marked),
        Box::new(MarkedTooLong),
        Box::new(MarkedIgnore),
        Box::new(UnchangedTooLong),
    ]
}

/// Returns the recommended set of rules.
///
/// Everything except the current-state reports:
/// - `marked` (PL021)
/// - `unchanged-too-long` (PL024)
#[must_use]
pub fn recommended_rules() -> Vec<RuleBox> {
    all_rules()
        .into_iter()
        .filter(|r| r.default_severity() != portlint_core::Severity::Info)
        .collect()
}

/// Returns the index versus Makefile comparisons.
///
/// Includes:
/// - `comment-mismatch` (PL007)
/// - `maintainer-mismatch` (PL014)
/// - `category-mismatch` (PL016)
/// - `www-mismatch` (PL018)
#[must_use]
pub fn consistency_rules() -> Vec<RuleBox> {
    vec![
        Box::new(CommentMismatch),
        Box::new(MaintainerMismatch),
        Box::new(CategoryMismatch),
        Box::new(WwwMismatch),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_preset_rules() {
        assert_eq!(Preset::All.rules().len(), 22);
        assert_eq!(Preset::Recommended.rules().len(), 20);
        assert_eq!(Preset::Consistency.rules().len(), 4);
    }

    #[test]
    fn codes_are_unique_and_ordered() {
        let codes: Vec<&str> = all_rules().iter().map(|r| r.code()).collect();
        let unique: HashSet<&&str> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
        assert!(codes.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(codes.first(), Some(&"PL003"));
        assert_eq!(codes.last(), Some(&"PL024"));
    }

    #[test]
    fn parses_preset_names() {
        assert_eq!("Recommended".parse::<Preset>(), Ok(Preset::Recommended));
        assert!("strict".parse::<Preset>().is_err());
    }
}
