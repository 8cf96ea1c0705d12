//! # portlint-rules
//!
//! Built-in checks for portlint.
//!
//! Each check compares one aspect of a port's index record with its Makefile
//! facts, or holds it to a porting convention.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | PL003 | `unusual-prefix` | Installation prefix not customary for the port |
//! | PL004 | `comment-too-long` | Comment over 70 characters |
//! | PL005 | `comment-uncapitalized` | Comment starting with a lowercase letter |
//! | PL006 | `comment-trailing-dot` | Comment ending with a period |
//! | PL007 | `comment-mismatch` | Index comment differs from `COMMENT` |
//! | PL008 | `missing-description` | No description file |
//! | PL009 | `description-url-ending` | Description ending with a URL line |
//! | PL010 | `description-same-as-comment` | Description repeating the comment |
//! | PL011 | `description-too-short` | Description no longer than the comment |
//! | PL012 | `missing-packing-list` | No packing list of any kind |
//! | PL013 | `plist-files-abuse` | Too many `PLIST_FILES` entries |
//! | PL014 | `maintainer-mismatch` | Index maintainer differs from `MAINTAINER` |
//! | PL015 | `unofficial-category` | Category not in the official list |
//! | PL016 | `category-mismatch` | Index categories differ from `CATEGORIES` |
//! | PL017 | `empty-www` | Empty www-site |
//! | PL018 | `www-mismatch` | Index www-site not in `WWW` |
//! | PL019 | `www-unresolvable` | www-site host does not resolve |
//! | PL020 | `www-unreachable` | www-site cannot be fetched |
//! | PL021 | `marked` | Recent BROKEN, DEPRECATED or FORBIDDEN marker |
//! | PL022 | `marked-too-long` | Marker older than its limit |
//! | PL023 | `marked-ignore` | IGNORE marker |
//! | PL024 | `unchanged-too-long` | Makefile unchanged for too long |
//!
//! PL001 and PL002 are gate checks run by the engine itself.
//!
//! ## Usage
//!
//! ```ignore
//! use portlint_core::Engine;
//! use portlint_rules::{CommentMismatch, Preset};
//!
//! let engine = Engine::builder()
//!     .rules(Preset::Recommended.rules())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod categories;
mod comment;
mod common;
mod description;
mod maintainer;
mod markers;
mod plist;
mod prefix;
mod presets;
mod staleness;
mod www;

pub mod policy;

pub use categories::{CategoryMismatch, UnofficialCategory};
pub use comment::{
    CommentMismatch, CommentTooLong, CommentTrailingDot, CommentUncapitalized, MAX_COMMENT_LENGTH,
};
pub use description::{
    DescriptionSameAsComment, DescriptionTooShort, DescriptionUrlEnding, MissingDescription,
};
pub use maintainer::MaintainerMismatch;
pub use markers::{limit_days, Marked, MarkedIgnore, MarkedTooLong};
pub use plist::{MissingPackingList, PlistFilesAbuse};
pub use prefix::UnusualPrefix;
pub use presets::{all_rules, consistency_rules, recommended_rules, Preset};
pub use staleness::UnchangedTooLong;
pub use www::{EmptyWww, WwwMismatch, WwwUnreachable, WwwUnresolvable, DEFINITIVE_STATUSES};

/// Re-export core types for convenience.
pub use portlint_core::{Diagnostic, Rule, Severity};
