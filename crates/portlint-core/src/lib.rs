//! # portlint-core
//!
//! Core framework for auditing a ports INDEX against the ports tree.
//!
//! This crate provides the data model and the machinery the checks run on:
//!
//! - [`PortIndex`] and [`IndexRecord`] for the flat INDEX file
//! - [`MakefileFacts`] extracted from each port's Makefile
//! - [`select`] for narrowing the index by category, maintainer, or port
//! - [`Rule`] trait and the [`Engine`] that runs rules over ports
//! - [`NetworkVerifier`] for resolving and fetching www-sites
//! - [`LintReport`] for collecting [`Diagnostic`]s
//!
//! ## Example
//!
//! ```ignore
//! use portlint_core::{CancellationToken, Config, Engine, PortIndex};
//!
//! let config = Config::from_file("portlint.toml".as_ref())?;
//! let index = PortIndex::load(&index_path, &config.ports_root)?;
//! let engine = Engine::builder()
//!     .config(config.clone())
//!     .rules(portlint_rules::all_rules())
//!     .build()?;
//!
//! let report = engine.run(&index, &config.selection, None, &CancellationToken::new());
//! print!("{}", report.format_summary());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
mod engine;
mod rule;
mod types;

pub mod index;
pub mod makefile;
pub mod network;
pub mod selector;
pub mod vcs;

pub use config::{
    Checks, Config, ConfigError, Limits, RuleConfig, Selection, MIN_DAYS, MIN_PLIST_FILES,
};
pub use context::PortContext;
pub use engine::{
    Engine, EngineBuilder, EngineError, GateCheck, GATE_CHECKS, MISSING_MAKEFILE,
    MISSING_PORT_PATH,
};
pub use index::{discover_index, IndexError, IndexRecord, PortIndex};
pub use makefile::{
    extract, ExtractOptions, FactsCache, FactsError, MakefileFacts, Marker, MarkerKind, MarkerSet,
    PlistSource,
};
pub use network::{
    NetworkError, NetworkVerifier, ProbeResults, Reachability, Resolution, SkipReason,
    VerifyOptions, WwwProbe,
};
pub use rule::{Rule, RuleBox};
pub use selector::{category_counts, format_counts, maintainer_counts, select};
pub use tokio_util::sync::CancellationToken;
pub use types::{Diagnostic, LintReport, Notifications, Severity};
