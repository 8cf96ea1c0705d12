//! Makefile fact extraction.
//!
//! Reads a port's `Makefile` and the files next to it, and turns them into
//! [`MakefileFacts`]: the values the rule engine compares with the index.
//! Only plain variable assignments are interpreted. Conditionals, includes,
//! and targets are never evaluated.

use crate::index::{split_list, IndexRecord};
use crate::vcs;
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, warn};

/// File name of a port's build descriptor.
pub const MAKEFILE: &str = "Makefile";

/// File name of a port's explicit packing list.
pub const PACKING_LIST: &str = "pkg-plist";

/// Errors that keep facts from being extracted for one port.
///
/// These are per-port findings, not fatal errors.
#[derive(Debug, Error)]
pub enum FactsError {
    /// The origin directory does not exist.
    #[error("Nonexistent port-path {path}")]
    MissingPortPath {
        /// Origin directory.
        path: PathBuf,
    },

    /// The origin directory has no Makefile.
    #[error("Nonexistent Makefile {path}")]
    MissingMakefile {
        /// Expected Makefile path.
        path: PathBuf,
    },

    /// IO error reading the Makefile.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Makefile path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

/// Assignment operator of a Makefile variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// `=` or `:=`
    Set,
    /// `?=`
    Default,
    /// `+=`
    Append,
    /// `!=`, the output of a shell command.
    Shell,
}

/// A variable assignment read from a Makefile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    /// Assigned value, trimmed, with continuation lines joined.
    pub value: String,
    /// 1-based line of the first assignment.
    pub line: usize,
    /// Operator of the last assignment.
    pub op: AssignOp,
}

impl Variable {
    /// Returns true if the value depends on make evaluation.
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        self.op == AssignOp::Shell || is_unresolved(&self.value)
    }
}

/// Returns true if a value references other make variables.
#[must_use]
pub fn is_unresolved(value: &str) -> bool {
    value.contains('$')
}

fn assignment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Z_][A-Z0-9_]*)\s*([+?:!]?=)\s*(.*)$")
            .unwrap_or_else(|e| unreachable!("assignment regex is valid: {e}"))
    })
}

/// Removes a trailing comment. `\#` is an escaped hash and is kept as `#`.
fn strip_comment(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'#') => {
                out.push('#');
                chars.next();
            }
            '#' => break,
            _ => out.push(c),
        }
    }
    out.trim_end().to_string()
}

/// Parses the variable assignments of a Makefile.
#[must_use]
pub fn parse_variables(content: &str) -> BTreeMap<String, Variable> {
    let mut variables: BTreeMap<String, Variable> = BTreeMap::new();
    let mut pending = String::new();
    let mut start_line = 0;

    for (i, raw) in content.lines().enumerate() {
        if pending.is_empty() {
            // Recipe lines belong to targets.
            if raw.starts_with('\t') {
                continue;
            }
            start_line = i + 1;
        }

        let stripped = strip_comment(raw.trim());
        if let Some(head) = stripped.strip_suffix('\\') {
            pending.push_str(head.trim());
            pending.push(' ');
            continue;
        }
        pending.push_str(&stripped);
        let line = std::mem::take(&mut pending);
        let line = line.trim();
        if line.is_empty() || line.starts_with('.') {
            continue;
        }

        let Some(caps) = assignment_regex().captures(line) else {
            continue;
        };
        let name = caps[1].to_string();
        let value = caps[3].trim().to_string();
        let op = match &caps[2] {
            "+=" => AssignOp::Append,
            "?=" => AssignOp::Default,
            "!=" => AssignOp::Shell,
            _ => AssignOp::Set,
        };

        if let Some(existing) = variables.get_mut(&name) {
            match op {
                AssignOp::Append => {
                    if !existing.value.is_empty() && !value.is_empty() {
                        existing.value.push(' ');
                    }
                    existing.value.push_str(&value);
                }
                AssignOp::Default => {}
                AssignOp::Set | AssignOp::Shell => {
                    existing.value = value;
                    existing.op = op;
                }
            }
        } else {
            variables.insert(
                name,
                Variable {
                    value,
                    line: start_line,
                    op,
                },
            );
        }
    }

    variables
}

/// How a port declares the files it installs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlistSource {
    /// An explicit `pkg-plist` file.
    PackingList(PathBuf),
    /// An inline `PLIST_FILES` list with this many entries.
    Files {
        /// Number of entries.
        count: usize,
    },
    /// A `PLIST` variable naming another packing list.
    Plist,
    /// Only `PLIST_SUB` substitutions.
    Substitution,
    /// None of the above.
    Missing,
}

/// A status marker a port can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarkerKind {
    /// `BROKEN`: the port does not build.
    Broken,
    /// `DEPRECATED`: the port is going away.
    Deprecated,
    /// `FORBIDDEN`: the port must not be built, usually for security reasons.
    Forbidden,
    /// `IGNORE`: the port refuses to build, often conditionally.
    Ignore,
}

impl MarkerKind {
    /// All marker kinds.
    pub const ALL: [Self; 4] = [Self::Broken, Self::Deprecated, Self::Forbidden, Self::Ignore];

    /// Name of the Makefile variable.
    #[must_use]
    pub fn variable(self) -> &'static str {
        match self {
            Self::Broken => "BROKEN",
            Self::Deprecated => "DEPRECATED",
            Self::Forbidden => "FORBIDDEN",
            Self::Ignore => "IGNORE",
        }
    }
}

impl std::fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.variable())
    }
}

/// A marker found in a Makefile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// Explanatory text assigned to the variable.
    pub reason: String,
    /// 1-based Makefile line of the assignment.
    pub line: usize,
    /// When the marker was set, as far as we can tell.
    pub since: DateTime<Utc>,
}

/// The markers of a port. Several can be set at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerSet {
    markers: BTreeMap<MarkerKind, Marker>,
    /// Removal date announced with `EXPIRATION_DATE`.
    pub expiration_date: Option<NaiveDate>,
}

impl MarkerSet {
    /// Sets a marker.
    pub fn insert(&mut self, kind: MarkerKind, marker: Marker) {
        self.markers.insert(kind, marker);
    }

    /// Returns a marker if it is set.
    #[must_use]
    pub fn get(&self, kind: MarkerKind) -> Option<&Marker> {
        self.markers.get(&kind)
    }

    /// Returns true if the marker is set.
    #[must_use]
    pub fn is_set(&self, kind: MarkerKind) -> bool {
        self.markers.contains_key(&kind)
    }

    /// Returns true if no marker is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Iterates over the set markers in kind order.
    pub fn iter(&self) -> impl Iterator<Item = (MarkerKind, &Marker)> {
        self.markers.iter().map(|(k, m)| (*k, m))
    }
}

/// Facts derived from a port's Makefile and neighbouring files.
#[derive(Debug, Clone)]
pub struct MakefileFacts {
    /// Path of the Makefile.
    pub makefile: PathBuf,
    /// `COMMENT`, if assigned.
    pub comment: Option<String>,
    /// `MAINTAINER`, if assigned.
    pub maintainer: Option<String>,
    /// `CATEGORIES`, if assigned.
    pub categories: Option<Vec<String>>,
    /// `WWW`, if assigned. May be empty.
    pub www: Option<String>,
    /// Where the packing list comes from.
    pub plist: PlistSource,
    /// Status markers.
    pub markers: MarkerSet,
    /// Last modification of the Makefile.
    pub last_modified: DateTime<Utc>,
    /// Content of the description file, `None` if it does not exist.
    pub description: Option<String>,
    variables: BTreeMap<String, Variable>,
}

impl MakefileFacts {
    /// Builds facts from Makefile content.
    ///
    /// `port_dir` is only used to look for `pkg-plist`; `marker_time` dates
    /// each marker from its Makefile line.
    pub fn from_content(
        makefile: PathBuf,
        content: &str,
        port_dir: &Path,
        last_modified: DateTime<Utc>,
        description: Option<String>,
        mut marker_time: impl FnMut(usize) -> Option<DateTime<Utc>>,
    ) -> Self {
        let variables = parse_variables(content);
        let value = |name: &str| variables.get(name).map(|v| v.value.clone());

        let packing_list = port_dir.join(PACKING_LIST);
        let plist = if packing_list.is_file() {
            PlistSource::PackingList(packing_list)
        } else if let Some(files) = variables.get("PLIST_FILES") {
            PlistSource::Files {
                count: files.value.split_whitespace().count(),
            }
        } else if variables.contains_key("PLIST") {
            PlistSource::Plist
        } else if variables.contains_key("PLIST_SUB") {
            PlistSource::Substitution
        } else {
            PlistSource::Missing
        };

        let mut markers = MarkerSet::default();
        for kind in MarkerKind::ALL {
            if let Some(var) = variables.get(kind.variable()) {
                let since = marker_time(var.line).unwrap_or(last_modified);
                markers.insert(
                    kind,
                    Marker {
                        reason: var.value.clone(),
                        line: var.line,
                        since,
                    },
                );
            }
        }
        markers.expiration_date = variables
            .get("EXPIRATION_DATE")
            .and_then(|v| NaiveDate::parse_from_str(&v.value, "%Y-%m-%d").ok());

        Self {
            makefile,
            comment: value("COMMENT"),
            maintainer: value("MAINTAINER"),
            categories: variables.get("CATEGORIES").map(|v| split_list(&v.value)),
            www: value("WWW"),
            plist,
            markers,
            last_modified,
            description,
            variables,
        }
    }

    /// Looks up any parsed variable.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }
}

/// Options for fact extraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Date the Makefile and its markers with git instead of file metadata.
    pub vcs_dates: bool,
}

/// Extracts the facts of one port.
///
/// # Errors
///
/// Returns [`FactsError::MissingPortPath`] or [`FactsError::MissingMakefile`]
/// when there is nothing to read, and [`FactsError::Io`] on read failures.
pub fn extract(record: &IndexRecord, options: ExtractOptions) -> Result<MakefileFacts, FactsError> {
    let port_dir = &record.origin;
    if !port_dir.is_dir() {
        return Err(FactsError::MissingPortPath {
            path: port_dir.clone(),
        });
    }
    let makefile = port_dir.join(MAKEFILE);
    if !makefile.is_file() {
        return Err(FactsError::MissingMakefile { path: makefile });
    }

    let io_err = |source| FactsError::Io {
        path: makefile.clone(),
        source,
    };
    let bytes = std::fs::read(&makefile).map_err(io_err)?;
    let content = String::from_utf8_lossy(&bytes);
    let mtime: DateTime<Utc> = std::fs::metadata(&makefile)
        .and_then(|m| m.modified())
        .map_err(io_err)?
        .into();

    let last_modified = if options.vcs_dates {
        vcs::last_commit_time(&makefile).unwrap_or_else(|| {
            debug!("No git history for {}, using mtime", makefile.display());
            mtime
        })
    } else {
        mtime
    };

    let description = read_description(&record.descr_file);

    let facts = MakefileFacts::from_content(
        makefile.clone(),
        &content,
        port_dir,
        last_modified,
        description,
        |line| {
            if options.vcs_dates {
                vcs::blame_line_time(&makefile, line)
            } else {
                None
            }
        },
    );
    Ok(facts)
}

fn read_description(path: &Path) -> Option<String> {
    if path.as_os_str().is_empty() || !path.is_file() {
        return None;
    }
    decode_description(path, std::fs::read(path))
}

/// An unreadable description counts as absent.
fn decode_description(path: &Path, read: std::io::Result<Vec<u8>>) -> Option<String> {
    match read {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            None
        }
    }
}

/// Per-run memo of extracted facts, keyed by package name.
#[derive(Debug, Default)]
pub struct FactsCache {
    options: ExtractOptions,
    entries: HashMap<String, Result<MakefileFacts, FactsError>>,
}

impl FactsCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(options: ExtractOptions) -> Self {
        Self {
            options,
            entries: HashMap::new(),
        }
    }

    /// Returns the facts of a port, extracting them on first use.
    pub fn get_or_extract(&mut self, record: &IndexRecord) -> &Result<MakefileFacts, FactsError> {
        let options = self.options;
        self.entries
            .entry(record.name.clone())
            .or_insert_with(|| extract(record, options))
    }

    /// Returns the number of ports extracted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was extracted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
