//! Ports INDEX loading.
//!
//! The INDEX is a line-oriented file with 13 `|`-separated fields per port:
//!
//! ```text
//! name|origin|prefix|comment|descr|maintainer|categories|extract-depends|
//! patch-depends|www|fetch-depends|build-depends|run-depends
//! ```
//!
//! Categories and dependency lists are space-separated within their field.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Field delimiter of INDEX lines.
pub const FIELD_DELIMITER: char = '|';

/// Number of fields in an INDEX line.
pub const FIELD_COUNT: usize = 13;

/// Ports root the INDEX is generated against.
pub const DEFAULT_PORTS_ROOT: &str = "/usr/ports";

/// Errors that abort loading the index.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum IndexError {
    /// The index file does not exist.
    #[error("Ports index not found at {path}")]
    #[diagnostic(
        code(portlint::index::missing),
        help("install and update the ports tree, or point --index at an INDEX file")
    )]
    Missing {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// A line does not have the expected number of fields.
    #[error("Malformed index line {line}: {fields} field(s) instead of {FIELD_COUNT}")]
    #[diagnostic(
        code(portlint::index::malformed),
        help("regenerate the INDEX with `make index`")
    )]
    Malformed {
        /// 1-based line number.
        line: usize,
        /// Number of fields found.
        fields: usize,
    },

    /// IO error reading the index.
    #[error("Failed to read index {path}: {source}")]
    #[diagnostic(code(portlint::index::io))]
    Io {
        /// Index path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

/// One port as described by the INDEX.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRecord {
    /// Package name with version (e.g., "curl-8.6.0"). Unique in an index.
    pub name: String,
    /// Port directory.
    pub origin: PathBuf,
    /// Installation prefix.
    pub prefix: String,
    /// One-line description.
    pub comment: String,
    /// Path of the long description file.
    pub descr_file: PathBuf,
    /// Maintainer e-mail address.
    pub maintainer: String,
    /// Categories, in declared order.
    pub categories: Vec<String>,
    /// Extract dependencies.
    pub extract_depends: Vec<String>,
    /// Patch dependencies.
    pub patch_depends: Vec<String>,
    /// Website URL, possibly empty.
    pub www: String,
    /// Fetch dependencies.
    pub fetch_depends: Vec<String>,
    /// Build dependencies.
    pub build_depends: Vec<String>,
    /// Run dependencies.
    pub run_depends: Vec<String>,
}

impl IndexRecord {
    /// Parses one INDEX line. Returns the number of fields found on mismatch.
    ///
    /// # Errors
    ///
    /// Returns the field count if it is not [`FIELD_COUNT`].
    pub fn parse(line: &str) -> Result<Self, usize> {
        let fields: Vec<&str> = line.split(FIELD_DELIMITER).map(str::trim).collect();
        let [name, origin, prefix, comment, descr, maintainer, categories, extract, patch, www, fetch, build, run] =
            fields.as_slice()
        else {
            return Err(fields.len());
        };

        Ok(Self {
            name: (*name).to_string(),
            origin: PathBuf::from(origin),
            prefix: (*prefix).to_string(),
            comment: (*comment).to_string(),
            descr_file: PathBuf::from(descr),
            maintainer: (*maintainer).to_string(),
            categories: split_list(categories),
            extract_depends: split_list(extract),
            patch_depends: split_list(patch),
            www: (*www).to_string(),
            fetch_depends: split_list(fetch),
            build_depends: split_list(build),
            run_depends: split_list(run),
        })
    }

    /// Serializes the record back into an INDEX line.
    #[must_use]
    pub fn to_line(&self) -> String {
        let fields = [
            self.name.clone(),
            self.origin.display().to_string(),
            self.prefix.clone(),
            self.comment.clone(),
            self.descr_file.display().to_string(),
            self.maintainer.clone(),
            self.categories.join(" "),
            self.extract_depends.join(" "),
            self.patch_depends.join(" "),
            self.www.clone(),
            self.fetch_depends.join(" "),
            self.build_depends.join(" "),
            self.run_depends.join(" "),
        ];
        fields.join(&FIELD_DELIMITER.to_string())
    }

    /// Returns the last component of the origin (e.g., "curl" for "ftp/curl").
    #[must_use]
    pub fn port_id(&self) -> &str {
        self.origin
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

/// Splits a space-separated list field.
#[must_use]
pub fn split_list(field: &str) -> Vec<String> {
    field.split_whitespace().map(String::from).collect()
}

/// The loaded INDEX, keyed and ordered by package name.
#[derive(Debug, Clone, Default)]
pub struct PortIndex {
    records: BTreeMap<String, IndexRecord>,
    path: PathBuf,
}

impl PortIndex {
    /// Builds an index from records. Later duplicates replace earlier ones.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = IndexRecord>) -> Self {
        let mut index = Self::default();
        for record in records {
            index.insert(record);
        }
        index
    }

    fn insert(&mut self, record: IndexRecord) {
        if let Some(previous) = self.records.insert(record.name.clone(), record) {
            warn!(
                "Duplicate package name {} in index, keeping the last entry",
                previous.name
            );
        }
    }

    /// Parses INDEX content. Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Malformed`] on the first line with a wrong field count.
    pub fn parse(content: &str) -> Result<Self, IndexError> {
        let mut index = Self::default();
        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record = IndexRecord::parse(line).map_err(|fields| IndexError::Malformed {
                line: i + 1,
                fields,
            })?;
            index.insert(record);
        }
        Ok(index)
    }

    /// Loads the INDEX file at `path`.
    ///
    /// Origins and description files are resolved against `ports_root`, see [`rebase`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, or malformed.
    pub fn load(path: &Path, ports_root: &Path) -> Result<Self, IndexError> {
        if !path.is_file() {
            return Err(IndexError::Missing {
                path: path.to_path_buf(),
            });
        }
        let bytes = std::fs::read(path).map_err(|e| IndexError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let content = String::from_utf8_lossy(&bytes);

        let mut index = Self::parse(&content)?;
        index.path = path.to_path_buf();
        for record in index.records.values_mut() {
            record.origin = rebase(&record.origin, ports_root);
            if !record.descr_file.as_os_str().is_empty() {
                record.descr_file = rebase(&record.descr_file, ports_root);
            }
        }

        info!(
            "Loaded {} ports from the index {}",
            index.len(),
            path.display()
        );
        Ok(index)
    }

    /// Returns the path the index was loaded from, if any.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the index holds no record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up a record by package name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&IndexRecord> {
        self.records.get(name)
    }

    /// Iterates over records in package-name order.
    pub fn records(&self) -> impl Iterator<Item = &IndexRecord> {
        self.records.values()
    }
}

/// Finds the INDEX file of a ports tree.
///
/// Picks the `INDEX-<n>` file with the highest numeric suffix, falling back to
/// a plain `INDEX`.
///
/// # Errors
///
/// Returns [`IndexError::Missing`] if no candidate exists.
pub fn discover_index(ports_root: &Path) -> Result<PathBuf, IndexError> {
    let missing = || IndexError::Missing {
        path: ports_root.join("INDEX-*"),
    };
    let entries = std::fs::read_dir(ports_root).map_err(|_| missing())?;

    let best = entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            let version = name.strip_prefix("INDEX-")?.parse::<u32>().ok()?;
            Some((version, entry.path()))
        })
        .max_by_key(|(version, _)| *version)
        .map(|(_, path)| path);

    if let Some(path) = best {
        return Ok(path);
    }
    let plain = ports_root.join("INDEX");
    if plain.is_file() {
        return Ok(plain);
    }
    Err(missing())
}

/// Resolves an INDEX path against `ports_root`.
///
/// Relative paths are joined to `ports_root`. Absolute paths under
/// [`DEFAULT_PORTS_ROOT`] are moved under `ports_root`; other absolute paths
/// are kept.
#[must_use]
pub fn rebase(path: &Path, ports_root: &Path) -> PathBuf {
    if path.is_relative() {
        return ports_root.join(path);
    }
    match path.strip_prefix(DEFAULT_PORTS_ROOT) {
        Ok(rest) if ports_root != Path::new(DEFAULT_PORTS_ROOT) => ports_root.join(rest),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CURL: &str = "curl-8.6.0|/usr/ports/ftp/curl|/usr/local|Command line tool and library for transferring data with URLs|/usr/ports/ftp/curl/pkg-descr|sunpoet@FreeBSD.org|ftp net www|||https://curl.se/||pkgconf-2.1.1 libpsl-0.21.5|ca_root_nss-3.98 libpsl-0.21.5";

    #[test]
    fn parses_all_fields() {
        let record = IndexRecord::parse(CURL).unwrap();
        assert_eq!(record.name, "curl-8.6.0");
        assert_eq!(record.origin, PathBuf::from("/usr/ports/ftp/curl"));
        assert_eq!(record.prefix, "/usr/local");
        assert_eq!(record.maintainer, "sunpoet@FreeBSD.org");
        assert_eq!(record.categories, vec!["ftp", "net", "www"]);
        assert!(record.extract_depends.is_empty());
        assert_eq!(record.www, "https://curl.se/");
        assert_eq!(record.build_depends.len(), 2);
        assert_eq!(record.port_id(), "curl");
    }

    #[test]
    fn round_trips_well_formed_lines() {
        let lines = [
            CURL,
            // single category, empty www-site and dependency fields
            "zsh-5.9|/usr/ports/shells/zsh|/usr/local|The Z shell|/usr/ports/shells/zsh/pkg-descr|ports@FreeBSD.org|shells||||||",
            // every dependency list filled, several entries each
            "gimp-2.10.36|/usr/ports/graphics/gimp|/usr/local|GNU Image Manipulation Program|/usr/ports/graphics/gimp/pkg-descr|gnome@FreeBSD.org|graphics gnome|xz-5.4.5 bzip2-1.0.8|gpatch-2.7.6|https://www.gimp.org/|curl-8.6.0 ca_root_nss-3.98|gmake-4.4.1 pkgconf-2.1.1 intltool-0.51.0|gtk2-2.24.33 babl-0.1.108 gegl-0.4.48",
            // relative paths, empty prefix and comment
            "bare-0.1|misc/bare|||misc/bare/pkg-descr|bob@example.com|misc|||https://example.org/|||perl5-5.36.3",
        ];
        for line in lines {
            let record = IndexRecord::parse(line).unwrap();
            assert_eq!(record.to_line(), line);
        }

        let zsh = IndexRecord::parse(lines[1]).unwrap();
        assert_eq!(zsh.categories, vec!["shells"]);
        assert!(zsh.www.is_empty());
        assert!(zsh.run_depends.is_empty());
    }

    #[test]
    fn trims_fields() {
        let line = CURL.replace("|/usr/local|", "| /usr/local |");
        let record = IndexRecord::parse(&line).unwrap();
        assert_eq!(record.prefix, "/usr/local");
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert_eq!(IndexRecord::parse("a|b|c"), Err(3));

        let content = format!("{CURL}\nbroken|line\n");
        match PortIndex::parse(&content) {
            Err(IndexError::Malformed { line, fields }) => {
                assert_eq!(line, 2);
                assert_eq!(fields, 2);
            }
            other => panic!("expected malformed error, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_names_keep_the_last_entry() {
        let second = CURL.replace("|/usr/local|", "|/opt|");
        let index = PortIndex::parse(&format!("{CURL}\n\n{second}\n")).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("curl-8.6.0").unwrap().prefix, "/opt");
    }

    #[test]
    fn load_reports_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = PortIndex::load(&tmp.path().join("INDEX-14"), tmp.path()).unwrap_err();
        assert!(matches!(err, IndexError::Missing { .. }));
    }

    #[test]
    fn load_resolves_relative_origins() {
        let tmp = TempDir::new().unwrap();
        let line = CURL
            .replace("/usr/ports/ftp/curl/pkg-descr", "ftp/curl/pkg-descr")
            .replace("/usr/ports/ftp/curl", "ftp/curl");
        fs::write(tmp.path().join("INDEX-14"), format!("{line}\n")).unwrap();

        let index = PortIndex::load(&tmp.path().join("INDEX-14"), tmp.path()).unwrap();
        let record = index.get("curl-8.6.0").unwrap();
        assert_eq!(record.origin, tmp.path().join("ftp/curl"));
        assert_eq!(record.descr_file, tmp.path().join("ftp/curl/pkg-descr"));
    }

    #[test]
    fn load_moves_default_root_under_ports_root() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("INDEX-14"), format!("{CURL}\n")).unwrap();

        let index = PortIndex::load(&tmp.path().join("INDEX-14"), tmp.path()).unwrap();
        let record = index.get("curl-8.6.0").unwrap();
        assert_eq!(record.origin, tmp.path().join("ftp/curl"));
        assert_eq!(record.descr_file, tmp.path().join("ftp/curl/pkg-descr"));
    }

    #[test]
    fn rebase_keeps_foreign_absolute_paths() {
        let root = Path::new("/srv/ports");
        assert_eq!(rebase(Path::new("www/curl"), root), root.join("www/curl"));
        assert_eq!(
            rebase(Path::new("/usr/ports/www/curl"), root),
            PathBuf::from("/srv/ports/www/curl")
        );
        assert_eq!(
            rebase(Path::new("/usr/portsnap/www/curl"), root),
            PathBuf::from("/usr/portsnap/www/curl")
        );
        assert_eq!(
            rebase(Path::new("/home/me/ports/www/curl"), root),
            PathBuf::from("/home/me/ports/www/curl")
        );
        assert_eq!(
            rebase(Path::new("/usr/ports/www/curl"), Path::new(DEFAULT_PORTS_ROOT)),
            PathBuf::from("/usr/ports/www/curl")
        );
    }

    #[test]
    fn discover_prefers_highest_version() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("INDEX-13"), "").unwrap();
        fs::write(tmp.path().join("INDEX-14"), "").unwrap();
        fs::write(tmp.path().join("INDEX-14.bz2"), "").unwrap();

        assert_eq!(
            discover_index(tmp.path()).unwrap(),
            tmp.path().join("INDEX-14")
        );
    }

    #[test]
    fn discover_fails_on_empty_tree() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            discover_index(tmp.path()),
            Err(IndexError::Missing { .. })
        ));
    }
}
