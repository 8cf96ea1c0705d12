//! Git-based dating of Makefiles and marker lines.
//!
//! Every function returns `None` when git is not installed, the file is not
//! tracked, or the output cannot be parsed. Callers fall back to file metadata.

use chrono::{DateTime, Utc};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Returns the commit time of the last change to `file`.
#[must_use]
pub fn last_commit_time(file: &Path) -> Option<DateTime<Utc>> {
    let dir = file.parent()?;
    let name = file.file_name()?;
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(["log", "-1", "--format=%ct", "--"])
        .arg(name)
        .output()
        .ok()?;
    if !output.status.success() {
        debug!("git log failed for {}", file.display());
        return None;
    }
    parse_timestamp(String::from_utf8_lossy(&output.stdout).trim())
}

/// Returns the commit time of the change that last touched `line` of `file`.
#[must_use]
pub fn blame_line_time(file: &Path, line: usize) -> Option<DateTime<Utc>> {
    let dir = file.parent()?;
    let name = file.file_name()?;
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(["blame", "--porcelain", "-L", &format!("{line},{line}"), "--"])
        .arg(name)
        .output()
        .ok()?;
    if !output.status.success() {
        debug!("git blame failed for {}:{}", file.display(), line);
        return None;
    }
    committer_time(&String::from_utf8_lossy(&output.stdout))
}

/// Extracts `committer-time` from `git blame --porcelain` output.
fn committer_time(porcelain: &str) -> Option<DateTime<Utc>> {
    porcelain
        .lines()
        .find_map(|l| l.strip_prefix("committer-time "))
        .and_then(|t| parse_timestamp(t.trim()))
}

fn parse_timestamp(secs: &str) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs.parse().ok()?, 0)
}
