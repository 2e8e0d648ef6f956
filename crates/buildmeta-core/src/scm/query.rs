//! Capability the core needs from a version-control backend.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

#[derive(Debug, thiserror::Error)]
pub enum ScmError {
    #[error("cannot run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed ({status}): {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("unexpected output from `{command}`: {message}")]
    Output { command: String, message: String },

    #[error("{0}")]
    Backend(String),
}

/// One change-log query over `[start, end]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeLogRequest {
    pub root: PathBuf,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub range_in_days: u32,
    pub date_format: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeFile {
    pub path: String,
    pub revision: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    pub date: DateTime<Utc>,
    pub files: Vec<ChangeFile>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeLog {
    /// Latest revision, when the backend can name it directly.
    pub end_version: Option<String>,
    pub end_date: Option<DateTime<Utc>>,
    pub change_sets: Vec<ChangeSet>,
}

impl ChangeLog {
    pub fn is_empty(&self) -> bool {
        self.end_version.is_none() && self.change_sets.is_empty()
    }
}

/// Kind of local change reported by a status query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    Untracked,
    Conflict,
    Unknown,
}

impl FileStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
            Self::Renamed => "renamed",
            Self::Untracked => "untracked",
            Self::Conflict => "conflict",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A working-copy entry that differs from the checked-out revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    /// Path relative to the checkout root.
    pub path: String,
    pub status: FileStatus,
}

impl ChangedFile {
    pub fn new(path: impl Into<String>, status: FileStatus) -> Self {
        Self {
            path: path.into(),
            status,
        }
    }
}

pub trait RevisionQuery {
    fn change_log(&self, request: &ChangeLogRequest) -> Result<ChangeLog, ScmError>;

    fn status(&self, root: &Path) -> Result<Vec<ChangedFile>, ScmError>;
}
