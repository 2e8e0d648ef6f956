//! `RevisionQuery` backed by the `git` command line.

use std::path::Path;
use std::process::Command;

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::debug;

use crate::scm::query::{
    ChangeFile, ChangeLog, ChangeLogRequest, ChangeSet, ChangedFile, FileStatus, RevisionQuery,
    ScmError,
};

const COMMIT_MARKER: &str = "@@buildmeta@@";

#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
        }
    }
}

impl GitCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, root: &Path, args: &[&str]) -> Result<String, ScmError> {
        let command = format!("{} {}", self.program, args.join(" "));
        debug!(%command, root = %root.display(), "running git");
        let output = Command::new(&self.program)
            .arg("-C")
            .arg(root)
            .args(args)
            .output()
            .map_err(|source| ScmError::Spawn {
                command: command.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(ScmError::Command {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl RevisionQuery for GitCli {
    fn change_log(&self, request: &ChangeLogRequest) -> Result<ChangeLog, ScmError> {
        let since = format!("--since={} days ago", request.range_in_days);
        let date = format!("--date=format:{}", request.date_format);
        let pretty = format!("--pretty=format:{COMMIT_MARKER}%H%x09%cd");
        let stdout = self.run(
            &request.root,
            &["log", &since, &date, &pretty, "--name-only", "--", "."],
        )?;
        parse_log(&stdout, &request.date_format)
    }

    fn status(&self, root: &Path) -> Result<Vec<ChangedFile>, ScmError> {
        let prefix = self.run(root, &["rev-parse", "--show-prefix"])?;
        let stdout = self.run(
            root,
            &["status", "--porcelain", "--untracked-files=all", "--", "."],
        )?;
        Ok(parse_status(&stdout, prefix.trim()))
    }
}

fn parse_commit_date(value: &str, format: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(value, format)
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, format)
                .ok()
                .map(|n| n.and_utc())
        })
}

/// Parse `git log --name-only` output produced with [`COMMIT_MARKER`].
fn parse_log(stdout: &str, date_format: &str) -> Result<ChangeLog, ScmError> {
    let mut change_sets = Vec::new();
    let mut current: Option<(String, ChangeSet)> = None;

    for line in stdout.lines() {
        if let Some(header) = line.strip_prefix(COMMIT_MARKER) {
            if let Some((_, set)) = current.take() {
                change_sets.push(set);
            }
            let (hash, date) = header.split_once('\t').ok_or_else(|| ScmError::Output {
                command: "git log".into(),
                message: format!("malformed commit header '{header}'"),
            })?;
            let date = parse_commit_date(date.trim(), date_format).ok_or_else(|| {
                ScmError::Output {
                    command: "git log".into(),
                    message: format!("cannot parse commit date '{date}' with '{date_format}'"),
                }
            })?;
            current = Some((
                hash.trim().to_string(),
                ChangeSet {
                    date,
                    files: Vec::new(),
                },
            ));
            continue;
        }
        let path = line.trim();
        if path.is_empty() {
            continue;
        }
        if let Some((hash, set)) = current.as_mut() {
            set.files.push(ChangeFile {
                path: unquote(path),
                revision: Some(hash.clone()),
            });
        }
    }
    if let Some((_, set)) = current {
        change_sets.push(set);
    }
    Ok(ChangeLog {
        change_sets,
        ..ChangeLog::default()
    })
}

fn status_of(xy: &str) -> FileStatus {
    if xy == "??" {
        return FileStatus::Untracked;
    }
    let has = |c: char| xy.contains(c);
    if has('U') || xy == "AA" || xy == "DD" {
        FileStatus::Conflict
    } else if has('R') || has('C') {
        FileStatus::Renamed
    } else if has('D') {
        FileStatus::Deleted
    } else if has('A') {
        FileStatus::Added
    } else if has('M') || has('T') {
        FileStatus::Modified
    } else {
        FileStatus::Unknown
    }
}

/// Undo git's C-style path quoting (`"caf\303\251.txt"`).
///
/// Octal escapes are raw bytes of the UTF-8 path, so they are gathered
/// before decoding.
fn unquote(path: &str) -> String {
    let Some(inner) = path.strip_prefix('"').and_then(|p| p.strip_suffix('"')) else {
        return path.to_string();
    };
    let mut bytes = Vec::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        let byte = match chars.next() {
            Some('a') => 0x07,
            Some('b') => 0x08,
            Some('t') => b'\t',
            Some('n') => b'\n',
            Some('v') => 0x0b,
            Some('f') => 0x0c,
            Some('r') => b'\r',
            Some(d @ '0'..='7') => {
                let mut value = d as u32 - '0' as u32;
                for _ in 0..2 {
                    match chars.peek() {
                        Some(&o @ '0'..='7') => {
                            value = value * 8 + (o as u32 - '0' as u32);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                (value & 0xff) as u8
            }
            Some(other) => {
                let mut buf = [0; 4];
                bytes.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
                continue;
            }
            None => b'\\',
        };
        bytes.push(byte);
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Parse `git status --porcelain` output; paths are made relative to
/// the directory whose repository-relative prefix is `prefix`.
fn parse_status(stdout: &str, prefix: &str) -> Vec<ChangedFile> {
    stdout
        .lines()
        .filter(|line| line.len() > 3 && !line.starts_with("!!"))
        .map(|line| {
            let (xy, rest) = line.split_at(2);
            let path = rest.trim_start();
            let path = path.rsplit_once(" -> ").map_or(path, |(_, to)| to);
            let path = unquote(path);
            let path = path.strip_prefix(prefix).unwrap_or(&path);
            ChangedFile::new(path, status_of(xy))
        })
        .collect()
}
