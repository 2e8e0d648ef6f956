use tracing::debug;

use crate::scm::access::ScmAccessInfo;
use crate::scm::query::{ChangedFile, RevisionQuery, ScmError};
use crate::util::text::{join_list, to_forward_slashes};

/// Verdict of a working-copy status check.
///
/// `files` is present exactly when `modified` is true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocallyModifiedInfo {
    modified: bool,
    files: Option<String>,
}

impl LocallyModifiedInfo {
    pub fn unmodified() -> Self {
        Self {
            modified: false,
            files: None,
        }
    }

    /// Build the verdict from an already filtered change list.
    pub fn from_changes(changes: &[ChangedFile]) -> Self {
        if changes.is_empty() {
            return Self::unmodified();
        }
        let rendered: Vec<String> = changes
            .iter()
            .map(|c| format!("{}:{}", to_forward_slashes(&c.path), c.status))
            .collect();
        Self {
            modified: true,
            files: Some(join_list(&rendered)),
        }
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn files(&self) -> Option<&str> {
        self.files.as_deref()
    }
}

fn is_dot_file(path: &str) -> bool {
    path.starts_with('.')
}

/// Run the status query and reduce the result to a verdict.
pub fn detect(
    query: &dyn RevisionQuery,
    access: &ScmAccessInfo,
) -> Result<LocallyModifiedInfo, ScmError> {
    let mut changes = query.status(&access.root_dir)?;
    for change in &mut changes {
        change.path = to_forward_slashes(&change.path);
    }
    if access.ignore_dot_files_in_base_dir {
        changes.retain(|c| !is_dot_file(&c.path));
    }
    let info = LocallyModifiedInfo::from_changes(&changes);
    debug!(modified = info.is_modified(), "checked working copy");
    Ok(info)
}
