use std::path::Path;

use crate::util::text::to_forward_slashes;

/// Rewrites absolute paths below a base directory into relative,
/// forward-slashed paths.
#[derive(Debug, Clone)]
pub struct FilePathNormalizer {
    base_dir: String,
}

impl FilePathNormalizer {
    pub fn new(base_dir: &str) -> Self {
        Self {
            base_dir: base_dir.trim().to_string(),
        }
    }

    pub fn from_path(base_dir: &Path) -> Self {
        Self::new(&base_dir.display().to_string())
    }

    pub fn base_dir(&self) -> &str {
        &self.base_dir
    }

    /// Normalize a single path.
    ///
    /// The base directory prefix is dropped, separators become `/` and one
    /// leading `/` is removed unless it is the whole path.
    pub fn normalize(&self, input: &str) -> String {
        let relative = if !self.base_dir.is_empty() {
            input.strip_prefix(self.base_dir.as_str()).unwrap_or(input)
        } else {
            input
        };
        let norm = to_forward_slashes(relative);
        match norm.strip_prefix('/') {
            Some(rest) if !rest.is_empty() => rest.to_string(),
            _ => norm,
        }
    }

    /// Remove every occurrence of `<base_dir>/` from a joined path list.
    ///
    /// Both sides are converted to forward slashes first.
    pub fn strip_base_dir(&self, joined: &str) -> String {
        let slashed = to_forward_slashes(joined.trim());
        if self.base_dir.is_empty() {
            return slashed;
        }
        let mut base = to_forward_slashes(&self.base_dir);
        if !base.ends_with('/') {
            base.push('/');
        }
        slashed.replace(&base, "")
    }
}
