//! Serializers: the flat properties file, the XML report and the console
//! summary.

pub mod document;
pub mod properties;
pub mod render;
pub mod summary;
pub mod xml;

use std::fs;
use std::io;
use std::path::Path;

/// Write `content` to `path`, creating parent directories on demand.
pub(crate) fn write_file(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}
