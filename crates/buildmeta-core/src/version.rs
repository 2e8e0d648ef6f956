//! Full-version composition.
//!
//! `compose("2.0.0-SNAPSHOT", "20240115", Some("42"), "false", all_on)`
//! yields `2.0.0-20240115r42-SNAPSHOT`: the pre-release suffix always moves
//! to the end.

use serde::{Deserialize, Serialize};

use crate::util::text::is_blank;

/// Suffixes kept at the very end of a composed version.
pub const PRE_RELEASE_SUFFIXES: &[&str] = &["-SNAPSHOT"];

pub const LOCALLY_MODIFIED_TAG: &str = "-locally-modified";

/// Independent toggles for each composed part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VersionFlags {
    pub add_build_date: bool,
    pub add_release_number: bool,
    pub add_locally_modified_tag: bool,
}

impl Default for VersionFlags {
    fn default() -> Self {
        Self {
            add_build_date: true,
            add_release_number: true,
            add_locally_modified_tag: true,
        }
    }
}

impl VersionFlags {
    pub fn none() -> Self {
        Self {
            add_build_date: false,
            add_release_number: false,
            add_locally_modified_tag: false,
        }
    }
}

/// Split a known pre-release suffix off `version`.
pub fn split_pre_release(version: &str) -> (&str, &str) {
    PRE_RELEASE_SUFFIXES
        .iter()
        .find_map(|suffix| {
            version
                .strip_suffix(suffix)
                .map(|base| (base, &version[base.len()..]))
        })
        .unwrap_or((version, ""))
}

pub fn compose(
    version: &str,
    date_part: &str,
    revision_id: Option<&str>,
    locally_modified: Option<&str>,
    flags: VersionFlags,
) -> String {
    let (base, suffix) = split_pre_release(version);
    let mut out = String::from(base);

    if flags.add_build_date {
        out.push('-');
        out.push_str(date_part);
    }
    if flags.add_release_number {
        if let Some(id) = revision_id.filter(|id| !is_blank(id)) {
            out.push('r');
            out.push_str(id);
        }
    }
    if flags.add_locally_modified_tag && locally_modified == Some("true") {
        out.push_str(LOCALLY_MODIFIED_TAG);
    }

    out.push_str(suffix);
    out
}
