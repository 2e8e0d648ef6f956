//! Flat `key=value` properties format.
//!
//! One comment line, then every fact sorted by key. Escaping covers only
//! what the reader needs to recover the exact value: backslash, line
//! breaks, tabs, separators inside keys and leading blanks in values.

use std::path::Path;

use tracing::info;

use crate::PROPERTIES_COMMENT;
use crate::error::BuildMetaError;
use crate::facts::keys::TOOL_FILTERS;
use crate::facts::store::FactStore;
use crate::output::write_file;
use crate::util::paths::FilePathNormalizer;

fn escape(raw: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for (i, c) in raw.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x0c' => out.push_str("\\f"),
            '=' | ':' | ' ' if is_key => {
                out.push('\\');
                out.push(c);
            }
            '#' | '!' if is_key && i == 0 => {
                out.push('\\');
                out.push(c);
            }
            ' ' if i == 0 => out.push_str("\\ "),
            _ => out.push(c),
        }
    }
    out
}

fn unescape(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('f') => out.push('\x0c'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

/// Whitespace the reader trims around keys and values. Any other
/// whitespace, including non-ASCII blanks, is content.
fn is_properties_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// True when `s` ends in an unpaired backslash.
fn ends_with_escape(s: &str) -> bool {
    s.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

/// Trim trailing blanks from a key, keeping one that is escaped.
fn trim_key_end(key: &str) -> &str {
    let trimmed = key.trim_end_matches(is_properties_blank);
    if trimmed.len() < key.len() && ends_with_escape(trimmed) {
        &key[..trimmed.len() + 1]
    } else {
        trimmed
    }
}

/// Position of the first `=` or `:` not preceded by a backslash escape.
fn separator_index(line: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '=' | ':' => return Some(i),
            _ => {}
        }
    }
    None
}

/// Apply the flat-file normalization: filter paths lose the base directory.
pub fn normalize_for_output(store: &FactStore, normalizer: &FilePathNormalizer) -> FactStore {
    let mut out = store.clone();
    if let Some(filters) = store.get(TOOL_FILTERS) {
        out.set(TOOL_FILTERS, normalizer.strip_base_dir(filters));
    }
    out
}

pub fn render_properties(store: &FactStore, normalizer: &FilePathNormalizer) -> String {
    let normalized = normalize_for_output(store, normalizer);
    let mut out = format!("#{PROPERTIES_COMMENT}\n");
    for (key, value) in normalized.iter() {
        out.push_str(&escape(key, true));
        out.push('=');
        out.push_str(&escape(value, false));
        out.push('\n');
    }
    out
}

pub fn parse_properties(text: &str) -> FactStore {
    let mut store = FactStore::new();
    for line in text.lines() {
        let line = line.trim_start_matches(is_properties_blank);
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let (key, value) = match separator_index(line) {
            Some(i) => (&line[..i], &line[i + 1..]),
            None => (line, ""),
        };
        store.set(
            unescape(trim_key_end(key)),
            unescape(value.trim_start_matches(is_properties_blank)),
        );
    }
    store
}

pub fn write_properties_file(
    path: &Path,
    store: &FactStore,
    normalizer: &FilePathNormalizer,
) -> Result<(), BuildMetaError> {
    info!(path = %path.display(), "writing properties");
    write_file(path, &render_properties(store, normalizer)).map_err(|source| {
        BuildMetaError::Serialization {
            target: "properties file",
            path: path.to_path_buf(),
            source,
        }
    })
}

pub fn read_properties_file(path: &Path) -> Result<FactStore, BuildMetaError> {
    let text = std::fs::read_to_string(path).map_err(|source| BuildMetaError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_properties(&text))
}
