//! Text helpers shared by providers and serializers.
//!
//! Multi-value facts are stored joined with `LIST_SEPARATOR`; readers split
//! on `,` and trim, so both sides agree on the format.

use crate::facts::keys::LIST_SEPARATOR;

/// True for empty strings and strings of whitespace only.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Strip one pair of enclosing square brackets, if present.
///
/// Older writers stored lists in their debug form (`[a, b]`); readers accept
/// both shapes.
pub fn prettify(value: &str) -> &str {
    let trimmed = value.trim();
    trimmed
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .unwrap_or(trimmed)
}

/// Join items with the list separator.
pub fn join_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}

/// Split a comma-joined fact into trimmed, non-empty tokens.
pub fn split_list(value: &str) -> Vec<&str> {
    prettify(value)
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Replace backslash separators with forward slashes.
pub fn to_forward_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

/// Replace every character of `value` with `*`.
pub fn mask(value: &str) -> String {
    "*".repeat(value.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_detection() {
        assert!(is_blank(""));
        assert!(is_blank(" \t\n"));
        assert!(!is_blank(" x "));
    }

    #[test]
    fn prettify_strips_only_enclosing_brackets() {
        assert_eq!(prettify("[a, b]"), "a, b");
        assert_eq!(prettify("  [a]  "), "a");
        assert_eq!(prettify("a]"), "a]");
        assert_eq!(prettify("[a"), "[a");
        assert_eq!(prettify("plain"), "plain");
    }

    #[test]
    fn split_and_join_agree() {
        let joined = join_list(&["clean", "install", "deploy"]);
        assert_eq!(joined, "clean, install, deploy");
        assert_eq!(split_list(&joined), vec!["clean", "install", "deploy"]);
    }

    #[test]
    fn split_list_drops_empty_tokens() {
        assert_eq!(split_list("a,, b ,"), vec!["a", "b"]);
        assert!(split_list("   ").is_empty());
    }

    #[test]
    fn mask_counts_characters_not_bytes() {
        assert_eq!(mask("pässword"), "********");
        assert_eq!(mask(""), "");
    }

    #[test]
    fn forward_slashes() {
        assert_eq!(to_forward_slashes(r"src\main\lib.rs"), "src/main/lib.rs");
    }
}
