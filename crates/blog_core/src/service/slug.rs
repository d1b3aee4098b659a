//! Slug derivation shared by categories, posts and tags.

use crate::model::trim_display;
use once_cell::sync::Lazy;
use regex::Regex;

static NON_SLUG_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9-]+").expect("valid slug regex"));

/// Derives the URL-safe slug for a display value.
///
/// Rules, applied in order:
/// - surrounding ASCII whitespace is trimmed (see [`trim_display`]);
/// - every `-` becomes `_`;
/// - each run of characters outside `[A-Za-z0-9-]` collapses into one `-`;
/// - the result is lowercased.
///
/// Leading or trailing hyphens are kept (`"Hello!"` becomes `"hello-"`).
pub fn create_slug(value: &str) -> String {
    let underscored = trim_display(value).replace('-', "_");
    NON_SLUG_RUN_RE
        .replace_all(&underscored, "-")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::create_slug;

    #[test]
    fn lowercases_and_hyphenates_words() {
        assert_eq!(create_slug("Hello World"), "hello-world");
        assert_eq!(create_slug("  My First   Post \n"), "my-first-post");
    }

    #[test]
    fn existing_hyphens_survive_through_underscore_stage() {
        assert_eq!(create_slug("test-tag"), "test-tag");
        assert_eq!(create_slug("a--b"), "a-b");
        assert_eq!(create_slug("snake_case-name"), "snake-case-name");
    }

    #[test]
    fn case_variants_share_one_slug() {
        assert_eq!(create_slug("Foo"), create_slug("FOO"));
        assert_eq!(create_slug("foo"), "foo");
    }

    #[test]
    fn punctuation_runs_collapse_and_edges_are_kept() {
        assert_eq!(create_slug("C++ & Rust!"), "c-rust-");
        assert_eq!(create_slug("Hello!"), "hello-");
        assert_eq!(create_slug("Über"), "-ber");
    }

    #[test]
    fn blank_input_yields_empty_slug() {
        assert_eq!(create_slug("   "), "");
        assert_eq!(create_slug("\t\x0B\0\r\n"), "");
    }

    #[test]
    fn non_ascii_whitespace_is_slugged_like_punctuation() {
        assert_eq!(create_slug("\u{a0}Foo"), "-foo");
        assert_eq!(create_slug("Foo\u{2003}"), "foo-");
    }
}
