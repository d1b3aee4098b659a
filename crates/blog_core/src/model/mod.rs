//! Blog domain records.
//!
//! # Responsibility
//! - Define the typed records mapped 1:1 onto the blog tables.
//! - Own record-level validation rules that must hold before persistence.
//!
//! # Invariants
//! - `id == None` means "not persisted yet"; the repository assigns ids.
//! - Slugs are derived by the service layer, never trusted from callers.

pub mod category;
pub mod metadata;
pub mod post;
pub mod post_tag;
pub mod status;
pub mod tag;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Characters stripped from both ends of display values. Other Unicode
/// whitespace such as U+00A0 is kept and later slugged like punctuation.
const EDGE_WHITESPACE: &[char] = &[' ', '\t', '\n', '\r', '\0', '\x0B'];

/// Record-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// A required text field is empty after [`trim_display`].
    BlankField {
        entity: &'static str,
        field: &'static str,
    },
    /// Posts must reference a positive author id.
    InvalidAuthorId(i64),
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField { entity, field } => {
                write!(f, "{entity}.{field} is required")
            }
            Self::InvalidAuthorId(value) => write!(f, "post.author_id must be positive, got {value}"),
        }
    }
}

impl Error for ModelValidationError {}

pub(crate) fn require_text(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ModelValidationError> {
    if trim_display(value).is_empty() {
        return Err(ModelValidationError::BlankField { entity, field });
    }
    Ok(())
}

/// Trims the ASCII whitespace set (space, tab, LF, CR, NUL, VT) from both
/// ends of a display value.
pub fn trim_display(value: &str) -> &str {
    value.trim_matches(EDGE_WHITESPACE)
}

#[cfg(test)]
mod tests {
    use super::{require_text, trim_display, ModelValidationError};

    #[test]
    fn trim_display_keeps_non_ascii_whitespace() {
        assert_eq!(trim_display(" \tFoo\x0B\0"), "Foo");
        assert_eq!(trim_display("\u{a0}Foo\r\n"), "\u{a0}Foo");
    }

    #[test]
    fn require_text_rejects_ascii_blank_only() {
        assert_eq!(
            require_text("tag", "name", " \t\n"),
            Err(ModelValidationError::BlankField {
                entity: "tag",
                field: "name",
            })
        );
        assert!(require_text("tag", "name", "\u{a0}").is_ok());
    }
}
