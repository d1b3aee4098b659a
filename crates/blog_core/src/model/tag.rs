//! Tag record.

use super::metadata::Metadata;
use super::{require_text, ModelValidationError};
use serde::{Deserialize, Serialize};

pub type TagId = i64;

/// Free-form label attached to posts. `name` is stored in slug form and is
/// unique, which makes tag creation idempotent by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Option<TagId>,
    pub name: String,
    pub metadata: Metadata,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("tag", "name", &self.name)
    }
}
