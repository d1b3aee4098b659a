//! Category record.
//!
//! # Invariants
//! - `slug` is unique across all categories.
//! - `parent_id`, when set, references an existing category; the parent
//!   pointers form a forest.

use super::metadata::Metadata;
use super::status::Status;
use super::{require_text, ModelValidationError};
use serde::{Deserialize, Serialize};

pub type CategoryId = i64;

/// Hierarchical grouping for posts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Row id. `None` until inserted.
    pub id: Option<CategoryId>,
    /// Display name, trimmed before persistence.
    pub name: String,
    /// URL-safe identifier derived from `name`.
    pub slug: String,
    /// Parent category. `None` means root.
    pub parent_id: Option<CategoryId>,
    pub status: Status,
    /// Epoch milliseconds, assigned by storage.
    pub created_at: i64,
    /// Epoch milliseconds of the last update, if any.
    pub updated_at: Option<i64>,
    pub metadata: Metadata,
}

impl Category {
    /// Creates an unsaved, published root category.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Places the category under `parent_id`.
    pub fn with_parent(mut self, parent_id: CategoryId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn is_published(&self) -> bool {
        self.status == Status::Published
    }

    /// Checks required fields before persistence.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("category", "name", &self.name)?;
        require_text("category", "slug", &self.slug)?;
        Ok(())
    }
}
