//! Post record.
//!
//! # Invariants
//! - `slug` is unique across all posts and derived from `title`.
//! - `author_id` is always set.

use super::category::CategoryId;
use super::metadata::Metadata;
use super::status::Status;
use super::{require_text, ModelValidationError};
use serde::{Deserialize, Serialize};

pub type PostId = i64;
pub type AuthorId = i64;

/// One blog article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Row id. `None` until inserted.
    pub id: Option<PostId>,
    /// Owning category, if any.
    pub category_id: Option<CategoryId>,
    /// Display title, trimmed before persistence.
    pub title: String,
    /// URL-safe identifier derived from `title`.
    pub slug: String,
    /// Raw article body.
    pub body: String,
    pub author_id: AuthorId,
    pub status: Status,
    /// Epoch milliseconds, assigned by storage.
    pub created_at: i64,
    /// Epoch milliseconds of the last update, if any.
    pub updated_at: Option<i64>,
    pub metadata: Metadata,
}

impl Post {
    /// Creates an unsaved, published post without category.
    pub fn new(title: impl Into<String>, body: impl Into<String>, author_id: AuthorId) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            author_id,
            ..Self::default()
        }
    }

    /// Files the post under `category_id`.
    pub fn in_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn is_published(&self) -> bool {
        self.status == Status::Published
    }

    /// Checks required fields before persistence.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("post", "title", &self.title)?;
        require_text("post", "slug", &self.slug)?;
        require_text("post", "body", &self.body)?;
        if self.author_id <= 0 {
            return Err(ModelValidationError::InvalidAuthorId(self.author_id));
        }
        Ok(())
    }
}
