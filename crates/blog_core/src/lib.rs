//! Core domain logic for the blog subsystem.
//!
//! Categories form a tree, posts carry unique slugs, tags are deduplicated by
//! normalized name, and post/tag edges live in `post_tags`. All business
//! rules sit in [`BlogService`]; persistence goes through the repository
//! traits in [`repo`].

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::category::{Category, CategoryId};
pub use model::metadata::Metadata;
pub use model::post::{AuthorId, Post, PostId};
pub use model::post_tag::PostTagAssociation;
pub use model::status::Status;
pub use model::tag::{Tag, TagId};
pub use model::ModelValidationError;
pub use repo::{
    BlogRepository, CategoryQuery, CategoryRepository, ParentFilter, PostQuery, PostRepository,
    PostTagRepository, RepoError, RepoResult, SqliteBlogRepository, TagQuery, TagRepository,
};
pub use service::blog_service::{
    BlogResult, BlogService, BlogServiceError, InvalidEntity, ValidationError,
};
pub use service::slug::create_slug;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
