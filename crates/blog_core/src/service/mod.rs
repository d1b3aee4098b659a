//! Blog use-case services.
//!
//! # Responsibility
//! - Layer the blog business rules on top of repository primitives.
//! - Keep callers decoupled from storage details.

pub mod blog_service;
pub mod slug;
