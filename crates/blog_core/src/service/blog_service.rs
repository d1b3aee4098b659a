//! Blog use-case service.
//!
//! # Responsibility
//! - Enforce slug uniqueness for categories and posts before persistence.
//! - Walk the category tree and resolve posts across a whole subtree.
//! - Keep tag creation idempotent by normalized name.
//! - Own the post -> `post_tags` cascade on delete.
//!
//! # Invariants
//! - Not-found targets are reported as `false`, `None` or empty lists, never
//!   as errors.
//! - Duplicate slugs surface as `BlogServiceError::Validation`.
//! - Storage failures propagate unchanged as `BlogServiceError::Repo`.
//! - The slug pre-check is only a friendlier error; the schema's unique
//!   constraints remain the final arbiter under concurrent writers.

use crate::model::category::{Category, CategoryId};
use crate::model::post::{Post, PostId};
use crate::model::post_tag::PostTagAssociation;
use crate::model::status::Status;
use crate::model::tag::{Tag, TagId};
use crate::model::trim_display;
use crate::repo::{BlogRepository, CategoryQuery, ParentFilter, PostQuery, RepoError, TagQuery};
use crate::service::slug::create_slug;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type BlogResult<T> = Result<T, BlogServiceError>;

/// Record rejected by a business rule.
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidEntity {
    Category(Category),
    Post(Post),
    Tag(Tag),
}

/// Recoverable rule violation carrying the offending record.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub entity: InvalidEntity,
    /// Human-readable reason.
    pub message: String,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ValidationError {}

/// Service error for blog use-cases.
#[derive(Debug)]
pub enum BlogServiceError {
    /// Duplicate slug/name or another business-rule violation.
    Validation(Box<ValidationError>),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl BlogServiceError {
    fn validation(entity: InvalidEntity, message: impl Into<String>) -> Self {
        Self::Validation(Box::new(ValidationError {
            entity,
            message: message.into(),
        }))
    }

    /// Returns the validation details when this is a rule violation.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(_) => None,
        }
    }
}

impl Display for BlogServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "validation failed: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BlogServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err.as_ref()),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for BlogServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Blog service facade over an injected repository handle.
pub struct BlogService<R: BlogRepository> {
    repo: R,
}

impl<R: BlogRepository> BlogService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Inserts a new category. Any caller-provided id is discarded.
    ///
    /// # Errors
    /// - `Validation` when the derived slug is taken, the name is blank, or
    ///   the parent does not exist.
    pub fn create_category(&self, mut category: Category) -> BlogResult<Category> {
        category.id = None;
        self.save_category(category)
    }

    /// Updates category `id` with the given fields.
    ///
    /// Returns `Ok(None)` when no category has that id. Re-saving an
    /// unchanged name never conflicts with the row itself.
    pub fn update_category(
        &self,
        mut category: Category,
        id: CategoryId,
    ) -> BlogResult<Option<Category>> {
        category.id = Some(id);
        match self.save_category(category) {
            Ok(saved) => Ok(Some(saved)),
            Err(BlogServiceError::Repo(RepoError::NotFound { .. })) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Deletes one category. Returns `false` when it does not exist.
    pub fn delete_category_by_id(&self, id: CategoryId) -> BlogResult<bool> {
        if self.repo.get_category(id)?.is_none() {
            return Ok(false);
        }
        let deleted = self.repo.delete_category(id)?;
        info!(
            "event=category_delete module=blog_service status=ok category_id={} deleted={}",
            id, deleted
        );
        Ok(deleted)
    }

    /// Marks one category as disabled. Returns `false` when it does not exist.
    pub fn disable_category_by_id(&self, id: CategoryId) -> BlogResult<bool> {
        self.set_category_status(id, Status::Disabled)
    }

    /// Marks one category as published. Returns `false` when it does not exist.
    pub fn publish_category_by_id(&self, id: CategoryId) -> BlogResult<bool> {
        self.set_category_status(id, Status::Published)
    }

    pub fn get_category_by_id(&self, id: CategoryId) -> BlogResult<Option<Category>> {
        Ok(self.repo.get_category(id)?)
    }

    pub fn get_category_by_slug(&self, slug: &str) -> BlogResult<Option<Category>> {
        Ok(self.repo.find_category(&CategoryQuery::by_slug(slug))?)
    }

    /// Lists categories, published only when `only_active` is set.
    pub fn get_all_categories(
        &self,
        limit: Option<u32>,
        only_active: bool,
    ) -> BlogResult<Vec<Category>> {
        let query = CategoryQuery {
            limit,
            ..CategoryQuery::default()
        }
        .only_active(only_active);
        Ok(self.repo.list_categories(&query)?)
    }

    /// Lists categories without a parent.
    pub fn get_all_root_categories(&self, only_active: bool) -> BlogResult<Vec<Category>> {
        let query = CategoryQuery {
            parent: Some(ParentFilter::Root),
            ..CategoryQuery::default()
        }
        .only_active(only_active);
        Ok(self.repo.list_categories(&query)?)
    }

    /// Returns every descendant of `parent_id` in pre-order: each child is
    /// followed by its own subtree before its next sibling.
    ///
    /// With `only_active`, a disabled category hides its whole subtree.
    /// Cyclic parent pointers in storage are visited once and then skipped.
    pub fn get_all_child_categories(
        &self,
        parent_id: CategoryId,
        only_active: bool,
    ) -> BlogResult<Vec<Category>> {
        let mut descendants = Vec::new();
        let mut visited = HashSet::from([parent_id]);
        let mut pending = self.direct_children(parent_id, only_active)?;
        pending.reverse();

        while let Some(category) = pending.pop() {
            let Some(id) = category.id else {
                continue;
            };
            if !visited.insert(id) {
                warn!(
                    "event=category_tree_walk module=blog_service status=cycle_skipped root_id={} category_id={}",
                    parent_id, id
                );
                continue;
            }

            let mut children = self.direct_children(id, only_active)?;
            descendants.push(category);
            children.reverse();
            pending.extend(children);
        }

        debug!(
            "event=category_tree_walk module=blog_service status=ok root_id={} descendants={}",
            parent_id,
            descendants.len()
        );
        Ok(descendants)
    }

    /// Inserts a new post. Any caller-provided id is discarded.
    pub fn create_post(&self, post: Post) -> BlogResult<Post> {
        self.create_post_with_tags(post, &[] as &[&str])
    }

    /// Inserts a new post, then creates-or-reuses and links every tag name.
    pub fn create_post_with_tags<S: AsRef<str>>(
        &self,
        mut post: Post,
        tag_names: &[S],
    ) -> BlogResult<Post> {
        post.id = None;
        let created = self.save_post(post)?;

        if !tag_names.is_empty() {
            if let Some(post_id) = created.id {
                self.add_tags_to_post_id(post_id, tag_names)?;
            }
        }

        Ok(created)
    }

    /// Updates post `id`. Returns `Ok(None)` when no post has that id.
    ///
    /// # Errors
    /// - `Validation` when the new title maps onto another post's slug.
    pub fn update_post(&self, mut post: Post, id: PostId) -> BlogResult<Option<Post>> {
        post.id = Some(id);
        match self.save_post(post) {
            Ok(saved) => Ok(Some(saved)),
            Err(BlogServiceError::Repo(RepoError::NotFound { .. })) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Deletes one post and all of its tag associations.
    ///
    /// Returns `false` when the post does not exist.
    pub fn delete_post_by_id(&self, id: PostId) -> BlogResult<bool> {
        if self.repo.get_post(id)?.is_none() {
            return Ok(false);
        }

        let deleted = self.repo.delete_post(id)?;
        if deleted {
            let associations = self.repo.list_associations_for_post(id)?;
            for association in &associations {
                self.repo.delete_association(association)?;
            }
            info!(
                "event=post_delete module=blog_service status=ok post_id={} associations_removed={}",
                id,
                associations.len()
            );
        }

        Ok(deleted)
    }

    /// Marks one post as disabled. Returns `false` when it does not exist.
    pub fn disable_post_by_id(&self, id: PostId) -> BlogResult<bool> {
        self.set_post_status(id, Status::Disabled)
    }

    /// Marks one post as published. Returns `false` when it does not exist.
    pub fn publish_post_by_id(&self, id: PostId) -> BlogResult<bool> {
        self.set_post_status(id, Status::Published)
    }

    pub fn get_post_by_id(&self, id: PostId) -> BlogResult<Option<Post>> {
        Ok(self.repo.get_post(id)?)
    }

    pub fn get_post_by_slug(&self, slug: &str) -> BlogResult<Option<Post>> {
        Ok(self.repo.find_post(&PostQuery::by_slug(slug))?)
    }

    /// Lists all posts regardless of status, newest first.
    pub fn get_all_posts(&self, limit: Option<u32>) -> BlogResult<Vec<Post>> {
        Ok(self
            .repo
            .list_posts(&PostQuery::default().with_limit(limit))?)
    }

    /// Lists published posts, newest first.
    pub fn get_latest_posts(&self, limit: Option<u32>) -> BlogResult<Vec<Post>> {
        Ok(self.repo.list_posts(&PostQuery::published().with_limit(limit))?)
    }

    /// Alias of [`Self::get_latest_posts`].
    pub fn get_all_active_posts(&self, limit: Option<u32>) -> BlogResult<Vec<Post>> {
        self.get_latest_posts(limit)
    }

    /// Lists posts filed under `category_id` or any of its published
    /// descendants, newest first.
    ///
    /// The subtree walk always skips disabled categories; `only_active`
    /// only filters the posts themselves. Returns an empty list when the
    /// category does not exist.
    pub fn get_all_posts_in_category_id(
        &self,
        category_id: CategoryId,
        only_active: bool,
        limit: Option<u32>,
    ) -> BlogResult<Vec<Post>> {
        if self.repo.get_category(category_id)?.is_none() {
            return Ok(Vec::new());
        }

        let mut category_ids = vec![category_id];
        category_ids.extend(
            self.get_all_child_categories(category_id, true)?
                .into_iter()
                .filter_map(|category| category.id),
        );

        let query = PostQuery {
            category_ids: Some(category_ids),
            status: only_active.then_some(Status::Published),
            limit,
            ..PostQuery::default()
        };
        Ok(self.repo.list_posts(&query)?)
    }

    /// Lists posts carrying any of the given tag names, each post once,
    /// newest first.
    pub fn get_all_posts_with_tag_names<S: AsRef<str>>(
        &self,
        tag_names: &[S],
        limit: Option<u32>,
    ) -> BlogResult<Vec<Post>> {
        let tags = self.get_tags_by_names(tag_names)?;
        if tags.is_empty() {
            return Ok(Vec::new());
        }

        let mut seen = HashSet::new();
        let mut post_ids = Vec::new();
        for tag_id in tags.iter().filter_map(|tag| tag.id) {
            for association in self.repo.list_associations_for_tag(tag_id)? {
                if seen.insert(association.post_id) {
                    post_ids.push(association.post_id);
                }
            }
        }

        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = PostQuery {
            ids: Some(post_ids),
            limit,
            ..PostQuery::default()
        };
        Ok(self.repo.list_posts(&query)?)
    }

    /// Single-name convenience over [`Self::get_all_posts_with_tag_names`].
    pub fn get_all_posts_with_tag_name(
        &self,
        tag_name: &str,
        limit: Option<u32>,
    ) -> BlogResult<Vec<Post>> {
        self.get_all_posts_with_tag_names(&[tag_name], limit)
    }

    /// Creates a tag, or returns the existing one with the same normalized
    /// name unchanged.
    pub fn create_tag(&self, mut tag: Tag) -> BlogResult<Tag> {
        tag.name = create_slug(&tag.name);
        if let Err(err) = tag.validate() {
            return Err(BlogServiceError::validation(
                InvalidEntity::Tag(tag),
                err.to_string(),
            ));
        }

        if let Some(existing) = self.repo.find_tag(&TagQuery::by_name(tag.name.as_str()))? {
            debug!(
                "event=tag_create module=blog_service status=reused tag_id={}",
                existing.id.unwrap_or_default()
            );
            return Ok(existing);
        }

        tag.id = None;
        let created = self.repo.save_tag(&tag)?;
        info!(
            "event=tag_create module=blog_service status=ok tag_id={}",
            created.id.unwrap_or_default()
        );
        Ok(created)
    }

    /// Looks up one tag; `name` is normalized to slug form first.
    pub fn get_tag_by_name(&self, name: &str) -> BlogResult<Option<Tag>> {
        Ok(self.repo.find_tag(&TagQuery::by_name(create_slug(name)))?)
    }

    /// Looks up tags by name; every input is normalized to slug form first.
    pub fn get_tags_by_names<S: AsRef<str>>(&self, names: &[S]) -> BlogResult<Vec<Tag>> {
        let normalized = names
            .iter()
            .map(|name| create_slug(name.as_ref()))
            .collect();
        Ok(self.repo.list_tags(&TagQuery::by_names(normalized))?)
    }

    /// Lists every tag ordered by name.
    pub fn get_all_tags(&self) -> BlogResult<Vec<Tag>> {
        Ok(self.repo.list_tags(&TagQuery::default())?)
    }

    /// Creates-or-reuses each tag and links it to `post_id`.
    ///
    /// A missing post is a successful no-op. Names that normalize to the
    /// same tag within one call are linked once; linking a tag the post
    /// already carries is rejected by storage.
    pub fn add_tags_to_post_id<S: AsRef<str>>(
        &self,
        post_id: PostId,
        tag_names: &[S],
    ) -> BlogResult<bool> {
        if self.repo.get_post(post_id)?.is_none() {
            return Ok(true);
        }

        let mut linked = HashSet::new();
        for name in tag_names {
            let tag = self.create_tag(Tag::new(name.as_ref()))?;
            let Some(tag_id) = tag.id else {
                continue;
            };
            if linked.insert(tag_id) {
                self.repo
                    .create_association(&PostTagAssociation::new(post_id, tag_id))?;
            }
        }

        info!(
            "event=post_tags_add module=blog_service status=ok post_id={} tags={}",
            post_id,
            linked.len()
        );
        Ok(true)
    }

    /// Unlinks the given tag ids from `post_id`. Missing posts, tags and
    /// links are skipped silently.
    pub fn remove_tags_from_post_id(&self, post_id: PostId, tag_ids: &[TagId]) -> BlogResult<bool> {
        if self.repo.get_post(post_id)?.is_none() {
            return Ok(true);
        }
        let tags = self.repo.list_tags(&TagQuery::by_ids(tag_ids.to_vec()))?;
        self.unlink_tags(post_id, &tags)?;
        Ok(true)
    }

    /// Unlinks the given tag names (normalized to slug form) from `post_id`.
    pub fn remove_tag_names_from_post_id<S: AsRef<str>>(
        &self,
        post_id: PostId,
        tag_names: &[S],
    ) -> BlogResult<bool> {
        if self.repo.get_post(post_id)?.is_none() {
            return Ok(true);
        }
        let tags = self.get_tags_by_names(tag_names)?;
        self.unlink_tags(post_id, &tags)?;
        Ok(true)
    }

    /// Lists the tags linked to `post_id`, ordered by name.
    pub fn get_all_tags_for_post_id(&self, post_id: PostId) -> BlogResult<Vec<Tag>> {
        let tag_ids: Vec<TagId> = self
            .repo
            .list_associations_for_post(post_id)?
            .into_iter()
            .map(|association| association.tag_id)
            .collect();

        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.repo.list_tags(&TagQuery::by_ids(tag_ids))?)
    }

    fn save_category(&self, mut category: Category) -> BlogResult<Category> {
        category.name = trim_display(&category.name).to_string();
        category.slug = create_slug(&category.name);

        if let Err(err) = category.validate() {
            return Err(BlogServiceError::validation(
                InvalidEntity::Category(category),
                err.to_string(),
            ));
        }
        if let Some(message) = self.parent_violation(&category)? {
            return Err(rejected_category(category, message));
        }

        let previous = match category.id {
            Some(id) => self.repo.get_category(id)?,
            None => None,
        };
        let slug_changed = previous.map_or(true, |previous| previous.slug != category.slug);
        if slug_changed
            && self
                .repo
                .find_category(&CategoryQuery::by_slug(category.slug.as_str()))?
                .is_some()
        {
            let message = format!("Category already exists with name: {}", category.name);
            return Err(rejected_category(category, message));
        }

        let saved = self.repo.save_category(&category)?;
        info!(
            "event=category_save module=blog_service status=ok category_id={} slug_checked={}",
            saved.id.unwrap_or_default(),
            slug_changed
        );
        Ok(saved)
    }

    fn save_post(&self, mut post: Post) -> BlogResult<Post> {
        post.title = trim_display(&post.title).to_string();
        post.slug = create_slug(&post.title);

        if let Err(err) = post.validate() {
            return Err(BlogServiceError::validation(
                InvalidEntity::Post(post),
                err.to_string(),
            ));
        }

        let previous = match post.id {
            Some(id) => self.repo.get_post(id)?,
            None => None,
        };
        let slug_changed = previous.map_or(true, |previous| previous.slug != post.slug);
        if slug_changed
            && self
                .repo
                .find_post(&PostQuery::by_slug(post.slug.as_str()))?
                .is_some()
        {
            let message = format!("Post already exists with title: {}", post.title);
            warn!(
                "event=post_save module=blog_service status=rejected reason=duplicate_slug post_id={}",
                post.id.unwrap_or_default()
            );
            return Err(BlogServiceError::validation(InvalidEntity::Post(post), message));
        }

        let saved = self.repo.save_post(&post)?;
        info!(
            "event=post_save module=blog_service status=ok post_id={} slug_checked={}",
            saved.id.unwrap_or_default(),
            slug_changed
        );
        Ok(saved)
    }

    /// Checks that `parent_id` exists and does not close a loop through
    /// `category` itself.
    fn parent_violation(&self, category: &Category) -> BlogResult<Option<String>> {
        let Some(parent_id) = category.parent_id else {
            return Ok(None);
        };
        if category.id == Some(parent_id) {
            return Ok(Some(format!("Category cannot be its own parent: {parent_id}")));
        }
        if self.repo.get_category(parent_id)?.is_none() {
            return Ok(Some(format!("Parent category not found: {parent_id}")));
        }

        let Some(id) = category.id else {
            return Ok(None);
        };
        let mut visited = HashSet::new();
        let mut cursor = Some(parent_id);
        while let Some(current) = cursor {
            if current == id || !visited.insert(current) {
                return Ok(Some(format!(
                    "Category {id} cannot be moved under its own descendant {parent_id}"
                )));
            }
            cursor = self
                .repo
                .get_category(current)?
                .and_then(|ancestor| ancestor.parent_id);
        }
        Ok(None)
    }

    fn direct_children(
        &self,
        parent_id: CategoryId,
        only_active: bool,
    ) -> BlogResult<Vec<Category>> {
        let query = CategoryQuery::children_of(parent_id).only_active(only_active);
        Ok(self.repo.list_categories(&query)?)
    }

    fn set_category_status(&self, id: CategoryId, status: Status) -> BlogResult<bool> {
        let Some(mut category) = self.repo.get_category(id)? else {
            return Ok(false);
        };
        category.status = status;
        self.repo.save_category(&category)?;
        info!(
            "event=category_status module=blog_service status=ok category_id={} value={}",
            id,
            status.to_db()
        );
        Ok(true)
    }

    fn set_post_status(&self, id: PostId, status: Status) -> BlogResult<bool> {
        let Some(mut post) = self.repo.get_post(id)? else {
            return Ok(false);
        };
        post.status = status;
        self.repo.save_post(&post)?;
        info!(
            "event=post_status module=blog_service status=ok post_id={} value={}",
            id,
            status.to_db()
        );
        Ok(true)
    }

    fn unlink_tags(&self, post_id: PostId, tags: &[Tag]) -> BlogResult<usize> {
        let mut removed = 0;
        for tag_id in tags.iter().filter_map(|tag| tag.id) {
            if let Some(association) = self.repo.get_association(post_id, tag_id)? {
                if self.repo.delete_association(&association)? {
                    removed += 1;
                }
            }
        }
        debug!(
            "event=post_tags_remove module=blog_service status=ok post_id={} removed={}",
            post_id, removed
        );
        Ok(removed)
    }
}

fn rejected_category(category: Category, message: String) -> BlogServiceError {
    warn!(
        "event=category_save module=blog_service status=rejected category_id={} reason={}",
        category.id.unwrap_or_default(),
        message
    );
    BlogServiceError::validation(InvalidEntity::Category(category), message)
}
