//! Post persistence contract and SQLite implementation.
//!
//! # Invariants
//! - Every listing is ordered by `created_at DESC, id DESC`, so the most
//!   recently created post comes first even within one millisecond.

use super::{
    decode_metadata, decode_status, encode_metadata, push_in_filter, push_limit, RepoError,
    RepoResult, SqliteBlogRepository,
};
use crate::model::category::CategoryId;
use crate::model::post::{Post, PostId};
use crate::model::status::Status;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};

const POST_SELECT_SQL: &str = "SELECT
    id,
    category_id,
    title,
    slug,
    body,
    author_id,
    status,
    created_at,
    updated_at,
    metadata
FROM posts";

/// Filter options for post lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    /// Inclusion filter on `id`. An empty set matches nothing.
    pub ids: Option<Vec<PostId>>,
    pub slug: Option<String>,
    /// Inclusion filter on `category_id`. An empty set matches nothing.
    pub category_ids: Option<Vec<CategoryId>>,
    pub status: Option<Status>,
    /// Row cap. `None` or `Some(0)` means unbounded.
    pub limit: Option<u32>,
}

impl PostQuery {
    pub fn by_slug(slug: impl Into<String>) -> Self {
        Self {
            slug: Some(slug.into()),
            ..Self::default()
        }
    }

    pub fn published() -> Self {
        Self {
            status: Some(Status::Published),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: Option<u32>) -> Self {
        self.limit = limit;
        self
    }
}

/// Repository interface for posts.
pub trait PostRepository {
    /// Loads one post by id.
    fn get_post(&self, id: PostId) -> RepoResult<Option<Post>>;
    /// Returns the first post matching `query`.
    fn find_post(&self, query: &PostQuery) -> RepoResult<Option<Post>>;
    /// Lists posts matching `query`, newest first.
    fn list_posts(&self, query: &PostQuery) -> RepoResult<Vec<Post>>;
    /// Inserts when `id` is unset, updates otherwise. Returns the stored row.
    fn save_post(&self, post: &Post) -> RepoResult<Post>;
    /// Deletes one post row only. Returns `false` when no row matched.
    fn delete_post(&self, id: PostId) -> RepoResult<bool>;
}

impl PostRepository for SqliteBlogRepository<'_> {
    fn get_post(&self, id: PostId) -> RepoResult<Option<Post>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{POST_SELECT_SQL} WHERE id = ?1;"))?;
        let row = stmt
            .query_row([id], |row| Ok(parse_post_row(row)))
            .optional()?;
        row.transpose()
    }

    fn find_post(&self, query: &PostQuery) -> RepoResult<Option<Post>> {
        let first_only = PostQuery {
            limit: Some(1),
            ..query.clone()
        };
        Ok(self.list_posts(&first_only)?.into_iter().next())
    }

    fn list_posts(&self, query: &PostQuery) -> RepoResult<Vec<Post>> {
        let empty_set = |set: &Option<Vec<i64>>| matches!(set, Some(values) if values.is_empty());
        if empty_set(&query.ids) || empty_set(&query.category_ids) {
            return Ok(Vec::new());
        }

        let mut sql = format!("{POST_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(ids) = query.ids.as_ref() {
            push_in_filter(
                &mut sql,
                &mut bind_values,
                "id",
                ids.iter().map(|id| Value::Integer(*id)),
            );
        }

        if let Some(slug) = query.slug.as_ref() {
            sql.push_str(" AND slug = ?");
            bind_values.push(Value::Text(slug.clone()));
        }

        if let Some(category_ids) = query.category_ids.as_ref() {
            push_in_filter(
                &mut sql,
                &mut bind_values,
                "category_id",
                category_ids.iter().map(|id| Value::Integer(*id)),
            );
        }

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Integer(status.to_db()));
        }

        sql.push_str(" ORDER BY created_at DESC, id DESC");
        push_limit(&mut sql, &mut bind_values, query.limit);

        let mut stmt = self.conn().prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut posts = Vec::new();
        while let Some(row) = rows.next()? {
            posts.push(parse_post_row(row)?);
        }

        Ok(posts)
    }

    fn save_post(&self, post: &Post) -> RepoResult<Post> {
        post.validate()?;
        let metadata = encode_metadata(&post.metadata, "posts")?;

        let id = match post.id {
            None => {
                self.conn().execute(
                    "INSERT INTO posts (
                        category_id,
                        title,
                        slug,
                        body,
                        author_id,
                        status,
                        metadata
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                    params![
                        post.category_id,
                        post.title.as_str(),
                        post.slug.as_str(),
                        post.body.as_str(),
                        post.author_id,
                        post.status.to_db(),
                        metadata,
                    ],
                )?;
                self.conn().last_insert_rowid()
            }
            Some(id) => {
                let changed = self.conn().execute(
                    "UPDATE posts
                     SET
                        category_id = ?1,
                        title = ?2,
                        slug = ?3,
                        body = ?4,
                        author_id = ?5,
                        status = ?6,
                        metadata = ?7,
                        updated_at = (strftime('%s', 'now') * 1000)
                     WHERE id = ?8;",
                    params![
                        post.category_id,
                        post.title.as_str(),
                        post.slug.as_str(),
                        post.body.as_str(),
                        post.author_id,
                        post.status.to_db(),
                        metadata,
                        id,
                    ],
                )?;
                if changed == 0 {
                    return Err(RepoError::NotFound { entity: "post", id });
                }
                id
            }
        };

        self.get_post(id)?
            .ok_or_else(|| RepoError::InvalidData(format!("post {id} missing after save")))
    }

    fn delete_post(&self, id: PostId) -> RepoResult<bool> {
        let changed = self
            .conn()
            .execute("DELETE FROM posts WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }
}

fn parse_post_row(row: &Row<'_>) -> RepoResult<Post> {
    Ok(Post {
        id: Some(row.get("id")?),
        category_id: row.get("category_id")?,
        title: row.get("title")?,
        slug: row.get("slug")?,
        body: row.get("body")?,
        author_id: row.get("author_id")?,
        status: decode_status(row.get("status")?, "posts")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        metadata: decode_metadata(row.get("metadata")?, "posts")?,
    })
}
