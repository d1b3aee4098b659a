//! Category persistence contract and SQLite implementation.
//!
//! # Invariants
//! - Listing order is `id ASC`; callers must not rely on anything richer.
//! - `categories.slug` uniqueness is enforced by the schema as the final
//!   arbiter, even when the service pre-check passed.

use super::{
    decode_metadata, decode_status, encode_metadata, push_in_filter, push_limit, RepoError,
    RepoResult, SqliteBlogRepository,
};
use crate::model::category::{Category, CategoryId};
use crate::model::status::Status;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};

const CATEGORY_SELECT_SQL: &str = "SELECT
    id,
    name,
    slug,
    parent_id,
    status,
    created_at,
    updated_at,
    metadata
FROM categories";

/// Parent-pointer filter for category queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentFilter {
    /// `parent_id IS NULL`.
    Root,
    /// Direct children of the given category.
    ChildrenOf(CategoryId),
}

/// Filter options for category lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryQuery {
    /// Inclusion filter on `id`. An empty set matches nothing.
    pub ids: Option<Vec<CategoryId>>,
    pub slug: Option<String>,
    pub parent: Option<ParentFilter>,
    pub status: Option<Status>,
    /// Row cap. `None` or `Some(0)` means unbounded.
    pub limit: Option<u32>,
}

impl CategoryQuery {
    pub fn by_slug(slug: impl Into<String>) -> Self {
        Self {
            slug: Some(slug.into()),
            ..Self::default()
        }
    }

    pub fn children_of(parent_id: CategoryId) -> Self {
        Self {
            parent: Some(ParentFilter::ChildrenOf(parent_id)),
            ..Self::default()
        }
    }

    /// Restricts results to published rows when `only_active` is set.
    pub fn only_active(mut self, only_active: bool) -> Self {
        if only_active {
            self.status = Some(Status::Published);
        }
        self
    }
}

/// Repository interface for categories.
pub trait CategoryRepository {
    /// Loads one category by id.
    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>>;
    /// Returns the first category matching `query`.
    fn find_category(&self, query: &CategoryQuery) -> RepoResult<Option<Category>>;
    /// Lists categories matching `query`.
    fn list_categories(&self, query: &CategoryQuery) -> RepoResult<Vec<Category>>;
    /// Inserts when `id` is unset, updates otherwise. Returns the stored row.
    fn save_category(&self, category: &Category) -> RepoResult<Category>;
    /// Deletes one category. Returns `false` when no row matched.
    fn delete_category(&self, id: CategoryId) -> RepoResult<bool>;
}

impl CategoryRepository for SqliteBlogRepository<'_> {
    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{CATEGORY_SELECT_SQL} WHERE id = ?1;"))?;
        let row = stmt
            .query_row([id], |row| Ok(parse_category_row(row)))
            .optional()?;
        row.transpose()
    }

    fn find_category(&self, query: &CategoryQuery) -> RepoResult<Option<Category>> {
        let first_only = CategoryQuery {
            limit: Some(1),
            ..query.clone()
        };
        Ok(self.list_categories(&first_only)?.into_iter().next())
    }

    fn list_categories(&self, query: &CategoryQuery) -> RepoResult<Vec<Category>> {
        if matches!(&query.ids, Some(ids) if ids.is_empty()) {
            return Ok(Vec::new());
        }

        let mut sql = format!("{CATEGORY_SELECT_SQL} WHERE 1 = 1");
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

        match query.parent {
            Some(ParentFilter::Root) => sql.push_str(" AND parent_id IS NULL"),
            Some(ParentFilter::ChildrenOf(parent_id)) => {
                sql.push_str(" AND parent_id = ?");
                bind_values.push(Value::Integer(parent_id));
            }
            None => {}
        }

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Integer(status.to_db()));
        }

        sql.push_str(" ORDER BY id ASC");
        push_limit(&mut sql, &mut bind_values, query.limit);

        let mut stmt = self.conn().prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(parse_category_row(row)?);
        }

        Ok(categories)
    }

    fn save_category(&self, category: &Category) -> RepoResult<Category> {
        category.validate()?;
        let metadata = encode_metadata(&category.metadata, "categories")?;

        let id = match category.id {
            None => {
                self.conn().execute(
                    "INSERT INTO categories (
                        name,
                        slug,
                        parent_id,
                        status,
                        metadata
                    ) VALUES (?1, ?2, ?3, ?4, ?5);",
                    params![
                        category.name.as_str(),
                        category.slug.as_str(),
                        category.parent_id,
                        category.status.to_db(),
                        metadata,
                    ],
                )?;
                self.conn().last_insert_rowid()
            }
            Some(id) => {
                let changed = self.conn().execute(
                    "UPDATE categories
                     SET
                        name = ?1,
                        slug = ?2,
                        parent_id = ?3,
                        status = ?4,
                        metadata = ?5,
                        updated_at = (strftime('%s', 'now') * 1000)
                     WHERE id = ?6;",
                    params![
                        category.name.as_str(),
                        category.slug.as_str(),
                        category.parent_id,
                        category.status.to_db(),
                        metadata,
                        id,
                    ],
                )?;
                if changed == 0 {
                    return Err(RepoError::NotFound {
                        entity: "category",
                        id,
                    });
                }
                id
            }
        };

        self.get_category(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("category {id} missing after save"))
        })
    }

    fn delete_category(&self, id: CategoryId) -> RepoResult<bool> {
        let changed = self
            .conn()
            .execute("DELETE FROM categories WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }
}

fn parse_category_row(row: &Row<'_>) -> RepoResult<Category> {
    Ok(Category {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        slug: row.get("slug")?,
        parent_id: row.get("parent_id")?,
        status: decode_status(row.get("status")?, "categories")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        metadata: decode_metadata(row.get("metadata")?, "categories")?,
    })
}
