//! Tag persistence contract and SQLite implementation.

use super::{
    decode_metadata, encode_metadata, push_in_filter, push_limit, RepoError, RepoResult,
    SqliteBlogRepository,
};
use crate::model::tag::{Tag, TagId};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};

const TAG_SELECT_SQL: &str = "SELECT id, name, metadata FROM tags";

/// Filter options for tag lookups. Results are ordered by `name ASC`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagQuery {
    /// Inclusion filter on `id`. An empty set matches nothing.
    pub ids: Option<Vec<TagId>>,
    /// Exact inclusion filter on stored (already normalized) names.
    pub names: Option<Vec<String>>,
    pub limit: Option<u32>,
}

impl TagQuery {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            names: Some(vec![name.into()]),
            ..Self::default()
        }
    }

    pub fn by_names(names: Vec<String>) -> Self {
        Self {
            names: Some(names),
            ..Self::default()
        }
    }

    pub fn by_ids(ids: Vec<TagId>) -> Self {
        Self {
            ids: Some(ids),
            ..Self::default()
        }
    }
}

/// Repository interface for tags.
pub trait TagRepository {
    fn get_tag(&self, id: TagId) -> RepoResult<Option<Tag>>;
    /// Returns the first tag matching `query`.
    fn find_tag(&self, query: &TagQuery) -> RepoResult<Option<Tag>>;
    fn list_tags(&self, query: &TagQuery) -> RepoResult<Vec<Tag>>;
    /// Inserts when `id` is unset, updates otherwise. Returns the stored row.
    fn save_tag(&self, tag: &Tag) -> RepoResult<Tag>;
}

impl TagRepository for SqliteBlogRepository<'_> {
    fn get_tag(&self, id: TagId) -> RepoResult<Option<Tag>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{TAG_SELECT_SQL} WHERE id = ?1;"))?;
        let row = stmt
            .query_row([id], |row| Ok(parse_tag_row(row)))
            .optional()?;
        row.transpose()
    }

    fn find_tag(&self, query: &TagQuery) -> RepoResult<Option<Tag>> {
        let first_only = TagQuery {
            limit: Some(1),
            ..query.clone()
        };
        Ok(self.list_tags(&first_only)?.into_iter().next())
    }

    fn list_tags(&self, query: &TagQuery) -> RepoResult<Vec<Tag>> {
        if matches!(&query.ids, Some(ids) if ids.is_empty())
            || matches!(&query.names, Some(names) if names.is_empty())
        {
            return Ok(Vec::new());
        }

        let mut sql = format!("{TAG_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(ids) = query.ids.as_ref() {
            push_in_filter(
                &mut sql,
                &mut bind_values,
                "id",
                ids.iter().map(|id| Value::Integer(*id)),
            );
        }

        if let Some(names) = query.names.as_ref() {
            push_in_filter(
                &mut sql,
                &mut bind_values,
                "name",
                names.iter().map(|name| Value::Text(name.clone())),
            );
        }

        sql.push_str(" ORDER BY name ASC, id ASC");
        push_limit(&mut sql, &mut bind_values, query.limit);

        let mut stmt = self.conn().prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(parse_tag_row(row)?);
        }

        Ok(tags)
    }

    fn save_tag(&self, tag: &Tag) -> RepoResult<Tag> {
        tag.validate()?;
        let metadata = encode_metadata(&tag.metadata, "tags")?;

        let id = match tag.id {
            None => {
                self.conn().execute(
                    "INSERT INTO tags (name, metadata) VALUES (?1, ?2);",
                    params![tag.name.as_str(), metadata],
                )?;
                self.conn().last_insert_rowid()
            }
            Some(id) => {
                let changed = self.conn().execute(
                    "UPDATE tags SET name = ?1, metadata = ?2 WHERE id = ?3;",
                    params![tag.name.as_str(), metadata, id],
                )?;
                if changed == 0 {
                    return Err(RepoError::NotFound { entity: "tag", id });
                }
                id
            }
        };

        self.get_tag(id)?
            .ok_or_else(|| RepoError::InvalidData(format!("tag {id} missing after save")))
    }
}

fn parse_tag_row(row: &Row<'_>) -> RepoResult<Tag> {
    Ok(Tag {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        metadata: decode_metadata(row.get("metadata")?, "tags")?,
    })
}
