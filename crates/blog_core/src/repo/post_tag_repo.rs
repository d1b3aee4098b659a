//! Post/tag association persistence.
//!
//! # Invariants
//! - `(post_id, tag_id)` is the whole identity of a row; inserting the same
//!   pair twice is rejected by the composite primary key.

use super::{RepoResult, SqliteBlogRepository};
use crate::model::post::PostId;
use crate::model::post_tag::PostTagAssociation;
use crate::model::tag::TagId;
use rusqlite::{params, OptionalExtension, Row};

/// Repository interface for `post_tags` edges.
pub trait PostTagRepository {
    fn create_association(&self, association: &PostTagAssociation) -> RepoResult<()>;
    fn get_association(
        &self,
        post_id: PostId,
        tag_id: TagId,
    ) -> RepoResult<Option<PostTagAssociation>>;
    /// Lists edges for one post, ordered by `tag_id`.
    fn list_associations_for_post(&self, post_id: PostId) -> RepoResult<Vec<PostTagAssociation>>;
    /// Lists edges for one tag, ordered by `post_id`.
    fn list_associations_for_tag(&self, tag_id: TagId) -> RepoResult<Vec<PostTagAssociation>>;
    /// Deletes one edge. Returns `false` when it did not exist.
    fn delete_association(&self, association: &PostTagAssociation) -> RepoResult<bool>;
}

impl PostTagRepository for SqliteBlogRepository<'_> {
    fn create_association(&self, association: &PostTagAssociation) -> RepoResult<()> {
        self.conn().execute(
            "INSERT INTO post_tags (post_id, tag_id) VALUES (?1, ?2);",
            params![association.post_id, association.tag_id],
        )?;
        Ok(())
    }

    fn get_association(
        &self,
        post_id: PostId,
        tag_id: TagId,
    ) -> RepoResult<Option<PostTagAssociation>> {
        let association = self
            .conn()
            .query_row(
                "SELECT post_id, tag_id
                 FROM post_tags
                 WHERE post_id = ?1 AND tag_id = ?2;",
                params![post_id, tag_id],
                parse_association_row,
            )
            .optional()?;
        Ok(association)
    }

    fn list_associations_for_post(&self, post_id: PostId) -> RepoResult<Vec<PostTagAssociation>> {
        let mut stmt = self.conn().prepare(
            "SELECT post_id, tag_id
             FROM post_tags
             WHERE post_id = ?1
             ORDER BY tag_id ASC;",
        )?;
        let associations = stmt
            .query_map([post_id], parse_association_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(associations)
    }

    fn list_associations_for_tag(&self, tag_id: TagId) -> RepoResult<Vec<PostTagAssociation>> {
        let mut stmt = self.conn().prepare(
            "SELECT post_id, tag_id
             FROM post_tags
             WHERE tag_id = ?1
             ORDER BY post_id ASC;",
        )?;
        let associations = stmt
            .query_map([tag_id], parse_association_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(associations)
    }

    fn delete_association(&self, association: &PostTagAssociation) -> RepoResult<bool> {
        let changed = self.conn().execute(
            "DELETE FROM post_tags WHERE post_id = ?1 AND tag_id = ?2;",
            params![association.post_id, association.tag_id],
        )?;
        Ok(changed > 0)
    }
}

fn parse_association_row(row: &Row<'_>) -> rusqlite::Result<PostTagAssociation> {
    Ok(PostTagAssociation {
        post_id: row.get("post_id")?,
        tag_id: row.get("tag_id")?,
    })
}
