//! Post/tag association edge.

use super::post::PostId;
use super::tag::TagId;
use serde::{Deserialize, Serialize};

/// One row of `post_tags`. Keyed by the `(post_id, tag_id)` pair; it has no
/// identity or lifecycle beyond the edge it represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostTagAssociation {
    pub post_id: PostId,
    pub tag_id: TagId,
}

impl PostTagAssociation {
    pub fn new(post_id: PostId, tag_id: TagId) -> Self {
        Self { post_id, tag_id }
    }
}
