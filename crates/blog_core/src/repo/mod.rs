//! Repository contracts and the SQLite persistence implementation.
//!
//! # Responsibility
//! - Define one data-access contract per blog entity.
//! - Keep SQL details out of the service layer.
//!
//! # Invariants
//! - Write paths call the record's `validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Updating a missing row is `RepoError::NotFound`, never a silent insert.

pub mod category_repo;
pub mod post_repo;
pub mod post_tag_repo;
pub mod tag_repo;

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::metadata::Metadata;
use crate::model::status::Status;
use crate::model::ModelValidationError;
use rusqlite::types::Value;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use category_repo::{CategoryQuery, CategoryRepository, ParentFilter};
pub use post_repo::{PostQuery, PostRepository};
pub use post_tag_repo::PostTagRepository;
pub use tag_repo::{TagQuery, TagRepository};

const REQUIRED_TABLES: [&str; 4] = ["categories", "posts", "tags", "post_tags"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for blog persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Record failed validation before persistence.
    Validation(ModelValidationError),
    /// Underlying SQLite/bootstrap failure.
    Db(DbError),
    /// Update target does not exist.
    NotFound { entity: &'static str, id: i64 },
    /// Persisted data cannot be converted into a valid record.
    InvalidData(String),
    /// Connection schema is not at the version this binary expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted blog data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "blog repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "blog repository requires table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::InvalidData(_) => None,
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<ModelValidationError> for RepoError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Storage(value))
    }
}

/// Full storage capability set required by `BlogService`.
pub trait BlogRepository:
    CategoryRepository + PostRepository + TagRepository + PostTagRepository
{
}

impl<T> BlogRepository for T where
    T: CategoryRepository + PostRepository + TagRepository + PostTagRepository
{
}

/// SQLite-backed blog repository over a borrowed, migrated connection.
pub struct SqliteBlogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBlogRepository<'conn> {
    /// Creates a repository after checking the connection is migrated.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_blog_connection_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn conn(&self) -> &'conn Connection {
        self.conn
    }
}

fn ensure_blog_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in REQUIRED_TABLES {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Appends ` AND <column> IN (?, ...)` and its bind values.
pub(crate) fn push_in_filter(
    sql: &mut String,
    bind_values: &mut Vec<Value>,
    column: &str,
    values: impl IntoIterator<Item = Value>,
) {
    let start = bind_values.len();
    bind_values.extend(values);
    let placeholders = vec!["?"; bind_values.len() - start].join(", ");
    sql.push_str(&format!(" AND {column} IN ({placeholders})"));
}

/// Appends ` LIMIT ?` when a positive cap is requested. `Some(0)` means no cap.
pub(crate) fn push_limit(sql: &mut String, bind_values: &mut Vec<Value>, limit: Option<u32>) {
    if let Some(limit) = limit.filter(|value| *value > 0) {
        sql.push_str(" LIMIT ?");
        bind_values.push(Value::Integer(i64::from(limit)));
    }
}

pub(crate) fn encode_metadata(
    metadata: &Metadata,
    table: &str,
) -> RepoResult<Option<String>> {
    metadata
        .to_column()
        .map_err(|err| RepoError::InvalidData(format!("cannot encode {table}.metadata: {err}")))
}

pub(crate) fn decode_metadata(
    value: Option<String>,
    table: &str,
) -> RepoResult<Metadata> {
    Metadata::from_column(value.as_deref())
        .map_err(|err| RepoError::InvalidData(format!("invalid JSON in {table}.metadata: {err}")))
}

pub(crate) fn decode_status(value: i64, table: &str) -> RepoResult<Status> {
    Status::from_db(value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status value `{value}` in {table}.status"))
    })
}
