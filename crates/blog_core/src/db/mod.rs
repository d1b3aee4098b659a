//! Blog database handle: connection bootstrap and schema versioning.
//!
//! Connections come from [`open_db`] or [`open_db_in_memory`], both of which
//! leave the schema at [`migrations::latest_version`]. Schema tooling that
//! reports or applies versions itself uses [`open_db_unmigrated`].
//!
//! # Invariants
//! - The blog schema version lives in `PRAGMA user_version`.
//! - A file stamped by a newer build is refused, never downgraded.

use std::{error, fmt};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, open_db_unmigrated};
pub use rusqlite::Connection;

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or migrating the blog database.
#[derive(Debug)]
pub enum DbError {
    /// SQLite could not open the file or rejected a statement.
    Storage(rusqlite::Error),
    /// The file carries blog schema `found`; this build stops at `supported`.
    SchemaTooNew { found: u32, supported: u32 },
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "blog storage error: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "database uses blog schema v{found}, this build supports up to v{supported}"
            ),
        }
    }
}

impl error::Error for DbError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        if let Self::Storage(err) = self {
            Some(err)
        } else {
            None
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err)
    }
}
