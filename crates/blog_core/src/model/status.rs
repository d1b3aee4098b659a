//! Publication status shared by categories and posts.

use serde::{Deserialize, Serialize};

/// Lifecycle flag stored as a small integer column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Visible to readers. Stored as `1`.
    #[default]
    Published,
    /// Hidden but kept. Stored as `2`.
    Disabled,
}

impl Status {
    /// Returns the integer persisted in `status` columns.
    pub fn to_db(self) -> i64 {
        match self {
            Self::Published => 1,
            Self::Disabled => 2,
        }
    }

    /// Parses a persisted `status` value.
    pub fn from_db(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::Published),
            2 => Some(Self::Disabled),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Status;

    #[test]
    fn db_codes_match_schema_default() {
        assert_eq!(Status::default().to_db(), 1);
        assert_eq!(Status::Disabled.to_db(), 2);
    }

    #[test]
    fn from_db_rejects_unknown_codes() {
        assert_eq!(Status::from_db(1), Some(Status::Published));
        assert_eq!(Status::from_db(2), Some(Status::Disabled));
        assert_eq!(Status::from_db(0), None);
        assert_eq!(Status::from_db(3), None);
    }
}
