//! Target storage engine descriptor
//!
//! The core never emits SQL; it only asks the platform a few capability
//! questions while resolving the schema.

use serde::{Deserialize, Serialize};

/// How the platform natively generates primary key values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NativeIdStrategy {
    /// Auto-increment / identity column
    Identity,

    /// Named sequence
    Sequence,
}

/// Target platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Platform-neutral defaults
    Generic,

    /// MySQL / MariaDB
    Mysql,

    /// PostgreSQL
    Postgresql,

    /// SQLite
    Sqlite,

    /// Oracle
    Oracle,

    /// Microsoft SQL Server
    Mssql,
}

impl Default for Platform {
    fn default() -> Self {
        Self::Generic
    }
}

impl Platform {
    /// Whether table names may be qualified with a schema
    pub fn supports_schemas(&self) -> bool {
        matches!(self, Self::Postgresql | Self::Mssql | Self::Oracle)
    }

    /// Whether every column set used on either side of a foreign key must be indexed
    ///
    /// MySQL refuses to create a foreign key unless both the referencing and
    /// the referenced columns are covered by an index.
    pub fn requires_synthesized_indices(&self) -> bool {
        matches!(self, Self::Mysql)
    }

    /// Maximum identifier length, used to truncate generated constraint names
    pub fn max_identifier_length(&self) -> usize {
        match self {
            Self::Generic | Self::Mysql => 64,
            Self::Postgresql => 63,
            Self::Sqlite => 1024,
            Self::Oracle => 30,
            Self::Mssql => 128,
        }
    }

    /// Native primary key generation strategy
    pub fn native_id_strategy(&self) -> NativeIdStrategy {
        match self {
            Self::Postgresql | Self::Oracle => NativeIdStrategy::Sequence,
            _ => NativeIdStrategy::Identity,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generic => write!(f, "generic"),
            Self::Mysql => write!(f, "mysql"),
            Self::Postgresql => write!(f, "postgresql"),
            Self::Sqlite => write!(f, "sqlite"),
            Self::Oracle => write!(f, "oracle"),
            Self::Mssql => write!(f, "mssql"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_mysql_requires_synthesized_indices() {
        assert!(Platform::Mysql.requires_synthesized_indices());
        assert!(!Platform::Postgresql.requires_synthesized_indices());
        assert!(!Platform::Generic.requires_synthesized_indices());
    }

    #[test]
    fn identifier_limits_and_id_strategy() {
        assert_eq!(Platform::Oracle.max_identifier_length(), 30);
        assert_eq!(Platform::Mysql.max_identifier_length(), 64);
        assert_eq!(Platform::Postgresql.native_id_strategy(), NativeIdStrategy::Sequence);
        assert_eq!(Platform::Mysql.native_id_strategy(), NativeIdStrategy::Identity);
    }

    #[test]
    fn schema_support() {
        assert!(Platform::Postgresql.supports_schemas());
        assert!(!Platform::Sqlite.supports_schemas());
    }

    #[test]
    fn platform_serde_names() {
        let json = serde_json::to_string(&Platform::Postgresql).unwrap();
        assert_eq!(json, "\"postgresql\"");
        let parsed: Platform = serde_json::from_str("\"mysql\"").unwrap();
        assert_eq!(parsed, Platform::Mysql);
    }
}
