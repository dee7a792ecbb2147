//! SQL dialect capabilities.
//!
//! The relationship store runs against more than one SQL engine, and two
//! operations depend on engine-specific syntax: the conflict-free insert used
//! to initialize records, and the raw history count. A [`SqlDialect`] is chosen
//! once when a repository is built and the repository consults it instead of
//! inspecting the connection.
//!
//! An [`SqlDialect::Unrecognized`] store still answers every read, but record
//! initialization is skipped and the affinity history count reports `0`.

use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "database")]
use super::DbPool;

/// Capability strategy for a SQL engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlDialect {
    /// PostgreSQL: `INSERT ... ON CONFLICT DO NOTHING`, `$n` placeholders.
    Postgres,
    /// SQLite: `INSERT ... ON CONFLICT DO NOTHING`, `?` placeholders.
    Sqlite,
    /// Any other engine. Only portable queries are issued.
    Unrecognized,
}

impl SqlDialect {
    /// Picks the dialect matching a connection pool.
    #[cfg(feature = "database")]
    pub fn for_pool(pool: &DbPool) -> Self {
        match pool {
            DbPool::Sqlite(_) => SqlDialect::Sqlite,
            DbPool::Postgres(_) => SqlDialect::Postgres,
        }
    }

    /// Parses a configured dialect name. Unknown names are [`SqlDialect::Unrecognized`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => SqlDialect::Postgres,
            "sqlite" | "sqlite3" => SqlDialect::Sqlite,
            _ => SqlDialect::Unrecognized,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SqlDialect::Postgres => "postgres",
            SqlDialect::Sqlite => "sqlite",
            SqlDialect::Unrecognized => "unrecognized",
        }
    }

    /// Statement inserting a default record for the subject key bound as the
    /// only parameter, leaving an existing record untouched.
    ///
    /// The unique constraint on `waifu_info.waifu_id` makes the statement safe
    /// under concurrent callers. Only a conflict on that key is ignored; any
    /// other constraint failure is returned to the caller.
    pub fn insert_if_absent_sql(&self) -> Option<&'static str> {
        match self {
            SqlDialect::Postgres => Some(
                r#"
                INSERT INTO waifu_info (waifu_id, affinity_id, claimer_id, price)
                VALUES ($1, NULL, NULL, 1)
                ON CONFLICT (waifu_id) DO NOTHING
                "#,
            ),
            SqlDialect::Sqlite => Some(
                r#"
                INSERT INTO waifu_info (waifu_id, affinity_id, claimer_id, price)
                VALUES (?, NULL, NULL, 100)
                ON CONFLICT (waifu_id) DO NOTHING
                "#,
            ),
            SqlDialect::Unrecognized => None,
        }
    }

    /// Whether history counts can be computed on this engine.
    pub fn supports_history_queries(&self) -> bool {
        !matches!(self, SqlDialect::Unrecognized)
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, SqlDialect::Unrecognized)
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(SqlDialect::from_name("postgres"), SqlDialect::Postgres);
        assert_eq!(SqlDialect::from_name(" PostgreSQL "), SqlDialect::Postgres);
        assert_eq!(SqlDialect::from_name("pg"), SqlDialect::Postgres);
        assert_eq!(SqlDialect::from_name("sqlite"), SqlDialect::Sqlite);
        assert_eq!(SqlDialect::from_name("mssql"), SqlDialect::Unrecognized);
        assert_eq!(SqlDialect::from_name(""), SqlDialect::Unrecognized);
    }

    #[test]
    fn test_insert_if_absent_sql() {
        let pg = SqlDialect::Postgres.insert_if_absent_sql().unwrap();
        assert!(pg.contains("ON CONFLICT (waifu_id) DO NOTHING"));
        assert!(pg.contains("$1"));

        let sqlite = SqlDialect::Sqlite.insert_if_absent_sql().unwrap();
        assert!(sqlite.contains("ON CONFLICT (waifu_id) DO NOTHING"));
        assert!(!sqlite.contains("OR IGNORE"));
        // SQLite prices are stored in hundredths.
        assert!(sqlite.contains("NULL, NULL, 100)"));

        assert!(SqlDialect::Unrecognized.insert_if_absent_sql().is_none());
    }

    #[test]
    fn test_history_support() {
        assert!(SqlDialect::Postgres.supports_history_queries());
        assert!(SqlDialect::Sqlite.supports_history_queries());
        assert!(!SqlDialect::Unrecognized.supports_history_queries());
        assert!(!SqlDialect::Unrecognized.is_recognized());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&SqlDialect::Unrecognized).unwrap();
        assert_eq!(json, "\"unrecognized\"");
        let parsed: SqlDialect = serde_json::from_str("\"postgres\"").unwrap();
        assert_eq!(parsed, SqlDialect::Postgres);
    }
}
