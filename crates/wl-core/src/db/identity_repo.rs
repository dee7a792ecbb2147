//! Identity resolution against the profile store's user table.
//!
//! The user table is owned by the profile store; everything here is
//! read-only. Lookups by external id answer `None` for unknown users rather
//! than failing.

use super::{DbError, DbPool};
use crate::identity::{stored_user_id, Identity};
use async_trait::async_trait;

/// Resolves external identities to surrogate keys and display names.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Returns the surrogate key for an external id.
    async fn resolve(&self, user_id: u64) -> Result<Option<i64>, DbError>;

    /// Returns the full identity for an external id.
    async fn get(&self, user_id: u64) -> Result<Option<Identity>, DbError>;

    /// Returns the identity stored under a surrogate key.
    async fn get_by_id(&self, id: i64) -> Result<Option<Identity>, DbError>;

    /// Returns the `name#discriminator` display name for a surrogate key.
    async fn display_name(&self, id: i64) -> Result<Option<String>, DbError> {
        Ok(self.get_by_id(id).await?.map(|identity| identity.full_name()))
    }
}

/// SQLite implementation of IdentityResolver.
#[cfg(feature = "database")]
#[derive(Clone)]
pub struct SqliteIdentityResolver {
    pool: sqlx::SqlitePool,
}

#[cfg(feature = "database")]
impl SqliteIdentityResolver {
    /// Creates a resolver reading the SQLite user table.
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[cfg(feature = "database")]
#[async_trait]
impl IdentityResolver for SqliteIdentityResolver {
    async fn resolve(&self, user_id: u64) -> Result<Option<i64>, DbError> {
        let Some(stored) = stored_user_id(user_id) else {
            return Ok(None);
        };

        let id: Option<i64> = sqlx::query_scalar("SELECT id FROM discord_user WHERE user_id = ?")
            .bind(stored)
            .fetch_optional(&self.pool)
            .await?;

        Ok(id)
    }

    async fn get(&self, user_id: u64) -> Result<Option<Identity>, DbError> {
        let Some(stored) = stored_user_id(user_id) else {
            return Ok(None);
        };

        let row: Option<IdentityRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, username, discriminator
            FROM discord_user
            WHERE user_id = ?
            "#,
        )
        .bind(stored)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Identity::try_from).transpose()
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Identity>, DbError> {
        let row: Option<IdentityRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, username, discriminator
            FROM discord_user
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Identity::try_from).transpose()
    }
}

/// PostgreSQL implementation of IdentityResolver.
#[cfg(feature = "database")]
#[derive(Clone)]
pub struct PgIdentityResolver {
    pool: sqlx::PgPool,
}

#[cfg(feature = "database")]
impl PgIdentityResolver {
    /// Creates a resolver reading the PostgreSQL user table.
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[cfg(feature = "database")]
#[async_trait]
impl IdentityResolver for PgIdentityResolver {
    async fn resolve(&self, user_id: u64) -> Result<Option<i64>, DbError> {
        let Some(stored) = stored_user_id(user_id) else {
            return Ok(None);
        };

        let id: Option<i64> = sqlx::query_scalar("SELECT id FROM discord_user WHERE user_id = $1")
            .bind(stored)
            .fetch_optional(&self.pool)
            .await?;

        Ok(id)
    }

    async fn get(&self, user_id: u64) -> Result<Option<Identity>, DbError> {
        let Some(stored) = stored_user_id(user_id) else {
            return Ok(None);
        };

        let row: Option<IdentityRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, username, discriminator
            FROM discord_user
            WHERE user_id = $1
            "#,
        )
        .bind(stored)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Identity::try_from).transpose()
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Identity>, DbError> {
        let row: Option<IdentityRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, username, discriminator
            FROM discord_user
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Identity::try_from).transpose()
    }
}

/// Factory function to create the appropriate resolver based on pool type.
#[cfg(feature = "database")]
pub fn create_identity_resolver(pool: &DbPool) -> Box<dyn IdentityResolver> {
    match pool {
        DbPool::Sqlite(pool) => Box::new(SqliteIdentityResolver::new(pool.clone())),
        DbPool::Postgres(pool) => Box::new(PgIdentityResolver::new(pool.clone())),
    }
}

// Helper struct for SQLx row mapping; both backends store the same column types.

#[cfg(feature = "database")]
#[derive(sqlx::FromRow)]
pub(crate) struct IdentityRow {
    pub(crate) id: i64,
    pub(crate) user_id: i64,
    pub(crate) username: String,
    pub(crate) discriminator: String,
}

#[cfg(feature = "database")]
impl TryFrom<IdentityRow> for Identity {
    type Error = DbError;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        Ok(Identity {
            id: row.id,
            user_id: external_user_id(row.user_id)?,
            username: row.username,
            discriminator: row.discriminator,
        })
    }
}

/// Converts a stored external id back to its unsigned form.
pub(crate) fn external_user_id(stored: i64) -> Result<u64, DbError> {
    u64::try_from(stored)
        .map_err(|_| DbError::Serialization(format!("Negative external user id: {}", stored)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_user_id() {
        assert_eq!(external_user_id(42).unwrap(), 42);
        assert!(matches!(
            external_user_id(-1),
            Err(DbError::Serialization(_))
        ));
    }

    #[cfg(feature = "database")]
    #[test]
    fn test_identity_row_conversion() {
        let row = IdentityRow {
            id: 3,
            user_id: 105_635_576_866_156_544,
            username: "kwoth".to_string(),
            discriminator: "0001".to_string(),
        };
        let identity: Identity = row.try_into().unwrap();
        assert_eq!(identity.id, 3);
        assert_eq!(identity.user_id, 105_635_576_866_156_544);
        assert_eq!(identity.full_name(), "kwoth#0001");
    }
}
