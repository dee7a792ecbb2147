//! Relationship repository for database operations.
//!
//! This module provides persistence for relationship records, their change
//! history and attached items, supporting both SQLite and PostgreSQL backends.
//! Engine-specific statements are selected through [`SqlDialect`].
//!
//! Prices carry at most [`PRICE_SCALE`] decimal places. SQLite stores them as
//! integer hundredths; PostgreSQL stores an unscaled `NUMERIC` that rejects
//! values with more places. Both render prices as exact decimal text.

use super::dialect::SqlDialect;
use super::{DbError, DbPool};
use crate::waifu::{WaifuIncludes, WaifuInfo, WaifuLbEntry};
use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

#[cfg(feature = "database")]
use super::identity_repo::{
    external_user_id, IdentityResolver, PgIdentityResolver, SqliteIdentityResolver,
};
#[cfg(feature = "database")]
use crate::identity::{format_full_name, Identity};
#[cfg(feature = "database")]
use crate::waifu::{WaifuItem, WaifuUpdateType};
#[cfg(feature = "database")]
use chrono::{DateTime, Utc};
#[cfg(feature = "database")]
use tracing::{debug, info, warn};
#[cfg(feature = "database")]
use wl_observability::metrics::{record_degraded, record_record_created};

/// Number of decimal places a stored price may carry.
pub const PRICE_SCALE: u32 = 2;

/// Repository trait for relationship records.
///
/// Methods taking a `user_id` accept the external id and resolve it first;
/// an unknown user behaves like a user without data (`None`, empty or `0`).
/// The `*_by_key` methods take the subject's surrogate key and skip
/// resolution, for callers that already hold it.
#[async_trait]
pub trait WaifuRepository: Send + Sync {
    /// The dialect this repository was built for.
    fn dialect(&self) -> SqlDialect;

    /// Resolves an external id to the subject key.
    async fn subject_key(&self, user_id: u64) -> Result<Option<i64>, DbError>;

    /// Ensures the user has a relationship record and returns it with the
    /// user's identity loaded.
    ///
    /// Creates a default record (no affinity, no claimer, price 1) only when
    /// none exists, using the dialect's conflict-free insert, so concurrent
    /// callers never produce two records. On an unrecognized dialect creation
    /// is skipped and only an existing record is returned.
    async fn ensure_record(&self, user_id: u64) -> Result<Option<WaifuInfo>, DbError>;

    /// Gets the record of a subject key with the selected relations loaded.
    async fn find_by_key(
        &self,
        waifu_id: i64,
        includes: WaifuIncludes,
    ) -> Result<Option<WaifuInfo>, DbError>;

    /// Display names of every identity claimed by the given key, in no
    /// particular order.
    async fn names_claimed_by(&self, claimer_id: i64) -> Result<Vec<String>, DbError>;

    /// Records ordered by price, highest first, ties broken by subject key.
    ///
    /// Fails with [`DbError::InvalidArgument`] for a negative `count`; a
    /// `count` of zero returns immediately without querying.
    async fn get_top(&self, count: i32, skip: u32) -> Result<Vec<WaifuLbEntry>, DbError>;

    /// Sum of the prices of all claimed records.
    async fn get_total_value(&self) -> Result<Decimal, DbError>;

    /// Number of times the subject set an affinity.
    ///
    /// Returns `0` on an unrecognized dialect.
    async fn affinity_count_by_key(&self, waifu_id: i64) -> Result<u64, DbError>;

    /// Number of times a claim on the subject was released.
    async fn divorce_count_by_key(&self, waifu_id: i64) -> Result<u64, DbError>;

    /// Gets the user's record with the selected relations loaded.
    ///
    /// `None` for `includes` loads every relation.
    async fn by_waifu_user_id(
        &self,
        user_id: u64,
        includes: Option<&WaifuIncludes>,
    ) -> Result<Option<WaifuInfo>, DbError> {
        match self.subject_key(user_id).await? {
            Some(waifu_id) => {
                self.find_by_key(waifu_id, WaifuIncludes::or_all(includes))
                    .await
            }
            None => Ok(None),
        }
    }

    /// Display names of every identity the user currently claims.
    async fn get_waifu_names(&self, user_id: u64) -> Result<Vec<String>, DbError> {
        match self.subject_key(user_id).await? {
            Some(claimer_id) => self.names_claimed_by(claimer_id).await,
            None => Ok(Vec::new()),
        }
    }

    /// Number of times the user set an affinity.
    async fn affinity_count(&self, user_id: u64) -> Result<u64, DbError> {
        match self.subject_key(user_id).await? {
            Some(waifu_id) => self.affinity_count_by_key(waifu_id).await,
            None => Ok(0),
        }
    }

    /// Number of times a claim on the user was released.
    async fn divorce_count(&self, user_id: u64) -> Result<u64, DbError> {
        match self.subject_key(user_id).await? {
            Some(waifu_id) => self.divorce_count_by_key(waifu_id).await,
            None => Ok(0),
        }
    }
}

/// Validates a leaderboard page size.
///
/// Returns `None` when the page is empty and no query is needed.
pub fn validate_top_count(count: i32) -> Result<Option<u32>, DbError> {
    if count < 0 {
        return Err(DbError::InvalidArgument(format!(
            "count must not be negative, got {}",
            count
        )));
    }
    if count == 0 {
        return Ok(None);
    }
    Ok(Some(count as u32))
}

/// Parses a price rendered as decimal text by the database.
pub fn parse_price(text: &str) -> Result<Decimal, DbError> {
    Decimal::from_str(text.trim()).map_err(DbError::from)
}

/// Converts a price to the integer hundredths stored by SQLite.
///
/// Rejects negative prices and prices with more than [`PRICE_SCALE`]
/// decimal places instead of rounding them.
pub fn price_to_minor_units(price: Decimal) -> Result<i64, DbError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(DbError::InvalidArgument(format!(
            "price must not be negative, got {}",
            price
        )));
    }
    if price.normalize().scale() > PRICE_SCALE {
        return Err(DbError::InvalidArgument(format!(
            "price {} has more than {} decimal places",
            price, PRICE_SCALE
        )));
    }

    price
        .checked_mul(Decimal::from(10i64.pow(PRICE_SCALE)))
        .and_then(|minor| minor.to_i64())
        .ok_or_else(|| DbError::InvalidArgument(format!("price {} is out of range", price)))
}

/// Converts stored integer hundredths back to a price.
pub fn price_from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, PRICE_SCALE)
}

// Renders SQLite's integer hundredths as exact decimal text.
#[cfg(feature = "database")]
const SQLITE_PRICE: &str = "printf('%d.%02d', w.price / 100, w.price % 100)";

#[cfg(feature = "database")]
const PG_PRICE: &str = "CAST(w.price AS TEXT)";

#[cfg(feature = "database")]
fn waifu_select(price: &str) -> String {
    format!(
        r#"
    SELECT w.id, w.waifu_id, w.affinity_id, w.claimer_id,
           {price} AS price,
           u.user_id AS waifu_user_id, u.username AS waifu_username,
           u.discriminator AS waifu_discriminator,
           a.user_id AS affinity_user_id, a.username AS affinity_username,
           a.discriminator AS affinity_discriminator,
           c.user_id AS claimer_user_id, c.username AS claimer_username,
           c.discriminator AS claimer_discriminator
    FROM waifu_info w
    JOIN discord_user u ON u.id = w.waifu_id
    LEFT JOIN discord_user a ON a.id = w.affinity_id
    LEFT JOIN discord_user c ON c.id = w.claimer_id
"#
    )
}

#[cfg(feature = "database")]
fn top_select(price: &str) -> String {
    format!(
        r#"
    SELECT a.username AS affinity, a.discriminator AS affinity_discrim,
           c.username AS claimer, c.discriminator AS claimer_discrim,
           u.username AS username, u.discriminator AS discrim,
           {price} AS price
    FROM waifu_info w
    JOIN discord_user u ON u.id = w.waifu_id
    LEFT JOIN discord_user a ON a.id = w.affinity_id
    LEFT JOIN discord_user c ON c.id = w.claimer_id
    ORDER BY w.price DESC, w.waifu_id ASC
"#
    )
}

/// SQLite implementation of WaifuRepository.
#[cfg(feature = "database")]
pub struct SqliteWaifuRepository {
    pool: sqlx::SqlitePool,
    identities: SqliteIdentityResolver,
    dialect: SqlDialect,
}

#[cfg(feature = "database")]
impl SqliteWaifuRepository {
    /// Creates a new SQLite relationship store.
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self::with_dialect(pool, SqlDialect::Sqlite)
    }

    /// Creates a SQLite relationship store answering with the given dialect's
    /// capabilities. Logs a warning when the dialect is unrecognized.
    pub fn with_dialect(pool: sqlx::SqlitePool, dialect: SqlDialect) -> Self {
        warn_if_degraded(dialect);
        Self {
            identities: SqliteIdentityResolver::new(pool.clone()),
            pool,
            dialect,
        }
    }

    async fn items(&self, waifu_info_id: i64) -> Result<Vec<WaifuItem>, DbError> {
        let rows: Vec<SqliteItemRow> = sqlx::query_as(
            r#"
            SELECT id, waifu_info_id, item_emoji, name, date_added
            FROM waifu_item
            WHERE waifu_info_id = ?
            ORDER BY id
            "#,
        )
        .bind(waifu_info_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }
}

#[cfg(feature = "database")]
#[async_trait]
impl WaifuRepository for SqliteWaifuRepository {
    fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    async fn subject_key(&self, user_id: u64) -> Result<Option<i64>, DbError> {
        self.identities.resolve(user_id).await
    }

    async fn ensure_record(&self, user_id: u64) -> Result<Option<WaifuInfo>, DbError> {
        let Some(waifu_id) = self.subject_key(user_id).await? else {
            debug!(user_id, "Cannot initialize record for unknown user");
            return Ok(None);
        };

        match self.dialect.insert_if_absent_sql() {
            Some(sql) => {
                let result = sqlx::query(sql).bind(waifu_id).execute(&self.pool).await?;
                if result.rows_affected() > 0 {
                    info!(user_id, waifu_id, "Created default relationship record");
                    record_record_created(self.dialect.as_str());
                }
            }
            None => {
                debug!(user_id, dialect = %self.dialect, "Skipping record initialization");
                record_degraded("ensure_record");
            }
        }

        self.find_by_key(waifu_id, WaifuIncludes::none().with_waifu())
            .await
    }

    async fn find_by_key(
        &self,
        waifu_id: i64,
        includes: WaifuIncludes,
    ) -> Result<Option<WaifuInfo>, DbError> {
        let query = format!("{} WHERE w.waifu_id = ?", waifu_select(SQLITE_PRICE));
        let row: Option<WaifuJoinRow> = sqlx::query_as(&query)
            .bind(waifu_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut info = row.into_info(includes)?;
        if includes.items {
            info.items = self.items(info.id).await?;
        }
        Ok(Some(info))
    }

    async fn names_claimed_by(&self, claimer_id: i64) -> Result<Vec<String>, DbError> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT u.username, u.discriminator
            FROM waifu_info w
            JOIN discord_user u ON u.id = w.waifu_id
            WHERE w.claimer_id = ?
            "#,
        )
        .bind(claimer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(username, discriminator)| format_full_name(&username, &discriminator))
            .collect())
    }

    async fn get_top(&self, count: i32, skip: u32) -> Result<Vec<WaifuLbEntry>, DbError> {
        let Some(limit) = validate_top_count(count)? else {
            return Ok(Vec::new());
        };

        let query = format!("{} LIMIT ? OFFSET ?", top_select(SQLITE_PRICE));
        let rows: Vec<LbRow> = sqlx::query_as(&query)
            .bind(limit as i64)
            .bind(skip as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn get_total_value(&self) -> Result<Decimal, DbError> {
        // Summed here so a large total cannot overflow SQLite's 64-bit SUM.
        let prices: Vec<i64> =
            sqlx::query_scalar("SELECT price FROM waifu_info WHERE claimer_id IS NOT NULL")
                .fetch_all(&self.pool)
                .await?;

        prices.into_iter().try_fold(Decimal::ZERO, |total, minor| {
            total
                .checked_add(price_from_minor_units(minor))
                .ok_or_else(|| DbError::Serialization("total value overflow".to_string()))
        })
    }

    async fn affinity_count_by_key(&self, waifu_id: i64) -> Result<u64, DbError> {
        if !self.dialect.supports_history_queries() {
            record_degraded("affinity_count");
            return Ok(0);
        }

        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM waifu_updates
            WHERE user_id = ? AND update_type = ? AND new_id IS NOT NULL
            "#,
        )
        .bind(waifu_id)
        .bind(WaifuUpdateType::AffinityChanged.as_db_code())
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u64)
    }

    async fn divorce_count_by_key(&self, waifu_id: i64) -> Result<u64, DbError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM waifu_updates
            WHERE old_id = ? AND new_id IS NULL AND update_type = ?
            "#,
        )
        .bind(waifu_id)
        .bind(WaifuUpdateType::Claimed.as_db_code())
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u64)
    }
}

/// PostgreSQL implementation of WaifuRepository.
#[cfg(feature = "database")]
pub struct PgWaifuRepository {
    pool: sqlx::PgPool,
    identities: PgIdentityResolver,
    dialect: SqlDialect,
}

#[cfg(feature = "database")]
impl PgWaifuRepository {
    /// Creates a new PostgreSQL relationship store.
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self::with_dialect(pool, SqlDialect::Postgres)
    }

    /// Creates a PostgreSQL relationship store answering with the given
    /// dialect's capabilities. Logs a warning when the dialect is unrecognized.
    pub fn with_dialect(pool: sqlx::PgPool, dialect: SqlDialect) -> Self {
        warn_if_degraded(dialect);
        Self {
            identities: PgIdentityResolver::new(pool.clone()),
            pool,
            dialect,
        }
    }

    async fn items(&self, waifu_info_id: i64) -> Result<Vec<WaifuItem>, DbError> {
        let rows: Vec<PgItemRow> = sqlx::query_as(
            r#"
            SELECT id, waifu_info_id, item_emoji, name, date_added
            FROM waifu_item
            WHERE waifu_info_id = $1
            ORDER BY id
            "#,
        )
        .bind(waifu_info_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(WaifuItem::from).collect())
    }
}

#[cfg(feature = "database")]
#[async_trait]
impl WaifuRepository for PgWaifuRepository {
    fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    async fn subject_key(&self, user_id: u64) -> Result<Option<i64>, DbError> {
        self.identities.resolve(user_id).await
    }

    async fn ensure_record(&self, user_id: u64) -> Result<Option<WaifuInfo>, DbError> {
        let Some(waifu_id) = self.subject_key(user_id).await? else {
            debug!(user_id, "Cannot initialize record for unknown user");
            return Ok(None);
        };

        match self.dialect.insert_if_absent_sql() {
            Some(sql) => {
                let result = sqlx::query(sql).bind(waifu_id).execute(&self.pool).await?;
                if result.rows_affected() > 0 {
                    info!(user_id, waifu_id, "Created default relationship record");
                    record_record_created(self.dialect.as_str());
                }
            }
            None => {
                debug!(user_id, dialect = %self.dialect, "Skipping record initialization");
                record_degraded("ensure_record");
            }
        }

        self.find_by_key(waifu_id, WaifuIncludes::none().with_waifu())
            .await
    }

    async fn find_by_key(
        &self,
        waifu_id: i64,
        includes: WaifuIncludes,
    ) -> Result<Option<WaifuInfo>, DbError> {
        let query = format!("{} WHERE w.waifu_id = $1", waifu_select(PG_PRICE));
        let row: Option<WaifuJoinRow> = sqlx::query_as(&query)
            .bind(waifu_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut info = row.into_info(includes)?;
        if includes.items {
            info.items = self.items(info.id).await?;
        }
        Ok(Some(info))
    }

    async fn names_claimed_by(&self, claimer_id: i64) -> Result<Vec<String>, DbError> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT u.username, u.discriminator
            FROM waifu_info w
            JOIN discord_user u ON u.id = w.waifu_id
            WHERE w.claimer_id = $1
            "#,
        )
        .bind(claimer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(username, discriminator)| format_full_name(&username, &discriminator))
            .collect())
    }

    async fn get_top(&self, count: i32, skip: u32) -> Result<Vec<WaifuLbEntry>, DbError> {
        let Some(limit) = validate_top_count(count)? else {
            return Ok(Vec::new());
        };

        let query = format!("{} LIMIT $1 OFFSET $2", top_select(PG_PRICE));
        let rows: Vec<LbRow> = sqlx::query_as(&query)
            .bind(limit as i64)
            .bind(skip as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn get_total_value(&self) -> Result<Decimal, DbError> {
        let total: String = sqlx::query_scalar(
            r#"
            SELECT CAST(COALESCE(SUM(price), 0) AS TEXT)
            FROM waifu_info
            WHERE claimer_id IS NOT NULL
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        parse_price(&total)
    }

    async fn affinity_count_by_key(&self, waifu_id: i64) -> Result<u64, DbError> {
        if !self.dialect.supports_history_queries() {
            record_degraded("affinity_count");
            return Ok(0);
        }

        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM waifu_updates
            WHERE user_id = $1 AND update_type = $2 AND new_id IS NOT NULL
            "#,
        )
        .bind(waifu_id)
        .bind(WaifuUpdateType::AffinityChanged.as_db_code())
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u64)
    }

    async fn divorce_count_by_key(&self, waifu_id: i64) -> Result<u64, DbError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM waifu_updates
            WHERE old_id = $1 AND new_id IS NULL AND update_type = $2
            "#,
        )
        .bind(waifu_id)
        .bind(WaifuUpdateType::Claimed.as_db_code())
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u64)
    }
}

/// Factory function to create the appropriate repository based on pool type.
#[cfg(feature = "database")]
pub fn create_waifu_repository(pool: &DbPool) -> Box<dyn WaifuRepository> {
    create_waifu_repository_with_dialect(pool, SqlDialect::for_pool(pool))
}

/// Like [`create_waifu_repository`], with an explicitly chosen dialect.
#[cfg(feature = "database")]
pub fn create_waifu_repository_with_dialect(
    pool: &DbPool,
    dialect: SqlDialect,
) -> Box<dyn WaifuRepository> {
    match pool {
        DbPool::Sqlite(pool) => Box::new(SqliteWaifuRepository::with_dialect(pool.clone(), dialect)),
        DbPool::Postgres(pool) => Box::new(PgWaifuRepository::with_dialect(pool.clone(), dialect)),
    }
}

#[cfg(feature = "database")]
fn warn_if_degraded(dialect: SqlDialect) {
    if !dialect.is_recognized() {
        warn!(
            "Relationship store dialect is unrecognized: records will not be initialized \
             and affinity counts report 0"
        );
    }
}

// Helper structs for SQLx row mapping.
// Prices are read as text on both backends so one parser handles them.

#[cfg(feature = "database")]
#[derive(sqlx::FromRow)]
struct WaifuJoinRow {
    id: i64,
    waifu_id: i64,
    affinity_id: Option<i64>,
    claimer_id: Option<i64>,
    price: String,
    waifu_user_id: i64,
    waifu_username: String,
    waifu_discriminator: String,
    affinity_user_id: Option<i64>,
    affinity_username: Option<String>,
    affinity_discriminator: Option<String>,
    claimer_user_id: Option<i64>,
    claimer_username: Option<String>,
    claimer_discriminator: Option<String>,
}

#[cfg(feature = "database")]
impl WaifuJoinRow {
    fn into_info(self, includes: WaifuIncludes) -> Result<WaifuInfo, DbError> {
        let waifu = if includes.waifu {
            Some(Identity {
                id: self.waifu_id,
                user_id: external_user_id(self.waifu_user_id)?,
                username: self.waifu_username,
                discriminator: self.waifu_discriminator,
            })
        } else {
            None
        };

        let affinity = if includes.affinity {
            joined_identity(
                self.affinity_id,
                self.affinity_user_id,
                self.affinity_username,
                self.affinity_discriminator,
            )?
        } else {
            None
        };

        let claimer = if includes.claimer {
            joined_identity(
                self.claimer_id,
                self.claimer_user_id,
                self.claimer_username,
                self.claimer_discriminator,
            )?
        } else {
            None
        };

        Ok(WaifuInfo {
            id: self.id,
            waifu_id: self.waifu_id,
            affinity_id: self.affinity_id,
            claimer_id: self.claimer_id,
            price: parse_price(&self.price)?,
            waifu,
            affinity,
            claimer,
            items: Vec::new(),
        })
    }
}

#[cfg(feature = "database")]
fn joined_identity(
    id: Option<i64>,
    user_id: Option<i64>,
    username: Option<String>,
    discriminator: Option<String>,
) -> Result<Option<Identity>, DbError> {
    match (id, user_id, username, discriminator) {
        (Some(id), Some(user_id), Some(username), Some(discriminator)) => Ok(Some(Identity {
            id,
            user_id: external_user_id(user_id)?,
            username,
            discriminator,
        })),
        _ => Ok(None),
    }
}

#[cfg(feature = "database")]
#[derive(sqlx::FromRow)]
struct LbRow {
    affinity: Option<String>,
    affinity_discrim: Option<String>,
    claimer: Option<String>,
    claimer_discrim: Option<String>,
    username: String,
    discrim: String,
    price: String,
}

#[cfg(feature = "database")]
impl TryFrom<LbRow> for WaifuLbEntry {
    type Error = DbError;

    fn try_from(row: LbRow) -> Result<Self, Self::Error> {
        Ok(WaifuLbEntry {
            affinity: row.affinity,
            affinity_discrim: row.affinity_discrim,
            claimer: row.claimer,
            claimer_discrim: row.claimer_discrim,
            username: row.username,
            discrim: row.discrim,
            price: parse_price(&row.price)?,
        })
    }
}

#[cfg(feature = "database")]
#[derive(sqlx::FromRow)]
struct SqliteItemRow {
    id: i64,
    waifu_info_id: i64,
    item_emoji: String,
    name: String,
    date_added: String,
}

#[cfg(feature = "database")]
impl TryFrom<SqliteItemRow> for WaifuItem {
    type Error = DbError;

    fn try_from(row: SqliteItemRow) -> Result<Self, Self::Error> {
        Ok(WaifuItem {
            id: row.id,
            waifu_info_id: row.waifu_info_id,
            item_emoji: row.item_emoji,
            name: row.name,
            date_added: parse_sqlite_datetime(&row.date_added)?,
        })
    }
}

#[cfg(feature = "database")]
#[derive(sqlx::FromRow)]
struct PgItemRow {
    id: i64,
    waifu_info_id: i64,
    item_emoji: String,
    name: String,
    date_added: DateTime<Utc>,
}

#[cfg(feature = "database")]
impl From<PgItemRow> for WaifuItem {
    fn from(row: PgItemRow) -> Self {
        WaifuItem {
            id: row.id,
            waifu_info_id: row.waifu_info_id,
            item_emoji: row.item_emoji,
            name: row.name,
            date_added: row.date_added,
        }
    }
}

// Accepts RFC 3339 as well as SQLite's `datetime('now')` format.
#[cfg(feature = "database")]
fn parse_sqlite_datetime(value: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").map(|dt| dt.and_utc())
        })
        .map_err(|e| DbError::Serialization(format!("Failed to parse date_added: {}", e)))
}
