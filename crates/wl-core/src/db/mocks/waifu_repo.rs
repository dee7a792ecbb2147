//! Mock implementation of WaifuRepository for testing.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::db::{validate_top_count, DbError, IdentityResolver, SqlDialect, WaifuRepository};
use crate::identity::Identity;
use crate::waifu::{
    WaifuIncludes, WaifuInfo, WaifuItem, WaifuLbEntry, WaifuUpdate, WaifuUpdateType,
};

#[derive(Default)]
struct Store {
    /// Identities by surrogate key.
    identities: HashMap<i64, Identity>,
    /// Records by subject key.
    records: HashMap<i64, WaifuInfo>,
    updates: Vec<WaifuUpdate>,
    items: Vec<WaifuItem>,
    next_id: i64,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn resolve(&self, user_id: u64) -> Option<i64> {
        self.identities
            .values()
            .find(|identity| identity.user_id == user_id)
            .map(|identity| identity.id)
    }

    fn load(&self, waifu_id: i64, includes: WaifuIncludes) -> Option<WaifuInfo> {
        let record = self.records.get(&waifu_id)?;
        let identity = |id: Option<i64>| id.and_then(|id| self.identities.get(&id).cloned());

        Some(WaifuInfo {
            waifu: if includes.waifu {
                identity(Some(record.waifu_id))
            } else {
                None
            },
            affinity: if includes.affinity {
                identity(record.affinity_id)
            } else {
                None
            },
            claimer: if includes.claimer {
                identity(record.claimer_id)
            } else {
                None
            },
            items: if includes.items {
                self.items
                    .iter()
                    .filter(|item| item.waifu_info_id == record.id)
                    .cloned()
                    .collect()
            } else {
                Vec::new()
            },
            ..record.clone()
        })
    }
}

/// Mock implementation of WaifuRepository using in-memory storage.
///
/// Also implements [`IdentityResolver`] over the identities it holds.
pub struct MockWaifuRepository {
    store: Arc<RwLock<Store>>,
    dialect: SqlDialect,
    reads: AtomicUsize,
    resolutions: AtomicUsize,
}

impl Default for MockWaifuRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MockWaifuRepository {
    /// Creates a new mock repository behaving like a SQLite store.
    pub fn new() -> Self {
        Self::with_dialect(SqlDialect::Sqlite)
    }

    /// Creates a new mock repository with the given dialect capabilities.
    pub fn with_dialect(dialect: SqlDialect) -> Self {
        Self {
            store: Arc::new(RwLock::new(Store::default())),
            dialect,
            reads: AtomicUsize::new(0),
            resolutions: AtomicUsize::new(0),
        }
    }

    /// Adds an identity and returns its surrogate key.
    pub async fn add_identity(&self, user_id: u64, username: &str, discriminator: &str) -> i64 {
        let mut store = self.store.write().await;
        let id = store.next_id();
        store
            .identities
            .insert(id, Identity::new(id, user_id, username, discriminator));
        id
    }

    /// Inserts or replaces the record of a subject, returning the record id.
    pub async fn put_record(
        &self,
        waifu_id: i64,
        claimer_id: Option<i64>,
        affinity_id: Option<i64>,
        price: Decimal,
    ) -> i64 {
        let mut store = self.store.write().await;
        let id = match store.records.get(&waifu_id) {
            Some(existing) => existing.id,
            None => store.next_id(),
        };
        let mut record = WaifuInfo::new(id, waifu_id);
        record.claimer_id = claimer_id;
        record.affinity_id = affinity_id;
        record.price = price;
        store.records.insert(waifu_id, record);
        id
    }

    /// Appends a history entry about a subject.
    pub async fn add_update(
        &self,
        user_id: i64,
        update_type: WaifuUpdateType,
        old_id: Option<i64>,
        new_id: Option<i64>,
    ) {
        let mut store = self.store.write().await;
        let id = store.next_id();
        store.updates.push(WaifuUpdate {
            id,
            user_id,
            update_type,
            old_id,
            new_id,
            date_added: Utc::now(),
        });
    }

    /// Attaches an item to a record.
    pub async fn add_item(&self, waifu_info_id: i64, item_emoji: &str, name: &str) {
        let mut store = self.store.write().await;
        let id = store.next_id();
        store.items.push(WaifuItem {
            id,
            waifu_info_id,
            item_emoji: item_emoji.to_string(),
            name: name.to_string(),
            date_added: Utc::now(),
        });
    }

    /// Gets a snapshot of all records in the mock.
    pub async fn snapshot(&self) -> Vec<WaifuInfo> {
        self.store.read().await.records.values().cloned().collect()
    }

    /// Number of trait calls that touched the store.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of external id lookups performed.
    pub fn resolutions(&self) -> usize {
        self.resolutions.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }

    fn resolve_in(&self, store: &Store, user_id: u64) -> Option<i64> {
        self.resolutions.fetch_add(1, Ordering::SeqCst);
        store.resolve(user_id)
    }
}

#[async_trait]
impl IdentityResolver for MockWaifuRepository {
    async fn resolve(&self, user_id: u64) -> Result<Option<i64>, DbError> {
        self.touch();
        Ok(self.resolve_in(&*self.store.read().await, user_id))
    }

    async fn get(&self, user_id: u64) -> Result<Option<Identity>, DbError> {
        self.touch();
        let store = self.store.read().await;
        Ok(store
            .resolve(user_id)
            .and_then(|id| store.identities.get(&id).cloned()))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Identity>, DbError> {
        self.touch();
        Ok(self.store.read().await.identities.get(&id).cloned())
    }
}

#[async_trait]
impl WaifuRepository for MockWaifuRepository {
    fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    async fn subject_key(&self, user_id: u64) -> Result<Option<i64>, DbError> {
        self.touch();
        Ok(self.resolve_in(&*self.store.read().await, user_id))
    }

    async fn ensure_record(&self, user_id: u64) -> Result<Option<WaifuInfo>, DbError> {
        self.touch();
        // The write lock plays the role of the unique constraint.
        let mut store = self.store.write().await;
        let Some(waifu_id) = self.resolve_in(&store, user_id) else {
            return Ok(None);
        };

        if self.dialect.insert_if_absent_sql().is_some() && !store.records.contains_key(&waifu_id)
        {
            let id = store.next_id();
            store.records.insert(waifu_id, WaifuInfo::new(id, waifu_id));
        }

        Ok(store.load(waifu_id, WaifuIncludes::none().with_waifu()))
    }

    async fn find_by_key(
        &self,
        waifu_id: i64,
        includes: WaifuIncludes,
    ) -> Result<Option<WaifuInfo>, DbError> {
        self.touch();
        Ok(self.store.read().await.load(waifu_id, includes))
    }

    async fn names_claimed_by(&self, claimer_id: i64) -> Result<Vec<String>, DbError> {
        self.touch();
        let store = self.store.read().await;
        Ok(store
            .records
            .values()
            .filter(|record| record.claimer_id == Some(claimer_id))
            .filter_map(|record| store.identities.get(&record.waifu_id))
            .map(Identity::full_name)
            .collect())
    }

    async fn get_top(&self, count: i32, skip: u32) -> Result<Vec<WaifuLbEntry>, DbError> {
        let Some(limit) = validate_top_count(count)? else {
            return Ok(Vec::new());
        };
        self.touch();

        let store = self.store.read().await;
        let mut records: Vec<&WaifuInfo> = store.records.values().collect();
        records.sort_by(|a, b| b.price.cmp(&a.price).then(a.waifu_id.cmp(&b.waifu_id)));

        let identity = |id: Option<i64>| id.and_then(|id| store.identities.get(&id));
        let entries = records
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .filter_map(|record| {
                let waifu = store.identities.get(&record.waifu_id)?;
                let affinity = identity(record.affinity_id);
                let claimer = identity(record.claimer_id);
                Some(WaifuLbEntry {
                    affinity: affinity.map(|a| a.username.clone()),
                    affinity_discrim: affinity.map(|a| a.discriminator.clone()),
                    claimer: claimer.map(|c| c.username.clone()),
                    claimer_discrim: claimer.map(|c| c.discriminator.clone()),
                    username: waifu.username.clone(),
                    discrim: waifu.discriminator.clone(),
                    price: record.price,
                })
            })
            .collect();

        Ok(entries)
    }

    async fn get_total_value(&self) -> Result<Decimal, DbError> {
        self.touch();
        let store = self.store.read().await;
        Ok(store
            .records
            .values()
            .filter(|record| record.is_claimed())
            .map(|record| record.price)
            .sum())
    }

    async fn affinity_count_by_key(&self, waifu_id: i64) -> Result<u64, DbError> {
        if !self.dialect.supports_history_queries() {
            return Ok(0);
        }
        self.touch();

        let store = self.store.read().await;
        Ok(store
            .updates
            .iter()
            .filter(|update| update.user_id == waifu_id && update.is_affinity_set())
            .count() as u64)
    }

    async fn divorce_count_by_key(&self, waifu_id: i64) -> Result<u64, DbError> {
        self.touch();
        let store = self.store.read().await;
        Ok(store
            .updates
            .iter()
            .filter(|update| update.is_divorce_of(waifu_id))
            .count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ensure_record_is_idempotent() {
        let repo = MockWaifuRepository::new();
        repo.add_identity(100, "bob", "0001").await;

        let first = repo.ensure_record(100).await.unwrap().unwrap();
        let second = repo.ensure_record(100).await.unwrap().unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(repo.snapshot().await.len(), 1);
        assert_eq!(first.full_name().as_deref(), Some("bob#0001"));
    }

    #[tokio::test]
    async fn test_ensure_record_unrecognized_dialect_skips_creation() {
        let repo = MockWaifuRepository::with_dialect(SqlDialect::Unrecognized);
        repo.add_identity(100, "bob", "0001").await;

        assert!(repo.ensure_record(100).await.unwrap().is_none());
        assert!(repo.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_get_top_zero_does_not_touch_store() {
        let repo = MockWaifuRepository::new();
        assert!(repo.get_top(0, 0).await.unwrap().is_empty());
        assert_eq!(repo.reads(), 0);
    }

    #[tokio::test]
    async fn test_identity_resolver() {
        let repo = MockWaifuRepository::new();
        let id = repo.add_identity(100, "bob", "0001").await;

        assert_eq!(repo.resolve(100).await.unwrap(), Some(id));
        assert_eq!(repo.resolve(101).await.unwrap(), None);
        assert_eq!(
            repo.display_name(id).await.unwrap().as_deref(),
            Some("bob#0001")
        );
    }
}
