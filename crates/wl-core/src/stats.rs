//! Per-identity statistics snapshots.
//!
//! A snapshot is composed from several repository reads. Building one for an
//! identity that has never been initialized first creates its default record,
//! so the first read of a new identity reports price 1 and empty history.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, Instrument};
use wl_observability::metrics::{record_query, QueryOutcome};
use wl_observability::subject_span;

use crate::db::{DbError, WaifuRepository};
use crate::sampling::sample;
use crate::waifu::{WaifuIncludes, WaifuStats};

#[cfg(feature = "database")]
use crate::db::{create_waifu_repository, DbPool};

/// Maximum number of claimed names reported in a snapshot.
pub const RECENT_CLAIMS_LIMIT: usize = 30;

/// Builds [`WaifuStats`] snapshots on top of a [`WaifuRepository`].
#[derive(Clone)]
pub struct WaifuStatsAggregator {
    repo: Arc<dyn WaifuRepository>,
}

impl WaifuStatsAggregator {
    pub fn new(repo: Arc<dyn WaifuRepository>) -> Self {
        Self { repo }
    }

    /// Creates an aggregator over the repository matching the pool type.
    #[cfg(feature = "database")]
    pub fn for_pool(pool: &DbPool) -> Self {
        Self::new(Arc::from(create_waifu_repository(pool)))
    }

    pub fn repository(&self) -> &dyn WaifuRepository {
        self.repo.as_ref()
    }

    /// Returns the statistics snapshot for a user.
    ///
    /// Initializes the user's record first (see
    /// [`WaifuRepository::ensure_record`]). Returns `None` when the user is
    /// unknown, or when no record exists and the dialect cannot create one.
    pub async fn stats(&self, user_id: u64) -> Result<Option<WaifuStats>, DbError> {
        let started = Instant::now();
        let result = self
            .build(user_id)
            .instrument(subject_span!("stats", user_id))
            .await;
        record_query("stats", started.elapsed(), QueryOutcome::of(&result));
        result
    }

    async fn build(&self, user_id: u64) -> Result<Option<WaifuStats>, DbError> {
        let Some(record) = self.repo.ensure_record(user_id).await? else {
            debug!("No relationship record");
            return Ok(None);
        };

        // The remaining reads reuse the resolved subject key.
        let waifu_id = record.waifu_id;
        let Some(info) = self.repo.find_by_key(waifu_id, WaifuIncludes::all()).await? else {
            return Ok(None);
        };

        let affinity_count = self.repo.affinity_count_by_key(waifu_id).await?;
        let divorce_count = self.repo.divorce_count_by_key(waifu_id).await?;
        let claimed = self.repo.names_claimed_by(waifu_id).await?;
        let claim_count = claimed.len() as u64;

        debug!(claim_count, affinity_count, divorce_count, "Built stats snapshot");

        Ok(Some(WaifuStats {
            full_name: info.full_name().unwrap_or_default(),
            affinity_count,
            affinity_name: info.affinity.as_ref().map(|a| a.full_name()),
            claim_count,
            claimer_name: info.claimer.as_ref().map(|c| c.full_name()),
            divorce_count,
            price: info.price,
            claims: sample(claimed, RECENT_CLAIMS_LIMIT),
            items: info.items,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::mocks::MockWaifuRepository;
    use crate::db::SqlDialect;
    use crate::waifu::WaifuUpdateType;
    use rust_decimal::Decimal;
    use std::collections::HashSet;

    fn aggregator(repo: MockWaifuRepository) -> (WaifuStatsAggregator, Arc<MockWaifuRepository>) {
        let repo = Arc::new(repo);
        (WaifuStatsAggregator::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn test_unknown_user_has_no_stats() {
        let (stats, _) = aggregator(MockWaifuRepository::new());
        assert!(stats.stats(404).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_first_read_initializes_record() {
        let (stats, repo) = aggregator(MockWaifuRepository::new());
        repo.add_identity(100, "bob", "0001").await;

        let snapshot = stats.stats(100).await.unwrap().expect("snapshot");
        assert_eq!(snapshot.full_name, "bob#0001");
        assert_eq!(snapshot.price, Decimal::ONE);
        assert_eq!(snapshot.claim_count, 0);
        assert!(snapshot.claims.is_empty());
        assert!(snapshot.claimer_name.is_none());
        assert!(snapshot.affinity_name.is_none());
        assert_eq!(repo.snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn test_unrecognized_dialect_without_record() {
        let (stats, repo) = aggregator(MockWaifuRepository::with_dialect(SqlDialect::Unrecognized));
        repo.add_identity(100, "bob", "0001").await;

        assert!(stats.stats(100).await.unwrap().is_none());
        assert!(repo.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_unrecognized_dialect_reports_zero_affinity_count() {
        let (stats, repo) = aggregator(MockWaifuRepository::with_dialect(SqlDialect::Unrecognized));
        let bob = repo.add_identity(100, "bob", "0001").await;
        let alice = repo.add_identity(200, "alice", "0002").await;
        repo.put_record(bob, None, Some(alice), Decimal::new(5, 0)).await;
        repo.add_update(bob, WaifuUpdateType::AffinityChanged, None, Some(alice))
            .await;

        let snapshot = stats.stats(100).await.unwrap().expect("existing record");
        assert_eq!(snapshot.affinity_count, 0);
        assert_eq!(snapshot.affinity_name.as_deref(), Some("alice#0002"));
    }

    #[tokio::test]
    async fn test_claims_are_sampled_from_claimed_set() {
        let (stats, repo) = aggregator(MockWaifuRepository::new());
        let owner = repo.add_identity(1, "owner", "0000").await;

        let mut claimed = HashSet::new();
        for i in 0..45u64 {
            let id = repo
                .add_identity(1000 + i, &format!("waifu{}", i), "1111")
                .await;
            repo.put_record(id, Some(owner), None, Decimal::new(10, 0)).await;
            claimed.insert(format!("waifu{}#1111", i));
        }

        let snapshot = stats.stats(1).await.unwrap().unwrap();
        assert_eq!(snapshot.claim_count, 45);
        assert_eq!(snapshot.claims.len(), RECENT_CLAIMS_LIMIT);

        let unique: HashSet<&String> = snapshot.claims.iter().collect();
        assert_eq!(unique.len(), RECENT_CLAIMS_LIMIT);
        assert!(snapshot.claims.iter().all(|name| claimed.contains(name)));
    }

    #[tokio::test]
    async fn test_history_counts_and_items() {
        let (stats, repo) = aggregator(MockWaifuRepository::new());
        let subject = repo.add_identity(100, "bob", "0001").await;
        let claimer = repo.add_identity(200, "alice", "0002").await;
        let crush = repo.add_identity(300, "carol", "0003").await;

        let record = repo
            .put_record(subject, Some(claimer), Some(crush), Decimal::new(42, 0))
            .await;
        repo.add_item(record, "🌹", "Rose").await;

        repo.add_update(subject, WaifuUpdateType::Claimed, Some(subject), None)
            .await;
        repo.add_update(subject, WaifuUpdateType::Claimed, Some(subject), None)
            .await;
        repo.add_update(subject, WaifuUpdateType::Claimed, None, Some(claimer))
            .await;
        repo.add_update(subject, WaifuUpdateType::AffinityChanged, None, Some(crush))
            .await;
        repo.add_update(subject, WaifuUpdateType::AffinityChanged, Some(crush), None)
            .await;

        let snapshot = stats.stats(100).await.unwrap().unwrap();
        assert_eq!(snapshot.divorce_count, 2);
        assert_eq!(snapshot.affinity_count, 1);
        assert_eq!(snapshot.claimer_name.as_deref(), Some("alice#0002"));
        assert_eq!(snapshot.affinity_name.as_deref(), Some("carol#0003"));
        assert_eq!(snapshot.price, Decimal::new(42, 0));
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].name, "Rose");
    }

    #[tokio::test]
    async fn test_stats_resolves_user_once() {
        let (stats, repo) = aggregator(MockWaifuRepository::new());
        let subject = repo.add_identity(100, "bob", "0001").await;
        let claimer = repo.add_identity(200, "alice", "0002").await;
        repo.put_record(subject, Some(claimer), None, Decimal::new(9, 0))
            .await;

        stats.stats(100).await.unwrap().unwrap();
        assert_eq!(repo.resolutions(), 1);
    }
}
