//! Relationship data models for Waifu Ledger.
//!
//! Every identity may own one [`WaifuInfo`] record: who claimed it, who it
//! has an affinity toward, and its current price. Changes to claims and
//! affinities are logged as [`WaifuUpdate`] history entries, and gifts are
//! attached to a record as [`WaifuItem`]s.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::identity::{format_full_name, Identity};

/// Price assigned to a freshly initialized record.
pub const DEFAULT_PRICE: Decimal = Decimal::ONE;

/// The relationship record of a single identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaifuInfo {
    /// Record id.
    pub id: i64,
    /// Surrogate key of the identity this record belongs to.
    pub waifu_id: i64,
    /// Surrogate key of the identity this one has an affinity toward.
    pub affinity_id: Option<i64>,
    /// Surrogate key of the identity that currently claims this one.
    pub claimer_id: Option<i64>,
    /// Current price. Never negative.
    pub price: Decimal,
    /// The record's own identity, when included.
    pub waifu: Option<Identity>,
    /// The affinity identity, when included and set.
    pub affinity: Option<Identity>,
    /// The claimer identity, when included and set.
    pub claimer: Option<Identity>,
    /// Attached items, when included.
    pub items: Vec<WaifuItem>,
}

impl WaifuInfo {
    /// A record with default values for the given subject.
    pub fn new(id: i64, waifu_id: i64) -> Self {
        Self {
            id,
            waifu_id,
            affinity_id: None,
            claimer_id: None,
            price: DEFAULT_PRICE,
            waifu: None,
            affinity: None,
            claimer: None,
            items: Vec::new(),
        }
    }

    /// Display name of the subject, if its identity was loaded.
    pub fn full_name(&self) -> Option<String> {
        self.waifu.as_ref().map(Identity::full_name)
    }

    /// Whether some identity currently claims this one.
    pub fn is_claimed(&self) -> bool {
        self.claimer_id.is_some()
    }
}

/// Selects which related rows are loaded alongside a [`WaifuInfo`].
///
/// Repositories treat a missing selection as [`WaifuIncludes::all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WaifuIncludes {
    pub waifu: bool,
    pub affinity: bool,
    pub claimer: bool,
    pub items: bool,
}

impl WaifuIncludes {
    pub fn all() -> Self {
        Self {
            waifu: true,
            affinity: true,
            claimer: true,
            items: true,
        }
    }

    /// Loads nothing beyond the record's own columns.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_waifu(mut self) -> Self {
        self.waifu = true;
        self
    }

    pub fn with_affinity(mut self) -> Self {
        self.affinity = true;
        self
    }

    pub fn with_claimer(mut self) -> Self {
        self.claimer = true;
        self
    }

    pub fn with_items(mut self) -> Self {
        self.items = true;
        self
    }

    /// Resolves an optional selection, defaulting to everything.
    pub fn or_all(includes: Option<&WaifuIncludes>) -> Self {
        includes.copied().unwrap_or_else(Self::all)
    }
}

/// Kind of a relationship history entry.
///
/// Stored as an integer; the codes are part of the persisted format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaifuUpdateType {
    /// The subject changed (or cleared) its affinity.
    AffinityChanged,
    /// The subject's claimer changed; a cleared claimer is a divorce.
    Claimed,
}

impl WaifuUpdateType {
    /// Returns the stored integer code.
    pub fn as_db_code(&self) -> i32 {
        match self {
            WaifuUpdateType::AffinityChanged => 0,
            WaifuUpdateType::Claimed => 1,
        }
    }

    /// Parses a stored integer code.
    pub fn from_db_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(WaifuUpdateType::AffinityChanged),
            1 => Some(WaifuUpdateType::Claimed),
            _ => None,
        }
    }
}

impl std::fmt::Display for WaifuUpdateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaifuUpdateType::AffinityChanged => write!(f, "affinity_changed"),
            WaifuUpdateType::Claimed => write!(f, "claimed"),
        }
    }
}

/// Append-only history entry about one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaifuUpdate {
    pub id: i64,
    /// Surrogate key of the identity the entry is about.
    pub user_id: i64,
    pub update_type: WaifuUpdateType,
    /// Previous referenced identity, if any.
    pub old_id: Option<i64>,
    /// New referenced identity, if any.
    pub new_id: Option<i64>,
    pub date_added: DateTime<Utc>,
}

impl WaifuUpdate {
    /// A claim that was released: the subject had a claimer and now has none.
    pub fn is_divorce_of(&self, subject: i64) -> bool {
        self.update_type == WaifuUpdateType::Claimed
            && self.old_id == Some(subject)
            && self.new_id.is_none()
    }

    /// An affinity change that set (rather than cleared) the affinity.
    pub fn is_affinity_set(&self) -> bool {
        self.update_type == WaifuUpdateType::AffinityChanged && self.new_id.is_some()
    }
}

/// A gift attached to a relationship record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaifuItem {
    pub id: i64,
    pub waifu_info_id: i64,
    pub item_emoji: String,
    pub name: String,
    pub date_added: DateTime<Utc>,
}

/// One row of the price leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaifuLbEntry {
    pub affinity: Option<String>,
    pub affinity_discrim: Option<String>,
    pub claimer: Option<String>,
    pub claimer_discrim: Option<String>,
    pub username: String,
    pub discrim: String,
    pub price: Decimal,
}

impl WaifuLbEntry {
    pub fn full_name(&self) -> String {
        format_full_name(&self.username, &self.discrim)
    }

    pub fn claimer_full_name(&self) -> Option<String> {
        match (&self.claimer, &self.claimer_discrim) {
            (Some(name), Some(discrim)) => Some(format_full_name(name, discrim)),
            _ => None,
        }
    }

    pub fn affinity_full_name(&self) -> Option<String> {
        match (&self.affinity, &self.affinity_discrim) {
            (Some(name), Some(discrim)) => Some(format_full_name(name, discrim)),
            _ => None,
        }
    }
}

/// Per-identity statistics snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaifuStats {
    /// Display name of the subject.
    pub full_name: String,
    /// Number of times the subject set an affinity.
    pub affinity_count: u64,
    /// Display name of the current affinity.
    pub affinity_name: Option<String>,
    /// Number of identities the subject currently claims.
    pub claim_count: u64,
    /// Display name of the current claimer.
    pub claimer_name: Option<String>,
    /// Number of times a claim on the subject was released.
    pub divorce_count: u64,
    pub price: Decimal,
    /// Random sample of display names the subject currently claims.
    pub claims: Vec<String>,
    pub items: Vec<WaifuItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(update_type: WaifuUpdateType, old_id: Option<i64>, new_id: Option<i64>) -> WaifuUpdate {
        WaifuUpdate {
            id: 1,
            user_id: 7,
            update_type,
            old_id,
            new_id,
            date_added: Utc::now(),
        }
    }

    #[test]
    fn test_update_type_codes() {
        for kind in [WaifuUpdateType::AffinityChanged, WaifuUpdateType::Claimed] {
            assert_eq!(WaifuUpdateType::from_db_code(kind.as_db_code()), Some(kind));
        }
        assert_eq!(WaifuUpdateType::AffinityChanged.as_db_code(), 0);
        assert_eq!(WaifuUpdateType::from_db_code(9), None);
    }

    #[test]
    fn test_new_record_defaults() {
        let info = WaifuInfo::new(3, 7);
        assert_eq!(info.price, Decimal::ONE);
        assert!(info.affinity_id.is_none());
        assert!(!info.is_claimed());
        assert!(info.full_name().is_none());
    }

    #[test]
    fn test_includes_default_to_all() {
        assert_eq!(WaifuIncludes::or_all(None), WaifuIncludes::all());

        let only_items = WaifuIncludes::none().with_items();
        let resolved = WaifuIncludes::or_all(Some(&only_items));
        assert!(resolved.items);
        assert!(!resolved.waifu && !resolved.affinity && !resolved.claimer);
    }

    #[test]
    fn test_divorce_detection() {
        assert!(update(WaifuUpdateType::Claimed, Some(7), None).is_divorce_of(7));
        assert!(!update(WaifuUpdateType::Claimed, Some(7), Some(8)).is_divorce_of(7));
        assert!(!update(WaifuUpdateType::Claimed, Some(8), None).is_divorce_of(7));
        assert!(!update(WaifuUpdateType::AffinityChanged, Some(7), None).is_divorce_of(7));
    }

    #[test]
    fn test_affinity_set_detection() {
        assert!(update(WaifuUpdateType::AffinityChanged, None, Some(2)).is_affinity_set());
        assert!(!update(WaifuUpdateType::AffinityChanged, Some(2), None).is_affinity_set());
        assert!(!update(WaifuUpdateType::Claimed, None, Some(2)).is_affinity_set());
    }

    #[test]
    fn test_lb_entry_names() {
        let entry = WaifuLbEntry {
            affinity: None,
            affinity_discrim: None,
            claimer: Some("alice".to_string()),
            claimer_discrim: Some("1234".to_string()),
            username: "bob".to_string(),
            discrim: "0001".to_string(),
            price: Decimal::new(2050, 2),
        };
        assert_eq!(entry.full_name(), "bob#0001");
        assert_eq!(entry.claimer_full_name().as_deref(), Some("alice#1234"));
        assert_eq!(entry.affinity_full_name(), None);
    }

    #[test]
    fn test_stats_serialization() {
        let stats = WaifuStats {
            full_name: "bob#0001".to_string(),
            affinity_count: 2,
            affinity_name: None,
            claim_count: 1,
            claimer_name: Some("alice#1234".to_string()),
            divorce_count: 0,
            price: Decimal::new(15, 0),
            claims: vec!["carol#0002".to_string()],
            items: Vec::new(),
        };
        let json = serde_json::to_string(&stats).unwrap();
        let parsed: WaifuStats = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, stats);
    }
}
