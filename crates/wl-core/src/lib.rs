//! # wl-core
//!
//! Core data models and persistence for Waifu Ledger.
//!
//! Identities can claim one another, hold an affinity toward another
//! identity, carry a price and receive gifts. This crate stores those
//! relationships and derives the aggregate views built from them:
//! price leaderboards, total claimed value and per-identity statistics
//! snapshots, on SQLite or PostgreSQL.

pub mod config;
pub mod db;
pub mod identity;
pub mod sampling;
pub mod stats;
pub mod waifu;

pub use config::{PoolSettings, StoreConfig};
pub use db::{DbError, IdentityResolver, SqlDialect, WaifuRepository};
pub use identity::Identity;
pub use sampling::sample;
pub use stats::{WaifuStatsAggregator, RECENT_CLAIMS_LIMIT};
pub use waifu::{
    WaifuIncludes, WaifuInfo, WaifuItem, WaifuLbEntry, WaifuStats, WaifuUpdate, WaifuUpdateType,
    DEFAULT_PRICE,
};
