//! Database layer for Waifu Ledger.
//!
//! This module provides persistence for relationship records, their change
//! history and attached items using SQLx with support for both SQLite
//! (development) and PostgreSQL (production).

pub mod dialect;
mod error;
pub mod identity_repo;
pub mod mocks;
mod pool;
mod schema;
pub mod waifu_repo;

pub use dialect::SqlDialect;
pub use error::DbError;
pub use pool::{create_pool, create_pool_with_options, DbPool, PoolOptions};
pub use schema::run_migrations;

// Re-export repository traits and helpers
pub use identity_repo::IdentityResolver;
pub use waifu_repo::{
    parse_price, price_from_minor_units, price_to_minor_units, validate_top_count,
    WaifuRepository, PRICE_SCALE,
};

// Re-export factory functions
#[cfg(feature = "database")]
pub use identity_repo::create_identity_resolver;
#[cfg(feature = "database")]
pub use waifu_repo::{create_waifu_repository, create_waifu_repository_with_dialect};
