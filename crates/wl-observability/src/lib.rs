//! # wl-observability
//!
//! Logging and metrics infrastructure for Waifu Ledger.
//!
//! This crate provides structured logging with tracing and the metric
//! definitions recorded by the relationship store.

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, init_logging_with_config, LoggingConfig};
pub use metrics::{
    describe_metrics, record_degraded, record_query, record_record_created, QueryOutcome,
};
