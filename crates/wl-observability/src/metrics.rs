//! Metrics for the relationship store.
//!
//! Metrics go through the `metrics` facade; without an installed recorder
//! every call is a no-op, so library code can record unconditionally.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::sync::Once;
use std::time::Duration;

static DESCRIBE: Once = Once::new();

/// Whether a store operation completed or returned an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    Ok,
    Error,
}

impl QueryOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryOutcome::Ok => "ok",
            QueryOutcome::Error => "error",
        }
    }

    /// Maps a result to its outcome label.
    pub fn of<T, E>(result: &Result<T, E>) -> Self {
        if result.is_ok() {
            QueryOutcome::Ok
        } else {
            QueryOutcome::Error
        }
    }
}

/// Registers metric descriptions with the installed recorder.
///
/// Only the first call has an effect.
pub fn describe_metrics() {
    DESCRIBE.call_once(|| {
        describe_counter!(
            "wl_store_queries_total",
            "Total number of relationship store operations"
        );
        describe_histogram!(
            "wl_store_query_duration_seconds",
            "Duration of relationship store operations"
        );
        describe_counter!(
            "wl_records_created_total",
            "Relationship records created by the idempotent initializer"
        );
        describe_counter!(
            "wl_degraded_dialect_total",
            "Operations answered with a default because the store dialect is unrecognized"
        );
    });
}

/// Records one store operation and its duration.
pub fn record_query(operation: &'static str, duration: Duration, outcome: QueryOutcome) {
    counter!("wl_store_queries_total", "operation" => operation, "outcome" => outcome.as_str())
        .increment(1);
    histogram!("wl_store_query_duration_seconds", "operation" => operation)
        .record(duration.as_secs_f64());
}

/// Records a relationship record inserted by the initializer.
pub fn record_record_created(dialect: &'static str) {
    counter!("wl_records_created_total", "dialect" => dialect).increment(1);
}

/// Records an operation that fell back to its degraded default.
pub fn record_degraded(operation: &'static str) {
    counter!("wl_degraded_dialect_total", "operation" => operation).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_of_result() {
        let ok: Result<u32, ()> = Ok(1);
        let err: Result<u32, ()> = Err(());
        assert_eq!(QueryOutcome::of(&ok), QueryOutcome::Ok);
        assert_eq!(QueryOutcome::of(&err), QueryOutcome::Error);
        assert_eq!(QueryOutcome::Error.as_str(), "error");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        describe_metrics();
        describe_metrics();
        record_query("get_top", Duration::from_millis(3), QueryOutcome::Ok);
        record_record_created("sqlite");
        record_degraded("affinity_count");
    }
}
