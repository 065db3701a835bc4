//! Record API call metrics.
//!
//! Provides functions for recording record API latency and failures.

use metrics::{counter, histogram};
use std::time::Instant;

/// Record the duration of one record API call.
pub fn record_call_duration(table: &str, operation: &'static str, duration_secs: f64) {
    histogram!(
        "record_api_request_duration_seconds",
        "table" => table.to_string(),
        "operation" => operation
    )
    .record(duration_secs);
}

/// Count a record API call that did not produce a usable response.
pub fn record_call_failure(table: &str, operation: &'static str) {
    counter!(
        "record_api_failures_total",
        "table" => table.to_string(),
        "operation" => operation
    )
    .increment(1);
}

/// Times one record API call and records it on completion.
///
/// Usage:
/// ```ignore
/// let timer = CallTimer::new("app", "fetch");
/// let response = request.send().await;
/// timer.record();
/// ```
pub struct CallTimer {
    table: String,
    operation: &'static str,
    start: Instant,
}

impl CallTimer {
    pub fn new(table: impl Into<String>, operation: &'static str) -> Self {
        Self {
            table: table.into(),
            operation,
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration to metrics.
    pub fn record(self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_call_duration(&self.table, self.operation, duration);
    }

    /// Record the elapsed duration and count the call as failed.
    pub fn record_failure(self) {
        record_call_failure(&self.table, self.operation);
        self.record();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_timer_creation() {
        let timer = CallTimer::new("app", "fetch");
        assert_eq!(timer.table, "app");
        assert_eq!(timer.operation, "fetch");
    }

    #[test]
    fn test_call_timer_records_without_recorder() {
        CallTimer::new(String::from("app_ai_log"), "update").record();
        CallTimer::new("app", "delete").record_failure();
    }
}
