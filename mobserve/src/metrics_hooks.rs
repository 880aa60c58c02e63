//! Metrics-based observability hooks for chain runs and client retries.
//!
//! ```rust
//! use mclient::ClientOperationHooks;
//! use mobserve::MetricsObservabilityHooks;
//!
//! fn accepts_operation_hooks(_hooks: &dyn ClientOperationHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_operation_hooks(&hooks);
//! ```

use std::time::Duration;

use mchain::{ChainError, ChainHooks};
use mclient::{ClientError, ClientOperationHooks};
use mfunction::FunctionError;
use mmessage::Turn;

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl ClientOperationHooks for MetricsObservabilityHooks {
    fn on_attempt_start(&self, operation: &str, _attempt: u32) {
        metrics::counter!(
            "marionette_client_attempt_start_total",
            "operation" => operation.to_string()
        )
        .increment(1);
    }

    fn on_retry_scheduled(
        &self,
        operation: &str,
        _attempt: u32,
        delay: Duration,
        error: &ClientError,
    ) {
        metrics::counter!(
            "marionette_client_retry_scheduled_total",
            "operation" => operation.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "marionette_client_retry_delay_seconds",
            "operation" => operation.to_string()
        )
        .record(delay.as_secs_f64());
    }

    fn on_success(&self, operation: &str, attempts: u32) {
        metrics::counter!(
            "marionette_client_success_total",
            "operation" => operation.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "marionette_client_attempts_per_success",
            "operation" => operation.to_string()
        )
        .record(attempts as f64);
    }

    fn on_failure(&self, operation: &str, attempts: u32, error: &ClientError) {
        metrics::counter!(
            "marionette_client_failure_total",
            "operation" => operation.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "marionette_client_attempts_per_failure",
            "operation" => operation.to_string()
        )
        .record(attempts as f64);
    }
}

impl ChainHooks for MetricsObservabilityHooks {
    fn on_send_start(&self, _round: u32, _transcript_len: usize) {
        metrics::counter!("marionette_chain_send_total").increment(1);
    }

    fn on_function_start(&self, _round: u32, name: &str) {
        metrics::counter!(
            "marionette_function_execution_start_total",
            "function_name" => name.to_string()
        )
        .increment(1);
    }

    fn on_function_success(&self, _round: u32, name: &str, _output: &str, elapsed: Duration) {
        metrics::counter!(
            "marionette_function_execution_success_total",
            "function_name" => name.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "marionette_function_execution_duration_seconds",
            "function_name" => name.to_string(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_function_failure(
        &self,
        _round: u32,
        name: &str,
        error: &FunctionError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "marionette_function_execution_failure_total",
            "function_name" => name.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "marionette_function_execution_duration_seconds",
            "function_name" => name.to_string(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_run_complete(&self, rounds: u32, _last_turn: &Turn) {
        metrics::counter!("marionette_chain_run_complete_total").increment(1);
        metrics::histogram!("marionette_chain_rounds_per_run").record(rounds as f64);
    }

    fn on_run_error(&self, error: &ChainError) {
        metrics::counter!(
            "marionette_chain_run_error_total",
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
    }
}
