//! Tracing-based observability hooks for chain runs and client retries.
//!
//! ```rust
//! use mchain::ChainHooks;
//! use mobserve::TracingObservabilityHooks;
//!
//! fn accepts_chain_hooks(_hooks: &dyn ChainHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_chain_hooks(&hooks);
//! ```

use std::time::Duration;

use mchain::{ChainError, ChainHooks, ChainPhase};
use mclient::{ClientError, ClientOperationHooks};
use mfunction::FunctionError;
use mmessage::Turn;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl ClientOperationHooks for TracingObservabilityHooks {
    fn on_attempt_start(&self, operation: &str, attempt: u32) {
        tracing::info!(phase = "client", event = "attempt_start", operation, attempt);
    }

    fn on_retry_scheduled(
        &self,
        operation: &str,
        attempt: u32,
        delay: Duration,
        error: &ClientError,
    ) {
        tracing::warn!(
            phase = "client",
            event = "retry_scheduled",
            operation,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }

    fn on_success(&self, operation: &str, attempts: u32) {
        tracing::info!(phase = "client", event = "success", operation, attempts);
    }

    fn on_failure(&self, operation: &str, attempts: u32, error: &ClientError) {
        tracing::error!(
            phase = "client",
            event = "failure",
            operation,
            attempts,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }
}

impl ChainHooks for TracingObservabilityHooks {
    fn on_phase(&self, round: u32, phase: ChainPhase) {
        tracing::debug!(phase = "chain", event = "transition", round, chain_phase = ?phase);
    }

    fn on_send_start(&self, round: u32, transcript_len: usize) {
        tracing::info!(
            phase = "chain",
            event = "send_start",
            round,
            transcript_len
        );
    }

    fn on_reply(&self, round: u32, turns: &[Turn]) {
        tracing::info!(
            phase = "chain",
            event = "reply",
            round,
            turn_count = turns.len()
        );
    }

    fn on_function_start(&self, round: u32, name: &str) {
        tracing::info!(
            phase = "function",
            event = "execution_start",
            round,
            function_name = name
        );
    }

    fn on_function_success(&self, round: u32, name: &str, output: &str, elapsed: Duration) {
        tracing::info!(
            phase = "function",
            event = "execution_success",
            round,
            function_name = name,
            output_len = output.len(),
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_function_failure(
        &self,
        round: u32,
        name: &str,
        error: &FunctionError,
        elapsed: Duration,
    ) {
        tracing::error!(
            phase = "function",
            event = "execution_failure",
            round,
            function_name = name,
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }

    fn on_run_complete(&self, rounds: u32, last_turn: &Turn) {
        tracing::info!(
            phase = "chain",
            event = "run_complete",
            rounds,
            last_role = ?last_turn.role,
            last_status = ?last_turn.status
        );
    }

    fn on_run_error(&self, error: &ChainError) {
        tracing::error!(
            phase = "chain",
            event = "run_error",
            error_kind = ?error.kind,
            chain_phase = ?error.phase,
            error = %error
        );
    }
}
