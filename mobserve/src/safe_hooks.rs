use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use mchain::{ChainError, ChainHooks, ChainPhase};
use mclient::{ClientError, ClientOperationHooks};
use mfunction::FunctionError;
use mmessage::Turn;

/// Wrapper that swallows panics from inner operation hooks. Hooks are a
/// diagnostics side-channel; a broken hook must not fail a send.
pub struct SafeOperationHooks<H> {
    inner: H,
}

impl<H> SafeOperationHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    pub fn inner_ref(&self) -> &H {
        &self.inner
    }
}

impl<H> ClientOperationHooks for SafeOperationHooks<H>
where
    H: ClientOperationHooks,
{
    fn on_attempt_start(&self, operation: &str, attempt: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_attempt_start(operation, attempt)
        }));
    }

    fn on_retry_scheduled(
        &self,
        operation: &str,
        attempt: u32,
        delay: Duration,
        error: &ClientError,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_retry_scheduled(operation, attempt, delay, error)
        }));
    }

    fn on_success(&self, operation: &str, attempts: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_success(operation, attempts)
        }));
    }

    fn on_failure(&self, operation: &str, attempts: u32, error: &ClientError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_failure(operation, attempts, error)
        }));
    }
}

/// Wrapper that swallows panics from inner chain hooks.
pub struct SafeChainHooks<H> {
    inner: H,
}

impl<H> SafeChainHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    pub fn inner_ref(&self) -> &H {
        &self.inner
    }
}

impl<H> ChainHooks for SafeChainHooks<H>
where
    H: ChainHooks,
{
    fn on_phase(&self, round: u32, phase: ChainPhase) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_phase(round, phase)));
    }

    fn on_send_start(&self, round: u32, transcript_len: usize) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_send_start(round, transcript_len)
        }));
    }

    fn on_reply(&self, round: u32, turns: &[Turn]) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_reply(round, turns)));
    }

    fn on_function_start(&self, round: u32, name: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_function_start(round, name)
        }));
    }

    fn on_function_success(&self, round: u32, name: &str, output: &str, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_function_success(round, name, output, elapsed)
        }));
    }

    fn on_function_failure(
        &self,
        round: u32,
        name: &str,
        error: &FunctionError,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_function_failure(round, name, error, elapsed)
        }));
    }

    fn on_run_complete(&self, rounds: u32, last_turn: &Turn) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_run_complete(rounds, last_turn)
        }));
    }

    fn on_run_error(&self, error: &ChainError) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_run_error(error)));
    }
}
