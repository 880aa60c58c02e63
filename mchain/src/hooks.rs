//! Hook contracts for observing chain run execution.
//!
//! Hooks are a diagnostics side-channel; they never affect control flow.
//! Phase and round events fire only when the chain's verbose flag is set.
//! Terminal errors always reach `on_run_error`.
//!
//! ```rust
//! use mchain::{ChainHooks, NoopChainHooks};
//!
//! fn accepts_hooks(_hooks: &dyn ChainHooks) {}
//!
//! let hooks = NoopChainHooks;
//! accepts_hooks(&hooks);
//! ```

use std::time::Duration;

use mfunction::FunctionError;
use mmessage::Turn;

use crate::{ChainError, ChainPhase};

pub trait ChainHooks: Send + Sync {
    fn on_phase(&self, _round: u32, _phase: ChainPhase) {}

    fn on_send_start(&self, _round: u32, _transcript_len: usize) {}

    fn on_reply(&self, _round: u32, _turns: &[Turn]) {}

    fn on_function_start(&self, _round: u32, _name: &str) {}

    fn on_function_success(&self, _round: u32, _name: &str, _output: &str, _elapsed: Duration) {}

    fn on_function_failure(
        &self,
        _round: u32,
        _name: &str,
        _error: &FunctionError,
        _elapsed: Duration,
    ) {
    }

    fn on_run_complete(&self, _rounds: u32, _last_turn: &Turn) {}

    fn on_run_error(&self, _error: &ChainError) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopChainHooks;

impl ChainHooks for NoopChainHooks {}
